//! Record income and expenses into a Notion budget database.
//!
//! The database is expected to have a type column (select with `INCOME` and
//! `EXPENSE` options), a date column, a concept (title) column, an amount
//! (number) column and a tags (multi-select) column. Column names are
//! configurable through [`settings::Settings`].
//!
//! Expenses are stored with a negative amount so that the sum of the
//! amount column is the running balance.
//!
//! ```no_run
//! use nbudget_rs::models::Record;
//! use nbudget_rs::nbudget::NBudget;
//! use nbudget_rs::settings::Settings;
//!
//! # fn main() -> nbudget_rs::Result<()> {
//! let settings = Settings::new("database-id", "secret_api_key");
//! let mut budget = NBudget::from_settings(settings)?;
//! let _page = budget.insert_record(&Record::expense("Groceries", 42.5).tags(["Food"]))?;
//! let balance = budget.balance()?;
//! assert!(balance.pages >= 1);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod classifier;
pub mod date;
pub mod delivery;
pub mod error;
pub mod models;
pub mod nbudget;
pub mod settings;
pub mod transport;

pub use error::{NBudgetError, Result};
