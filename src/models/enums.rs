//! Enumeration types for constrained API values.

use serde::{Deserialize, Serialize};

/// Type of a budget record, stored in the database's type column.
///
/// Expenses are written with a negated amount so that a plain sum of the
/// amount column yields the running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    /// Money going out.
    #[default]
    Expense,
    /// Money coming in.
    Income,
}

impl RecordKind {
    /// Returns the option name written to the type column.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "EXPENSE",
            Self::Income => "INCOME",
        }
    }

    /// Applies the sign convention of this kind to a positive magnitude.
    #[inline]
    #[must_use]
    pub fn signed_amount(self, amount: f64) -> f64 {
        match self {
            Self::Expense => -amount,
            Self::Income => amount,
        }
    }
}

impl From<bool> for RecordKind {
    /// Maps an "is income" flag to a record kind.
    #[inline]
    fn from(is_income: bool) -> Self {
        if is_income { Self::Income } else { Self::Expense }
    }
}

impl core::fmt::Display for RecordKind {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
