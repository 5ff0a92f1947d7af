//! Paged database queries and balance summation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NBudgetError, Result};

/// Largest page size accepted by the query endpoint.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Body of a database query request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Number of rows per page.
    pub page_size: u32,
    /// Cursor returned by the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

impl QueryRequest {
    /// Request for the first page.
    #[inline]
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            start_cursor: None,
        }
    }

    /// Request for the page starting at `cursor`.
    #[inline]
    #[must_use]
    pub fn after<T: Into<String>>(cursor: T) -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            start_cursor: Some(cursor.into()),
        }
    }
}

impl Default for QueryRequest {
    #[inline]
    fn default() -> Self {
        Self::first()
    }
}

/// Sum of one query page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSum {
    /// Sum of the numeric amounts on the page.
    pub total: f64,
    /// Rows that contributed to `total`.
    pub counted: usize,
    /// Rows whose amount was missing or not a number.
    pub skipped: usize,
    /// Cursor of the next page, if any.
    pub next_cursor: Option<String>,
}

impl PageSum {
    /// Sums the `amount_column` numbers of a query response page.
    ///
    /// Rows without a numeric amount are counted in
    /// [`PageSum::skipped`] instead of failing the whole page.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::ApiParsing`] if the page has no `results`
    /// array.
    #[inline]
    pub fn from_page(page: &Value, amount_column: &str) -> Result<Self> {
        let results = page
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                NBudgetError::ApiParsing(format!("Did not understand API response: {page}"))
            })?;

        let mut sum = Self {
            total: 0.0,
            counted: 0,
            skipped: 0,
            next_cursor: page
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
        };
        for row in results {
            match amount_of(row, amount_column) {
                Some(amount) => {
                    sum.total += amount;
                    sum.counted += 1;
                }
                None => sum.skipped += 1,
            }
        }
        Ok(sum)
    }
}

/// Reads `properties.<column>.number` of a result row.
fn amount_of(row: &Value, amount_column: &str) -> Option<f64> {
    row.get("properties")?
        .get(amount_column)?
        .get("number")?
        .as_f64()
}

/// Running balance over every row of the database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balance {
    /// Sum of all numeric amounts.
    pub total: f64,
    /// Rows that contributed to `total`.
    pub counted: usize,
    /// Rows without a numeric amount.
    pub skipped: usize,
    /// Pages fetched.
    pub pages: usize,
}

impl Balance {
    /// Folds one page into the balance.
    #[inline]
    pub fn add(&mut self, page: &PageSum) {
        self.total += page.total;
        self.counted += page.counted;
        self.skipped += page.skipped;
        self.pages += 1;
    }
}
