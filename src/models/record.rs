//! Budget record to be inserted into the database.

use super::RecordKind;

/// A transaction to insert.
///
/// Use [`Record::expense`] or [`Record::income`] and chain the optional
/// parts:
///
/// ```
/// use nbudget_rs::models::{Record, RecordKind};
///
/// let record = Record::expense("Groceries", 42.5)
///     .tags(["Food", "Home"])
///     .date("12/1/2019");
/// assert_eq!(record.kind, RecordKind::Expense);
/// assert_eq!(record.tags.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Free-text concept, written to the title column.
    pub concept: String,
    /// Positive magnitude; the sign is derived from [`Record::kind`].
    pub amount: f64,
    /// Tags, each of which must be an option of the tag column.
    pub tags: Vec<String>,
    /// Whether the record is an expense or an income.
    pub kind: RecordKind,
    /// Raw date in the configured input format; `None` means today.
    pub date: Option<String>,
}

impl Record {
    /// Creates a record of the given kind with no tags and today's date.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(concept: T, amount: f64, kind: RecordKind) -> Self {
        Self {
            concept: concept.into(),
            amount,
            tags: Vec::new(),
            kind,
            date: None,
        }
    }

    /// Creates an expense record.
    #[inline]
    #[must_use]
    pub fn expense<T: Into<String>>(concept: T, amount: f64) -> Self {
        Self::new(concept, amount, RecordKind::Expense)
    }

    /// Creates an income record.
    #[inline]
    #[must_use]
    pub fn income<T: Into<String>>(concept: T, amount: f64) -> Self {
        Self::new(concept, amount, RecordKind::Income)
    }

    /// Replaces the record's tags.
    #[inline]
    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the raw date string, parsed later with the configured format.
    #[inline]
    #[must_use]
    pub fn date<T: Into<String>>(mut self, date: T) -> Self {
        self.date = Some(date.into());
        self
    }
}
