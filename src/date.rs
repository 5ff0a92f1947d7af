//! Parsing of user-supplied dates against a configurable token order.
//!
//! A date input format is a delimiter-separated list of tokens in which
//! `D`, `M` and `Y` mark the positions of the day, month and year fields,
//! e.g. `D/M/Y`, `M/D/Y` or `Y-M-D`. Only the first occurrence of each
//! letter is used; other tokens are ignored.

use chrono::{Local, NaiveDate};

use crate::error::{NBudgetError, Result};

/// Delimiter used when the format contains no separator character.
const DEFAULT_DELIMITER: char = '/';

/// Years that serialize as four-digit `YYYY-MM-DD` dates.
const YEARS: core::ops::RangeInclusive<i32> = 1..=9999;

/// Returns the first non-alphanumeric character of `format`.
fn delimiter_of(format: &str) -> char {
    format
        .chars()
        .find(|ch| !ch.is_alphanumeric())
        .unwrap_or(DEFAULT_DELIMITER)
}

/// Field positions of a date, as indices into the split data string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldOrder {
    /// Index of the day field.
    day: usize,
    /// Index of the month field.
    month: usize,
    /// Index of the year field.
    year: usize,
}

impl FieldOrder {
    /// Locates the first `D`, `M` and `Y` tokens of a format.
    fn from_tokens(tokens: &[&str]) -> Option<Self> {
        let position = |letter: &str| tokens.iter().position(|token| *token == letter);
        Some(Self {
            day: position("D")?,
            month: position("M")?,
            year: position("Y")?,
        })
    }
}

/// Parses `data` using the token order described by `format`.
///
/// # Errors
///
/// - [`NBudgetError::InvalidDateFormat`] if `format` lacks `D`, `M` or `Y`.
/// - [`NBudgetError::InvalidDate`] if `data` has too few fields.
/// - [`NBudgetError::InvalidDateRange`] if the fields are not numbers, the
///   year falls outside 1 to 9999, or the fields do not form a valid
///   calendar date.
#[inline]
pub fn parse_date(data: &str, format: &str) -> Result<NaiveDate> {
    let delimiter = delimiter_of(format);
    let format_tokens: Vec<&str> = format.split(delimiter).collect();
    let fields: Vec<&str> = data.split(delimiter).collect();

    let order = FieldOrder::from_tokens(&format_tokens)
        .ok_or_else(|| NBudgetError::InvalidDateFormat(format.to_owned()))?;

    let field = |index: usize| {
        fields
            .get(index)
            .copied()
            .ok_or_else(|| NBudgetError::InvalidDate(data.to_owned()))
    };
    let (year, month, day) = (field(order.year)?, field(order.month)?, field(order.day)?);

    let out_of_range = || NBudgetError::InvalidDateRange(data.to_owned());
    let year = component::<i32>(year)
        .filter(|year| YEARS.contains(year))
        .ok_or_else(out_of_range)?;
    let month = component::<u32>(month).ok_or_else(out_of_range)?;
    let day = component::<u32>(day).ok_or_else(out_of_range)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(out_of_range)
}

/// Parses one numeric date field, ignoring surrounding whitespace.
fn component<T: core::str::FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

/// Resolves an optional date string, falling back to today's local date.
///
/// Blank strings are treated like an absent date.
///
/// # Errors
///
/// Propagates the errors of [`parse_date`].
#[inline]
pub fn resolve_date(data: Option<&str>, format: &str) -> Result<NaiveDate> {
    match data.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => parse_date(raw, format),
        None => Ok(today()),
    }
}

/// Returns the current local calendar date.
#[inline]
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
