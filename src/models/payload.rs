//! Typed page-creation payload.
//!
//! The payload is assembled as Rust values and serialized once when it is
//! handed to the transport.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Record;
use crate::settings::ColumnNames;

/// Body of a page-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    /// Database the page is created in.
    pub parent: Parent,
    /// Property values keyed by column name.
    pub properties: BTreeMap<String, PropertyValue>,
}

/// Parent reference of a new page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    /// Identifier of the parent database.
    pub database_id: String,
}

/// Value of a single database property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    /// Single-choice option.
    Select(SelectOption),
    /// Calendar date.
    Date(DateValue),
    /// Title rich text.
    Title(Vec<RichText>),
    /// Number.
    Number(f64),
    /// Multiple-choice options.
    MultiSelect(Vec<SelectOption>),
}

/// Option of a select or multi-select property, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Option name.
    pub name: String,
}

/// Date property value without a time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    /// Start date, serialized as `YYYY-MM-DD`.
    pub start: NaiveDate,
}

/// Plain rich-text segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    /// Text content.
    pub text: TextContent,
}

/// Content of a rich-text segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text itself.
    pub content: String,
}

impl PropertyValue {
    /// Wraps plain text as a single-segment title.
    #[inline]
    #[must_use]
    pub fn title<T: Into<String>>(text: T) -> Self {
        Self::Title(vec![RichText {
            text: TextContent {
                content: text.into(),
            },
        }])
    }

    /// Builds a multi-select value from option names.
    #[inline]
    #[must_use]
    pub fn multi_select<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::MultiSelect(
            names
                .into_iter()
                .map(|name| SelectOption { name: name.into() })
                .collect(),
        )
    }
}

impl PagePayload {
    /// Assembles the payload for `record`.
    ///
    /// The amount is negated for expenses, the date is the already-resolved
    /// calendar date, and the tags column is only present when the record
    /// has tags. Tags are expected to be validated by the caller.
    #[inline]
    #[must_use]
    pub fn build(
        database_id: &str,
        columns: &ColumnNames,
        record: &Record,
        date: NaiveDate,
    ) -> Self {
        let mut properties = BTreeMap::new();
        let _type = properties.insert(
            columns.type_name.clone(),
            PropertyValue::Select(SelectOption {
                name: record.kind.as_str().to_owned(),
            }),
        );
        let _date = properties.insert(
            columns.date_name.clone(),
            PropertyValue::Date(DateValue { start: date }),
        );
        let _concept = properties.insert(
            columns.concept_name.clone(),
            PropertyValue::title(record.concept.as_str()),
        );
        let _amount = properties.insert(
            columns.amount_name.clone(),
            PropertyValue::Number(record.kind.signed_amount(record.amount)),
        );
        if !record.tags.is_empty() {
            let _tags = properties.insert(
                columns.tags_name.clone(),
                PropertyValue::multi_select(record.tags.iter().map(String::as_str)),
            );
        }

        Self {
            parent: Parent {
                database_id: database_id.to_owned(),
            },
            properties,
        }
    }
}
