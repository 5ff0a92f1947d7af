//! Data models for budget records and Notion API payloads.
//!
//! This module contains the record a caller wants to insert, the typed
//! page-creation payload built from it, and the loosely-typed readers for
//! database schema and query responses.

mod enums;
mod payload;
mod query;
mod record;
mod schema;

pub use enums::RecordKind;
pub use payload::{
    DateValue, PagePayload, Parent, PropertyValue, RichText, SelectOption, TextContent,
};
pub use query::{Balance, MAX_PAGE_SIZE, PageSum, QueryRequest};
pub use record::Record;
pub use schema::{MULTI_SELECT, multi_select_columns, tag_options};
