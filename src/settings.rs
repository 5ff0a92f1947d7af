//! Session settings: remote identifiers, credential, date input format and
//! the database column names.
//!
//! Settings are stored as a flat JSON object with exactly nine keys:
//!
//! ```json
//! {
//!   "database_id": "…",
//!   "api_key": "…",
//!   "date_input_format": "D/M/Y",
//!   "tag_separator": "\n",
//!   "type_name": "Type",
//!   "date_name": "Date",
//!   "concept_name": "Concept",
//!   "amount_name": "Amount",
//!   "tags_name": "Tags"
//! }
//! ```

use std::fs;
use std::path::Path;

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NBudgetError, Result};

/// Every key a settings object must carry, in validation order.
pub const REQUIRED_KEYS: [&str; 9] = [
    "database_id",
    "api_key",
    "date_input_format",
    "tag_separator",
    "type_name",
    "date_name",
    "concept_name",
    "amount_name",
    "tags_name",
];

/// Default date input format (day, month, year).
pub const DEFAULT_DATE_INPUT_FORMAT: &str = "D/M/Y";

/// Default separator used when printing tag names.
pub const DEFAULT_TAG_SEPARATOR: &str = "\n";

/// Names of the five database columns a record is written to.
///
/// The database's human-facing column names may differ from the defaults;
/// payload keys are always taken from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    /// Select column holding `INCOME` or `EXPENSE`.
    pub type_name: String,
    /// Date column.
    pub date_name: String,
    /// Title column holding the record concept.
    pub concept_name: String,
    /// Number column holding the signed amount.
    pub amount_name: String,
    /// Multi-select column holding the tags.
    pub tags_name: String,
}

impl Default for ColumnNames {
    #[inline]
    fn default() -> Self {
        Self {
            type_name: "Type".to_owned(),
            date_name: "Date".to_owned(),
            concept_name: "Concept".to_owned(),
            amount_name: "Amount".to_owned(),
            tags_name: "Tags".to_owned(),
        }
    }
}

/// Immutable per-session configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Identifier of the budget database.
    pub database_id: String,
    /// Integration token with access to the database.
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub api_key: SecretString,
    /// Token order for user-supplied dates, e.g. `D/M/Y` or `M-D-Y`.
    pub date_input_format: String,
    /// Separator used when printing tag names.
    pub tag_separator: String,
    /// Database column names.
    #[serde(flatten)]
    pub columns: ColumnNames,
}

impl Settings {
    /// Creates settings with default format, separator and column names.
    #[inline]
    #[must_use]
    pub fn new<D: Into<String>, K: Into<String>>(database_id: D, api_key: K) -> Self {
        Self {
            database_id: database_id.into(),
            api_key: SecretString::from(api_key.into()),
            date_input_format: DEFAULT_DATE_INPUT_FORMAT.to_owned(),
            tag_separator: DEFAULT_TAG_SEPARATOR.to_owned(),
            columns: ColumnNames::default(),
        }
    }

    /// Builds settings from a JSON object, failing fast on the first
    /// missing key.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Configuration`] if the value is not an
    /// object, lacks one of [`REQUIRED_KEYS`], or holds a non-string value.
    #[inline]
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(NBudgetError::Configuration(
                "settings must be a JSON object".to_owned(),
            ));
        };
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
            return Err(NBudgetError::Configuration(format!(
                "settings are missing key: \"{missing}\""
            )));
        }
        serde_json::from_value(value)
            .map_err(|err| NBudgetError::Configuration(format!("settings are malformed: {err}")))
    }

    /// Parses settings from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Configuration`] if the string is not valid
    /// JSON or fails [`Settings::from_value`].
    #[inline]
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| NBudgetError::Configuration(format!("settings are malformed: {err}")))?;
        Self::from_value(value)
    }

    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Io`] if the file cannot be read, or
    /// [`NBudgetError::Configuration`] if its contents are invalid.
    #[inline]
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("reading settings file");
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Writes settings to a JSON file, creating parent directories.
    ///
    /// The file is written to a temporary sibling first and then renamed
    /// into place.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Io`] if the file cannot be written.
    #[inline]
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        tracing::debug!("settings file written");
        Ok(())
    }
}

/// Writes the API key in clear text; settings files must be able to hold it.
fn serialize_secret<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Reads the API key into a [`SecretString`].
fn deserialize_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> core::result::Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}
