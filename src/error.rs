//! Error types for the nbudget client library.

/// All errors that can occur when using the nbudget client.
#[derive(Debug, thiserror::Error)]
pub enum NBudgetError {
    /// Settings are missing a key, are malformed, or a required client
    /// part was not supplied.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The configured date input format lacks one of `D`, `M` or `Y`.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    /// The date string has fewer fields than the date format demands.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The date components do not form a valid calendar date.
    #[error("date out of range: {0}")]
    InvalidDateRange(String),

    /// The record amount is NaN or infinite.
    #[error("amount must be a finite number: {0}")]
    InvalidAmount(f64),

    /// A tag is not one of the options of the database's tag column.
    #[error("tag does not exist in the database: \"{tag}\", use one of these: {}", .valid.join(", "))]
    InvalidTag {
        /// The rejected tag.
        tag: String,
        /// All tags the database accepts.
        valid: Vec<String>,
    },

    /// The database schema returned by the API has an unexpected shape.
    #[error("could not parse API response: {0}")]
    ApiParsing(String),

    /// The API accepted the request but rejected it semantically.
    #[error("API error ({status}): {code} -> {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code reported by the API.
        code: String,
        /// Error message reported by the API.
        message: String,
    },

    /// The API could not be reached, or answered with a non-JSON failure.
    #[error("transport error{}: {message}", .status.map(|code| format!(" ({code})")).unwrap_or_default())]
    Transport {
        /// HTTP status code, absent when no response was received.
        status: Option<u16>,
        /// Human-readable description of the failure.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the settings file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NBudgetError {
    /// Returns the stable name of the error category, as shown to users
    /// when errors are reported instead of propagated.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match *self {
            Self::Configuration(_) => "ConfigurationError",
            Self::InvalidDateFormat(_) => "InvalidDateFormat",
            Self::InvalidDate(_) => "InvalidDate",
            Self::InvalidDateRange(_) => "InvalidDateRange",
            Self::InvalidAmount(_) => "InvalidAmount",
            Self::InvalidTag { .. } => "InvalidTag",
            Self::ApiParsing(_) => "APIParsingError",
            Self::Api { .. } => "APIError",
            Self::Transport { .. } => "TransportError",
            Self::Serialization(_) => "SerializationError",
            Self::Io(_) => "IoError",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, NBudgetError>;
