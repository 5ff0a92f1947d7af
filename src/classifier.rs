//! Classification of raw API responses.
//!
//! Every remote call goes through [`classify`], which either yields the
//! parsed JSON body or sorts the failure into a structured API error or a
//! transport error.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{NBudgetError, Result};
use crate::transport::RawResponse;

/// Message for a 403 without an API error body, usually a blocked client.
const FORBIDDEN_HINT: &str = "Check the User-Agent header if you have modified the client";

/// Parses a successful response, or classifies a failed one.
///
/// # Errors
///
/// - [`NBudgetError::Api`] if the body is a JSON object with string `code`
///   and `message` fields.
/// - [`NBudgetError::Transport`] for any other failure status; a 403
///   carries a hint about the client identity.
/// - [`NBudgetError::Serialization`] if a 2xx body is not valid JSON.
#[inline]
#[tracing::instrument(skip_all, fields(status = response.status))]
pub fn classify(response: RawResponse) -> Result<Value> {
    if response.is_success() {
        tracing::trace!(body_len = response.body.len(), "parsing response body");
        return serde_json::from_str(&response.body).map_err(NBudgetError::from);
    }

    if let Some((code, message)) = api_error_fields(&response.body) {
        tracing::debug!(code = %code, "API error");
        return Err(NBudgetError::Api {
            status: response.status,
            code,
            message,
        });
    }

    tracing::debug!("HTTP error without API body");
    let message = if response.status == StatusCode::FORBIDDEN.as_u16() {
        FORBIDDEN_HINT.to_owned()
    } else {
        reason_phrase(response.status)
    };
    Err(NBudgetError::Transport {
        status: Some(response.status),
        message,
    })
}

/// Extracts `code` and `message` from a JSON error body.
fn api_error_fields(body: &str) -> Option<(String, String)> {
    let value: Value = serde_json::from_str(body).ok()?;
    let code = value.get("code")?.as_str()?;
    let message = value.get("message")?.as_str()?;
    Some((code.to_owned(), message.to_owned()))
}

/// Canonical reason phrase for a status, or the bare number.
fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| status.to_string(), ToOwned::to_owned)
}
