//! Blocking transport seam between the controller and the Notion API.
//!
//! The controller only sees [`Transport::send`], so tests can swap the
//! reqwest-backed [`HttpTransport`] for a scripted fake.

mod http;

pub use http::{HttpTransport, HttpTransportBuilder};

use serde_json::Value;

use crate::error::Result;

/// Base URL for the Notion API.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2021-05-13";

/// User agent sent with every request. The API rejects empty agents.
pub const USER_AGENT: &str = concat!("nbudget-rs/", env!("CARGO_PKG_VERSION"));

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
}

impl Method {
    /// Returns the method name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// An API request relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a `GET` request without a body.
    #[inline]
    #[must_use]
    pub fn get<T: Into<String>>(path: T) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// Creates a `POST` request with a JSON body.
    #[inline]
    #[must_use]
    pub fn post<T: Into<String>>(path: T, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    /// Schema of a database.
    #[inline]
    #[must_use]
    pub fn database(database_id: &str) -> Self {
        Self::get(format!("/databases/{database_id}"))
    }

    /// One page of a database query.
    #[inline]
    #[must_use]
    pub fn query(database_id: &str, body: Value) -> Self {
        Self::post(format!("/databases/{database_id}/query"), body)
    }

    /// Page creation.
    #[inline]
    #[must_use]
    pub fn create_page(body: Value) -> Self {
        Self::post("/pages", body)
    }
}

/// Status and body of a response, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a response.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(status: u16, body: T) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Sends API requests and returns raw responses.
///
/// Implementations report only failures to obtain a response (connection,
/// DNS, TLS, timeouts) as errors. Any response, whatever its status, is
/// returned as a [`RawResponse`] for the classifier.
pub trait Transport: core::fmt::Debug {
    /// Sends `request` and waits for the response.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NBudgetError::Transport`] if no response was
    /// received.
    fn send(&self, request: &ApiRequest) -> Result<RawResponse>;
}
