//! reqwest-backed transport.

use core::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret as _, SecretString};

use super::{ApiRequest, DEFAULT_BASE_URL, Method, NOTION_VERSION, RawResponse, Transport, USER_AGENT};
use crate::error::{NBudgetError, Result};
use crate::settings::Settings;

/// Header carrying the API version.
const NOTION_VERSION_HEADER: &str = "Notion-Version";

/// Builder for constructing an [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    /// Integration token for API authentication.
    token: Option<SecretString>,
    /// Base URL override (for testing).
    base_url: Option<String>,
    /// Per-request timeout.
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Sets the integration token for API authentication.
    #[inline]
    #[must_use]
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Overrides the base URL (useful for testing with a mock server).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a timeout for each request. No timeout is applied by default.
    #[inline]
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Configuration`] if no token was provided.
    /// Returns [`NBudgetError::Transport`] if the HTTP client fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<HttpTransport> {
        let token = self
            .token
            .ok_or_else(|| NBudgetError::Configuration("API token is required".to_owned()))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        tracing::debug!(base_url = %base_url, "building transport");

        let mut http = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(|err| transport_error(&err))?;

        Ok(HttpTransport {
            http,
            token,
            base_url,
        })
    }
}

/// Blocking HTTP transport for the Notion API.
///
/// Use [`HttpTransport::builder()`] or [`HttpTransport::from_settings`] to
/// construct an instance.
#[derive(Debug)]
pub struct HttpTransport {
    /// Underlying HTTP client.
    http: reqwest::blocking::Client,
    /// Bearer integration token.
    token: SecretString,
    /// API base URL, without a trailing slash.
    base_url: String,
}

impl HttpTransport {
    /// Creates a new builder for configuring the transport.
    #[inline]
    #[must_use]
    pub const fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder {
            token: None,
            base_url: None,
            timeout: None,
        }
    }

    /// Builds a transport authenticated with the settings' API key.
    ///
    /// # Errors
    ///
    /// Returns [`NBudgetError::Transport`] if the HTTP client fails to build.
    #[inline]
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::builder()
            .token(settings.api_key.expose_secret())
            .build()
    }
}

impl Transport for HttpTransport {
    #[inline]
    #[tracing::instrument(skip_all, fields(method = request.method.as_str(), path = %request.path))]
    fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::trace!(url = %url, "sending request");
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        }
        .header(
            AUTHORIZATION,
            format!("Bearer {}", self.token.expose_secret()),
        )
        .header(NOTION_VERSION_HEADER, NOTION_VERSION)
        .header(CONTENT_TYPE, "application/json");
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|err| transport_error(&err))?;
        let status = response.status().as_u16();
        tracing::debug!(status, "received response");
        let body = response.text().map_err(|err| transport_error(&err))?;
        tracing::trace!(body_len = body.len(), "read response body");
        Ok(RawResponse { status, body })
    }
}

/// Maps a reqwest failure to a transport error.
fn transport_error(err: &reqwest::Error) -> NBudgetError {
    NBudgetError::Transport {
        status: err.status().map(|status| status.as_u16()),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn start_server(runtime: &tokio::runtime::Runtime) -> MockServer {
        runtime.block_on(MockServer::start())
    }

    #[test]
    fn builder_requires_token() {
        let result = HttpTransport::builder().build();
        assert!(matches!(result, Err(NBudgetError::Configuration(_))));
    }

    #[test]
    fn builder_with_token_succeeds() {
        let transport = HttpTransport::builder().token("secret").build().unwrap();
        assert_eq!(transport.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn builder_custom_base_url_drops_trailing_slash() {
        let transport = HttpTransport::builder()
            .token("secret")
            .base_url("http://localhost:8080/")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(transport.base_url, "http://localhost:8080");
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let transport = HttpTransport::builder().token("top-secret").build().unwrap();
        assert!(!format!("{transport:?}").contains("top-secret"));
    }

    #[test]
    fn get_sends_identity_headers() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = start_server(&runtime);
        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/databases/db-1"))
                .and(header("Authorization", "Bearer secret"))
                .and(header("Notion-Version", NOTION_VERSION))
                .and(header("User-Agent", USER_AGENT))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
                .expect(1)
                .mount(&server),
        );

        let transport = HttpTransport::builder()
            .token("secret")
            .base_url(server.uri())
            .build()
            .unwrap();
        let response = transport.send(&ApiRequest::database("db-1")).unwrap();
        assert_eq!(response, RawResponse::new(200, r#"{"ok":true}"#));
        runtime.block_on(server.verify());
    }

    #[test]
    fn post_sends_json_body() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = start_server(&runtime);
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/databases/db-1/query"))
                .and(header("Content-Type", "application/json"))
                .and(body_json(json!({"page_size": 100})))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":[]}"#))
                .expect(1)
                .mount(&server),
        );

        let transport = HttpTransport::builder()
            .token("secret")
            .base_url(server.uri())
            .build()
            .unwrap();
        let request = ApiRequest::query("db-1", json!({"page_size": 100}));
        let response = transport.send(&request).unwrap();
        assert!(response.is_success());
        assert_eq!(response.body, r#"{"results":[]}"#);
    }

    #[test]
    fn error_statuses_are_returned_unclassified() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = start_server(&runtime);
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/pages"))
                .respond_with(
                    ResponseTemplate::new(400)
                        .set_body_string(r#"{"code":"validation_error","message":"bad"}"#),
                )
                .mount(&server),
        );

        let transport = HttpTransport::builder()
            .token("secret")
            .base_url(server.uri())
            .build()
            .unwrap();
        let response = transport.send(&ApiRequest::create_page(json!({}))).unwrap();
        assert_eq!(response.status, 400);
        assert!(response.body.contains("validation_error"));
    }

    #[test]
    fn unreachable_server_is_transport_error() {
        let transport = HttpTransport::builder()
            .token("secret")
            .base_url("http://127.0.0.1:1")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let err = transport.send(&ApiRequest::database("db")).unwrap_err();
        assert!(matches!(err, NBudgetError::Transport { status: None, .. }));
    }
}
