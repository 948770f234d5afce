//! Transport seam and HTTP implementation.
//!
//! Every platform call goes through [`Transport::call`], which takes a method, a
//! fully built URL, the credentials and an optional JSON body, and returns parsed
//! JSON. [`HttpTransport`] implements it with `reqwest`; tests substitute their own.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::config::Credentials;
use crate::error::TransportError;

/// Content type of property patch bodies.
pub const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// HTTP verbs used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read
    Get,
    /// Create or act
    Post,
    /// Partial update
    Patch,
    /// Remove
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Performs one authenticated call and returns the parsed JSON response.
///
/// An empty success body is returned as `Value::Null`. Implementations own
/// timeouts; callers never retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the call.
    async fn call(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    /// HTTP client instance.
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Handle API response and parse JSON.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();

        // A rejected token is answered with a 203 sign-in page rather than a 401.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            error!(status = status.as_u16(), "Authentication failed");
            return Err(TransportError::AuthenticationFailed);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!("API error ({}): {}", status.as_u16(), message);
            return Err(TransportError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, credentials, body), fields(method = %method))]
    async fn call(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.into(), url)
            .basic_auth(&credentials.username, Some(&credentials.token))
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            request = match method {
                Method::Patch => request
                    .header(CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
                    .body(body.to_string()),
                _ => request.json(body),
            };
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }
}

/// Builds request URLs with percent-encoded path segments and query values.
///
/// # Examples
///
/// ```
/// use devops_client::transport::ApiUrl;
///
/// let url = ApiUrl::parse("https://fabrikam.visualstudio.com/DefaultCollection")
///     .unwrap()
///     .segments(&["_apis", "projects"])
///     .query("stateFilter", "All")
///     .api_version("1.0");
/// assert_eq!(
///     url,
///     "https://fabrikam.visualstudio.com/DefaultCollection/_apis/projects?stateFilter=All&api-version=1.0"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ApiUrl {
    url: Url,
}

impl ApiUrl {
    /// Start from a base URL that can carry a path.
    pub fn parse(base: &str) -> Result<Self, TransportError> {
        let url = Url::parse(base).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base, e)))?;
        if url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(format!("{} cannot carry a path", base)));
        }
        Ok(Self { url })
    }

    /// Append path segments, encoding each one.
    pub fn segments(mut self, segments: &[&str]) -> Self {
        if let Ok(mut path) = self.url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Append `api-version` and finish.
    pub fn api_version(self, version: &str) -> String {
        self.query("api-version", version).finish()
    }

    /// Finish without an api-version.
    pub fn finish(self) -> String {
        self.url.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_encodes_segments() {
        let url = ApiUrl::parse("http://localhost/DefaultCollection")
            .unwrap()
            .segments(&["_apis", "identities", "a/b c"])
            .finish();
        assert_eq!(url, "http://localhost/DefaultCollection/_apis/identities/a%2Fb%20c");
    }

    #[test]
    fn test_api_url_handles_trailing_slash() {
        let url = ApiUrl::parse("https://fabrikam.visualstudio.com/")
            .unwrap()
            .segments(&["_apis", "projects", "p1", "properties"])
            .api_version("4.0-preview");
        assert_eq!(
            url,
            "https://fabrikam.visualstudio.com/_apis/projects/p1/properties?api-version=4.0-preview"
        );
    }

    #[test]
    fn test_api_url_encodes_query_values() {
        let url = ApiUrl::parse("http://localhost/")
            .unwrap()
            .segments(&["_apis", "identities"])
            .query("filterValue", "first+last@example.com")
            .finish();
        assert_eq!(url, "http://localhost/_apis/identities?filterValue=first%2Blast%40example.com");
    }

    #[test]
    fn test_api_url_rejects_bad_base() {
        assert!(matches!(ApiUrl::parse("not a url"), Err(TransportError::InvalidUrl(_))));
        assert!(matches!(ApiUrl::parse("mailto:x@y.z"), Err(TransportError::InvalidUrl(_))));
    }
}
