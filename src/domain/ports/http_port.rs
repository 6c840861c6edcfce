//! HTTP download port definition.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::domain::errors::HttpError;

/// A GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Target URL.
    pub url: Url,
    /// Extra request headers.
    pub headers: HeaderMap,
}

impl HttpRequest {
    /// Creates a request without extra headers.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Adds a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// URL that answered; differs from the request only for ports that
    /// follow redirects themselves.
    pub url: Url,
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body bytes.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true for 2xx and 3xx statuses.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status < 400
    }
}

/// Port for downloading resources.
///
/// Implementations retry transient failures and cap the body size
/// themselves. Redirects may be returned as 3xx responses so callers can
/// keep their own cookies across hops.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpPort: Send + Sync {
    /// Performs a GET request.
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}


#[cfg(test)]
mod tests {
    use super::mock::{Route, RoutedHttp};
    use super::*;

    #[tokio::test]
    async fn test_routed_http_serves_routes() -> Result<(), Box<dyn std::error::Error>> {
        let http = RoutedHttp::new().route("https://example.com/", Route::ok("hello"));

        let response = http
            .get(HttpRequest::new(Url::parse("https://example.com/")?))
            .await?;

        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"hello");
        assert_eq!(http.request_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_routed_http_unknown_url_fails() -> Result<(), Box<dyn std::error::Error>> {
        let http = RoutedHttp::new();

        let result = http
            .get(HttpRequest::new(Url::parse("https://example.com/")?))
            .await;

        assert!(matches!(result, Err(HttpError::Network { .. })));
        Ok(())
    }

    #[test]
    fn test_is_ok_range() {
        let response = |status| HttpResponse {
            url: Url::parse("https://example.com/").unwrap(),
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };

        assert!(response(200).is_ok());
        assert!(response(302).is_ok());
        assert!(response(399).is_ok());
        assert!(!response(199).is_ok());
        assert!(!response(404).is_ok());
        assert!(!response(500).is_ok());
    }
}
