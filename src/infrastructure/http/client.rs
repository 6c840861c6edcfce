//! reqwest-backed download client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::{Client, StatusCode, redirect};
use tracing::{debug, warn};

use crate::domain::errors::HttpError;
use crate::domain::ports::{HttpPort, HttpRequest, HttpResponse};
use crate::infrastructure::config::DownloadConfig;

const BACKOFF_BASE: Duration = Duration::from_millis(250);
const BACKOFF_MAX: Duration = Duration::from_secs(8);

/// Download client with retries and a body size cap.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: u32,
    max_size: u64,
    backoff_base: Duration,
}

impl HttpClient {
    /// Creates a client from download settings.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &DownloadConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::none())
            .gzip(true)
            .build()
            .map_err(|e| HttpError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            retry: config.retry,
            max_size: config.max_size,
            backoff_base: BACKOFF_BASE,
        })
    }

    /// Overrides the first retry delay; later ones double.
    #[must_use]
    pub const fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut response = self
            .client
            .get(request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if response
            .content_length()
            .is_some_and(|length| length > self.max_size)
        {
            return Err(HttpError::TooLarge {
                limit: self.max_size,
            });
        }

        let url = response.url().clone();
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(map_reqwest_error)? {
            if (body.len() + chunk.len()) as u64 > self.max_size {
                return Err(HttpError::TooLarge {
                    limit: self.max_size,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse {
            url,
            status,
            headers,
            body: body.freeze(),
        })
    }
}

#[async_trait]
impl HttpPort for HttpClient {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        if !matches!(request.url.scheme(), "http" | "https") {
            return Err(HttpError::invalid_url(request.url.as_str()));
        }

        let mut attempt = 0;
        loop {
            match self.attempt(&request).await {
                Ok(response) if attempt < self.retry && is_retryable_status(response.status) => {
                    debug!(url = %request.url, status = response.status, attempt, "Retrying download");
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry && e.is_retryable() => {
                    warn!(url = %request.url, error = %e, attempt, "Download failed, retrying");
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(backoff_delay(self.backoff_base, attempt)).await;
            attempt += 1;
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::timeout(e.to_string())
    } else if e.is_redirect() {
        HttpError::redirect(e.to_string())
    } else {
        HttpError::network(e.to_string())
    }
}

fn is_retryable_status(status: u16) -> bool {
    StatusCode::from_u16(status)
        .is_ok_and(|status| status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS)
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt.min(6)))
        .min(BACKOFF_MAX)
}
