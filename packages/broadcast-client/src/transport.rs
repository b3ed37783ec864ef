//! Resilient HTTP transport.
//!
//! Wraps a single backend call with a per-attempt timeout and a bounded retry
//! budget. The retry rules distinguish "the server told us no" from "we don't
//! know":
//!
//! - 429 is returned to the caller immediately with no further attempts; the
//!   server is load-shedding or deduplicating, so re-sending is unsafe.
//! - Any other non-2xx response is retried with a byte-identical request
//!   (same body, same headers, same idempotency key); the final attempt's
//!   response is handed back whatever its status.
//! - A timeout or connection fault is swallowed on non-final attempts and
//!   propagates only when the budget is exhausted.
//!
//! The transport is stateless between calls and holds no job state.

use std::time::Duration;

use reqwest::{Method, Request, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::error::{ClientError, Result};

const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// The 403 reason code meaning "target account not logged in".
const SESSION_NOT_AUTHORIZED: &str = "session_not_authorized";

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

pub struct Transport {
    client: reqwest::Client,
    base_url: String,
    admin_token: String,
}

impl Transport {
    /// `base_url` without a trailing slash, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>, admin_token: impl Into<String>) -> Result<Self> {
        // Timeouts are applied per attempt, not on the client.
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_token: admin_token.into(),
        })
    }

    /// Whether a credential is present at all. Presence is checked before any
    /// I/O; validity is only known from a 401.
    pub fn has_token(&self) -> bool {
        !self.admin_token.is_empty()
    }

    fn builder(&self, method: Method, path: &str, query: &[(&str, &str)]) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(ADMIN_TOKEN_HEADER, &self.admin_token)
            .query(query)
    }

    /// Run one logical call with up to `max_attempts` identical attempts,
    /// each under its own `timeout`. Returns the response of the first
    /// success, the first 429, or the final attempt.
    pub async fn execute(
        &self,
        request: Request,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Response> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let final_attempt = attempt >= max_attempts;

            // Re-sends must be byte-identical, so every attempt is a clone of
            // the original request.
            let attempt_req = request
                .try_clone()
                .ok_or(ClientError::Validation("request body is not replayable"))?;

            match tokio::time::timeout(timeout, self.client.execute(attempt_req)).await {
                Ok(Ok(response)) => {
                    let status = response.status();
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        return Ok(response);
                    }
                    if status.is_success() || final_attempt {
                        return Ok(response);
                    }
                    tracing::warn!(%status, attempt, "request failed, retrying");
                }
                Ok(Err(err)) => {
                    if final_attempt {
                        return Err(ClientError::Network(err));
                    }
                    tracing::warn!(error = %err, attempt, "network fault, retrying");
                }
                Err(_elapsed) => {
                    if final_attempt {
                        return Err(ClientError::Timeout { waited: timeout });
                    }
                    tracing::warn!(
                        attempt,
                        timeout_ms = timeout.as_millis() as u64,
                        "attempt timed out, retrying"
                    );
                }
            }
        }
    }

    /// Map a completed response onto the error taxonomy.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Auth),
            StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimited),
            StatusCode::FORBIDDEN => {
                // Only the documented reason code gets the distinct kind; any
                // other 403 is a generic API failure.
                match response.json::<ErrorDetail>().await {
                    Ok(detail) if detail.detail == SESSION_NOT_AUTHORIZED => {
                        Err(ClientError::Permission)
                    }
                    Ok(detail) => Err(ClientError::Api {
                        status: status.as_u16(),
                        message: detail.detail,
                    }),
                    Err(_) => Err(ClientError::Api {
                        status: status.as_u16(),
                        message: String::new(),
                    }),
                }
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<T> {
        let request = self.builder(Method::GET, path, query).build()?;
        let response = self.execute(request, timeout, max_attempts).await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// GET where only the status matters; the body is discarded.
    pub async fn get_ok(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<()> {
        let request = self.builder(Method::GET, path, query).build()?;
        let response = self.execute(request, timeout, max_attempts).await?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<T> {
        let request = self.builder(Method::POST, path, &[]).json(body).build()?;
        let response = self.execute(request, timeout, max_attempts).await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}
