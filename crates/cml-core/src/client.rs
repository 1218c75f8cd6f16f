//! Authenticated HTTP session against a CML server.
//!
//! This module owns the token exchange and the request/response plumbing
//! shared by every lab and topology operation.

use crate::config::SessionConfig;
use crate::error::{CmlError, Result};
use crate::model::ApiErrorBody;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use url::Url;

/// Number of token characters safe to show in logs.
const TOKEN_LOG_PREFIX: usize = 10;

/// An authenticated handle to one CML server.
///
/// Created by [`Session::initialize`]. Every operation in this crate is a
/// method on `&Session`, so callers decide where the session lives and how
/// long it is reused.
pub struct Session {
    http: Client,
    config: SessionConfig,
    token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url.as_str())
            .field("username", &self.config.username)
            .field("verify_tls", &self.config.verify_tls)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build an HTTP client and exchange the credentials for a token.
    ///
    /// Any failure here (unreachable host, rejected credentials, TLS
    /// validation) is reported as [`CmlError::AuthenticationFailed`].
    pub async fn initialize(config: SessionConfig) -> Result<Self> {
        if !config.verify_tls {
            tracing::warn!(
                base_url = %config.base_url,
                "TLS certificate verification disabled"
            );
        }

        let http = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CmlError::AuthenticationFailed(format!("cannot build HTTP client: {e}")))?;

        tracing::info!(base_url = %config.base_url, username = %config.username, "Authenticating with CML");

        let endpoint = config.api_url("authenticate");
        let resp = http
            .post(&endpoint)
            .json(&serde_json::json!({
                "username": config.username,
                "password": config.password,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Authentication request failed");
                CmlError::AuthenticationFailed(format!(
                    "cannot reach {}: {}",
                    config.base_url,
                    describe_transport(&e)
                ))
            })?;

        let resp = check_status(resp).await.map_err(|e| match e {
            CmlError::Remote {
                status, message, ..
            } => CmlError::AuthenticationFailed(format!("server rejected credentials ({status}): {message}")),
            other => CmlError::AuthenticationFailed(other.to_string()),
        })?;

        let text = resp
            .text()
            .await
            .map_err(|e| CmlError::AuthenticationFailed(format!("cannot read token: {e}")))?;
        let token = parse_token(&text)
            .ok_or_else(|| CmlError::AuthenticationFailed("server returned an empty token".into()))?;

        tracing::debug!(
            token_prefix = %token.chars().take(TOKEN_LOG_PREFIX).collect::<String>(),
            "Token received"
        );

        let session = Self {
            http,
            config,
            token,
        };
        session.verify_token().await;

        tracing::info!(base_url = %session.config.base_url, "Authentication successful");
        Ok(session)
    }

    /// Probe `authok` with the new token. Only logs on failure.
    async fn verify_token(&self) {
        match self.send(Method::GET, "authok").await {
            Ok(_) => tracing::debug!("Token verified"),
            Err(e) => tracing::warn!(error = %e, "Token verification failed"),
        }
    }

    /// Base URL of the server this session talks to.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Username the session authenticated as.
    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// Whether TLS certificates are verified.
    pub fn verify_tls(&self) -> bool {
        self.config.verify_tls
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.api_url(path))
            .bearer_auth(&self.token)
    }

    /// Send a request without a body and return the checked response.
    pub(crate) async fn send(&self, method: Method, path: &str) -> Result<Response> {
        tracing::debug!(%method, path, "CML request");
        let resp = self.request(method, path).send().await?;
        check_status(resp).await
    }

    /// Send a JSON body and return the checked response.
    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        tracing::debug!(%method, path, "CML request with body");
        let resp = self.request(method, path).json(body).send().await?;
        check_status(resp).await
    }

    /// Decode a checked response body as `T`.
    pub(crate) async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let endpoint = resp.url().path().to_string();
        let text = resp.text().await?;
        tracing::trace!(endpoint = %endpoint, body = %text, "CML response body");
        serde_json::from_str(&text)
            .map_err(|e| CmlError::unexpected(endpoint, format!("cannot decode response: {e}")))
    }
}

/// Turn any non-2xx response into [`CmlError::Remote`] with the server's message.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let endpoint = resp.url().path().to_string();
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::debug!(status = status.as_u16(), endpoint = %endpoint, message = %message, "CML error response");
    Err(CmlError::remote(status.as_u16(), endpoint, message))
}

/// Extract a human-readable message from a CML error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ApiErrorBody>(body) {
        return err.description;
    }
    if let Ok(serde_json::Value::String(s)) = serde_json::from_str::<serde_json::Value>(body) {
        return s;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

/// The authenticate endpoint returns the token as a JSON string.
fn parse_token(body: &str) -> Option<String> {
    let token = serde_json::from_str::<String>(body)
        .unwrap_or_else(|_| body.trim().trim_matches('"').to_string());
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn describe_transport(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out ({e})")
    } else if e.is_connect() {
        format!("connection failed ({e})")
    } else {
        e.to_string()
    }
}

/// Reject ids that would change the request path once interpolated.
pub(crate) fn check_path_id(field: &str, value: &str) -> Result<()> {
    let bad_char = value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | '?' | '#' | '%'));
    if value.is_empty() || value == "." || value == ".." || bad_char {
        return Err(CmlError::InvalidInput(format!(
            "{field} is not a valid path segment: {value:?}"
        )));
    }
    Ok(())
}
