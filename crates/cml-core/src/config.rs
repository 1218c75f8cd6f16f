//! Session configuration types.

use crate::error::CmlError;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a CML server.
#[derive(Clone)]
pub struct SessionConfig {
    /// Normalized base URL (scheme included, no trailing slash).
    pub base_url: Url,
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
    /// Verify the server's TLS certificate (default: true).
    pub verify_tls: bool,
    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
}

// Hand-written so the password never lands in logs.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SessionConfig {
    /// Create a new config builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Build the absolute URL for an API path such as `labs/abc/start`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v0/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Prepend `https://` when the scheme is missing and drop trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<Url, CmlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CmlError::InvalidInput("base_url is required".into()));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(with_scheme.trim_end_matches('/'))
        .map_err(|e| CmlError::InvalidInput(format!("invalid base_url `{raw}`: {e}")))?;

    if url.host_str().is_none() {
        return Err(CmlError::InvalidInput(format!(
            "invalid base_url `{raw}`: missing host"
        )));
    }

    Ok(url)
}

/// Builder for SessionConfig.
#[derive(Debug)]
pub struct SessionConfigBuilder {
    base_url: String,
    username: String,
    password: String,
    verify_tls: bool,
    timeout: Duration,
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SessionConfigBuilder {
    /// Set the server URL. A missing scheme defaults to https.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the configuration, validating all required fields.
    pub fn build(self) -> Result<SessionConfig, CmlError> {
        let base_url = normalize_base_url(&self.base_url)?;
        if self.username.trim().is_empty() {
            return Err(CmlError::InvalidInput("username is required".into()));
        }
        if self.password.is_empty() {
            return Err(CmlError::InvalidInput("password is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(CmlError::InvalidInput("timeout must be > 0".into()));
        }
        Ok(SessionConfig {
            base_url,
            username: self.username,
            password: self.password,
            verify_tls: self.verify_tls,
            timeout: self.timeout,
        })
    }
}
