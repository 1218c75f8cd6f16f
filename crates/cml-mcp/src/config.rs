//! Configuration for the MCP server.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use cml_core::{CmlError, SessionConfig, DEFAULT_TIMEOUT};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Maximum length of any string tool argument, in bytes.
pub const MAX_FIELD_LENGTH: usize = 4096;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Stdio only (default - for local AI tools like Claude Desktop)
    #[default]
    Stdio,
    /// Streamable HTTP only (for remote AI agents)
    Http,
    /// Both stdio and HTTP
    Both,
}

impl TransportMode {
    /// Parse from string (case-insensitive). Unknown values fall back to stdio.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "http" | "sse" | "remote" => Self::Http,
            "both" => Self::Both,
            _ => Self::Stdio,
        }
    }

    /// Check if stdio transport should be enabled.
    pub fn stdio_enabled(&self) -> bool {
        matches!(self, Self::Stdio | Self::Both)
    }

    /// Check if HTTP transport should be enabled.
    pub fn http_enabled(&self) -> bool {
        matches!(self, Self::Http | Self::Both)
    }
}

/// Configuration for the CML MCP server.
#[derive(Clone)]
pub struct CmlMcpConfig {
    /// CML server URL used to open a session at startup.
    pub cml_url: Option<String>,

    /// Username for the startup session.
    pub cml_username: Option<String>,

    /// Password for the startup session.
    pub cml_password: Option<String>,

    /// Verify TLS certificates for the startup session (default: true).
    pub verify_ssl: bool,

    /// Per-request timeout for every session (default: 30s).
    pub request_timeout: Duration,

    /// Transport mode (default: stdio).
    pub transport_mode: TransportMode,

    /// HTTP server bind address.
    pub http_addr: SocketAddr,
}

// Hand-written so the password never lands in logs.
impl fmt::Debug for CmlMcpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmlMcpConfig")
            .field("cml_url", &self.cml_url)
            .field("cml_username", &self.cml_username)
            .field("cml_password", &self.cml_password.as_ref().map(|_| "<redacted>"))
            .field("verify_ssl", &self.verify_ssl)
            .field("request_timeout", &self.request_timeout)
            .field("transport_mode", &self.transport_mode)
            .field("http_addr", &self.http_addr)
            .finish()
    }
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("incomplete CML credentials: missing {0}")]
    IncompleteCredentials(&'static str),

    #[error("invalid CML settings: {0}")]
    InvalidSession(#[from] CmlError),
}

impl Default for CmlMcpConfig {
    fn default() -> Self {
        Self {
            cml_url: None,
            cml_username: None,
            cml_password: None,
            verify_ssl: true,
            request_timeout: DEFAULT_TIMEOUT,
            transport_mode: TransportMode::Stdio,
            http_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8000),
        }
    }
}

/// Parse a boolean flag; anything other than `false`/`0`/`no`/`off` is true.
fn parse_flag(v: &str) -> bool {
    !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off")
}

impl CmlMcpConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CML_URL` | unset |
    /// | `CML_USERNAME` | unset |
    /// | `CML_PASSWORD` | unset |
    /// | `CML_VERIFY_SSL` | `true` |
    /// | `CML_TIMEOUT_SECS` | `30` |
    /// | `CML_MCP_TRANSPORT` | `stdio` (stdio, http, both) |
    /// | `MCP_HOST` | `0.0.0.0` |
    /// | `MCP_PORT` | `8000` |
    pub fn from_env() -> Self {
        let default = Self::default();

        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let http_host: IpAddr = std::env::var("MCP_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.http_addr.ip());

        let http_port: u16 = std::env::var("MCP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.http_addr.port());

        Self {
            cml_url: non_empty("CML_URL"),
            cml_username: non_empty("CML_USERNAME"),
            cml_password: non_empty("CML_PASSWORD"),
            verify_ssl: std::env::var("CML_VERIFY_SSL")
                .map(|v| parse_flag(&v))
                .unwrap_or(default.verify_ssl),
            request_timeout: std::env::var("CML_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(default.request_timeout),
            transport_mode: std::env::var("CML_MCP_TRANSPORT")
                .map(|v| TransportMode::parse(&v))
                .unwrap_or(default.transport_mode),
            http_addr: SocketAddr::new(http_host, http_port),
        }
    }

    /// Session settings for a startup login, if credentials were configured.
    ///
    /// Returns `Ok(None)` when none of URL, username and password are set.
    pub fn startup_session(&self) -> Result<Option<SessionConfig>, ConfigError> {
        let (url, user, pass) = match (&self.cml_url, &self.cml_username, &self.cml_password) {
            (None, None, None) => return Ok(None),
            (Some(u), Some(n), Some(p)) => (u, n, p),
            (None, _, _) => return Err(ConfigError::IncompleteCredentials("CML_URL")),
            (_, None, _) => return Err(ConfigError::IncompleteCredentials("CML_USERNAME")),
            (_, _, None) => return Err(ConfigError::IncompleteCredentials("CML_PASSWORD")),
        };

        let config = SessionConfig::builder()
            .base_url(url.as_str())
            .username(user.as_str())
            .password(pass.as_str())
            .verify_tls(self.verify_ssl)
            .timeout(self.request_timeout)
            .build()?;
        Ok(Some(config))
    }

    /// Validate configuration but only log warnings instead of failing.
    pub fn validate_warn(&self) {
        if let Err(e) = self.startup_session() {
            tracing::warn!(error = %e, "Startup session disabled");
        }
        if !self.verify_ssl {
            tracing::warn!("CML_VERIFY_SSL is off; self-signed certificates will be accepted");
        }
    }
}
