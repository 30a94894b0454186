//! Service configuration and environment variable handling.

use std::env;
use std::fmt;
use std::net::SocketAddr;

/// Username bound to the static API token.
pub const API_USERNAME: &str = "appuser";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Process-wide service configuration loaded from environment variables.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// The single accepted API token
    pub api_token: String,
}

impl ServiceConfig {
    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `API_TOKEN` (required): the static token expected in the `API_TOKEN` header
    /// - `HOST` (optional, default: 0.0.0.0): bind host
    /// - `PORT` (optional, default: 5000): bind port
    ///
    /// Database selection is read separately by the repository factory.
    ///
    /// # Errors
    /// Returns an error if `API_TOKEN` is unset or empty, or `PORT` is not a port number.
    pub fn from_env() -> Result<Self, String> {
        let api_token = env::var("API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "API_TOKEN environment variable not set".to_string())?;
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host,
            port,
            api_token,
        })
    }

    /// Create a configuration with default host and port.
    pub fn with_token(api_token: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_token: api_token.into(),
        }
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}

// Keep the token out of logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let config = ServiceConfig::with_token("super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_bind_addr() {
        let mut config = ServiceConfig::with_token("t");
        assert_eq!(config.bind_addr().unwrap().port(), 5000);
        config.host = "not a host".to_string();
        assert!(config.bind_addr().is_err());
    }
}
