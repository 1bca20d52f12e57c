use std::env;

use thiserror::Error;
use url::Url;

pub const DEFAULT_RPC_PATH: &str = "/nislsc/call";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub chassis: String,
    pub rpc_path: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SLSC_CHASSIS is required and must not be empty")]
    MissingChassis,
    #[error("SLSC_RPC_PATH must start with '/'")]
    InvalidRpcPath,
    #[error("invalid chassis endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ClientConfig {
    pub fn new(chassis: impl Into<String>) -> Self {
        Self {
            chassis: chassis.into(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let chassis = env::var("SLSC_CHASSIS")
            .ok()
            .map(|chassis| chassis.trim().to_string())
            .filter(|chassis| !chassis.is_empty())
            .ok_or(ConfigError::MissingChassis)?;

        let rpc_path = env::var("SLSC_RPC_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| {
                if value.starts_with('/') {
                    Ok(value)
                } else {
                    Err(ConfigError::InvalidRpcPath)
                }
            })
            .transpose()?
            .unwrap_or_else(|| DEFAULT_RPC_PATH.to_string());

        let config = Self { chassis, rpc_path };

        let _ = config.endpoint()?;
        Ok(config)
    }

    /// `http://<chassis><rpc_path>`; the chassis is a host name or address, optionally
    /// with a port, and nothing else.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let raw = format!("http://{}{}", self.chassis, self.rpc_path);

        let chassis = self.chassis.trim();
        if chassis.is_empty() || chassis.contains(['/', '?', '#', '@']) {
            return Err(ConfigError::InvalidEndpoint(raw));
        }

        let url = Url::parse(&raw).map_err(|_| ConfigError::InvalidEndpoint(raw.clone()))?;

        if url.host_str().map_or(true, str::is_empty) || url.path() != self.rpc_path {
            return Err(ConfigError::InvalidEndpoint(raw));
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both env vars are touched in one test so parallel tests never race on them.
    #[test]
    fn parse_from_env() {
        env::remove_var("SLSC_CHASSIS");
        env::remove_var("SLSC_RPC_PATH");
        let err = ClientConfig::from_env().expect_err("expected missing chassis error");
        assert!(matches!(err, ConfigError::MissingChassis));

        env::set_var("SLSC_CHASSIS", "  SLSC-12001-TSE ");
        let config = ClientConfig::from_env().expect("config should parse");
        assert_eq!(config.chassis, "SLSC-12001-TSE");
        assert_eq!(config.rpc_path, DEFAULT_RPC_PATH);

        env::set_var("SLSC_RPC_PATH", "/custom/call");
        let config = ClientConfig::from_env().expect("config should parse");
        assert_eq!(config.rpc_path, "/custom/call");

        env::set_var("SLSC_CHASSIS", "SLSC-12001-TSE/extra");
        let err = ClientConfig::from_env().expect_err("expected invalid endpoint error");
        assert!(matches!(err, ConfigError::InvalidEndpoint(_)));
        env::set_var("SLSC_CHASSIS", "SLSC-12001-TSE");

        env::set_var("SLSC_RPC_PATH", "custom/call");
        let err = ClientConfig::from_env().expect_err("expected invalid path error");
        assert!(matches!(err, ConfigError::InvalidRpcPath));

        env::remove_var("SLSC_CHASSIS");
        env::remove_var("SLSC_RPC_PATH");
    }

    #[test]
    fn endpoint_uses_default_path() {
        let endpoint = ClientConfig::new("SLSC-12001-TSE")
            .endpoint()
            .expect("valid endpoint");
        assert_eq!(endpoint.as_str(), "http://slsc-12001-tse/nislsc/call");
    }

    #[test]
    fn endpoint_keeps_port() {
        let endpoint = ClientConfig::new("127.0.0.1:8080")
            .endpoint()
            .expect("valid endpoint");
        assert_eq!(endpoint.as_str(), "http://127.0.0.1:8080/nislsc/call");
    }

    #[test]
    fn endpoint_rejects_garbage() {
        let err = ClientConfig::new("bad host name")
            .endpoint()
            .expect_err("expected invalid endpoint");
        assert!(matches!(err, ConfigError::InvalidEndpoint(_)));
    }

    #[test]
    fn endpoint_rejects_empty_chassis() {
        for chassis in ["", "   "] {
            let err = ClientConfig::new(chassis)
                .endpoint()
                .expect_err("expected invalid endpoint");
            assert!(matches!(err, ConfigError::InvalidEndpoint(_)));
        }
    }

    #[test]
    fn endpoint_rejects_chassis_with_path_or_query() {
        for chassis in ["host/extra", "host?x=1", "host#frag", "user@host"] {
            let err = ClientConfig::new(chassis)
                .endpoint()
                .expect_err("expected invalid endpoint");
            assert!(matches!(err, ConfigError::InvalidEndpoint(_)), "{chassis}");
        }
    }

    #[test]
    fn endpoint_rejects_rpc_path_that_is_rewritten() {
        let config = ClientConfig {
            chassis: "host".to_string(),
            rpc_path: "/nislsc/../call".to_string(),
        };
        let err = config.endpoint().expect_err("expected invalid endpoint");
        assert!(matches!(err, ConfigError::InvalidEndpoint(_)));
    }
}
