//! Roomdrop service configuration.
//!
//! Configuration is loaded from environment variables. Every field has a
//! default, so the service starts with no environment set at all.

use axum::http::HeaderValue;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default public base URL used when rendering download links.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";

/// Default directory for uploaded file content.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default per-request upload cap in bytes (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 52_428_800;

/// Roomdrop service configuration.
///
/// Loaded from `RD_*` environment variables with sensible defaults.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Base URL clients can reach this service on, used to build download
    /// links. Stored without a trailing slash.
    pub public_base_url: String,

    /// Directory where uploaded file content is written.
    pub upload_dir: PathBuf,

    /// Maximum accepted request body size for uploads, in bytes.
    pub max_upload_bytes: usize,

    /// Origins allowed by CORS. Empty means permissive (any origin),
    /// which suits a share-by-link tool fronted by a browser client.
    pub allowed_origins: Vec<HeaderValue>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid max upload size configuration: {0}")]
    InvalidMaxUploadBytes(String),

    #[error("Invalid allowed origin configuration: {0}")]
    InvalidAllowedOrigin(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("RD_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let public_base_url = vars
            .get("RD_PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string());

        let upload_dir = vars
            .get("RD_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        // Parse upload cap with validation
        let max_upload_bytes = if let Some(value_str) = vars.get("RD_MAX_UPLOAD_BYTES") {
            let value: usize = value_str.parse().map_err(|e| {
                ConfigError::InvalidMaxUploadBytes(format!(
                    "RD_MAX_UPLOAD_BYTES must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidMaxUploadBytes(
                    "RD_MAX_UPLOAD_BYTES must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_MAX_UPLOAD_BYTES
        };

        // Parse the comma-separated origin list, validating each entry as a
        // header value up front so the router never has to.
        let allowed_origins = if let Some(value_str) = vars.get("RD_ALLOWED_ORIGINS") {
            value_str
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(|origin| {
                    origin.parse::<HeaderValue>().map_err(|e| {
                        ConfigError::InvalidAllowedOrigin(format!(
                            "RD_ALLOWED_ORIGINS entry '{}' is not a valid origin: {}",
                            origin, e
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        Ok(Config {
            bind_address,
            public_base_url,
            upload_dir,
            max_upload_bytes,
            allowed_origins,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let vars = base_vars();

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.public_base_url, DEFAULT_PUBLIC_BASE_URL);
        assert_eq!(config.upload_dir, PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("RD_BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert(
            "RD_PUBLIC_BASE_URL".to_string(),
            "https://drop.example.com".to_string(),
        );
        vars.insert("RD_UPLOAD_DIR".to_string(), "/var/lib/roomdrop".to_string());
        vars.insert("RD_MAX_UPLOAD_BYTES".to_string(), "1048576".to_string());
        vars.insert(
            "RD_ALLOWED_ORIGINS".to_string(),
            "https://drop.example.com, https://staging.example.com".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.public_base_url, "https://drop.example.com");
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/roomdrop"));
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(
            config.allowed_origins,
            vec![
                HeaderValue::from_static("https://drop.example.com"),
                HeaderValue::from_static("https://staging.example.com"),
            ]
        );
    }

    #[test]
    fn test_public_base_url_trailing_slash_is_trimmed() {
        let mut vars = base_vars();
        vars.insert(
            "RD_PUBLIC_BASE_URL".to_string(),
            "https://drop.example.com/".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");
        assert_eq!(config.public_base_url, "https://drop.example.com");
    }

    #[test]
    fn test_max_upload_bytes_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert("RD_MAX_UPLOAD_BYTES".to_string(), "fifty-megs".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidMaxUploadBytes(msg)) if msg.contains("fifty-megs"))
        );
    }

    #[test]
    fn test_max_upload_bytes_rejects_zero() {
        let mut vars = base_vars();
        vars.insert("RD_MAX_UPLOAD_BYTES".to_string(), "0".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidMaxUploadBytes(msg)) if msg.contains("greater than 0"))
        );
    }

    #[test]
    fn test_allowed_origins_skips_empty_entries() {
        let mut vars = base_vars();
        vars.insert(
            "RD_ALLOWED_ORIGINS".to_string(),
            "https://drop.example.com,, ".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");
        assert_eq!(config.allowed_origins.len(), 1);
    }

    #[test]
    fn test_allowed_origins_rejects_invalid_header_value() {
        let mut vars = base_vars();
        vars.insert(
            "RD_ALLOWED_ORIGINS".to_string(),
            "https://good.example.com,https://bad\nexample.com".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidAllowedOrigin(_))
        ));
    }
}
