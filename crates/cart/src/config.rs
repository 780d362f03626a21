//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOEBOX_API_BASE_URL` - Base URL of the storefront stock/catalog API
//!
//! ## Optional
//! - `SHOEBOX_API_TOKEN` - Bearer token for the storefront API
//! - `SHOEBOX_CART_PATH` - Path of the cart snapshot file
//!   (default: shoebox-cart.json)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront API connection configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the stock/catalog API.
    pub base_url: String,
    /// Bearer token sent with every request, if configured.
    pub access_token: Option<SecretString>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Storefront API configuration.
    pub api: ApiConfig,
    /// Path of the persistent cart snapshot file.
    pub cart_path: PathBuf,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("SHOEBOX_API_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOEBOX_API_BASE_URL".to_string(), e.to_string())
        })?;

        let access_token = get_optional_env("SHOEBOX_API_TOKEN").map(SecretString::from);
        let cart_path = get_env_or_default("SHOEBOX_CART_PATH", "shoebox-cart.json").into();

        Ok(Self {
            api: ApiConfig {
                base_url,
                access_token,
            },
            cart_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
