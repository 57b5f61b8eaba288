//! Cart store configuration.
//!
//! The library never reads the environment on its own: callers build a
//! [`CartConfig`] directly, take [`CartConfig::default`], or opt in to
//! [`CartConfig::from_env`].
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GO_MARKETPLACE_STORAGE_KEY` - Key the cart blob is stored under (default: `@GoMarketplace:products`)
//! - `GO_MARKETPLACE_STORAGE_DIR` - Directory for file-backed storage (default: `.go-marketplace`)
//! - `GO_MARKETPLACE_ERROR_CHANNEL_CAPACITY` - Buffered persistence errors per subscriber (default: 16)

use std::path::PathBuf;

use thiserror::Error;

/// Storage key the cart has always been persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

const DEFAULT_STORAGE_DIR: &str = ".go-marketplace";
const DEFAULT_ERROR_CHANNEL_CAPACITY: usize = 16;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the serialized cart is stored under
    pub storage_key: String,
    /// Base directory used by `FileStorage`
    pub storage_dir: PathBuf,
    /// How many persistence errors a lagging subscriber can fall behind by
    pub error_channel_capacity: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            error_channel_capacity: DEFAULT_ERROR_CHANNEL_CAPACITY,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let storage_key = match lookup("GO_MARKETPLACE_STORAGE_KEY") {
            Some(key) if key.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    "GO_MARKETPLACE_STORAGE_KEY".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Some(key) => key,
            None => defaults.storage_key,
        };

        let storage_dir = lookup("GO_MARKETPLACE_STORAGE_DIR")
            .map_or(defaults.storage_dir, PathBuf::from);

        let error_channel_capacity = match lookup("GO_MARKETPLACE_ERROR_CHANNEL_CAPACITY") {
            Some(raw) => parse_capacity(&raw)?,
            None => defaults.error_channel_capacity,
        };

        Ok(Self {
            storage_key,
            storage_dir,
            error_channel_capacity,
        })
    }
}

/// Parse a channel capacity, which must be at least 1.
fn parse_capacity(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("GO_MARKETPLACE_ERROR_CHANNEL_CAPACITY".to_string(), reason)
    };

    let capacity = raw
        .trim()
        .parse::<usize>()
        .map_err(|e| invalid(e.to_string()))?;
    if capacity == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(capacity)
}
