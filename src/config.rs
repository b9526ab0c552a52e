//! Process configuration read once from the environment at startup.

use std::env;

use thiserror::Error;
use tracing::info;

use crate::dao::image_store::CloudinaryConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";

/// Failures raised while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// Environment variable is set to something we cannot use.
    #[error("invalid value `{value}` for environment variable `{var}`")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Which persistence backend serves requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB reached through `uri`, using `database` or the default database name.
    Mongo {
        /// Connection string.
        uri: String,
        /// Database name override.
        database: Option<String>,
    },
    /// Process-local store, lost on restart.
    Memory,
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Storage backend selected at startup.
    pub store: StoreBackend,
    /// Image host credentials.
    pub cloudinary: CloudinaryConfig,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT").or_else(|| var("SERVER_PORT")) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "PORT",
                    value,
                })?,
            None => DEFAULT_PORT,
        };

        let store = match var("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase) {
            None => mongo_backend(&var),
            Some(backend) if backend == "mongo" || backend == "mongodb" => mongo_backend(&var),
            Some(backend) if backend == "memory" => StoreBackend::Memory,
            Some(backend) => {
                return Err(ConfigError::InvalidValue {
                    var: "STORE_BACKEND",
                    value: backend,
                });
            }
        };

        let mut cloudinary = cloudinary_credentials(&var)?;
        if let Some(base_url) = var("CLOUDINARY_API_BASE_URL") {
            cloudinary.api_base_url = base_url;
        }
        cloudinary.folder = var("CLOUDINARY_FOLDER");

        let config = Self {
            port,
            store,
            cloudinary,
        };
        info!(
            port = config.port,
            store = ?config.store,
            cloud_name = %config.cloudinary.cloud_name,
            "loaded configuration"
        );
        Ok(config)
    }
}

fn mongo_backend(var: &impl Fn(&str) -> Option<String>) -> StoreBackend {
    StoreBackend::Mongo {
        uri: var("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.to_owned()),
        database: var("MONGO_DB"),
    }
}

/// Explicit variables win over `CLOUDINARY_URL`.
fn cloudinary_credentials(
    var: &impl Fn(&str) -> Option<String>,
) -> Result<CloudinaryConfig, ConfigError> {
    let cloud_name = var("CLOUDINARY_CLOUD_NAME");
    let api_key = var("CLOUDINARY_API_KEY");
    let api_secret = var("CLOUDINARY_API_SECRET");

    if cloud_name.is_none() && api_key.is_none() && api_secret.is_none() {
        if let Some(url) = var("CLOUDINARY_URL") {
            return CloudinaryConfig::from_url(&url).ok_or(ConfigError::InvalidValue {
                var: "CLOUDINARY_URL",
                value: "<redacted>".into(),
            });
        }
    }

    Ok(CloudinaryConfig::new(
        cloud_name.ok_or(ConfigError::MissingEnvVar {
            var: "CLOUDINARY_CLOUD_NAME",
        })?,
        api_key.ok_or(ConfigError::MissingEnvVar {
            var: "CLOUDINARY_API_KEY",
        })?,
        api_secret.ok_or(ConfigError::MissingEnvVar {
            var: "CLOUDINARY_API_SECRET",
        })?,
    ))
}
