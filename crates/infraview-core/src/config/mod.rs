//! Application configuration schemas.
//!
//! Configuration is merged from TOML files and `INFRAVIEW__*` environment
//! variables via the `config` crate. Every section has defaults, so an
//! empty configuration is valid.

pub mod backend;
pub mod hooks;
pub mod informer;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::backend::{BackendConfig, ResourceDefinition, ResourceScope};
pub use self::hooks::HookConfig;
pub use self::informer::InformerConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Hook pipeline settings.
    #[serde(default)]
    pub hooks: HookConfig,
    /// Informer settings.
    #[serde(default)]
    pub informer: InformerConfig,
    /// Resource backend settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `INFRAVIEW__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("INFRAVIEW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an inline TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
