use config::{Config, Environment, File, FileFormat};
use error_stack::{report, ResultExt};
use thiserror::Error;

use crate::domain::sheets::schema::RequestSheetSchema;

use super::{
    sheets_config::SpreadsheetConfig,
    telemetry_config::TelemetryConfig,
    web_config::{AuthConfig, ServerConfig},
};

pub const ENV_PREFIX: &str = "APPROVAL";

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SpreadsheetConfig,
    #[serde(default)]
    pub columns: RequestSheetSchema,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("Error reading config sources")]
    Read,
    #[error("Invalid configuration at '{0}'")]
    InvalidField(String),
}

impl AppConfig {
    /// Loads the file named by `CONFIG_PATH` (default `Config`, any extension the `config`
    /// crate knows), overlaid with `APPROVAL__SECTION__KEY` environment variables.
    pub fn load() -> error_stack::Result<Self, AppConfigError> {
        let explicit_path = std::env::var("CONFIG_PATH").ok();
        let config_path = explicit_path.clone().unwrap_or_else(|| "Config".to_string());

        let config = Config::builder()
            .add_source(File::with_name(&config_path).required(explicit_path.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .change_context(AppConfigError::Read)
            .attach_printable_lazy(|| format!("Config file: {config_path}"))?;

        Self::from_config(config)
            .attach_printable_lazy(|| format!("Config file: {config_path}"))
    }

    /// Parses a TOML document. Environment variables are not consulted.
    pub fn from_toml_str(source: &str) -> error_stack::Result<Self, AppConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .change_context(AppConfigError::Read)?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> error_stack::Result<Self, AppConfigError> {
        let value = config
            .try_deserialize::<serde_json::Value>()
            .change_context(AppConfigError::Read)?;

        serde_path_to_error::deserialize(value).map_err(|err| {
            let path = err.path().to_string();
            report!(AppConfigError::InvalidField(path)).attach_printable(format!(
                "{}\nMake sure all required fields are present in the configuration file.",
                err.into_inner()
            ))
        })
    }
}
