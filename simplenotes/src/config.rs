use std::path::Path;
use ::figment::Figment;
use thiserror::Error;

use crate::config::app_config::AppConfig;
use crate::config::figment::FigmentExt;

pub mod app_config;
pub mod figment;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] Box<::figment::Error>),

    #[error("access_token_validity_minutes must be positive")]
    ZeroTokenValidity,
}

/// Loads the configuration outside of Rocket, for the tools.
pub fn load_app_config(
    config_file: impl AsRef<Path>,
) -> Result<AppConfig, ConfigError> {
    Figment::new()
        .setup_app_config(config_file)
        .extract_app_config()
}
