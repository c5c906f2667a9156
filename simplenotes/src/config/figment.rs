use std::path::Path;
use ::figment::Figment;
use ::figment::providers::{Env, Format, Serialized, Toml};
use crate::bin_constants::{APP_CONFIG_ENV_PREFIX, APP_CONFIG_ENV_SEPARATOR};
use crate::config::ConfigError;
use crate::config::app_config::AppConfig;

pub trait FigmentExt {
    /// Layers the defaults, the config file and `SIMPLENOTES_*` variables,
    /// in that order. Nested keys are separated with `__` in variable
    /// names: `SIMPLENOTES_BACKEND__KIND=memory`.
    fn setup_app_config(
        self,
        config_file: impl AsRef<Path>,
    ) -> Figment;

    fn extract_app_config(&self) -> Result<AppConfig, ConfigError>;
}

impl FigmentExt for Figment {
    fn setup_app_config(self, config_file: impl AsRef<Path>) -> Figment {
        self.merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file_exact(config_file))
            .merge(
                Env::prefixed(APP_CONFIG_ENV_PREFIX)
                    .split(APP_CONFIG_ENV_SEPARATOR)
                    .global()
            )
    }

    fn extract_app_config(&self) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = self.extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))?;
        if config.access_token_validity_minutes == 0 {
            return Err(ConfigError::ZeroTokenValidity);
        }
        Ok(config)
    }
}
