use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::bin_constants::{DEFAULT_ACCESS_TOKEN_KEY, DEFAULT_ACCESS_TOKEN_VALIDITY_MINUTES, DEFAULT_DATA_DIR};


#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoping: Scoping,

    #[serde(default = "app_config_default_access_token_key")]
    pub access_token_key: PathBuf,

    #[serde(default = "app_config_default_access_token_validity_minutes")]
    pub access_token_validity_minutes: u32,

    #[serde(default)]
    pub backend: BackendConfig,
}

/// Whether notes belong to the authenticated caller or to everybody.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoping {
    Global,
    #[default]
    PerUser,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    File {
        #[serde(default = "app_config_default_data_directory")]
        data_directory: PathBuf,
    },
    KeyValue {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    Memory,
}

pub fn app_config_default_access_token_key() -> PathBuf {
    DEFAULT_ACCESS_TOKEN_KEY.into()
}

pub fn app_config_default_access_token_validity_minutes() -> u32 {
    DEFAULT_ACCESS_TOKEN_VALIDITY_MINUTES
}

pub fn app_config_default_data_directory() -> PathBuf {
    DEFAULT_DATA_DIR.into()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scoping: Scoping::default(),
            access_token_key: DEFAULT_ACCESS_TOKEN_KEY.into(),
            access_token_validity_minutes: DEFAULT_ACCESS_TOKEN_VALIDITY_MINUTES,
            backend: BackendConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::File {
            data_directory: DEFAULT_DATA_DIR.into(),
        }
    }
}
