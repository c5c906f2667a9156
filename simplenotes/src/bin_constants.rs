pub const DEFAULT_CONFIG_FILE: &str = "/etc/simplenotes/simplenotes.toml";
pub const APP_CONFIG_ENV_PREFIX: &str = "SIMPLENOTES_";
pub const APP_CONFIG_ENV_SEPARATOR: &str = "__";

pub const DEFAULT_DATA_DIR: &str = "/var/simplenotes";
pub const DEFAULT_ACCESS_TOKEN_KEY: &str = "/etc/simplenotes/private/access_token_key.b64";
pub const DEFAULT_ACCESS_TOKEN_VALIDITY_MINUTES: u32 = 15;
