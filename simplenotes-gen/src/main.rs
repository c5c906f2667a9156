use std::str::FromStr;
use clap::Parser;
use log::info;
use simplenotes::config::app_config::AppConfig;
use simplenotes::config::load_app_config;
use simplenotes::data::UserId;
use simplenotes::error_exit;
use simplenotes::identity::{AccessTokenGenerator, AccessTokenKey};
use simplenotes::logging::init_tool_logging;
use time::{Duration, OffsetDateTime};
use crate::cli::CliConfig;
use crate::file_write::write_private;

mod cli;
mod file_write;

fn main() {
    init_tool_logging();

    let cli_config = CliConfig::parse();

    if !cli_config.config_file.exists() {
        error_exit!(
            "configuration file at {} does not exist",
            cli_config.config_file.display()
        )
    }

    let app_config = load_app_config(&cli_config.config_file)
        .unwrap_or_else(|e| {
            error_exit!("finishing due to a configuration error: {e}");
        });

    if cli_config.generate_key {
        generate_key(&app_config, cli_config.force)
    } else if let Some(user_id) = cli_config.issue_token {
        issue_token(&app_config, &user_id)
    }
}

fn generate_key(app_config: &AppConfig, overwrite: bool) {
    let key = AccessTokenKey::generate(&mut rand::rng());
    write_private(
        &app_config.access_token_key,
        key.to_base64() + "\n",
        overwrite,
    )
        .unwrap_or_else(|e| error_exit!(
            "could not write the access token key to {}: {e}",
            app_config.access_token_key.display(),
        ));
    info!(
        "access token key written to {}",
        app_config.access_token_key.display(),
    );
}

fn issue_token(app_config: &AppConfig, user_id: &str) {
    let user_id = UserId::from_str(user_id)
        .unwrap_or_else(|e| error_exit!("invalid user id: {e}"));
    let key = AccessTokenKey::from_file(&app_config.access_token_key)
        .unwrap_or_else(|e| error_exit!(
            "could not read the access token key at {}: {e}",
            app_config.access_token_key.display(),
        ));
    let now = OffsetDateTime::now_utc();
    let validity = Duration::minutes(i64::from(app_config.access_token_validity_minutes));
    let token = AccessTokenGenerator::new(&key)
        .generate_token(&user_id, now, now + validity)
        .unwrap_or_else(|e| error_exit!("could not issue an access token: {e}"));
    println!("{token}");
}
