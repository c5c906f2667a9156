mod cli;
mod app_constants;
mod app_setup;
mod routes;

use crate::cli::CliConfig;
use app_setup::AppSetupFairing;
use clap::{crate_name, Parser};
use figment::Figment;
use log::info;
use simplenotes::config::figment::FigmentExt;
use simplenotes::error_exit;
use simplenotes::logging::{init_daemon_logging, LogTarget};

fn main() {
    let cli_config = CliConfig::parse();
    let log_target = if cli_config.syslog {
        LogTarget::Syslog
    } else {
        LogTarget::Stderr
    };
    if let Err(e) = init_daemon_logging(log_target) {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!("{} starting up", crate_name!());

    if !cli_config.config_file.exists() {
        error_exit!(
            "configuration file at {} does not exist",
            cli_config.config_file.display()
        )
    }
    let figment = Figment::from(rocket::Config::default())
        .setup_app_config(&cli_config.config_file);
    let app_config = figment.extract_app_config()
        .unwrap_or_else(|e| error_exit!("invalid configuration: {e}"));

    let result = rocket::execute(
        rocket
            ::custom(figment)
            .attach(AppSetupFairing::new(app_config))
            .launch()
    );
    if let Err(e) = result {
        error_exit!("failed to launch rocket: {}", e);
    }
    info!("{} stopped", crate_name!());
}
