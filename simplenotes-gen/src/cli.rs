use std::path::PathBuf;
use clap::{ArgGroup, Parser};
use simplenotes::bin_constants::DEFAULT_CONFIG_FILE;

#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version, author, about)]
#[command(group(ArgGroup::new("action").required(true).args(["generate_key", "issue_token"])))]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Generate the access token signing key at the configured path
    #[arg(long)]
    pub generate_key: bool,

    /// Replace an existing key when generating
    #[arg(long, requires = "generate_key")]
    pub force: bool,

    /// Print an access token for the given user id
    #[arg(long, value_name = "USER_ID")]
    pub issue_token: Option<String>,
}
