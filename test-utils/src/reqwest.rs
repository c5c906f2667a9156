use std::sync::LazyLock;
use std::time::Duration;

/// Shared blocking client for talking to a spawned daemon.
pub static RQ: LazyLock<reqwest::blocking::Client> = LazyLock::new(||
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| panic!("could not build the http client: {e}"))
);
