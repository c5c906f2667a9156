use std::ffi::OsStr;
use std::path::Path;
use log::LevelFilter;
use syslog::{BasicLogger, Facility, Formatter3164};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogTarget {
    Stderr,
    Syslog,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot connect to syslog: {0}")]
    Syslog(String),

    #[error(transparent)]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Tools always log to stderr, `RUST_LOG` overrides the level.
pub fn init_tool_logging() {
    stderr_logger().init()
}

pub fn init_daemon_logging(target: LogTarget) -> Result<(), LoggingError> {
    match target {
        LogTarget::Stderr => stderr_logger().try_init()?,
        LogTarget::Syslog => {
            let formatter = Formatter3164 {
                facility: Facility::LOG_DAEMON,
                hostname: None,
                process: process_name(std::env::args_os().next().as_deref()),
                pid: std::process::id(),
            };
            let logger = syslog::unix(formatter)
                .map_err(|e| LoggingError::Syslog(e.to_string()))?;
            log::set_boxed_logger(Box::new(BasicLogger::new(logger)))?;
            log::set_max_level(default_level());
        },
    }
    Ok(())
}

fn stderr_logger() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(default_level())
        .parse_default_env();
    builder
}

fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn process_name(arg0: Option<&OsStr>) -> String {
    arg0
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_name_is_the_binary_file_name() {
        assert_eq!(
            process_name(Some(OsStr::new("/usr/local/bin/simplenotesd"))),
            "simplenotesd",
        );
        assert_eq!(process_name(Some(OsStr::new("simplenotesd"))), "simplenotesd");
        assert_eq!(process_name(Some(OsStr::new("/"))), "");
        assert_eq!(process_name(None), "");
    }
}
