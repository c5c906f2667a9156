use std::error::Error;
use std::process::{Command, Stdio};
use test_utils::{BackgroundReader, ChildKillOnDropExt, KillOnDropChild, MockConfig, ROCKET_STARTED_STRING};

pub const STARTUP_TIMEOUT_MILLIS: u64 = 30000;

pub fn spawn_daemon(
    config: &MockConfig,
) -> Result<(KillOnDropChild, BackgroundReader, String), Box<dyn Error>> {
    let mut child = new_command(config).spawn()?.kill_on_drop();
    let stderr = child.stderr.take()
        .ok_or("failed to get stderr")?;
    let mut reader = BackgroundReader::new(stderr, STARTUP_TIMEOUT_MILLIS);
    let startup_log = reader.wait_until(ROCKET_STARTED_STRING)?;
    Ok((child, reader, startup_log))
}

pub fn shutdown_assert_no_errors(
    mut child: KillOnDropChild,
    reader: BackgroundReader,
) -> Result<String, Box<dyn Error>> {
    let status = child.stop()?;
    let log = reader.read_to_end()?;
    assert!(
        !log.contains("ERROR"),
        "errors in the log: {log}",
    );
    assert!(
        status.is_some_and(|status| status.success()),
        "unclean shutdown: {status:?}, log: {log}",
    );
    Ok(log)
}

pub fn new_command(config: &MockConfig) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_simplenotesd"));
    command
        .arg("--config-file")
        .arg(&config.config_file)
        .env("RUST_LOG", "info")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    command
}
