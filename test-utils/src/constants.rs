use std::time::Duration;

pub const TERM_WAIT: Duration = Duration::from_millis(5000);
pub const KILL_CHECK_INTERVAL: Duration = Duration::from_millis(100);
pub const BACKGROUND_READER_CHECK_INTERVAL: Duration = Duration::from_millis(50);

pub const ROCKET_STARTED_STRING: &str = "Rocket has launched from";
pub const FIRST_TEST_PORT: u16 = 18000;
