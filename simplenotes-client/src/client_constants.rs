use std::time::Duration;

pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(2000);
pub const SAVE_STATUS_DISPLAY: Duration = Duration::from_secs(3);

pub const NOTES_ENDPOINT: &str = "notes";

pub const TITLE_MAX_CHARS: usize = 25;
pub const TITLE_ELLIPSIS: &str = "...";
