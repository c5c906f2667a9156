//! Text shown for notes in a list.

use time::{OffsetDateTime, UtcOffset};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::client_constants::{TITLE_ELLIPSIS, TITLE_MAX_CHARS};

const DATE_TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]");
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

/// The first line of the trimmed content, cut to 25 characters.
pub fn note_title(content: &str) -> String {
    let first_line = content.trim().split('\n').next().unwrap_or_default();
    if first_line.chars().count() > TITLE_MAX_CHARS {
        let mut title: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str(TITLE_ELLIPSIS);
        title
    } else {
        first_line.to_owned()
    }
}

/// Everything after the first line, joined into one line.
pub fn note_preview(content: &str) -> String {
    content.split('\n').skip(1).collect::<Vec<_>>().join(" ")
}

pub fn format_date_time(time: OffsetDateTime, offset: UtcOffset) -> String {
    time.checked_to_offset(offset)
        .and_then(|time| time.format(DATE_TIME_FORMAT).ok())
        .unwrap_or_default()
}

pub fn format_local_date_time(time: OffsetDateTime) -> String {
    format_date_time(time, local_offset())
}

/// Current local time as inserted into a note.
pub fn local_timestamp() -> String {
    OffsetDateTime::now_utc()
        .checked_to_offset(local_offset())
        .and_then(|time| time.format(TIMESTAMP_FORMAT).ok())
        .unwrap_or_default()
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
