use time::OffsetDateTime;

/// The current UTC time truncated to milliseconds, the precision notes
/// carry on the wire.
pub fn now_millis() -> OffsetDateTime {
    truncate_to_millis(OffsetDateTime::now_utc())
}

pub fn truncate_to_millis(time: OffsetDateTime) -> OffsetDateTime {
    time.replace_nanosecond(u32::from(time.millisecond()) * 1_000_000)
        .unwrap_or(time)
}
