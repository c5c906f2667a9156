//! Note timestamps on the wire: always UTC, always three fractional digits,
//! e.g. `2024-02-18T12:30:00.123Z`. Reading accepts any RFC 3339 value.

use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const WIRE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

pub fn format(value: OffsetDateTime) -> Option<String> {
    value.checked_to_offset(UtcOffset::UTC)?
        .format(WIRE_FORMAT)
        .ok()
}

pub fn serialize<S>(
    value: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = format(*value)
        .ok_or_else(|| serde::ser::Error::custom("timestamp out of range"))?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&value, &Rfc3339)
        .map_err(serde::de::Error::custom)
}
