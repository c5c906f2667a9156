use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::lib_constants::{GLOBAL_SCOPE_KEY, USER_SCOPE_KEY_PREFIX};

mod timestamp;
mod user_id;

pub use user_id::{UserId, UserIdParseError};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: OffsetDateTime,
}

/// The mutable part of a note, as accepted from clients.
///
/// Anything but `content` in an incoming payload is dropped on
/// deserialization, so a payload can never touch the id or the timestamps.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NotePatch {
    pub fn with_content(content: impl Into<String>) -> Self {
        NotePatch {
            content: Some(content.into()),
        }
    }

    pub fn apply_to(self, note: &mut Note) {
        if let Some(content) = self.content {
            note.content = content;
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

#[derive(Debug, Error)]
#[error("note id must not be blank or padded with whitespace")]
pub struct NoteIdParseError;

impl FromStr for NoteId {
    type Err = NoteIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.trim() != s {
            return Err(NoteIdParseError);
        }
        Ok(NoteId(s.to_owned()))
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NoteId::from_str(&value).map_err(serde::de::Error::custom)
    }
}

impl From<uuid::Uuid> for NoteId {
    fn from(value: uuid::Uuid) -> Self {
        NoteId(value.hyphenated().to_string())
    }
}

impl Deref for NoteId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The namespace note ids are unique in.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Scope {
    Global,
    User(UserId),
}

impl Scope {
    pub fn key(&self) -> String {
        match self {
            Scope::Global => GLOBAL_SCOPE_KEY.to_owned(),
            Scope::User(user_id) => format!("{USER_SCOPE_KEY_PREFIX}{user_id}"),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => f.write_str("global scope"),
            Scope::User(user_id) => write!(f, "user \"{user_id}\""),
        }
    }
}
