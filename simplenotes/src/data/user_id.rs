use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::de::Error;
use serde::de::Unexpected::Str;
use thiserror::Error;

use crate::lib_constants::MAX_USER_ID_LEN;

/// Identifier of an authenticated principal, as issued by the identity
/// provider. Opaque apart from the basic sanity checks below.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UserId(String);

#[derive(Debug, Eq, Error, PartialEq)]
pub enum UserIdParseError {
    #[error("user id is blank")]
    Blank,

    #[error("user id is too long")]
    TooLong,

    #[error("user id contains control characters")]
    ControlCharacters,
}

impl FromStr for UserId {
    type Err = UserIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(UserIdParseError::Blank);
        }
        if s.len() > MAX_USER_ID_LEN {
            return Err(UserIdParseError::TooLong);
        }
        if s.chars().any(char::is_control) {
            return Err(UserIdParseError::ControlCharacters);
        }
        Ok(UserId(s.to_owned()))
    }
}

impl Deref for UserId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0[..]
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = UserId;

            fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                formatter.write_str("string containing a valid user id")
            }

            fn visit_str<E>(self, v: &str) -> Result<UserId, E>
            where
                E: Error
            {
                UserId::from_str(v)
                    .map_err(|_| Error::invalid_value(Str(v), &self))
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}
