//! Movie runtime in whole minutes.
//!
//! Stored as an integer column, rendered outward as `"<N> mins"`. Zero means
//! unset and is never rendered as `"0 mins"`. Input accepts either a bare
//! integer or the rendered string form; `null` decodes as unset.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SUFFIX: &str = " mins";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(i32);

impl Runtime {
    pub const fn new(minutes: i32) -> Self {
        Self(minutes)
    }

    pub const fn minutes(self) -> i32 {
        self.0
    }

    pub const fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return Ok(());
        }
        write!(f, "{}{SUFFIX}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeParseError {
    #[error("invalid runtime format, expected \"<N> mins\"")]
    InvalidFormat,
    #[error("runtime must not be negative")]
    Negative,
}

impl FromStr for Runtime {
    type Err = RuntimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .strip_suffix(SUFFIX)
            .ok_or(RuntimeParseError::InvalidFormat)?;

        if let Some(rest) = number.strip_prefix('-') {
            return if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                Err(RuntimeParseError::Negative)
            } else {
                Err(RuntimeParseError::InvalidFormat)
            };
        }

        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RuntimeParseError::InvalidFormat);
        }

        number
            .parse::<i32>()
            .map(Self)
            .map_err(|_| RuntimeParseError::InvalidFormat)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_unset() {
            serializer.serialize_none()
        } else {
            serializer.collect_str(self)
        }
    }
}

struct RuntimeVisitor;

impl<'de> Visitor<'de> for RuntimeVisitor {
    type Value = Runtime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer number of minutes or a \"<N> mins\" string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Runtime, E> {
        i32::try_from(v)
            .map(Runtime)
            .map_err(|_| E::custom("runtime out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Runtime, E> {
        i32::try_from(v)
            .map(Runtime)
            .map_err(|_| E::custom("runtime out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Runtime, E> {
        v.parse().map_err(E::custom)
    }

    // An explicit null is the same as an absent value: unset.
    fn visit_unit<E: de::Error>(self) -> Result<Runtime, E> {
        Ok(Runtime::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Runtime, E> {
        Ok(Runtime::default())
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RuntimeVisitor)
    }
}
