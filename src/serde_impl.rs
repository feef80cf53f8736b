//! Serde helpers for report and configuration types.
//!
//! # Serialization Strategy
//!
//! - **Mean durations**: integer nanoseconds (`nanos`), so JSON consumers
//!   never deal with floating point.
//! - **Budgets** in configuration files: optional integer milliseconds
//!   (`millis_option`).
//! - **Errors**: their display text (`display`); outcomes are written for
//!   humans and dashboards, not read back.

use core::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// `Duration` as integer nanoseconds.
pub(crate) fn nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let nanos = u64::try_from(duration.as_nanos()).map_err(serde::ser::Error::custom)?;
    serializer.serialize_u64(nanos)
}

/// `Option<Duration>` as optional integer milliseconds.
pub(crate) mod millis_option {
    use super::*;

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => {
                let millis =
                    u64::try_from(duration.as_millis()).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&millis)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

/// Any `Display` value as a string.
pub(crate) fn display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// `Option` of a `Display` value as an optional string.
pub(crate) fn display_option<T: Display, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.collect_str(value),
        None => serializer.serialize_none(),
    }
}
