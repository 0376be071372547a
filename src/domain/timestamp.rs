//! Axis keys shared by bars, equity samples and events.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Epoch values at or above this magnitude are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A bar/event timestamp exactly as the payload carried it.
///
/// Matching between structures is by exact equality; [`Timestamp::date_key`]
/// gives the coarser day-level key used when granularities differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timestamp {
    Text(String),
    Epoch(i64),
}

impl Timestamp {
    pub fn text(s: impl Into<String>) -> Self {
        Timestamp::Text(s.into())
    }

    /// Day-level key (`YYYY-MM-DD`), or `None` when the timestamp is not in a
    /// recognised date format.
    pub fn date_key(&self) -> Option<String> {
        let date = match self {
            Timestamp::Text(s) => {
                let head = s.trim().split([' ', 'T']).next().unwrap_or_default();
                NaiveDate::parse_from_str(head, "%Y-%m-%d")
                    .or_else(|_| NaiveDate::parse_from_str(head, "%Y/%m/%d"))
                    .ok()?
            }
            Timestamp::Epoch(n) => {
                let secs = if n.abs() >= EPOCH_MILLIS_THRESHOLD {
                    n / 1000
                } else {
                    *n
                };
                DateTime::from_timestamp(secs, 0)?.date_naive()
            }
        };
        Some(date.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Text(s) => write!(f, "{}", s),
            Timestamp::Epoch(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Timestamp::Text(s.to_string())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timestamp::Text(s) => serializer.serialize_str(s),
            Timestamp::Epoch(n) => serializer.serialize_i64(*n),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Int(n) => Timestamp::Epoch(n),
            RawTimestamp::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                Timestamp::Epoch(x as i64)
            }
            RawTimestamp::Float(x) => Timestamp::Text(x.to_string()),
            RawTimestamp::Text(s) => Timestamp::Text(s),
        })
    }
}
