use std::{fmt, ops::Deref};

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A point in time as the GitHub API reports it.
///
/// Encodes as an RFC 3339 string. Decodes either an RFC 3339 string or a unix
/// timestamp in seconds. Integers that would land after the year 3000 when
/// read as seconds are read as milliseconds instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    #[must_use]
    pub fn new(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    fn from_unix(value: i64) -> Option<Self> {
        match Utc.timestamp_opt(value, 0).single() {
            Some(time) if chrono::Datelike::year(&time) <= 3000 => Some(Self(time)),
            _ => Utc.timestamp_millis_opt(value).single().map(Self),
        }
    }
}

impl Deref for Timestamp {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(time: DateTime<Utc>) -> Self {
        Self(time)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TimestampVisitor;

impl<'de> de::Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an RFC 3339 timestamp or unix seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if let Ok(secs) = v.parse::<i64>() {
            return self.visit_i64(secs);
        }
        DateTime::parse_from_rfc3339(v)
            .map(|time| Timestamp(time.with_timezone(&Utc)))
            .map_err(|e| E::custom(format!("invalid timestamp `{v}`: {e}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Timestamp::from_unix(v).ok_or_else(|| E::custom(format!("timestamp `{v}` out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("timestamp `{v}` out of range")))?;
        self.visit_i64(v)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}
