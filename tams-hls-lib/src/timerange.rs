//! TAMS timerange parsing and arithmetic.
//!
//! The store addresses media by textual timeranges such as
//! `[1694429247:0_1694429251:0)`: an optional inclusivity marker, a start
//! timestamp, `_`, an end timestamp, and a closing marker. Timestamps are
//! `<seconds>:<nanoseconds>` with an optional leading `-`. Either side of a
//! range may be absent for half-infinite ranges.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ManifestError, Result};

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Nanosecond-precision media timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    nanos: i128,
}

impl Timestamp {
    pub fn new(seconds: i64, nanoseconds: u32) -> Self {
        let sign = if seconds < 0 { -1 } else { 1 };
        Self {
            nanos: seconds as i128 * NANOS_PER_SEC + sign * nanoseconds as i128,
        }
    }

    /// Whole seconds, rounded toward negative infinity.
    pub fn seconds(&self) -> i64 {
        self.nanos.div_euclid(NANOS_PER_SEC) as i64
    }

    /// Nanoseconds past [`Self::seconds`], always in `0..1_000_000_000`.
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos.rem_euclid(NANOS_PER_SEC) as u32
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1e9
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.nanos.unsigned_abs();
        let sign = if self.nanos < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}:{}",
            sign,
            abs / NANOS_PER_SEC as u128,
            abs % NANOS_PER_SEC as u128
        )
    }
}

impl FromStr for Timestamp {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || ManifestError::Timerange(format!("unparseable timestamp `{s}`"));
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (sec_str, nano_str) = match body.split_once(':') {
            Some((sec, nano)) => (sec, nano),
            None => (body, "0"),
        };
        let seconds: i64 = sec_str.parse().map_err(|_| bad())?;
        let nanoseconds: u32 = nano_str.parse().map_err(|_| bad())?;
        if nanoseconds >= NANOS_PER_SEC as u32 {
            return Err(bad());
        }
        let magnitude = seconds as i128 * NANOS_PER_SEC + nanoseconds as i128;
        Ok(Self {
            nanos: if negative { -magnitude } else { magnitude },
        })
    }
}

/// A half-open span of media time. Either bound may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let mut s = input.trim();
        s = s.strip_prefix(['[', '(']).unwrap_or(s);
        s = s.strip_suffix([']', ')']).unwrap_or(s);
        if s.is_empty() {
            return Err(ManifestError::Timerange(format!(
                "unparseable timerange `{input}`"
            )));
        }
        match s.split_once('_') {
            Some((start, end)) => {
                let parse_bound = |bound: &str| -> Result<Option<Timestamp>> {
                    if bound.is_empty() {
                        Ok(None)
                    } else {
                        bound.parse().map(Some)
                    }
                };
                Ok(Self {
                    start: parse_bound(start)?,
                    end: parse_bound(end)?,
                })
            }
            // A bare timestamp denotes the instant at that time.
            None => {
                let ts: Timestamp = s.parse()?;
                Ok(Self::new(ts, ts))
            }
        }
    }

    /// Span length in seconds; `None` when either bound is absent.
    pub fn length_secs(&self) -> Option<f64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end.nanos - start.nanos) as f64 / 1e9),
            _ => None,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        write!(f, "_")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        write!(f, ")")
    }
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeRange::parse(&raw).map_err(de::Error::custom)
    }
}
