//! Reading struct and its persisted entry form.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::trend::{normalize_code, Trend, BLANK};

/// A timestamped value with its trend code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEntry", into = "StoredEntry")]
pub struct Reading {
    /// Instant the reading was committed, to the millisecond
    pub timestamp: DateTime<Utc>,
    /// Decimal text with at most one fractional digit, e.g. `"120.5"`
    pub value: String,
    /// Trend code, lower-cased; `' '` when unknown
    pub trend: char,
}

impl Reading {
    /// The timestamp is cut to whole milliseconds, the precision kept by
    /// storage and the wire.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, value: impl Into<String>, trend: char) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            value: value.into().trim().to_owned(),
            trend: normalize_code(trend),
        }
    }

    /// Build a reading from the `"<value> <trendChar>"` text kept in storage
    #[must_use]
    pub fn from_entry_value(timestamp: DateTime<Utc>, text: &str) -> Self {
        let (value, trend) = split_entry_value(text);
        Self::new(timestamp, value, trend)
    }

    /// The `"<value> <trendChar>"` text kept in storage
    #[must_use]
    pub fn entry_value(&self) -> String {
        format!("{} {}", self.value, self.trend)
    }

    /// Trend, if the code is one of the known ones
    #[must_use]
    pub fn trend_kind(&self) -> Option<Trend> {
        Trend::from_code(self.trend)
    }

    /// Value followed by the trend phrase, as shown on the live display
    #[must_use]
    pub fn describe(&self) -> String {
        match self.trend_kind() {
            Some(Trend::Blank) | None => self.value.clone(),
            Some(trend) => format!("{} {}", self.value, trend.phrase()),
        }
    }
}

/// Split `"<value> <trendChar>"` into its parts.
///
/// Leading whitespace is ignored, the first blank separates the tokens, and
/// the first character of the second token is the trend.
#[must_use]
pub fn split_entry_value(text: &str) -> (&str, char) {
    let text = text.trim_start();
    match text.split_once(' ') {
        Some((value, rest)) => {
            let trend = rest.chars().find(|&c| c != '\0').unwrap_or(BLANK);
            (value, normalize_code(trend))
        }
        None => (text, BLANK),
    }
}

/// One element of the persisted history array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub date: String,
    pub value: String,
}

impl From<Reading> for StoredEntry {
    fn from(r: Reading) -> Self {
        Self {
            date: r.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            value: r.entry_value(),
        }
    }
}

impl TryFrom<StoredEntry> for Reading {
    type Error = String;

    fn try_from(entry: StoredEntry) -> Result<Self, Self::Error> {
        let timestamp = parse_date(&entry.date)
            .ok_or_else(|| format!("unrecognised date '{}'", entry.date))?;
        Ok(Self::from_entry_value(timestamp, &entry.value))
    }
}

/// Parse a stored date: RFC 3339, or the `Date()` string written by the
/// browser client (`"Fri Oct 16 2026 10:00:00 GMT+0200 (CEST)"`).
#[must_use]
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let without_zone_name = text.split(" (").next().unwrap_or(text);
    DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
