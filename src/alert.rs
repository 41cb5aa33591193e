use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Server-assigned alert identifier (a stringified document id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub String);

impl AlertId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Critical,
    Alert,
    FalsePositive,
    /// Anything the server sends that is not one of the three real classes,
    /// including the legacy "none" sentinel.
    #[default]
    #[serde(other)]
    Unknown,
}

impl AlertType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Alert => "alert",
            Self::FalsePositive => "false_positive",
            Self::Unknown => "unknown",
        }
    }

    /// True for the three classes the detector actually emits.
    #[must_use]
    pub const fn is_classified(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    /// Parses the server's `"lat,lon"` decimal-degree string.
    #[must_use]
    pub fn parse(gps: &str) -> Option<Self> {
        let (lat, lon) = gps.split_once(',')?;
        Self::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?)
    }
}

/// One detection record as the server stores and serves it.
///
/// Fields default when absent rather than failing the whole list: the
/// backing collection is schemaless and older documents miss fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id", default)]
    pub id: AlertId,
    #[serde(rename = "type", default)]
    pub alert_type: AlertType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub gps: Option<String>,
    #[serde(default)]
    pub gps_url: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub seen: bool,
}

impl Alert {
    /// Millisecond sort key for the record's timestamp, when parseable.
    #[must_use]
    pub fn timestamp_ms(&self) -> Option<i64> {
        parse_timestamp_ms(&self.timestamp)
    }

    #[must_use]
    pub fn confidence_pct(&self) -> f64 {
        self.confidence * 100.0
    }

    #[must_use]
    pub fn position(&self) -> Option<LatLon> {
        self.gps.as_deref().and_then(LatLon::parse)
    }

    /// Timestamp as shown to users: the stray trailing `Z` removed.
    #[must_use]
    pub fn display_timestamp(&self) -> &str {
        self.timestamp.strip_suffix('Z').unwrap_or(&self.timestamp)
    }
}

/// Parses the server's ISO-8601-ish timestamps into epoch milliseconds.
///
/// Some stored values carry a literal trailing `Z` even though they are not
/// UTC; it is stripped and the remainder is treated as naive wall time, so
/// ordering matches what the server writes.
#[must_use]
pub fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Some(parsed.and_utc().timestamp_millis())
}
