//! Domain data structures for the container snapshot and its synchronization status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Waste fraction currently reported by the container sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrashKind {
    /// Wet (organic) waste, raw value `0`.
    Wet,
    /// Dry waste, raw value `1`.
    Dry,
    /// No classification reported yet, or the sensor reported `null`.
    #[default]
    Unknown,
}

impl TrashKind {
    /// Map the raw trash indicator document onto a waste fraction.
    ///
    /// Only the numbers `1` and `0` are recognized; `null`, other numbers, and non-numeric
    /// values map to [`TrashKind::Unknown`].
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        match raw.as_f64() {
            Some(indicator) if (indicator - 1.0).abs() < f64::EPSILON => Self::Dry,
            Some(indicator) if indicator.abs() < f64::EPSILON => Self::Wet,
            _ => Self::Unknown,
        }
    }

    /// Human-friendly label shown on the dashboard.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Wet => "Wet Waste",
            Self::Dry => "Dry Waste",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TrashKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Last accepted reading of the container.
///
/// Raw values are kept as reported (including negative readings); consumers derive display
/// values through [`crate::classify::derive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Processing price as reported by the store.
    pub price: f64,
    /// Weight reading in grams.
    pub weight: f64,
    /// Waste fraction in the container.
    pub trash_kind: TrashKind,
}

/// Reachability of the remote store as observed by the last attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connection {
    /// The most recent attempt succeeded.
    Connected,
    /// The most recent attempt failed, or no attempt has completed yet.
    #[default]
    Disconnected,
}

impl fmt::Display for Connection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Connection::Connected => "connected",
            Connection::Disconnected => "disconnected",
        };
        write!(formatter, "{label}")
    }
}

/// Connectivity and progress flags for the synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Outcome of the most recent attempt.
    pub connection: Connection,
    /// Time of the last successful merge, `None` until one happened.
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the most recent failure; cleared by the next success.
    pub last_error: Option<String>,
    /// True until the very first attempt has completed.
    pub is_loading: bool,
    /// True while any attempt after the first is in flight.
    pub is_refreshing: bool,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            connection: Connection::Disconnected,
            last_updated: None,
            last_error: None,
            is_loading: true,
            is_refreshing: false,
        }
    }
}

/// Everything an observer of the synchronizer gets to see, published as one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Last accepted reading.
    pub snapshot: Snapshot,
    /// Connectivity and progress flags.
    pub status: SyncStatus,
}

/// Container document as stored remotely. Field names are capitalized in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDocument {
    /// Processing price, absent when the device never wrote one.
    #[serde(rename = "Price", default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    /// Weight in grams, absent when the device never wrote one.
    #[serde(rename = "Weight", default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
}

// Devices occasionally write readings as strings. Numeric strings are read as numbers,
// anything else that is not a number counts as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Untransformed result of one successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPair {
    /// The container document.
    pub container: ContainerDocument,
    /// The bare trash indicator value (`1`, `0`, or `null`).
    pub trash: Value,
}
