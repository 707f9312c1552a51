use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// One position sample as delivered by the location source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    // milliseconds since unix epoch
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Location {
            latitude,
            longitude,
            timestamp_ms,
        }
    }

    pub fn is_valid(&self) -> bool {
        // NaN fails both range checks
        (MIN_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
            && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}
