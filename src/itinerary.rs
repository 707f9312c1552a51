use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::location::Location;

/// A finished trip. Fields are private so a record cannot be changed once it
/// is in history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    id: String,
    started_at: DateTime<Utc>,
    route: Vec<Location>,
    #[serde(rename = "distanceMeters")]
    distance_m: f64,
    #[serde(rename = "durationSeconds")]
    duration_sec: u64,
}

impl Itinerary {
    pub fn new(
        started_at: DateTime<Utc>,
        route: Vec<Location>,
        distance_m: f64,
        duration_sec: u64,
    ) -> Self {
        Itinerary {
            id: Uuid::new_v4().as_hyphenated().to_string(),
            started_at,
            route,
            distance_m: distance_m.max(0.0),
            duration_sec,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn route(&self) -> &[Location] {
        &self.route
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn duration_sec(&self) -> u64 {
        self.duration_sec
    }
}
