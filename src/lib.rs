#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod config;
pub mod error;
pub mod geodesic;
pub mod gps_processor;
pub mod itinerary;
pub mod location;
pub mod logs;
pub mod session;
pub mod source;
pub mod store;
pub mod utils;

pub use config::TrackerConfig;
pub use error::{StoreError, TrackingError};
pub use itinerary::Itinerary;
pub use location::Location;
pub use session::TrackingSession;
pub use store::{Command, ItineraryStore};
