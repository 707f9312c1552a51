/// Reasons the store refuses a command. A refused command leaves the state
/// untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("a tracking session is already active")]
    AlreadyTracking,
    #[error("no tracking session is active")]
    NotTracking,
    #[error("cannot save an itinerary while the session is still tracking")]
    StillTracking,
    #[error("itinerary {0} is already in history")]
    DuplicateItinerary(String),
    #[error("invalid coordinate: lat={latitude}, lng={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("location permission not granted")]
    PermissionDenied,
    #[error("a tracking session is already active")]
    AlreadyTracking,
    #[error("location source fault: {0}")]
    SampleSourceFault(String),
    #[error("invalid coordinate: lat={latitude}, lng={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TrackingError {
    pub(crate) fn source_fault(error: anyhow::Error) -> Self {
        // `{:#}` keeps the whole context chain on one line
        TrackingError::SampleSourceFault(format!("{:#}", error))
    }
}
