use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::{self, Instant, Interval};

use crate::config::TrackerConfig;
use crate::error::TrackingError;
use crate::geodesic;
use crate::gps_processor::{GpsProcessor, ProcessResult};
use crate::itinerary::Itinerary;
use crate::location::Location;
use crate::source::{self, LocationSource, PermissionGate, SampleRx, SourceEvent, SubscriptionHandle};
use crate::store::{Command, ItineraryStore};
use crate::utils;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    Tracking,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SampleOutcome {
    // `step_m` is 0 for the first point of a session
    Appended { step_m: f64 },
    OutOfOrder,
    // arrived while idle, e.g. delivered right after `stop`
    Dropped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Idle,
    Tick { elapsed_sec: u64 },
    Sample(SampleOutcome),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LiveStats {
    pub elapsed_sec: u64,
    pub distance_m: f64,
}

impl fmt::Display for LiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}",
            utils::format_elapsed(self.elapsed_sec),
            utils::format_distance_km(self.distance_m)
        )
    }
}

// Everything that only exists while tracking. Dropping it is what resets the
// counters and releases the sample channel.
struct ActiveSession {
    handle: SubscriptionHandle,
    rx: SampleRx,
    ticker: Interval,
    gps_processor: GpsProcessor,
    started_at: DateTime<Utc>,
    // monotonic counterpart of `started_at`, follows tokio's clock
    started: Instant,
    distance_m: f64,
    elapsed_sec: u64,
}

/// Drives one tracking session at a time against an `ItineraryStore`.
///
/// The session does not own the store. The caller constructs both and passes
/// the store in, so all mutation happens on the caller's thread in the order
/// the calls are made.
pub struct TrackingSession<S: LocationSource + ?Sized, P: PermissionGate + ?Sized> {
    source: Arc<S>,
    permission: Arc<P>,
    config: TrackerConfig,
    active: Option<ActiveSession>,
}

impl<S: LocationSource + ?Sized, P: PermissionGate + ?Sized> TrackingSession<S, P> {
    pub fn new(source: Arc<S>, permission: Arc<P>, config: TrackerConfig) -> Self {
        TrackingSession {
            source,
            permission,
            config,
            active: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.active.is_some() {
            SessionPhase::Tracking
        } else {
            SessionPhase::Idle
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    pub fn distance_m(&self) -> f64 {
        self.active.as_ref().map_or(0.0, |x| x.distance_m)
    }

    pub fn elapsed_sec(&self) -> u64 {
        self.active.as_ref().map_or(0, |x| x.elapsed_sec)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|x| x.started_at)
    }

    pub fn stats(&self) -> LiveStats {
        LiveStats {
            elapsed_sec: self.elapsed_sec(),
            distance_m: self.distance_m(),
        }
    }

    pub async fn request_permission(&self) -> bool {
        self.permission.request().await
    }

    pub async fn start(&mut self, store: &mut ItineraryStore) -> Result<(), TrackingError> {
        if self.active.is_some() || store.is_tracking() {
            warn!("[session] start called while already tracking");
            return Err(TrackingError::AlreadyTracking);
        }
        if !self.permission.request().await {
            info!("[session] location permission denied");
            return Err(TrackingError::PermissionDenied);
        }

        let (tx, rx) = source::channel();
        let handle = self
            .source
            .subscribe(&self.config.watch, tx)
            .await
            .map_err(TrackingError::source_fault)?;
        if let Err(e) = store.dispatch(Command::StartTracking) {
            // the store was started behind our back, don't leak the subscription
            self.source.unsubscribe(handle);
            return Err(e.into());
        }

        let period = self.config.tick_interval();
        self.active = Some(ActiveSession {
            handle,
            rx,
            ticker: time::interval_at(Instant::now() + period, period),
            gps_processor: GpsProcessor::new(),
            started_at: Utc::now(),
            started: Instant::now(),
            distance_m: 0.0,
            elapsed_sec: 0,
        });
        info!("[session] tracking started: subscription={:?}", handle);
        Ok(())
    }

    pub fn on_sample(
        &mut self,
        store: &mut ItineraryStore,
        sample: Location,
    ) -> Result<SampleOutcome, TrackingError> {
        let active = match self.active.as_mut() {
            Some(active) => active,
            None => {
                debug!("[session] dropping sample received while idle");
                return Ok(SampleOutcome::Dropped);
            }
        };

        let previous = active.gps_processor.last_data().copied();
        match active.gps_processor.check(&sample) {
            ProcessResult::Invalid => {
                warn!(
                    "[session] rejecting invalid coordinate: lat={}, lng={}",
                    sample.latitude, sample.longitude
                );
                Err(TrackingError::InvalidCoordinate {
                    latitude: sample.latitude,
                    longitude: sample.longitude,
                })
            }
            ProcessResult::OutOfOrder => {
                debug!(
                    "[session] dropping out of order sample: timestamp_ms={}",
                    sample.timestamp_ms
                );
                Ok(SampleOutcome::OutOfOrder)
            }
            ProcessResult::Append => {
                if let Err(e) = store.dispatch(Command::AddLocation(sample)) {
                    error!("[session] store refused a sample of the active session: {}", e);
                    return Err(e.into());
                }
                active.gps_processor.accept(sample);
                let step_m = previous.map_or(0.0, |x| geodesic::haversine_distance(&x, &sample));
                active.distance_m += step_m;
                Ok(SampleOutcome::Appended { step_m })
            }
        }
    }

    /// Advance the elapsed time by one tick. No-op while idle.
    pub fn tick(&mut self) -> u64 {
        match self.active.as_mut() {
            Some(active) => {
                active.elapsed_sec += 1;
                active.elapsed_sec
            }
            None => 0,
        }
    }

    pub fn stop(&mut self, store: &mut ItineraryStore) -> Option<Itinerary> {
        let ActiveSession {
            handle,
            rx,
            started_at,
            started,
            elapsed_sec,
            ..
        } = self.active.take()?;

        self.source.unsubscribe(handle);
        // anything still queued belongs to the session that just ended
        drop(rx);

        if let Err(e) = store.dispatch(Command::StopTracking) {
            error!("[session] failed to stop tracking in store: {}", e);
        }

        if store.current_route().is_empty() {
            info!("[session] tracking stopped without any sample, nothing saved");
            return None;
        }

        // ticks only count while someone pumps `next_event`
        let duration_sec = elapsed_sec.max(started.elapsed().as_secs());
        let route = store.current_route().to_vec();
        // the route may hold points dispatched by other callers, so the
        // distance is measured on what gets sealed
        let distance_m = geodesic::route_distance(&route);
        let itinerary = Itinerary::new(started_at, route, distance_m, duration_sec);
        match store.dispatch(Command::SaveItinerary(itinerary.clone())) {
            Ok(_) => {
                info!(
                    "[session] itinerary saved: id={}, points={}, distance_m={:.1}, duration_sec={}",
                    itinerary.id(),
                    itinerary.route().len(),
                    itinerary.distance_m(),
                    itinerary.duration_sec()
                );
                Some(itinerary)
            }
            Err(e) => {
                error!("[session] failed to save itinerary: {}", e);
                None
            }
        }
    }

    /// Ends the session after the source reported a terminal fault. Samples
    /// collected so far are saved like a normal stop.
    pub fn on_source_fault(&mut self, store: &mut ItineraryStore, message: String) -> TrackingError {
        warn!("[session] location source fault: {}", message);
        if let Some(itinerary) = self.stop(store) {
            info!("[session] partial itinerary kept: id={}", itinerary.id());
        }
        TrackingError::SampleSourceFault(message)
    }

    /// Waits for the next thing that happens to the active session and
    /// applies it. Returns `SessionEvent::Idle` right away when not tracking.
    pub async fn next_event(
        &mut self,
        store: &mut ItineraryStore,
    ) -> Result<SessionEvent, TrackingError> {
        let active = match self.active.as_mut() {
            Some(active) => active,
            None => return Ok(SessionEvent::Idle),
        };

        // `None` means the ticker fired
        let received = tokio::select! {
            biased;
            event = active.rx.recv() => Some(event),
            _ = active.ticker.tick() => None,
        };

        match received {
            Some(Some(SourceEvent::Sample(location))) => {
                self.on_sample(store, location).map(SessionEvent::Sample)
            }
            Some(Some(SourceEvent::Fault(message))) => Err(self.on_source_fault(store, message)),
            Some(None) => Err(self.on_source_fault(
                store,
                "location source closed the sample channel".to_string(),
            )),
            None => Ok(SessionEvent::Tick {
                elapsed_sec: self.tick(),
            }),
        }
    }

    /// One-shot position read, meant for use outside a session.
    pub async fn current_position(&self) -> Result<Location, TrackingError> {
        let location = self
            .source
            .current_position(
                self.config.current_position_timeout(),
                self.config.current_position_max_age(),
            )
            .await
            .map_err(TrackingError::source_fault)?;
        if !location.is_valid() {
            return Err(TrackingError::InvalidCoordinate {
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }
        Ok(location)
    }
}

impl<S: LocationSource + ?Sized, P: PermissionGate + ?Sized> Drop for TrackingSession<S, P> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            warn!("[session] dropped while tracking, releasing subscription");
            self.source.unsubscribe(active.handle);
        }
    }
}
