use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::itinerary::Itinerary;
use crate::location::Location;

/* The store is the only owner of session and history state. Every change
goes through `reduce`, which builds a new state from the old one and a
command. The old state is never touched, so anyone holding a snapshot keeps a
consistent view and a rejected command leaves nothing behind.

History is kept most-recent-first. Itineraries are shared behind `Arc` so
publishing a new state does not copy every stored route. `dispatch` applies
commands in place when no snapshot of the current state is held, so appending
to a long route stays cheap.
*/

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryState {
    pub is_tracking: bool,
    pub current_route: Vec<Location>,
    pub history: Vec<Arc<Itinerary>>,
}

impl ItineraryState {
    pub fn latest(&self) -> Option<&Itinerary> {
        self.history.first().map(|x| x.as_ref())
    }

    pub fn find(&self, id: &str) -> Option<&Itinerary> {
        self.history
            .iter()
            .find(|x| x.id() == id)
            .map(|x| x.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq, strum_macros::Display)]
pub enum Command {
    StartTracking,
    // Only clears the flag. The caller finalizes with `SaveItinerary`.
    StopTracking,
    AddLocation(Location),
    SaveItinerary(Itinerary),
    ClearHistory,
}

// Checks every precondition of `command` without touching `state`.
fn validate(state: &ItineraryState, command: &Command) -> Result<(), StoreError> {
    match command {
        Command::StartTracking if state.is_tracking => Err(StoreError::AlreadyTracking),
        Command::AddLocation(_) if !state.is_tracking => Err(StoreError::NotTracking),
        Command::AddLocation(location) if !location.is_valid() => {
            Err(StoreError::InvalidCoordinate {
                latitude: location.latitude,
                longitude: location.longitude,
            })
        }
        Command::SaveItinerary(_) if state.is_tracking => Err(StoreError::StillTracking),
        Command::SaveItinerary(itinerary) if state.find(itinerary.id()).is_some() => Err(
            StoreError::DuplicateItinerary(itinerary.id().to_string()),
        ),
        _ => Ok(()),
    }
}

// Only called after `validate` accepted the command.
fn apply(state: &mut ItineraryState, command: Command) {
    match command {
        Command::StartTracking => {
            state.is_tracking = true;
            state.current_route.clear();
        }
        Command::StopTracking => state.is_tracking = false,
        Command::AddLocation(location) => state.current_route.push(location),
        Command::SaveItinerary(itinerary) => {
            state.current_route.clear();
            state.history.insert(0, Arc::new(itinerary));
        }
        Command::ClearHistory => state.history.clear(),
    }
}

pub fn reduce(state: &ItineraryState, command: Command) -> Result<ItineraryState, StoreError> {
    validate(state, &command)?;
    let mut next = state.clone();
    apply(&mut next, command);
    Ok(next)
}

pub struct ItineraryStore {
    state: Arc<ItineraryState>,
    publisher: watch::Sender<Arc<ItineraryState>>,
}

impl ItineraryStore {
    pub fn new() -> Self {
        let state = Arc::new(ItineraryState::default());
        let (publisher, _) = watch::channel(state.clone());
        ItineraryStore { state, publisher }
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Arc<ItineraryState>, StoreError> {
        let name = command.to_string();
        if let Err(e) = validate(&self.state, &command) {
            warn!("[store] rejected {}: {}", name, e);
            return Err(e);
        }
        let state = &mut self.state;
        // Receivers cannot observe the channel while `send_modify` holds it, so
        // the published reference is released first. The state is then only
        // copied when a caller still holds a snapshot of it.
        self.publisher.send_modify(|published| {
            *published = Arc::default();
            apply(Arc::make_mut(state), command);
            *published = state.clone();
        });
        debug!("[store] applied {}", name);
        Ok(self.state.clone())
    }

    pub fn snapshot(&self) -> Arc<ItineraryState> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ItineraryState>> {
        self.publisher.subscribe()
    }

    pub fn is_tracking(&self) -> bool {
        self.state.is_tracking
    }

    pub fn current_route(&self) -> &[Location] {
        &self.state.current_route
    }

    pub fn history(&self) -> &[Arc<Itinerary>] {
        &self.state.history
    }
}
