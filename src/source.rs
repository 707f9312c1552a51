//! Boundary traits for the platform location service and permission prompt.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::WatchOptions;
use crate::location::Location;

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    Sample(Location),
    // terminal, e.g. the sensor went away
    Fault(String),
}

pub type SampleTx = mpsc::UnboundedSender<SourceEvent>;
pub type SampleRx = mpsc::UnboundedReceiver<SourceEvent>;

pub fn channel() -> (SampleTx, SampleRx) {
    mpsc::unbounded_channel()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub u64);

#[async_trait::async_trait]
pub trait PermissionGate: Send + Sync {
    /// May prompt the user, once per call.
    async fn request(&self) -> bool;
}

#[async_trait::async_trait]
pub trait LocationSource: Send + Sync {
    /// Start delivering samples into `tx` until `unsubscribe` is called with
    /// the returned handle.
    async fn subscribe(&self, options: &WatchOptions, tx: SampleTx) -> Result<SubscriptionHandle>;

    fn unsubscribe(&self, handle: SubscriptionHandle);

    async fn current_position(&self, timeout: Duration, max_age: Duration) -> Result<Location>;
}
