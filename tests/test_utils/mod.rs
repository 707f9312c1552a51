#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use itinerary_core::{
    config::WatchOptions,
    source::{LocationSource, PermissionGate, SampleTx, SourceEvent, SubscriptionHandle},
    ItineraryStore, Location, TrackerConfig, TrackingSession,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
struct FakeSourceInner {
    next_handle: u64,
    subscribers: HashMap<SubscriptionHandle, SampleTx>,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    last_options: Option<WatchOptions>,
    fail_subscribe: bool,
    current_position: Option<Location>,
}

/// In-memory location source. Samples are pushed by the test through `emit`.
#[derive(Default)]
pub struct FakeSource {
    inner: Mutex<FakeSourceInner>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeSource::default())
    }

    // returns the number of subscribers that got it
    pub fn emit(&self, location: Location) -> usize {
        self.send(SourceEvent::Sample(location))
    }

    pub fn fault(&self, message: &str) -> usize {
        self.send(SourceEvent::Fault(message.to_string()))
    }

    fn send(&self, event: SourceEvent) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .subscribers
            .values()
            .filter(|tx| tx.send(event.clone()).is_ok())
            .count()
    }

    /// Drops every sender, as a driver that went away would.
    pub fn close(&self) {
        self.inner.lock().unwrap().subscribers.clear();
    }

    /// A sender of the current subscription, kept by the test to simulate
    /// deliveries that race with `unsubscribe`.
    pub fn sender(&self) -> Option<SampleTx> {
        self.inner
            .lock()
            .unwrap()
            .subscribers
            .values()
            .next()
            .cloned()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.inner.lock().unwrap().subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.inner.lock().unwrap().unsubscribe_calls
    }

    pub fn last_options(&self) -> Option<WatchOptions> {
        self.inner.lock().unwrap().last_options.clone()
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.inner.lock().unwrap().fail_subscribe = fail;
    }

    pub fn set_current_position(&self, location: Option<Location>) {
        self.inner.lock().unwrap().current_position = location;
    }
}

#[async_trait::async_trait]
impl LocationSource for FakeSource {
    async fn subscribe(
        &self,
        options: &WatchOptions,
        tx: SampleTx,
    ) -> anyhow::Result<SubscriptionHandle> {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribe_calls += 1;
        inner.last_options = Some(options.clone());
        if inner.fail_subscribe {
            anyhow::bail!("location services are disabled");
        }
        inner.next_handle += 1;
        let handle = SubscriptionHandle(inner.next_handle);
        inner.subscribers.insert(handle, tx);
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.unsubscribe_calls += 1;
        inner.subscribers.remove(&handle);
    }

    async fn current_position(
        &self,
        _timeout: Duration,
        _max_age: Duration,
    ) -> anyhow::Result<Location> {
        self.inner
            .lock()
            .unwrap()
            .current_position
            .ok_or_else(|| anyhow::anyhow!("no position fix"))
    }
}

pub struct FakePermission {
    granted: AtomicBool,
    requests: AtomicUsize,
}

impl FakePermission {
    pub fn new(granted: bool) -> Arc<Self> {
        Arc::new(FakePermission {
            granted: AtomicBool::new(granted),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PermissionGate for FakePermission {
    async fn request(&self) -> bool {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.granted.load(Ordering::SeqCst)
    }
}

pub type FakeSession = TrackingSession<FakeSource, FakePermission>;

pub fn setup(
    granted: bool,
) -> (
    Arc<FakeSource>,
    Arc<FakePermission>,
    FakeSession,
    ItineraryStore,
) {
    init_logging();
    let source = FakeSource::new();
    let permission = FakePermission::new(granted);
    let session = TrackingSession::new(
        source.clone(),
        permission.clone(),
        TrackerConfig::default(),
    );
    (source, permission, session, ItineraryStore::new())
}

/// A walk heading north-east from People's Square, one sample every 5 seconds.
pub fn walk(n: usize) -> Vec<Location> {
    const START_LAT: f64 = 31.2304;
    const START_LNG: f64 = 121.4737;
    const START_TIMESTAMP_MS: i64 = 1697349116449;
    (0..n)
        .map(|i| {
            Location::new(
                START_LAT + 0.0002 * i as f64,
                START_LNG + 0.0001 * i as f64,
                START_TIMESTAMP_MS + 5000 * i as i64,
            )
        })
        .collect()
}
