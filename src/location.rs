//! Location providers
//!
//! A provider answers one request for the user's position per page load. The
//! browser-backed provider waits for the page to report what the device
//! geolocation API returned; the fixed provider answers from configuration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::LocationError;
use crate::models::Coordinate;

/// Outcome of a single geolocation request
pub type LocationOutcome = Result<Coordinate, LocationError>;

/// Yields the user's position once
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_current_location(&self) -> LocationOutcome;
}

/// Provider that always answers with a configured outcome
pub struct FixedLocationProvider {
    outcome: LocationOutcome,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn new(outcome: LocationOutcome) -> Self {
        Self { outcome }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn request_current_location(&self) -> LocationOutcome {
        debug!("Using fixed location outcome: {:?}", self.outcome);
        self.outcome
    }
}

/// One pending hand-off between the page and a location request
struct Handoff {
    sender: Option<oneshot::Sender<LocationOutcome>>,
    receiver: Option<oneshot::Receiver<LocationOutcome>>,
}

impl Handoff {
    fn armed() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            sender: Some(sender),
            receiver: Some(receiver),
        }
    }
}

type SharedHandoff = Arc<Mutex<Handoff>>;

fn lock(handoff: &SharedHandoff) -> MutexGuard<'_, Handoff> {
    handoff.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Provider fed by [`LocationReporter`] when the page reports its position
pub struct BrowserLocationProvider {
    handoff: SharedHandoff,
}

/// Half handed to the web layer; delivers one outcome per page load
pub struct LocationReporter {
    handoff: SharedHandoff,
}

/// Create a connected provider/reporter pair, armed for the first page load
#[must_use]
pub fn browser_channel() -> (BrowserLocationProvider, LocationReporter) {
    let handoff = Arc::new(Mutex::new(Handoff::armed()));
    (
        BrowserLocationProvider {
            handoff: Arc::clone(&handoff),
        },
        LocationReporter { handoff },
    )
}

#[async_trait]
impl LocationProvider for BrowserLocationProvider {
    async fn request_current_location(&self) -> LocationOutcome {
        let receiver = lock(&self.handoff).receiver.take();

        let Some(receiver) = receiver else {
            warn!("No page load is waiting to report a position");
            return Err(LocationError::PositionUnavailable);
        };

        debug!("Waiting for the page to report its position");
        receiver
            .await
            .unwrap_or(Err(LocationError::PositionUnavailable))
    }
}

impl LocationReporter {
    /// Deliver the page's outcome. Returns `false` if one was already delivered
    /// since the last [`rearm`](Self::rearm).
    pub fn report(&self, outcome: LocationOutcome) -> bool {
        let sender = lock(&self.handoff).sender.take();

        match sender {
            Some(sender) => {
                if sender.send(outcome).is_err() {
                    warn!("Location reported but nobody is waiting for it");
                }
                true
            }
            None => false,
        }
    }

    /// Accept a new report for a freshly loaded page. A request still waiting
    /// on the previous page load resolves as unavailable.
    pub fn rearm(&self) {
        debug!("Re-arming browser location hand-off");
        *lock(&self.handoff) = Handoff::armed();
    }

    #[must_use]
    pub fn is_delivered(&self) -> bool {
        lock(&self.handoff).sender.is_none()
    }
}
