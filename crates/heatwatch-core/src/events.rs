//! Monitor event system.
//!
//! The [`Monitor`](crate::Monitor) publishes a [`MonitorEvent`] for every
//! location change and every pipeline run, so front ends can redraw charts
//! or log activity without polling.

use serde::Serialize;
use tokio::sync::broadcast;

use heatwatch_types::Location;

use crate::readings::Reading;
use crate::watcher::TransitionEvent;

/// Events emitted by the monitor.
///
/// All events are serializable for logging and IPC.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum MonitorEvent {
    /// A different location is now tracked; history was cleared.
    LocationChanged { location: Location },
    /// A reading was appended to the history.
    ReadingRecorded { location: Location, reading: Reading },
    /// The risk level changed between the two latest readings.
    RiskChanged {
        location: Location,
        transition: TransitionEvent,
    },
    /// A fetch failed; history is unchanged.
    FetchFailed { location: Location, error: String },
    /// A fetch finished after a newer one was issued and was discarded.
    FetchSuperseded { sequence: u64, latest: u64 },
}

/// Sender for monitor events.
pub type EventSender = broadcast::Sender<MonitorEvent>;

/// Receiver for monitor events.
pub type EventReceiver = broadcast::Receiver<MonitorEvent>;

/// Event dispatcher for sending events to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: MonitorEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}
