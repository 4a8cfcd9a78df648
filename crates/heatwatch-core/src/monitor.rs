//! The fetch → normalize → append → check pipeline.
//!
//! [`MonitorState`] is the explicit state container: the tracked location,
//! its rolling history, and the sequence number of the latest issued fetch.
//! It is synchronous and can be driven directly in tests.
//!
//! [`Monitor`] wraps the state behind a lock and drives it from a
//! [`ReadingProvider`]. The lock is held only while a fetch is issued and
//! while its result is applied, never across the network call. Every fetch
//! carries a [`FetchTicket`]; a result whose ticket is no longer the latest
//! issued (because a newer fetch started or the location changed) is
//! discarded instead of appended.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use heatwatch_types::Location;

use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::events::{EventDispatcher, EventReceiver, MonitorEvent};
use crate::history::HistoryWindow;
use crate::normalize::ReadingNormalizer;
use crate::notify::{NotificationPermission, NotificationPolicy};
use crate::payload::ProviderPayload;
use crate::readings::Reading;
use crate::traits::{GeocodingProvider, NotificationSink, ReadingProvider};
use crate::watcher::{RiskTransitionWatcher, TransitionEvent};

/// Proof that a fetch was issued for a location.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    sequence: u64,
    location: Location,
}

impl FetchTicket {
    /// Monotonic request number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Location the fetch was issued for.
    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// Result of applying a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The reading was appended to the history.
    Recorded {
        reading: Reading,
        transition: Option<TransitionEvent>,
    },
    /// A newer fetch was issued first; the result was discarded.
    Superseded { sequence: u64, latest: u64 },
}

impl FetchOutcome {
    /// The recorded reading, if any.
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            FetchOutcome::Recorded { reading, .. } => Some(reading),
            FetchOutcome::Superseded { .. } => None,
        }
    }

    /// The detected transition, if any.
    pub fn transition(&self) -> Option<&TransitionEvent> {
        match self {
            FetchOutcome::Recorded { transition, .. } => transition.as_ref(),
            FetchOutcome::Superseded { .. } => None,
        }
    }
}

/// Owned pipeline state for a single tracked location.
#[derive(Debug, Clone)]
pub struct MonitorState {
    location: Option<Location>,
    history: HistoryWindow,
    issued: u64,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(crate::history::DEFAULT_CAPACITY)
    }
}

/// Smallest window in which a transition can be detected.
pub const MIN_CAPACITY: usize = 2;

impl MonitorState {
    /// Create a state with no location and an empty window of `capacity`.
    ///
    /// Capacities below [`MIN_CAPACITY`] are raised to it, since the
    /// transition check compares the two most recent readings.
    pub fn new(capacity: usize) -> Self {
        Self {
            location: None,
            history: HistoryWindow::with_capacity(capacity.max(MIN_CAPACITY)),
            issued: 0,
        }
    }

    /// The tracked location.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// The rolling history.
    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    /// The most recent reading.
    pub fn current(&self) -> Option<&Reading> {
        self.history.latest()
    }

    /// Sequence number of the latest issued fetch.
    pub fn latest_sequence(&self) -> u64 {
        self.issued
    }

    /// Track `location`.
    ///
    /// Returns `true` if it differs from the tracked one, in which case the
    /// history is cleared and any in-flight fetch becomes stale.
    pub fn select_location(&mut self, location: Location) -> bool {
        if self.history.tracks(&location) {
            self.location = Some(location);
            return false;
        }
        self.history.reset_for(&location);
        self.location = Some(location);
        self.issued += 1;
        true
    }

    /// Issue a new fetch for the tracked location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLocation`] if no location was selected.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket> {
        let location = self.location.clone().ok_or(Error::NoLocation)?;
        self.issued += 1;
        Ok(FetchTicket {
            sequence: self.issued,
            location,
        })
    }

    /// Apply the result of the fetch identified by `ticket`.
    ///
    /// Stale tickets yield [`FetchOutcome::Superseded`] whatever the result.
    /// Provider and payload errors are returned without touching the history.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        fetched: Result<ProviderPayload>,
        now: OffsetDateTime,
        normalizer: &ReadingNormalizer,
        watcher: &RiskTransitionWatcher,
    ) -> Result<FetchOutcome> {
        if ticket.sequence != self.issued {
            return Ok(FetchOutcome::Superseded {
                sequence: ticket.sequence,
                latest: self.issued,
            });
        }

        let reading = normalizer.normalize(&fetched?, now)?;
        self.history.append(reading.clone());
        let transition = watcher.check(&self.history);
        Ok(FetchOutcome::Recorded {
            reading,
            transition,
        })
    }
}

/// Async driver for the pipeline.
///
/// Cloning a monitor is cheap; clones share state, provider and events.
pub struct Monitor<P> {
    provider: Arc<P>,
    state: Arc<RwLock<MonitorState>>,
    normalizer: ReadingNormalizer,
    watcher: RiskTransitionWatcher,
    events: EventDispatcher,
    sink: Option<Arc<dyn NotificationSink>>,
    policy: Arc<RwLock<NotificationPolicy>>,
}

impl<P> Clone for Monitor<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            state: Arc::clone(&self.state),
            normalizer: self.normalizer.clone(),
            watcher: self.watcher,
            events: self.events.clone(),
            sink: self.sink.clone(),
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<P: ReadingProvider> Monitor<P> {
    /// Create a monitor with the default configuration.
    pub fn new(provider: P) -> Self {
        Self::build(provider, &MonitorConfig::default())
    }

    /// Create a monitor from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    pub fn with_config(provider: P, config: &MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(provider, config))
    }

    fn build(provider: P, config: &MonitorConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            state: Arc::new(RwLock::new(MonitorState::new(config.history_capacity))),
            normalizer: config.normalizer(),
            watcher: RiskTransitionWatcher::new(),
            events: EventDispatcher::new(config.event_capacity),
            sink: None,
            policy: Arc::new(RwLock::new(
                config.notifications.policy(NotificationPermission::Unknown),
            )),
        }
    }

    /// Attach a notification sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The reading provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Current notification policy.
    pub async fn notification_policy(&self) -> NotificationPolicy {
        *self.policy.read().await
    }

    /// Replace the notification policy.
    pub async fn set_notification_policy(&self, policy: NotificationPolicy) {
        *self.policy.write().await = policy;
    }

    /// Record the platform permission state.
    pub async fn set_permission(&self, permission: NotificationPermission) {
        self.policy.write().await.permission = permission;
    }

    /// Switch notifications on or off.
    pub async fn set_notifications_enabled(&self, enabled: bool) {
        self.policy.write().await.enabled = enabled;
    }

    /// Track `location`. Returns `true` if the tracked location changed.
    pub async fn select_location(&self, location: Location) -> bool {
        let changed = self.state.write().await.select_location(location.clone());
        if changed {
            info!(location = %location, "tracking new location, history cleared");
            self.events.send(MonitorEvent::LocationChanged { location });
        }
        changed
    }

    /// Run one pipeline cycle for the tracked location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLocation`] if no location was selected, or the
    /// provider or normalizer error for this run. The history is unchanged
    /// on error.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let ticket = self.state.write().await.begin_fetch()?;
        debug!(
            sequence = ticket.sequence(),
            location = %ticket.location(),
            provider = self.provider.name(),
            "fetching reading"
        );

        let fetched = self
            .provider
            .fetch_by_coordinates(ticket.location().coordinates)
            .await;

        let outcome = self.state.write().await.complete(
            &ticket,
            fetched,
            OffsetDateTime::now_utc(),
            &self.normalizer,
            &self.watcher,
        );

        let location = ticket.location;
        match &outcome {
            Ok(FetchOutcome::Recorded {
                reading,
                transition,
            }) => {
                debug!(
                    location = %location,
                    heat_index = reading.heat_index(),
                    risk = %reading.risk_level(),
                    "reading recorded"
                );
                self.events.send(MonitorEvent::ReadingRecorded {
                    location: location.clone(),
                    reading: reading.clone(),
                });
                if let Some(transition) = transition {
                    info!(
                        location = %location,
                        from = %transition.from,
                        to = %transition.to,
                        "risk level changed"
                    );
                    self.events.send(MonitorEvent::RiskChanged {
                        location,
                        transition: transition.clone(),
                    });
                    self.dispatch(transition).await;
                }
            }
            Ok(FetchOutcome::Superseded { sequence, latest }) => {
                debug!(sequence, latest, "discarding superseded fetch");
                self.events.send(MonitorEvent::FetchSuperseded {
                    sequence: *sequence,
                    latest: *latest,
                });
            }
            Err(e) => {
                warn!(location = %location, error = %e, "fetch failed, history unchanged");
                self.events.send(MonitorEvent::FetchFailed {
                    location,
                    error: e.to_string(),
                });
            }
        }

        outcome
    }

    async fn dispatch(&self, transition: &TransitionEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        if self.policy.read().await.should_notify() {
            sink.notify(transition.to, &transition.title(), &transition.body());
        } else {
            debug!("notification suppressed by policy");
        }
    }

    /// The tracked location.
    pub async fn location(&self) -> Option<Location> {
        self.state.read().await.location().cloned()
    }

    /// The most recent reading.
    pub async fn current(&self) -> Option<Reading> {
        self.state.read().await.current().cloned()
    }

    /// Snapshot of the rolling history.
    pub async fn history(&self) -> HistoryWindow {
        self.state.read().await.history().clone()
    }

    /// All readings in the window, oldest first.
    pub async fn readings(&self) -> Vec<Reading> {
        self.state.read().await.history().all()
    }
}

/// Resolve a place name to its best match.
///
/// # Errors
///
/// Returns [`Error::LocationNotFound`] when the geocoder has no match, or
/// the geocoder's own error.
pub async fn resolve_location<G>(geocoder: &G, query: &str) -> Result<Location>
where
    G: GeocodingProvider + ?Sized,
{
    geocoder
        .search(query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::LocationNotFound(query.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use heatwatch_types::{Coordinates, RiskLevel};

    use crate::mock::{MockGeocoder, MockProvider, RecordingSink, payload_with};

    fn delhi() -> Location {
        Location::new("Delhi", "IN", Coordinates::new(28.6139, 77.209).unwrap())
    }

    fn phoenix() -> Location {
        Location::new("Phoenix", "US", Coordinates::new(33.4484, -112.074).unwrap())
    }

    fn low() -> ProviderPayload {
        payload_with(25.0, 50.0, 10.0, 2.0, 5.0)
    }

    fn medium() -> ProviderPayload {
        payload_with(25.0, 50.0, 80.0, 2.0, 5.0)
    }

    fn high() -> ProviderPayload {
        payload_with(30.0, 10.0, 80.0, 2.0, 5.0)
    }

    fn apply(state: &mut MonitorState, payload: ProviderPayload) -> Result<FetchOutcome> {
        let ticket = state.begin_fetch()?;
        state.complete(
            &ticket,
            Ok(payload),
            OffsetDateTime::UNIX_EPOCH,
            &ReadingNormalizer::default(),
            &RiskTransitionWatcher::new(),
        )
    }

    #[test]
    fn test_fetch_requires_location() {
        let mut state = MonitorState::default();
        assert!(matches!(state.begin_fetch(), Err(Error::NoLocation)));
    }

    #[test]
    fn test_state_pipeline_records_and_detects() {
        let mut state = MonitorState::default();
        assert!(state.select_location(delhi()));

        let first = apply(&mut state, low()).unwrap();
        assert_eq!(first.reading().unwrap().risk_level(), RiskLevel::Low);
        assert!(first.transition().is_none());

        let second = apply(&mut state, high()).unwrap();
        let transition = second.transition().unwrap();
        assert_eq!((transition.from, transition.to), (RiskLevel::Low, RiskLevel::High));
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.current().unwrap().risk_level(), RiskLevel::High);
    }

    #[test]
    fn test_failed_fetch_leaves_history_unchanged() {
        let mut state = MonitorState::default();
        state.select_location(delhi());
        apply(&mut state, low()).unwrap();

        let ticket = state.begin_fetch().unwrap();
        let result = state.complete(
            &ticket,
            Err(Error::provider(502, "bad gateway")),
            OffsetDateTime::UNIX_EPOCH,
            &ReadingNormalizer::default(),
            &RiskTransitionWatcher::new(),
        );
        assert!(matches!(result, Err(Error::Provider { status: Some(502), .. })));

        let result = apply(&mut state, ProviderPayload::failed("Invalid key"));
        assert!(matches!(result, Err(Error::MalformedPayload(_))));
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_reselecting_same_location_keeps_history() {
        let mut state = MonitorState::default();
        state.select_location(delhi());
        apply(&mut state, low()).unwrap();

        assert!(!state.select_location(delhi()));
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_location_change_resets_and_supersedes() {
        let mut state = MonitorState::default();
        state.select_location(delhi());
        apply(&mut state, low()).unwrap();
        let in_flight = state.begin_fetch().unwrap();

        assert!(state.select_location(phoenix()));
        assert!(state.history().is_empty());
        assert!(state.history().tracks(&phoenix()));

        let outcome = state
            .complete(
                &in_flight,
                Ok(high()),
                OffsetDateTime::UNIX_EPOCH,
                &ReadingNormalizer::default(),
                &RiskTransitionWatcher::new(),
            )
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::Superseded { .. }));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_stale_error_is_superseded() {
        let mut state = MonitorState::default();
        state.select_location(delhi());
        let stale = state.begin_fetch().unwrap();
        let _fresh = state.begin_fetch().unwrap();

        let outcome = state
            .complete(
                &stale,
                Err(Error::network("timeout")),
                OffsetDateTime::UNIX_EPOCH,
                &ReadingNormalizer::default(),
                &RiskTransitionWatcher::new(),
            )
            .unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Superseded {
                sequence: stale.sequence(),
                latest: stale.sequence() + 1,
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_without_location() {
        let monitor = Monitor::new(MockProvider::new());
        assert!(matches!(monitor.refresh().await, Err(Error::NoLocation)));
        assert_eq!(monitor.provider().fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_emits_events() {
        let monitor = Monitor::new(MockProvider::with_payload(low()));
        let mut events = monitor.subscribe();

        monitor.select_location(delhi()).await;
        monitor.refresh().await.unwrap();
        monitor.provider().set_payload(medium()).await;
        monitor.refresh().await.unwrap();

        assert!(matches!(events.recv().await.unwrap(), MonitorEvent::LocationChanged { .. }));
        assert!(matches!(events.recv().await.unwrap(), MonitorEvent::ReadingRecorded { .. }));
        assert!(matches!(events.recv().await.unwrap(), MonitorEvent::ReadingRecorded { .. }));
        match events.recv().await.unwrap() {
            MonitorEvent::RiskChanged { transition, .. } => {
                assert_eq!(transition.to, RiskLevel::Medium);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(
            monitor.provider().requests().await,
            vec![delhi().coordinates, delhi().coordinates]
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_emits_fetch_failed() {
        let monitor = Monitor::new(MockProvider::new());
        monitor.select_location(delhi()).await;
        monitor.refresh().await.unwrap();

        let mut events = monitor.subscribe();
        monitor.provider().push_failure(Some(500), "upstream down").await;
        assert!(monitor.refresh().await.is_err());
        assert_eq!(monitor.readings().await.len(), 1);
        match events.recv().await.unwrap() {
            MonitorEvent::FetchFailed { error, .. } => assert!(error.contains("upstream down")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_notifications_follow_policy() {
        let sink = Arc::new(RecordingSink::new());
        let monitor = Monitor::new(MockProvider::new()).with_sink(sink.clone());
        monitor.select_location(delhi()).await;

        for payload in [low(), high()] {
            monitor.provider().push_payload(payload).await;
        }
        monitor.refresh().await.unwrap();
        monitor.refresh().await.unwrap();
        assert_eq!(sink.count(), 0, "disabled by default");

        monitor.set_notifications_enabled(true).await;
        monitor.set_permission(NotificationPermission::Denied).await;
        monitor.provider().push_payload(low()).await;
        monitor.refresh().await.unwrap();
        assert_eq!(sink.count(), 0, "permission denied");

        monitor.set_permission(NotificationPermission::Granted).await;
        monitor.provider().push_payload(high()).await;
        monitor.refresh().await.unwrap();
        assert_eq!(sink.count(), 1);
        let sent = sink.notifications().remove(0);
        assert_eq!(sent.level, RiskLevel::High);
        assert_eq!(sent.title, "Risk rising: High");

        // Unchanged level: no further notification
        monitor.provider().push_payload(high()).await;
        monitor.refresh().await.unwrap();
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refresh_latest_wins() {
        let monitor = Monitor::new(MockProvider::new());
        monitor.select_location(delhi()).await;
        monitor
            .provider()
            .push_delayed_payload(high(), Duration::from_secs(5))
            .await;
        monitor.provider().push_payload(low()).await;

        let slow = monitor.refresh();
        let fast = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            monitor.refresh().await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert!(matches!(slow.unwrap(), FetchOutcome::Superseded { .. }));
        assert_eq!(fast.unwrap().reading().unwrap().risk_level(), RiskLevel::Low);

        let readings = monitor.readings().await;
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].risk_level(), RiskLevel::Low);
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_change_mid_flight_discards_result() {
        let monitor = Monitor::new(MockProvider::new());
        monitor.select_location(delhi()).await;
        monitor
            .provider()
            .push_delayed_payload(high(), Duration::from_secs(5))
            .await;

        let in_flight = monitor.refresh();
        let switch = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            monitor.select_location(phoenix()).await
        };
        let (outcome, changed) = tokio::join!(in_flight, switch);

        assert!(changed);
        assert!(matches!(outcome.unwrap(), FetchOutcome::Superseded { .. }));
        assert!(monitor.history().await.is_empty());
        assert_eq!(monitor.location().await, Some(phoenix()));
    }

    #[test]
    fn test_state_capacity_floor_keeps_transitions() {
        let mut state = MonitorState::new(1);
        assert_eq!(state.history().capacity(), MIN_CAPACITY);

        state.select_location(delhi());
        let normalizer = ReadingNormalizer::default();
        let watcher = RiskTransitionWatcher::new();
        let now = OffsetDateTime::UNIX_EPOCH;

        let ticket = state.begin_fetch().unwrap();
        let first = state
            .complete(&ticket, Ok(low()), now, &normalizer, &watcher)
            .unwrap();
        assert!(first.transition().is_none());

        let ticket = state.begin_fetch().unwrap();
        let second = state
            .complete(&ticket, Ok(medium()), now, &normalizer, &watcher)
            .unwrap();
        let transition = second.transition().unwrap();
        assert_eq!((transition.from, transition.to), (RiskLevel::Low, RiskLevel::Medium));
        assert_eq!(state.history().len(), 2);
    }

    #[tokio::test]
    async fn test_with_config_rejects_invalid() {
        let config = MonitorConfig {
            history_capacity: 0,
            ..Default::default()
        };
        let result = Monitor::with_config(MockProvider::new(), &config);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_resolve_location() {
        let geocoder = MockGeocoder::new(vec![delhi(), phoenix()]);
        assert_eq!(resolve_location(&geocoder, "phoe").await.unwrap(), phoenix());
        assert!(matches!(
            resolve_location(&geocoder, " Atlantis ").await,
            Err(Error::LocationNotFound(q)) if q == "Atlantis"
        ));
    }
}
