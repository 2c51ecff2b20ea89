//! Periodic update coordinator
//!
//! Owns the poll interval and the last successful snapshot. The pipeline
//! runs once eagerly at setup (a failure there should fail setup) and then
//! once per interval in a background task. A failed poll keeps the previous
//! snapshot and is retried on the next scheduled tick, not sooner; a forced
//! refresh runs immediately and restarts the interval timer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::api::{ApiClient, WeerliveError};
use crate::snapshot::Snapshot;

/// Source of weather snapshots.
///
/// The API client is the production implementation; tests substitute
/// scripted providers.
pub trait WeatherProvider: Send + Sync + 'static {
    /// Fetches a fresh snapshot.
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, WeerliveError>> + Send;
}

impl WeatherProvider for ApiClient {
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, WeerliveError>> + Send {
        ApiClient::fetch(self)
    }
}

/// Outcome of the most recent refresh attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateStatus {
    /// No refresh has been attempted yet.
    #[default]
    Uninitialized,
    /// The last refresh succeeded.
    Ready,
    /// The last refresh failed; the previous snapshot, if any, is retained.
    Failed,
}

/// Shared coordinator state, published on every refresh.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// Last successfully fetched snapshot, kept across failed polls.
    pub snapshot: Option<Arc<Snapshot>>,
    /// Outcome of the most recent refresh attempt.
    pub status: UpdateStatus,
}

impl CoordinatorState {
    /// True when at least one poll has ever succeeded.
    pub fn is_available(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Coordinates periodic fetching of weather snapshots.
pub struct Coordinator<P> {
    provider: Arc<P>,
    scan_interval: Duration,
    state_tx: watch::Sender<CoordinatorState>,
}

impl<P: WeatherProvider> Coordinator<P> {
    /// Creates a coordinator polling `provider` every `scan_interval`.
    pub fn new(provider: P, scan_interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(CoordinatorState::default());

        log::debug!(
            "Set up coordinator, with scan_interval of {} seconds",
            scan_interval.as_secs()
        );

        Self {
            provider: Arc::new(provider),
            scan_interval,
            state_tx,
        }
    }

    /// Last successfully fetched snapshot, if any.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.state_tx.borrow().snapshot.clone()
    }

    /// Current coordinator state.
    pub fn state(&self) -> CoordinatorState {
        self.state_tx.borrow().clone()
    }

    /// Subscribes to state updates; the receiver sees every refresh outcome.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state_tx.subscribe()
    }

    /// Runs the fetch pipeline once and publishes the outcome.
    ///
    /// On failure the previous snapshot is left untouched and the error is
    /// returned; the caller decides whether that is fatal (setup) or just a
    /// failed tick (steady state polling).
    pub async fn refresh(&self) -> Result<(), WeerliveError> {
        refresh_once(self.provider.as_ref(), &self.state_tx).await
    }

    /// Eager refresh during setup; an error here should fail setup.
    pub async fn first_refresh(&self) -> Result<(), WeerliveError> {
        self.refresh().await
    }

    /// Spawns the steady state polling loop.
    ///
    /// The first interval tick is skipped because setup is expected to have
    /// called [`Coordinator::first_refresh`] already. A failed tick only
    /// logs; the retry is the next scheduled tick.
    pub fn spawn(&self) -> RefreshHandle {
        let (force_tx, mut force_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let provider = Arc::clone(&self.provider);
        let state_tx = self.state_tx.clone();
        let scan_interval = self.scan_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(scan_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; setup already fetched.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = refresh_once(provider.as_ref(), &state_tx).await;
                    }
                    Some(()) = force_rx.recv() => {
                        let _ = refresh_once(provider.as_ref(), &state_tx).await;
                        // A forced refresh restarts the wait for the next tick.
                        interval.reset();
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        RefreshHandle {
            force_tx,
            shutdown_tx,
        }
    }
}

async fn refresh_once<P: WeatherProvider>(
    provider: &P,
    state_tx: &watch::Sender<CoordinatorState>,
) -> Result<(), WeerliveError> {
    match provider.fetch().await {
        Ok(snapshot) => {
            state_tx.send_modify(|state| {
                state.snapshot = Some(Arc::new(snapshot));
                state.status = UpdateStatus::Ready;
            });
            Ok(())
        }
        Err(error) => {
            log::error!("Update failed! - {error}");
            state_tx.send_modify(|state| state.status = UpdateStatus::Failed);
            Err(error)
        }
    }
}

/// Handle for controlling the background polling loop.
pub struct RefreshHandle {
    force_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Requests an immediate refresh and resets the interval timer.
    pub async fn request_refresh(&self) {
        let _ = self.force_tx.send(()).await;
    }

    /// Stops the background polling loop.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that replays a queue of results; once the queue runs dry it
    /// keeps failing.
    struct ScriptedProvider {
        results: Mutex<VecDeque<Result<Snapshot, WeerliveError>>>,
    }

    impl ScriptedProvider {
        fn new(results: Vec<Result<Snapshot, WeerliveError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
            }
        }
    }

    impl WeatherProvider for ScriptedProvider {
        fn fetch(&self) -> impl Future<Output = Result<Snapshot, WeerliveError>> + Send {
            let next = self.results.lock().unwrap().pop_front();
            async move { next.unwrap_or(Err(WeerliveError::RateLimit)) }
        }
    }

    fn scripted_coordinator(
        results: Vec<Result<Snapshot, WeerliveError>>,
    ) -> Coordinator<ScriptedProvider> {
        Coordinator::new(ScriptedProvider::new(results), Duration::from_secs(300))
    }

    fn snapshot(tag: i64) -> Snapshot {
        Snapshot::new(json!({"liveweer": [{"lv": tag}]}))
    }

    #[tokio::test]
    async fn test_refresh_success_publishes_snapshot() {
        let coordinator = scripted_coordinator(vec![Ok(snapshot(1))]);

        assert_eq!(coordinator.state().status, UpdateStatus::Uninitialized);
        assert!(!coordinator.state().is_available());

        coordinator.refresh().await.expect("Refresh should succeed");

        let state = coordinator.state();
        assert_eq!(state.status, UpdateStatus::Ready);
        assert!(state.is_available());
        assert_eq!(*coordinator.current().unwrap(), snapshot(1));
    }

    #[tokio::test]
    async fn test_first_refresh_failure_propagates() {
        let coordinator = scripted_coordinator(vec![Err(WeerliveError::ApiKey)]);

        let result = coordinator.first_refresh().await;
        assert!(matches!(result, Err(WeerliveError::ApiKey)));

        let state = coordinator.state();
        assert_eq!(state.status, UpdateStatus::Failed);
        assert!(!state.is_available());
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_previous_snapshot() {
        let coordinator = scripted_coordinator(vec![Ok(snapshot(1)), Err(WeerliveError::RateLimit)]);

        coordinator.refresh().await.expect("First refresh should succeed");
        let before = coordinator.current().unwrap();

        coordinator.refresh().await.expect_err("Second refresh should fail");

        let state = coordinator.state();
        assert_eq!(state.status, UpdateStatus::Failed);
        assert_eq!(*coordinator.current().unwrap(), *before);
    }

    #[tokio::test]
    async fn test_recovery_after_failed_poll() {
        let coordinator = scripted_coordinator(vec![
            Ok(snapshot(1)),
            Err(WeerliveError::RateLimit),
            Ok(snapshot(2)),
        ]);

        coordinator.refresh().await.expect("First refresh should succeed");
        coordinator.refresh().await.expect_err("Second refresh should fail");
        coordinator.refresh().await.expect("Third refresh should succeed");

        let state = coordinator.state();
        assert_eq!(state.status, UpdateStatus::Ready);
        assert_eq!(*coordinator.current().unwrap(), snapshot(2));
    }

    #[tokio::test]
    async fn test_subscriber_sees_every_outcome() {
        let coordinator = scripted_coordinator(vec![Ok(snapshot(1)), Err(WeerliveError::RateLimit)]);
        let mut updates = coordinator.subscribe();

        coordinator.refresh().await.expect("Refresh should succeed");
        updates.changed().await.expect("Subscriber should be notified");
        assert_eq!(updates.borrow_and_update().status, UpdateStatus::Ready);

        coordinator.refresh().await.expect_err("Refresh should fail");
        updates.changed().await.expect("Subscriber should be notified");
        assert_eq!(updates.borrow_and_update().status, UpdateStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_loop_polls_on_interval() {
        let coordinator = scripted_coordinator(vec![Ok(snapshot(1)), Ok(snapshot(2))]);

        coordinator.first_refresh().await.expect("Setup refresh should succeed");
        let _handle = coordinator.spawn();

        let mut updates = coordinator.subscribe();
        updates.mark_unchanged();

        // Paused time advances once the runtime is idle, so the next change
        // is the first scheduled tick.
        updates.changed().await.expect("Tick should publish an update");
        assert_eq!(*coordinator.current().unwrap(), snapshot(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_refresh_polls_immediately() {
        let coordinator = scripted_coordinator(vec![Ok(snapshot(1)), Ok(snapshot(2))]);

        coordinator.first_refresh().await.expect("Setup refresh should succeed");
        let handle = coordinator.spawn();

        let mut updates = coordinator.subscribe();
        updates.mark_unchanged();

        handle.request_refresh().await;
        updates.changed().await.expect("Forced refresh should publish");
        assert_eq!(*coordinator.current().unwrap(), snapshot(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_polling() {
        let coordinator = scripted_coordinator(vec![Ok(snapshot(1)), Ok(snapshot(2))]);

        coordinator.first_refresh().await.expect("Setup refresh should succeed");
        let handle = coordinator.spawn();
        handle.shutdown().await;

        let mut updates = coordinator.subscribe();
        updates.mark_unchanged();

        // Two full intervals pass without the loop publishing anything.
        tokio::time::sleep(Duration::from_secs(700)).await;
        assert!(!updates.has_changed().expect("Sender should still be alive"));
        assert_eq!(*coordinator.current().unwrap(), snapshot(1));
    }
}
