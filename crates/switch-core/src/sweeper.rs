//! Background task that periodically expires overdue switches.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::store::SwitchStore;

/// How often the sweep runs unless configured otherwise.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A switch store shared between user-facing code and the sweeper.
pub type SharedStore = Arc<Mutex<SwitchStore>>;

/// Runs [`SwitchStore::sweep`] on a fixed interval.
pub struct Sweeper {
    store: SharedStore,
    interval: Duration,
}

impl Sweeper {
    /// Create a sweeper with the default 60 second interval.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Set the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn the sweep loop onto the current tokio runtime.
    ///
    /// The first sweep happens one full interval after spawning. Each sweep
    /// runs on the blocking pool while holding the store lock, since the
    /// repository may write to disk.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval = ?self.interval, "Starting switch sweeper");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut store = self.store.clone().lock_owned().await;
                        let swept = tokio::task::spawn_blocking(move || store.sweep()).await;
                        match swept {
                            Ok(Ok(expired)) if expired.is_empty() => debug!("Sweep found nothing to expire"),
                            Ok(Ok(expired)) => info!(count = expired.len(), "Sweep expired switches"),
                            Ok(Err(e)) => error!("Sweep failed: {}", e),
                            Err(e) => error!("Sweep task failed: {}", e),
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("Stopping switch sweeper");
                        break;
                    }
                }
            }
        });

        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Handle to a running sweeper.
///
/// Dropping the handle without calling [`SweeperHandle::shutdown`] aborts the task.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether the sweep loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::repository::{InMemoryRepository, JsonFileRepository, SwitchRepository};
    use crate::types::NewSwitch;
    use chrono::{TimeZone, Utc};

    fn shared_store(clock: &ManualClock) -> (SharedStore, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let store = SwitchStore::load_with_clock(repo.clone(), Arc::new(clock.clone())).unwrap();
        (Arc::new(Mutex::new(store)), repo)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_expires_overdue_switches() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let (store, repo) = shared_store(&clock);

        let id = store
            .lock()
            .await
            .create(NewSwitch::new("msg", 24).with_grace_period(12))
            .unwrap()
            .id;

        let handle = Sweeper::new(store.clone()).spawn();

        clock.advance(chrono::Duration::hours(37));
        tokio::time::sleep(DEFAULT_SWEEP_INTERVAL + Duration::from_secs(1)).await;

        assert!(!store.lock().await.get(&id).unwrap().is_active);
        assert!(!repo.stored()[0].is_active);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_waits_a_full_interval() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let (store, _repo) = shared_store(&clock);

        let id = store.lock().await.create(NewSwitch::new("msg", 1)).unwrap().id;
        clock.advance(chrono::Duration::hours(2));

        let handle = Sweeper::new(store.clone())
            .with_interval(Duration::from_secs(10))
            .spawn();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.lock().await.get(&id).unwrap().is_active);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!store.lock().await.get(&id).unwrap().is_active);

        handle.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sweeper_writes_file_store_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switches.json");
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let repo = Arc::new(JsonFileRepository::new(&path));
        let mut store = SwitchStore::load_with_clock(repo, Arc::new(clock.clone())).unwrap();
        let id = store.create(NewSwitch::new("msg", 1)).unwrap().id;
        let store: SharedStore = Arc::new(Mutex::new(store));
        clock.advance(chrono::Duration::hours(2));

        let handle = Sweeper::new(store.clone())
            .with_interval(Duration::from_millis(20))
            .spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown().await;

        assert!(!store.lock().await.get(&id).unwrap().is_active);
        let on_disk = JsonFileRepository::new(&path).load_all().unwrap();
        assert!(!on_disk[0].is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let (store, _repo) = shared_store(&clock);

        let handle = Sweeper::new(store).spawn();
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }
}
