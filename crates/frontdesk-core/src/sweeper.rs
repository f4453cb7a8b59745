//! Background cleanup of idle sessions.

use crate::registry::SessionRegistry;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle to a running sweep loop.
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the loop to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

/// Spawn a task that drops sessions idle longer than `max_age`, checking
/// every `every`. Runs until the returned handle is shut down.
pub fn spawn_sweeper(
    registry: Arc<SessionRegistry>,
    every: Duration,
    max_age: chrono::Duration,
) -> SweeperHandle {
    let (stop, mut stopped) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // An interval's first tick completes immediately; skip it so the
        // first sweep happens one full period after startup.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let swept = registry.sweep_expired(max_age);
                    if swept.is_empty() {
                        debug!("sweep found no idle sessions");
                    } else {
                        info!("swept idle sessions (count={})", swept.len());
                    }
                }
                _ = stopped.changed() => {
                    debug!("sweeper stopping");
                    break;
                }
            }
        }
    });
    SweeperHandle { stop, task }
}

#[cfg(test)]
mod tests {
    use super::spawn_sweeper;
    use crate::registry::SessionRegistry;
    use frontdesk_store::{HistoryStore, MemoryKvStore};
    use std::sync::Arc;
    use std::time::Duration;

    fn registry() -> Arc<SessionRegistry> {
        let history = Arc::new(HistoryStore::new(Arc::new(MemoryKvStore::new()), 60));
        Arc::new(SessionRegistry::new(history))
    }

    #[tokio::test]
    async fn sweeps_idle_sessions_on_a_timer() {
        let registry = registry();
        registry.create("s1");
        registry.create("s2");

        // A negative age limit makes every session count as idle.
        let handle = spawn_sweeper(
            registry.clone(),
            Duration::from_millis(10),
            chrono::Duration::seconds(-1),
        );
        tokio::time::sleep(Duration::from_millis(80)).await;
        handle.shutdown().await;

        assert!(registry.get("s1").is_none());
        assert!(registry.get("s2").is_none());
    }

    #[tokio::test]
    async fn fresh_sessions_survive_sweeps() {
        let registry = registry();
        registry.create("s1");

        let handle = spawn_sweeper(
            registry.clone(),
            Duration::from_millis(10),
            chrono::Duration::hours(24),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown().await;

        assert!(registry.get("s1").is_some());
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop_before_the_first_tick() {
        let registry = registry();
        registry.create("s1");

        let handle = spawn_sweeper(
            registry.clone(),
            Duration::from_secs(3600),
            chrono::Duration::seconds(-1),
        );
        handle.shutdown().await;
        assert!(registry.get("s1").is_some());
    }
}
