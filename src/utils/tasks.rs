use parking_lot::Mutex;
use std::future::Future;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Runs best-effort background work whose result nobody waits on.
///
/// Failures are logged, never returned. `flush` lets the owner drain
/// outstanding work on shutdown (and lets tests observe the effects).
#[derive(Default)]
pub struct TaskSpawner {
    tasks: Mutex<JoinSet<()>>,
}

impl TaskSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_logged<F, E>(&self, label: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        // reap finished tasks so the set does not grow without bound
        while tasks.try_join_next().is_some() {}

        tasks.spawn(async move {
            match future.await {
                Ok(()) => debug!("Background task '{}' completed", label),
                Err(e) => warn!("Background task '{}' failed: {}", label, e),
            }
        });
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Waits for every task spawned so far.
    pub async fn flush(&self) {
        let mut drained = std::mem::take(&mut *self.tasks.lock());
        while let Some(result) = drained.join_next().await {
            if let Err(e) = result {
                warn!("Background task panicked or was cancelled: {}", e);
            }
        }
    }
}
