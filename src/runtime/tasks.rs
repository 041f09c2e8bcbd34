use parking_lot::Mutex;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::debug;

/// Keeps the handles of continuation tasks (deferred renders, async loads) so
/// they can be cut off at shutdown. Finished handles are pruned on each spawn.
#[derive(Debug, Default)]
pub struct TaskTracker {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut handles = self.handles.lock();
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
    }

    /// Tasks that have not run to completion yet.
    pub fn pending(&self) -> usize {
        self.handles
            .lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Aborts every unfinished task, waits for them to unwind, and returns how
    /// many were cut off.
    pub async fn abort_all(&self) -> usize {
        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        let mut aborted = 0;
        for handle in handles {
            if handle.is_finished() {
                continue;
            }
            handle.abort();
            if let Err(e) = handle.await {
                if e.is_cancelled() {
                    aborted += 1;
                } else {
                    debug!(error = %e, "Task failed before abort");
                }
            }
        }
        aborted
    }
}
