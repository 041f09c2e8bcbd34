//! # Mock Framework
//!
//! Utilities for testing modules without a real host.
//!
//! - [`MockLoad`] is a scripted load capability: queue the outcomes it should
//!   return, hand [`MockLoad::capability`] to a descriptor, then
//!   [`verify`](MockLoad::verify) how often it was called.
//! - [`RenderProbe`] is a render capability that reports every call, so a test
//!   can await the render (or assert that none happens within a window).
//!
//! # Example
//! ```ignore
//! let load = MockLoad::new().return_pending(loading.promise());
//! let probe = RenderProbe::new();
//!
//! app.register("cart", Descriptor::new()
//!     .on_load(load.capability())
//!     .on_render(probe.capability()));
//!
//! loading.resolve(());
//! assert_eq!(probe.next_within(Duration::from_secs(1)).await, Some(Ok(())));
//! load.verify(1);
//! ```

use crate::domain::{Loaded, Readiness};
use crate::error::LoadError;
use crate::framework::Promise;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

// =============================================================================
// LOAD
// =============================================================================

/// A load capability that returns queued outcomes in order, then `Ready`.
#[derive(Clone, Default)]
pub struct MockLoad {
    outcomes: Arc<Mutex<VecDeque<Result<Loaded, LoadError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockLoad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn return_ready(self) -> Self {
        self.outcomes.lock().push_back(Ok(Loaded::Ready));
        self
    }

    pub fn return_pending(self, loading: Promise<()>) -> Self {
        self.outcomes.lock().push_back(Ok(Loaded::Pending(loading)));
        self
    }

    pub fn return_err(self, message: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .push_back(Err(LoadError::new(message)));
        self
    }

    /// The closure to install with [`Descriptor::on_load`](crate::domain::Descriptor::on_load).
    pub fn capability(&self) -> impl Fn() -> Result<Loaded, LoadError> + Send + Sync + 'static {
        let outcomes = self.outcomes.clone();
        let calls = self.calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            outcomes.lock().pop_front().unwrap_or(Ok(Loaded::Ready))
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Panics unless the capability ran exactly `expected` times.
    pub fn verify(&self, expected: usize) {
        let calls = self.calls();
        if calls != expected {
            panic!("load called {calls} time(s), expected {expected}");
        }
    }
}

// =============================================================================
// RENDER
// =============================================================================

/// A render capability that forwards each readiness it receives.
pub struct RenderProbe {
    sender: mpsc::UnboundedSender<Readiness>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<Readiness>>,
    count: Arc<AtomicUsize>,
}

impl Default for RenderProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderProbe {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The closure to install with [`Descriptor::on_render`](crate::domain::Descriptor::on_render).
    pub fn capability(&self) -> impl Fn(&Readiness) + Send + Sync + 'static {
        let sender = self.sender.clone();
        let count = self.count.clone();
        move |readiness: &Readiness| {
            count.fetch_add(1, Ordering::SeqCst);
            let _ = sender.send(readiness.clone());
        }
    }

    /// Renders seen so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Waits for the next render, or `None` once `timeout` elapses.
    pub async fn next_within(&self, timeout: Duration) -> Option<Readiness> {
        let mut receiver = self.receiver.lock().await;
        tokio::time::timeout(timeout, receiver.recv())
            .await
            .ok()
            .flatten()
    }

    /// True if no render arrives within `window`.
    pub async fn expect_none_within(&self, window: Duration) -> bool {
        self.next_within(window).await.is_none()
    }
}
