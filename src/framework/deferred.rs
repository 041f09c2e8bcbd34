//! # Deferred Values
//!
//! A single-assignment async value with two terminal states.
//!
//! - [`Deferred`] is the settling half. Whoever creates it decides when (and
//!   whether) it resolves or rejects. It is cheap to clone.
//! - [`Promise`] is the observing half. Any number of holders can read its
//!   state, `.await` it, or attach continuations.
//!
//! Both halves share one [`tokio::sync::watch`] channel. The first settle wins;
//! every later call is a no-op that returns `false`. When every `Deferred`
//! handle is dropped while the value is still pending, observers are released
//! with [`Rejection::Abandoned`].
//!
//! Continuations attached with [`Promise::on_settled`] (and so
//! [`Promise::then`]) are counted per value until they have run;
//! [`Promise::continuations_done`] waits for that count to drain.
//!
//! ```rust
//! use applitude::framework::Deferred;
//!
//! #[tokio::main]
//! async fn main() {
//!     let deferred = Deferred::new();
//!     let promise = deferred.promise();
//!
//!     assert!(deferred.resolve(42));
//!     assert!(!deferred.resolve(7));
//!     assert_eq!(promise.await, Ok(42));
//! }
//! ```

use crate::error::Rejection;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Snapshot of a deferred value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromiseState<T> {
    Pending,
    Fulfilled(T),
    Rejected(Rejection),
}

impl<T> PromiseState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, PromiseState::Pending)
    }

    fn into_result(self) -> Result<T, Rejection> {
        match self {
            PromiseState::Fulfilled(value) => Ok(value),
            PromiseState::Rejected(reason) => Err(reason),
            PromiseState::Pending => Err(Rejection::Abandoned),
        }
    }
}

/// Continuations attached to one value that have not finished running.
type Continuations = Arc<watch::Sender<usize>>;

fn continuations() -> Continuations {
    Arc::new(watch::channel(0).0)
}

/// Decrements the continuation count when the continuation finishes, panics,
/// or is aborted before it runs.
struct ContinuationGuard(Continuations);

impl ContinuationGuard {
    fn enter(continuations: &Continuations) -> Self {
        continuations.send_modify(|running| *running += 1);
        Self(continuations.clone())
    }
}

impl Drop for ContinuationGuard {
    fn drop(&mut self) {
        self.0.send_modify(|running| *running -= 1);
    }
}

/// The settling half of a deferred value.
pub struct Deferred<T> {
    sender: Arc<watch::Sender<PromiseState<T>>>,
    continuations: Continuations,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            continuations: self.continuations.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("state", &*self.sender.borrow())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Deferred<T> {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(PromiseState::Pending);
        Self {
            sender: Arc::new(sender),
            continuations: continuations(),
        }
    }

    /// A new observer of this value.
    pub fn promise(&self) -> Promise<T> {
        Promise {
            receiver: self.sender.subscribe(),
            continuations: self.continuations.clone(),
        }
    }

    /// Fulfills the value. Returns `false` if it had already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(PromiseState::Fulfilled(value))
    }

    /// Rejects the value. Returns `false` if it had already settled.
    pub fn reject(&self, reason: impl Into<Rejection>) -> bool {
        self.settle(PromiseState::Rejected(reason.into()))
    }

    pub fn is_settled(&self) -> bool {
        !self.sender.borrow().is_pending()
    }

    fn settle(&self, outcome: PromiseState<T>) -> bool {
        self.sender.send_if_modified(|state| {
            if state.is_pending() {
                *state = outcome;
                true
            } else {
                false
            }
        })
    }
}

/// The observing half of a deferred value.
///
/// Awaiting a `Promise` (it implements [`IntoFuture`]) yields
/// `Result<T, Rejection>`. Continuations attached with [`Promise::on_settled`]
/// or [`Promise::then`] run on their own Tokio task, so they need an ambient
/// runtime.
pub struct Promise<T> {
    receiver: watch::Receiver<PromiseState<T>>,
    continuations: Continuations,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            continuations: self.continuations.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &*self.receiver.borrow())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Promise<T> {
    /// An already-fulfilled promise.
    pub fn resolved(value: T) -> Self {
        Self::settled_with(PromiseState::Fulfilled(value))
    }

    /// An already-rejected promise.
    pub fn rejected(reason: impl Into<Rejection>) -> Self {
        Self::settled_with(PromiseState::Rejected(reason.into()))
    }

    fn settled_with(state: PromiseState<T>) -> Self {
        // The receiver keeps the final value readable after the sender is gone.
        let (_, receiver) = watch::channel(state);
        Self {
            receiver,
            continuations: continuations(),
        }
    }

    pub fn state(&self) -> PromiseState<T> {
        self.receiver.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.borrow().is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(*self.receiver.borrow(), PromiseState::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(*self.receiver.borrow(), PromiseState::Rejected(_))
    }

    /// Waits until the value settles.
    pub async fn settled(&self) -> Result<T, Rejection> {
        let mut receiver = self.receiver.clone();
        let state = match receiver.wait_for(|state| !state.is_pending()).await {
            Ok(state) => (*state).clone(),
            Err(_) => PromiseState::Rejected(Rejection::Abandoned),
        };
        state.into_result()
    }

    /// Runs `f` with the outcome once the value settles.
    pub fn on_settled<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<T, Rejection>) + Send + 'static,
    {
        let guard = ContinuationGuard::enter(&self.continuations);
        let promise = self.clone();
        tokio::spawn(async move {
            let outcome = promise.settled().await;
            f(outcome);
            drop(guard);
        })
    }

    /// Waits until every continuation attached so far (and any attached while
    /// waiting) has run. Once the value has settled, this covers every
    /// reaction to the settlement.
    pub async fn continuations_done(&self) {
        let mut running = self.continuations.subscribe();
        // The sender is held by `self`, so the channel cannot close here.
        let _ = running.wait_for(|running| *running == 0).await;
    }

    /// Derives a promise that fulfills with `f(value)`, or carries the
    /// rejection through untouched.
    pub fn then<U, F>(&self, f: F) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let next = Deferred::new();
        let promise = next.promise();
        self.on_settled(move |outcome| {
            match outcome {
                Ok(value) => next.resolve(f(value)),
                Err(reason) => next.reject(reason),
            };
        });
        promise
    }

    /// Drops the value, keeping only the outcome.
    pub fn signal(&self) -> Promise<()> {
        match self.state() {
            PromiseState::Fulfilled(_) => Promise::resolved(()),
            PromiseState::Rejected(reason) => Promise::rejected(reason),
            PromiseState::Pending => self.then(|_| ()),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> IntoFuture for Promise<T> {
    type Output = Result<T, Rejection>;
    type IntoFuture = BoxFuture<'static, Result<T, Rejection>>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.settled().await }.boxed()
    }
}

/// Fulfills with every value, in order, once all promises fulfill; rejects
/// with the first rejection. The member set is fixed at call time.
pub fn when_all<T, I>(promises: I) -> Promise<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises: Vec<Promise<T>> = promises.into_iter().collect();
    if promises.is_empty() {
        return Promise::resolved(Vec::new());
    }

    let deferred = Deferred::new();
    let aggregate = deferred.promise();
    tokio::spawn(async move {
        match future::try_join_all(promises.into_iter().map(IntoFuture::into_future)).await {
            Ok(values) => deferred.resolve(values),
            Err(reason) => deferred.reject(reason),
        };
    });
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_first_settle_wins() {
        let deferred = Deferred::new();
        let promise = deferred.promise();
        assert!(promise.is_pending());

        assert!(deferred.reject("nope"));
        assert!(!deferred.resolve(1));
        assert!(promise.is_rejected());
        assert_eq!(promise.await, Err(Rejection::reason("nope")));
    }

    #[tokio::test]
    async fn test_settled_constructors() {
        assert_eq!(Promise::resolved("ok").state(), PromiseState::Fulfilled("ok"));
        assert!(Promise::<()>::rejected("bad").is_rejected());
        assert_eq!(Promise::resolved(3).await, Ok(3));
    }

    #[tokio::test]
    async fn test_dropped_deferred_releases_observers() {
        let deferred = Deferred::<u8>::new();
        let promise = deferred.promise();
        drop(deferred);

        let outcome = timeout(Duration::from_secs(1), promise.settled())
            .await
            .expect("observer should be released");
        assert_eq!(outcome, Err(Rejection::Abandoned));
    }

    #[tokio::test]
    async fn test_then_maps_and_forwards_rejection() {
        let deferred = Deferred::new();
        let doubled = deferred.promise().then(|n: u32| n * 2);
        deferred.resolve(21);
        assert_eq!(doubled.await, Ok(42));

        let failing = Deferred::<u32>::new();
        let mapped = failing.promise().then(|n| n + 1);
        failing.reject("broken");
        assert_eq!(mapped.await, Err(Rejection::reason("broken")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_continuations_done_waits_for_reactions() {
        let deferred = Deferred::new();
        let promise = deferred.promise();
        let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        for _ in 0..8 {
            let seen = seen.clone();
            promise.on_settled(move |_: Result<(), Rejection>| {
                std::thread::sleep(Duration::from_millis(2));
                seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });
        }

        deferred.resolve(());
        timeout(Duration::from_secs(1), promise.continuations_done())
            .await
            .expect("continuations should drain");
        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_when_all_collects_in_order() {
        let first = Deferred::new();
        let second = Deferred::new();
        let all = when_all([first.promise(), second.promise()]);

        second.resolve("b");
        tokio::task::yield_now().await;
        assert!(all.is_pending());

        first.resolve("a");
        assert_eq!(all.await, Ok(vec!["a", "b"]));
    }

    #[tokio::test]
    async fn test_when_all_rejects_on_first_failure() {
        let never = Deferred::<()>::new();
        let failing = Deferred::<()>::new();
        let all = when_all([never.promise(), failing.promise()]);

        failing.reject("boom");
        let outcome = timeout(Duration::from_secs(1), all.settled())
            .await
            .expect("rejection should short-circuit");
        assert_eq!(outcome, Err(Rejection::reason("boom")));
    }

    #[tokio::test]
    async fn test_when_all_of_nothing_is_fulfilled() {
        let all = when_all(Vec::<Promise<()>>::new());
        assert!(all.is_fulfilled());
    }
}
