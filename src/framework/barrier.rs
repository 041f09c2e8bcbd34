//! # Join Barrier
//!
//! A [`Promise`] that waits on a set of members which may keep growing after
//! construction, even after some members have already settled.
//!
//! ## Settlement rules
//!
//! - Fulfills once the outstanding count drops to zero. A fulfilled member is
//!   only counted down after every continuation attached to it
//!   ([`Promise::on_settled`], [`Promise::then`]) has run, so a member pushed
//!   in reaction to a fulfillment is counted first, on any runtime flavor.
//!   The zero crossing then settles from a fresh task that yields once and
//!   re-checks the count, which also gives pushes from code that simply
//!   awaited the member a turn to land.
//! - Rejects as soon as any member rejects, whatever the count.
//! - Settles exactly once. A barrier built with no members is fulfilled from
//!   the start.
//!
//! `push` bumps the counter for the whole batch before any completion handler
//! is attached, so two pushes in the same turn are both counted before either
//! member can decrement. The settled check, the count update and the settle
//! itself all happen under one lock, so a push is either counted or refused,
//! never accepted by a barrier that has already locked in.
//!
//! What happens to members pushed after settlement is governed by
//! [`LateJoin`].

use super::deferred::{Deferred, Promise};
use crate::error::{BarrierError, Rejection};
use parking_lot::Mutex;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Policy for members pushed onto an already-settled barrier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateJoin {
    /// Accept the push, log it, and leave the outcome untouched.
    #[default]
    Ignore,
    /// Refuse the push with [`BarrierError::AlreadySettled`].
    Reject,
}

#[derive(Debug, Default)]
struct Counts {
    outstanding: usize,
    joined: usize,
}

struct BarrierInner {
    counts: Mutex<Counts>,
    done: Deferred<()>,
    late_join: LateJoin,
}

/// A growable join over `Promise<()>` members.
///
/// Cloning shares the same barrier.
#[derive(Clone)]
pub struct JoinBarrier {
    inner: Arc<BarrierInner>,
}

impl fmt::Debug for JoinBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.inner.counts.lock();
        f.debug_struct("JoinBarrier")
            .field("outstanding", &counts.outstanding)
            .field("joined", &counts.joined)
            .field("settled", &self.inner.done.is_settled())
            .field("late_join", &self.inner.late_join)
            .finish()
    }
}

impl JoinBarrier {
    /// Creates a barrier over `initial` with the default [`LateJoin::Ignore`].
    pub fn new<I>(initial: I) -> Self
    where
        I: IntoIterator<Item = Promise<()>>,
    {
        Self::with_policy(LateJoin::default(), initial)
    }

    pub fn with_policy<I>(late_join: LateJoin, initial: I) -> Self
    where
        I: IntoIterator<Item = Promise<()>>,
    {
        let initial: Vec<Promise<()>> = initial.into_iter().collect();
        let barrier = Self {
            inner: Arc::new(BarrierInner {
                counts: Mutex::new(Counts {
                    outstanding: initial.len(),
                    joined: initial.len(),
                }),
                done: Deferred::new(),
                late_join,
            }),
        };

        if initial.is_empty() {
            barrier.inner.done.resolve(());
        } else {
            barrier.watch(initial);
        }
        barrier
    }

    /// Adds members to the barrier.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn push<I>(&self, members: I) -> Result<(), BarrierError>
    where
        I: IntoIterator<Item = Promise<()>>,
    {
        let members: Vec<Promise<()>> = members.into_iter().collect();
        if members.is_empty() {
            return Ok(());
        }

        {
            let mut counts = self.inner.counts.lock();
            if self.inner.done.is_settled() {
                return match self.inner.late_join {
                    LateJoin::Ignore => {
                        warn!(late = members.len(), "Barrier already settled, push ignored");
                        Ok(())
                    }
                    LateJoin::Reject => Err(BarrierError::AlreadySettled(members.len())),
                };
            }
            counts.outstanding += members.len();
            counts.joined += members.len();
            debug!(
                added = members.len(),
                outstanding = counts.outstanding,
                "Barrier members joined"
            );
        }

        self.watch(members);
        Ok(())
    }

    /// Spawns one watcher per already-counted member.
    fn watch(&self, members: Vec<Promise<()>>) {
        for member in members {
            let barrier = self.clone();
            tokio::spawn(async move {
                match member.settled().await {
                    Ok(()) => {
                        member.continuations_done().await;
                        barrier.member_fulfilled();
                    }
                    Err(reason) => barrier.member_rejected(reason),
                }
            });
        }
    }

    fn member_rejected(&self, reason: Rejection) {
        let _counts = self.inner.counts.lock();
        if self.inner.done.reject(reason.clone()) {
            warn!(error = %reason, "Barrier rejected");
        }
    }

    fn member_fulfilled(&self) {
        {
            let mut counts = self.inner.counts.lock();
            counts.outstanding = counts.outstanding.saturating_sub(1);
            if counts.outstanding > 0 {
                return;
            }
        }

        let barrier = self.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            barrier.try_settle();
        });
    }

    fn try_settle(&self) {
        let counts = self.inner.counts.lock();
        if counts.outstanding == 0 && self.inner.done.resolve(()) {
            debug!(members = counts.joined, "Barrier fulfilled");
        }
    }

    /// The barrier's own outcome.
    pub fn promise(&self) -> Promise<()> {
        self.inner.done.promise()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.done.is_settled()
    }

    /// Members that have not fulfilled yet.
    pub fn outstanding(&self) -> usize {
        self.inner.counts.lock().outstanding
    }

    /// Every member ever accepted, settled or not.
    pub fn joined(&self) -> usize {
        self.inner.counts.lock().joined
    }

    pub fn late_join(&self) -> LateJoin {
        self.inner.late_join
    }
}

impl From<&JoinBarrier> for Promise<()> {
    fn from(barrier: &JoinBarrier) -> Self {
        barrier.promise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    async fn settle_ticks() {
        sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_fulfills_when_every_member_fulfills() {
        let a = Deferred::new();
        let b = Deferred::new();
        let c = Deferred::new();
        let barrier = JoinBarrier::new([a.promise(), b.promise(), c.promise()]);
        assert_eq!(barrier.outstanding(), 3);

        c.resolve(());
        a.resolve(());
        settle_ticks().await;
        assert!(!barrier.is_settled());

        b.resolve(());
        let outcome = timeout(Duration::from_secs(1), barrier.promise().settled()).await;
        assert_eq!(outcome, Ok(Ok(())));
        assert_eq!(barrier.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_empty_barrier_is_already_fulfilled() {
        let barrier = JoinBarrier::new([]);
        assert!(barrier.is_settled());
        assert!(barrier.promise().is_fulfilled());
    }

    #[tokio::test]
    async fn test_first_rejection_short_circuits() {
        let pending = Deferred::<()>::new();
        let failing = Deferred::<()>::new();
        let barrier = JoinBarrier::new([pending.promise(), failing.promise()]);

        failing.reject("precondition failed");
        let outcome = timeout(Duration::from_secs(1), barrier.promise().settled())
            .await
            .expect("rejection should not wait for the pending member");
        assert_eq!(outcome, Err(Rejection::reason("precondition failed")));

        // A later fulfillment cannot flip the outcome.
        pending.resolve(());
        settle_ticks().await;
        assert!(barrier.promise().is_rejected());
    }

    #[tokio::test]
    async fn test_push_after_partial_completion_holds_the_barrier() {
        let task_a = Deferred::new();
        let task_b = Deferred::new();
        let task_c = Deferred::new();
        let barrier = JoinBarrier::new([task_a.promise(), task_b.promise()]);

        task_a.resolve(());
        settle_ticks().await;
        assert!(!barrier.is_settled());

        barrier.push([task_c.promise()]).unwrap();
        task_b.resolve(());
        settle_ticks().await;
        assert!(!barrier.is_settled());

        task_c.resolve(());
        let outcome = timeout(Duration::from_secs(1), barrier.promise().settled()).await;
        assert_eq!(outcome, Ok(Ok(())));
        assert_eq!(barrier.joined(), 3);
    }

    #[tokio::test]
    async fn test_push_reacting_to_last_member_is_observed() {
        let first = Deferred::new();
        let follow_up = Deferred::new();
        let barrier = JoinBarrier::new([first.promise()]);

        let reacting = barrier.clone();
        let follow_up_promise = follow_up.promise();
        first.promise().on_settled(move |_| {
            reacting
                .push([follow_up_promise])
                .expect("barrier should still be open");
        });

        first.resolve(());
        settle_ticks().await;
        assert!(!barrier.is_settled());
        assert_eq!(barrier.outstanding(), 1);

        follow_up.resolve(());
        let outcome = timeout(Duration::from_secs(1), barrier.promise().settled()).await;
        assert_eq!(outcome, Ok(Ok(())));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reaction_push_holds_barrier_on_multi_thread_runtime() {
        for _ in 0..200 {
            let first = Deferred::new();
            let follow_up = Deferred::new();
            let barrier = JoinBarrier::new([first.promise()]);

            let reacting = barrier.clone();
            let follow_up_promise = follow_up.promise();
            first.promise().on_settled(move |_| {
                reacting
                    .push([follow_up_promise])
                    .expect("barrier should still be open");
            });

            first.resolve(());
            sleep(Duration::from_millis(2)).await;
            assert!(!barrier.is_settled(), "barrier settled before the reaction's push");

            follow_up.resolve(());
            let outcome = timeout(Duration::from_secs(1), barrier.promise().settled())
                .await
                .expect("barrier should settle");
            assert!(outcome.is_ok());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_push_is_counted_or_refused() {
        for _ in 0..200 {
            let last = Deferred::new();
            let barrier = JoinBarrier::with_policy(LateJoin::Reject, [last.promise()]);
            let never = Deferred::<()>::new();

            let resolver = tokio::spawn(async move {
                last.resolve(());
            });
            let pushed = barrier.push([never.promise()]);
            resolver.await.unwrap();
            sleep(Duration::from_millis(2)).await;

            match pushed {
                // Counted: the new member keeps the barrier open.
                Ok(()) => assert!(!barrier.is_settled()),
                Err(BarrierError::AlreadySettled(1)) => assert!(barrier.is_settled()),
                Err(e) => panic!("unexpected error: {e}"),
            }
            drop(never);
        }
    }

    #[tokio::test]
    async fn test_late_push_is_ignored_by_default() {
        let barrier = JoinBarrier::new([Promise::resolved(())]);
        timeout(Duration::from_secs(1), barrier.promise().settled())
            .await
            .unwrap()
            .unwrap();

        let never = Deferred::<()>::new();
        assert_eq!(barrier.push([never.promise()]), Ok(()));
        assert!(barrier.promise().is_fulfilled());
        assert_eq!(barrier.joined(), 1);
    }

    #[tokio::test]
    async fn test_late_push_can_be_refused() {
        let barrier = JoinBarrier::with_policy(LateJoin::Reject, []);
        let result = barrier.push([Promise::resolved(()), Promise::resolved(())]);
        assert_eq!(result, Err(BarrierError::AlreadySettled(2)));
    }

    #[tokio::test]
    async fn test_barriers_compose() {
        let inner_member = Deferred::new();
        let inner = JoinBarrier::new([inner_member.promise()]);
        let outer = JoinBarrier::new([Promise::from(&inner), Promise::resolved(())]);

        settle_ticks().await;
        assert!(!outer.is_settled());

        inner_member.resolve(());
        let outcome = timeout(Duration::from_secs(1), outer.promise().settled()).await;
        assert_eq!(outcome, Ok(Ok(())));
    }
}
