//! Evaluation scopes.
//!
//! Cancellation drops futures, and a `bracket` dropped mid-use cannot finish
//! its release inside `Drop`. It spawns the release instead, as a task that
//! every enclosing scope tracks. `timeout` and `par` open a child scope around
//! the operands they may cancel and wait for it to drain before returning, so
//! cleanup owed by a cancelled subtree has finished when they yield.
//!
//! The current scope travels with the evaluation as a tokio task-local. Outside
//! of any cancelling node it is the root scope, which tracks nothing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use tokio::sync::Notify;
use tokio::task::{JoinHandle, futures::TaskLocalFuture};

use crate::effect::runtime;

tokio::task_local! {
    static CURRENT: Scope;
}

/// Counts the tracked futures of one scope that have not been dropped yet.
#[derive(Debug, Default)]
struct Tracker {
    pending: AtomicUsize,
    idle: Notify,
}

/// Marks its trackers busy until dropped.
struct Busy(Vec<Arc<Tracker>>);

impl Busy {
    fn new(trackers: &[Arc<Tracker>]) -> Self {
        for tracker in trackers {
            tracker.pending.fetch_add(1, Ordering::AcqRel);
        }
        Self(trackers.to_vec())
    }
}

impl Drop for Busy {
    fn drop(&mut self) {
        for tracker in &self.0 {
            if tracker.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                tracker.idle.notify_waiters();
            }
        }
    }
}

/// A future that keeps its scope busy until it completes or is dropped.
///
/// `future` is declared before `_busy`, so it is dropped first: anything its
/// destructor spawns into the scope is tracked before this one lets go.
pub(crate) struct Tracked<F> {
    future: Pin<Box<F>>,
    _busy: Busy,
}

impl<F: Future> Future for Tracked<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<F::Output> {
        self.future.as_mut().poll(context)
    }
}

/// The chain of trackers enclosing an evaluation, innermost last.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scope {
    trackers: Vec<Arc<Tracker>>,
}

impl Scope {
    /// The scope of the running evaluation, or the root scope.
    pub(crate) fn current() -> Self {
        CURRENT.try_with(Clone::clone).unwrap_or_default()
    }

    /// Opens a nested scope that can be drained on its own.
    pub(crate) fn child(&self) -> Self {
        let mut trackers = self.trackers.clone();
        trackers.push(Arc::new(Tracker::default()));
        Self { trackers }
    }

    /// Evaluates `future` inside this scope.
    pub(crate) fn enter<F: Future>(&self, future: F) -> TaskLocalFuture<Self, F> {
        CURRENT.scope(self.clone(), future)
    }

    /// Evaluates `future` inside this scope and keeps the scope busy until the
    /// future is gone.
    pub(crate) fn attach<F: Future>(&self, future: F) -> Tracked<TaskLocalFuture<Self, F>> {
        Tracked {
            _busy: Busy::new(&self.trackers),
            future: Box::pin(self.enter(future)),
        }
    }

    /// Spawns `future` on the current runtime as a task attached to this scope.
    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        runtime::handle().spawn(self.attach(future))
    }

    /// Waits until every future attached to this scope (or to a scope nested
    /// in it) has completed or been dropped. The root scope is always drained.
    pub(crate) async fn drained(&self) {
        let Some(tracker) = self.trackers.last() else {
            return;
        };
        loop {
            let idle = tracker.idle.notified();
            if tracker.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }
}
