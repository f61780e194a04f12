//! Concurrency combinators: parallel evaluation, permits, deadlines and
//! execution contexts.
//!
//! Parallel operands are spawned as tokio tasks on the runtime driving the
//! evaluation, so they run concurrently and, on a multi-thread runtime, in
//! parallel. Cancellation is cooperative: an aborted task stops at its next
//! suspension point.

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::{JoinError, JoinSet};

use super::scope::Scope;
use super::{IO, Node, Step};
use crate::control::{Either, panic_message};
use crate::effect::context::AbortOnDrop;
use crate::effect::{ExecutionContext, Permits, TimeoutError};

/// Unwraps a joined task, resuming its panic in the caller.
fn joined<X>(result: Result<X, JoinError>) -> X {
    match result {
        Ok(value) => value,
        Err(error) if error.is_panic() => {
            let payload = error.into_panic();
            tracing::debug!(
                panic = panic_message(payload.as_ref()),
                "parallel operand panicked"
            );
            panic::resume_unwind(payload)
        }
        Err(error) => panic!("parallel operand was cancelled externally: {error}"),
    }
}

// =============================================================================
// Steps
// =============================================================================

struct Par<E, T> {
    effects: Arc<[IO<E, T>]>,
}

impl<E: Send + 'static, T: Send + 'static> Step<E, Vec<T>> for Par<E, T> {
    fn resume(&self) -> BoxFuture<'static, Either<E, Vec<T>>> {
        let effects = Arc::clone(&self.effects);
        async move {
            tracing::trace!(operands = effects.len(), "spawning parallel operands");
            let scope = Scope::current().child();
            let mut tasks = JoinSet::new();
            for (index, effect) in effects.iter().enumerate() {
                let evaluation = effect.run();
                tasks.spawn(scope.attach(async move { (index, evaluation.await) }));
            }

            let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None)
                .take(effects.len())
                .collect();
            while let Some(result) = tasks.join_next().await {
                match joined(result) {
                    (index, Either::Right(value)) => slots[index] = Some(value),
                    (index, Either::Left(error)) => {
                        tracing::debug!(
                            index,
                            cancelled = tasks.len(),
                            "parallel operand failed; cancelling siblings"
                        );
                        tasks.abort_all();
                        scope.drained().await;
                        return Either::Left(error);
                    }
                }
            }
            Either::Right(slots.into_iter().flatten().collect())
        }
        .boxed()
    }
}

struct ParZip<E, A, B, T> {
    left: IO<E, A>,
    right: IO<E, B>,
    combine: Arc<dyn Fn(A, B) -> T + Send + Sync>,
}

impl<E, A, B, T> Step<E, T> for ParZip<E, A, B, T>
where
    E: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    T: Send + 'static,
{
    fn resume(&self) -> BoxFuture<'static, Either<E, T>> {
        let left = self.left.run();
        let right = self.right.run();
        let combine = Arc::clone(&self.combine);
        async move {
            let scope = Scope::current().child();
            let mut left = AbortOnDrop(tokio::spawn(scope.attach(left)));
            let mut right = AbortOnDrop(tokio::spawn(scope.attach(right)));
            tokio::select! {
                first = &mut left.0 => {
                    let first = match joined(first) {
                        Either::Left(error) => return cancelled(&right, &scope, error).await,
                        Either::Right(value) => value,
                    };
                    joined((&mut right.0).await).map(|second| combine(first, second))
                }
                second = &mut right.0 => {
                    let second = match joined(second) {
                        Either::Left(error) => return cancelled(&left, &scope, error).await,
                        Either::Right(value) => value,
                    };
                    joined((&mut left.0).await).map(|first| combine(first, second))
                }
            }
        }
        .boxed()
    }
}

/// Aborts the surviving side of a `par_zip` and waits for its cleanup.
async fn cancelled<X, E, T>(sibling: &AbortOnDrop<X>, scope: &Scope, error: E) -> Either<E, T> {
    tracing::debug!("parallel operand failed; cancelling sibling");
    sibling.0.abort();
    scope.drained().await;
    Either::Left(error)
}

// =============================================================================
// Combinators
// =============================================================================

impl<E: Send + 'static, T: Send + 'static> IO<E, T> {
    /// Evaluates every operand concurrently.
    ///
    /// Successes are collected in input order, regardless of completion
    /// order. The first failure observed cancels every operand still running
    /// and becomes the result once their cleanup (pending `bracket` releases)
    /// has finished; which failure that is depends on timing when several
    /// operands fail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::UIO;
    /// use std::time::Duration;
    ///
    /// let slow = UIO::sleep(Duration::from_millis(20)).as_value(1);
    /// let fast = UIO::success(2);
    /// assert_eq!(UIO::par([slow, fast]).run_blocking(), Either::Right(vec![1, 2]));
    /// ```
    pub fn par<I>(effects: I) -> IO<E, Vec<T>>
    where
        I: IntoIterator<Item = Self>,
    {
        IO::from_node(Node::Par(Box::new(Par {
            effects: effects.into_iter().collect(),
        })))
    }

    /// Evaluates `self` and `other` concurrently and combines the successes.
    ///
    /// A failure of either side cancels the other and waits for its cleanup.
    pub fn par_zip<U, R, F>(self, other: IO<E, U>, combine: F) -> IO<E, R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(T, U) -> R + Send + Sync + 'static,
    {
        IO::from_node(Node::Par(Box::new(ParZip {
            left: self,
            right: other,
            combine: Arc::new(combine),
        })))
    }

    /// Evaluates `self` while holding one permit from `permits`.
    ///
    /// The permit is returned however the evaluation ends. Acquiring from a
    /// closed source is a defect.
    #[must_use]
    pub fn synchronize(self, permits: &Permits) -> Self {
        Self::from_node(Node::Synchronize {
            inner: self,
            permits: permits.clone(),
        })
    }

    /// Fails with `on_timeout` if `self` does not finish within `duration`.
    ///
    /// On expiry the evaluation of `self` is cancelled, and the failure is
    /// returned once the cleanup it owes (pending `bracket` releases) is done.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    /// use std::time::Duration;
    ///
    /// let io = IO::<String, ()>::sleep(Duration::from_secs(2))
    ///     .timeout(Duration::from_millis(10), |elapsed| elapsed.to_string());
    /// assert_eq!(
    ///     io.run_blocking(),
    ///     Either::Left("operation timed out after 10ms".to_string())
    /// );
    /// ```
    pub fn timeout<F>(self, duration: Duration, on_timeout: F) -> Self
    where
        F: Fn(TimeoutError) -> E + Send + Sync + 'static,
    {
        Self::from_node(Node::Timeout {
            inner: self,
            duration,
            on_timeout: Arc::new(on_timeout),
        })
    }

    /// Evaluates `self` on `context`, returning to the caller's runtime after.
    #[must_use]
    pub fn on_context(self, context: ExecutionContext) -> Self {
        Self::from_node(Node::OnContext {
            inner: self,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[rstest]
    #[tokio::test]
    async fn test_par_of_nothing_is_empty() {
        let io = IO::<String, i32>::par(Vec::new());
        assert_eq!(io.await, Either::Right(Vec::new()));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_par_zip_runs_both_sides_concurrently() {
        let started = Arc::new(AtomicUsize::new(0));
        let side = |value: i32| {
            let started = Arc::clone(&started);
            IO::<String, i32>::effect_total_async(move || {
                let started = Arc::clone(&started);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    while started.load(Ordering::SeqCst) < 2 {
                        tokio::task::yield_now().await;
                    }
                    value
                }
            })
        };

        let io = side(1).par_zip(side(2), |a, b| a + b);
        assert_eq!(io.await, Either::Right(3));
    }

    #[rstest]
    #[tokio::test]
    async fn test_par_zip_failure_cancels_other_side() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let slow = IO::<&str, ()>::sleep(Duration::from_millis(200)).for_each(move |()| {
            flag.store(true, Ordering::SeqCst);
        });
        let io = slow.par_zip(IO::<&str, ()>::failure("fast"), |(), ()| ());

        assert_eq!(io.await, Either::Left("fast"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[rstest]
    #[tokio::test]
    async fn test_timeout_passes_fast_results_through() {
        let io = IO::<String, i32>::success(1).timeout(Duration::from_secs(1), |e| e.to_string());
        assert_eq!(io.await, Either::Right(1));
    }

    #[rstest]
    #[tokio::test]
    #[should_panic(expected = "cannot synchronize evaluation")]
    async fn test_synchronize_on_closed_source_is_a_defect() {
        let permits = Permits::new(1);
        permits.close();
        let _ = IO::<(), ()>::unit().synchronize(&permits).await;
    }
}
