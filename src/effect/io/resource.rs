//! Resource management: `bracket` and `brace`.
//!
//! A release runs as a task attached to the evaluation's scope, so it finishes
//! even when the evaluation awaiting it is cancelled, and cancelling nodes
//! (`timeout`, `par`) wait for it before they return.

use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use super::scope::Scope;
use super::{IO, Node, Step, UIO};
use crate::control::{Either, TryError};

type Release<R> = Arc<dyn Fn(R) -> UIO<()> + Send + Sync>;

// =============================================================================
// Bracket
// =============================================================================

/// Holds a pending release until it is started.
///
/// Dropping the guard with the release still pending means the evaluation was
/// cancelled during use; the release is then started from `drop`.
struct ReleaseGuard<R: Send + 'static> {
    pending: Option<(Release<R>, R)>,
    scope: Scope,
}

impl<R: Send + 'static> ReleaseGuard<R> {
    fn start(&mut self) -> Option<JoinHandle<Either<Infallible, ()>>> {
        let (release, resource) = self.pending.take()?;
        Some(self.scope.spawn(release(resource).run()))
    }

    /// Starts the release and waits for it. A panic inside it is returned
    /// as the payload.
    async fn release(&mut self) -> thread::Result<()> {
        let Some(task) = self.start() else {
            return Ok(());
        };
        match task.await {
            Ok(_) => Ok(()),
            Err(error) if error.is_panic() => Err(error.into_panic()),
            Err(error) => Err(Box::new(format!("bracket release was cancelled: {error}"))),
        }
    }
}

impl<R: Send + 'static> Drop for ReleaseGuard<R> {
    fn drop(&mut self) {
        if self.start().is_some() {
            tracing::debug!("bracket cancelled during use; release started");
        }
    }
}

struct Bracket<E, R, T> {
    acquire: IO<E, R>,
    use_resource: Arc<dyn Fn(R) -> IO<E, T> + Send + Sync>,
    release: Release<R>,
}

impl<E, R, T> Step<E, T> for Bracket<E, R, T>
where
    E: From<TryError> + Send + 'static,
    R: Clone + Send + 'static,
    T: Send + 'static,
{
    fn resume(&self) -> BoxFuture<'static, Either<E, T>> {
        let acquire = self.acquire.run();
        let use_resource = Arc::clone(&self.use_resource);
        let release = Arc::clone(&self.release);
        async move {
            let resource = match acquire.await {
                Either::Left(error) => return Either::Left(error),
                Either::Right(resource) => resource,
            };
            let mut guard = ReleaseGuard {
                pending: Some((release, resource.clone())),
                scope: Scope::current(),
            };

            let used = AssertUnwindSafe(async { use_resource(resource).run().await })
                .catch_unwind()
                .await;

            let released = guard.release().await;

            match (used, released) {
                (Ok(outcome), Ok(())) => outcome,
                (Err(payload), Ok(())) => Either::Left(E::from(TryError::from_panic(payload))),
                (Ok(_), Err(release_panic)) => panic::resume_unwind(release_panic),
                (Err(payload), Err(_)) => {
                    tracing::warn!(
                        "panic in bracket release after use panicked; \
                         keeping the use failure"
                    );
                    Either::Left(E::from(TryError::from_panic(payload)))
                }
            }
        }
        .boxed()
    }
}

impl<E: Send + 'static, T: Send + 'static> IO<E, T> {
    /// Acquires a resource, uses it and always releases it.
    ///
    /// - If `acquire` fails, neither `use_resource` nor `release` runs.
    /// - Once `acquire` succeeds, `release` runs exactly once: after
    ///   `use_resource` succeeds, after it fails, after it panics, and when
    ///   the evaluation is cancelled. An enclosing `timeout` or `par` returns
    ///   only after a release it cancelled into has finished.
    /// - A panic in `use_resource` becomes a typed failure via
    ///   `E: From<TryError>`. A panic in `release` is a defect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::{Either, TryError};
    /// use lambars_io::effect::{IO, UIO};
    ///
    /// let io = IO::<TryError, _>::bracket(
    ///     IO::success(21),
    ///     |resource| IO::success(resource * 2),
    ///     |_| UIO::unit(),
    /// );
    /// assert_eq!(io.run_blocking(), Either::Right(42));
    /// ```
    pub fn bracket<R, U, F>(acquire: IO<E, R>, use_resource: U, release: F) -> Self
    where
        E: From<TryError>,
        R: Clone + Send + 'static,
        U: Fn(R) -> Self + Send + Sync + 'static,
        F: Fn(R) -> UIO<()> + Send + Sync + 'static,
    {
        Self::from_node(Node::Bracket(Box::new(Bracket {
            acquire,
            use_resource: Arc::new(use_resource),
            release: Arc::new(release),
        })))
    }

    /// Runs `before`, then `self`, then `after`.
    ///
    /// - If `before` fails, `self` and `after` are skipped.
    /// - If `self` fails, `after` still runs and the original failure is kept.
    /// - If `self` succeeds, a failure of `after` replaces the success.
    pub fn brace<B, F>(self, before: IO<E, B>, after: F) -> Self
    where
        B: Send + 'static,
        F: Fn(B) -> IO<E, ()> + Send + Sync + 'static,
    {
        Self::from_node(Node::Brace(Box::new(Brace {
            before,
            inner: self,
            after: Arc::new(after),
        })))
    }
}

// =============================================================================
// Brace
// =============================================================================

struct Brace<E, B, T> {
    before: IO<E, B>,
    inner: IO<E, T>,
    after: Arc<dyn Fn(B) -> IO<E, ()> + Send + Sync>,
}

impl<E, B, T> Step<E, T> for Brace<E, B, T>
where
    E: Send + 'static,
    B: Send + 'static,
    T: Send + 'static,
{
    fn resume(&self) -> BoxFuture<'static, Either<E, T>> {
        let before = self.before.run();
        let inner = self.inner.clone();
        let after = Arc::clone(&self.after);
        async move {
            let acquired = match before.await {
                Either::Left(error) => return Either::Left(error),
                Either::Right(acquired) => acquired,
            };
            match inner.run().await {
                Either::Left(error) => {
                    let _ = after(acquired).run().await;
                    Either::Left(error)
                }
                Either::Right(value) => after(acquired).run().await.map(move |()| value),
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_release(
        counter: &Arc<AtomicUsize>,
    ) -> impl Fn(i32) -> UIO<()> + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            let counter = Arc::clone(&counter);
            UIO::effect_total(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_bracket_skips_release_when_acquire_fails() {
        let released = Arc::new(AtomicUsize::new(0));
        let io = IO::<TryError, i32>::bracket(
            IO::failure_with(|| TryError::new("no resource")),
            IO::success,
            counting_release(&released),
        );

        assert!(io.await.is_left());
        assert_eq!(released.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_bracket_turns_use_panic_into_failure() {
        let released = Arc::new(AtomicUsize::new(0));
        let io = IO::<TryError, i32>::bracket(
            IO::success(1),
            |_| IO::effect_total(|| -> i32 { panic!("use exploded") }),
            counting_release(&released),
        );

        let error = io.await.unwrap_left();
        assert_eq!(error.message(), "use exploded");
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_brace_after_failure_replaces_success() {
        let io = UIO::success(1)
            .widen_error::<&str>()
            .brace(IO::unit(), |()| IO::failure("after failed"));
        assert_eq!(io.await, Either::Left("after failed"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_brace_keeps_original_failure() {
        let after_runs = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&after_runs);
        let io = IO::<&str, i32>::failure("inner").brace(IO::success(()), move |()| {
            observed.fetch_add(1, Ordering::SeqCst);
            IO::failure("after")
        });

        assert_eq!(io.await, Either::Left("inner"));
        assert_eq!(after_runs.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_brace_before_failure_skips_everything() {
        let after_runs = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&after_runs);
        let io = IO::<&str, i32>::success(1).brace(IO::<&str, ()>::failure("before"), move |()| {
            observed.fetch_add(1, Ordering::SeqCst);
            IO::unit()
        });

        assert_eq!(io.await, Either::Left("before"));
        assert_eq!(after_runs.load(Ordering::SeqCst), 0);
    }
}
