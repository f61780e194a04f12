//! Execution contexts for [`IO::on_context`](super::IO::on_context).
//!
//! An `ExecutionContext` names the tokio runtime a subtree is evaluated on.
//! The effect system never schedules work itself; switching context spawns the
//! subtree onto the other runtime and awaits its completion.

use std::future::Future;
use std::panic;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::runtime;
use crate::control::Either;

/// The runtime a subtree of an `IO` is evaluated on.
///
/// The value is an opaque token: the effect system only spawns onto it.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::{ExecutionContext, IO};
///
/// let io = IO::<String, _>::effect_total(|| std::thread::current().name().map(str::to_owned))
///     .on_context(ExecutionContext::global());
///
/// let name = io.run_blocking().unwrap_right();
/// assert_eq!(name.as_deref(), Some("lambars-io-worker"));
/// ```
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    label: &'static str,
    handle: Handle,
}

impl ExecutionContext {
    /// Creates a context that evaluates on the runtime behind `handle`.
    #[must_use]
    pub fn from_handle(label: &'static str, handle: Handle) -> Self {
        Self { label, handle }
    }

    /// The runtime driving the caller, or the global runtime outside of one.
    #[must_use]
    pub fn current() -> Self {
        Self::from_handle("current", runtime::handle())
    }

    /// The shared global runtime.
    #[must_use]
    pub fn global() -> Self {
        Self::from_handle("global", runtime::global().handle().clone())
    }

    /// Returns the label used in log events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the runtime handle.
    #[must_use]
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Runs `future` to completion on this context.
    ///
    /// Dropping the returned future aborts the spawned task. A panic inside
    /// the task is resumed in the caller.
    pub(crate) async fn evaluate<E, T, F>(&self, future: F) -> Either<E, T>
    where
        F: Future<Output = Either<E, T>> + Send + 'static,
        E: Send + 'static,
        T: Send + 'static,
    {
        tracing::trace!(context = self.label, "switching execution context");
        let mut task = AbortOnDrop(self.handle.spawn(future));
        match (&mut task.0).await {
            Ok(outcome) => outcome,
            Err(error) if error.is_panic() => panic::resume_unwind(error.into_panic()),
            Err(error) => panic!(
                "evaluation on context `{}` was cancelled: {error}",
                self.label
            ),
        }
    }
}

/// Aborts the wrapped task when dropped before it finished.
pub(crate) struct AbortOnDrop<T>(pub(crate) JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn test_evaluate_returns_outcome() {
        let context = ExecutionContext::current();
        let outcome: Either<String, i32> = context.evaluate(async { Either::Right(5) }).await;
        assert_eq!(outcome, Either::Right(5));
    }

    #[rstest]
    #[tokio::test]
    async fn test_dropping_evaluation_aborts_task() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let context = ExecutionContext::current();

        let evaluation = context.evaluate(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            flag.store(true, Ordering::SeqCst);
            Either::<(), ()>::Right(())
        });
        let _ = tokio::time::timeout(Duration::from_millis(10), evaluation).await;

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[rstest]
    fn test_labels() {
        assert_eq!(ExecutionContext::global().label(), "global");
    }
}
