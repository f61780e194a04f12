//! Shared tokio runtime for evaluating `IO` from synchronous code.
//!
//! `IO` never owns a scheduler; it composes with whatever tokio runtime is
//! driving the evaluation. Synchronous callers still need somewhere to run,
//! so this module provides:
//!
//! 1. **Global Runtime**: a lazily-initialized multi-thread runtime with one
//!    worker per CPU, created once and never dropped.
//! 2. **Handle lookup**: the current runtime's handle when called from inside
//!    one, otherwise a thread-local cached handle to the global runtime.
//! 3. **Blocking Execution**: [`try_run_blocking`] / [`run_blocking`], which
//!    use `block_in_place` when already on a multi-thread runtime.
//!
//! # Runtime Flavor Considerations
//!
//! `block_in_place` is not available on a current-thread runtime, so
//! [`try_run_blocking`] reports [`BlockingError::CurrentThreadRuntime`]
//! instead of panicking there.

use std::cell::RefCell;
use std::future::Future;
use std::sync::LazyLock;

use thiserror::Error;
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

// =============================================================================
// Global Runtime
// =============================================================================

static GLOBAL_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    let worker_threads = num_cpus::get();
    tracing::debug!(worker_threads, "starting global IO runtime");
    Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name("lambars-io-worker")
        .enable_all()
        .build()
        .expect("Failed to create global tokio runtime")
});

/// Returns a reference to the global runtime.
///
/// The runtime is lazily initialized on first call and shared across
/// all subsequent calls.
#[inline]
#[must_use]
pub fn global() -> &'static Runtime {
    &GLOBAL_RUNTIME
}

// =============================================================================
// Handle Caching
// =============================================================================

thread_local! {
    static CACHED_HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Returns a handle to the current or global runtime.
///
/// Inside a tokio runtime this is `Handle::current()`; elsewhere it is a
/// cached handle to [`global`].
#[inline]
#[must_use]
pub fn handle() -> Handle {
    if let Ok(current_handle) = Handle::try_current() {
        return current_handle;
    }

    CACHED_HANDLE.with(|cached| {
        cached
            .borrow_mut()
            .get_or_insert_with(|| global().handle().clone())
            .clone()
    })
}

// =============================================================================
// Blocking Error
// =============================================================================

/// Error type for blocking execution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockingError {
    /// Cannot use `block_in_place` in a current-thread runtime.
    #[error(
        "cannot execute blocking operation in current-thread runtime: \
         block_in_place is only supported in multi-thread runtimes"
    )]
    CurrentThreadRuntime,

    /// The runtime flavor is not supported for blocking execution.
    ///
    /// Kept for runtime flavors added by future tokio versions.
    #[error(
        "cannot execute blocking operation: \
         the runtime flavor is not supported for blocking execution"
    )]
    UnsupportedRuntimeFlavor,
}

// =============================================================================
// Blocking Execution
// =============================================================================

/// Attempts to execute a future synchronously, blocking the current thread.
///
/// - **Inside a multi-thread runtime**: uses `block_in_place` with the current
///   runtime's handle.
/// - **Inside a current-thread runtime**: returns
///   `Err(BlockingError::CurrentThreadRuntime)`.
/// - **Outside a runtime**: uses the global runtime's `block_on`.
///
/// # Errors
///
/// Returns [`BlockingError::CurrentThreadRuntime`] when called from within a
/// current-thread tokio runtime.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::runtime::try_run_blocking;
///
/// let result = try_run_blocking(async {
///     tokio::time::sleep(std::time::Duration::from_millis(1)).await;
///     42
/// });
/// assert_eq!(result, Ok(42));
/// ```
#[inline]
pub fn try_run_blocking<F, T>(future: F) -> Result<T, BlockingError>
where
    F: Future<Output = T>,
{
    if let Ok(current_handle) = Handle::try_current() {
        match current_handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => Ok(tokio::task::block_in_place(|| {
                current_handle.block_on(future)
            })),
            RuntimeFlavor::CurrentThread => Err(BlockingError::CurrentThreadRuntime),
            _ => Err(BlockingError::UnsupportedRuntimeFlavor),
        }
    } else {
        Ok(global().block_on(future))
    }
}

/// Executes a future synchronously, blocking the current thread.
///
/// # Panics
///
/// - Panics if called from within a current-thread runtime.
/// - Panics if the future panics.
#[inline]
pub fn run_blocking<F, T>(future: F) -> T
where
    F: Future<Output = T>,
{
    try_run_blocking(future).expect("run_blocking failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ptr;

    #[rstest]
    fn test_global_runtime_is_singleton() {
        assert!(ptr::eq(global(), global()));
    }

    #[rstest]
    fn test_run_blocking_outside_runtime() {
        assert_eq!(run_blocking(async { 40 + 2 }), 42);
    }

    #[rstest]
    #[tokio::test(flavor = "current_thread")]
    async fn test_try_run_blocking_in_current_thread_runtime() {
        assert_eq!(
            try_run_blocking(async { 1 }),
            Err(BlockingError::CurrentThreadRuntime)
        );
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_try_run_blocking_in_multi_thread_runtime() {
        assert_eq!(try_run_blocking(async { 7 }), Ok(7));
    }

    #[rstest]
    fn test_handle_outside_runtime_points_at_global() {
        let obtained = handle();
        assert_eq!(obtained.runtime_flavor(), RuntimeFlavor::MultiThread);
    }
}
