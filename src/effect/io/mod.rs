//! `IO<E, T>` - a deferred, replayable description of a computation.
//!
//! An `IO` is an immutable tree of nodes. Building one never runs anything;
//! evaluation happens only when [`IO::run`] (or `.await`) drives the tree,
//! and each evaluation re-executes every effect the tree describes. Nothing is
//! cached between runs.
//!
//! Evaluation produces an [`Either`]: `Left(E)` for a typed failure, `Right(T)`
//! for a success. Panics are defects: they cross the `run` boundary unless a
//! capturing node (`effect`, `effect_async`, the use step of `bracket`) turns
//! them into a [`TryError`].
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::control::Either;
//! use lambars_io::effect::IO;
//!
//! let io = IO::<String, i32>::success(10)
//!     .map(|x| x * 2)
//!     .flat_map(|x| IO::success(x + 1));
//!
//! assert_eq!(io.run_blocking(), Either::Right(21));
//! ```
//!
//! # Replay
//!
//! ```rust
//! use lambars_io::effect::IO;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let observed = Arc::clone(&counter);
//! let io = IO::<(), usize>::effect_total(move || observed.fetch_add(1, Ordering::SeqCst) + 1);
//!
//! assert_eq!(counter.load(Ordering::SeqCst), 0);
//! assert_eq!(io.run_blocking().unwrap_right(), 1);
//! assert_eq!(io.run_blocking().unwrap_right(), 2);
//! ```

mod comprehension;
mod concurrency;
mod recovery;
mod resource;
mod scope;
mod sequence;

use std::convert::Infallible;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::runtime::{self, BlockingError};
use super::{ExecutionContext, Permits, TimeoutError};
use crate::control::{Either, Try, TryError};
use scope::Scope;

// =============================================================================
// Aliases
// =============================================================================

/// An `IO` that cannot fail: its error channel is uninhabited.
pub type UIO<T> = IO<Infallible, T>;

/// An `IO` that cannot succeed: its success channel is uninhabited.
pub type FailIO<E> = IO<E, Infallible>;

pub(crate) type Thunk<T> = Arc<dyn Fn() -> T + Send + Sync>;
pub(crate) type FutureThunk<T> = Arc<dyn Fn() -> BoxFuture<'static, T> + Send + Sync>;
pub(crate) type Capture<E> = Arc<dyn Fn(TryError) -> E + Send + Sync>;

// =============================================================================
// Node Tree
// =============================================================================

/// A node whose children have types other than `E` and `T`.
///
/// Implementations hold their children and closures; `resume` evaluates them.
pub(crate) trait Step<E, T>: Send + Sync {
    fn resume(&self) -> BoxFuture<'static, Either<E, T>>;
}

/// The closed set of node kinds an `IO` tree is built from.
pub(crate) enum Node<E, T> {
    /// Yields `Right` with a (possibly lazily computed) value.
    Success(Thunk<T>),
    /// Yields `Left` with a (possibly lazily computed) error.
    Failure(Thunk<E>),
    /// Yields an already-shaped outcome.
    Lift(Thunk<Either<E, T>>),
    /// A synchronous side effect. With a capture, a panic becomes `Left`.
    Effect {
        thunk: Thunk<T>,
        capture: Option<Capture<E>>,
    },
    /// An asynchronous side effect. With a capture, a panic becomes `Left`.
    Suspend {
        thunk: FutureThunk<T>,
        capture: Option<Capture<E>>,
    },
    /// Continues on the success channel of a child.
    FlatMap(Box<dyn Step<E, T>>),
    /// Continues on the error channel of a child.
    Catch(Box<dyn Step<E, T>>),
    /// Sequential combination of several children.
    Zip(Box<dyn Step<E, T>>),
    /// Acquire, use and always release a resource.
    Bracket(Box<dyn Step<E, T>>),
    /// Runs a child between a `before` and an `after` step.
    Brace(Box<dyn Step<E, T>>),
    /// Concurrent evaluation of several children.
    Par(Box<dyn Step<E, T>>),
    /// Evaluates `inner` on another runtime.
    OnContext {
        inner: IO<E, T>,
        context: ExecutionContext,
    },
    /// Races `inner` against a deadline. On expiry, waits for the cleanup the
    /// cancelled `inner` still owes.
    Timeout {
        inner: IO<E, T>,
        duration: Duration,
        on_timeout: Arc<dyn Fn(TimeoutError) -> E + Send + Sync>,
    },
    /// Evaluates `inner` while holding a permit.
    Synchronize { inner: IO<E, T>, permits: Permits },
}

impl<E, T> Node<E, T> {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "Success",
            Self::Failure(_) => "Failure",
            Self::Lift(_) => "Lift",
            Self::Effect { .. } => "Effect",
            Self::Suspend { .. } => "Suspend",
            Self::FlatMap(_) => "FlatMap",
            Self::Catch(_) => "Catch",
            Self::Zip(_) => "Zip",
            Self::Bracket(_) => "Bracket",
            Self::Brace(_) => "Brace",
            Self::Par(_) => "Par",
            Self::OnContext { .. } => "OnContext",
            Self::Timeout { .. } => "Timeout",
            Self::Synchronize { .. } => "Synchronize",
        }
    }
}

impl<E: Send + 'static, T: Send + 'static> Node<E, T> {
    async fn evaluate(&self) -> Either<E, T> {
        match self {
            Self::Success(thunk) => Either::Right(thunk()),
            Self::Failure(thunk) => Either::Left(thunk()),
            Self::Lift(thunk) => thunk(),
            Self::Effect { thunk, capture } => match capture {
                Some(capture) => Try::of(|| thunk()).to_either(|error| capture(error)),
                None => Either::Right(thunk()),
            },
            Self::Suspend { thunk, capture } => match capture {
                Some(capture) => match AssertUnwindSafe(async { thunk().await })
                    .catch_unwind()
                    .await
                {
                    Ok(value) => Either::Right(value),
                    Err(payload) => Either::Left(capture(TryError::from_panic(payload))),
                },
                None => Either::Right(thunk().await),
            },
            Self::FlatMap(step)
            | Self::Catch(step)
            | Self::Zip(step)
            | Self::Bracket(step)
            | Self::Brace(step)
            | Self::Par(step) => step.resume().await,
            Self::OnContext { inner, context } => {
                context.evaluate(Scope::current().attach(inner.run())).await
            }
            Self::Timeout {
                inner,
                duration,
                on_timeout,
            } => {
                let scope = Scope::current().child();
                match tokio::time::timeout(*duration, scope.enter(inner.run())).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::debug!(?duration, "deadline elapsed; evaluation cancelled");
                        scope.drained().await;
                        Either::Left(on_timeout(TimeoutError {
                            duration: *duration,
                        }))
                    }
                }
            }
            Self::Synchronize { inner, permits } => {
                let _permit = match permits.acquire().await {
                    Ok(permit) => permit,
                    Err(error) => panic!("cannot synchronize evaluation: {error}"),
                };
                tracing::debug!(available = permits.available(), "permit acquired");
                inner.run().await
            }
        }
    }
}

// =============================================================================
// IO
// =============================================================================

/// A deferred computation that fails with `E` or succeeds with `T`.
///
/// Cloning an `IO` is cheap and shares the underlying tree.
///
/// # Type Parameters
///
/// - `E`: The typed error channel. [`Infallible`] for trees that cannot fail.
/// - `T`: The success channel. [`Infallible`] for trees that cannot succeed.
///
/// # Monad Laws
///
/// 1. **Left Identity**: `IO::success(a).flat_map(f) == f(a)`
/// 2. **Right Identity**: `m.flat_map(IO::success) == m`
/// 3. **Associativity**: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
pub struct IO<E, T> {
    node: Arc<Node<E, T>>,
}

impl<E, T> Clone for IO<E, T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<E, T> IO<E, T> {
    pub(crate) fn from_node(node: Node<E, T>) -> Self {
        Self {
            node: Arc::new(node),
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl<E: Send + 'static, T: Send + 'static> IO<E, T> {
    /// Creates an `IO` that succeeds with `value` on every run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::UIO;
    ///
    /// assert_eq!(UIO::success(42).run_blocking(), Either::Right(42));
    /// ```
    pub fn success(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_node(Node::Success(Arc::new(move || value.clone())))
    }

    /// Creates an `IO` that succeeds with the value computed by `thunk`.
    ///
    /// `thunk` runs on each evaluation.
    pub fn success_with<F>(thunk: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_node(Node::Success(Arc::new(thunk)))
    }

    /// Creates an `IO` that fails with `error` on every run.
    pub fn failure(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::from_node(Node::Failure(Arc::new(move || error.clone())))
    }

    /// Creates an `IO` that fails with the error computed by `thunk`.
    pub fn failure_with<F>(thunk: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self::from_node(Node::Failure(Arc::new(thunk)))
    }

    /// Lifts an already-computed [`Either`].
    pub fn either(value: Either<E, T>) -> Self
    where
        E: Clone + Sync,
        T: Clone + Sync,
    {
        Self::from_node(Node::Lift(Arc::new(move || value.clone())))
    }

    /// Lifts the [`Either`] computed by `thunk` on each run.
    pub fn either_with<F>(thunk: F) -> Self
    where
        F: Fn() -> Either<E, T> + Send + Sync + 'static,
    {
        Self::from_node(Node::Lift(Arc::new(thunk)))
    }

    /// Wraps an infallible side effect.
    ///
    /// A panic inside `thunk` is a defect and is not captured.
    pub fn effect_total<F>(thunk: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_node(Node::Effect {
            thunk: Arc::new(thunk),
            capture: None,
        })
    }

    /// Wraps an infallible asynchronous side effect.
    ///
    /// `thunk` creates a fresh future on each run.
    pub fn effect_total_async<F, Fut>(thunk: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::from_node(Node::Suspend {
            thunk: Arc::new(move || thunk().boxed()),
            capture: None,
        })
    }
}

impl<T: Send + 'static> IO<TryError, T> {
    /// Wraps a side effect that may panic.
    ///
    /// A panic is captured and surfaces as `Left(TryError)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::effect(|| -> i32 { panic!("disk on fire") });
    /// let error = io.run_blocking().unwrap_left();
    /// assert_eq!(error.message(), "disk on fire");
    /// ```
    pub fn effect<F>(thunk: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_node(Node::Effect {
            thunk: Arc::new(thunk),
            capture: Some(Arc::new(|error| error)),
        })
    }

    /// Wraps an asynchronous side effect that may panic.
    pub fn effect_async<F, Fut>(thunk: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::from_node(Node::Suspend {
            thunk: Arc::new(move || thunk().boxed()),
            capture: Some(Arc::new(|error| error)),
        })
    }
}

impl<E: Send + 'static> IO<E, ()> {
    /// An `IO` that succeeds with `()`.
    pub fn unit() -> Self {
        Self::success(())
    }

    /// An `IO` that suspends for `duration` on the runtime timer.
    pub fn sleep(duration: Duration) -> Self {
        Self::effect_total_async(move || tokio::time::sleep(duration))
    }
}

impl<T: Send + 'static> IO<Infallible, T> {
    /// Views an infallible `IO` as one with any error type.
    pub fn widen_error<E: Send + 'static>(self) -> IO<E, T> {
        self.map_error(|never| match never {})
    }
}

impl<E: Send + 'static> IO<E, Infallible> {
    /// Views a never-succeeding `IO` as one with any success type.
    pub fn widen_success<T: Send + 'static>(self) -> IO<E, T> {
        self.map(|never| match never {})
    }
}

// =============================================================================
// Evaluation
// =============================================================================

impl<E: Send + 'static, T: Send + 'static> IO<E, T> {
    /// Evaluates the tree.
    ///
    /// The returned future owns a reference to the tree, so it may be spawned.
    /// Every call starts a fresh evaluation.
    pub fn run(&self) -> BoxFuture<'static, Either<E, T>> {
        let node = Arc::clone(&self.node);
        async move { node.evaluate().await }.boxed()
    }

    /// Evaluates the tree synchronously on the shared runtime.
    ///
    /// # Panics
    ///
    /// Panics if called from within a current-thread runtime, or if the
    /// evaluation raises a defect.
    pub fn run_blocking(&self) -> Either<E, T> {
        runtime::run_blocking(self.run())
    }

    /// Evaluates the tree synchronously, reporting an unusable runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BlockingError`] when called from within a current-thread
    /// runtime.
    pub fn try_run_blocking(&self) -> Result<Either<E, T>, BlockingError> {
        runtime::try_run_blocking(self.run())
    }
}

impl<E: Send + 'static, T: Send + 'static> IntoFuture for IO<E, T> {
    type Output = Either<E, T>;
    type IntoFuture = BoxFuture<'static, Either<E, T>>;

    fn into_future(self) -> Self::IntoFuture {
        self.run()
    }
}

// =============================================================================
// Display / Debug
// =============================================================================

impl<E, T> fmt::Display for IO<E, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "<IO>")
    }
}

impl<E, T> fmt::Debug for IO<E, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("IO")
            .field(&format_args!("{}", self.node.kind()))
            .finish()
    }
}

static_assertions::assert_impl_all!(IO<String, i32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(UIO<Vec<u8>>: Send, Sync);
static_assertions::assert_impl_all!(FailIO<TryError>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[rstest]
    fn test_display_and_debug() {
        let io = UIO::success(1).map(|x| x + 1);
        assert_eq!(format!("{io}"), "<IO>");
        assert_eq!(format!("{io:?}"), "IO(FlatMap)");
    }

    #[rstest]
    #[tokio::test]
    async fn test_construction_is_lazy() {
        let counter = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&counter);
        let io = IO::<(), ()>::effect_total(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let _ = io.clone().await;
        let _ = io.run().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_failure_and_either() {
        assert_eq!(IO::<&str, i32>::failure("x").await, Either::Left("x"));
        assert_eq!(IO::<&str, i32>::either(Either::Right(3)).await, Either::Right(3));
    }

    #[rstest]
    #[tokio::test]
    async fn test_effect_async_captures_panic() {
        let io = IO::effect_async(|| async { panic!("late") });
        let outcome: Either<TryError, ()> = io.await;
        assert_eq!(outcome.unwrap_left().message(), "late");
    }

    #[rstest]
    #[tokio::test]
    async fn test_widen_error() {
        let io: IO<String, i32> = UIO::success(5).widen_error();
        assert_eq!(io.await, Either::Right(5));
    }
}
