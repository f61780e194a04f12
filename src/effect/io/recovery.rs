//! Error-channel combinators.
//!
//! These mirror the success-channel combinators: each one continues only when
//! the child failed and passes a success through untouched.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use super::{IO, Node, Step, UIO};
use crate::control::{Either, TryError};

type Handler<E0, E, T> = Arc<dyn Fn(E0) -> BoxFuture<'static, Either<E, T>> + Send + Sync>;

/// Feeds the failure of `source` into `handler`.
struct Catch<E0, E, T> {
    source: IO<E0, T>,
    handler: Handler<E0, E, T>,
}

impl<E0, E, T> Step<E, T> for Catch<E0, E, T>
where
    E0: Send + 'static,
    E: Send + 'static,
    T: Send + 'static,
{
    fn resume(&self) -> BoxFuture<'static, Either<E, T>> {
        let source = self.source.run();
        let handler = Arc::clone(&self.handler);
        async move {
            match source.await {
                Either::Right(value) => Either::Right(value),
                Either::Left(error) => handler(error).await,
            }
        }
        .boxed()
    }
}

impl<E: Send + 'static, T: Send + 'static> IO<E, T> {
    fn catch_with<E2, F>(self, handler: F) -> IO<E2, T>
    where
        E2: Send + 'static,
        F: Fn(E) -> BoxFuture<'static, Either<E2, T>> + Send + Sync + 'static,
    {
        IO::from_node(Node::Catch(Box::new(Catch {
            source: self,
            handler: Arc::new(handler),
        })))
    }

    /// Transforms the failure value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::<i32, ()>::failure(404).map_error(|code| format!("status {code}"));
    /// assert_eq!(io.run_blocking(), Either::Left("status 404".to_string()));
    /// ```
    pub fn map_error<E2, F>(self, function: F) -> IO<E2, T>
    where
        E2: Send + 'static,
        F: Fn(E) -> E2 + Send + Sync + 'static,
    {
        self.catch_with(move |error| future::ready(Either::Left(function(error))).boxed())
    }

    /// Replaces a failure with the outcome of a tree built from it.
    ///
    /// The dual of [`flat_map`](Self::flat_map): the new tree may succeed or
    /// fail with a different error type.
    pub fn flat_map_error<E2, F>(self, function: F) -> IO<E2, T>
    where
        E2: Send + 'static,
        F: Fn(E) -> IO<E2, T> + Send + Sync + 'static,
    {
        self.catch_with(move |error| function(error).run())
    }

    /// Replaces a failure with a success, yielding a tree that cannot fail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::<String, usize>::failure("abc".to_string()).recover(|e| e.len());
    /// assert_eq!(io.run_blocking(), Either::Right(3));
    /// ```
    pub fn recover<F>(self, function: F) -> UIO<T>
    where
        F: Fn(E) -> T + Send + Sync + 'static,
    {
        self.catch_with(move |error| future::ready(Either::Right(function(error))).boxed())
    }

    /// Replaces a failure with a fallback tree.
    ///
    /// Same as [`flat_map_error`](Self::flat_map_error), named for intent.
    pub fn recover_with<E2, F>(self, function: F) -> IO<E2, T>
    where
        E2: Send + 'static,
        F: Fn(E) -> IO<E2, T> + Send + Sync + 'static,
    {
        self.flat_map_error(function)
    }

    /// Observes the failure with a side-effecting callback.
    ///
    /// The callback's return value is discarded and the failure passes
    /// through unchanged.
    pub fn on_error<R, F>(self, function: F) -> Self
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        self.catch_with(move |error| {
            function(&error);
            future::ready(Either::Left(error)).boxed()
        })
    }

    /// Evaluates an auxiliary tree on failure, then passes the original
    /// failure through. The auxiliary outcome is discarded.
    pub fn tap_error<E2, X, F>(self, function: F) -> Self
    where
        E2: Send + 'static,
        X: Send + 'static,
        F: Fn(&E) -> IO<E2, X> + Send + Sync + 'static,
    {
        self.catch_with(move |error| {
            let auxiliary = function(&error).run();
            async move {
                let _ = auxiliary.await;
                Either::Left(error)
            }
            .boxed()
        })
    }

    /// Moves the outcome into the success channel.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::<&str, i32>::failure("nope").attempt();
    /// assert_eq!(io.run_blocking(), Either::Right(Either::Left("nope")));
    /// ```
    pub fn attempt(self) -> UIO<Either<E, T>> {
        self.map(Either::Right).recover(Either::Left)
    }
}

impl<E: Send + 'static, T: Send + 'static> IO<E, Either<E, T>> {
    /// Moves a nested [`Either`] back into the error channel.
    ///
    /// The inverse of [`attempt`](IO::attempt).
    pub fn absolve(self) -> IO<E, T> {
        self.bind_with(|outcome| future::ready(outcome).boxed())
    }
}

impl<T: Send + 'static> IO<TryError, T> {
    /// Narrows a captured panic to the typed error `X`.
    ///
    /// A failure whose panic payload is an `X` becomes `Left(X)`. Any other
    /// payload is a defect: it is logged and resumed as a panic.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Rejected(u16);
    ///
    /// let io = IO::effect(|| -> () { std::panic::panic_any(Rejected(403)) })
    ///     .refine_or_die::<Rejected>();
    /// assert_eq!(io.run_blocking(), Either::Left(Rejected(403)));
    /// ```
    pub fn refine_or_die<X: Any + Send>(self) -> IO<X, T> {
        self.catch_with(|error: TryError| match error.downcast::<X>() {
            Ok(refined) => future::ready(Either::Left(refined)).boxed(),
            Err(error) => {
                tracing::error!(
                    expected = std::any::type_name::<X>(),
                    panic = error.message(),
                    "unexpected failure type; escalating to defect"
                );
                error.resume()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Rejected(u16);

    #[rstest]
    #[tokio::test]
    async fn test_recover_yields_uio() {
        let io: UIO<String> = IO::<String, String>::failure("x".to_string()).recover(|e| e + "!");
        assert_eq!(io.await, Either::Right("x!".to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn test_recover_with_may_fail_again() {
        let io = IO::<i32, i32>::failure(1)
            .recover_with(|code| IO::<String, i32>::failure(format!("{code}")));
        assert_eq!(io.await, Either::Left("1".to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn test_error_combinators_skip_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&calls);
        let io = IO::<String, i32>::success(1)
            .map_error(|e| e.len())
            .on_error(move |_| observed.fetch_add(1, Ordering::SeqCst));

        assert_eq!(io.await, Either::Right(1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_tap_error_keeps_original_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&calls);
        let io = IO::<&str, ()>::failure("boom").tap_error(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
            UIO::success(())
        });

        assert_eq!(io.await, Either::Left("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_attempt_then_absolve_restores_outcome() {
        let io = IO::<&str, i32>::failure("e").attempt().widen_error::<&str>().absolve();
        assert_eq!(io.await, Either::Left("e"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_refine_or_die_keeps_matching_payload() {
        let io = IO::effect(|| -> i32 { std::panic::panic_any(Rejected(403)) })
            .refine_or_die::<Rejected>();
        assert_eq!(io.await, Either::Left(Rejected(403)));
    }

    #[rstest]
    #[tokio::test]
    #[should_panic(expected = "unrelated")]
    async fn test_refine_or_die_escalates_other_payloads() {
        let io = IO::effect(|| -> i32 { panic!("unrelated") }).refine_or_die::<Rejected>();
        let _ = io.await;
    }
}
