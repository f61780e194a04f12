//! Success-channel combinators: transformation, chaining and sequential
//! combination of trees.
//!
//! Every combinator here only builds nodes. Multi-operand nodes evaluate their
//! operands strictly left to right and stop at the first failure; operands
//! after it are never started.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use super::{IO, Node, Step, UIO};
use crate::control::Either;

type Continuation<E, A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, Either<E, T>> + Send + Sync>;

// =============================================================================
// Steps
// =============================================================================

/// Feeds the success of `source` into `continuation`.
struct Bind<E, A, T> {
    source: IO<E, A>,
    continuation: Continuation<E, A, T>,
}

impl<E, A, T> Step<E, T> for Bind<E, A, T>
where
    E: Send + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    fn resume(&self) -> BoxFuture<'static, Either<E, T>> {
        let source = self.source.run();
        let continuation = Arc::clone(&self.continuation);
        async move {
            match source.await {
                Either::Left(error) => Either::Left(error),
                Either::Right(value) => continuation(value).await,
            }
        }
        .boxed()
    }
}

struct ZipWith<E, A, B, T> {
    left: IO<E, A>,
    right: IO<E, B>,
    combine: Arc<dyn Fn(A, B) -> T + Send + Sync>,
}

impl<E, A, B, T> Step<E, T> for ZipWith<E, A, B, T>
where
    E: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    T: Send + 'static,
{
    fn resume(&self) -> BoxFuture<'static, Either<E, T>> {
        let left = self.left.run();
        let right = self.right.clone();
        let combine = Arc::clone(&self.combine);
        async move {
            let first = match left.await {
                Either::Left(error) => return Either::Left(error),
                Either::Right(value) => value,
            };
            match right.run().await {
                Either::Left(error) => Either::Left(error),
                Either::Right(second) => Either::Right(combine(first, second)),
            }
        }
        .boxed()
    }
}

/// Evaluates a homogeneous list in order, collecting successes.
struct Sequence<E, T> {
    effects: Arc<[IO<E, T>]>,
}

impl<E: Send + 'static, T: Send + 'static> Step<E, Vec<T>> for Sequence<E, T> {
    fn resume(&self) -> BoxFuture<'static, Either<E, Vec<T>>> {
        let effects = Arc::clone(&self.effects);
        async move {
            let mut values = Vec::with_capacity(effects.len());
            for effect in effects.iter() {
                match effect.run().await {
                    Either::Left(error) => return Either::Left(error),
                    Either::Right(value) => values.push(value),
                }
            }
            Either::Right(values)
        }
        .boxed()
    }
}

struct Reduce<E, T> {
    first: IO<E, T>,
    rest: Arc<[IO<E, T>]>,
    combine: Arc<dyn Fn(T, T) -> T + Send + Sync>,
}

impl<E: Send + 'static, T: Send + 'static> Step<E, T> for Reduce<E, T> {
    fn resume(&self) -> BoxFuture<'static, Either<E, T>> {
        let first = self.first.run();
        let rest = Arc::clone(&self.rest);
        let combine = Arc::clone(&self.combine);
        async move {
            let mut accumulated = match first.await {
                Either::Left(error) => return Either::Left(error),
                Either::Right(value) => value,
            };
            for effect in rest.iter() {
                match effect.run().await {
                    Either::Left(error) => return Either::Left(error),
                    Either::Right(value) => accumulated = combine(accumulated, value),
                }
            }
            Either::Right(accumulated)
        }
        .boxed()
    }
}

/// Evaluates every operand, keeping successes and dropping failures.
struct CollectSuccess<E, T> {
    effects: Arc<[IO<E, T>]>,
}

impl<E, T> Step<std::convert::Infallible, Vec<T>> for CollectSuccess<E, T>
where
    E: Send + 'static,
    T: Send + 'static,
{
    fn resume(&self) -> BoxFuture<'static, Either<std::convert::Infallible, Vec<T>>> {
        let effects = Arc::clone(&self.effects);
        async move {
            let mut kept = Vec::new();
            for effect in effects.iter() {
                if let Either::Right(value) = effect.run().await {
                    kept.push(value);
                }
            }
            Either::Right(kept)
        }
        .boxed()
    }
}

// =============================================================================
// Combinators
// =============================================================================

impl<E: Send + 'static, T: Send + 'static> IO<E, T> {
    pub(super) fn bind_with<U, F>(self, continuation: F) -> IO<E, U>
    where
        U: Send + 'static,
        F: Fn(T) -> BoxFuture<'static, Either<E, U>> + Send + Sync + 'static,
    {
        IO::from_node(Node::FlatMap(Box::new(Bind {
            source: self,
            continuation: Arc::new(continuation),
        })))
    }

    /// Transforms the success value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::UIO;
    ///
    /// assert_eq!(UIO::success(5).map(|x| x * 2).run_blocking(), Either::Right(10));
    /// ```
    pub fn map<U, F>(self, function: F) -> IO<E, U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.bind_with(move |value| future::ready(Either::Right(function(value))).boxed())
    }

    /// Chains a tree built from the success value.
    ///
    /// A failure of `self` short-circuits: `function` is never called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::<String, i32>::success(10).flat_map(|x| IO::success(x * 2));
    /// assert_eq!(io.run_blocking(), Either::Right(20));
    /// ```
    pub fn flat_map<U, F>(self, function: F) -> IO<E, U>
    where
        U: Send + 'static,
        F: Fn(T) -> IO<E, U> + Send + Sync + 'static,
    {
        self.bind_with(move |value| function(value).run())
    }

    /// Alias for [`flat_map`](Self::flat_map).
    pub fn and_then<U, F>(self, function: F) -> IO<E, U>
    where
        U: Send + 'static,
        F: Fn(T) -> IO<E, U> + Send + Sync + 'static,
    {
        self.flat_map(function)
    }

    /// Runs `next` after `self`, discarding the success of `self`.
    pub fn then<U: Send + 'static>(self, next: IO<E, U>) -> IO<E, U> {
        self.flat_map(move |_| next.clone())
    }

    /// Replaces the success value with `value`.
    pub fn as_value<U>(self, value: U) -> IO<E, U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }

    /// Discards the success value.
    pub fn void(self) -> IO<E, ()> {
        self.map(|_| ())
    }

    /// Observes the success value with a side-effecting callback.
    ///
    /// The callback's return value is discarded and the outcome passes
    /// through unchanged.
    pub fn for_each<R, F>(self, function: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.bind_with(move |value| {
            function(&value);
            future::ready(Either::Right(value)).boxed()
        })
    }

    /// Alias for [`for_each`](Self::for_each).
    pub fn on_success<R, F>(self, function: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.for_each(function)
    }

    /// Evaluates an auxiliary tree on success, then passes the original
    /// success through. The auxiliary outcome, failure included, is discarded.
    pub fn tap<E2, X, F>(self, function: F) -> Self
    where
        E2: Send + 'static,
        X: Send + 'static,
        F: Fn(&T) -> IO<E2, X> + Send + Sync + 'static,
    {
        self.bind_with(move |value| {
            let auxiliary = function(&value).run();
            async move {
                let _ = auxiliary.await;
                Either::Right(value)
            }
            .boxed()
        })
    }

    /// Turns every success into a failure, yielding a tree that cannot succeed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::<String, String>::success("denied".to_string()).fail(|reason| reason);
    /// assert!(matches!(io.run_blocking(), Either::Left(reason) if reason == "denied"));
    /// ```
    pub fn fail<F>(self, function: F) -> IO<E, std::convert::Infallible>
    where
        F: Fn(T) -> E + Send + Sync + 'static,
    {
        self.bind_with(move |value| future::ready(Either::Left(function(value))).boxed())
    }

    /// Keeps successes satisfying `predicate`, failing with `on_false` otherwise.
    pub fn filter_or_fail<P, F>(self, predicate: P, on_false: F) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        F: Fn(T) -> E + Send + Sync + 'static,
    {
        self.bind_with(move |value| {
            let outcome = if predicate(&value) {
                Either::Right(value)
            } else {
                Either::Left(on_false(value))
            };
            future::ready(outcome).boxed()
        })
    }

    /// Combines two trees sequentially: `self` first, then `other`.
    ///
    /// The first failure in evaluation order wins; `other` is not started
    /// when `self` fails.
    pub fn zip<U, R, F>(self, other: IO<E, U>, combine: F) -> IO<E, R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(T, U) -> R + Send + Sync + 'static,
    {
        IO::from_node(Node::Zip(Box::new(ZipWith {
            left: self,
            right: other,
            combine: Arc::new(combine),
        })))
    }

    /// Pairs two successes.
    pub fn product<U: Send + 'static>(self, other: IO<E, U>) -> IO<E, (T, U)> {
        self.zip(other, |first, second| (first, second))
    }

    /// Combines three trees sequentially.
    pub fn zip3<B, C, R, F>(self, second: IO<E, B>, third: IO<E, C>, combine: F) -> IO<E, R>
    where
        B: Send + 'static,
        C: Send + 'static,
        R: Send + 'static,
        F: Fn(T, B, C) -> R + Send + Sync + 'static,
    {
        self.product(second)
            .zip(third, move |(a, b), c| combine(a, b, c))
    }

    /// Combines four trees sequentially.
    pub fn zip4<B, C, D, R, F>(
        self,
        second: IO<E, B>,
        third: IO<E, C>,
        fourth: IO<E, D>,
        combine: F,
    ) -> IO<E, R>
    where
        B: Send + 'static,
        C: Send + 'static,
        D: Send + 'static,
        R: Send + 'static,
        F: Fn(T, B, C, D) -> R + Send + Sync + 'static,
    {
        self.product(second)
            .product(third)
            .zip(fourth, move |((a, b), c), d| combine(a, b, c, d))
    }

    /// Folds `first` and `rest` left to right with `combine`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::UIO;
    ///
    /// let total = UIO::reduce(UIO::success(1), [UIO::success(2), UIO::success(3)], |a, b| a + b);
    /// assert_eq!(total.run_blocking(), Either::Right(6));
    /// ```
    pub fn reduce<I, F>(first: Self, rest: I, combine: F) -> Self
    where
        I: IntoIterator<Item = Self>,
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        IO::from_node(Node::Zip(Box::new(Reduce {
            first,
            rest: rest.into_iter().collect(),
            combine: Arc::new(combine),
        })))
    }

    /// Evaluates `effects` in order and collects their successes.
    ///
    /// Stops at the first failure.
    pub fn sequence<I>(effects: I) -> IO<E, Vec<T>>
    where
        I: IntoIterator<Item = Self>,
    {
        IO::from_node(Node::Zip(Box::new(Sequence {
            effects: effects.into_iter().collect(),
        })))
    }

    /// Evaluates every operand and keeps only the successes, in input order.
    ///
    /// The result cannot fail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let kept = IO::collect_success([
    ///     IO::<&str, i32>::success(1),
    ///     IO::failure("lost"),
    ///     IO::success(3),
    /// ]);
    /// assert_eq!(kept.run_blocking(), Either::Right(vec![1, 3]));
    /// ```
    pub fn collect_success<I>(effects: I) -> UIO<Vec<T>>
    where
        I: IntoIterator<Item = Self>,
    {
        IO::from_node(Node::Zip(Box::new(CollectSuccess {
            effects: effects.into_iter().collect(),
        })))
    }
}

impl<E: Send + 'static, T: Send + 'static> IO<E, Vec<T>> {
    /// Maps each item to a tree and evaluates them in order.
    pub fn traverse<A, I, F>(items: I, function: F) -> Self
    where
        I: IntoIterator<Item = A>,
        F: Fn(A) -> IO<E, T>,
    {
        IO::sequence(items.into_iter().map(function))
    }
}
