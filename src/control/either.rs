//! Either type - a value that is one of two alternatives.
//!
//! This module provides the `Either<L, R>` type, the foundation of the result
//! algebra. By convention `Left` carries an error and `Right` carries a
//! success, so every success-side operation leaves a `Left` untouched and
//! every error-side operation leaves a `Right` untouched.
//!
//! [`Either::fold`] is the canonical eliminator; the remaining operations are
//! expressed through it. The by-reference views (`left_ref`, `right_ref`,
//! `Debug`) match directly because `fold` consumes the value.
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::control::Either;
//!
//! let parsed: Either<String, i32> = Either::Right(21);
//! let doubled = parsed.map(|value| value * 2);
//! assert_eq!(doubled, Either::Right(42));
//!
//! let message = doubled.fold(|error| error, |value| format!("value = {value}"));
//! assert_eq!(message, "value = 42");
//! ```

use std::fmt;
use std::hash::Hash;

use super::Validated;

/// A value that is either `Left(L)` or `Right(R)`.
///
/// `Left` conventionally represents failure and `Right` success. Instances are
/// immutable; every operation consumes the value and returns a new one.
///
/// # Type Parameters
///
/// * `L` - The type of the left (error) value
/// * `R` - The type of the right (success) value
///
/// # Examples
///
/// ```rust
/// use lambars_io::control::Either;
///
/// let success: Either<String, i32> = Either::Right(42);
/// let failure: Either<String, i32> = Either::Left("error".to_string());
///
/// assert_eq!(success.map(|x| x * 2), Either::Right(84));
/// assert_eq!(failure.map(|x| x * 2), Either::Left("error".to_string()));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Either<L, R> {
    /// The left variant, conventionally representing failure.
    Left(L),
    /// The right variant, conventionally representing success.
    Right(R),
}

impl<L, R> Either<L, R> {
    // =========================================================================
    // Type Checking
    // =========================================================================

    /// Returns `true` if this is a `Left` value.
    #[inline]
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Returns `true` if this is a `Right` value.
    #[inline]
    pub const fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    // =========================================================================
    // Fold Operation
    // =========================================================================

    /// Eliminates the `Either` by applying one of two functions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    ///
    /// let left: Either<i32, String> = Either::Left(42);
    /// assert_eq!(left.fold(|x| x.to_string(), |s| s), "42");
    ///
    /// let right: Either<i32, String> = Either::Right("hello".to_string());
    /// assert_eq!(right.fold(|x: i32| x.to_string(), |s| s), "hello");
    /// ```
    #[inline]
    pub fn fold<T, F, G>(self, left_function: F, right_function: G) -> T
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> T,
    {
        match self {
            Self::Left(value) => left_function(value),
            Self::Right(value) => right_function(value),
        }
    }

    // =========================================================================
    // Value Extraction (Consuming)
    // =========================================================================

    /// Converts the `Either` into an `Option<L>`, discarding a right value.
    #[inline]
    pub fn left(self) -> Option<L> {
        self.fold(Some, |_| None)
    }

    /// Converts the `Either` into an `Option<R>`, discarding a left value.
    #[inline]
    pub fn right(self) -> Option<R> {
        self.fold(|_| None, Some)
    }

    /// Alias for [`Either::right`].
    #[inline]
    pub fn to_option(self) -> Option<R> {
        self.right()
    }

    /// Returns a reference to the left value if present.
    #[inline]
    pub const fn left_ref(&self) -> Option<&L> {
        match self {
            Self::Left(value) => Some(value),
            Self::Right(_) => None,
        }
    }

    /// Returns a reference to the right value if present.
    #[inline]
    pub const fn right_ref(&self) -> Option<&R> {
        match self {
            Self::Left(_) => None,
            Self::Right(value) => Some(value),
        }
    }

    /// Returns the right value, or computes one from the left value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    ///
    /// let left: Either<&str, usize> = Either::Left("four");
    /// assert_eq!(left.get_or_else(str::len), 4);
    /// ```
    #[inline]
    pub fn get_or_else<F>(self, function: F) -> R
    where
        F: FnOnce(L) -> R,
    {
        self.fold(function, |value| value)
    }

    // =========================================================================
    // Mapping Operations
    // =========================================================================

    /// Applies a function to the left value if present.
    ///
    /// If this is `Right(r)`, returns `Right(r)` unchanged.
    #[inline]
    pub fn map_left<T, F>(self, function: F) -> Either<T, R>
    where
        F: FnOnce(L) -> T,
    {
        self.fold(|value| Either::Left(function(value)), Either::Right)
    }

    /// Applies a function to the right value if present.
    ///
    /// If this is `Left(l)`, returns `Left(l)` unchanged.
    #[inline]
    pub fn map_right<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> T,
    {
        self.fold(Either::Left, |value| Either::Right(function(value)))
    }

    /// Transforms the success channel. Alias for [`Either::map_right`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    ///
    /// let right: Either<String, &str> = Either::Right("hello");
    /// assert_eq!(right.map(str::len), Either::Right(5));
    /// ```
    #[inline]
    pub fn map<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> T,
    {
        self.map_right(function)
    }

    /// Applies one of two functions depending on whether this is Left or Right.
    #[inline]
    pub fn bimap<T, U, F, G>(self, left_function: F, right_function: G) -> Either<T, U>
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> U,
    {
        self.fold(
            |value| Either::Left(left_function(value)),
            |value| Either::Right(right_function(value)),
        )
    }

    // =========================================================================
    // Chaining Operations
    // =========================================================================

    /// Chains a computation on the right value, short-circuiting on `Left`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    ///
    /// let halve = |n: i32| {
    ///     if n % 2 == 0 { Either::Right(n / 2) } else { Either::Left(format!("{n} is odd")) }
    /// };
    ///
    /// assert_eq!(Either::Right(8).flat_map(halve), Either::Right(4));
    /// assert_eq!(Either::Right(3).flat_map(halve), Either::Left("3 is odd".to_string()));
    /// ```
    #[inline]
    pub fn flat_map<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> Either<L, T>,
    {
        self.fold(Either::Left, function)
    }

    /// Alias for [`Either::flat_map`].
    #[inline]
    pub fn and_then<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> Either<L, T>,
    {
        self.flat_map(function)
    }

    /// Chains a computation on the left value, leaving `Right` untouched.
    ///
    /// This is how a failure is replaced by another outcome, which may itself
    /// be a success.
    #[inline]
    pub fn flat_map_left<T, F>(self, function: F) -> Either<T, R>
    where
        F: FnOnce(L) -> Either<T, R>,
    {
        self.fold(function, Either::Right)
    }

    /// Observes the left value without changing the `Either`.
    #[inline]
    #[must_use]
    pub fn on_left<F>(self, function: F) -> Self
    where
        F: FnOnce(&L),
    {
        self.fold(
            |value| {
                function(&value);
                Self::Left(value)
            },
            Self::Right,
        )
    }

    /// Observes the right value without changing the `Either`.
    #[inline]
    #[must_use]
    pub fn on_right<F>(self, function: F) -> Self
    where
        F: FnOnce(&R),
    {
        self.fold(Self::Left, |value| {
            function(&value);
            Self::Right(value)
        })
    }

    /// Turns a `Right` that fails `predicate` into a `Left` produced by
    /// `on_false`.
    ///
    /// Passing `Right` values and every `Left` are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    ///
    /// let adult = |age: u32| {
    ///     Either::<String, u32>::Right(age).filter_or_else(|age| *age >= 18, |age| format!("{age} < 18"))
    /// };
    ///
    /// assert_eq!(adult(30), Either::Right(30));
    /// assert_eq!(adult(12), Either::Left("12 < 18".to_string()));
    /// ```
    #[inline]
    pub fn filter_or_else<P, F>(self, predicate: P, on_false: F) -> Self
    where
        P: FnOnce(&R) -> bool,
        F: FnOnce(R) -> L,
    {
        self.flat_map(|value| {
            if predicate(&value) {
                Either::Right(value)
            } else {
                Either::Left(on_false(value))
            }
        })
    }

    // =========================================================================
    // Swap Operation
    // =========================================================================

    /// Swaps the Left and Right variants.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    ///
    /// let left: Either<i32, String> = Either::Left(42);
    /// assert_eq!(left.swap(), Either::Right(42));
    /// ```
    #[inline]
    pub fn swap(self) -> Either<R, L> {
        self.fold(Either::Right, Either::Left)
    }

    // =========================================================================
    // Unwrap Operations
    // =========================================================================

    /// Returns the left value, consuming the either.
    ///
    /// # Panics
    ///
    /// Panics if this is a `Right` value.
    #[inline]
    pub fn unwrap_left(self) -> L {
        self.fold(
            |value| value,
            |_| panic!("called `Either::unwrap_left()` on a `Right` value"),
        )
    }

    /// Returns the right value, consuming the either.
    ///
    /// # Panics
    ///
    /// Panics if this is a `Left` value.
    #[inline]
    pub fn unwrap_right(self) -> R {
        self.fold(
            |_| panic!("called `Either::unwrap_right()` on a `Left` value"),
            |value| value,
        )
    }

    // =========================================================================
    // Conversion Operations
    // =========================================================================

    /// Converts into a pair of `Option`s.
    #[inline]
    pub fn into_options(self) -> (Option<L>, Option<R>) {
        self.fold(|value| (Some(value), None), |value| (None, Some(value)))
    }

    /// Converts into a [`Validated`], `Left` becoming `Invalid`.
    #[inline]
    pub fn to_validated(self) -> Validated<L, R> {
        self.fold(Validated::Invalid, Validated::Valid)
    }
}

// =============================================================================
// Flatten
// =============================================================================

impl<L, R> Either<L, Either<L, R>> {
    /// Removes one level of nesting.
    ///
    /// The outer `Left` wins over an inner one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    ///
    /// let nested: Either<&str, Either<&str, i32>> = Either::Right(Either::Left("inner"));
    /// assert_eq!(nested.flatten(), Either::Left("inner"));
    ///
    /// let nested: Either<&str, Either<&str, i32>> = Either::Right(Either::Right(1));
    /// assert_eq!(nested.flatten(), Either::Right(1));
    /// ```
    #[inline]
    pub fn flatten(self) -> Either<L, R> {
        self.flat_map(|inner| inner)
    }
}

// =============================================================================
// Default-based Operations
// =============================================================================

impl<L: Default, R> Either<L, R> {
    /// Returns the left value, or default if this is a Right.
    #[inline]
    pub fn left_or_default(self) -> L {
        self.fold(|value| value, |_| L::default())
    }
}

impl<L, R: Default> Either<L, R> {
    /// Returns the right value, or default if this is a Left.
    #[inline]
    pub fn right_or_default(self) -> R {
        self.fold(|_| R::default(), |value| value)
    }
}

// =============================================================================
// Debug Implementation
// =============================================================================

impl<L: fmt::Debug, R: fmt::Debug> fmt::Debug for Either<L, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left(value) => formatter.debug_tuple("Left").field(value).finish(),
            Self::Right(value) => formatter.debug_tuple("Right").field(value).finish(),
        }
    }
}

// =============================================================================
// From Implementations
// =============================================================================

impl<L, R> From<Result<R, L>> for Either<L, R> {
    /// `Ok(r)` becomes `Right(r)`, and `Err(e)` becomes `Left(e)`.
    #[inline]
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(value) => Self::Right(value),
            Err(error) => Self::Left(error),
        }
    }
}

impl<L, R> From<Either<L, R>> for Result<R, L> {
    /// `Right(r)` becomes `Ok(r)`, and `Left(l)` becomes `Err(l)`.
    #[inline]
    fn from(either: Either<L, R>) -> Self {
        either.fold(Err, Ok)
    }
}
