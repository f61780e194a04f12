//! Extension operations for `std::option::Option`.
//!
//! Rust's `Option` already provides `map`, `and_then` and `filter`; this trait
//! adds the eliminator and the conversions the result algebra relies on.

use super::{Either, Validated};

/// Result-algebra operations on `Option`.
///
/// # Examples
///
/// ```rust
/// use lambars_io::control::{Either, OptionExt};
///
/// let port: Option<u16> = None;
/// assert_eq!(port.to_either(|| "missing port"), Either::Left("missing port"));
///
/// let sum = Some(2).combine(Some(3), |a, b| a + b);
/// assert_eq!(sum, Some(5));
/// ```
pub trait OptionExt<T>: Sized {
    /// Eliminates the option: `on_none` for `None`, `on_some` for `Some`.
    fn fold<U, F, G>(self, on_none: F, on_some: G) -> U
    where
        F: FnOnce() -> U,
        G: FnOnce(T) -> U;

    /// Combines two options pointwise; `None` if either side is `None`.
    fn combine<U, V, F>(self, other: Option<U>, function: F) -> Option<V>
    where
        F: FnOnce(T, U) -> V;

    /// Keeps the value only when `predicate` rejects it.
    #[must_use]
    fn filter_not<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool;

    /// Converts into an [`Either`], producing the `Left` lazily for `None`.
    fn to_either<E, F>(self, on_none: F) -> Either<E, T>
    where
        F: FnOnce() -> E;

    /// Converts into a [`Validated`], producing `Invalid` lazily for `None`.
    fn to_validated<E, F>(self, on_none: F) -> Validated<E, T>
    where
        F: FnOnce() -> E;
}

impl<T> OptionExt<T> for Option<T> {
    fn fold<U, F, G>(self, on_none: F, on_some: G) -> U
    where
        F: FnOnce() -> U,
        G: FnOnce(T) -> U,
    {
        match self {
            Some(value) => on_some(value),
            None => on_none(),
        }
    }

    fn combine<U, V, F>(self, other: Option<U>, function: F) -> Option<V>
    where
        F: FnOnce(T, U) -> V,
    {
        self.zip(other).map(|(left, right)| function(left, right))
    }

    fn filter_not<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        self.filter(|value| !predicate(value))
    }

    fn to_either<E, F>(self, on_none: F) -> Either<E, T>
    where
        F: FnOnce() -> E,
    {
        OptionExt::fold(self, || Either::Left(on_none()), Either::Right)
    }

    fn to_validated<E, F>(self, on_none: F) -> Validated<E, T>
    where
        F: FnOnce() -> E,
    {
        OptionExt::fold(self, || Validated::Invalid(on_none()), Validated::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_fold() {
        assert_eq!(OptionExt::fold(Some(2), || 0, |x| x * 10), 20);
        assert_eq!(OptionExt::fold(None::<i32>, || 0, |x| x * 10), 0);
    }

    #[rstest]
    fn test_combine_with_none() {
        assert_eq!(Some(1).combine(None::<i32>, |a, b| a + b), None);
    }

    #[rstest]
    fn test_filter_not() {
        assert_eq!(Some(4).filter_not(|x| x % 2 == 0), None);
        assert_eq!(Some(3).filter_not(|x| x % 2 == 0), Some(3));
    }

    #[rstest]
    fn test_to_validated() {
        assert_eq!(Some(1).to_validated(|| "absent"), Validated::Valid(1));
        assert_eq!(None::<i32>.to_validated(|| "absent"), Validated::Invalid("absent"));
    }
}
