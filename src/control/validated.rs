//! Validated type - a validation outcome.
//!
//! `Validated<E, T>` has the same shape as [`Either`] but names its variants
//! after validation: `Valid(T)` or `Invalid(E)`. It is provided as a
//! conversion target; no accumulation combinator is offered.

use super::Either;

/// The outcome of a validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Validated<E, T> {
    /// The value passed validation.
    Valid(T),
    /// The value failed validation.
    Invalid(E),
}

impl<E, T> Validated<E, T> {
    /// Creates a `Valid` value.
    pub const fn valid(value: T) -> Self {
        Self::Valid(value)
    }

    /// Creates an `Invalid` value.
    pub const fn invalid(error: E) -> Self {
        Self::Invalid(error)
    }

    /// Returns `true` if this is `Valid`.
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns `true` if this is `Invalid`.
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Eliminates the `Validated` by applying one of two functions.
    pub fn fold<U, F, G>(self, on_invalid: F, on_valid: G) -> U
    where
        F: FnOnce(E) -> U,
        G: FnOnce(T) -> U,
    {
        match self {
            Self::Valid(value) => on_valid(value),
            Self::Invalid(error) => on_invalid(error),
        }
    }

    /// Transforms the valid value.
    pub fn map<U, F>(self, function: F) -> Validated<E, U>
    where
        F: FnOnce(T) -> U,
    {
        self.fold(Validated::Invalid, |value| Validated::Valid(function(value)))
    }

    /// Transforms the invalid value.
    pub fn map_invalid<U, F>(self, function: F) -> Validated<U, T>
    where
        F: FnOnce(E) -> U,
    {
        self.fold(|error| Validated::Invalid(function(error)), Validated::Valid)
    }

    /// Converts into an [`Either`], `Invalid` becoming `Left`.
    pub fn to_either(self) -> Either<E, T> {
        self.fold(Either::Left, Either::Right)
    }

    /// Converts into an `Option`, dropping the invalid value.
    pub fn to_option(self) -> Option<T> {
        self.fold(|_| None, Some)
    }
}

impl<E, T> From<Either<E, T>> for Validated<E, T> {
    fn from(either: Either<E, T>) -> Self {
        either.to_validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Validated::Valid(3), Either::Right(3))]
    #[case(Validated::Invalid("bad"), Either::Left("bad"))]
    fn test_to_either(#[case] validated: Validated<&'static str, i32>, #[case] expected: Either<&'static str, i32>) {
        assert_eq!(validated.to_either(), expected);
    }

    #[rstest]
    fn test_map_skips_invalid() {
        let invalid: Validated<&str, i32> = Validated::invalid("bad");
        assert_eq!(invalid.map(|x| x * 2), Validated::Invalid("bad"));
        assert!(Validated::<&str, i32>::valid(1).is_valid());
    }
}
