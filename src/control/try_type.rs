//! Try type - the outcome of a computation that may panic.
//!
//! `Try<T>` is the adapter between code that signals failure by panicking and
//! the typed result algebra. [`Try::of`] runs a closure and captures any panic
//! as a [`TryError`]; the result then converts into [`Either`], `Option` or
//! [`Validated`].
//!
//! A panic raised with [`std::panic::panic_any`] keeps its payload, so a typed
//! error can be recovered later with [`TryError::downcast`].
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::control::{Either, Try};
//!
//! let parsed = Try::of(|| "42".parse::<i32>().unwrap());
//! assert_eq!(parsed.to_option(), Some(42));
//!
//! let broken = Try::of(|| "x".parse::<i32>().unwrap());
//! assert!(broken.is_failure());
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{Either, Validated};

// =============================================================================
// TryError
// =============================================================================

/// A captured panic.
///
/// Holds the panic message and, until taken, the original payload.
pub struct TryError {
    message: String,
    payload: Option<Box<dyn Any + Send>>,
}

impl TryError {
    /// Creates a `TryError` from a panic payload as returned by
    /// `catch_unwind`.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = panic_message(payload.as_ref());
        Self {
            message,
            payload: Some(payload),
        }
    }

    /// Creates a `TryError` carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    /// Returns the panic message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the payload is a value of type `X`.
    pub fn is<X: Any>(&self) -> bool {
        self.payload.as_ref().is_some_and(|payload| payload.is::<X>())
    }

    /// Recovers a typed payload raised through `panic_any`.
    ///
    /// Returns the error unchanged when the payload has another type or was
    /// already taken.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` if the payload is not an `X`.
    pub fn downcast<X: Any>(mut self) -> Result<X, Self> {
        match self.payload.take() {
            Some(payload) => match payload.downcast::<X>() {
                Ok(value) => Ok(*value),
                Err(payload) => {
                    self.payload = Some(payload);
                    Err(self)
                }
            },
            None => Err(self),
        }
    }

    /// Takes the raw panic payload, if still available.
    pub fn take_payload(&mut self) -> Option<Box<dyn Any + Send>> {
        self.payload.take()
    }

    /// Turns the error back into a panic.
    ///
    /// The original payload is resumed when present, so the panic looks the
    /// same as the one that was captured.
    pub fn resume(self) -> ! {
        match self.payload {
            Some(payload) => std::panic::resume_unwind(payload),
            None => std::panic::resume_unwind(Box::new(self.message)),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl fmt::Debug for TryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TryError")
            .field("message", &self.message)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

impl fmt::Display for TryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "panicked: {}", self.message)
    }
}

impl std::error::Error for TryError {}

impl PartialEq for TryError {
    /// Two captured panics are equal when their messages are.
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

// =============================================================================
// Try
// =============================================================================

/// The outcome of a computation that may panic.
#[derive(Debug, PartialEq)]
pub enum Try<T> {
    /// The computation returned normally.
    Success(T),
    /// The computation panicked.
    Failure(TryError),
}

impl<T> Try<T> {
    /// Runs `function`, capturing a panic as [`Try::Failure`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Try;
    ///
    /// assert_eq!(Try::of(|| 1 + 1), Try::Success(2));
    ///
    /// let failed = Try::of(|| -> i32 { panic!("boom") });
    /// assert_eq!(failed.fold(|error| error.message().to_string(), |_| String::new()), "boom");
    /// ```
    pub fn of<F>(function: F) -> Self
    where
        F: FnOnce() -> T,
    {
        match catch_unwind(AssertUnwindSafe(function)) {
            Ok(value) => Self::Success(value),
            Err(payload) => Self::Failure(TryError::from_panic(payload)),
        }
    }

    /// Returns `true` if the computation returned normally.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` if the computation panicked.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Eliminates the `Try` by applying one of two functions.
    pub fn fold<U, F, G>(self, on_failure: F, on_success: G) -> U
    where
        F: FnOnce(TryError) -> U,
        G: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(error) => on_failure(error),
        }
    }

    /// Transforms the success value.
    pub fn map<U, F>(self, function: F) -> Try<U>
    where
        F: FnOnce(T) -> U,
    {
        self.fold(Try::Failure, |value| Try::Success(function(value)))
    }

    /// Chains a computation on the success value.
    pub fn flat_map<U, F>(self, function: F) -> Try<U>
    where
        F: FnOnce(T) -> Try<U>,
    {
        self.fold(Try::Failure, function)
    }

    /// Returns the success value, or computes one from the captured panic.
    pub fn get_or_else<F>(self, function: F) -> T
    where
        F: FnOnce(TryError) -> T,
    {
        self.fold(function, |value| value)
    }

    /// Replaces a failure with the outcome of another `Try`.
    #[must_use]
    pub fn recover<F>(self, function: F) -> Self
    where
        F: FnOnce(TryError) -> Self,
    {
        self.fold(function, Try::Success)
    }

    /// Converts into an [`Either`], mapping a captured panic through `function`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::{Either, Try};
    ///
    /// let failed = Try::of(|| -> i32 { panic!("boom") });
    /// assert_eq!(failed.to_either(|error| error.message().len()), Either::Left(4));
    /// ```
    pub fn to_either<E, F>(self, function: F) -> Either<E, T>
    where
        F: FnOnce(TryError) -> E,
    {
        self.fold(|error| Either::Left(function(error)), Either::Right)
    }

    /// Converts into an `Option`, dropping the captured panic.
    pub fn to_option(self) -> Option<T> {
        self.fold(|_| None, Some)
    }

    /// Converts into a [`Validated`], mapping a captured panic through `function`.
    pub fn to_validated<E, F>(self, function: F) -> Validated<E, T>
    where
        F: FnOnce(TryError) -> E,
    {
        self.fold(|error| Validated::Invalid(function(error)), Validated::Valid)
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the captured panic as `Err`.
    pub fn into_result(self) -> Result<T, TryError> {
        self.fold(Err, Ok)
    }
}

impl<T> From<Try<T>> for Either<TryError, T> {
    fn from(value: Try<T>) -> Self {
        value.to_either(|error| error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    struct Rejected(u32);

    #[rstest]
    fn test_string_panic_message_is_kept() {
        let failed = Try::of(|| -> () { panic!("{} apples", 3) });
        let error = failed.into_result().unwrap_err();
        assert_eq!(error.message(), "3 apples");
        assert_eq!(error.to_string(), "panicked: 3 apples");
    }

    #[rstest]
    fn test_typed_payload_downcast() {
        let failed = Try::of(|| -> () { std::panic::panic_any(Rejected(7)) });
        let error = failed.into_result().unwrap_err();
        assert!(error.is::<Rejected>());
        assert_eq!(error.message(), "unknown panic");
        assert_eq!(error.downcast::<Rejected>().unwrap(), Rejected(7));
    }

    #[rstest]
    fn test_downcast_mismatch_returns_error() {
        let failed = Try::of(|| -> () { std::panic::panic_any(Rejected(7)) });
        let error = failed.into_result().unwrap_err();
        let error = error.downcast::<String>().unwrap_err();
        assert!(error.is::<Rejected>());
    }

    #[rstest]
    fn test_to_validated() {
        let success = Try::of(|| 5);
        assert_eq!(success.to_validated(|_| "never"), Validated::Valid(5));
    }
}
