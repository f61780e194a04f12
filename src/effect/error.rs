//! Error types for the effect system.
//!
//! Typed failures of an [`IO`](super::IO) are whatever the caller chooses for
//! `E`. The types here describe conditions raised by the effect system itself:
//! an elapsed deadline, which `timeout` hands to the caller's mapping function,
//! and an unusable permit source.

use std::time::Duration;

use thiserror::Error;

/// A deadline elapsed before the wrapped evaluation finished.
///
/// Passed to the `on_timeout` function of [`IO::timeout`](super::IO::timeout)
/// so that the caller can turn it into an ordinary typed failure.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::TimeoutError;
/// use std::time::Duration;
///
/// let error = TimeoutError {
///     duration: Duration::from_secs(5),
/// };
/// assert_eq!(error.to_string(), "operation timed out after 5s");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {duration:?}")]
pub struct TimeoutError {
    /// The timeout duration that was exceeded.
    pub duration: Duration,
}

/// Errors raised by a [`Permits`](super::Permits) source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermitError {
    /// The permit capacity was set to zero.
    ///
    /// A source with no permits would suspend every evaluation forever.
    #[error("permit capacity must be greater than 0")]
    InvalidCapacity,

    /// The underlying semaphore was closed and no longer hands out permits.
    #[error("permit source is closed")]
    Closed,
}
