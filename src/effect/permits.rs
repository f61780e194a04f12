//! Permit sources for [`IO::synchronize`](super::IO::synchronize).
//!
//! `Permits` is a counting semaphore shared between the evaluations it
//! guards. Acquiring suspends the waiting task (never the worker thread), and
//! a permit goes back to the source when its guard is dropped, which covers
//! success, failure, panic and cancellation alike.
//!
//! Waiters are served in the order of `tokio::sync::Semaphore`, which is
//! FIFO; nothing in the effect system relies on that.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::PermitError;

/// A bounded source of concurrency permits.
///
/// Cloning a `Permits` shares the same underlying capacity.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::Permits;
///
/// let permits = Permits::new(2);
/// assert_eq!(permits.capacity(), 2);
/// assert_eq!(permits.available(), 2);
///
/// assert!(Permits::try_new(0).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Permits {
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

impl Permits {
    /// Creates a source with `capacity` permits.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use `try_new` for a non-panicking version.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::try_new(capacity).expect("Permits capacity must be greater than 0")
    }

    /// Tries to create a source with `capacity` permits.
    ///
    /// # Errors
    ///
    /// Returns [`PermitError::InvalidCapacity`] if `capacity` is 0.
    pub fn try_new(capacity: usize) -> Result<Self, PermitError> {
        if capacity == 0 {
            return Err(PermitError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
        })
    }

    /// Wraps an existing semaphore that is shared with other code.
    #[must_use]
    pub fn from_semaphore(semaphore: Arc<Semaphore>) -> Self {
        Self {
            capacity: semaphore.available_permits(),
            semaphore,
        }
    }

    /// Returns the number of permits the source was created with.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of permits currently available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Closes the source; pending and future acquisitions fail.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Waits for a permit. The permit is released when the guard drops.
    pub(crate) async fn acquire(&self) -> Result<OwnedSemaphorePermit, PermitError> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| PermitError::Closed)
    }
}
