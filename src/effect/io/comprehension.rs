//! Native `async`/`?` composition of `IO` trees.
//!
//! [`IO::bind`] evaluates a tree and returns a `Result`, so `?` short-circuits
//! on the first failure inside an `async` block. [`IO::binding`] turns such a
//! block back into a deferred tree. See also the [`io!`](crate::io) macro.

use std::future::Future;

use futures::FutureExt;
use futures::future;

use super::IO;

impl<E: Send + 'static, T: Send + 'static> IO<E, T> {
    /// Evaluates the tree, returning the outcome as a `Result`.
    ///
    /// Meant for use inside [`IO::binding`], where `?` propagates the failure.
    ///
    /// # Errors
    ///
    /// Returns `Err(E)` when the tree fails.
    pub async fn bind(&self) -> Result<T, E> {
        self.run().await.into()
    }

    /// Builds a tree from an `async` block that uses `?` over [`IO::bind`].
    ///
    /// `block` is called on each run to create a fresh future. A panic inside
    /// it is a defect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let price = IO::<String, u32>::success(40);
    /// let shipping = IO::<String, u32>::success(2);
    ///
    /// let total = IO::<String, u32>::binding(move || {
    ///     let (price, shipping) = (price.clone(), shipping.clone());
    ///     async move {
    ///         let price = price.bind().await?;
    ///         let shipping = shipping.bind().await?;
    ///         Ok(price + shipping)
    ///     }
    /// });
    /// assert_eq!(total.run_blocking(), Either::Right(42));
    /// ```
    pub fn binding<F, Fut>(block: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        IO::<E, Result<T, E>>::effect_total_async(block)
            .bind_with(|result| future::ready(result.into()).boxed())
    }
}
