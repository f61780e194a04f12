//! # lambars-io
//!
//! A typed, deferred effect system for Rust.
//!
//! ## Overview
//!
//! Programs are described as immutable values of type `IO<E, T>`: trees of
//! nodes that fail with a typed `E` or succeed with `T`. A tree is inert until
//! evaluated on a tokio runtime, and every evaluation re-executes the effects
//! it describes. The crate includes:
//!
//! - **Result Algebra**: [`Either`](control::Either), [`Try`](control::Try),
//!   [`Validated`](control::Validated) and conversions between them
//! - **Effect Trees**: constructors, sequencing and error-channel combinators
//! - **Resource Safety**: `bracket` and `brace`
//! - **Concurrency**: parallel evaluation, permits, deadlines and execution
//!   contexts
//! - **Comprehension**: the [`io!`] macro and `IO::binding` for `async`/`?`
//!
//! ## Feature Flags
//!
//! - `control`: The result algebra (`Either`, `Try`, `Validated`)
//! - `effect`: The `IO` effect system (requires tokio)
//! - `serde`: `Serialize`/`Deserialize` for `Either`
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use lambars_io::prelude::*;
//!
//! let io = IO::<String, i32>::success(20)
//!     .flat_map(|x| IO::success(x + 1))
//!     .map(|x| x * 2);
//!
//! assert_eq!(io.run_blocking(), Either::Right(42));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use lambars_io::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "effect")]
    pub use crate::effect::*;
}

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "effect")]
pub mod effect;
