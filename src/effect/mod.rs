//! Deferred, typed effects.
//!
//! The central type is [`IO<E, T>`](IO): an immutable, replayable tree that
//! describes a computation failing with `E` or succeeding with `T`. Nothing
//! runs until the tree is evaluated with [`IO::run`], `.await`, or one of the
//! blocking entry points.
//!
//! # Failures and Defects
//!
//! - A **failure** is a typed `E` carried on the error channel. Combinators
//!   such as `map_error`, `recover` and `recover_with` operate on it.
//! - A **defect** is a panic. It bypasses the error channel unless a
//!   capturing node (`effect`, `effect_async`, the use step of `bracket`)
//!   turns it into a [`TryError`](crate::control::TryError).
//!
//! # Concurrency
//!
//! [`IO::par`] and [`IO::par_zip`] spawn their operands on the runtime
//! driving the evaluation. [`IO::synchronize`] bounds concurrent access with
//! [`Permits`], [`IO::timeout`] races a deadline, and [`IO::on_context`]
//! moves a subtree onto another runtime.
//!
//! # Comprehension
//!
//! ```rust
//! use lambars_io::control::Either;
//! use lambars_io::effect::IO;
//! use lambars_io::io;
//!
//! let io = io! {
//!     x <= IO::<String, i32>::success(10);
//!     y <= IO::success(x * 2);
//!     IO::success(x + y)
//! };
//! assert_eq!(io.run_blocking(), Either::Right(30));
//! ```

mod context;
mod error;
mod io;
mod io_macro;
mod permits;
pub mod runtime;

pub use context::ExecutionContext;
pub use error::{PermitError, TimeoutError};
pub use io::{FailIO, IO, UIO};
pub use permits::Permits;
pub use runtime::BlockingError;
