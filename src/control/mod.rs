//! The result algebra.
//!
//! This module provides the value types the effect system is built on:
//!
//! - [`Either`]: a value that is one of two alternatives (error or success)
//! - [`Try`]: the outcome of a computation that may panic
//! - [`Validated`]: a validation outcome
//! - [`OptionExt`]: conversions from `Option` into the other types
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::control::{Either, OptionExt, Try};
//!
//! let from_option: Either<&str, i32> = Some(1).to_either(|| "absent");
//! let from_try: Either<String, i32> = Try::of(|| 1).to_either(|error| error.to_string());
//!
//! assert_eq!(from_option.right(), from_try.right());
//! ```

mod either;
mod option_ext;
mod try_type;
mod validated;

pub use either::Either;
pub use option_ext::OptionExt;
pub use try_type::{Try, TryError};
pub use validated::Validated;

pub(crate) use try_type::panic_message;
