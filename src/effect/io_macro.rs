//! Comprehension macro for `IO`.
//!
//! `io!` flattens a chain of `flat_map` calls into statement form. It uses
//! `<=` as the bind operator since `<-` cannot be matched in Rust macros.
//!
//! ```text
//! io! {
//!     pattern <= io_expression;   // bind: the success of the IO
//!     let pattern = expression;   // pure let binding
//!     ...
//!     io_expression               // final expression: must be an IO
//! }
//! ```
//!
//! The first failure short-circuits the rest of the block.
//!
//! Each step becomes a `move` closure that may run once per evaluation, so a
//! bound value consumed by a later step must be `Copy` or cloned there.

/// Comprehension over `IO`.
///
/// - `pattern <= io_expr;` binds the success of `io_expr`
/// - `let pattern = expr;` is a plain `let`
/// - the last expression must be an `IO`
///
/// # Examples
///
/// ```rust
/// use lambars_io::control::Either;
/// use lambars_io::effect::IO;
/// use lambars_io::io;
///
/// let total = io! {
///     x <= IO::<String, i32>::success(5);
///     y <= IO::success(10);
///     let z = x + y;
///     IO::success(z * 2)
/// };
/// assert_eq!(total.run_blocking(), Either::Right(30));
/// ```
#[macro_export]
macro_rules! io {
    ($result:expr) => {
        $result
    };

    ($pattern:ident <= $io:expr ; $($rest:tt)+) => {
        $io.flat_map(move |$pattern| {
            $crate::io!($($rest)+)
        })
    };

    (($($pattern:tt)*) <= $io:expr ; $($rest:tt)+) => {
        $io.flat_map(move |($($pattern)*)| {
            $crate::io!($($rest)+)
        })
    };

    (_ <= $io:expr ; $($rest:tt)+) => {
        $io.flat_map(move |_| {
            $crate::io!($($rest)+)
        })
    };

    (let $pattern:ident = $expr:expr ; $($rest:tt)+) => {
        {
            let $pattern = $expr;
            $crate::io!($($rest)+)
        }
    };

    (let ($($pattern:tt)*) = $expr:expr ; $($rest:tt)+) => {
        {
            let ($($pattern)*) = $expr;
            $crate::io!($($rest)+)
        }
    };

    (let $pattern:ident : $ty:ty = $expr:expr ; $($rest:tt)+) => {
        {
            let $pattern: $ty = $expr;
            $crate::io!($($rest)+)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::control::Either;
    use crate::effect::IO;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_io_single_bind() {
        let result = io! {
            x <= IO::<String, i32>::success(5);
            IO::success(x * 2)
        };
        assert_eq!(result.await, Either::Right(10));
    }

    #[rstest]
    #[tokio::test]
    async fn test_io_with_let_and_annotation() {
        let result = io! {
            x <= IO::<String, i32>::success(5);
            let doubled = x * 2;
            let offset: i32 = 1;
            y <= IO::success(10);
            IO::success(doubled + y + offset)
        };
        assert_eq!(result.await, Either::Right(21));
    }

    #[rstest]
    #[tokio::test]
    async fn test_io_wildcard_and_tuple_patterns() {
        let result = io! {
            _ <= IO::<String, &str>::success("ignored");
            (x, y) <= IO::success((10, 20));
            IO::success(x + y)
        };
        assert_eq!(result.await, Either::Right(30));
    }

    #[rstest]
    #[tokio::test]
    async fn test_io_short_circuits_on_failure() {
        let result = io! {
            x <= IO::<String, i32>::success(1);
            _ <= IO::<String, ()>::failure("halt".to_string());
            IO::success(x)
        };
        assert_eq!(result.await, Either::Left("halt".to_string()));
    }
}
