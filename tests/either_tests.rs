//! Unit tests for Either<L, R> type.
//!
//! Either is the outcome type of every `IO` evaluation:
//! - `Left(L)`: a typed failure
//! - `Right(R)`: a success

#![cfg(feature = "control")]

use lambars_io::control::{Either, Validated};
use rstest::rstest;
use std::cell::Cell;

// =============================================================================
// Basic Construction and Type Checking
// =============================================================================

#[rstest]
fn either_left_is_left() {
    let value: Either<i32, String> = Either::Left(42);
    assert!(value.is_left());
    assert!(!value.is_right());
}

#[rstest]
fn either_right_is_right() {
    let value: Either<i32, String> = Either::Right("hello".to_string());
    assert!(value.is_right());
    assert!(!value.is_left());
}

// =============================================================================
// Elimination
// =============================================================================

#[rstest]
#[case(Either::Left("bad"), "failure: bad")]
#[case(Either::Right(7), "success: 7")]
fn either_fold_selects_branch(#[case] value: Either<&str, i32>, #[case] expected: &str) {
    let rendered = value.fold(
        |error| format!("failure: {error}"),
        |success| format!("success: {success}"),
    );
    assert_eq!(rendered, expected);
}

#[rstest]
fn either_get_or_else_uses_left() {
    let value: Either<String, usize> = Either::Left("four".to_string());
    assert_eq!(value.get_or_else(|error| error.len()), 4);
}

#[rstest]
fn either_projections() {
    let value: Either<i32, &str> = Either::Right("r");
    assert_eq!(value.left_ref(), None);
    assert_eq!(value.right_ref(), Some(&"r"));
    assert_eq!(value.into_options(), (None, Some("r")));
    assert_eq!(value.to_option(), Some("r"));
}

// =============================================================================
// Transformation
// =============================================================================

#[rstest]
fn either_map_leaves_left_untouched() {
    let value: Either<&str, i32> = Either::Left("error");
    assert_eq!(value.map(|x| x * 2), Either::Left("error"));
}

#[rstest]
fn either_bimap_transforms_active_side() {
    let left: Either<i32, i32> = Either::Left(1);
    let right: Either<i32, i32> = Either::Right(1);
    assert_eq!(left.bimap(|l| l + 10, |r| r * 10), Either::Left(11));
    assert_eq!(right.bimap(|l| l + 10, |r| r * 10), Either::Right(10));
}

#[rstest]
fn either_flat_map_short_circuits() {
    let calls = Cell::new(0);
    let value: Either<&str, i32> = Either::Left("stop");
    let result = value.flat_map(|x| {
        calls.set(calls.get() + 1);
        Either::<&str, i32>::Right(x)
    });
    assert_eq!(result, Either::Left("stop"));
    assert_eq!(calls.get(), 0);
}

#[rstest]
fn either_flat_map_left_recovers() {
    let value: Either<&str, i32> = Either::Left("7");
    let recovered = value.flat_map_left(|text| match text.parse::<i32>() {
        Ok(number) => Either::<String, i32>::Right(number),
        Err(error) => Either::Left(error.to_string()),
    });
    assert_eq!(recovered, Either::Right(7));
}

#[rstest]
fn either_swap_is_an_involution() {
    let value: Either<i32, &str> = Either::Left(3);
    assert_eq!(value.swap().swap(), value);
}

#[rstest]
fn either_flatten_collapses_nesting() {
    let nested: Either<&str, Either<&str, i32>> = Either::Right(Either::Left("inner"));
    assert_eq!(nested.flatten(), Either::Left("inner"));
}

// =============================================================================
// Observation and Filtering
// =============================================================================

#[rstest]
fn either_on_left_and_on_right_observe_once() {
    let seen = Cell::new(0);
    let value: Either<i32, i32> = Either::Right(5);
    let value = value
        .on_left(|l| seen.set(seen.get() + l))
        .on_right(|r| seen.set(seen.get() + r * 100));
    assert_eq!(seen.get(), 500);
    assert_eq!(value, Either::Right(5));
}

#[rstest]
#[case(20, Either::Right(20))]
#[case(3, Either::Left("3 is too small".to_string()))]
fn either_filter_or_else(#[case] input: i32, #[case] expected: Either<String, i32>) {
    let value: Either<String, i32> = Either::Right(input);
    let filtered = value.filter_or_else(|n| *n >= 10, |n| format!("{n} is too small"));
    assert_eq!(filtered, expected);
}

// =============================================================================
// Conversions
// =============================================================================

#[rstest]
fn either_result_round_trip() {
    let ok: Result<i32, String> = Ok(1);
    let either: Either<String, i32> = ok.clone().into();
    assert_eq!(either, Either::Right(1));
    let back: Result<i32, String> = either.into();
    assert_eq!(back, ok);
}

#[rstest]
fn either_to_validated() {
    let value: Either<&str, i32> = Either::Left("invalid");
    assert_eq!(value.to_validated(), Validated::Invalid("invalid"));
}

#[rstest]
#[should_panic(expected = "unwrap_right")]
fn either_unwrap_right_on_left_panics() {
    let value: Either<&str, i32> = Either::Left("no");
    let _ = value.unwrap_right();
}
