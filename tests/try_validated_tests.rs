//! Tests for Try, Validated and the Option extensions.
//!
//! These are the conversion targets of Either and the capture type of
//! panicking effects.

#![cfg(feature = "control")]

use lambars_io::control::{Either, OptionExt, Try, TryError, Validated};
use rstest::rstest;

#[derive(Debug, PartialEq)]
struct Overdrawn {
    balance: i64,
}

// =============================================================================
// Try
// =============================================================================

#[rstest]
fn try_of_captures_string_panics() {
    let outcome = Try::of(|| -> u8 { panic!("{} went wrong", "parsing") });
    assert!(outcome.is_failure());
    let error = outcome.into_result().unwrap_err();
    assert_eq!(error.message(), "parsing went wrong");
    assert_eq!(error.to_string(), "panicked: parsing went wrong");
}

#[rstest]
fn try_of_keeps_typed_payload() {
    let outcome = Try::of(|| -> u8 { std::panic::panic_any(Overdrawn { balance: -5 }) });
    let error = outcome.into_result().unwrap_err();
    assert!(error.is::<Overdrawn>());
    assert_eq!(error.downcast::<Overdrawn>().unwrap(), Overdrawn { balance: -5 });
}

#[rstest]
fn try_downcast_to_wrong_type_returns_error_back() {
    let error = Try::of(|| -> u8 { panic!("text") }).into_result().unwrap_err();
    let error = error.downcast::<Overdrawn>().unwrap_err();
    assert_eq!(error.message(), "text");
}

#[rstest]
fn try_map_and_recover() {
    let doubled = Try::of(|| 21).map(|x| x * 2);
    assert_eq!(doubled, Try::Success(42));

    let recovered = Try::of(|| -> i32 { panic!("nope") }).recover(|_| Try::Success(0));
    assert_eq!(recovered, Try::Success(0));
}

#[rstest]
fn try_converts_into_either() {
    let either: Either<TryError, i32> = Try::of(|| 1).into();
    assert_eq!(either, Either::Right(1));

    let failed = Try::of(|| -> i32 { panic!("lost") }).to_either(|error| error.message().len());
    assert_eq!(failed, Either::Left(4));
}

#[rstest]
fn try_to_validated_and_option() {
    assert_eq!(Try::of(|| 'a').to_option(), Some('a'));
    let invalid = Try::of(|| -> char { panic!("x") }).to_validated(|error| error.to_string());
    assert_eq!(invalid, Validated::Invalid("panicked: x".to_string()));
}

// =============================================================================
// Validated
// =============================================================================

#[rstest]
#[case(Validated::valid(3), "valid 3")]
#[case(Validated::invalid("short"), "invalid short")]
fn validated_fold(#[case] value: Validated<&str, i32>, #[case] expected: &str) {
    let rendered = value.fold(|e| format!("invalid {e}"), |v| format!("valid {v}"));
    assert_eq!(rendered, expected);
}

#[rstest]
fn validated_round_trips_through_either() {
    let value: Validated<&str, i32> = Validated::invalid("bad");
    let either = value.map_invalid(str::len).to_either();
    assert_eq!(either, Either::Left(3));
    assert_eq!(Validated::<&str, i32>::from(Either::Right(1)), Validated::Valid(1));
}

// =============================================================================
// OptionExt
// =============================================================================

#[rstest]
#[case(Some(2), Either::Right(2))]
#[case(None, Either::Left("absent"))]
fn option_to_either(#[case] value: Option<i32>, #[case] expected: Either<&str, i32>) {
    assert_eq!(value.to_either(|| "absent"), expected);
}

#[rstest]
fn option_fold_combine_filter_not() {
    assert_eq!(Some(3).fold(|| 0, |x| x + 1), 4);
    assert_eq!(None::<i32>.fold(|| 0, |x| x + 1), 0);
    assert_eq!(Some(2).combine(None::<i32>, |a, b| a + b), None);
    assert_eq!(Some(4).filter_not(|x| x % 2 == 0), None);
    assert_eq!(Some(5).filter_not(|x| x % 2 == 0), Some(5));
    assert_eq!(None::<u8>.to_validated(|| "gone"), Validated::Invalid("gone"));
}
