//! Serialization tests for the result algebra.
//!
//! Requires the `serde` feature.

#![cfg(feature = "serde")]

use lambars_io::control::Either;
use rstest::rstest;

// =============================================================================
// Either Integration Tests
// =============================================================================

#[rstest]
fn test_either_json_roundtrip() {
    let left: Either<String, i32> = Either::Left("error".to_string());
    let right: Either<String, i32> = Either::Right(42);

    let left_json = serde_json::to_string(&left).unwrap();
    let right_json = serde_json::to_string(&right).unwrap();

    let restored_left: Either<String, i32> = serde_json::from_str(&left_json).unwrap();
    let restored_right: Either<String, i32> = serde_json::from_str(&right_json).unwrap();

    assert_eq!(restored_left, left);
    assert_eq!(restored_right, right);
}

#[rstest]
fn test_either_uses_externally_tagged_layout() {
    let value: Either<String, Vec<u8>> = Either::Right(vec![1, 2]);
    assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"Right":[1,2]}"#);
}

#[rstest]
fn test_either_rejects_unknown_variant() {
    let restored: Result<Either<String, i32>, _> = serde_json::from_str(r#"{"Middle":1}"#);
    assert!(restored.is_err());
}
