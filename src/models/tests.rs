#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

// ── Record ────────────────────────────────────────────────────

fn make_record(amount: Decimal) -> Record {
    Record {
        id: None,
        owner: 42,
        amount,
        friend: "Bob".into(),
        desc: String::new(),
        created_at: "2024-01-15T10:30:00+00:00".into(),
    }
}

#[test]
fn test_record_new_defaults() {
    let record = Record::new(7, "Sam".into(), dec!(20), String::new());
    assert!(record.id.is_none());
    assert_eq!(record.owner, 7);
    assert_eq!(record.friend, "Sam");
    assert_eq!(record.amount, dec!(20));
    assert!(record.desc.is_empty());
    assert!(!record.created_at.is_empty());
}

#[test]
fn test_created_date() {
    assert_eq!(make_record(dec!(1)).created_date(), "2024-01-15");
}

#[test]
fn test_created_date_short_timestamp() {
    let mut record = make_record(dec!(1));
    record.created_at = "2024".into();
    assert_eq!(record.created_date(), "2024");
}

#[test]
fn test_total_mixed_signs() {
    let records = vec![
        make_record(dec!(15)),
        make_record(dec!(-4.50)),
        make_record(dec!(0.25)),
    ];
    assert_eq!(Record::total(&records), Some(dec!(10.75)));
}

#[test]
fn test_total_empty() {
    assert_eq!(Record::total(&[]), Some(Decimal::ZERO));
}

#[test]
fn test_total_overflow_is_none() {
    let records = vec![make_record(Decimal::MAX), make_record(Decimal::MAX)];
    assert_eq!(Record::total(&records), None);
}

// ── Preference ────────────────────────────────────────────────

#[test]
fn test_preference_new() {
    let pref = Preference::new(42, "Alice".into());
    assert_eq!(pref.owner, 42);
    assert_eq!(pref.default_friend, "Alice");
}
