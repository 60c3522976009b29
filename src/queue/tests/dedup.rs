//! Dedup registry tests.

use crate::queue::dedup::DedupRegistry;

#[test]
fn test_reserve_then_duplicate() {
    let dedup = DedupRegistry::new();
    assert!(dedup.try_reserve("email", b"hello"));
    assert!(!dedup.try_reserve("email", b"hello"));
    assert_eq!(dedup.len(), 1);
}

#[test]
fn test_release_makes_payload_reservable_again() {
    let dedup = DedupRegistry::new();
    assert!(dedup.try_reserve("email", b"hello"));
    dedup.release("email", b"hello");
    assert!(dedup.try_reserve("email", b"hello"));
}

#[test]
fn test_release_is_idempotent() {
    let dedup = DedupRegistry::new();
    dedup.release("email", b"never-reserved");
    assert!(dedup.try_reserve("email", b"never-reserved"));
    dedup.release("email", b"never-reserved");
    dedup.release("email", b"never-reserved");
    assert_eq!(dedup.len(), 0);
}

#[test]
fn test_reservations_are_per_type_and_payload() {
    let dedup = DedupRegistry::new();
    assert!(dedup.try_reserve("email", b"hello"));
    assert!(dedup.try_reserve("email", b"world"));
    assert!(dedup.try_reserve("resize", b"hello"));
    assert_eq!(dedup.len(), 3);
}
