#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_intern_and_lookup() {
    let mut interner = StringInterner::new();

    let hello = interner.try_intern("hello").unwrap();
    let world = interner.try_intern("world").unwrap();
    let hello2 = interner.try_intern("hello").unwrap();

    assert_eq!(hello, hello2);
    assert_ne!(hello, world);

    assert_eq!(interner.lookup(hello), "hello");
    assert_eq!(interner.lookup(world), "world");
}

#[test]
fn test_empty_string() {
    let mut interner = StringInterner::new();
    let empty = interner.try_intern("").unwrap();
    assert_eq!(empty, Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert!(interner.is_empty());
}

#[test]
fn test_get_does_not_intern() {
    let mut interner = StringInterner::new();
    assert_eq!(interner.get("x"), None);
    let x = interner.try_intern("x").unwrap();
    assert_eq!(interner.get("x"), Some(x));
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_lookup_out_of_range() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(42)), "");
}
