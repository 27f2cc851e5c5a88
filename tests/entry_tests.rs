// tests/entry_tests.rs

use rust_rings::entry::{Entry, Item};
use std::sync::Arc;

// Compiles only if T implements Entry.
fn _assert_entry_trait<T: Entry + ?Sized>() {}

#[test]
fn test_builtin_types_are_entries() {
    _assert_entry_trait::<str>();
    _assert_entry_trait::<&str>();
    _assert_entry_trait::<String>();
    _assert_entry_trait::<Arc<Item>>();
    _assert_entry_trait::<&Item>();
}

#[test]
fn test_item_key_and_display() {
    let item = Item::new("node-1", 42);
    assert_eq!(item.key(), "node-1");
    assert_eq!(item.to_string(), "node-1:42");
    assert_eq!(format!("{:?}", item), "Item { key: \"node-1\", value: 42 }");
}

#[test]
fn test_wrappers_forward_key() {
    let item = Arc::new(Item::new("shared", 7));
    assert_eq!(item.key(), "shared");
    assert_eq!(Entry::key(&&*item), "shared");
    assert_eq!("plain".key(), "plain");
    assert_eq!(String::from("owned").key(), "owned");
}
