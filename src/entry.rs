// src/entry.rs

use std::fmt;
use std::sync::Arc;

// --- Define Entry Trait ---
// Any value placed on a ring must expose a stable, unique identity key.
// The `Display` form is only used for diagnostics.
pub trait Entry: fmt::Display {
    /// The identity of this entry. Two entries with the same key are the same member.
    fn key(&self) -> &str;
}

impl Entry for str {
    fn key(&self) -> &str {
        self
    }
}

impl Entry for String {
    fn key(&self) -> &str {
        self.as_str()
    }
}

impl<T: Entry + ?Sized> Entry for &T {
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl<T: Entry + ?Sized> Entry for Arc<T> {
    fn key(&self) -> &str {
        (**self).key()
    }
}

// --- Item Struct ---
// A simple keyed value, handy as a ring member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    pub key: String,
    pub value: u64,
}

impl Item {
    pub fn new(key: impl Into<String>, value: u64) -> Self {
        Item {
            key: key.into(),
            value,
        }
    }
}

impl Entry for Item {
    fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}
