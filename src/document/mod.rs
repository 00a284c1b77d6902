//! # Documents
//!
//! A [`Document`] is the unit of storage and query: an opaque,
//! self-describing structured value. Documents are immutable once produced
//! and shared by reference within one request, so the representation is a
//! cheaply clonable `Arc` over a JSON value.
//!
//! The canonical printed form ([`Document::print`]) is used wherever a
//! document must act as an ordered key: group-map keys and the key
//! representation the range-prune transform compares against.

pub mod expr;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// An immutable, self-describing structured value.
#[derive(Clone, PartialEq)]
pub struct Document(Arc<Value>);

impl Document {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// The null document. Used as the pre-seeded accumulator for scalar
    /// reductions.
    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Reads a named attribute off an object document. `None` when the
    /// document is not an object or lacks the attribute.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.0.as_object().and_then(|obj| obj.get(name))
    }

    /// Canonical compact serialization.
    pub fn print(&self) -> String {
        self.0.to_string()
    }

    /// Predicate truthiness: only the boolean `true` keeps a document.
    pub fn is_true(&self) -> bool {
        matches!(*self.0, Value::Bool(true))
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document({})", self.0)
    }
}
