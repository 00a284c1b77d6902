//! # Transform Pipeline Steps
//!
//! A scan carries an ordered list of stateless per-document steps. Each step
//! consumes one document and emits zero or more; only [`Transform::ConcatMap`]
//! changes cardinality beyond keep-or-drop. Steps are applied to the entire
//! working list before the next step runs, because a concat-map can grow the
//! list mid-pipeline.
//!
//! Every step kind is matched exhaustively here; adding a variant forces the
//! compiler to surface every site that must handle it.

use eyre::{bail, Result};
use serde_json::Value;

use crate::document::expr::{eval, Mapping, Scope, Term};
use crate::document::Document;
use crate::types::{KeyRange, StoreKey};

/// One stateless per-document pipeline step.
#[derive(Clone, Debug)]
pub enum Transform {
    /// Keep the document iff the predicate evaluates to `true`.
    Filter { predicate: Mapping },
    /// Replace the document with the mapping's output.
    Map { mapping: Mapping },
    /// Replace the document with every element of the sequence the mapping
    /// produces.
    ConcatMap { mapping: Mapping },
    /// Keep the document iff the named attribute falls inside the bounds.
    /// Bounds are evaluated per document; they are typically constant, and
    /// the re-evaluation is accepted inefficiency. A document lacking the
    /// attribute is dropped. Attribute and bound values are compared through
    /// their key representation, so a value whose canonical serialization
    /// exceeds the key length bound fails the scan.
    Range {
        attribute: String,
        lower: Option<Term>,
        upper: Option<Term>,
    },
}

/// Applies one step to one document, appending survivors to `out`.
pub fn apply_transform(
    step: &Transform,
    scope: &mut Scope,
    doc: &Document,
    out: &mut Vec<Document>,
) -> Result<()> {
    match step {
        Transform::Filter { predicate } => {
            if predicate.apply(scope, doc)?.is_true() {
                out.push(doc.clone());
            }
        }
        Transform::Map { mapping } => {
            out.push(mapping.apply(scope, doc)?);
        }
        Transform::ConcatMap { mapping } => {
            let seq = mapping.apply(scope, doc)?;
            match seq.value() {
                Value::Array(items) => {
                    for item in items {
                        out.push(Document::new(item.clone()));
                    }
                }
                other => bail!("concat-map mapping produced {other}, expected a sequence"),
            }
        }
        Transform::Range {
            attribute,
            lower,
            upper,
        } => {
            let lower = bound_key(lower.as_ref(), scope)?;
            let upper = bound_key(upper.as_ref(), scope)?;
            let range = KeyRange::closed(lower, upper);
            let Some(value) = doc.attr(attribute) else {
                return Ok(());
            };
            let key = StoreKey::new(value.to_string())?;
            if range.contains_key(&key) {
                out.push(doc.clone());
            }
        }
    }
    Ok(())
}

/// Evaluates an optional bound expression to its key representation (the
/// value's canonical serialization).
fn bound_key(bound: Option<&Term>, scope: &Scope) -> Result<Option<StoreKey>> {
    match bound {
        None => Ok(None),
        Some(term) => {
            let value = eval(term, scope)?;
            Ok(Some(StoreKey::new(value.print())?))
        }
    }
}
