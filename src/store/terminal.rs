//! # Terminal Reducers
//!
//! An optional stateful aggregation closing a range scan. The terminal fixes
//! the scan's result shape before any document is processed
//! ([`initial_output`]) and then folds every surviving document into that
//! shape ([`apply_terminal`]). A result variant that does not match the
//! terminal is a broken invariant elsewhere in the engine and fails fatally.

use eyre::{bail, ensure, Result};

use super::env::{ScanEnv, WriteOp};
use super::response::{Groups, ScanOutput};
use crate::document::expr::{eval, Mapping, Reduction};
use crate::document::Document;

/// The aggregation attached to a scan. At most one per scan.
#[derive(Clone, Debug)]
pub enum Terminal {
    /// Accumulate per grouping key: map each document to a value, fold it
    /// into the group's accumulator (seeded from the reduction's base).
    GroupedReduce {
        group: Mapping,
        value: Mapping,
        reduction: Reduction,
    },
    /// Fold every document into a single atom. The atom's initial value is a
    /// contract with the surrounding query layer; it starts as the null
    /// document here.
    Reduce(Reduction),
    /// Count surviving documents.
    Count,
    /// Execute a list of write operations per document, with the document
    /// bound to `var`. Sub-write results are not folded into the scan's
    /// response.
    ForEach { var: String, ops: Vec<WriteOp> },
}

/// The result shape a terminal (or its absence) implies. Runs once, before
/// any document is processed.
pub fn initial_output(terminal: Option<&Terminal>) -> ScanOutput {
    match terminal {
        None => ScanOutput::Stream(Vec::new()),
        Some(Terminal::GroupedReduce { .. }) => ScanOutput::Groups(Groups::new()),
        Some(Terminal::Reduce(_)) => ScanOutput::Atom(Document::null()),
        Some(Terminal::Count) => ScanOutput::Length(0),
        Some(Terminal::ForEach { .. }) => ScanOutput::Inserted,
    }
}

/// Folds one document into the scan result, mutating it in place.
pub fn apply_terminal(
    terminal: &Terminal,
    env: &mut ScanEnv<'_>,
    doc: &Document,
    out: &mut ScanOutput,
) -> Result<()> {
    match terminal {
        Terminal::GroupedReduce {
            group,
            value,
            reduction,
        } => {
            let ScanOutput::Groups(groups) = out else {
                bail!("scan accumulator does not match grouped-reduce terminal");
            };
            let grouping = group.apply(&mut env.scope, doc)?;
            let mapped = value.apply(&mut env.scope, doc)?;
            let group_key = grouping.print();
            let acc = match groups.get(&group_key) {
                Some(acc) => acc.clone(),
                None => eval(&reduction.base, &env.scope)?,
            };
            let folded = reduction.apply(&mut env.scope, acc, mapped)?;
            groups.insert(group_key, folded);
        }
        Terminal::Reduce(reduction) => {
            let ScanOutput::Atom(atom) = out else {
                bail!("scan accumulator does not match reduce terminal");
            };
            *atom = reduction.apply(&mut env.scope, atom.clone(), doc.clone())?;
        }
        Terminal::Count => {
            let ScanOutput::Length(count) = out else {
                bail!("scan accumulator does not match count terminal");
            };
            *count += 1;
        }
        Terminal::ForEach { var, ops } => {
            ensure!(
                matches!(out, ScanOutput::Inserted),
                "scan accumulator does not match for-each terminal"
            );
            env.scope.push();
            env.scope.put(var, doc.clone());
            let mut result = Ok(());
            for op in ops {
                result = env.execute_write(op);
                if result.is_err() {
                    break;
                }
            }
            env.scope.pop();
            result?;
        }
    }
    Ok(())
}
