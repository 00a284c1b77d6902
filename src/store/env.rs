//! # Scan Environment
//!
//! Expressions evaluate against a [`ScanEnv`]: the variable scope plus the
//! write sink a for-each terminal routes its sub-writes through. The sink is
//! supplied by the surrounding query layer, which knows where writes go; a
//! scan whose pipeline never writes needs none.

use eyre::{bail, Result};

use crate::document::expr::{eval, Scope, Term};
use crate::document::Document;
use crate::types::StoreKey;

/// One write request a for-each terminal executes per document: store the
/// evaluated document under the evaluated key.
#[derive(Clone, Debug)]
pub struct WriteOp {
    pub key: Term,
    pub document: Term,
}

/// Executes for-each sub-writes. Implementations decide the target (another
/// shard, another table) and its transaction.
pub trait WriteSink {
    fn write(&mut self, key: StoreKey, document: Document) -> Result<()>;
}

/// The evaluation environment for one scan.
pub struct ScanEnv<'e> {
    pub scope: Scope,
    sink: Option<&'e mut dyn WriteSink>,
}

impl ScanEnv<'static> {
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            sink: None,
        }
    }
}

impl Default for ScanEnv<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'e> ScanEnv<'e> {
    pub fn with_sink(sink: &'e mut dyn WriteSink) -> Self {
        Self {
            scope: Scope::new(),
            sink: Some(sink),
        }
    }

    /// Evaluates and executes one sub-write in the current scope. Sub-write
    /// results are not aggregated into the scan's own response; a failure
    /// fails the whole scan.
    pub fn execute_write(&mut self, op: &WriteOp) -> Result<()> {
        let key_doc = eval(&op.key, &self.scope)?;
        let document = eval(&op.document, &self.scope)?;
        let key = StoreKey::new(key_doc.print())?;
        match self.sink.as_mut() {
            Some(sink) => sink.write(key, document),
            None => bail!("for-each terminal requires a write sink"),
        }
    }
}
