//! Versioned document.

use serde_json::Value;

use crate::apply::apply_operation;
use crate::error::OtError;
use crate::operation::{Operation, Patch};

/// A JSON document plus the number of version slots applied to it.
///
/// The tree is a plain [`Value`]; a node's parent is the value at the parent
/// path, so there are no back-pointers to keep alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    doc: Value,
    version: u64,
}

impl Model {
    pub fn new(doc: Value, version: u64) -> Self {
        Self { doc, version }
    }

    pub fn view(&self) -> &Value {
        &self.doc
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn into_view(self) -> Value {
        self.doc
    }

    /// Apply every operation of `patch` and advance the version by one.
    ///
    /// All or nothing: when any operation fails the document and version are
    /// left as they were.
    pub fn apply_patch(&mut self, patch: &Patch) -> Result<u64, OtError> {
        match patch.ops() {
            [] => {}
            [op] => apply_operation(&mut self.doc, op)?,
            ops => {
                let mut next = self.doc.clone();
                for op in ops {
                    apply_operation(&mut next, op)?;
                }
                self.doc = next;
            }
        }
        self.version += 1;
        Ok(self.version)
    }

    /// Apply one operation without taking a new version slot. Used when a
    /// local edit is folded into an operation that already owns one.
    pub(crate) fn amend(&mut self, op: &Operation) -> Result<(), OtError> {
        apply_operation(&mut self.doc, op)
    }
}
