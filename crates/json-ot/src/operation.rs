//! Operation model.
//!
//! An [`Operation`] is an immutable description of one mutation to one
//! addressable value of a document. It is discriminated first by the value
//! type it targets ([`OpKind`]) and then by the kind of mutation (the
//! per-type enums [`StringOp`], [`ArrayOp`], [`ObjectOp`], [`NumberOp`],
//! [`BooleanOp`], [`NullOp`]).
//!
//! Operations are never mutated. Transformation and composition always build
//! new values; a cancelled operation is kept as a *no-op* so that it still
//! occupies its version slot.
//!
//! # Index units
//! String indices and lengths count Unicode scalar values (`char`s), not
//! bytes.

use std::fmt;

use json_ot_pointer::{format_json_pointer, parse_json_pointer, Path};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OtError;

// ── Identifiers ───────────────────────────────────────────────────────────

/// Identifier of a replica (one client session).
///
/// Replica ids are totally ordered by lexicographic comparison. That order
/// is the tie-break for last-writer-wins conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicaId(String);

impl ReplicaId {
    pub fn new(id: impl Into<String>) -> Self {
        ReplicaId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReplicaId {
    fn from(id: &str) -> Self {
        ReplicaId(id.to_string())
    }
}

impl From<String> for ReplicaId {
    fn from(id: String) -> Self {
        ReplicaId(id)
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one local submission: the issuing replica plus a local
/// sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpId {
    pub replica: ReplicaId,
    pub seq: u64,
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.replica, self.seq)
    }
}

// ── Value types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Array,
    Object,
    Number,
    Boolean,
    Null,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
            Value::Number(_) => ValueType::Number,
            Value::Bool(_) => ValueType::Boolean,
            Value::Null => ValueType::Null,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Null => "null",
        }
    }
}

// ── Per-type kinds ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum StringOp {
    Insert { index: usize, text: String },
    /// Removes `text`, which must be present at `index`.
    Remove { index: usize, text: String },
}

impl StringOp {
    pub fn insert(index: usize, text: impl Into<String>) -> Self {
        StringOp::Insert { index, text: text.into() }
    }

    pub fn remove(index: usize, text: impl Into<String>) -> Self {
        StringOp::Remove { index, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayOp {
    Insert { index: usize, value: Value },
    Remove { index: usize },
    Set { index: usize, value: Value },
    /// Moves the element at `from` so that it ends up at `to`. `to` indexes
    /// the array after the element has been taken out.
    Move { from: usize, to: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectOp {
    SetProperty { key: String, value: Value },
    RemoveProperty { key: String },
}

impl ObjectOp {
    pub fn key(&self) -> &str {
        match self {
            ObjectOp::SetProperty { key, .. } | ObjectOp::RemoveProperty { key } => key,
        }
    }
}

/// Number edits.
///
/// Increments are whole numbers and only apply to integer values, so
/// concurrent adds sum to the same result in any order. Sets take any
/// finite value.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberOp {
    Add { delta: i64 },
    Set { value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BooleanOp {
    Set { value: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NullOp {
    Set,
}

/// The closed set of mutations, grouped by the value type they target.
#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    String(StringOp),
    Array(ArrayOp),
    Object(ObjectOp),
    Number(NumberOp),
    Boolean(BooleanOp),
    Null(NullOp),
}

impl OpKind {
    pub fn value_type(&self) -> ValueType {
        match self {
            OpKind::String(_) => ValueType::String,
            OpKind::Array(_) => ValueType::Array,
            OpKind::Object(_) => ValueType::Object,
            OpKind::Number(_) => ValueType::Number,
            OpKind::Boolean(_) => ValueType::Boolean,
            OpKind::Null(_) => ValueType::Null,
        }
    }

    /// Short `type.kind` name, used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::String(StringOp::Insert { .. }) => "string.insert",
            OpKind::String(StringOp::Remove { .. }) => "string.remove",
            OpKind::Array(ArrayOp::Insert { .. }) => "array.insert",
            OpKind::Array(ArrayOp::Remove { .. }) => "array.remove",
            OpKind::Array(ArrayOp::Set { .. }) => "array.set",
            OpKind::Array(ArrayOp::Move { .. }) => "array.move",
            OpKind::Object(ObjectOp::SetProperty { .. }) => "object.set_property",
            OpKind::Object(ObjectOp::RemoveProperty { .. }) => "object.remove_property",
            OpKind::Number(NumberOp::Add { .. }) => "number.add",
            OpKind::Number(NumberOp::Set { .. }) => "number.set",
            OpKind::Boolean(BooleanOp::Set { .. }) => "boolean.set",
            OpKind::Null(NullOp::Set) => "null.set",
        }
    }
}

impl From<StringOp> for OpKind {
    fn from(op: StringOp) -> Self {
        OpKind::String(op)
    }
}

impl From<ArrayOp> for OpKind {
    fn from(op: ArrayOp) -> Self {
        OpKind::Array(op)
    }
}

impl From<ObjectOp> for OpKind {
    fn from(op: ObjectOp) -> Self {
        OpKind::Object(op)
    }
}

impl From<NumberOp> for OpKind {
    fn from(op: NumberOp) -> Self {
        OpKind::Number(op)
    }
}

impl From<BooleanOp> for OpKind {
    fn from(op: BooleanOp) -> Self {
        OpKind::Boolean(op)
    }
}

impl From<NullOp> for OpKind {
    fn from(op: NullOp) -> Self {
        OpKind::Null(op)
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// One mutation of the value at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    path: Path,
    origin: Option<ReplicaId>,
    no_op: bool,
    kind: OpKind,
}

impl Operation {
    pub fn new(path: Path, kind: impl Into<OpKind>) -> Self {
        Self {
            path,
            origin: None,
            no_op: false,
            kind: kind.into(),
        }
    }

    /// Build an operation addressed by a JSON Pointer such as `/items/0/title`.
    ///
    /// ```
    /// use json_ot::{Operation, StringOp};
    /// use json_ot_pointer::PathStep;
    ///
    /// let op = Operation::at_pointer("/items/0/title", StringOp::insert(0, "A")).unwrap();
    /// assert_eq!(op.path()[1], PathStep::Index(0));
    /// assert!(Operation::at_pointer("items", StringOp::insert(0, "A")).is_err());
    /// ```
    pub fn at_pointer(pointer: &str, kind: impl Into<OpKind>) -> Result<Self, OtError> {
        Ok(Self::new(parse_json_pointer(pointer)?, kind))
    }

    /// Returns the same operation attributed to `origin`.
    pub fn with_origin(self, origin: impl Into<ReplicaId>) -> Self {
        Self {
            origin: Some(origin.into()),
            ..self
        }
    }

    /// Returns the same operation with its effect cancelled.
    pub fn into_noop(self) -> Self {
        Self { no_op: true, ..self }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> Option<&ReplicaId> {
        self.origin.as_ref()
    }

    pub fn is_noop(&self) -> bool {
        self.no_op
    }

    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }

    pub(crate) fn with_kind(&self, kind: impl Into<OpKind>) -> Self {
        Self {
            path: self.path.clone(),
            origin: self.origin.clone(),
            no_op: self.no_op,
            kind: kind.into(),
        }
    }

    pub(crate) fn with_path(&self, path: Path) -> Self {
        Self {
            path,
            origin: self.origin.clone(),
            no_op: self.no_op,
            kind: self.kind.clone(),
        }
    }

    pub(crate) fn to_noop(&self) -> Self {
        self.clone().into_noop()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at \"{}\"", self.kind.name(), format_json_pointer(&self.path))?;
        if self.no_op {
            f.write_str(" (no-op)")?;
        }
        Ok(())
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// Operations that together occupy one version slot.
///
/// A patch usually holds a single operation. Transformation can split an
/// operation in two (a string removal with a concurrent insertion landing
/// inside it); both halves stay in the same patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    ops: Vec<Operation>,
}

impl Patch {
    pub fn new(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Operation> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True when applying the patch changes nothing.
    pub fn is_noop(&self) -> bool {
        self.ops.iter().all(Operation::is_noop)
    }
}

impl From<Operation> for Patch {
    fn from(op: Operation) -> Self {
        Patch { ops: vec![op] }
    }
}

impl From<Vec<Operation>> for Patch {
    fn from(ops: Vec<Operation>) -> Self {
        Patch { ops }
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
