//! Reference transformer.
//!
//! A [`Reference`] points into the document: a caret or selection inside a
//! string or array, one array element, or one object property. Running it
//! through every applied operation keeps it pointing at the same logical
//! place. When that place is removed the reference becomes
//! [`RefState::Detached`], and it never comes back.

use json_ot_pointer::{is_child, Path, PathStep};

use crate::error::OtError;
use crate::operation::{ArrayOp, ObjectOp, OpKind, Operation, StringOp};
use crate::transform::position::{after_insert, after_move, after_remove};
use crate::transform::rebase::{step_fate, StepFate};

/// Where inside the container at [`Reference::path`] the reference sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Caret at a gap of a string or array.
    Cursor { offset: usize },
    /// Selection `start..end` of a string or array.
    Range { start: usize, end: usize },
    /// One element of an array.
    Element { index: usize },
    /// One property of an object.
    Property { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub path: Path,
    pub anchor: Anchor,
}

impl Reference {
    pub fn new(path: Path, anchor: Anchor) -> Self {
        Self { path, anchor }
    }

    pub fn cursor(path: Path, offset: usize) -> Self {
        Self::new(path, Anchor::Cursor { offset })
    }

    pub fn range(path: Path, start: usize, end: usize) -> Self {
        Self::new(path, Anchor::Range { start, end })
    }

    pub fn element(path: Path, index: usize) -> Self {
        Self::new(path, Anchor::Element { index })
    }

    pub fn property(path: Path, key: impl Into<String>) -> Self {
        Self::new(path, Anchor::Property { key: key.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefState {
    Attached(Reference),
    Detached,
}

impl RefState {
    pub fn is_detached(&self) -> bool {
        matches!(self, RefState::Detached)
    }

    /// The live reference, or `DetachedReferenceAccess`.
    pub fn attached(&self) -> Result<&Reference, OtError> {
        match self {
            RefState::Attached(r) => Ok(r),
            RefState::Detached => Err(OtError::DetachedReferenceAccess),
        }
    }
}

impl From<Reference> for RefState {
    fn from(r: Reference) -> Self {
        RefState::Attached(r)
    }
}

/// Map `state` through one applied operation.
pub fn transform_reference(state: &RefState, op: &Operation) -> RefState {
    let RefState::Attached(reference) = state else {
        return RefState::Detached;
    };
    if op.is_noop() {
        return state.clone();
    }
    if op.path() == &reference.path {
        return match adjust_anchor(&reference.anchor, op.kind()) {
            Some(anchor) => RefState::Attached(Reference::new(reference.path.clone(), anchor)),
            None => RefState::Detached,
        };
    }
    if is_child(op.path(), &reference.path) {
        let depth = op.path().len();
        return match step_fate(op.kind(), &reference.path[depth]) {
            StepFate::Kept => state.clone(),
            StepFate::Shifted(index) => {
                let mut path = reference.path.clone();
                path[depth] = PathStep::Index(index);
                RefState::Attached(Reference::new(path, reference.anchor.clone()))
            }
            StepFate::Gone => RefState::Detached,
        };
    }
    state.clone()
}

/// Map `state` through operations applied in order.
pub fn transform_reference_through<'a>(
    state: &RefState,
    ops: impl IntoIterator<Item = &'a Operation>,
) -> RefState {
    ops.into_iter()
        .fold(state.clone(), |state, op| transform_reference(&state, op))
}

/// `None` when the anchored element or property is gone.
fn adjust_anchor(anchor: &Anchor, kind: &OpKind) -> Option<Anchor> {
    let next = match (kind, anchor) {
        (OpKind::String(op), Anchor::Cursor { .. } | Anchor::Range { .. }) => match op {
            StringOp::Insert { index, text } => on_insert(anchor, *index, text.chars().count()),
            StringOp::Remove { index, text } => on_remove(anchor, *index, text.chars().count()),
        },
        (OpKind::Array(op), Anchor::Cursor { .. } | Anchor::Range { .. }) => match op {
            ArrayOp::Insert { index, .. } => on_insert(anchor, *index, 1),
            ArrayOp::Remove { index } => on_remove(anchor, *index, 1),
            ArrayOp::Set { .. } => anchor.clone(),
            ArrayOp::Move { from, to } => on_insert(&on_remove(anchor, *from, 1), *to, 1),
        },
        (OpKind::Array(op), Anchor::Element { index: i }) => {
            let i = *i;
            let index = match op {
                ArrayOp::Insert { index, .. } => after_insert(i, *index, 1, true),
                ArrayOp::Remove { index } if *index == i => return None,
                ArrayOp::Remove { index } if *index < i => i - 1,
                ArrayOp::Remove { .. } | ArrayOp::Set { .. } => i,
                ArrayOp::Move { from, to } => after_move(i, *from, *to),
            };
            Anchor::Element { index }
        }
        (OpKind::Object(ObjectOp::RemoveProperty { key }), Anchor::Property { key: k })
            if key == k =>
        {
            return None
        }
        _ => anchor.clone(),
    };
    Some(next)
}

fn on_insert(anchor: &Anchor, at: usize, len: usize) -> Anchor {
    match anchor {
        Anchor::Cursor { offset } => Anchor::Cursor {
            offset: after_insert(*offset, at, len, true),
        },
        Anchor::Range { start, end } => {
            let start = after_insert(*start, at, len, true);
            let end = after_insert(*end, at, len, false).max(start);
            Anchor::Range { start, end }
        }
        other => other.clone(),
    }
}

fn on_remove(anchor: &Anchor, at: usize, len: usize) -> Anchor {
    match anchor {
        Anchor::Cursor { offset } => Anchor::Cursor {
            offset: after_remove(*offset, at, len),
        },
        Anchor::Range { start, end } => Anchor::Range {
            start: after_remove(*start, at, len),
            end: after_remove(*end, at, len),
        },
        other => other.clone(),
    }
}
