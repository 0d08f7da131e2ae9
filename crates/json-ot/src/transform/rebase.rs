//! Path rebasing for operations nested below a structural edit.
//!
//! When one operation edits a container and the other edits something inside
//! it, only the step of the deeper path that names the container's child can
//! change: an index shifts, or the child is gone.

use json_ot_pointer::PathStep;
use tracing::trace;

use super::position::{after_insert, after_move};
use crate::operation::{ArrayOp, ObjectOp, OpKind, Operation};

/// What an edit of a container does to one of its child steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StepFate {
    Kept,
    Shifted(usize),
    /// The child was removed or replaced as a whole.
    Gone,
}

pub(crate) fn step_fate(container_op: &OpKind, step: &PathStep) -> StepFate {
    match (container_op, step) {
        (OpKind::Array(op), PathStep::Index(i)) => {
            let i = *i;
            let next = match op {
                ArrayOp::Insert { index, .. } => after_insert(i, *index, 1, true),
                ArrayOp::Remove { index } if *index == i => return StepFate::Gone,
                ArrayOp::Remove { index } if *index < i => i - 1,
                ArrayOp::Remove { .. } => i,
                ArrayOp::Set { index, .. } if *index == i => return StepFate::Gone,
                ArrayOp::Set { .. } => i,
                ArrayOp::Move { from, to } => after_move(i, *from, *to),
            };
            if next == i {
                StepFate::Kept
            } else {
                StepFate::Shifted(next)
            }
        }
        (OpKind::Object(op), PathStep::Key(key)) => match op {
            ObjectOp::SetProperty { key: k, .. } | ObjectOp::RemoveProperty { key: k }
                if k == key =>
            {
                StepFate::Gone
            }
            _ => StepFate::Kept,
        },
        _ => StepFate::Kept,
    }
}

/// Rebase `op`, whose path lies strictly below `ancestor`'s, over `ancestor`.
pub(crate) fn rebase_descendant(ancestor: &Operation, op: &Operation) -> Operation {
    let depth = ancestor.path().len();
    let Some(step) = op.path().get(depth) else {
        return op.clone();
    };
    match step_fate(ancestor.kind(), step) {
        StepFate::Kept => op.clone(),
        StepFate::Shifted(index) => {
            let mut path = op.path().clone();
            path[depth] = PathStep::Index(index);
            trace!(op = %op, index, "rebased nested path");
            op.with_path(path)
        }
        StepFate::Gone => {
            trace!(op = %op, by = %ancestor, "nested target gone");
            op.to_noop()
        }
    }
}
