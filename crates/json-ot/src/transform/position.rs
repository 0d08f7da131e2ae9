//! Index arithmetic shared by transforms and references.
//!
//! Positions count units of the sequence (chars of a string, elements of an
//! array). A *gap* position `p` sits before unit `p`; an *element* index
//! names a unit.
//!
//! Shifts saturate, so out-of-range input stays out of range and is
//! rejected when applied.

/// Gap position after `len` units are inserted at `at`. A position equal to
/// `at` moves right only when `shift_on_tie` is set.
pub(crate) fn after_insert(pos: usize, at: usize, len: usize, shift_on_tie: bool) -> usize {
    if at < pos || (at == pos && shift_on_tie) {
        pos.saturating_add(len)
    } else {
        pos
    }
}

/// Gap position after units `at..at + len` are removed. Positions inside the
/// removed span collapse onto `at`.
pub(crate) fn after_remove(pos: usize, at: usize, len: usize) -> usize {
    if pos <= at {
        pos
    } else if pos - at >= len {
        pos - len
    } else {
        at
    }
}

/// Index of element `index` after the element at `from` moves to `to`.
pub(crate) fn after_move(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        return to;
    }
    let lowered = if index > from { index - 1 } else { index };
    if lowered >= to {
        lowered.saturating_add(1)
    } else {
        lowered
    }
}
