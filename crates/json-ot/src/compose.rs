//! Operation composer.
//!
//! `compose(prev, next)` merges two consecutive local operations into one
//! whose effect equals applying `prev` and then `next`. It returns `None`
//! when the pair has no single-operation form; the caller then queues them
//! separately.

use crate::apply::exact_sum;
use crate::operation::{ArrayOp, BooleanOp, NullOp, NumberOp, ObjectOp, OpKind, Operation, StringOp};

pub fn compose(prev: &Operation, next: &Operation) -> Option<Operation> {
    if prev.origin() != next.origin() {
        return None;
    }
    if next.is_noop() {
        return Some(prev.clone());
    }
    if prev.is_noop() {
        return Some(next.clone());
    }
    if prev.path() != next.path() {
        return None;
    }
    let kind: OpKind = match (prev.kind(), next.kind()) {
        (OpKind::String(a), OpKind::String(b)) => return compose_string(prev, a, b),
        (OpKind::Array(a), OpKind::Array(b)) => return compose_array(prev, a, b),
        (
            OpKind::Object(ObjectOp::SetProperty { key: k1, .. } | ObjectOp::RemoveProperty { key: k1 }),
            OpKind::Object(set @ ObjectOp::SetProperty { key: k2, .. }),
        ) if k1 == k2 => set.clone().into(),
        (OpKind::Number(NumberOp::Add { delta: a }), OpKind::Number(NumberOp::Add { delta: b })) => {
            NumberOp::Add { delta: a.checked_add(*b)? }.into()
        }
        (OpKind::Number(NumberOp::Set { value }), OpKind::Number(NumberOp::Add { delta })) => {
            NumberOp::Set { value: exact_sum(*value, *delta)? }.into()
        }
        (OpKind::Number(_), OpKind::Number(set @ NumberOp::Set { .. })) => set.clone().into(),
        (OpKind::Boolean(_), OpKind::Boolean(BooleanOp::Set { value })) => {
            BooleanOp::Set { value: *value }.into()
        }
        (OpKind::Null(_), OpKind::Null(_)) => NullOp::Set.into(),
        _ => return None,
    };
    Some(prev.with_kind(kind))
}

fn compose_string(prev: &Operation, a: &StringOp, b: &StringOp) -> Option<Operation> {
    match (a, b) {
        // Typing: the second insertion lands inside or right after the first.
        (StringOp::Insert { index: i, text: t1 }, StringOp::Insert { index: j, text: t2 }) => {
            let offset = j.checked_sub(*i)?;
            if offset > t1.chars().count() {
                return None;
            }
            let mut merged: String = t1.chars().take(offset).collect();
            merged.push_str(t2);
            merged.extend(t1.chars().skip(offset));
            Some(prev.with_kind(StringOp::insert(*i, merged)))
        }
        // Deleting text that was just typed.
        (StringOp::Insert { index: i, text: t1 }, StringOp::Remove { index: j, text: t2 }) => {
            let offset = j.checked_sub(*i)?;
            let inserted: Vec<char> = t1.chars().collect();
            let removed: Vec<char> = t2.chars().collect();
            let end = offset.checked_add(removed.len())?;
            if end > inserted.len() || inserted[offset..end] != removed[..] {
                return None;
            }
            let rest: String = inserted[..offset].iter().chain(&inserted[end..]).collect();
            let op = prev.with_kind(StringOp::insert(*i, rest.as_str()));
            Some(if rest.is_empty() { op.into_noop() } else { op })
        }
        (StringOp::Remove { index: i, text: t1 }, StringOp::Remove { index: j, text: t2 }) => {
            if j == i {
                // Forward delete.
                Some(prev.with_kind(StringOp::remove(*i, format!("{t1}{t2}"))))
            } else if j.checked_add(t2.chars().count()) == Some(*i) {
                // Backspace.
                Some(prev.with_kind(StringOp::remove(*j, format!("{t2}{t1}"))))
            } else {
                None
            }
        }
        (StringOp::Remove { .. }, StringOp::Insert { .. }) => None,
    }
}

fn compose_array(prev: &Operation, a: &ArrayOp, b: &ArrayOp) -> Option<Operation> {
    let kind = match (a, b) {
        (ArrayOp::Insert { index: i, .. }, ArrayOp::Remove { index: j }) if i == j => {
            return Some(prev.to_noop());
        }
        (ArrayOp::Insert { index: i, .. }, ArrayOp::Set { index: j, value }) if i == j => {
            ArrayOp::Insert { index: *i, value: value.clone() }
        }
        (ArrayOp::Set { index: i, .. }, ArrayOp::Set { index: j, value }) if i == j => {
            ArrayOp::Set { index: *i, value: value.clone() }
        }
        (ArrayOp::Move { from, to: t1 }, ArrayOp::Move { from: f2, to }) if t1 == f2 => {
            ArrayOp::Move { from: *from, to: *to }
        }
        _ => return None,
    };
    Some(prev.with_kind(kind))
}
