//! Array insert/remove/set/move transforms.

use serde_json::Value;

use super::position::after_move;
use super::{last_writer_wins, server_wins, transform_seq, unchanged, Transformed};
use crate::error::OtError;
use crate::operation::{ArrayOp, OpKind, Operation};

pub(super) fn transform(
    server: &Operation,
    s: &ArrayOp,
    client: &Operation,
    c: &ArrayOp,
) -> Result<Transformed, OtError> {
    use ArrayOp::*;
    let out = match (s, c) {
        // Moves that touch the same element.
        (Move { from: sf, to: st }, Move { from: cf, to: ct }) if sf == cf => {
            if server_wins(server, client) {
                let again = server.with_kind(Move { from: *ct, to: *st });
                (vec![again], vec![client.to_noop()])
            } else {
                let again = client.with_kind(Move { from: *st, to: *ct });
                (vec![server.to_noop()], vec![again])
            }
        }
        (Move { from, to }, Remove { index }) if from == index => (
            vec![server.to_noop()],
            vec![client.with_kind(Remove { index: *to })],
        ),
        (Remove { index }, Move { from, to }) if from == index => (
            vec![server.with_kind(Remove { index: *to })],
            vec![client.to_noop()],
        ),
        (Move { from, to }, Set { index, value }) => (
            vec![server.clone()],
            vec![client.with_kind(Set {
                index: after_move(*index, *from, *to),
                value: value.clone(),
            })],
        ),
        (Set { index, value }, Move { from, to }) => (
            vec![server.with_kind(Set {
                index: after_move(*index, *from, *to),
                value: value.clone(),
            })],
            vec![client.clone()],
        ),
        (Move { .. }, _) | (_, Move { .. }) => return through_lowering(server, client),

        (Insert { index: si, .. }, Insert { index: ci, .. }) => {
            // Equal indices: the server's element goes first.
            if si <= ci {
                (vec![server.clone()], vec![reindex(client, c, ci.saturating_add(1))])
            } else {
                (vec![reindex(server, s, si.saturating_add(1))], vec![client.clone()])
            }
        }
        (Insert { index: si, .. }, Remove { index: ci } | Set { index: ci, .. }) => {
            if si <= ci {
                (vec![server.clone()], vec![reindex(client, c, ci.saturating_add(1))])
            } else if matches!(c, Remove { .. }) {
                (vec![reindex(server, s, si - 1)], vec![client.clone()])
            } else {
                unchanged(server, client)
            }
        }
        (Remove { index: si } | Set { index: si, .. }, Insert { index: ci, .. }) => {
            if ci <= si {
                (vec![reindex(server, s, si.saturating_add(1))], vec![client.clone()])
            } else if matches!(s, Remove { .. }) {
                (vec![server.clone()], vec![reindex(client, c, ci - 1)])
            } else {
                unchanged(server, client)
            }
        }
        (Remove { index: si }, Remove { index: ci }) => {
            if si == ci {
                (vec![server.to_noop()], vec![client.to_noop()])
            } else if si < ci {
                (vec![server.clone()], vec![reindex(client, c, ci - 1)])
            } else {
                (vec![reindex(server, s, si - 1)], vec![client.clone()])
            }
        }
        // A removal beats a concurrent overwrite of the same slot.
        (Remove { index: si }, Set { index: ci, .. }) => {
            if si == ci {
                (vec![server.clone()], vec![client.to_noop()])
            } else if si < ci {
                (vec![server.clone()], vec![reindex(client, c, ci - 1)])
            } else {
                unchanged(server, client)
            }
        }
        (Set { index: si, .. }, Remove { index: ci }) => {
            if si == ci {
                (vec![server.to_noop()], vec![client.clone()])
            } else if ci < si {
                (vec![reindex(server, s, si - 1)], vec![client.clone()])
            } else {
                unchanged(server, client)
            }
        }
        (Set { index: si, .. }, Set { index: ci, .. }) => {
            if si == ci {
                last_writer_wins(server, client)
            } else {
                unchanged(server, client)
            }
        }
    };
    Ok(out)
}

fn reindex(op: &Operation, kind: &ArrayOp, index: usize) -> Operation {
    let next = match kind {
        ArrayOp::Insert { value, .. } => ArrayOp::Insert { index, value: value.clone() },
        ArrayOp::Remove { .. } => ArrayOp::Remove { index },
        ArrayOp::Set { value, .. } => ArrayOp::Set { index, value: value.clone() },
        ArrayOp::Move { to, .. } => ArrayOp::Move { from: index, to: *to },
    };
    op.with_kind(next)
}

/// A move of one element against edits of other elements behaves exactly
/// like taking the element out and putting it back, so transform it as that
/// pair and put the move back together afterwards.
fn through_lowering(server: &Operation, client: &Operation) -> Result<Transformed, OtError> {
    let (s2, c2) = transform_seq(&lower(server), &lower(client))?;
    Ok((lift(server, s2, client)?, lift(client, c2, server)?))
}

fn lower(op: &Operation) -> Vec<Operation> {
    match op.kind() {
        OpKind::Array(ArrayOp::Move { from, to }) => vec![
            op.with_kind(ArrayOp::Remove { index: *from }),
            op.with_kind(ArrayOp::Insert { index: *to, value: Value::Null }),
        ],
        _ => vec![op.clone()],
    }
}

fn lift(original: &Operation, ops: Vec<Operation>, other: &Operation) -> Result<Vec<Operation>, OtError> {
    if !matches!(original.kind(), OpKind::Array(ArrayOp::Move { .. })) {
        return Ok(ops);
    }
    match ops.as_slice() {
        [take, put] if !take.is_noop() && !put.is_noop() => match (take.kind(), put.kind()) {
            (
                OpKind::Array(ArrayOp::Remove { index: from }),
                OpKind::Array(ArrayOp::Insert { index: to, .. }),
            ) => Ok(vec![original.with_kind(ArrayOp::Move { from: *from, to: *to })]),
            _ => Err(unsupported(original, other)),
        },
        _ => Err(unsupported(original, other)),
    }
}

fn unsupported(op: &Operation, other: &Operation) -> OtError {
    OtError::UnsupportedTransformPair {
        server: op.kind().name(),
        client: other.kind().name(),
    }
}
