//! Transformation function registry.
//!
//! `transform(server, client)` takes two operations issued against the same
//! document state and returns `(server', client')` such that
//!
//! ```text
//! apply(apply(doc, client), server') == apply(apply(doc, server), client')
//! ```
//!
//! Either side may come back as more than one operation (a string removal
//! split by an insertion landing inside it) or as a no-op.
//!
//! Dispatch runs in a fixed order:
//!
//! 1. a no-op on either side passes both through unchanged,
//! 2. the same path goes to the rule for the pair of kinds,
//! 3. nested paths rebase the deeper operation over the outer one,
//! 4. anything else is independent and passes through.

mod array;
mod object;
pub(crate) mod position;
pub(crate) mod rebase;
mod scalar;
mod string;

use json_ot_pointer::is_child;
use tracing::trace;

use crate::error::OtError;
use crate::operation::{OpKind, Operation, Patch};

/// Server-side and client-side results of one transform.
pub type Transformed = (Vec<Operation>, Vec<Operation>);

/// Transform one concurrent pair. `server` is the operation already applied
/// by the authority, `client` the local one being rebased over it.
pub fn transform(server: &Operation, client: &Operation) -> Result<Transformed, OtError> {
    if server.is_noop() || client.is_noop() {
        return Ok(unchanged(server, client));
    }

    let (sp, cp) = (server.path(), client.path());
    let result = if sp == cp {
        transform_same_target(server, client)?
    } else if is_child(sp, cp) {
        (vec![server.clone()], vec![rebase::rebase_descendant(server, client)])
    } else if is_child(cp, sp) {
        (vec![rebase::rebase_descendant(client, server)], vec![client.clone()])
    } else {
        unchanged(server, client)
    };

    trace!(
        server = %server,
        client = %client,
        server_out = result.0.len(),
        client_out = result.1.len(),
        "transformed pair"
    );
    Ok(result)
}

/// Transform two patches issued against the same state.
///
/// Every operation of `server` is transformed against every operation of
/// `client`; parts produced by a split are carried through the rest of the
/// other side.
pub fn transform_patch(server: &Patch, client: &Patch) -> Result<(Patch, Patch), OtError> {
    let (s, c) = transform_seq(server.ops(), client.ops())?;
    Ok((Patch::new(compact(s)), Patch::new(compact(c))))
}

/// Sequence-against-sequence transform. Both slices start from the same
/// state; the results are applicable after the other side.
pub(crate) fn transform_seq(
    server: &[Operation],
    client: &[Operation],
) -> Result<Transformed, OtError> {
    match (server, client) {
        ([], _) | (_, []) => Ok((server.to_vec(), client.to_vec())),
        ([s], [c]) => transform(s, c),
        ([s], [c, rest @ ..]) => {
            let (s1, mut c1) = transform(s, c)?;
            let (s2, rest2) = transform_seq(&s1, rest)?;
            c1.extend(rest2);
            Ok((s2, c1))
        }
        ([s, rest @ ..], _) => {
            let (mut s1, c1) = transform_seq(std::slice::from_ref(s), client)?;
            let (rest1, c2) = transform_seq(rest, &c1)?;
            s1.extend(rest1);
            Ok((s1, c2))
        }
    }
}

fn transform_same_target(server: &Operation, client: &Operation) -> Result<Transformed, OtError> {
    match (server.kind(), client.kind()) {
        (OpKind::String(s), OpKind::String(c)) => Ok(string::transform(server, s, client, c)),
        (OpKind::Array(s), OpKind::Array(c)) => array::transform(server, s, client, c),
        (OpKind::Object(s), OpKind::Object(c)) => Ok(object::transform(server, s, client, c)),
        (OpKind::Number(s), OpKind::Number(c)) => Ok(scalar::transform_number(server, s, client, c)),
        (OpKind::Boolean(_), OpKind::Boolean(_)) | (OpKind::Null(_), OpKind::Null(_)) => {
            Ok(last_writer_wins(server, client))
        }
        (s, c) => Err(OtError::UnsupportedTransformPair {
            server: s.name(),
            client: c.name(),
        }),
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────

fn unchanged(server: &Operation, client: &Operation) -> Transformed {
    (vec![server.clone()], vec![client.clone()])
}

/// True when `server` wins a last-writer-wins conflict against `client`.
///
/// The greater origin wins; an operation without an origin loses to one with
/// an origin. Equal origins go to the server.
pub(crate) fn server_wins(server: &Operation, client: &Operation) -> bool {
    server.origin() >= client.origin()
}

/// Keep the winner, cancel the loser.
pub(crate) fn last_writer_wins(server: &Operation, client: &Operation) -> Transformed {
    if server_wins(server, client) {
        trace!(winner = ?server.origin(), "server wins conflict");
        (vec![server.clone()], vec![client.to_noop()])
    } else {
        trace!(winner = ?client.origin(), "client wins conflict");
        (vec![server.to_noop()], vec![client.clone()])
    }
}

/// Drop no-ops from a split result. A result that is all no-ops keeps one,
/// so the version slot it stands for stays occupied.
pub(crate) fn compact(ops: Vec<Operation>) -> Vec<Operation> {
    if ops.iter().all(Operation::is_noop) {
        return ops.into_iter().take(1).collect();
    }
    ops.into_iter().filter(|op| !op.is_noop()).collect()
}
