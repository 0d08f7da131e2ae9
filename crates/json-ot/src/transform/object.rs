//! Object property transforms.

use super::{last_writer_wins, unchanged, Transformed};
use crate::operation::{ObjectOp, Operation};

pub(super) fn transform(
    server: &Operation,
    s: &ObjectOp,
    client: &Operation,
    c: &ObjectOp,
) -> Transformed {
    if s.key() != c.key() {
        return unchanged(server, client);
    }
    match (s, c) {
        (ObjectOp::RemoveProperty { .. }, ObjectOp::RemoveProperty { .. }) => {
            (vec![server.to_noop()], vec![client.to_noop()])
        }
        _ => last_writer_wins(server, client),
    }
}
