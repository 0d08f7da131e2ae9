//! Number transforms. Boolean and null writes are plain last-writer-wins
//! and need no rule of their own.

use super::{last_writer_wins, server_wins, unchanged, Transformed};
use crate::apply::exact_sum;
use crate::operation::{NumberOp, Operation};

/// Integer adds commute, so two of them pass through. A set against an add
/// goes to the last writer; a winning add lands on top of the set by
/// re-deriving the set's value, but only when that sum is exact. Otherwise
/// the set wins regardless of origin.
pub(super) fn transform_number(
    server: &Operation,
    s: &NumberOp,
    client: &Operation,
    c: &NumberOp,
) -> Transformed {
    match (s, c) {
        (NumberOp::Add { .. }, NumberOp::Add { .. }) => unchanged(server, client),
        (NumberOp::Set { .. }, NumberOp::Set { .. }) => last_writer_wins(server, client),
        (NumberOp::Set { value }, NumberOp::Add { delta }) => {
            match exact_sum(*value, *delta).filter(|_| !server_wins(server, client)) {
                Some(value) => {
                    let rebased = server.with_kind(NumberOp::Set { value });
                    (vec![rebased], vec![client.clone()])
                }
                None => (vec![server.clone()], vec![client.to_noop()]),
            }
        }
        (NumberOp::Add { delta }, NumberOp::Set { value }) => {
            match exact_sum(*value, *delta).filter(|_| server_wins(server, client)) {
                Some(value) => {
                    let rebased = client.with_kind(NumberOp::Set { value });
                    (vec![server.clone()], vec![rebased])
                }
                None => (vec![server.to_noop()], vec![client.clone()]),
            }
        }
    }
}
