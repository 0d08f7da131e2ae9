//! Queue of local patches the server has not acknowledged yet.

use std::collections::VecDeque;

use crate::operation::{OpId, Patch};

#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub id: OpId,
    /// Rebased over every remote patch folded in since it was made.
    pub patch: Patch,
    /// Handed to the transport by `take_outgoing`. Sent entries are never
    /// composed into.
    pub sent: bool,
}

/// A pending patch handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub id: OpId,
    pub patch: Patch,
    /// Server version the patch was generated against.
    pub base_version: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PendingQueue {
    entries: VecDeque<PendingEntry>,
}

impl PendingQueue {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &VecDeque<PendingEntry> {
        &self.entries
    }

    pub(crate) fn push(&mut self, id: OpId, patch: Patch) {
        self.entries.push_back(PendingEntry { id, patch, sent: false });
    }

    /// The newest entry, if nobody but this replica has seen it.
    pub(crate) fn unsent_tail_mut(&mut self) -> Option<&mut PendingEntry> {
        self.entries.back_mut().filter(|e| !e.sent)
    }

    /// Sent entries form a prefix of the queue, so the head tells whether
    /// any are still waiting for acknowledgment.
    pub(crate) fn in_flight(&self) -> bool {
        self.entries.front().is_some_and(|e| e.sent)
    }

    pub(crate) fn head(&self) -> Option<&PendingEntry> {
        self.entries.front()
    }

    pub(crate) fn pop_head(&mut self) -> Option<PendingEntry> {
        self.entries.pop_front()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Swap in rebased patches, oldest first. `patches` must have one patch
    /// per entry.
    pub(crate) fn replace_patches(&mut self, patches: Vec<Patch>) {
        debug_assert_eq!(patches.len(), self.entries.len());
        for (entry, patch) in self.entries.iter_mut().zip(patches) {
            entry.patch = patch;
        }
    }

    /// Mark every unsent entry as sent and return them. Entry `i` of the
    /// queue was made against server version `confirmed + i`.
    pub(crate) fn take_unsent(&mut self, confirmed: u64) -> Vec<Outgoing> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter(|(_, e)| !e.sent)
            .map(|(i, e)| {
                e.sent = true;
                Outgoing {
                    id: e.id.clone(),
                    patch: e.patch.clone(),
                    base_version: confirmed + i as u64,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{NullOp, Operation};

    fn id(seq: u64) -> OpId {
        OpId { replica: "r".into(), seq }
    }

    fn patch() -> Patch {
        Operation::new(vec![], NullOp::Set).into()
    }

    #[test]
    fn unsent_entries_go_out_once_with_their_base() {
        let mut queue = PendingQueue::default();
        queue.push(id(1), patch());
        queue.push(id(2), patch());
        assert!(!queue.in_flight());
        let out = queue.take_unsent(10);
        assert_eq!(out.iter().map(|o| o.base_version).collect::<Vec<_>>(), vec![10, 11]);
        assert!(queue.in_flight());
        assert!(queue.take_unsent(10).is_empty());
        assert!(queue.unsent_tail_mut().is_none());

        queue.push(id(3), patch());
        assert_eq!(queue.unsent_tail_mut().map(|e| e.id.seq), Some(3));
        let out = queue.take_unsent(10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].base_version, 12);
    }
}
