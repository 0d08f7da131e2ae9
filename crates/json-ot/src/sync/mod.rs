//! Client-side synchronization controller.
//!
//! One [`SyncController`] owns one document replica. It applies local edits
//! right away and keeps them in a pending queue until the server
//! acknowledges them. Remote patches are rebased over that queue before they
//! touch the document. Anything that breaks the version contract moves the
//! controller to [`SyncState::Resyncing`], after which only
//! [`SyncController::resync`] with a fresh snapshot brings it back.
//!
//! The controller does no I/O. The host takes outgoing patches with
//! [`SyncController::take_outgoing`] and feeds server messages back in, one
//! at a time and in order.

mod cancel;
mod options;
mod pending;

pub use cancel::CancelToken;
pub use options::SyncOptions;
pub use pending::{Outgoing, PendingEntry};

use serde_json::Value;
use tracing::{debug, warn};

use crate::compose::compose;
use crate::error::OtError;
use crate::model::Model;
use crate::operation::{OpId, Operation, Patch};
use crate::reference::{transform_reference_through, RefState};
use crate::transform::{compact, transform_seq};
use pending::PendingQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing pending; the document equals the server's at `server_version`.
    Synchronized,
    /// Local patches are waiting for acknowledgment.
    Pending,
    /// The version contract was broken; a snapshot reload is required.
    Resyncing,
}

#[derive(Debug)]
pub struct SyncController {
    options: SyncOptions,
    model: Model,
    /// Last version confirmed by the server.
    server_version: u64,
    pending: PendingQueue,
    next_seq: u64,
    state: SyncState,
    cancel: Option<CancelToken>,
}

impl SyncController {
    /// Start from a server snapshot taken at `version`.
    pub fn new(options: SyncOptions, snapshot: Value, version: u64) -> Self {
        Self {
            options,
            model: Model::new(snapshot, version),
            server_version: version,
            pending: PendingQueue::default(),
            next_seq: 1,
            state: SyncState::Synchronized,
            cancel: None,
        }
    }

    /// Tie the controller to `token`: once it is cancelled the controller
    /// stops and reports `Resyncing`.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Local version: the server version plus one per pending patch.
    pub fn version(&self) -> u64 {
        self.model.version()
    }

    pub fn server_version(&self) -> u64 {
        self.server_version
    }

    pub fn document(&self) -> &Value {
        self.model.view()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingEntry> {
        self.pending.entries().iter()
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    // ── Local edits ───────────────────────────────────────────────────────

    /// Apply a local edit and queue it for the server.
    ///
    /// Returns the operation as applied (stamped with this replica as its
    /// origin) and the local version afterwards. An edit that composes into
    /// the newest unsent pending patch shares its version slot, so the
    /// version does not move.
    pub fn apply_local(&mut self, op: Operation) -> Result<(Operation, u64), OtError> {
        self.ensure_live()?;
        let op = op.with_origin(self.options.replica.clone());

        if self.options.compose_local_edits {
            if let Some(tail) = self.pending.unsent_tail_mut() {
                if let [prev] = tail.patch.ops() {
                    if let Some(merged) = compose(prev, &op) {
                        self.model.amend(&op)?;
                        tail.patch = merged.into();
                        debug!(
                            id = %tail.id,
                            op = %op,
                            version = self.model.version(),
                            "composed local edit"
                        );
                        return Ok((op, self.model.version()));
                    }
                }
            }
        }

        let version = self.model.apply_patch(&op.clone().into())?;
        let id = OpId {
            replica: self.options.replica.clone(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        debug!(id = %id, op = %op, version, "applied local edit");
        self.pending.push(id, op.clone().into());
        self.state = SyncState::Pending;
        Ok((op, version))
    }

    /// Hand every pending patch the transport has not seen yet.
    ///
    /// At most one batch is in flight: while any sent patch is still
    /// unacknowledged this returns nothing, and the held patches go out on
    /// the first call after the batch's last acknowledgment. Entry `i` of a
    /// batch is based on `server_version + i`, so the server has to
    /// transform the batch as a unit, oldest entry first.
    pub fn take_outgoing(&mut self) -> Result<Vec<Outgoing>, OtError> {
        self.ensure_live()?;
        if self.pending.in_flight() {
            return Ok(Vec::new());
        }
        let batch = self.pending.take_unsent(self.server_version);
        if !batch.is_empty() {
            debug!(count = batch.len(), base_version = self.server_version, "sending batch");
        }
        Ok(batch)
    }

    // ── Server messages ───────────────────────────────────────────────────

    /// Fold in a remote patch generated against `base_version`.
    ///
    /// The patch is transformed over every pending local patch, oldest
    /// first, and each pending patch is replaced by its rebased form. The
    /// transformed remote patch is applied and returned.
    pub fn receive_remote(
        &mut self,
        remote: impl Into<Patch>,
        base_version: u64,
    ) -> Result<Patch, OtError> {
        self.ensure_live()?;
        if base_version != self.server_version {
            let err = OtError::VersionConflict {
                expected: self.server_version,
                actual: base_version,
            };
            return Err(self.fail(err));
        }

        let remote: Patch = remote.into();
        match self.fold_remote(remote) {
            Ok(applied) => {
                self.server_version += 1;
                debug!(
                    server_version = self.server_version,
                    version = self.model.version(),
                    pending = self.pending.len(),
                    "folded in remote patch"
                );
                Ok(applied)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fold_remote(&mut self, remote: Patch) -> Result<Patch, OtError> {
        let mut incoming = remote.into_ops();
        let mut rebased = Vec::with_capacity(self.pending.len());
        for entry in self.pending.entries() {
            let (server, client) = transform_seq(&incoming, entry.patch.ops())?;
            incoming = server;
            rebased.push(Patch::new(compact(client)));
        }
        let applied = Patch::new(compact(incoming));
        self.model.apply_patch(&applied)?;
        self.pending.replace_patches(rebased);
        Ok(applied)
    }

    /// The server accepted the head of the pending queue.
    pub fn acknowledge(&mut self, id: &OpId) -> Result<(), OtError> {
        self.ensure_live()?;
        let is_head = matches!(self.pending.head(), Some(head) if &head.id == id && head.sent);
        if !is_head {
            return Err(self.fail(OtError::UnknownOperation(id.clone())));
        }
        self.pending.pop_head();
        self.server_version += 1;
        if self.pending.is_empty() {
            self.state = SyncState::Synchronized;
        }
        debug!(
            id = %id,
            server_version = self.server_version,
            pending = self.pending.len(),
            "acknowledged"
        );
        Ok(())
    }

    /// Like [`acknowledge`](Self::acknowledge), also checking the version the
    /// server assigned to the patch.
    pub fn acknowledge_at(&mut self, id: &OpId, version: u64) -> Result<(), OtError> {
        self.ensure_live()?;
        let expected = self.server_version + 1;
        if version != expected {
            return Err(self.fail(OtError::VersionConflict {
                expected,
                actual: version,
            }));
        }
        self.acknowledge(id)
    }

    /// Map a reference through operations that were applied to the document.
    pub fn transform_reference<'a>(
        &mut self,
        reference: &RefState,
        applied: impl IntoIterator<Item = &'a Operation>,
    ) -> Result<RefState, OtError> {
        self.ensure_live()?;
        Ok(transform_reference_through(reference, applied))
    }

    // ── Recovery ──────────────────────────────────────────────────────────

    /// The transport lost messages or the connection; in-flight patches can
    /// no longer be accounted for.
    pub fn transport_failed(&mut self) {
        self.enter_resyncing("transport failure");
    }

    /// Replace the document with a server snapshot taken at `version` and
    /// resume. Pending local edits are gone.
    pub fn resync(&mut self, snapshot: Value, version: u64) -> Result<(), OtError> {
        if self.is_cancelled() {
            self.enter_resyncing("cancelled");
            return Err(OtError::Resyncing);
        }
        self.model = Model::new(snapshot, version);
        self.server_version = version;
        self.pending.clear();
        self.state = SyncState::Synchronized;
        debug!(version, "resynced from snapshot");
        Ok(())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn ensure_live(&mut self) -> Result<(), OtError> {
        if self.is_cancelled() {
            self.enter_resyncing("cancelled");
        }
        match self.state {
            SyncState::Resyncing => Err(OtError::Resyncing),
            _ => Ok(()),
        }
    }

    fn fail(&mut self, err: OtError) -> OtError {
        self.enter_resyncing(&err.to_string());
        err
    }

    fn enter_resyncing(&mut self, reason: &str) {
        if self.state == SyncState::Resyncing {
            return;
        }
        warn!(
            replica = %self.options.replica,
            reason,
            dropped = self.pending.len(),
            "resync required"
        );
        self.pending.clear();
        self.state = SyncState::Resyncing;
    }
}
