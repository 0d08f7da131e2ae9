use json_ot_pointer::JsonPointerError;
use thiserror::Error;

use crate::operation::OpId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OtError {
    /// A remote operation or acknowledgment references a version this
    /// replica has not reached or has already passed.
    #[error("version conflict: expected base version {expected}, got {actual}")]
    VersionConflict { expected: u64, actual: u64 },
    /// Acknowledgment for an operation that is not the head of the pending queue.
    #[error("unknown operation {0}")]
    UnknownOperation(OpId),
    #[error("no transform for {server} (server) against {client} (client)")]
    UnsupportedTransformPair {
        server: &'static str,
        client: &'static str,
    },
    #[error("precondition violation: {0}")]
    PreconditionViolation(String),
    #[error("invalid path: {0}")]
    InvalidPath(#[from] JsonPointerError),
    #[error("reference is detached")]
    DetachedReferenceAccess,
    /// The controller lost sync and needs a full snapshot before resuming.
    #[error("replica is resyncing, a snapshot reload is required")]
    Resyncing,
}

impl OtError {
    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        OtError::PreconditionViolation(msg.into())
    }
}
