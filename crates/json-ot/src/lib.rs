//! Operational transformation for collaborative JSON documents.
//!
//! - [`operation`]: the closed set of typed operations and [`Patch`]es.
//! - [`apply`] and [`model`]: applying them to a versioned document.
//! - [`transform`](mod@transform): reconciling concurrent operations so replicas converge.
//! - [`reference`]: keeping cursors, selections and element pointers in place.
//! - [`compose`](mod@compose): merging consecutive local edits.
//! - [`sync`]: the per-document client controller tying it together.
//!
//! ```
//! use json_ot::{transform, OpKind, Operation, StringOp};
//! use json_ot_pointer::PathStep;
//!
//! let path = vec![PathStep::from("title")];
//! let server = Operation::new(path.clone(), StringOp::insert(2, "X"));
//! let client = Operation::new(path, StringOp::insert(2, "Y"));
//! let (_, client2) = transform(&server, &client).unwrap();
//! assert_eq!(client2[0].kind(), &OpKind::String(StringOp::insert(3, "Y")));
//! ```

pub mod apply;
pub mod compose;
pub mod error;
pub mod model;
pub mod operation;
pub mod reference;
pub mod sync;
pub mod transform;

pub use apply::apply_operation;
pub use compose::compose;
pub use error::OtError;
pub use model::Model;
pub use operation::{
    ArrayOp, BooleanOp, NullOp, NumberOp, ObjectOp, OpId, OpKind, Operation, Patch, ReplicaId,
    StringOp, ValueType,
};
pub use reference::{transform_reference, transform_reference_through, Anchor, RefState, Reference};
pub use sync::{CancelToken, Outgoing, PendingEntry, SyncController, SyncOptions, SyncState};
pub use transform::{transform, transform_patch, Transformed};
