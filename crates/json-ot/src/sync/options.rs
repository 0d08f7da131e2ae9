use serde::{Deserialize, Serialize};

use crate::operation::ReplicaId;

/// Per-controller settings.
///
/// Deserializes with every field optional, so hosts can keep it in their
/// own JSON or TOML configuration:
///
/// ```
/// use json_ot::SyncOptions;
///
/// let options: SyncOptions = serde_json::from_str(r#"{"replica": "tab-1"}"#).unwrap();
/// assert_eq!(options.replica.as_str(), "tab-1");
/// assert!(options.compose_local_edits);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Stamped as the origin of every local operation.
    pub replica: ReplicaId,
    /// Merge a local edit into the newest unsent pending edit when possible.
    pub compose_local_edits: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            replica: ReplicaId::default(),
            compose_local_edits: true,
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn new(replica: impl Into<ReplicaId>) -> Self {
        Self {
            replica: replica.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_compose_local_edits(mut self, enabled: bool) -> Self {
        self.compose_local_edits = enabled;
        self
    }
}
