//! Retention of former chain heads.

use std::sync::Arc;

use crate::version::SpaceVersion;

/// Append-only log of former chain heads.
///
/// A head is pushed exactly once, whenever a space adopts a new head.
/// Entries are never removed; because chain nodes are immutable, each
/// archived head keeps the entire chain that existed at archive time
/// alive and unmodified.
#[derive(Clone, Debug, Default)]
pub struct VersionHistory {
    heads: Vec<Arc<SpaceVersion>>,
}

impl VersionHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Archives a former head.
    pub fn push(&mut self, head: Arc<SpaceVersion>) {
        self.heads.push(head);
    }

    /// Number of archived heads.
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    /// Whether any head has been archived yet.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Most recently archived head.
    pub fn latest(&self) -> Option<&Arc<SpaceVersion>> {
        self.heads.last()
    }

    /// Archived heads in archive order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpaceVersion>> {
        self.heads.iter()
    }
}
