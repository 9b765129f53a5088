//! The space entity: current chain head, history, lookups.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::chain;
use crate::error::Result;
use crate::history::VersionHistory;
use crate::model::{self, SpaceId, Timestamp};
use crate::schema::{self, Classification, MetadataValue};
use crate::version::SpaceVersion;

struct SpaceState {
    head: Arc<SpaceVersion>,
    history: VersionHistory,
}

/// A physical-space entity with a time-varying attribute chain.
///
/// The current chain head and the history of former heads live behind one
/// lock; readers clone the head `Arc` under the lock and then traverse
/// the immutable chain lock-free. One logical writer per space is
/// assumed, so a writer may build the replacement chain outside the lock
/// and only take it for the archive-and-swap.
pub struct Space {
    id: SpaceId,
    parent: Option<SpaceId>,
    created: Timestamp,
    state: RwLock<SpaceState>,
}

impl Space {
    /// Creates a space whose chain starts with `initial`.
    pub fn new(id: SpaceId, parent: Option<SpaceId>, initial: SpaceVersion) -> Self {
        Self {
            id,
            parent,
            created: model::now(),
            state: RwLock::new(SpaceState {
                head: Arc::new(initial.detached()),
                history: VersionHistory::new(),
            }),
        }
    }

    /// Space identifier.
    pub fn id(&self) -> SpaceId {
        self.id
    }

    /// Containing space, when this space sits inside another.
    pub fn parent(&self) -> Option<SpaceId> {
        self.parent
    }

    /// Instant the space was created.
    pub fn created(&self) -> Timestamp {
        self.created
    }

    /// Snapshot of the current chain head.
    pub fn head(&self) -> Arc<SpaceVersion> {
        self.state.read().head.clone()
    }

    /// Former chain heads, oldest first.
    pub fn archived_heads(&self) -> Vec<Arc<SpaceVersion>> {
        self.state.read().history.iter().cloned().collect()
    }

    /// Number of inserts that replaced an existing head.
    pub fn history_len(&self) -> usize {
        self.state.read().history.len()
    }

    /// Inserts a new version, rebuilding the chain so intervals never
    /// overlap, then archives the former head and adopts the new one.
    pub fn insert_version(&self, version: SpaceVersion) -> Result<()> {
        let interval = version.interval();
        // Single logical writer per space: the head cannot change between
        // this snapshot and the swap below.
        let current = self.head();
        let new_head = chain::insert(Some(current.clone()), version)?;
        let mut state = self.state.write();
        let old_head = std::mem::replace(&mut state.head, new_head);
        state.history.push(old_head);
        debug!(space = %self.id, %interval, archived = state.history.len(),
               "space.version.insert");
        Ok(())
    }

    /// Version covering `instant`.
    pub fn version_at(&self, instant: Timestamp) -> Result<Arc<SpaceVersion>> {
        chain::find_at(&self.head(), instant)
    }

    /// Version covering the current wall-clock instant.
    pub fn current_version(&self) -> Result<Arc<SpaceVersion>> {
        self.version_at(model::now())
    }

    /// Name of the space at `instant`.
    pub fn name_at(&self, instant: Timestamp) -> Result<String> {
        Ok(self.version_at(instant)?.attributes().name.clone())
    }

    /// Classification of the space at `instant`.
    pub fn classification_at(&self, instant: Timestamp) -> Result<Arc<Classification>> {
        Ok(Arc::clone(&self.version_at(instant)?.attributes().classification))
    }

    /// Metadata field of the space at `instant`, decoded against the
    /// classification in force at that instant.
    pub fn attribute_at(&self, field: &str, instant: Timestamp) -> Result<MetadataValue> {
        let version = self.version_at(instant)?;
        let attributes = version.attributes();
        schema::decode_field(attributes.classification.as_ref(), &attributes.metadata, field)
    }

    /// Metadata field of the space right now.
    pub fn current_attribute(&self, field: &str) -> Result<MetadataValue> {
        self.attribute_at(field, model::now())
    }
}
