//! Ownership of spaces and the containment tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Result, SpaceError};
use crate::model::SpaceId;
use crate::space::Space;
use crate::version::SpaceVersion;

struct Inner {
    spaces: BTreeMap<SpaceId, Arc<Space>>,
    next_id: u64,
}

/// Owns all spaces and allocates their identifiers.
///
/// Spaces form a containment tree through their parent link; the tree is
/// a plain ownership relation with no bearing on version chains.
pub struct SpaceRepository {
    inner: RwLock<Inner>,
}

impl SpaceRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                spaces: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Creates a space whose chain starts with `initial`, optionally
    /// inside `parent`.
    pub fn create_space(
        &self,
        parent: Option<SpaceId>,
        initial: SpaceVersion,
    ) -> Result<Arc<Space>> {
        let mut inner = self.inner.write();
        if let Some(parent) = parent {
            if !inner.spaces.contains_key(&parent) {
                return Err(SpaceError::NotFound("parent space"));
            }
        }
        let id = SpaceId(inner.next_id);
        inner.next_id += 1;
        let space = Arc::new(Space::new(id, parent, initial));
        inner.spaces.insert(id, space.clone());
        debug!(space = %id, parent = ?parent, "repository.space.create");
        Ok(space)
    }

    /// Looks a space up by id.
    pub fn get(&self, id: SpaceId) -> Result<Arc<Space>> {
        self.inner
            .read()
            .spaces
            .get(&id)
            .cloned()
            .ok_or(SpaceError::NotFound("space"))
    }

    /// Direct children of `id`, in id order.
    pub fn children(&self, id: SpaceId) -> Vec<Arc<Space>> {
        self.inner
            .read()
            .spaces
            .values()
            .filter(|space| space.parent() == Some(id))
            .cloned()
            .collect()
    }

    /// Number of spaces.
    pub fn len(&self) -> usize {
        self.inner.read().spaces.len()
    }

    /// Whether the repository holds no spaces.
    pub fn is_empty(&self) -> bool {
        self.inner.read().spaces.is_empty()
    }
}

impl Default for SpaceRepository {
    fn default() -> Self {
        Self::new()
    }
}
