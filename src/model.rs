//! Identifiers, timestamps and the attribute payload.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::schema::Classification;

/// Instant in time, unix milliseconds.
pub type Timestamp = i64;

/// Current wall-clock instant.
pub fn now() -> Timestamp {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as Timestamp
}

/// Identifier of a space.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct SpaceId(pub u64);

/// Identifier of a user interacting with the request workflow.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Identifier of an occupation request.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive attributes carried by one version of a space.
///
/// The set is immutable once attached to a version; truncating a version
/// shares the same `AttributeSet` allocation rather than cloning it.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSet {
    /// Human-readable name of the space.
    pub name: String,
    /// Classification governing which metadata fields exist and their types.
    pub classification: Arc<Classification>,
    /// How many occupants the space can be allocated to, when bounded.
    pub allocatable_capacity: Option<u32>,
    /// Free-form metadata document, decoded on demand against the
    /// classification schema.
    pub metadata: Map<String, Value>,
}

impl AttributeSet {
    /// Builds an attribute set with an empty metadata document.
    pub fn new(name: impl Into<String>, classification: Arc<Classification>) -> Self {
        Self {
            name: name.into(),
            classification,
            allocatable_capacity: None,
            metadata: Map::new(),
        }
    }

    /// Sets the allocatable capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.allocatable_capacity = Some(capacity);
        self
    }

    /// Adds one metadata entry.
    pub fn with_metadata(mut self, field: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(field.into(), value);
        self
    }
}
