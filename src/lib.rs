//! Temporal attribute versioning for physical spaces.
//!
//! Every space carries a chain of immutable [`SpaceVersion`] records, each
//! valid over a half-open [`TimeInterval`]. Inserting a version with an
//! arbitrary validity interval rebuilds the chain so that intervals never
//! overlap, while every former chain head stays reachable through an
//! append-only history. Queries walk the chain from the current head and
//! never mutate state.

pub mod chain;
pub mod error;
pub mod history;
pub mod interval;
pub mod model;
pub mod repository;
pub mod requests;
pub mod schema;
pub mod space;
pub mod version;

pub use error::{Result, SpaceError};
pub use history::VersionHistory;
pub use interval::TimeInterval;
pub use model::{AttributeSet, RequestId, SpaceId, Timestamp, UserId};
pub use repository::SpaceRepository;
pub use requests::{OccupationRequest, RequestRegistry, RequestState};
pub use schema::{Classification, MetadataSchema, MetadataValue, PrimitiveType};
pub use space::Space;
pub use version::SpaceVersion;
