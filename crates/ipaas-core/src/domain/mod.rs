//! Domain model: artifact identity, catalog entries, ids and errors.

pub mod artifact;
pub mod entry;
pub mod errors;
pub mod ids;

pub use self::artifact::{ArtifactDescriptor, ArtifactKey};
pub use self::entry::{CatalogEntry, ConnectorSource};
pub use self::errors::{ArtifactError, ConfigError, IndexFetchError};
pub use self::ids::CycleId;
