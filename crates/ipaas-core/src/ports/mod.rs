//! Ports - the seams to external systems.
//!
//! - **IndexClient**: remote artifact index (Nexus `data_index`)
//! - **MetadataExtractor**: artifact download + descriptor extraction
//! - **SchemaCatalog / ComponentDiscovery**: component schema lookup
//! - **Clock / IdGenerator**: time and cycle ids, swappable in tests

pub mod clock;
pub mod id_generator;
pub mod index_client;
pub mod metadata_extractor;
pub mod schema_catalog;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::index_client::IndexClient;
pub use self::metadata_extractor::{CONNECTOR_DESCRIPTOR, MetadataExtractor};
pub use self::schema_catalog::{ComponentDiscovery, SchemaCatalog};
