//! Impls - concrete adapters for the ports.
//!
//! - **HttpIndexClient**: Nexus `data_index` over HTTP, XML response
//! - **ArchiveExtractor**: JAR download + `camel-connector.json` extraction
//! - **InMemorySchemaCatalog**: component schemas held in memory

pub mod archive_extractor;
pub mod http_index;
pub mod schema_catalog;

pub use self::archive_extractor::{ArchiveExtractor, read_descriptor_from_archive};
pub use self::http_index::{HttpIndexClient, parse_index_document};
pub use self::schema_catalog::InMemorySchemaCatalog;
