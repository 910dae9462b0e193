//! ipaas-core
//!
//! Connector catalog backed by a Nexus index.
//!
//! # Modules
//! - **domain**: artifact identity, catalog entries, errors
//! - **ports**: traits for the index, artifact extraction, schema catalog, clock
//! - **impls**: HTTP/XML index client, zip descriptor extractor, in-memory schema catalog
//! - **app**: configuration, repository, scheduler, details and option pages

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use app::{ConnectionRepository, IndexScheduler, IndexerConfig, SchedulerState};
pub use domain::{ArtifactDescriptor, ArtifactKey, CatalogEntry};
