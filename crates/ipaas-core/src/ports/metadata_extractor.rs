//! MetadataExtractor port - reads the connector descriptor out of an artifact.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{ArtifactDescriptor, ArtifactError, CatalogEntry};

/// Path of the self-describing metadata file inside a connector archive.
pub const CONNECTOR_DESCRIPTOR: &str = "camel-connector.json";

/// MetadataExtractor turns a downloaded artifact into a `CatalogEntry`.
///
/// Only the descriptor file is read; nothing inside the archive is executed.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn try_extract(&self, artifact: &ArtifactDescriptor)
    -> Result<CatalogEntry, ArtifactError>;

    /// Never fails: errors become `None` plus a warning.
    async fn extract_descriptor(&self, artifact: &ArtifactDescriptor) -> Option<CatalogEntry> {
        match self.try_extract(artifact).await {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(
                    phase = err.phase(),
                    artifact = %artifact,
                    link = artifact.download_link(),
                    error = %err,
                    "failed to extract connector descriptor; artifact skipped"
                );
                None
            }
        }
    }
}
