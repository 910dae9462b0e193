//! IndexClient port - queries the remote artifact index.

use async_trait::async_trait;

use crate::domain::{ArtifactDescriptor, IndexFetchError};

/// IndexClient lists candidate artifacts carrying a given classifier.
///
/// # Contract
/// - Results keep document order.
/// - Records missing any of groupId/artifactId/version/artifactLink are skipped.
/// - The same `g:a:v` appears at most once (first occurrence wins).
/// - Unreachable endpoint or unreadable response is an `IndexFetchError`.
#[async_trait]
pub trait IndexClient: Send + Sync {
    async fn fetch_candidates(
        &self,
        index_url: &str,
        classifier: &str,
    ) -> Result<Vec<ArtifactDescriptor>, IndexFetchError>;
}
