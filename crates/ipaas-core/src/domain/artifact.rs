//! Artifact identity as reported by the index server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maven coordinates of an indexed artifact (`groupId:artifactId:version`).
///
/// This is the identity used everywhere a connector has to be deduplicated:
/// the set of artifacts already seen from the index and the catalog keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ArtifactKey {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A discovered artifact: its coordinates plus where to download it from.
///
/// Equality and hashing only look at the coordinates. Two descriptors that
/// point at different download links for the same `g:a:v` are the same
/// artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    #[serde(flatten)]
    key: ArtifactKey,
    #[serde(rename = "artifactLink")]
    download_link: String,
}

impl ArtifactDescriptor {
    pub fn new(key: ArtifactKey, download_link: impl Into<String>) -> Self {
        Self {
            key,
            download_link: download_link.into(),
        }
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn group_id(&self) -> &str {
        &self.key.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.key.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.key.version
    }

    pub fn download_link(&self) -> &str {
        &self.download_link
    }
}

impl PartialEq for ArtifactDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ArtifactDescriptor {}

impl Hash for ArtifactDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}
