//! ArchiveExtractor - reads `camel-connector.json` out of a connector JAR.
//!
//! The artifact is fetched into memory and opened as a zip archive. Only the
//! descriptor entry is read. Both the artifact and the descriptor are read
//! under a byte limit, so a hostile archive header cannot force a huge
//! allocation.

use std::io::{Cursor, Read};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::domain::{ArtifactDescriptor, ArtifactError, CatalogEntry};
use crate::ports::{CONNECTOR_DESCRIPTOR, MetadataExtractor};

/// Largest artifact the extractor will buffer.
pub const MAX_ARTIFACT_BYTES: u64 = 64 * 1024 * 1024;

/// Largest `camel-connector.json` the extractor will decode.
pub const MAX_DESCRIPTOR_BYTES: u64 = 1024 * 1024;

/// Fetches artifacts over `http(s)` or from `file` links.
pub struct ArchiveExtractor {
    client: reqwest::Client,
    max_artifact_bytes: u64,
}

impl ArchiveExtractor {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_artifact_bytes: MAX_ARTIFACT_BYTES,
        }
    }

    pub fn with_max_artifact_bytes(mut self, limit: u64) -> Self {
        self.max_artifact_bytes = limit;
        self
    }

    async fn fetch_bytes(&self, link: &str) -> Result<Vec<u8>, ArtifactError> {
        let invalid = |reason: String| ArtifactError::InvalidLink {
            link: link.to_string(),
            reason,
        };
        let too_large = || ArtifactError::ArtifactTooLarge {
            link: link.to_string(),
            limit: self.max_artifact_bytes,
        };
        let url = Url::parse(link).map_err(|e| invalid(e.to_string()))?;

        let scheme = url.scheme().to_string();
        match scheme.as_str() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| invalid("not a local file path".to_string()))?;
                if tokio::fs::metadata(&path).await?.len() > self.max_artifact_bytes {
                    return Err(too_large());
                }
                Ok(tokio::fs::read(path).await?)
            }
            "http" | "https" => {
                let mut response = self.client.get(url).send().await.map_err(|source| {
                    ArtifactError::Download {
                        link: link.to_string(),
                        source,
                    }
                })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ArtifactError::Status {
                        link: link.to_string(),
                        status: status.as_u16(),
                    });
                }
                if response
                    .content_length()
                    .is_some_and(|len| len > self.max_artifact_bytes)
                {
                    return Err(too_large());
                }

                // Content-Length is optional and untrusted; count the body as well.
                let mut bytes = Vec::new();
                let download = |source: reqwest::Error| ArtifactError::Download {
                    link: link.to_string(),
                    source,
                };
                while let Some(chunk) = response.chunk().await.map_err(download)? {
                    if (bytes.len() + chunk.len()) as u64 > self.max_artifact_bytes {
                        return Err(too_large());
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(bytes)
            }
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }
}

#[async_trait]
impl MetadataExtractor for ArchiveExtractor {
    async fn try_extract(
        &self,
        artifact: &ArtifactDescriptor,
    ) -> Result<CatalogEntry, ArtifactError> {
        let bytes = self.fetch_bytes(artifact.download_link()).await?;
        debug!(
            phase = "artifact_download",
            artifact = %artifact,
            bytes = bytes.len(),
            "artifact downloaded"
        );

        // zip decoding is synchronous
        tokio::task::spawn_blocking(move || read_descriptor_from_archive(&bytes)).await?
    }
}

/// Decode the connector descriptor stored in an in-memory archive.
pub fn read_descriptor_from_archive(bytes: &[u8]) -> Result<CatalogEntry, ArtifactError> {
    read_descriptor_with_limit(bytes, MAX_DESCRIPTOR_BYTES)
}

fn read_descriptor_with_limit(bytes: &[u8], limit: u64) -> Result<CatalogEntry, ArtifactError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut file = match archive.by_name(CONNECTOR_DESCRIPTOR) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(ArtifactError::DescriptorMissing(CONNECTOR_DESCRIPTOR));
        }
        Err(e) => return Err(e.into()),
    };

    // the declared entry size is untrusted; read one byte past the limit to detect overflow
    let mut json = Vec::new();
    (&mut file)
        .take(limit + 1)
        .read_to_end(&mut json)
        .map_err(ZipError::Io)?;
    if json.len() as u64 > limit {
        return Err(ArtifactError::DescriptorTooLarge(limit));
    }
    Ok(serde_json::from_slice(&json)?)
}
