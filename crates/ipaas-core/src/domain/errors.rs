//! Errors - failure taxonomy of the indexer.
//!
//! - `IndexFetchError`: the index could not be queried or parsed. Aborts one cycle.
//! - `ArtifactError`: one artifact could not be downloaded or decoded. Skips that artifact.
//! - `ConfigError`: invalid settings at startup.

use thiserror::Error;

/// The remote index could not be queried or its response could not be read.
#[derive(Debug, Error)]
pub enum IndexFetchError {
    #[error("index request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("index {url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read index response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("malformed index document: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// A single artifact could not be turned into a catalog entry.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid artifact link {link}: {reason}")]
    InvalidLink { link: String, reason: String },

    #[error("download of {link} failed: {source}")]
    Download {
        link: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download of {link} answered with HTTP {status}")]
    Status { link: String, status: u16 },

    #[error("artifact {link} exceeds {limit} bytes")]
    ArtifactTooLarge { link: String, limit: u64 },

    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact is not a readable archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive has no {0} entry")]
    DescriptorMissing(&'static str),

    #[error("connector descriptor exceeds {0} bytes")]
    DescriptorTooLarge(u64),

    #[error("malformed connector descriptor: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ArtifactError {
    /// Network or file access failures (before the archive is opened).
    pub fn is_download(&self) -> bool {
        matches!(
            self,
            Self::InvalidLink { .. }
                | Self::Download { .. }
                | Self::Status { .. }
                | Self::ArtifactTooLarge { .. }
                | Self::Io(_)
        )
    }

    /// The bytes arrived but could not be decoded into a catalog entry.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::Archive(_)
                | Self::DescriptorMissing(_)
                | Self::DescriptorTooLarge(_)
                | Self::Parse(_)
        )
    }

    /// Log phase the error belongs to.
    pub fn phase(&self) -> &'static str {
        if self.is_parse() {
            "artifact_parse"
        } else {
            "artifact_download"
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NEXUS_INDEX_DELAY must be a non-negative number of seconds, got {0:?}")]
    InvalidDelay(String),

    #[error("invalid index url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
