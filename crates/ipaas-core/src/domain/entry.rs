//! CatalogEntry - connector metadata read from `camel-connector.json`.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::ArtifactKey;

/// Which side of a route the connector is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorSource {
    /// Consumer only (`from(...)`).
    From,
    /// Producer only (`to(...)`).
    To,
}

/// Parsed connector metadata.
///
/// Built only by decoding a connector descriptor; the repository stores it
/// behind an `Arc` and never mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Ordered set: repeated labels collapse onto their first position.
    #[serde(default)]
    pub labels: IndexSet<String>,
    /// Passed through untouched from the descriptor.
    #[serde(default)]
    pub endpoint_options: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ConnectorSource>,
}

impl CatalogEntry {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Coordinates declared inside the descriptor itself.
    pub fn declared_key(&self) -> ArtifactKey {
        ArtifactKey::new(&self.group_id, &self.artifact_id, &self.version)
    }

    /// Case-insensitive substring match over the searchable fields.
    ///
    /// `needle` must already be lower-cased. Fields are checked in order:
    /// name, description, groupId, artifactId, version, then each label.
    pub fn matches(&self, needle: &str) -> bool {
        [
            &self.name,
            &self.description,
            &self.group_id,
            &self.artifact_id,
            &self.version,
        ]
        .into_iter()
        .chain(self.labels.iter())
        .any(|field| field.to_lowercase().contains(needle))
    }

    /// Option names listed in `endpointOptions`, skipping non-string values.
    pub fn chosen_options(&self) -> IndexSet<&str> {
        self.endpoint_options
            .iter()
            .filter_map(|value| value.as_str())
            .collect()
    }
}
