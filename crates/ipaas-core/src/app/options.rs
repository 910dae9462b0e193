//! Option pages - splits a connector's endpoint options into wizard pages.
//!
//! Options come from the `properties` object of the component schema, in
//! document order. They are grouped by their `group` attribute and every
//! group is cut into pages of at most `max_options` entries. Rendering the
//! pages is up to the UI.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::app::details::resolve_schema;
use crate::domain::{CatalogEntry, ConnectorSource};
use crate::ports::{ComponentDiscovery, SchemaCatalog};

pub const MAX_OPTIONS: usize = 20;

const DEFAULT_GROUP: &str = "common";

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("connector {0} has no baseScheme")]
    MissingBaseScheme(String),

    #[error("component {0} not found")]
    ComponentNotFound(String),

    #[error("malformed component schema for {scheme}: {source}")]
    Schema {
        scheme: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("component schema for {0} has no properties object")]
    MissingProperties(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointOption {
    pub name: String,
    pub group: String,
    pub kind: Option<String>,
    pub label: Option<String>,
    pub required: bool,
    pub java_type: Option<String>,
    pub default_value: Option<String>,
    pub description: Option<String>,
    /// Already enabled in the connector's `endpointOptions`.
    pub chosen: bool,
}

impl EndpointOption {
    fn from_schema(name: &str, attrs: &Value, chosen: bool) -> Self {
        let text = |key: &str| attrs.get(key).and_then(value_text);
        Self {
            name: name.to_string(),
            group: text("group").unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            kind: text("kind"),
            label: text("label"),
            required: attrs.get("required").is_some_and(is_true),
            java_type: text("javaType"),
            default_value: text("defaultValue"),
            description: text("description"),
            chosen,
        }
    }

    fn has_label(&self, wanted: &str) -> bool {
        self.label
            .as_deref()
            .is_some_and(|label| label.split(',').any(|l| l.trim() == wanted))
    }

    /// Whether the option applies given the connector's route side.
    fn applies_to(&self, source: Option<ConnectorSource>) -> bool {
        match source {
            Some(ConnectorSource::From) => {
                !(self.has_label("producer") && !self.has_label("consumer"))
            }
            Some(ConnectorSource::To) => {
                !(self.has_label("consumer") && !self.has_label("producer"))
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionPage {
    /// 0-based.
    pub index: usize,
    pub total: usize,
    pub last: bool,
    pub group: String,
    pub options: Vec<EndpointOption>,
}

/// Pages for a catalog entry, resolving its `baseScheme` through the catalog.
pub fn plan_connector_pages(
    entry: &CatalogEntry,
    catalog: &dyn SchemaCatalog,
    discovery: Option<&dyn ComponentDiscovery>,
    max_options: usize,
) -> Result<Vec<OptionPage>, OptionsError> {
    let scheme = entry
        .base_scheme
        .as_deref()
        .ok_or_else(|| OptionsError::MissingBaseScheme(entry.name.clone()))?;
    let schema = resolve_schema(catalog, discovery, scheme)
        .ok_or_else(|| OptionsError::ComponentNotFound(scheme.to_string()))?;
    plan_option_pages(scheme, &schema, entry, max_options)
}

pub fn plan_option_pages(
    scheme: &str,
    schema_json: &str,
    entry: &CatalogEntry,
    max_options: usize,
) -> Result<Vec<OptionPage>, OptionsError> {
    let schema: Value = serde_json::from_str(schema_json).map_err(|source| OptionsError::Schema {
        scheme: scheme.to_string(),
        source,
    })?;
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| OptionsError::MissingProperties(scheme.to_string()))?;

    let chosen = entry.chosen_options();
    let mut groups: IndexMap<String, Vec<EndpointOption>> = IndexMap::new();
    for (name, attrs) in properties {
        let option = EndpointOption::from_schema(name, attrs, chosen.contains(name.as_str()));
        if option.applies_to(entry.source) {
            groups.entry(option.group.clone()).or_default().push(option);
        }
    }

    let per_page = max_options.max(1);
    let chunks: Vec<(String, Vec<EndpointOption>)> = groups
        .into_iter()
        .flat_map(|(group, options)| {
            options
                .chunks(per_page)
                .map(|chunk| (group.clone(), chunk.to_vec()))
                .collect::<Vec<_>>()
        })
        .collect();

    let total = chunks.len();
    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(index, (group, options))| OptionPage {
            index,
            total,
            last: index + 1 == total,
            group,
            options,
        })
        .collect())
}

/// Schema attributes are strings in older catalogs and typed in newer ones.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn is_true(value: &Value) -> bool {
    value.as_bool().unwrap_or(false) || value.as_str() == Some("true")
}
