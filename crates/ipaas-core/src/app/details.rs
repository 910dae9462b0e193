//! Connector details - component schema lookup with classpath discovery fallback.

use thiserror::Error;
use tracing::debug;

use crate::ports::{ComponentDiscovery, SchemaCatalog};

#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("Connector {0} not found")]
    NotFound(String),
}

/// Component schema for `scheme`.
///
/// When the catalog does not know the scheme and a discovery source is
/// available, discovery registers the custom components it finds and the
/// lookup is repeated once.
pub fn resolve_schema(
    catalog: &dyn SchemaCatalog,
    discovery: Option<&dyn ComponentDiscovery>,
    scheme: &str,
) -> Option<String> {
    if let Some(json) = catalog.component_json_schema(scheme) {
        return Some(json);
    }

    let discovery = discovery?;
    let registered = discovery.discover_into(catalog);
    debug!(scheme, registered, "discovered custom components");
    catalog.component_json_schema(scheme)
}

/// The connector's component schema as JSON text.
pub fn connector_details(
    catalog: &dyn SchemaCatalog,
    discovery: Option<&dyn ComponentDiscovery>,
    scheme: &str,
) -> Result<String, DetailsError> {
    resolve_schema(catalog, discovery, scheme)
        .ok_or_else(|| DetailsError::NotFound(scheme.to_string()))
}
