//! SchemaCatalog port - component JSON schemas by scheme name.
//!
//! The catalog library itself is external; this is the narrow interface the
//! details and option commands need from it.

/// Looks up the JSON schema of a component's configurable options.
pub trait SchemaCatalog: Send + Sync {
    /// `None` when no component is registered under `scheme`.
    fn component_json_schema(&self, scheme: &str) -> Option<String>;

    /// Register (or replace) a custom component schema.
    fn add_component(&self, scheme: &str, json_schema: String);
}

/// Finds custom components (e.g. on a project's classpath) and registers them.
pub trait ComponentDiscovery: Send + Sync {
    /// Returns how many components were registered.
    fn discover_into(&self, catalog: &dyn SchemaCatalog) -> usize;
}
