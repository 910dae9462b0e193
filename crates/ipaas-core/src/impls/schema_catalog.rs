//! InMemorySchemaCatalog - scheme -> component JSON schema map.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::ports::SchemaCatalog;

/// Component schemas held in memory.
///
/// Interior mutability lets discovery register components through a shared
/// reference, the same way custom components are added to a live catalog.
#[derive(Default)]
pub struct InMemorySchemaCatalog {
    schemas: RwLock<HashMap<String, String>>,
}

impl InMemorySchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(self, scheme: &str, json_schema: impl Into<String>) -> Self {
        self.schemas
            .write()
            .insert(scheme.to_string(), json_schema.into());
        self
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

impl SchemaCatalog for InMemorySchemaCatalog {
    fn component_json_schema(&self, scheme: &str) -> Option<String> {
        self.schemas.read().get(scheme).cloned()
    }

    fn add_component(&self, scheme: &str, json_schema: String) {
        self.schemas.write().insert(scheme.to_string(), json_schema);
    }
}
