//! Tools the template agent can call.
//!
//! There is one: [`cloudformation_schema::SchemaLookupTool`], which answers
//! "what does this resource type accept?" from the local schema corpus.

pub mod cloudformation_schema;

use stackwright_core::tool::ToolRegistry;
use stackwright_schema::SchemaIndexHandle;

pub use cloudformation_schema::SchemaLookupTool;

/// Registry with every tool the template agent may use.
pub fn default_registry(index: SchemaIndexHandle) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SchemaLookupTool::new(index)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_schema_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(SchemaIndexHandle::lazy(dir.path()));
        assert_eq!(registry.names(), vec!["get_cloudformation_schema"]);
        assert_eq!(registry.definitions().len(), 1);
    }
}
