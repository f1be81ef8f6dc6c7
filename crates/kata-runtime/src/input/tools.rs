use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::schema::{FieldKind, ObjectSchema};

/// Input/response shapes for one tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub input: ObjectSchema,
    /// `None` leaves `tool_response` unchecked
    pub response: Option<FieldKind>,
}

impl ToolSchema {
    pub fn new(input: ObjectSchema) -> Self {
        Self {
            input,
            response: None,
        }
    }

    pub fn with_response(mut self, response: FieldKind) -> Self {
        self.response = Some(response);
        self
    }
}

static GLOBAL: Lazy<Arc<ToolRegistry>> = Lazy::new(|| Arc::new(ToolRegistry::with_builtin_tools()));

/// Registry of tool schemas used to narrow tool-event inputs.
/// Tools missing from the registry keep an untyped `tool_input`.
pub struct ToolRegistry {
    tools: DashMap<String, ToolSchema>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Registry seeded with the host's built-in tools
    pub fn with_builtin_tools() -> Self {
        let registry = Self::new();
        for (name, schema) in builtin_tools() {
            registry.register(name, schema);
        }
        registry
    }

    /// Process-wide registry; register custom tools here before running a hook
    pub fn global() -> Arc<ToolRegistry> {
        GLOBAL.clone()
    }

    /// Register (or replace) a tool schema
    pub fn register(&self, name: impl Into<String>, schema: ToolSchema) {
        self.tools.insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<ToolSchema> {
        self.tools.get(name).map(|s| s.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_tools() -> Vec<(&'static str, ToolSchema)> {
    vec![
        (
            "Read",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("file_path", FieldKind::String)
                    .optional("offset", FieldKind::Number)
                    .optional("limit", FieldKind::Number),
            ),
        ),
        (
            "Write",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("file_path", FieldKind::String)
                    .field("content", FieldKind::String),
            ),
        ),
        (
            "Edit",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("file_path", FieldKind::String)
                    .field("old_string", FieldKind::String)
                    .field("new_string", FieldKind::String)
                    .optional("replace_all", FieldKind::Boolean),
            ),
        ),
        (
            "Bash",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("command", FieldKind::String)
                    .optional("description", FieldKind::String)
                    .optional("timeout", FieldKind::Number)
                    .optional("run_in_background", FieldKind::Boolean),
            ),
        ),
        (
            "Glob",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("pattern", FieldKind::String)
                    .optional("path", FieldKind::String),
            ),
        ),
        (
            "Grep",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("pattern", FieldKind::String)
                    .optional("path", FieldKind::String)
                    .optional("glob", FieldKind::String)
                    .optional("output_mode", FieldKind::one_of(["content", "files_with_matches", "count"])),
            ),
        ),
        (
            "WebFetch",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("prompt", FieldKind::String)
                    .field("url", FieldKind::String),
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_tools_registered() {
        let registry = ToolRegistry::with_builtin_tools();
        assert!(registry.contains("Read"));
        assert!(registry.contains("WebFetch"));
        assert!(!registry.contains("MyCustomTool"));
        assert_eq!(registry.names().len(), 7);
    }

    #[test]
    fn test_register_custom_tool() {
        let registry = ToolRegistry::new();
        registry.register(
            "MyCustomTool",
            ToolSchema::new(
                ObjectSchema::new()
                    .field("customParam", FieldKind::String)
                    .optional("optionalParam", FieldKind::Number),
            )
            .with_response(FieldKind::Object(
                ObjectSchema::new().field("success", FieldKind::Boolean),
            )),
        );

        let schema = registry.get("MyCustomTool").unwrap();
        assert!(schema.input.validate(&json!({"customParam": "x"})).is_empty());
        assert_eq!(schema.input.validate(&json!({"optionalParam": 1})).len(), 1);
        assert!(schema.response.is_some());
    }

    #[test]
    fn test_global_registry_is_shared() {
        ToolRegistry::global().register("GlobalProbeTool", ToolSchema::new(ObjectSchema::new()));
        assert!(ToolRegistry::global().contains("GlobalProbeTool"));
    }
}
