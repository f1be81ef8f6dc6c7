use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use super::catalog::{schema_for, EVENT_NAME_FIELD};
use super::schema::{FieldKind, ObjectSchema, ValidationIssue};
use super::tools::{ToolRegistry, ToolSchema};
use super::types::HookInput;
use crate::error::ValidationError;
use crate::hooks::{HookEvent, HookTrigger, TriggerScope};

/// One accepted event of the union
struct Branch {
    event: HookEvent,
    schema: &'static ObjectSchema,
    /// `None` when every tool is accepted
    tools: Option<BTreeSet<String>>,
    /// Schemas of the subscribed tools known to the registry
    tool_schemas: Vec<(String, ToolSchema)>,
}

/// Tagged union over the input schemas a trigger subscribes to
pub struct Validator {
    branches: Vec<Branch>,
}

impl Validator {
    /// Build the union for `trigger`, snapshotting tool schemas from `tools`
    pub fn new(trigger: &HookTrigger, tools: &ToolRegistry) -> Self {
        let branches = trigger
            .iter()
            .map(|(event, scope)| {
                let (names, tool_schemas) = match scope {
                    TriggerScope::All => (None, Vec::new()),
                    TriggerScope::Tools(names) => {
                        let schemas = names
                            .iter()
                            .filter_map(|name| tools.get(name).map(|s| (name.clone(), s)))
                            .collect();
                        (Some(names.clone()), schemas)
                    }
                };
                Branch {
                    event,
                    schema: schema_for(event),
                    tools: names,
                    tool_schemas,
                }
            })
            .collect();

        Self { branches }
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.branches.iter().map(|b| b.event).collect()
    }

    /// Parse raw stdin bytes into a validated input
    pub fn parse(&self, raw: &[u8]) -> Result<HookInput, ValidationError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| ValidationError::invalid_json(&e))?;
        self.parse_value(value)
    }

    pub fn parse_value(&self, value: Value) -> Result<HookInput, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::schema_mismatch(
                None,
                vec![ValidationIssue::new(
                    "",
                    format!("expected object, received {}", json_type(&value)),
                )],
            ));
        }

        let branch = self.select(&value)?;
        let mut issues = branch.schema.validate(&value);
        if issues.is_empty() {
            branch.narrow(&value, &mut issues);
        }
        if !issues.is_empty() {
            return Err(ValidationError::schema_mismatch(Some(branch.event), issues));
        }

        let input: HookInput = serde_json::from_value(value).map_err(|e| {
            ValidationError::schema_mismatch(
                Some(branch.event),
                vec![ValidationIssue::new("", e.to_string())],
            )
        })?;
        debug!(event = %input.event(), "Hook input matched schema");
        Ok(input)
    }

    fn select(&self, value: &Value) -> Result<&Branch, ValidationError> {
        let tag = value.get(EVENT_NAME_FIELD);
        let selected = tag
            .and_then(Value::as_str)
            .and_then(|name| self.branches.iter().find(|b| b.event.as_str() == name));

        selected.ok_or_else(|| {
            let message = match tag {
                None => "missing required field".to_string(),
                Some(tag) => {
                    let expected = self
                        .branches
                        .iter()
                        .map(|b| format!("\"{}\"", b.event))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    let received = match tag.as_str() {
                        Some(name) => format!("\"{}\"", name),
                        None => json_type(tag).to_string(),
                    };
                    format!("expected one of {}, received {}", expected, received)
                }
            };
            ValidationError::schema_mismatch(
                None,
                vec![ValidationIssue::new(EVENT_NAME_FIELD, message)],
            )
        })
    }
}

impl Branch {
    /// Apply tool-level restrictions on an input that already matched the event schema
    fn narrow(&self, value: &Value, issues: &mut Vec<ValidationIssue>) {
        let Some(names) = &self.tools else {
            return;
        };
        // the event schema guarantees a string here
        let tool_name = value.get("tool_name").and_then(Value::as_str).unwrap_or_default();

        if !names.contains(tool_name) {
            let expected = names
                .iter()
                .map(|n| format!("\"{}\"", n))
                .collect::<Vec<_>>()
                .join(" | ");
            issues.push(ValidationIssue::new(
                "tool_name",
                format!("expected one of {}, received \"{}\"", expected, tool_name),
            ));
            return;
        }

        let Some((_, tool)) = self.tool_schemas.iter().find(|(name, _)| name == tool_name) else {
            return;
        };
        let tool_input = value.get("tool_input").unwrap_or(&Value::Null);
        FieldKind::Object(tool.input.clone()).check(tool_input, "tool_input", issues);

        if self.event == HookEvent::PostToolUse {
            if let Some(response) = &tool.response {
                let tool_response = value.get("tool_response").unwrap_or(&Value::Null);
                response.check(tool_response, "tool_response", issues);
            }
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
