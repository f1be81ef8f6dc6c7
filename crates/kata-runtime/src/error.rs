use std::fmt;

use thiserror::Error;

use crate::hooks::HookEvent;
use crate::input::ValidationIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// stdin was not parseable JSON
    InvalidJson,
    /// JSON did not match any schema the trigger subscribes to
    SchemaMismatch,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::InvalidJson => f.write_str("invalid JSON"),
            ValidationErrorKind::SchemaMismatch => f.write_str("schema mismatch"),
        }
    }
}

/// Hook input rejected before any handler state was built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid hook input ({}): {}", describe_kind(.kind, .event), join_issues(.issues))]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Event selected by `hook_event_name`, when one was recognised
    pub event: Option<HookEvent>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub(crate) fn invalid_json(err: &serde_json::Error) -> Self {
        Self {
            kind: ValidationErrorKind::InvalidJson,
            event: None,
            issues: vec![ValidationIssue::new("", err.to_string())],
        }
    }

    pub(crate) fn schema_mismatch(event: Option<HookEvent>, issues: Vec<ValidationIssue>) -> Self {
        Self {
            kind: ValidationErrorKind::SchemaMismatch,
            event,
            issues,
        }
    }

    /// Paths of every failing field
    pub fn paths(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.path.as_str()).collect()
    }
}

fn describe_kind(kind: &ValidationErrorKind, event: &Option<HookEvent>) -> String {
    match event {
        Some(event) => format!("{} for {}", kind, event),
        None => kind.to_string(),
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Structural problems in a hook definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("hook trigger must subscribe to at least one event")]
    EmptyTrigger,
    #[error("{0} does not carry a tool name; subscribe to the whole event instead")]
    ToolScopeOnNonToolEvent(HookEvent),
    #[error("tool subscription for {0} names no tools")]
    EmptyToolScope(HookEvent),
}

/// Structured output whose event differs from the hook's input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{output} output cannot be returned from a {event} hook")]
pub struct OutputMismatch {
    pub event: HookEvent,
    pub output: HookEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_lists_paths() {
        let err = ValidationError::schema_mismatch(
            Some(HookEvent::PreToolUse),
            vec![
                ValidationIssue::new("tool_name", "expected string, received number"),
                ValidationIssue::new("tool_use_id", "missing required field"),
            ],
        );
        assert_eq!(
            err.to_string(),
            "Invalid hook input (schema mismatch for PreToolUse): \
             tool_name: expected string, received number; tool_use_id: missing required field"
        );
        assert_eq!(err.paths(), vec!["tool_name", "tool_use_id"]);
    }

    #[test]
    fn test_invalid_json_message() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ValidationError::invalid_json(&json_err);
        assert_eq!(err.kind, ValidationErrorKind::InvalidJson);
        assert!(err.to_string().starts_with("Invalid hook input (invalid JSON): EOF"));
    }
}
