//! Event catalog and runtime validation of hook input.

pub mod catalog;
pub mod permission;
pub mod schema;
pub mod tools;
pub mod types;
pub mod validator;

pub use catalog::{schema_for, EVENT_NAME_FIELD};
pub use permission::{
    PermissionBehavior, PermissionMode, PermissionRuleValue, PermissionUpdate,
    PermissionUpdateDestination,
};
pub use schema::{FieldKind, FieldSpec, ObjectSchema, ValidationIssue, VariantSchema};
pub use tools::{ToolRegistry, ToolSchema};
pub use types::{
    CommonInput, CompactTrigger, HookInput, NotificationInput, PermissionRequestInput,
    PostToolUseFailureInput, PostToolUseInput, PreCompactInput, PreToolUseInput,
    SessionEndInput, SessionStartInput, SessionStartSource, StopInput, SubagentStartInput,
    SubagentStopInput, UserPromptSubmitInput,
};
pub use validator::Validator;
