//! Input shapes for every supported hook event.
//!
//! Each schema carries the common fields plus `hook_event_name` pinned to the
//! event's own wire name, so the discriminant always agrees with the schema it
//! selects.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::permission::permission_update_kind;
use super::schema::{FieldKind, ObjectSchema};
use crate::hooks::HookEvent;

/// Discriminant field present on every input
pub const EVENT_NAME_FIELD: &str = "hook_event_name";

static SCHEMAS: Lazy<HashMap<HookEvent, ObjectSchema>> = Lazy::new(|| {
    HookEvent::ALL
        .into_iter()
        .map(|event| (event, build_schema(event)))
        .collect()
});

/// Input schema registered for `event`
pub fn schema_for(event: HookEvent) -> &'static ObjectSchema {
    // every HookEvent is inserted above
    &SCHEMAS[&event]
}

/// Fields shared by all events (without the discriminant)
pub fn common_fields() -> ObjectSchema {
    ObjectSchema::new()
        .field("cwd", FieldKind::String)
        .optional("permission_mode", FieldKind::String)
        .field("session_id", FieldKind::String)
        .field("transcript_path", FieldKind::String)
}

fn build_schema(event: HookEvent) -> ObjectSchema {
    common_fields()
        .field(EVENT_NAME_FIELD, FieldKind::literal(event.as_str()))
        .extend(&event_fields(event))
}

fn event_fields(event: HookEvent) -> ObjectSchema {
    let fields = ObjectSchema::new();
    match event {
        HookEvent::PreToolUse => fields
            .field("tool_name", FieldKind::String)
            .optional("tool_input", FieldKind::Any)
            .field("tool_use_id", FieldKind::String),
        HookEvent::PostToolUse => fields
            .field("tool_name", FieldKind::String)
            .optional("tool_input", FieldKind::Any)
            .optional("tool_response", FieldKind::Any)
            .field("tool_use_id", FieldKind::String),
        HookEvent::PostToolUseFailure => fields
            .field("tool_name", FieldKind::String)
            .optional("tool_input", FieldKind::Any)
            .field("tool_use_id", FieldKind::String)
            .field("error", FieldKind::String)
            .optional("is_interrupt", FieldKind::Boolean),
        HookEvent::Notification => fields
            .field("message", FieldKind::String)
            .field("notification_type", FieldKind::String)
            .optional("title", FieldKind::String),
        HookEvent::UserPromptSubmit => fields.field("prompt", FieldKind::String),
        HookEvent::SessionStart => fields.field(
            "source",
            FieldKind::one_of(["startup", "resume", "clear", "compact"]),
        ),
        HookEvent::SessionEnd => fields.field("reason", FieldKind::String),
        HookEvent::Stop => fields.field("stop_hook_active", FieldKind::Boolean),
        HookEvent::SubagentStart => fields
            .field("agent_id", FieldKind::String)
            .field("agent_type", FieldKind::String),
        HookEvent::SubagentStop => fields
            .field("agent_id", FieldKind::String)
            .field("agent_transcript_path", FieldKind::String)
            .field("stop_hook_active", FieldKind::Boolean),
        HookEvent::PreCompact => fields
            .field("custom_instructions", FieldKind::nullable(FieldKind::String))
            .field("trigger", FieldKind::one_of(["manual", "auto"])),
        HookEvent::PermissionRequest => fields
            .field("tool_name", FieldKind::String)
            .optional("tool_input", FieldKind::Any)
            .optional(
                "permission_suggestions",
                FieldKind::array_of(permission_update_kind()),
            ),
    }
}
