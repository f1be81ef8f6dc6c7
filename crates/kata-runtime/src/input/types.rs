use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::permission::PermissionUpdate;
use crate::hooks::HookEvent;

/// Fields the host sends with every event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonInput {
    pub cwd: String,
    pub session_id: String,
    pub transcript_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreToolUseInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    pub tool_use_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostToolUseInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub tool_response: Value,
    pub tool_use_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostToolUseFailureInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    pub tool_use_id: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_interrupt: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub message: String,
    pub notification_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPromptSubmitInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStartSource {
    Startup,
    Resume,
    Clear,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStartInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub source: SessionStartSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEndInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub stop_hook_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubagentStartInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub agent_id: String,
    pub agent_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubagentStopInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub agent_id: String,
    pub agent_transcript_path: String,
    pub stop_hook_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactTrigger {
    Manual,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreCompactInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub custom_instructions: Option<String>,
    pub trigger: CompactTrigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionRequestInput {
    #[serde(flatten)]
    pub common: CommonInput,
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_suggestions: Option<Vec<PermissionUpdate>>,
}

/// Validated input for exactly one event, discriminated by `hook_event_name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hook_event_name")]
pub enum HookInput {
    PreToolUse(PreToolUseInput),
    PostToolUse(PostToolUseInput),
    PostToolUseFailure(PostToolUseFailureInput),
    Notification(NotificationInput),
    UserPromptSubmit(UserPromptSubmitInput),
    SessionStart(SessionStartInput),
    SessionEnd(SessionEndInput),
    Stop(StopInput),
    SubagentStart(SubagentStartInput),
    SubagentStop(SubagentStopInput),
    PreCompact(PreCompactInput),
    PermissionRequest(PermissionRequestInput),
}

impl HookInput {
    pub fn event(&self) -> HookEvent {
        match self {
            HookInput::PreToolUse(_) => HookEvent::PreToolUse,
            HookInput::PostToolUse(_) => HookEvent::PostToolUse,
            HookInput::PostToolUseFailure(_) => HookEvent::PostToolUseFailure,
            HookInput::Notification(_) => HookEvent::Notification,
            HookInput::UserPromptSubmit(_) => HookEvent::UserPromptSubmit,
            HookInput::SessionStart(_) => HookEvent::SessionStart,
            HookInput::SessionEnd(_) => HookEvent::SessionEnd,
            HookInput::Stop(_) => HookEvent::Stop,
            HookInput::SubagentStart(_) => HookEvent::SubagentStart,
            HookInput::SubagentStop(_) => HookEvent::SubagentStop,
            HookInput::PreCompact(_) => HookEvent::PreCompact,
            HookInput::PermissionRequest(_) => HookEvent::PermissionRequest,
        }
    }

    pub fn common(&self) -> &CommonInput {
        match self {
            HookInput::PreToolUse(i) => &i.common,
            HookInput::PostToolUse(i) => &i.common,
            HookInput::PostToolUseFailure(i) => &i.common,
            HookInput::Notification(i) => &i.common,
            HookInput::UserPromptSubmit(i) => &i.common,
            HookInput::SessionStart(i) => &i.common,
            HookInput::SessionEnd(i) => &i.common,
            HookInput::Stop(i) => &i.common,
            HookInput::SubagentStart(i) => &i.common,
            HookInput::SubagentStop(i) => &i.common,
            HookInput::PreCompact(i) => &i.common,
            HookInput::PermissionRequest(i) => &i.common,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.common().session_id
    }

    /// Tool name for tool events
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            HookInput::PreToolUse(i) => Some(&i.tool_name),
            HookInput::PostToolUse(i) => Some(&i.tool_name),
            HookInput::PostToolUseFailure(i) => Some(&i.tool_name),
            HookInput::PermissionRequest(i) => Some(&i.tool_name),
            _ => None,
        }
    }

    /// Raw `tool_input` for tool events
    pub fn tool_input(&self) -> Option<&Value> {
        match self {
            HookInput::PreToolUse(i) => Some(&i.tool_input),
            HookInput::PostToolUse(i) => Some(&i.tool_input),
            HookInput::PostToolUseFailure(i) => Some(&i.tool_input),
            HookInput::PermissionRequest(i) => Some(&i.tool_input),
            _ => None,
        }
    }

    /// Decode `tool_input` into a tool-specific type
    pub fn tool_input_as<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self
            .tool_input()
            .ok_or_else(|| anyhow!("{} input carries no tool_input", self.event()))?;
        serde_json::from_value(raw.clone()).context(format!(
            "tool_input of {} does not match the requested type",
            self.tool_name().unwrap_or_default()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct ReadInput {
        file_path: String,
    }

    fn pre_tool_use() -> Value {
        json!({
            "hook_event_name": "PreToolUse",
            "cwd": "/work",
            "session_id": "s-1",
            "transcript_path": "/tmp/t.jsonl",
            "tool_name": "Read",
            "tool_input": {"file_path": "/work/src/main.rs"},
            "tool_use_id": "toolu_01"
        })
    }

    #[test]
    fn test_deserialize_tagged_input() {
        let input: HookInput = serde_json::from_value(pre_tool_use()).unwrap();
        assert_eq!(input.event(), HookEvent::PreToolUse);
        assert_eq!(input.common().cwd, "/work");
        assert_eq!(input.common().permission_mode, None);
        assert_eq!(input.tool_name(), Some("Read"));

        let read: ReadInput = input.tool_input_as().unwrap();
        assert_eq!(read.file_path, "/work/src/main.rs");
    }

    #[test]
    fn test_serialize_preserves_discriminant_and_fields() {
        let input: HookInput = serde_json::from_value(pre_tool_use()).unwrap();
        assert_eq!(serde_json::to_value(&input).unwrap(), pre_tool_use());
    }

    #[test]
    fn test_tool_input_as_on_non_tool_event() {
        let input: HookInput = serde_json::from_value(json!({
            "hook_event_name": "Stop",
            "cwd": "/work",
            "session_id": "s-1",
            "transcript_path": "/tmp/t.jsonl",
            "stop_hook_active": false
        }))
        .unwrap();
        assert!(input.tool_name().is_none());
        let err = input.tool_input_as::<ReadInput>().unwrap_err();
        assert!(err.to_string().contains("Stop input carries no tool_input"));
    }

    #[test]
    fn test_pre_compact_null_instructions() {
        let input: HookInput = serde_json::from_value(json!({
            "hook_event_name": "PreCompact",
            "cwd": "/work",
            "session_id": "s-1",
            "transcript_path": "/tmp/t.jsonl",
            "custom_instructions": null,
            "trigger": "auto"
        }))
        .unwrap();
        match input {
            HookInput::PreCompact(i) => {
                assert_eq!(i.custom_instructions, None);
                assert_eq!(i.trigger, CompactTrigger::Auto);
            }
            other => panic!("unexpected input {:?}", other),
        }
    }
}
