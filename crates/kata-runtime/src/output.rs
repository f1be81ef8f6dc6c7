//! Structured JSON the host reads back from a hook's stdout.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::OutputMismatch;
use crate::hooks::HookEvent;
use crate::input::PermissionUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Block,
}

/// PreToolUse verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionDecision {
    /// Bypass the permission system; reason shown to the user only
    Allow,
    /// Ask the user to confirm in the UI
    Ask,
    /// Prevent the call; reason is fed back to the model
    Deny,
}

/// Answer to a PermissionRequest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "lowercase")]
pub enum PermissionRequestDecision {
    #[serde(rename_all = "camelCase")]
    Allow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        updated_input: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        updated_permissions: Option<Vec<PermissionUpdate>>,
    },
    #[serde(rename_all = "camelCase")]
    Deny {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interrupt: Option<bool>,
    },
}

/// Event-specific part of the output, tagged with `hookEventName`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hookEventName")]
pub enum HookSpecificOutput {
    #[serde(rename_all = "camelCase")]
    PreToolUse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permission_decision: Option<PermissionDecision>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permission_decision_reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        updated_input: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    PostToolUse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_context: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    PostToolUseFailure {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_context: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UserPromptSubmit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_context: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SessionStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_context: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SubagentStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_context: Option<String>,
    },
    PermissionRequest {
        decision: PermissionRequestDecision,
    },
}

impl HookSpecificOutput {
    /// PreToolUse permission verdict with a reason
    pub fn permission(decision: PermissionDecision, reason: impl Into<String>) -> Self {
        HookSpecificOutput::PreToolUse {
            permission_decision: Some(decision),
            permission_decision_reason: Some(reason.into()),
            updated_input: None,
        }
    }

    /// Context for the model, for events that accept it
    pub fn additional_context(event: HookEvent, context: impl Into<String>) -> Option<Self> {
        let additional_context = Some(context.into());
        match event {
            HookEvent::PostToolUse => Some(HookSpecificOutput::PostToolUse { additional_context }),
            HookEvent::PostToolUseFailure => {
                Some(HookSpecificOutput::PostToolUseFailure { additional_context })
            }
            HookEvent::UserPromptSubmit => {
                Some(HookSpecificOutput::UserPromptSubmit { additional_context })
            }
            HookEvent::SessionStart => Some(HookSpecificOutput::SessionStart { additional_context }),
            HookEvent::SubagentStart => Some(HookSpecificOutput::SubagentStart { additional_context }),
            _ => None,
        }
    }

    pub fn event(&self) -> HookEvent {
        match self {
            HookSpecificOutput::PreToolUse { .. } => HookEvent::PreToolUse,
            HookSpecificOutput::PostToolUse { .. } => HookEvent::PostToolUse,
            HookSpecificOutput::PostToolUseFailure { .. } => HookEvent::PostToolUseFailure,
            HookSpecificOutput::UserPromptSubmit { .. } => HookEvent::UserPromptSubmit,
            HookSpecificOutput::SessionStart { .. } => HookEvent::SessionStart,
            HookSpecificOutput::SubagentStart { .. } => HookEvent::SubagentStart,
            HookSpecificOutput::PermissionRequest { .. } => HookEvent::PermissionRequest,
        }
    }
}

/// Advanced hook output, written to stdout as a single JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    /// `false` stops the host after hooks run
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_processing: Option<bool>,
    /// Shown to the user when `continue` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_output: Option<bool>,
    /// Warning shown to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
    /// Keys this crate does not model, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HookOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Stop the host after this hook, showing `reason` to the user
    pub fn stop(mut self, reason: impl Into<String>) -> Self {
        self.continue_processing = Some(false);
        self.stop_reason = Some(reason.into());
        self
    }

    pub fn suppress_output(mut self) -> Self {
        self.suppress_output = Some(true);
        self
    }

    pub fn decision(mut self, decision: Decision, reason: impl Into<String>) -> Self {
        self.decision = Some(decision);
        self.reason = Some(reason.into());
        self
    }

    pub fn hook_specific(mut self, output: HookSpecificOutput) -> Self {
        self.hook_specific_output = Some(output);
        self
    }

    /// Set a raw top-level key
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Reject event-specific output belonging to another event
    pub fn check_event(&self, event: HookEvent) -> Result<(), OutputMismatch> {
        match &self.hook_specific_output {
            Some(specific) if specific.event() != event => Err(OutputMismatch {
                event,
                output: specific.event(),
            }),
            _ => Ok(()),
        }
    }
}

/// First line of a deferred hook: tells the host to continue without waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncAnnouncement {
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_timeout: Option<u64>,
}

impl AsyncAnnouncement {
    pub fn new(timeout_ms: Option<u64>) -> Self {
        Self {
            is_async: true,
            async_timeout: timeout_ms,
        }
    }
}
