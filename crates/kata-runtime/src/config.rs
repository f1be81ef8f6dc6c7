use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hooks::HookEvent;

/// Engine settings for one hook executable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Added to a deferred hook's own timeout before the engine gives up on it
    #[serde(default = "default_deferred_grace_ms")]
    pub deferred_grace_ms: u64,

    /// Events whose success path writes `additional_claude_context` to stdout
    #[serde(default = "default_context_events")]
    pub context_events: BTreeSet<HookEvent>,
}

fn default_deferred_grace_ms() -> u64 {
    5000
}

fn default_context_events() -> BTreeSet<HookEvent> {
    [HookEvent::UserPromptSubmit, HookEvent::SessionStart]
        .into_iter()
        .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deferred_grace_ms: default_deferred_grace_ms(),
            context_events: default_context_events(),
        }
    }
}

impl EngineConfig {
    pub fn accepts_context(&self, event: HookEvent) -> bool {
        self.context_events.contains(&event)
    }
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content =
        fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).context("Failed to parse TOML config")
}
