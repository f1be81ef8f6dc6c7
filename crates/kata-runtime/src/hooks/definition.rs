use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;

use super::events::HookEvent;
use super::hook::{FnHandler, HookHandler, ShouldRun};
use crate::context::{HookContext, HookResponse};
use crate::error::DefinitionError;
use crate::input::ToolRegistry;

/// How much of an event a hook subscribes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerScope {
    /// Every input of the event
    All,
    /// Only inputs whose `tool_name` is listed
    Tools(BTreeSet<String>),
}

/// Set of events (and optionally tools) a hook subscribes to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookTrigger {
    events: BTreeMap<HookEvent, TriggerScope>,
}

impl HookTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every input of `event`
    pub fn on(mut self, event: HookEvent) -> Self {
        self.events.insert(event, TriggerScope::All);
        self
    }

    /// Subscribe to `event` only for the named tools
    pub fn on_tools<I, S>(mut self, event: HookEvent, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tools = tools.into_iter().map(Into::<String>::into);
        match self.events.get_mut(&event) {
            // already subscribed to everything
            Some(TriggerScope::All) => {}
            Some(TriggerScope::Tools(existing)) => existing.extend(tools),
            None => {
                self.events
                    .insert(event, TriggerScope::Tools(tools.collect()));
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn scope(&self, event: HookEvent) -> Option<&TriggerScope> {
        self.events.get(&event)
    }

    pub fn events(&self) -> impl Iterator<Item = HookEvent> + '_ {
        self.events.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HookEvent, &TriggerScope)> {
        self.events.iter().map(|(event, scope)| (*event, scope))
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.events.is_empty() {
            return Err(DefinitionError::EmptyTrigger);
        }
        for (event, scope) in &self.events {
            if let TriggerScope::Tools(tools) = scope {
                if !event.is_tool_event() {
                    return Err(DefinitionError::ToolScopeOnNonToolEvent(*event));
                }
                if tools.is_empty() {
                    return Err(DefinitionError::EmptyToolScope(*event));
                }
            }
        }
        Ok(())
    }
}

/// Trigger, handler and gate for one hook executable
#[derive(Clone)]
pub struct HookDefinition {
    trigger: HookTrigger,
    handler: Arc<dyn HookHandler>,
    should_run: ShouldRun,
    tools: Arc<ToolRegistry>,
}

/// Declare a hook from an async closure. Fails when the trigger subscribes to nothing.
pub fn define_hook<F, Fut>(trigger: HookTrigger, handler: F) -> Result<HookDefinition, DefinitionError>
where
    F: Fn(HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HookResponse>> + Send + 'static,
{
    define_hook_handler(trigger, FnHandler(handler))
}

/// Declare a hook from a [`HookHandler`] implementation
pub fn define_hook_handler<H>(trigger: HookTrigger, handler: H) -> Result<HookDefinition, DefinitionError>
where
    H: HookHandler + 'static,
{
    trigger.validate()?;
    Ok(HookDefinition {
        trigger,
        handler: Arc::new(handler),
        should_run: ShouldRun::default(),
        tools: ToolRegistry::global(),
    })
}

impl HookDefinition {
    /// Fixed gate; `false` skips the hook without reading stdin
    pub fn should_run(mut self, run: bool) -> Self {
        self.should_run = ShouldRun::Fixed(run);
        self
    }

    /// Gate evaluated once per invocation, before stdin is read
    pub fn should_run_when<F, Fut>(mut self, predicate: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.should_run = ShouldRun::when(predicate);
        self
    }

    /// Use `tools` instead of the global registry for tool narrowing
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    pub fn trigger(&self) -> &HookTrigger {
        &self.trigger
    }

    pub fn handler(&self) -> &dyn HookHandler {
        self.handler.as_ref()
    }

    pub fn gate(&self) -> &ShouldRun {
        &self.should_run
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

impl fmt::Debug for HookDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDefinition")
            .field("trigger", &self.trigger)
            .field("should_run", &self.should_run)
            .finish_non_exhaustive()
    }
}
