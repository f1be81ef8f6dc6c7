//! Kata hook SDK
//!
//! Re-exports everything a hook executable needs. A hook crate is a binary
//! whose `main` is generated by [`hook_main!`]:
//!
//! ```ignore
//! use kata_sdk::prelude::*;
//!
//! hook_main!(define_hook(
//!     HookTrigger::new().on(HookEvent::SessionStart),
//!     |ctx| async move { Ok(ctx.success_with(SuccessPayload::new().message("Welcome"))) },
//! ));
//! ```

pub use anyhow;
pub use async_trait::async_trait;
pub use kata_runtime;
pub use serde_json::Value;
pub use tokio;

pub use kata_runtime::{
    define_hook, define_hook_handler, init_logging, load_config, run_hook, run_hook_with_config,
    DefinitionError, EngineConfig, HookContext, HookDefinition, HookEvent, HookExit, HookHandler,
    HookInput, HookOutput, HookResponse, HookRuntime, HookSpecificOutput, HookTrigger,
    PermissionDecision, SuccessPayload, ToolRegistry, ToolSchema,
};

pub mod prelude {
    pub use crate::hook_main;
    pub use anyhow::{anyhow, bail, Context as _, Result};
    pub use async_trait::async_trait;
    pub use kata_runtime::input::{FieldKind, ObjectSchema};
    pub use kata_runtime::{
        define_hook, define_hook_handler, Decision, HookContext, HookDefinition, HookEvent,
        HookHandler, HookInput, HookOutput, HookResponse, HookSpecificOutput, HookTrigger,
        PermissionDecision, PermissionRequestDecision, SuccessPayload, ToolRegistry, ToolSchema,
    };
    pub use serde_json::{json, Value};
}

/// Run a hook definition on the process's stdio and exit with its code.
///
/// A definition error exits 1 with the error on stderr, like any other hook failure.
pub fn block_on_hook(definition: Result<HookDefinition, DefinitionError>) -> ! {
    init_logging();
    let definition = match definition {
        Ok(definition) => definition,
        Err(e) => fail(&e),
    };
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => fail(&e),
    };
    runtime.block_on(run_hook(definition));
    // run_hook exits the process itself
    std::process::exit(HookExit::Success.code())
}

fn fail(err: &dyn std::fmt::Display) -> ! {
    eprintln!("Error in hook: {}", err);
    std::process::exit(HookExit::NonBlockingError.code())
}

/// Generate `fn main` for a hook executable from a `define_hook(..)` expression
#[macro_export]
macro_rules! hook_main {
    ($definition:expr $(,)?) => {
        fn main() {
            $crate::block_on_hook($definition)
        }
    };
}
