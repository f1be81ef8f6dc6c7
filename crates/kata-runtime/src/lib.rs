pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod input;
pub mod output;

pub use config::{load_config, EngineConfig};
pub use context::{DeferredHook, DeferredRun, HookContext, HookResponse, SuccessPayload};
pub use engine::{run_hook, run_hook_with_config, HookExit, HookRuntime};
pub use error::{DefinitionError, OutputMismatch, ValidationError, ValidationErrorKind};
pub use hooks::{
    define_hook, define_hook_handler, HookDefinition, HookEvent, HookHandler, HookTrigger,
    ShouldRun, TriggerScope,
};
pub use input::{HookInput, ToolRegistry, ToolSchema, Validator};
pub use output::{
    AsyncAnnouncement, Decision, HookOutput, HookSpecificOutput, PermissionDecision,
    PermissionRequestDecision,
};

/// Initialize structured JSON logging on stderr.
///
/// Silent unless `RUST_LOG` is set: stdout and stderr carry the hook protocol.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
