pub mod definition;
pub mod events;
pub mod hook;

pub use definition::{define_hook, define_hook_handler, HookDefinition, HookTrigger, TriggerScope};
pub use events::{HookEvent, UnknownHookEvent};
pub use hook::{FnHandler, GateFn, HookHandler, ShouldRun};
