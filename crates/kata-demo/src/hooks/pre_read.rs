use kata_sdk::prelude::*;
use serde::Deserialize;

/// Set to any value to disable this hook
pub const SKIP_ENV: &str = "KATA_SKIP_HOOKS";

#[derive(Debug, Deserialize)]
struct ReadInput {
    file_path: String,
}

pub fn definition() -> Result<HookDefinition, kata_sdk::DefinitionError> {
    let hook = define_hook(
        HookTrigger::new().on_tools(HookEvent::PreToolUse, ["Read"]),
        |ctx| async move {
            let input: ReadInput = ctx.input().tool_input_as()?;
            if input.file_path.contains(".env") {
                return Ok(ctx.json(HookOutput::new().hook_specific(
                    HookSpecificOutput::permission(
                        PermissionDecision::Deny,
                        "Access to .env files is restricted.",
                    ),
                ))?);
            }
            Ok(ctx.success())
        },
    )?;
    Ok(hook.should_run_when(|| async { Ok(std::env::var_os(SKIP_ENV).is_none()) }))
}
