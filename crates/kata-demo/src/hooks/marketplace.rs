use kata_sdk::prelude::*;
use tokio::process::Command;
use tracing::debug;

/// SessionStart hook: refresh the plugin marketplace without holding up startup
pub fn definition(program: String) -> Result<HookDefinition, kata_sdk::DefinitionError> {
    define_hook(HookTrigger::new().on(HookEvent::SessionStart), move |ctx| {
        let program = program.clone();
        async move { Ok(ctx.defer(move || update_marketplace(program))) }
    })
}

async fn update_marketplace(program: String) -> Result<HookOutput> {
    debug!(program = %program, "Updating plugin marketplace");
    let output = Command::new(&program)
        .args(["plugin", "marketplace", "update"])
        .output()
        .await
        .with_context(|| format!("Failed to launch {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Ok(HookOutput::new().system_message(format!(
            "Failed to update plugin marketplace: {}",
            stderr.trim_end()
        )));
    }
    Ok(HookOutput::new().system_message("Updated plugin marketplace successfully!"))
}
