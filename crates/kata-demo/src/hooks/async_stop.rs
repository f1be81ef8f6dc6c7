use std::time::Duration;

use kata_sdk::prelude::*;

pub const DONE_MESSAGE: &str = "Stop hook executed after async processing!";

pub fn definition(
    delay_ms: u64,
    timeout_ms: Option<u64>,
) -> Result<HookDefinition, kata_sdk::DefinitionError> {
    define_hook(HookTrigger::new().on(HookEvent::Stop), move |ctx| async move {
        Ok(ctx.json_async(
            move || async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(HookOutput::new().system_message(DONE_MESSAGE))
            },
            timeout_ms,
        ))
    })
}
