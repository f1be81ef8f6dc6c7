//! Drives one hook invocation: gate, read, validate, run, encode.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::FutureExt;
use serde::Serialize;
use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::context::{DeferredHook, HookContext, HookResponse, SuccessPayload};
use crate::hooks::{HookDefinition, HookEvent};
use crate::input::Validator;
use crate::output::{AsyncAnnouncement, HookOutput};

/// Process exit status understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookExit {
    Success = 0,
    /// Shown to the user; the host carries on
    NonBlockingError = 1,
    /// Fed back to the model; the host stops the action
    BlockingError = 2,
}

impl HookExit {
    pub fn code(self) -> i32 {
        self as i32
    }
}

pub struct HookRuntime {
    config: EngineConfig,
}

impl HookRuntime {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `definition` once against the given streams.
    ///
    /// Every failure before encoding becomes a non-blocking error; only a failed
    /// write to `stdout`/`stderr` is returned as `Err`.
    pub async fn execute<R, W, E>(
        &self,
        definition: &HookDefinition,
        stdin: R,
        mut stdout: W,
        mut stderr: E,
    ) -> io::Result<HookExit>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let (event, response) = match self.respond(definition, stdin).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Hook failed");
                (None, HookResponse::NonBlockingError(Some(format!("Error in hook: {:#}", e))))
            }
        };
        debug!(event = ?event, kind = response.kind(), "Encoding hook response");
        self.encode(event, response, &mut stdout, &mut stderr).await
    }

    async fn respond<R>(
        &self,
        definition: &HookDefinition,
        mut stdin: R,
    ) -> Result<(Option<HookEvent>, HookResponse)>
    where
        R: AsyncRead + Unpin,
    {
        let run = AssertUnwindSafe(definition.gate().evaluate())
            .catch_unwind()
            .await
            .map_err(|panic| anyhow!("gate panicked: {}", panic_message(panic.as_ref())))??;
        if !run {
            debug!("Gate closed, skipping hook");
            return Ok((None, HookResponse::Success(SuccessPayload::default())));
        }

        let mut raw = Vec::new();
        stdin
            .read_to_end(&mut raw)
            .await
            .context("Failed to read hook input")?;

        let input = Validator::new(definition.trigger(), definition.tools()).parse(&raw)?;
        let event = input.event();
        debug!(event = %event, "Running handler");

        let response = AssertUnwindSafe(definition.handler().run(HookContext::new(input)))
            .catch_unwind()
            .await
            .map_err(|panic| anyhow!("handler panicked: {}", panic_message(panic.as_ref())))??;
        Ok((Some(event), response))
    }

    async fn encode<W, E>(
        &self,
        event: Option<HookEvent>,
        response: HookResponse,
        stdout: &mut W,
        stderr: &mut E,
    ) -> io::Result<HookExit>
    where
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        match response {
            HookResponse::Success(payload) => {
                let context = event
                    .filter(|event| self.config.accepts_context(*event))
                    .and(non_empty(payload.additional_claude_context));
                if let Some(text) = context.or(non_empty(payload.message_for_user)) {
                    write_line(stdout, &text).await?;
                }
                Ok(HookExit::Success)
            }
            HookResponse::BlockingError(message) => {
                if !message.is_empty() {
                    write_line(stderr, &message).await?;
                }
                Ok(HookExit::BlockingError)
            }
            HookResponse::NonBlockingError(message) => {
                if let Some(message) = non_empty(message) {
                    write_line(stderr, &message).await?;
                }
                Ok(HookExit::NonBlockingError)
            }
            HookResponse::Json(output) => {
                write_json(stdout, &output).await?;
                Ok(HookExit::Success)
            }
            HookResponse::JsonAsync(deferred) => self.settle_deferred(deferred, stdout, stderr).await,
        }
    }

    async fn settle_deferred<W, E>(
        &self,
        deferred: DeferredHook,
        stdout: &mut W,
        stderr: &mut E,
    ) -> io::Result<HookExit>
    where
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let (run, timeout_ms) = deferred.into_parts();
        write_json(stdout, &AsyncAnnouncement::new(timeout_ms)).await?;

        // dropping the handle on timeout detaches the task instead of aborting it
        let task = tokio::spawn(run());
        let outcome = match timeout_ms {
            None => join_deferred(task).await,
            Some(ms) => {
                let limit = Duration::from_millis(ms.saturating_add(self.config.deferred_grace_ms));
                match tokio::time::timeout(limit, join_deferred(task)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(format!("Exceeded user specified timeout: {}ms", ms)),
                }
            }
        };

        match outcome {
            Ok(output) => {
                write_json(stdout, &output).await?;
                Ok(HookExit::Success)
            }
            Err(reason) => {
                warn!(reason = %reason, "Deferred hook failed");
                write_line(stderr, &format!("Async hook execution failed: {}", reason)).await?;
                Ok(HookExit::NonBlockingError)
            }
        }
    }
}

impl Default for HookRuntime {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

async fn join_deferred(task: JoinHandle<Result<HookOutput>>) -> Result<HookOutput, String> {
    match task.await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(e) if e.is_panic() => Err(format!(
            "deferred hook panicked: {}",
            panic_message(e.into_panic().as_ref())
        )),
        Err(e) => Err(e.to_string()),
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

async fn write_json<W, T>(out: &mut W, value: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(value)?;
    write_line(out, &json).await
}

/// Execute `definition` on the process's stdio with default settings, then exit
pub async fn run_hook(definition: HookDefinition) {
    run_hook_with_config(definition, EngineConfig::default()).await
}

/// Execute `definition` on the process's stdio, then exit with the hook's code
pub async fn run_hook_with_config(definition: HookDefinition, config: EngineConfig) {
    let runtime = HookRuntime::new(config);
    let exit = match runtime
        .execute(&definition, io::stdin(), io::stdout(), io::stderr())
        .await
    {
        Ok(exit) => exit,
        Err(e) => {
            error!(error = %e, "Failed to write hook output");
            HookExit::NonBlockingError
        }
    };
    std::process::exit(exit.code())
}
