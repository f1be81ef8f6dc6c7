use std::fmt;
use std::future::Future;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::OutputMismatch;
use crate::hooks::HookEvent;
use crate::input::HookInput;
use crate::output::HookOutput;

/// Optional text attached to a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessPayload {
    /// Shown to the user
    pub message_for_user: Option<String>,
    /// Fed back to the model; honoured only on context events
    pub additional_claude_context: Option<String>,
}

impl SuccessPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message_for_user = Some(message.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.additional_claude_context = Some(context.into());
        self
    }
}

pub type DeferredRun = Box<dyn FnOnce() -> BoxFuture<'static, Result<HookOutput>> + Send>;

/// Work that finishes after the hook has told the host not to wait
pub struct DeferredHook {
    run: DeferredRun,
    timeout_ms: Option<u64>,
}

impl DeferredHook {
    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    pub fn into_parts(self) -> (DeferredRun, Option<u64>) {
        (self.run, self.timeout_ms)
    }
}

impl fmt::Debug for DeferredHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredHook")
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

/// What a handler hands back to the engine
#[derive(Debug)]
pub enum HookResponse {
    Success(SuccessPayload),
    /// Exit 2; the message is fed back to the model
    BlockingError(String),
    /// Exit 1; the message, if any, is shown to the user
    NonBlockingError(Option<String>),
    Json(HookOutput),
    JsonAsync(DeferredHook),
}

impl HookResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            HookResponse::Success(_) => "success",
            HookResponse::BlockingError(_) => "blocking-error",
            HookResponse::NonBlockingError(_) => "non-blocking-error",
            HookResponse::Json(_) => "json",
            HookResponse::JsonAsync(_) => "json-async",
        }
    }
}

/// Per-invocation view of the validated input plus response builders.
///
/// Builders do no I/O; the engine encodes whatever they return.
#[derive(Debug, Clone)]
pub struct HookContext {
    input: HookInput,
}

impl HookContext {
    pub fn new(input: HookInput) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &HookInput {
        &self.input
    }

    pub fn event(&self) -> HookEvent {
        self.input.event()
    }

    pub fn success(&self) -> HookResponse {
        HookResponse::Success(SuccessPayload::default())
    }

    pub fn success_with(&self, payload: SuccessPayload) -> HookResponse {
        HookResponse::Success(payload)
    }

    pub fn blocking_error(&self, message: impl Into<String>) -> HookResponse {
        HookResponse::BlockingError(message.into())
    }

    pub fn non_blocking_error(&self) -> HookResponse {
        HookResponse::NonBlockingError(None)
    }

    pub fn non_blocking_error_with(&self, message: impl Into<String>) -> HookResponse {
        HookResponse::NonBlockingError(Some(message.into()))
    }

    /// Structured output; event-specific output must match this invocation's event
    pub fn json(&self, output: HookOutput) -> Result<HookResponse, OutputMismatch> {
        output.check_event(self.event())?;
        Ok(HookResponse::Json(output))
    }

    /// Announce async completion, then run `run` under `timeout_ms` plus the engine's grace period.
    /// `run` is not called here.
    pub fn json_async<F, Fut>(&self, run: F, timeout_ms: Option<u64>) -> HookResponse
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<HookOutput>> + Send + 'static,
    {
        let event = self.event();
        let run: DeferredRun = Box::new(move || {
            async move {
                let output = run().await?;
                output.check_event(event)?;
                Ok(output)
            }
            .boxed()
        });
        HookResponse::JsonAsync(DeferredHook { run, timeout_ms })
    }

    /// [`json_async`](Self::json_async) without a timeout
    pub fn defer<F, Fut>(&self, run: F) -> HookResponse
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<HookOutput>> + Send + 'static,
    {
        self.json_async(run, None)
    }
}
