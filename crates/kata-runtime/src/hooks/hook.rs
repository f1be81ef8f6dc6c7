use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::{HookContext, HookResponse};

/// Handler invoked with the validated input of one invocation
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Build the response for this invocation; errors become non-blocking errors
    async fn run(&self, ctx: HookContext) -> Result<HookResponse>;
}

/// Adapter running a closure `|ctx| async move { ... }` as a handler
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> HookHandler for FnHandler<F>
where
    F: Fn(HookContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HookResponse>> + Send + 'static,
{
    async fn run(&self, ctx: HookContext) -> Result<HookResponse> {
        (self.0)(ctx).await
    }
}

pub type GateFn = Arc<dyn Fn() -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// Gate evaluated before stdin is touched
#[derive(Clone)]
pub enum ShouldRun {
    Fixed(bool),
    When(GateFn),
}

impl ShouldRun {
    pub fn when<F, Fut>(predicate: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        ShouldRun::When(Arc::new(move || Box::pin(predicate())))
    }

    pub async fn evaluate(&self) -> Result<bool> {
        match self {
            ShouldRun::Fixed(run) => Ok(*run),
            ShouldRun::When(predicate) => predicate().await,
        }
    }
}

impl Default for ShouldRun {
    fn default() -> Self {
        ShouldRun::Fixed(true)
    }
}

impl From<bool> for ShouldRun {
    fn from(run: bool) -> Self {
        ShouldRun::Fixed(run)
    }
}

impl fmt::Debug for ShouldRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShouldRun::Fixed(run) => f.debug_tuple("Fixed").field(run).finish(),
            ShouldRun::When(_) => f.write_str("When(..)"),
        }
    }
}
