//! Prompt handlers: the `prompts/get` side of the registry.

pub mod greet;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::registry::Binding;
use crate::types::{McpResult, PromptDefinition, PromptGetParams, PromptGetResult};

/// Expands one registered prompt into messages.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    async fn get(&self, ctx: RequestContext, params: PromptGetParams) -> McpResult<PromptGetResult>;
}

#[async_trait]
impl<F, Fut> PromptHandler for F
where
    F: Fn(RequestContext, PromptGetParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = McpResult<PromptGetResult>> + Send + 'static,
{
    async fn get(&self, ctx: RequestContext, params: PromptGetParams) -> McpResult<PromptGetResult> {
        (self)(ctx, params).await
    }
}

pub type PromptBinding = Binding<PromptDefinition, dyn PromptHandler>;

impl PromptBinding {
    pub fn new(prompt: PromptDefinition, handler: impl PromptHandler + 'static) -> Self {
        Self {
            descriptor: prompt,
            handler: Arc::new(handler),
        }
    }
}
