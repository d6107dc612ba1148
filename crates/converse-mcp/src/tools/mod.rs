//! Tool handlers: the `tools/call` side of the registry.

pub mod echo;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::registry::Binding;
use crate::types::{McpResult, ToolCallParams, ToolCallResult, ToolDefinition};

/// Executes one registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, ctx: RequestContext, params: ToolCallParams) -> McpResult<ToolCallResult>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(RequestContext, ToolCallParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = McpResult<ToolCallResult>> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext, params: ToolCallParams) -> McpResult<ToolCallResult> {
        (self)(ctx, params).await
    }
}

pub type ToolBinding = Binding<ToolDefinition, dyn ToolHandler>;

impl ToolBinding {
    pub fn new(tool: ToolDefinition, handler: impl ToolHandler + 'static) -> Self {
        Self {
            descriptor: tool,
            handler: Arc::new(handler),
        }
    }
}
