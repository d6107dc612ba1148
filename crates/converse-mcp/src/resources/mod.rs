//! Resource handlers: the `resources/read` side of the registry.

pub mod file;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::registry::Binding;
use crate::types::{McpResult, ReadResourceResult, ResourceDefinition, ResourceReadParams};

/// Reads the contents of one registered resource.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn read(
        &self,
        ctx: RequestContext,
        params: ResourceReadParams,
    ) -> McpResult<ReadResourceResult>;
}

#[async_trait]
impl<F, Fut> ResourceHandler for F
where
    F: Fn(RequestContext, ResourceReadParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = McpResult<ReadResourceResult>> + Send + 'static,
{
    async fn read(
        &self,
        ctx: RequestContext,
        params: ResourceReadParams,
    ) -> McpResult<ReadResourceResult> {
        (self)(ctx, params).await
    }
}

pub type ResourceBinding = Binding<ResourceDefinition, dyn ResourceHandler>;

impl ResourceBinding {
    pub fn new(resource: ResourceDefinition, handler: impl ResourceHandler + 'static) -> Self {
        Self {
            descriptor: resource,
            handler: Arc::new(handler),
        }
    }
}
