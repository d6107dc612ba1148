//! Per-request routing: method name → decoded params → handler.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::context::RequestContext;
use crate::types::{McpError, McpResult, PromptGetParams, ResourceReadParams, ToolCallParams};

use super::method_table::{MethodTable, Route};

/// Stateless front of the method table. Cheap to clone; clones share the
/// same frozen table and need no locking.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<MethodTable>,
}

impl Dispatcher {
    pub fn new(table: MethodTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn method_table(&self) -> &MethodTable {
        &self.table
    }

    /// Resolve `method`, decode `params` where the method takes any, and run
    /// the matching handler. Handler errors are returned as-is.
    pub async fn dispatch(
        &self,
        method: &str,
        params: Option<Value>,
        ctx: RequestContext,
    ) -> McpResult<Value> {
        let route = self
            .table
            .route(method)
            .ok_or_else(|| McpError::MethodNotFound(method.to_string()))?;

        tracing::debug!(parent: ctx.span(), "Dispatching {method}");

        match route {
            Route::Static(value) => Ok(value.clone()),
            Route::GetPrompt(index) => {
                let params: PromptGetParams = decode_params(method, params)?;
                let handler = index.lookup(&params.name)?;
                to_value(handler.get(ctx, params).await?)
            }
            Route::ReadResource(index) => {
                let params: ResourceReadParams = decode_params(method, params)?;
                let handler = index.lookup(&params.uri)?;
                to_value(handler.read(ctx, params).await?)
            }
            Route::CallTool(index) => {
                let params: ToolCallParams = decode_params(method, params)?;
                let handler = index.lookup(&params.name)?;
                to_value(handler.call(ctx, params).await?)
            }
        }
    }
}

fn decode_params<T: DeserializeOwned>(method: &str, params: Option<Value>) -> McpResult<T> {
    serde_json::from_value(params.unwrap_or(Value::Null)).map_err(|source| {
        McpError::ParamDecode {
            method: method.to_string(),
            source,
        }
    })
}

fn to_value(result: impl Serialize) -> McpResult<Value> {
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}
