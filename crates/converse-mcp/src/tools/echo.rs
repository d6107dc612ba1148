//! Tool: echo — Return the call arguments unchanged.

use serde_json::{json, Value};

use crate::context::RequestContext;
use crate::types::{McpResult, ToolCallParams, ToolCallResult, ToolDefinition};

use super::ToolBinding;

pub fn definition() -> ToolDefinition {
    ToolDefinition::new(
        "echo",
        "Return the given arguments unchanged",
        json!({
            "type": "object",
            "additionalProperties": true
        }),
    )
}

pub async fn execute(ctx: RequestContext, params: ToolCallParams) -> McpResult<ToolCallResult> {
    let args = params
        .arguments
        .unwrap_or(Value::Object(serde_json::Map::new()));
    tracing::debug!(parent: ctx.span(), "echo called");
    Ok(ToolCallResult::json(&args))
}

pub fn binding() -> ToolBinding {
    ToolBinding::new(definition(), execute)
}
