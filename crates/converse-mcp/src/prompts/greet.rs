//! Prompt: greet — Ask the model to greet someone by name.

use serde_json::Value;

use crate::context::RequestContext;
use crate::types::{
    McpError, McpResult, PromptDefinition, PromptGetParams, PromptGetResult, PromptMessage,
};

use super::PromptBinding;

pub fn definition() -> PromptDefinition {
    PromptDefinition::new("greet", "Guide for greeting someone by name")
        .with_argument("name", "Who to greet", true)
        .with_argument("style", "Tone of the greeting, e.g. formal or casual", false)
}

pub async fn expand(_ctx: RequestContext, params: PromptGetParams) -> McpResult<PromptGetResult> {
    let args = params
        .arguments
        .unwrap_or(Value::Object(serde_json::Map::new()));

    let name = args
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| McpError::InvalidParams("'name' argument is required".to_string()))?;
    let style = args.get("style").and_then(Value::as_str).unwrap_or("friendly");

    let text = format!("Write a short, {style} greeting addressed to {name}.");

    Ok(PromptGetResult {
        description: Some(format!("Greeting for {name}")),
        messages: vec![PromptMessage::user(text)],
    })
}

pub fn binding() -> PromptBinding {
    PromptBinding::new(definition(), expand)
}
