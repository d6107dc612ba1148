//! The capabilities the `converse-mcp` binary serves out of the box.

use std::path::Path;

use crate::registry::ServerBuilder;
use crate::resources::file;
use crate::types::McpResult;
use crate::{prompts, tools};

pub const INSTRUCTIONS: &str = "Converse MCP server. \
     Use the echo tool to check connectivity, the greet prompt for a sample prompt, \
     and resources to read files from the configured root directory.";

/// Register the built-in tool and prompt, plus one resource per file under
/// `root` when given.
pub fn register(builder: ServerBuilder, root: Option<&Path>) -> McpResult<ServerBuilder> {
    let builder = builder
        .instructions(INSTRUCTIONS)
        .tool_binding(tools::echo::binding())
        .prompt_binding(prompts::greet::binding());

    match root {
        Some(root) => Ok(builder.resource_bindings(file::discover(root)?)),
        None => Ok(builder),
    }
}
