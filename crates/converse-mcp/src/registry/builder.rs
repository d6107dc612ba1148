//! Registry builder — accumulates bindings and server identity before start.

use std::collections::HashSet;

use crate::prompts::{PromptBinding, PromptHandler};
use crate::protocol::{Dispatcher, MethodTable};
use crate::resources::{ResourceBinding, ResourceHandler};
use crate::tools::{ToolBinding, ToolHandler};
use crate::types::{
    Implementation, InitializeResult, McpError, McpResult, PromptDefinition, ResourceDefinition,
    ServerCapabilities, ToolDefinition, MCP_VERSION,
};

use super::binding::{Binding, Descriptor};

/// Collects capability bindings in registration order. Not meant for
/// concurrent use: registration happens once, at startup.
///
/// Duplicate keys within a kind are rejected by [`build`](Self::build).
pub struct ServerBuilder {
    server_info: Implementation,
    capabilities: ServerCapabilities,
    instructions: Option<String>,
    prompts: Vec<PromptBinding>,
    resources: Vec<ResourceBinding>,
    tools: Vec<ToolBinding>,
}

impl ServerBuilder {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            server_info: Implementation::new(name, version),
            capabilities: ServerCapabilities::default(),
            instructions: None,
            prompts: Vec::new(),
            resources: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Apply explicit capability configuration on top of the current flags.
    pub fn with_capabilities(mut self, apply: impl FnOnce(&mut ServerCapabilities)) -> Self {
        apply(&mut self.capabilities);
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn prompt(mut self, prompt: PromptDefinition, handler: impl PromptHandler + 'static) -> Self {
        self.prompts.push(PromptBinding::new(prompt, handler));
        self
    }

    pub fn resource(
        mut self,
        resource: ResourceDefinition,
        handler: impl ResourceHandler + 'static,
    ) -> Self {
        self.resources.push(ResourceBinding::new(resource, handler));
        self
    }

    pub fn tool(mut self, tool: ToolDefinition, handler: impl ToolHandler + 'static) -> Self {
        self.tools.push(ToolBinding::new(tool, handler));
        self
    }

    pub fn prompt_binding(mut self, binding: PromptBinding) -> Self {
        self.prompts.push(binding);
        self
    }

    pub fn resource_bindings(mut self, bindings: impl IntoIterator<Item = ResourceBinding>) -> Self {
        self.resources.extend(bindings);
        self
    }

    /// Replace every tool registered so far with `tools`.
    pub fn tools(mut self, tools: impl IntoIterator<Item = ToolBinding>) -> Self {
        self.tools = tools.into_iter().collect();
        self
    }

    pub fn tool_binding(mut self, binding: ToolBinding) -> Self {
        self.tools.push(binding);
        self
    }

    /// Freeze the registry and compile it into a dispatcher.
    pub fn build(self) -> McpResult<Dispatcher> {
        ensure_unique(&self.prompts)?;
        ensure_unique(&self.resources)?;
        ensure_unique(&self.tools)?;

        let mut capabilities = self.capabilities;
        enable_if_registered(&mut capabilities, &self.prompts);
        enable_if_registered(&mut capabilities, &self.resources);
        enable_if_registered(&mut capabilities, &self.tools);

        let initialize = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities,
            server_info: self.server_info,
            instructions: self.instructions,
        };

        tracing::info!(
            "Registered {} prompts, {} resources, {} tools",
            self.prompts.len(),
            self.resources.len(),
            self.tools.len()
        );

        let table = MethodTable::compile(initialize, self.prompts, self.resources, self.tools)?;
        Ok(Dispatcher::new(table))
    }
}

fn ensure_unique<D: Descriptor, H: ?Sized>(bindings: &[Binding<D, H>]) -> McpResult<()> {
    let mut seen = HashSet::with_capacity(bindings.len());
    for binding in bindings {
        if !seen.insert(binding.key()) {
            return Err(McpError::DuplicateCapability {
                kind: D::KIND,
                name: binding.key().to_string(),
            });
        }
    }
    Ok(())
}

fn enable_if_registered<D: Descriptor, H: ?Sized>(
    capabilities: &mut ServerCapabilities,
    bindings: &[Binding<D, H>],
) {
    if !bindings.is_empty() {
        capabilities.enable(D::KIND);
    }
}
