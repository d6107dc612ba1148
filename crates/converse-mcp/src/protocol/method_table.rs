//! Method table — the frozen index from protocol method name to route.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::prompts::{PromptBinding, PromptHandler};
use crate::registry::{Binding, Descriptor};
use crate::resources::{ResourceBinding, ResourceHandler};
use crate::tools::{ToolBinding, ToolHandler};
use crate::types::{
    CapabilityKind, InitializeResult, McpError, McpResult, PromptDefinition, PromptListResult,
    ResourceDefinition, ResourceListResult, ToolDefinition, ToolListResult,
};

/// Protocol method names served by the table.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const PING: &str = "ping";
    pub const PROMPTS_LIST: &str = "prompts/list";
    pub const PROMPTS_GET: &str = "prompts/get";
    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

/// Key → handler map for one capability kind.
pub struct KindIndex<H: ?Sized> {
    kind: CapabilityKind,
    handlers: HashMap<String, Arc<H>>,
}

impl<H: ?Sized> KindIndex<H> {
    fn from_bindings<D: Descriptor>(bindings: Vec<Binding<D, H>>) -> (Vec<D>, Self) {
        let mut descriptors = Vec::with_capacity(bindings.len());
        let mut handlers = HashMap::with_capacity(bindings.len());
        for binding in bindings {
            handlers.insert(binding.key().to_string(), binding.handler);
            descriptors.push(binding.descriptor);
        }
        (
            descriptors,
            Self {
                kind: D::KIND,
                handlers,
            },
        )
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, key: &str) -> McpResult<&Arc<H>> {
        self.handlers
            .get(key)
            .ok_or_else(|| McpError::not_found(self.kind, key))
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }
}

/// What a method name resolves to.
pub enum Route {
    /// Precomputed at build time; params are ignored.
    Static(Value),
    GetPrompt(KindIndex<dyn PromptHandler>),
    ReadResource(KindIndex<dyn ResourceHandler>),
    CallTool(KindIndex<dyn ToolHandler>),
}

/// Built once from the finished registry and never mutated afterwards.
pub struct MethodTable {
    routes: HashMap<&'static str, Route>,
    initialize: InitializeResult,
    prompts: Vec<PromptDefinition>,
    resources: Vec<ResourceDefinition>,
    tools: Vec<ToolDefinition>,
}

impl MethodTable {
    pub(crate) fn compile(
        initialize: InitializeResult,
        prompts: Vec<PromptBinding>,
        resources: Vec<ResourceBinding>,
        tools: Vec<ToolBinding>,
    ) -> McpResult<Self> {
        let (prompts, prompt_index) = KindIndex::from_bindings(prompts);
        let (resources, resource_index) = KindIndex::from_bindings(resources);
        let (tools, tool_index) = KindIndex::from_bindings(tools);

        let mut routes = HashMap::new();
        routes.insert(methods::INITIALIZE, static_route(&initialize)?);
        routes.insert(methods::PING, Route::Static(Value::Object(serde_json::Map::new())));
        routes.insert(
            methods::PROMPTS_LIST,
            static_route(&PromptListResult {
                prompts: prompts.clone(),
                next_cursor: None,
            })?,
        );
        routes.insert(methods::PROMPTS_GET, Route::GetPrompt(prompt_index));
        routes.insert(
            methods::RESOURCES_LIST,
            static_route(&ResourceListResult {
                resources: resources.clone(),
                next_cursor: None,
            })?,
        );
        routes.insert(methods::RESOURCES_READ, Route::ReadResource(resource_index));
        routes.insert(
            methods::TOOLS_LIST,
            static_route(&ToolListResult {
                tools: tools.clone(),
                next_cursor: None,
            })?,
        );
        routes.insert(methods::TOOLS_CALL, Route::CallTool(tool_index));

        Ok(Self {
            routes,
            initialize,
            prompts,
            resources,
            tools,
        })
    }

    pub fn route(&self, method: &str) -> Option<&Route> {
        self.routes.get(method)
    }

    /// All served method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.routes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn initialize_result(&self) -> &InitializeResult {
        &self.initialize
    }

    pub fn prompts(&self) -> &[PromptDefinition] {
        &self.prompts
    }

    pub fn resources(&self) -> &[ResourceDefinition] {
        &self.resources
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}

fn static_route(value: &impl Serialize) -> McpResult<Route> {
    serde_json::to_value(value)
        .map(Route::Static)
        .map_err(|e| McpError::InternalError(e.to_string()))
}
