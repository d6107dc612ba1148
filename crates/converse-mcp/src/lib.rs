//! Converse MCP server — capability registry and request dispatch for
//! prompts, resources, and tools.

pub mod builtin;
pub mod config;
pub mod context;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod tools;
pub mod transport;
pub mod types;

pub use context::{CancellationToken, RequestContext};
pub use prompts::{PromptBinding, PromptHandler};
pub use protocol::{Dispatcher, MethodTable, ProtocolHandler};
pub use registry::ServerBuilder;
pub use resources::{ResourceBinding, ResourceHandler};
pub use tools::{ToolBinding, ToolHandler};
#[cfg(feature = "stdio")]
pub use transport::StdioTransport;
