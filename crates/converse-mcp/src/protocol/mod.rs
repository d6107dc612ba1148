//! MCP protocol handling — method table, dispatch, and JSON-RPC plumbing.

pub mod dispatcher;
pub mod handler;
pub mod method_table;
pub mod validator;

pub use dispatcher::Dispatcher;
pub use handler::{Accepted, ProtocolHandler};
pub use method_table::{methods, MethodTable};
