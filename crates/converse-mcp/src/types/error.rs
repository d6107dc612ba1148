//! Error types and JSON-RPC error codes for the MCP server.

use super::capabilities::CapabilityKind;
use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const RESOURCE_NOT_FOUND: i32 = -32802;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const PROMPT_NOT_FOUND: i32 = -32804;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The raw params of `method` do not match the shape it expects.
    #[error("error while unmarshalling '{method}' request parameters: {source}")]
    ParamDecode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// Raised by handlers for arguments they cannot work with.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: CapabilityKind, name: String },

    #[error("{kind} '{name}' is registered more than once")]
    DuplicateCapability { kind: CapabilityKind, name: String },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn not_found(kind: CapabilityKind, name: impl Into<String>) -> Self {
        McpError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::ParamDecode { .. } | McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::NotFound { kind, .. } => match kind {
                CapabilityKind::Prompt => PROMPT_NOT_FOUND,
                CapabilityKind::Resource => RESOURCE_NOT_FOUND,
                CapabilityKind::Tool => TOOL_NOT_FOUND,
            },
            McpError::DuplicateCapability { .. } | McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::RequestCancelled => REQUEST_CANCELLED,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
