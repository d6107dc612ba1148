//! Transport layer for MCP communication.

pub mod framing;
#[cfg(feature = "stdio")]
pub mod stdio;

#[cfg(feature = "stdio")]
pub use stdio::StdioTransport;
