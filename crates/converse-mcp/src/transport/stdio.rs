//! Stdio transport — reads JSON-RPC lines from stdin, writes to stdout.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::ProtocolHandler;
use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId};

use super::framing;

/// Line-delimited transport for desktop MCP clients. Each request runs in its
/// own task; responses are written in completion order.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Run the transport loop on the process's stdin and stdout.
    pub async fn run(&self) -> McpResult<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve requests read from `reader` until EOF, writing responses to
    /// `writer`. Returns once every in-flight request has been answered.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Value>();
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let mut line = String::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            if tx.is_closed() {
                tracing::warn!("Output closed, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(msg) => self.spawn_request(msg, tx.clone()),
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    let error_response = serde_json::to_value(e.to_json_rpc_error(RequestId::Null))
                        .map_err(|e| McpError::InternalError(e.to_string()))?;
                    let _ = tx.send(error_response);
                }
            }
        }

        // The writer finishes once every request task has dropped its sender.
        drop(tx);
        writer_task
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?
    }

    /// Register `msg` in wire order, then process it on its own task.
    fn spawn_request(&self, msg: JsonRpcMessage, tx: mpsc::UnboundedSender<Value>) {
        let handler = Arc::clone(&self.handler);
        let id = msg.request_id().cloned();
        let accepted = handler.accept(msg);

        tokio::spawn(async move {
            let outcome = tokio::spawn(async move { handler.process(accepted).await }).await;
            match outcome {
                Ok(Some(response)) => {
                    let _ = tx.send(response);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Request task failed: {e}");
                    if let Some(id) = id {
                        let err = McpError::InternalError("request handler panicked".to_string());
                        if let Ok(value) = serde_json::to_value(err.to_json_rpc_error(id)) {
                            let _ = tx.send(value);
                        }
                    }
                }
            }
        });
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Value>) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let framed = framing::frame_message(&response)?;
        writer
            .write_all(framed.as_bytes())
            .await
            .map_err(McpError::Io)?;
        writer.flush().await.map_err(McpError::Io)?;
    }
    writer.shutdown().await.map_err(McpError::Io)?;
    Ok(())
}
