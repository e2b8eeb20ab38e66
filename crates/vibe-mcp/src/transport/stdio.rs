//! Stdio transport: newline-delimited JSON over stdin/stdout.
//!
//! One session per process, created at startup. Lines are handled strictly
//! in order: a request completes before the next line is read.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolEngine;
use crate::session::SessionId;
use crate::types::{ErrorCode, McpError, McpResult, Response};

use super::ShutdownSignal;

/// Stdio transport over any async reader and writer.
pub struct StdioTransport<R, W> {
    engine: Arc<ProtocolEngine>,
    reader: BufReader<R>,
    writer: W,
}

impl StdioTransport<tokio::io::Stdin, tokio::io::Stdout> {
    /// Transport over the process's stdin and stdout.
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self::with_io(engine, tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Transport over the given reader and writer.
    pub fn with_io(engine: Arc<ProtocolEngine>, reader: R, writer: W) -> Self {
        Self {
            engine,
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Serve until input ends or shutdown is requested. The session is
    /// removed from the store on the way out.
    pub async fn run(mut self, shutdown: ShutdownSignal) -> McpResult<()> {
        let session = self.engine.sessions().create().await;
        let session_id = session.id().clone();
        drop(session);
        tracing::info!(session_id = %session_id, transport = "stdio", "Stdio transport ready");

        let result = self.serve(&session_id, shutdown).await;

        self.engine.sessions().remove(&session_id).await;
        tracing::info!(session_id = %session_id, "Stdio transport closed");
        result
    }

    async fn serve(&mut self, session_id: &SessionId, mut shutdown: ShutdownSignal) -> McpResult<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = tokio::select! {
                _ = shutdown.recv() => return Ok(()),
                read = self.reader.read_until(b'\n', &mut buf) => read?,
            };
            if read == 0 {
                tracing::debug!("Stdin closed");
                return Ok(());
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim_end_matches(['\n', '\r']);
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.engine.handle_raw(line, session_id).await
                }
                Err(e) => Response::error(
                    ErrorCode::TransportError,
                    format!("Input line is not valid UTF-8: {e}"),
                    None,
                ),
            };

            self.write_line(&response).await?;
        }
    }

    async fn write_line(&mut self, response: &Response) -> McpResult<()> {
        let mut line = response.encode();
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| McpError::Transport(format!("Failed to write response: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| McpError::Transport(format!("Failed to flush output: {e}")))
    }
}
