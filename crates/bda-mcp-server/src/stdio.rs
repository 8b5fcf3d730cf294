//! Newline-delimited JSON-RPC transport over stdin/stdout.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::dispatch::McpServer;
use crate::protocol::{JsonRpcError, JsonRpcResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to read from transport: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write to transport: {0}")]
    Write(#[source] std::io::Error),
    #[error("transport writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Serve MCP on the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<(), TransportError> {
    tracing::info!(server = %server.info().name, "serving MCP over stdio");
    let reader = BufReader::new(tokio::io::stdin());
    serve_lines(server, reader, tokio::io::stdout()).await?;
    tracing::info!("stdin closed; stdio transport stopped");
    Ok(())
}

/// Serve MCP over any line-oriented reader/writer pair.
///
/// Each request runs on its own task; responses are funnelled through a single
/// writer so lines never interleave. A line that is not UTF-8 is answered with a
/// parse error like any other malformed message. After the reader hits EOF,
/// in-flight requests are allowed to finish before the writer is returned.
pub async fn serve_lines<R, W>(
    server: Arc<McpServer>,
    mut reader: R,
    writer: W,
) -> Result<W, TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer
                .write_all(line.as_bytes())
                .await
                .map_err(TransportError::Write)?;
            writer.write_all(b"\n").await.map_err(TransportError::Write)?;
            writer.flush().await.map_err(TransportError::Write)?;
        }
        Ok::<W, TransportError>(writer)
    });

    let mut in_flight = JoinSet::new();
    let mut buf = Vec::new();
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {
                let line = match String::from_utf8(std::mem::take(&mut buf)) {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(%err, "discarding non UTF-8 message");
                        if let Some(response) = parse_failure(&err)
                            && tx.send(response).is_err()
                        {
                            tracing::warn!("writer closed; response dropped");
                        }
                        continue;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let server = Arc::clone(&server);
                let tx = tx.clone();
                in_flight.spawn(async move {
                    if let Some(response) = server.handle_message(line.trim_end()).await
                        && tx.send(response).is_err()
                    {
                        tracing::warn!("writer closed; response dropped");
                    }
                });
            }
            Err(err) => break Err(TransportError::Read(err)),
        }

        while let Some(joined) = in_flight.try_join_next() {
            log_join_failure(joined);
        }
    };

    while let Some(joined) = in_flight.join_next().await {
        log_join_failure(joined);
    }
    drop(tx);

    let writer = writer_task.await??;
    read_result?;
    Ok(writer)
}

/// Parse-error response for a line that never reached the dispatcher.
fn parse_failure(detail: impl std::fmt::Display) -> Option<String> {
    let response = JsonRpcResponse::failure(Value::Null, JsonRpcError::parse_error(detail));
    serde_json::to_string(&response).ok()
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        tracing::error!(%err, "request task failed");
    }
}
