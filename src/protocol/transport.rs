//! Newline-delimited JSON-RPC transport.

use crate::error::{McpError, ProtocolError, Result};
use crate::protocol::types::{JsonRpcRequest, JsonRpcResponse, Message};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::{debug, error, trace};

/// Transport trait for MCP communication.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Next message, or `None` at end of input.
    async fn read_message(&self) -> Result<Option<Message>>;
    async fn write_response(&self, response: &JsonRpcResponse) -> Result<()>;
}

/// One JSON message per line over any async reader/writer pair.
pub struct LineTransport<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
}

/// The transport MCP clients launch us with.
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader.into_inner(), self.writer.into_inner())
    }

    /// Next non-blank line, trimmed.
    async fn read_line(&self) -> Result<Option<String>> {
        let mut reader = self.reader.lock().await;
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        trace!("Received line: {}", line);
                        return Ok(Some(line.to_string()));
                    }
                }
                Err(e) => {
                    error!("Error reading input: {}", e);
                    return Err(McpError::Io(e));
                }
            }
        }
    }

    async fn write_line(&self, content: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        trace!("Sending line: {}", content);
        writer.write_all(content.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_message(&self) -> Result<Option<Message>> {
        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };

        if let Ok(request) = serde_json::from_str::<JsonRpcRequest>(&line) {
            debug!("Received request: method={}", request.method);
            return Ok(Some(Message::Request(request)));
        }
        match serde_json::from_str::<JsonRpcResponse>(&line) {
            Ok(response) => {
                debug!("Received response: id={:?}", response.id);
                Ok(Some(Message::Response(response)))
            }
            Err(e) => {
                error!("Failed to parse message: {}", e);
                Err(McpError::Protocol(ProtocolError::ParseError))
            }
        }
    }

    async fn write_response(&self, response: &JsonRpcResponse) -> Result<()> {
        let json = serde_json::to_string(response)?;
        debug!("Sending response: id={:?}", response.id);
        self.write_line(&json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::RequestId;
    use serde_json::json;

    fn transport(input: &'static str) -> LineTransport<&'static [u8], Vec<u8>> {
        LineTransport::new(input.as_bytes(), Vec::new())
    }

    #[tokio::test]
    async fn test_reads_requests_and_skips_blank_lines() {
        let transport = transport(
            "\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n\n  \n{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        );

        match transport.read_message().await.unwrap() {
            Some(Message::Request(request)) => {
                assert_eq!(request.method, "initialize");
                assert_eq!(request.id, Some(RequestId::Number(1)));
            }
            other => panic!("unexpected message: {other:?}"),
        }
        match transport.read_message().await.unwrap() {
            Some(Message::Request(request)) => assert!(request.is_notification()),
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(transport.read_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_parse_error() {
        let transport = transport("{not json}\n");
        let err = transport.read_message().await.unwrap_err();
        assert!(matches!(err, McpError::Protocol(ProtocolError::ParseError)));
    }

    #[tokio::test]
    async fn test_write_response_is_one_line() {
        let transport = transport("");
        transport
            .write_response(&JsonRpcResponse::success(Some("abc".into()), json!({"ok": true})))
            .await
            .unwrap();

        let (_, written) = transport.into_inner();
        let written = String::from_utf8(written).unwrap();
        assert!(written.ends_with('\n'));
        assert_eq!(written.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["result"]["ok"], true);
    }
}
