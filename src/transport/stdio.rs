//! Stdio transport: requests on stdin, responses on stdout.
//!
//! Each message occupies exactly one line. Writes lock the writer for
//! the full line-plus-flush so a timer-driven spoof emission can
//! interleave between lines but never inside one.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;

use crate::error::TransportError;
use crate::transport::{JsonRpcMessage, Result, Transport};

/// Transport over the process's stdin/stdout.
pub struct StdioTransport {
    reader: Mutex<Lines<BufReader<Stdin>>>,
    writer: Mutex<Stdout>,
}

impl StdioTransport {
    /// Creates a transport bound to this process's standard streams.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            writer: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for StdioTransport {
    async fn receive_line(&self) -> Result<Option<String>> {
        let mut reader = self.reader.lock().await;
        reader.next_line().await.map_err(TransportError::Read)
    }

    async fn send_message(&self, message: &JsonRpcMessage) -> Result<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(TransportError::Write)?;
        writer.flush().await.map_err(TransportError::Write)
    }
}
