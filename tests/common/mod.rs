//! Shared integration-test harness for spawning a `snare` server as a
//! child process and communicating over stdio JSON-RPC.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// Default timeout for reading a single message from the server.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A running `snare` server process with helpers for JSON-RPC I/O.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
pub struct SnareProcess {
    child: Child,
    stdin: tokio::process::ChildStdin,
    reader: BufReader<tokio::process::ChildStdout>,
    next_id: i64,
}

impl SnareProcess {
    /// Spawns a server of the given kind with extra `SNARE_*` env vars.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(server: &str, env: &[(&str, &str)]) -> Self {
        let bin = env!("CARGO_BIN_EXE_snare");
        let mut command = Command::new(bin);
        command
            .args(["run", "--server", server, "--quiet"])
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true);
        for (key, value) in env {
            command.env(key, value);
        }

        let mut child = command.spawn().expect("failed to spawn snare");
        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
            next_id: 1,
        }
    }

    /// Reads one NDJSON message from the server's stdout.
    ///
    /// Panics on EOF, I/O error, or if no message arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_message(&mut self, timeout: Duration) -> Value {
        let mut line = String::new();
        let result = tokio::time::timeout(timeout, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                assert!(n > 0, "unexpected EOF from server");
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return serde_json::from_str::<Value>(trimmed)
                        .unwrap_or_else(|e| panic!("invalid JSON from server: {e}\nline: {line}"));
                }
            }
        })
        .await;
        result.expect("timed out waiting for message from server")
    }

    /// Writes one raw line to the server's stdin.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_raw_line(&mut self, line: &str) {
        let mut buf = line.to_string();
        buf.push('\n');
        self.stdin
            .write_all(buf.as_bytes())
            .await
            .expect("failed to write to stdin");
        self.stdin.flush().await.expect("failed to flush stdin");
    }

    /// Sends a JSON-RPC request and returns the next response with a
    /// matching id.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_request(&mut self, method: &str, params: Option<Value>) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        self.send_raw_line(&serde_json::to_string(&request).expect("serialize request"))
            .await;

        loop {
            let msg = self.read_message(DEFAULT_TIMEOUT).await;
            if msg.get("id").and_then(Value::as_i64) == Some(id) {
                return msg;
            }
            // Unsolicited or mis-correlated traffic; keep reading.
        }
    }

    /// Calls a tool and returns the matching response.
    #[allow(clippy::missing_panics_doc)]
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        self.send_request(
            "tools/call",
            Some(json!({ "name": name, "arguments": arguments })),
        )
        .await
    }

    /// Sends the MCP `initialize` handshake and returns the response.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_initialize(&mut self) -> Value {
        self.send_request(
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "integration-test", "version": "0.0.1" }
            })),
        )
        .await
    }

    /// Shuts down the server by closing stdin and waiting for exit.
    ///
    /// Returns the process exit code.
    #[allow(clippy::missing_panics_doc)]
    pub async fn shutdown(self) -> i32 {
        let Self {
            mut child, stdin, ..
        } = self;

        drop(stdin);

        let status = tokio::time::timeout(Duration::from_secs(5), child.wait()).await;
        match status {
            Ok(status) => status.expect("wait failed").code().unwrap_or(-1),
            Err(_) => {
                child.kill().await.expect("failed to kill child");
                -1
            }
        }
    }
}

/// Extracts tool names from a `tools/list` response.
#[allow(clippy::missing_panics_doc)]
pub fn tool_names(response: &Value) -> Vec<String> {
    response["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .map(|t| t["name"].as_str().expect("tool name").to_string())
        .collect()
}

/// Extracts the text of the first content block in a tool result.
#[allow(clippy::missing_panics_doc)]
pub fn content_text(response: &Value) -> String {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("content text")
        .to_string()
}
