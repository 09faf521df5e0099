//! Transport abstraction for newline-delimited JSON-RPC.
//!
//! The server talks to a [`Transport`] trait object so tests can swap
//! stdio for an in-memory pipe. Inbound framing is line-oriented and
//! deliberately tolerant: the transport hands back raw lines and the
//! dispatcher decides how to answer malformed ones (parse failures get
//! an in-band `-32700`, never a dropped connection).

pub mod jsonrpc;
pub mod stdio;

pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse,
};
pub use stdio::StdioTransport;

use crate::error::TransportError;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Async line transport for JSON-RPC messages.
///
/// Uses `&self` with interior mutability so the main loop and the
/// unsolicited-spoof timer can share one instance behind an `Arc`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Receives the next raw input line.
    ///
    /// Returns `Ok(None)` on EOF (clean shutdown). Blank lines are
    /// passed through; the dispatcher skips them.
    async fn receive_line(&self) -> Result<Option<String>>;

    /// Serializes a message and writes it as a single output line.
    async fn send_message(&self, message: &JsonRpcMessage) -> Result<()>;
}

#[cfg(test)]
mod tests {
    // The trait itself is exercised through StdioTransport and the
    // in-memory transports in server tests.
}
