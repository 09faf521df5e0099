//! MCP `initialize` handler.

use serde_json::json;

use crate::engine::registry::ServerKind;
use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// MCP protocol version we advertise.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Handles an `initialize` request.
///
/// The advertised name comes from the server kind; only the
/// resource-drift server claims the resources capability.
#[must_use]
pub fn handle(request: &JsonRpcRequest, kind: ServerKind) -> JsonRpcResponse {
    let mut capabilities = serde_json::Map::new();
    capabilities.insert("tools".to_string(), json!({}));
    if kind == ServerKind::ResourceDrift {
        capabilities.insert("resources".to_string(), json!({}));
    }

    JsonRpcResponse::success(
        request.id.clone(),
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "serverInfo": {
                "name": kind.server_name(),
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
    )
}
