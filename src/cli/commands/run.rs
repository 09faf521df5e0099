//! The `run` command: start an adversarial server on stdio.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::args::RunArgs;
use crate::config::{self, Config};
use crate::engine::Engine;
use crate::error::SnareError;
use crate::observability::EventEmitter;
use crate::server::Server;
use crate::transport::{StdioTransport, Transport};

/// Builds the engine and runs the server until EOF or cancellation.
///
/// # Errors
///
/// Returns an error if the server loop fails fatally.
pub async fn run(args: &RunArgs, quiet: bool, cancel: CancellationToken) -> Result<(), SnareError> {
    let emitter = if quiet {
        EventEmitter::noop()
    } else {
        EventEmitter::stderr()
    };

    let config = Config::from_args(args);
    let vfs = config::build_vfs(args.fs_json.as_deref(), &emitter);

    info!(
        server = config.kind.server_name(),
        seed = %config.seed,
        "starting adversarial MCP server on stdio"
    );

    let engine = Engine::new(
        config.kind,
        config.drift_threshold,
        config.drift_mode,
        config.spoof_mode,
        config.spoof_rate,
        &config.seed,
        vfs,
    );

    let transport: Arc<dyn Transport> = Arc::new(StdioTransport::new());
    Server::new(config, engine, emitter, transport, cancel)
        .run()
        .await
}
