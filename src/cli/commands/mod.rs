//! CLI command dispatch.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod run;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::error::SnareError;

/// Dispatches a parsed CLI invocation.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), SnareError> {
    match cli.command {
        Commands::Run(ref args) => run::run(args, cli.quiet, cancel).await,
        Commands::Version => {
            version::run();
            Ok(())
        }
    }
}
