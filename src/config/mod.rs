//! Runtime configuration.
//!
//! Configuration is resolved once at startup and immutable afterwards.
//! Invalid values never abort the server: the documented default is
//! substituted and a `config_fallback` event records the substitution,
//! because a harness run that silently dies teaches nothing.

use std::time::Duration;

use serde_json::Value;

use crate::cli::args::RunArgs;
use crate::engine::drift::DriftMode;
use crate::engine::registry::ServerKind;
use crate::engine::spoof::SpoofMode;
use crate::observability::EventEmitter;
use crate::observability::events::Event;
use crate::vfs::VirtualFs;

/// Resolved, immutable server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which adversarial server to run.
    pub kind: ServerKind,
    /// Tool calls before drift activates.
    pub drift_threshold: u64,
    /// Drift mutation mode.
    pub drift_mode: DriftMode,
    /// Spoofing mode, if any.
    pub spoof_mode: Option<SpoofMode>,
    /// Spoof every Nth tool call.
    pub spoof_rate: u64,
    /// Interval between unsolicited responses.
    pub spoof_interval: Duration,
    /// Seed string for fabricated identifiers.
    pub seed: String,
}

impl Config {
    /// Resolves configuration from parsed CLI arguments.
    ///
    /// Clap has already enforced ranges (`spoof_rate >= 1`), so this is
    /// a straight mapping.
    #[must_use]
    pub fn from_args(args: &RunArgs) -> Self {
        Self {
            kind: args.server,
            drift_threshold: args.drift_threshold,
            drift_mode: args.drift_mode,
            spoof_mode: args.spoof_mode,
            spoof_rate: args.spoof_rate,
            spoof_interval: Duration::from_millis(args.spoof_interval_ms),
            seed: args.seed.clone(),
        }
    }
}

/// Builds the virtual filesystem from the optional inline JSON seed.
///
/// Malformed input (bad JSON, non-object, non-string values) falls back
/// to the default filesystem and emits `config_fallback`.
#[must_use]
pub fn build_vfs(fs_json: Option<&str>, emitter: &EventEmitter) -> VirtualFs {
    let Some(raw) = fs_json else {
        return VirtualFs::default_fs();
    };

    let parsed = serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| VirtualFs::from_seed(&v));

    parsed.unwrap_or_else(|| {
        tracing::warn!("SNARE_FS_JSON is malformed, using the default filesystem");
        emitter.emit(
            None,
            Event::ConfigFallback {
                setting: "SNARE_FS_JSON".to_string(),
                detail: "malformed filesystem seed, default substituted".to_string(),
            },
        );
        VirtualFs::default_fs()
    })
}
