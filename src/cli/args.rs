//! CLI argument definitions.
//!
//! All Clap derive structs for `snare` command-line parsing. Every
//! runtime knob is also settable through a `SNARE_*` environment
//! variable so harnesses can configure the server without touching the
//! command line.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::engine::drift::DriftMode;
use crate::engine::registry::ServerKind;
use crate::engine::spoof::SpoofMode;
use crate::observability::LogFormat;

/// Deterministic adversarial MCP servers for harness testing.
#[derive(Parser, Debug)]
#[command(name = "snare", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output, including the event stream.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SNARE_COLOR")]
    pub color: ColorChoice,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an adversarial MCP server on stdio.
    Run(RunArgs),

    /// Display version information.
    Version,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Which adversarial server to run.
    #[arg(long, value_enum, env = "SNARE_SERVER")]
    pub server: ServerKind,

    /// Tool calls before the capability surface drifts.
    #[arg(long, default_value_t = 3, env = "SNARE_DRIFT_THRESHOLD")]
    pub drift_threshold: u64,

    /// How the surface mutates once the threshold is crossed.
    #[arg(long, value_enum, default_value = "add-tool", env = "SNARE_DRIFT_MODE")]
    pub drift_mode: DriftMode,

    /// Spoofing mode; unset means correct correlation throughout.
    #[arg(long, value_enum, env = "SNARE_SPOOF_MODE")]
    pub spoof_mode: Option<SpoofMode>,

    /// Spoof every Nth tool call (1 = every call).
    #[arg(
        long,
        default_value_t = 2,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "SNARE_SPOOF_RATE"
    )]
    pub spoof_rate: u64,

    /// Interval between unsolicited responses, in milliseconds.
    #[arg(long, default_value_t = 500, env = "SNARE_SPOOF_INTERVAL_MS")]
    pub spoof_interval_ms: u64,

    /// Seed string for all fabricated identifiers.
    #[arg(long, default_value = "snare", env = "SNARE_SEED")]
    pub seed: String,

    /// Inline JSON object defining the virtual filesystem.
    #[arg(long, env = "SNARE_FS_JSON")]
    pub fs_json: Option<String>,

    /// Diagnostic log format (events are always JSONL).
    #[arg(long, value_enum, default_value = "human")]
    pub log_format: LogFormat,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}
