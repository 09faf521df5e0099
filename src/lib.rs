//! `snare` - deterministic adversarial MCP servers for harness testing.
//!
//! Each server speaks newline-delimited JSON-RPC over stdio and
//! misbehaves in one documented, reproducible way: capability drift,
//! resource drift, protocol spoofing, insecure-path handling, or
//! homoglyph tool names. Everything is seeded and replayable.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod rng;
pub mod server;
pub mod transport;
pub mod vfs;
