//! Request handlers for the MCP methods the servers implement.
//!
//! Each handler is a pure-ish function over the request, the engine,
//! and the event emitter; the dispatcher in `server` owns method
//! routing and spoofed delivery.

pub mod initialize;
pub mod resources;
pub mod tools;
