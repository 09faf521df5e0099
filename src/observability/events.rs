//! Structured event stream.
//!
//! Every significant action emits one newline-delimited JSON record on
//! stderr. Each record carries the request id it was handling (if any)
//! and a fresh correlation `internal_id` that is never reused — the
//! internal id is deliberately independent of the seeded PRNG so
//! deterministic replay of protocol output does not constrain log
//! correlation.

use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event in the closed per-server vocabulary.
///
/// Serialized with an `event` tag in snake case, e.g.
/// `{"event":"drift_activated",...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Process started and is reading input.
    ServerStart {
        /// Advertised server name.
        server_name: String,
        /// Adversarial kind tag.
        kind: String,
        /// PRNG seed in effect.
        seed: String,
    },

    /// A capability listing was served.
    ToolAdvertised {
        /// Names in advertised order.
        tools: Vec<String>,
        /// Whether the drifted surface was served.
        drifted: bool,
    },

    /// A `tools/call` was handled.
    ToolCalled {
        /// Requested tool name.
        tool: String,
        /// Running `tools/call` count.
        call_count: u64,
    },

    /// The one-way drift transition fired.
    DriftActivated {
        /// Active drift mode tag.
        mode: String,
        /// Configured threshold.
        threshold: u64,
        /// Call count at activation.
        call_count: u64,
    },

    /// A trap resource URI was requested.
    TrapResourceSeen {
        /// The requested URI.
        uri: String,
        /// Detected risk pattern tag.
        trap_kind: String,
    },

    /// A correlation-violating response was emitted.
    SpoofEvent {
        /// Spoof mode tag.
        spoof_kind: String,
        /// Running spoof count.
        spoof_count: u64,
        /// Whether a correct observer is expected to drop the payload.
        expected_drop: bool,
    },

    /// A credential- or key-shaped path was requested.
    SensitivePathRequested {
        /// Requested path as given by the caller.
        path: String,
        /// Assigned classification tag.
        classification: String,
    },

    /// A traversal or out-of-policy path was refused.
    PolicyViolation {
        /// Requested path as given by the caller.
        path: String,
        /// Refusal reason tag.
        reason: String,
    },

    /// Startup configuration was malformed and a default was used.
    ConfigFallback {
        /// Which setting fell back.
        setting: String,
        /// Parse failure detail.
        detail: String,
    },

    /// A response line is about to be written.
    ResponseSent {
        /// Originating method.
        method: String,
        /// Whether the envelope carries an error.
        error: bool,
        /// Whether the envelope was spoofed.
        spoofed: bool,
    },

    /// Input closed; final summary.
    ServerShutdown {
        /// Requests handled.
        requests: u64,
        /// `tools/call` invocations.
        tool_calls: u64,
        /// Spoof events emitted.
        spoofs: u64,
        /// Whether drift activated during the run.
        drifted: bool,
    },

    /// Uncaught fault; the process exits non-zero after this record.
    Fatal {
        /// Fault description.
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// Record envelope
// ---------------------------------------------------------------------------

/// Full log record: correlation fields plus the flattened event.
#[derive(Debug, Serialize)]
struct LogRecord {
    /// Emission time, RFC 3339.
    timestamp: DateTime<Utc>,
    /// Fresh per-record correlation id, never reused.
    internal_id: String,
    /// The JSON-RPC id of the request being handled, if any.
    request_id_seen: Value,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, flushing JSONL event writer.
///
/// Serialization or I/O failures are silently dropped — observability
/// must never take the server down.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    emitted: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("emitted", &self.emitted.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter over the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            emitted: AtomicU64::new(0),
        }
    }

    /// Emitter on stderr — the default; stdout is reserved for the
    /// JSON-RPC transport.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Emitter that discards everything (quiet mode, tests).
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Emits one record, stamping the timestamp and a fresh
    /// `internal_id`.
    ///
    /// `request_id` is the id of the request being handled; pass `None`
    /// for events outside any request (startup, shutdown, timer).
    pub fn emit(&self, request_id: Option<&Value>, event: Event) {
        let record = LogRecord {
            timestamp: Utc::now(),
            internal_id: uuid::Uuid::new_v4().to_string(),
            request_id_seen: request_id.cloned().unwrap_or(Value::Null),
            event,
        };

        self.emitted.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&record) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Number of records emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}
