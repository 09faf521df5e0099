//! The adversarial engine: one owned value holding every piece of
//! mutable state a server needs.
//!
//! Counters and flags live here as fields, never as globals, so
//! independent instances (one per process, many per test run) can never
//! interfere. The engine is threaded explicitly through the dispatcher.

pub mod drift;
pub mod registry;
pub mod spoof;

use serde_json::Value;

use crate::engine::drift::{DriftActivation, DriftMode, DriftState};
use crate::engine::registry::ServerKind;
use crate::engine::spoof::{SpoofMode, SpoofState};
use crate::rng::DeterministicRng;
use crate::vfs::VirtualFs;
use crate::vfs::classify::DEFAULT_ALLOWED_PREFIXES;

/// Counters reported in the `server_shutdown` summary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSummary {
    /// Total requests handled (notifications excluded).
    pub requests: u64,
    /// Total `tools/call` invocations.
    pub tool_calls: u64,
    /// Total spoof events emitted.
    pub spoofs: u64,
    /// Whether the capability surface drifted during the run.
    pub drifted: bool,
}

/// Per-process adversarial state.
#[derive(Debug)]
pub struct Engine {
    kind: ServerKind,
    /// Drift state machine (capability and resource variants).
    pub drift: DriftState,
    /// Spoof state machine.
    pub spoof: SpoofState,
    /// Seeded generator for fabricated identifiers.
    pub rng: DeterministicRng,
    /// Read-only virtual filesystem.
    pub vfs: VirtualFs,
    requests: u64,
}

impl Engine {
    /// Assembles an engine from parsed configuration values.
    #[must_use]
    pub fn new(
        kind: ServerKind,
        drift_threshold: u64,
        drift_mode: DriftMode,
        spoof_mode: Option<SpoofMode>,
        spoof_rate: u64,
        seed: &str,
        vfs: VirtualFs,
    ) -> Self {
        Self {
            kind,
            drift: DriftState::new(drift_threshold, drift_mode),
            spoof: SpoofState::new(spoof_mode, spoof_rate),
            rng: DeterministicRng::from_seed_str(seed),
            vfs,
            requests: 0,
        }
    }

    /// Which adversarial server this engine drives.
    #[must_use]
    pub const fn kind(&self) -> ServerKind {
        self.kind
    }

    /// Records a handled request (for the shutdown summary).
    pub const fn note_request(&mut self) {
        self.requests += 1;
    }

    /// Records one `tools/call`: advances the drift counter and
    /// evaluates the spoof trigger in one step.
    pub const fn note_tool_call(&mut self) -> Option<SpoofMode> {
        self.drift.note_tool_call();
        self.spoof.note_tool_call()
    }

    /// Evaluates the drift trigger for a capability-listing request.
    ///
    /// Only the drift-exhibiting kinds ever flip; everything else stays
    /// baseline forever.
    pub const fn observe_listing(&mut self) -> Option<DriftActivation> {
        match self.kind {
            ServerKind::Drift | ServerKind::ResourceDrift => self.drift.observe_listing(),
            ServerKind::Spoof | ServerKind::Fs | ServerKind::Homoglyph => None,
        }
    }

    /// Allowed path prefixes for the classifier.
    #[must_use]
    pub const fn allowed_prefixes(&self) -> &'static [&'static str] {
        DEFAULT_ALLOWED_PREFIXES
    }

    /// Fabricates a response id that cannot collide with any live
    /// request id (client ids are numbers or short strings; these are
    /// UUID-shaped).
    pub fn fake_id(&mut self) -> Value {
        Value::String(self.rng.uuid_like())
    }

    /// Snapshot of run counters for the shutdown event.
    #[must_use]
    pub const fn summary(&self) -> EngineSummary {
        EngineSummary {
            requests: self.requests,
            tool_calls: self.drift.call_count(),
            spoofs: self.spoof.spoof_count(),
            drifted: self.drift.has_drifted(),
        }
    }
}
