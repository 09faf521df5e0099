//! Protocol-spoofing state machine.
//!
//! Probes a downstream proxy's request/response correlation. Triggering
//! is rate-based: every `rate`-th `tools/call` (1-indexed) is spoofed.
//! The spoof never touches the computed result content, only the
//! envelope — id, count, timing — so content correctness stays
//! verifiable in every mode.

use clap::ValueEnum;
use serde::Serialize;

/// Correlation-violation flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoofMode {
    /// Send the correct response, then the identical payload again.
    DuplicateResponse,
    /// Send the correct payload under a freshly fabricated id.
    WrongId,
    /// Emit fabricated responses from a background timer, unrelated to
    /// any inbound request.
    Unsolicited,
}

impl SpoofMode {
    /// Wire tag used in log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateResponse => "duplicate_response",
            Self::WrongId => "wrong_id",
            Self::Unsolicited => "unsolicited",
        }
    }
}

/// Mutable spoof state, owned by a single engine instance.
#[derive(Debug, Clone)]
pub struct SpoofState {
    request_count: u64,
    spoof_count: u64,
    mode: Option<SpoofMode>,
    rate: u64,
}

impl SpoofState {
    /// Creates a spoof state. `mode` of `None` disables spoofing
    /// entirely; `rate` below 1 is clamped to 1.
    #[must_use]
    pub const fn new(mode: Option<SpoofMode>, rate: u64) -> Self {
        Self {
            request_count: 0,
            spoof_count: 0,
            mode,
            rate: if rate == 0 { 1 } else { rate },
        }
    }

    /// Records one `tools/call` and reports whether this call spoofs.
    ///
    /// Only the per-response modes trigger here; `unsolicited` runs off
    /// its own timer and never spoofs individual calls.
    pub const fn note_tool_call(&mut self) -> Option<SpoofMode> {
        self.request_count += 1;
        match self.mode {
            Some(mode @ (SpoofMode::DuplicateResponse | SpoofMode::WrongId))
                if self.request_count % self.rate == 0 =>
            {
                self.spoof_count += 1;
                Some(mode)
            }
            _ => None,
        }
    }

    /// Configured mode, if any.
    #[must_use]
    pub const fn mode(&self) -> Option<SpoofMode> {
        self.mode
    }

    /// Total `tools/call` invocations seen.
    #[must_use]
    pub const fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Total per-call spoof events triggered. Timer-driven unsolicited
    /// emissions are counted by the server runtime, not here.
    #[must_use]
    pub const fn spoof_count(&self) -> u64 {
        self.spoof_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_mode_never_triggers() {
        let mut state = SpoofState::new(None, 1);
        for _ in 0..20 {
            assert!(state.note_tool_call().is_none());
        }
        assert_eq!(state.spoof_count(), 0);
    }

    #[test]
    fn triggers_on_every_rate_th_call() {
        let mut state = SpoofState::new(Some(SpoofMode::DuplicateResponse), 3);
        let fired: Vec<bool> = (0..9).map(|_| state.note_tool_call().is_some()).collect();
        assert_eq!(
            fired,
            vec![false, false, true, false, false, true, false, false, true]
        );
        assert_eq!(state.spoof_count(), 3);
    }

    #[test]
    fn rate_one_triggers_every_call() {
        let mut state = SpoofState::new(Some(SpoofMode::WrongId), 1);
        for _ in 0..5 {
            assert_eq!(state.note_tool_call(), Some(SpoofMode::WrongId));
        }
        assert_eq!(state.spoof_count(), 5);
    }

    #[test]
    fn zero_rate_is_clamped() {
        let mut state = SpoofState::new(Some(SpoofMode::DuplicateResponse), 0);
        assert!(state.note_tool_call().is_some());
    }

    #[test]
    fn unsolicited_never_spoofs_per_call() {
        let mut state = SpoofState::new(Some(SpoofMode::Unsolicited), 1);
        for _ in 0..10 {
            assert!(state.note_tool_call().is_none());
        }
        assert_eq!(state.spoof_count(), 0);
        assert_eq!(state.request_count(), 10);
    }

    #[test]
    fn mode_tags_are_stable() {
        assert_eq!(SpoofMode::DuplicateResponse.as_str(), "duplicate_response");
        assert_eq!(SpoofMode::WrongId.as_str(), "wrong_id");
        assert_eq!(SpoofMode::Unsolicited.as_str(), "unsolicited");
    }
}
