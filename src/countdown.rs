use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Wall-clock period of one tick, and the amount each tick takes off the clock.
pub const TICK_RATE_MS: u64 = 100;

/// When a running countdown counts as expired.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExpiryRule {
    /// Expire only when the remaining time lands exactly on zero.
    #[default]
    Exact,
    /// Expire once the remaining time is zero or below.
    Threshold,
}

impl ExpiryRule {
    fn is_expired(self, remaining_ms: i64) -> bool {
        match self {
            ExpiryRule::Exact => remaining_ms == 0,
            ExpiryRule::Threshold => remaining_ms <= 0,
        }
    }
}

/// Identifies one timer registration. A new handle is issued on every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running(TimerHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No timer registered; the tick was dropped.
    Ignored,
    Running,
    /// The countdown hit its terminal condition and has already been stopped.
    Expired,
}

/// Per-question countdown owned by the session.
#[derive(Debug, Clone)]
pub struct Countdown {
    phase: TimerPhase,
    remaining_ms: Option<i64>,
    rule: ExpiryRule,
    next_handle: u64,
}

impl Countdown {
    pub fn new(rule: ExpiryRule) -> Self {
        Self {
            phase: TimerPhase::Idle,
            remaining_ms: None,
            rule,
            next_handle: 0,
        }
    }

    /// Register a fresh timer for `limit_ms`, clearing any existing one first.
    pub fn start(&mut self, limit_ms: u64) -> TimerHandle {
        self.stop();
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.remaining_ms = Some(limit_ms as i64);
        self.phase = TimerPhase::Running(handle);
        handle
    }

    /// Unregister the timer; the remaining time is kept for display.
    pub fn stop(&mut self) -> Option<TimerHandle> {
        match std::mem::replace(&mut self.phase, TimerPhase::Idle) {
            TimerPhase::Running(handle) => Some(handle),
            TimerPhase::Idle => None,
        }
    }

    pub fn clear(&mut self) {
        self.stop();
        self.remaining_ms = None;
    }

    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Ignored;
        }

        let remaining = self.remaining_ms.unwrap_or_default() - TICK_RATE_MS as i64;
        self.remaining_ms = Some(remaining);

        if self.rule.is_expired(remaining) {
            self.stop();
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        match self.phase {
            TimerPhase::Running(handle) => Some(handle),
            TimerPhase::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, TimerPhase::Running(_))
    }

    pub fn remaining_ms(&self) -> Option<i64> {
        self.remaining_ms
    }

    pub fn rule(&self) -> ExpiryRule {
        self.rule
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(ExpiryRule::default())
    }
}
