//! Per-robot slot state and the zero-velocity stop sequence.
//!
//! A slot is in exactly one [`SlotMode`]; the pending-command flag and the
//! stop sequence are tracked alongside it.
//!
//! Stop sequence (safety-hold release):
//! `SettleBefore` → dispatch zero → `SettleAfter` → done.

use std::time::{Duration, Instant};

use crate::registry::RobotSelector;

/// Motion-relevant state of one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotMode {
    /// Enable trigger released, no hard stop.
    #[default]
    Normal,
    /// Operator holds the enable trigger; teleop commands may flow.
    Holding,
    /// Hard stop latched; no velocity is dispatched.
    EmergencyStopped,
}

/// Phase of a running stop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPhase {
    /// Waiting before the zero command.
    SettleBefore {
        /// Zero command is due at this instant.
        until: Instant,
    },
    /// Zero command sent, waiting before commands may flow again.
    SettleAfter {
        /// Sequence completes at this instant.
        until: Instant,
    },
}

/// What the caller must do after advancing a stop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStep {
    /// Deadline not reached.
    Wait,
    /// Publish the zero-velocity command now.
    DispatchZero,
    /// Sequence finished.
    Complete,
}

/// Deferred zero-velocity stop with a settle delay on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopSequence {
    phase: StopPhase,
    settle: Duration,
}

impl StopSequence {
    /// Start a sequence at `now`.
    pub fn start(now: Instant, settle: Duration) -> Self {
        Self {
            phase: StopPhase::SettleBefore {
                until: now + settle,
            },
            settle,
        }
    }

    /// Current phase.
    #[inline]
    pub const fn phase(&self) -> StopPhase {
        self.phase
    }

    /// Instant at which the sequence next needs attention.
    #[inline]
    pub const fn deadline(&self) -> Instant {
        match self.phase {
            StopPhase::SettleBefore { until } | StopPhase::SettleAfter { until } => until,
        }
    }

    /// Advance to `now`.
    pub fn advance(&mut self, now: Instant) -> StopStep {
        match self.phase {
            StopPhase::SettleBefore { until } if now >= until => {
                self.phase = StopPhase::SettleAfter {
                    until: now + self.settle,
                };
                StopStep::DispatchZero
            }
            StopPhase::SettleAfter { until } if now >= until => StopStep::Complete,
            _ => StopStep::Wait,
        }
    }
}

/// One addressable robot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotSlot {
    selector: RobotSelector,
    mode: SlotMode,
    command_pending: bool,
    stop_sequence: Option<StopSequence>,
}

impl RobotSlot {
    /// New slot in `Normal` mode with nothing pending.
    pub const fn new(selector: RobotSelector) -> Self {
        Self {
            selector,
            mode: SlotMode::Normal,
            command_pending: false,
            stop_sequence: None,
        }
    }

    #[inline]
    pub const fn selector(&self) -> RobotSelector {
        self.selector
    }

    #[inline]
    pub const fn mode(&self) -> SlotMode {
        self.mode
    }

    #[inline]
    pub const fn is_emergency_stopped(&self) -> bool {
        matches!(self.mode, SlotMode::EmergencyStopped)
    }

    #[inline]
    pub const fn is_holding(&self) -> bool {
        matches!(self.mode, SlotMode::Holding)
    }

    #[inline]
    pub const fn command_pending(&self) -> bool {
        self.command_pending
    }

    /// A stop sequence is running.
    #[inline]
    pub const fn is_stopping(&self) -> bool {
        self.stop_sequence.is_some()
    }

    #[inline]
    pub const fn stop_sequence(&self) -> Option<&StopSequence> {
        self.stop_sequence.as_ref()
    }

    /// Latch the hard stop. Any pending command is discarded.
    pub(crate) fn engage_emergency_stop(&mut self) {
        self.mode = SlotMode::EmergencyStopped;
        self.command_pending = false;
    }

    /// Unlatch the hard stop.
    pub(crate) fn release_emergency_stop(&mut self) {
        self.mode = SlotMode::Normal;
    }

    /// Enable trigger held: mark a fresh command available.
    ///
    /// Returns `true` on the `Normal → Holding` edge. No effect while hard-stopped.
    pub(crate) fn engage_hold(&mut self) -> bool {
        match self.mode {
            SlotMode::EmergencyStopped => false,
            SlotMode::Holding => {
                self.command_pending = true;
                false
            }
            SlotMode::Normal => {
                self.mode = SlotMode::Holding;
                self.command_pending = true;
                true
            }
        }
    }

    /// Enable trigger released: leave `Holding` and schedule the stop sequence.
    ///
    /// A sequence still waiting to send its zero keeps its deadline, so
    /// repeated release edges cannot postpone the stop command.
    pub(crate) fn release_hold(&mut self, now: Instant, settle: Duration) {
        self.mode = SlotMode::Normal;
        self.command_pending = false;
        let zero_due = matches!(
            self.stop_sequence.map(|seq| seq.phase()),
            Some(StopPhase::SettleBefore { .. })
        );
        if !zero_due {
            self.stop_sequence = Some(StopSequence::start(now, settle));
        }
    }

    /// Consume the pending command if one may be dispatched now.
    pub(crate) fn take_command(&mut self) -> bool {
        if self.is_holding() && self.command_pending && !self.is_stopping() {
            self.command_pending = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn stop_sequence_mut(&mut self) -> Option<&mut StopSequence> {
        self.stop_sequence.as_mut()
    }

    pub(crate) fn finish_stop_sequence(&mut self) {
        self.stop_sequence = None;
    }
}
