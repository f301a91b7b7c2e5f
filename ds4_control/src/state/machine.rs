//! Safety state machine: input frame → per-robot transitions.
//!
//! Rules, evaluated on every input frame for the addressed robot:
//!
//! 1. Robot selection (multi-robot only; may combine with one of 2–5).
//! 2. Triangle alone, not latched → call hard stop; latch on success only.
//! 3. Triangle + L1 + R1, latched → release (see [`ReleasePolicy`]).
//! 4. Safety trigger held → `Holding`, command pending.
//! 5. Safety trigger released while `Holding` → `Normal`, stop sequence.
//!
//! Rules 2–5 form an if/else-if chain: at most one fires per frame.
//! The stop sequence is advanced by [`SafetyStateMachine::poll`].

use ds4_common::consts::{MAX_ROBOTS, SELECT_FIRST_THRESHOLD, SELECT_SECOND_THRESHOLD};
use ds4_common::input::InputSnapshot;
use heapless::Vec as FixedVec;
use std::time::{Duration, Instant};

use crate::config::ReleasePolicy;
use crate::registry::{RobotRegistry, RobotSelector};
use crate::state::events::{ControlEvent, Events};
use crate::state::slot::{RobotSlot, StopStep};

/// Per-robot safety state and the addressed-robot selection.
#[derive(Debug, Clone)]
pub struct SafetyStateMachine {
    slots: FixedVec<RobotSlot, MAX_ROBOTS>,
    addressed: RobotSelector,
    release_policy: ReleasePolicy,
    settle_delay: Duration,
}

impl SafetyStateMachine {
    /// Create `robot_count` slots (clamped to `1..=MAX_ROBOTS`), addressing the first.
    pub fn new(robot_count: usize, release_policy: ReleasePolicy, settle_delay: Duration) -> Self {
        let count = robot_count.clamp(1, MAX_ROBOTS);
        let slots = (0..count)
            .filter_map(|idx| RobotSelector::new(idx, count))
            .map(RobotSlot::new)
            .collect();
        Self {
            slots,
            addressed: RobotSelector::FIRST,
            release_policy,
            settle_delay,
        }
    }

    /// Number of robot slots.
    #[inline]
    pub fn robot_count(&self) -> usize {
        self.slots.len()
    }

    /// Robot currently receiving commands.
    #[inline]
    pub const fn addressed(&self) -> RobotSelector {
        self.addressed
    }

    /// Slot of `robot`, if configured.
    pub fn slot(&self, robot: RobotSelector) -> Option<&RobotSlot> {
        self.slots.get(robot.index())
    }

    /// Slot of the addressed robot.
    pub fn addressed_slot(&self) -> &RobotSlot {
        // `addressed` is only ever set from a selector validated against `slots`.
        &self.slots[self.addressed.index()]
    }

    /// Release policy in effect.
    #[inline]
    pub const fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    /// Apply one input frame.
    ///
    /// Hard-stop service calls are made synchronously through `registry`.
    pub fn handle_input(
        &mut self,
        snapshot: &InputSnapshot,
        registry: &mut RobotRegistry,
        now: Instant,
    ) -> Events {
        let mut events = Events::new();

        if self.slots.len() > 1 {
            if let Some(target) = self.selection_target(snapshot.select()) {
                if target != self.addressed {
                    self.addressed = target;
                    let _ = events.push(ControlEvent::RobotSelected { robot: target });
                }
            }
        }

        let robot = self.addressed;
        let pressed = snapshot.pressed();
        let policy = self.release_policy;
        let settle = self.settle_delay;
        let slot = &mut self.slots[robot.index()];

        let event = if pressed.is_hard_stop() && !slot.is_emergency_stopped() {
            match registry.trigger_hard_stop(robot) {
                Ok(()) => {
                    slot.engage_emergency_stop();
                    Some(ControlEvent::HardStopEngaged { robot })
                }
                Err(e) => Some(ControlEvent::HardStopFailed {
                    robot,
                    reason: e.to_string(),
                }),
            }
        } else if pressed.is_hard_stop_release() && slot.is_emergency_stopped() {
            if policy == ReleasePolicy::Optimistic {
                slot.release_emergency_stop();
            }
            match registry.release_hard_stop(robot) {
                Ok(()) => {
                    slot.release_emergency_stop();
                    Some(ControlEvent::HardStopReleased { robot })
                }
                Err(e) => Some(ControlEvent::HardStopReleaseFailed {
                    robot,
                    reason: e.to_string(),
                }),
            }
        } else if snapshot.safety_pressed() {
            slot.engage_hold()
                .then_some(ControlEvent::SafetyHoldEngaged { robot })
        } else if slot.is_holding() {
            slot.release_hold(now, settle);
            Some(ControlEvent::SafetyStop { robot })
        } else {
            None
        };

        if let Some(event) = event {
            let _ = events.push(event);
        }
        events
    }

    /// Advance running stop sequences to `now`, dispatching due zero commands.
    pub fn poll(&mut self, registry: &mut RobotRegistry, now: Instant) -> Events {
        let mut events = Events::new();

        for slot in self.slots.iter_mut() {
            let robot = slot.selector();
            let step = match slot.stop_sequence_mut() {
                Some(seq) => seq.advance(now),
                None => continue,
            };

            match step {
                StopStep::Wait => {}
                StopStep::DispatchZero if slot.is_emergency_stopped() => {
                    let _ = events.push(ControlEvent::StopCommandSkipped { robot });
                }
                StopStep::DispatchZero => {
                    let event = match registry.dispatch_velocity(robot, 0.0, 0.0) {
                        Ok(()) => ControlEvent::StopCommandSent { robot },
                        Err(e) => ControlEvent::StopCommandFailed {
                            robot,
                            reason: e.to_string(),
                        },
                    };
                    let _ = events.push(event);
                }
                StopStep::Complete => slot.finish_stop_sequence(),
            }
        }

        events
    }

    /// Earliest instant a running stop sequence needs [`poll`](Self::poll).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots
            .iter()
            .filter_map(|slot| slot.stop_sequence().map(|seq| seq.deadline()))
            .min()
    }

    /// Whether any stop sequence is running.
    pub fn is_stopping(&self) -> bool {
        self.slots.iter().any(RobotSlot::is_stopping)
    }

    /// Claim the addressed robot's pending command.
    ///
    /// Returns the robot to command if it is holding, has a fresh command,
    /// is not hard-stopped and has no stop sequence running. Clears the
    /// pending flag.
    pub fn take_command_request(&mut self) -> Option<RobotSelector> {
        let robot = self.addressed;
        let slot = self.slots.get_mut(robot.index())?;
        if slot.is_emergency_stopped() {
            return None;
        }
        slot.take_command().then_some(robot)
    }

    fn selection_target(&self, select: f32) -> Option<RobotSelector> {
        if select >= SELECT_FIRST_THRESHOLD {
            RobotSelector::new(0, self.slots.len())
        } else if select <= SELECT_SECOND_THRESHOLD {
            RobotSelector::new(1, self.slots.len())
        } else {
            None
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
