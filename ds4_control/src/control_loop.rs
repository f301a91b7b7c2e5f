//! Control loop: input frames, stop-sequence timers and the periodic tick.
//!
//! Single-threaded owner of the state machine and the robot registry.
//! Input arrives through the [`InputMailbox`]; the loop sleeps until the
//! earliest of the next tick, the next stop-sequence deadline or a new
//! frame.
//!
//! ```text
//!  reader thread ──post──► InputMailbox ──wait──► ControlLoop
//!                                                   │ on_input  → SafetyStateMachine::handle_input
//!                                                   │ on_timer  → SafetyStateMachine::poll
//!                                                   │ tick      → quantize + dispatch
//!                                                   ▼
//!                                              RobotRegistry ──► Transport
//! ```

use ds4_common::input::InputSnapshot;
use ds4_common::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::mailbox::{Delivery, InputMailbox};
use crate::quantize::CommandQuantizer;
use crate::registry::RobotRegistry;
use crate::state::events::{ControlEvent, Events};
use crate::state::machine::SafetyStateMachine;

/// Ticks between periodic statistics reports.
const STATS_INTERVAL: u64 = 100;

/// Loop statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Input frames applied.
    pub inputs: u64,
    /// Teleop commands published.
    pub commands: u64,
    /// Error-level events (failed calls and publishes).
    pub failures: u64,
    /// Ticks that started a full period or more late.
    pub overruns: u64,
    /// Largest tick lateness.
    pub max_lateness: Duration,
}

impl LoopStats {
    fn record_events(&mut self, events: &[ControlEvent]) {
        self.failures += events.iter().filter(|e| e.is_error()).count() as u64;
    }
}

/// The teleop control loop.
pub struct ControlLoop {
    machine: SafetyStateMachine,
    registry: RobotRegistry,
    quantizer: CommandQuantizer,
    latest: InputSnapshot,
    tick_period: Duration,
    stats: LoopStats,
}

impl ControlLoop {
    /// Build the loop for `config` on top of `transport`.
    pub fn new(config: &NodeConfig, transport: Box<dyn Transport>) -> Self {
        let mode = config.robot_mode();
        let registry = RobotRegistry::new(mode, transport, config.service_timeout());
        let machine = SafetyStateMachine::new(
            mode.robot_count(),
            config.release_policy,
            config.settle_delay(),
        );
        info!(
            "Control loop: {} robot(s), tick={:?}, settle={:?}, release={:?}, transport={}",
            mode.robot_count(),
            config.tick_period(),
            config.settle_delay(),
            config.release_policy,
            registry.transport_name()
        );
        Self {
            machine,
            registry,
            quantizer: CommandQuantizer::new(
                config.max_linear_velocity,
                config.max_angular_velocity,
            ),
            latest: InputSnapshot::neutral(),
            tick_period: config.tick_period(),
            stats: LoopStats::default(),
        }
    }

    /// State machine (read-only).
    pub fn machine(&self) -> &SafetyStateMachine {
        &self.machine
    }

    /// Robot registry (read-only).
    pub fn registry(&self) -> &RobotRegistry {
        &self.registry
    }

    /// Most recently applied input frame.
    pub fn latest(&self) -> &InputSnapshot {
        &self.latest
    }

    /// Tick period.
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Statistics so far.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Apply an input frame.
    pub fn on_input(&mut self, snapshot: InputSnapshot, now: Instant) -> Events {
        let events = self.machine.handle_input(&snapshot, &mut self.registry, now);
        self.latest = snapshot;
        self.stats.inputs += 1;
        self.report(&events);
        events
    }

    /// Advance stop sequences to `now`.
    pub fn on_timer(&mut self, now: Instant) -> Events {
        let events = self.machine.poll(&mut self.registry, now);
        self.report(&events);
        events
    }

    /// Periodic tick: publish the addressed robot's pending command, if any.
    pub fn tick(&mut self) -> Option<ControlEvent> {
        let robot = self.machine.take_command_request()?;
        let command = self.quantizer.command(&self.latest);
        let event = match self
            .registry
            .dispatch_velocity(robot, command.linear, command.angular)
        {
            Ok(()) => {
                self.stats.commands += 1;
                ControlEvent::CommandDispatched { robot, command }
            }
            Err(e) => ControlEvent::CommandFailed {
                robot,
                reason: e.to_string(),
            },
        };
        self.report(std::slice::from_ref(&event));
        Some(event)
    }

    /// Run until `running` is cleared, or until input has ended and every
    /// stop sequence has completed.
    pub fn run(&mut self, mailbox: &InputMailbox, running: &AtomicBool) -> LoopStats {
        info!("Control loop started (period={:?})", self.tick_period);

        let mut next_tick = Instant::now() + self.tick_period;
        let mut input_closed = false;

        while running.load(Ordering::SeqCst) {
            if input_closed && !self.machine.is_stopping() {
                info!("Input ended and all robots settled");
                break;
            }

            let wake = self
                .machine
                .next_deadline()
                .map_or(next_tick, |deadline| deadline.min(next_tick));
            let timeout = wake.saturating_duration_since(Instant::now());

            if input_closed {
                thread::sleep(timeout);
            } else {
                match mailbox.wait(timeout) {
                    Delivery::Input(snapshot) => {
                        self.on_input(snapshot, Instant::now());
                    }
                    Delivery::Closed => {
                        input_closed = true;
                        warn!("Input stream closed, releasing controls");
                        self.on_input(InputSnapshot::neutral(), Instant::now());
                    }
                    Delivery::Timeout => {}
                }
            }

            let now = Instant::now();
            self.on_timer(now);

            if now >= next_tick {
                let lateness = now - next_tick;
                self.tick();
                self.stats.ticks += 1;
                self.stats.max_lateness = self.stats.max_lateness.max(lateness);

                next_tick += self.tick_period;
                if next_tick <= now {
                    self.stats.overruns += 1;
                    if self.stats.overruns <= 10 || self.stats.overruns % 1000 == 0 {
                        warn!(
                            "Tick overrun: {:?} late (total: {})",
                            lateness, self.stats.overruns
                        );
                    }
                    next_tick = now + self.tick_period;
                }

                if self.stats.ticks % STATS_INTERVAL == 0 {
                    debug!(
                        "Loop: {} ticks, {} inputs, {} commands, {} failures, overruns={}, max_late={:?}",
                        self.stats.ticks,
                        self.stats.inputs,
                        self.stats.commands,
                        self.stats.failures,
                        self.stats.overruns,
                        self.stats.max_lateness
                    );
                }
            }
        }

        info!(
            "Control loop stopped after {} ticks (overruns: {})",
            self.stats.ticks, self.stats.overruns
        );
        self.stats
    }

    /// Publish a final zero command to every robot not hard-stopped, then
    /// shut the transport down.
    pub fn shutdown(&mut self) {
        for idx in 0..self.machine.robot_count() {
            let Some(robot) = self.registry.selector(idx) else {
                continue;
            };
            let stopped = self
                .machine
                .slot(robot)
                .is_some_and(|slot| slot.is_emergency_stopped());
            if stopped {
                debug!("Robot {}: hard stop latched, no final stop command", robot.number());
                continue;
            }
            match self.registry.dispatch_velocity(robot, 0.0, 0.0) {
                Ok(()) => info!("Robot {}: final stop command sent", robot.number()),
                Err(e) => warn!("Robot {}: final stop command failed: {e}", robot.number()),
            }
        }
        self.registry.shutdown();
    }

    fn report(&mut self, events: &[ControlEvent]) {
        for event in events {
            event.emit();
        }
        self.stats.record_events(events);
    }
}
