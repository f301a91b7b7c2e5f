//! Shared fixtures for the integration tests.

mod end_to_end;
mod hard_stop;
mod safety_hold;

use ds4_common::consts::{AXIS_FORWARD, AXIS_SAFETY, AXIS_SELECT, AXIS_TURN};
use ds4_common::consts::{BUTTON_L1, BUTTON_R1, BUTTON_TRIANGLE};
use ds4_common::input::InputSnapshot;
use ds4_control::config::{NodeConfig, ReleasePolicy};
use ds4_control::control_loop::ControlLoop;
use ds4_control::transport::recording::{RecordingHandle, RecordingTransport};
use std::time::Duration;

/// Settle delay used by every fixture.
pub const SETTLE: Duration = Duration::from_millis(150);

/// Node config with `robots` robots and the given release policy.
pub fn config(robots: i64, release_policy: ReleasePolicy) -> NodeConfig {
    NodeConfig {
        number_of_robots: robots,
        release_policy,
        settle_delay_ms: SETTLE.as_millis() as u64,
        ..NodeConfig::default()
    }
}

/// Control loop over a recording transport.
pub fn control_loop(robots: i64, release_policy: ReleasePolicy) -> (ControlLoop, RecordingHandle) {
    let (transport, handle) = RecordingTransport::new();
    let cl = ControlLoop::new(&config(robots, release_policy), Box::new(transport));
    (cl, handle)
}

pub fn neutral() -> InputSnapshot {
    InputSnapshot::neutral()
}

/// Triangle alone.
pub fn triangle() -> InputSnapshot {
    neutral().with_button(BUTTON_TRIANGLE, true)
}

/// Triangle + L1 + R1.
pub fn release_combo() -> InputSnapshot {
    triangle()
        .with_button(BUTTON_L1, true)
        .with_button(BUTTON_R1, true)
}

/// Safety trigger fully pressed with the given stick deflection.
pub fn hold(forward: f32, turn: f32) -> InputSnapshot {
    neutral()
        .with_axis(AXIS_SAFETY, -1.0)
        .with_axis(AXIS_FORWARD, forward)
        .with_axis(AXIS_TURN, turn)
}

/// D-pad selection: `1.0` = first robot, `-1.0` = second robot.
pub fn select(value: f32) -> InputSnapshot {
    neutral().with_axis(AXIS_SELECT, value)
}
