//! System-wide constants for the DS4 teleop workspace.
//!
//! Single source of truth for controller layout, thresholds and default
//! limits. Imported by all crates; do not duplicate.
//!
//! # Controller layout (DualShock 4 through the ROS `joy` driver)
//!
//! ```text
//! buttons: 0 X, 1 O, 2 triangle, 3 square, 4 L1, 5 R1
//! axes:                      neutral    min    max
//!   3 right stick horiz.        0.0     1.0   -1.0   (turn)
//!   4 right stick vert.         0.0    -1.0    1.0   (forward)
//!   5 R2 trigger                1.0    -1.0    1.0   (safety enable)
//!   6 d-pad horizontal          0.0   left 1.0, right -1.0 (robot select)
//! ```

use static_assertions::const_assert;

/// Maximum number of robots the node can address.
pub const MAX_ROBOTS: usize = 2;

/// Capacity of the button array in an [`InputSnapshot`](crate::input::InputSnapshot).
pub const MAX_BUTTONS: usize = 32;

/// Capacity of the axis array in an [`InputSnapshot`](crate::input::InputSnapshot).
pub const MAX_AXES: usize = 16;

/// Triangle button (hard stop).
pub const BUTTON_TRIANGLE: usize = 2;

/// Left shoulder button (L1).
pub const BUTTON_L1: usize = 4;

/// Right shoulder button (R1).
pub const BUTTON_R1: usize = 5;

/// Right stick horizontal: angular velocity.
pub const AXIS_TURN: usize = 3;

/// Right stick vertical: linear velocity.
pub const AXIS_FORWARD: usize = 4;

/// R2 trigger: safety enable (neutral 1.0, pressed -1.0).
pub const AXIS_SAFETY: usize = 5;

/// D-pad horizontal: robot selection.
pub const AXIS_SELECT: usize = 6;

/// Minimum number of buttons a frame must carry to be usable.
pub const MIN_BUTTONS: usize = BUTTON_R1 + 1;

/// Minimum number of axes a frame must carry to be usable.
///
/// The select axis is optional and reads as neutral when absent.
pub const MIN_AXES: usize = AXIS_SAFETY + 1;

/// Safety axis at or below this value means the operator holds the enable trigger.
pub const SAFETY_PRESSED_THRESHOLD: f32 = -0.8;

/// Select axis at or above this value addresses the first robot.
pub const SELECT_FIRST_THRESHOLD: f32 = 0.8;

/// Select axis at or below this value addresses the second robot.
pub const SELECT_SECOND_THRESHOLD: f32 = -0.8;

/// Default maximum linear velocity (full stick deflection).
pub const MAX_LIN_VEL: f64 = 0.2;

/// Default maximum angular velocity (full stick deflection).
pub const MAX_ANG_VEL: f64 = 0.8;

/// Command resolution steps per unit (0.01 resolution).
pub const QUANTIZE_STEPS: f64 = 100.0;

/// Default control loop rate [Hz].
pub const DEFAULT_TICK_RATE_HZ: f64 = 10.0;

/// Default settle delay around the zero-velocity stop command [ms].
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 150;

/// Default timeout for hard-stop trigger/release service calls [ms].
pub const DEFAULT_SERVICE_TIMEOUT_MS: u64 = 1000;

/// Default service name used in logs.
pub const DEFAULT_SERVICE_NAME: &str = "ds4_control";

const_assert!(MAX_ROBOTS == 2);
const_assert!(AXIS_SELECT < MAX_AXES);
const_assert!(MIN_AXES <= MAX_AXES);
const_assert!(MIN_BUTTONS <= MAX_BUTTONS);
