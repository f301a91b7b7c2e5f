//! Operator-facing events reported by the state machine and control loop.

use ds4_common::transport::VelocityCommand;
use heapless::Vec as FixedVec;
use std::fmt;
use tracing::{Level, debug, error, info, warn};

use crate::registry::RobotSelector;

/// Events produced by a single input frame, timer poll or tick.
pub type Events = FixedVec<ControlEvent, 4>;

/// Something the operator should know about.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Addressed robot changed.
    RobotSelected { robot: RobotSelector },
    /// Hard stop latched after the trigger service confirmed.
    HardStopEngaged { robot: RobotSelector },
    /// Hard stop trigger call failed; nothing latched.
    HardStopFailed { robot: RobotSelector, reason: String },
    /// Hard stop released.
    HardStopReleased { robot: RobotSelector },
    /// Hard stop release call failed.
    HardStopReleaseFailed { robot: RobotSelector, reason: String },
    /// Enable trigger pressed.
    SafetyHoldEngaged { robot: RobotSelector },
    /// Enable trigger released; stop sequence scheduled.
    SafetyStop { robot: RobotSelector },
    /// Zero-velocity stop command published.
    StopCommandSent { robot: RobotSelector },
    /// Zero-velocity stop command skipped (robot hard-stopped).
    StopCommandSkipped { robot: RobotSelector },
    /// Zero-velocity stop command could not be published.
    StopCommandFailed { robot: RobotSelector, reason: String },
    /// Teleop command published.
    CommandDispatched {
        robot: RobotSelector,
        command: VelocityCommand,
    },
    /// Teleop command could not be published.
    CommandFailed { robot: RobotSelector, reason: String },
}

impl ControlEvent {
    /// Robot the event refers to.
    pub const fn robot(&self) -> RobotSelector {
        match self {
            Self::RobotSelected { robot }
            | Self::HardStopEngaged { robot }
            | Self::HardStopFailed { robot, .. }
            | Self::HardStopReleased { robot }
            | Self::HardStopReleaseFailed { robot, .. }
            | Self::SafetyHoldEngaged { robot }
            | Self::SafetyStop { robot }
            | Self::StopCommandSent { robot }
            | Self::StopCommandSkipped { robot }
            | Self::StopCommandFailed { robot, .. }
            | Self::CommandDispatched { robot, .. }
            | Self::CommandFailed { robot, .. } => *robot,
        }
    }

    /// Log severity.
    pub const fn level(&self) -> Level {
        match self {
            Self::HardStopFailed { .. }
            | Self::HardStopReleaseFailed { .. }
            | Self::StopCommandFailed { .. }
            | Self::CommandFailed { .. } => Level::ERROR,
            Self::RobotSelected { .. }
            | Self::HardStopEngaged { .. }
            | Self::HardStopReleased { .. } => Level::WARN,
            Self::SafetyStop { .. } => Level::INFO,
            Self::SafetyHoldEngaged { .. }
            | Self::StopCommandSent { .. }
            | Self::StopCommandSkipped { .. }
            | Self::CommandDispatched { .. } => Level::DEBUG,
        }
    }

    /// Whether this is an error-level event.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.level() == Level::ERROR
    }

    /// Write the event to the log at its severity.
    pub fn emit(&self) {
        let robot = self.robot().number();
        let level = self.level();
        if level == Level::ERROR {
            error!(robot, "{self}");
        } else if level == Level::WARN {
            warn!(robot, "{self}");
        } else if level == Level::INFO {
            info!(robot, "{self}");
        } else {
            debug!(robot, "{self}");
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let robot = self.robot().number();
        match self {
            Self::RobotSelected { .. } => write!(f, "Switch to robot {robot}"),
            Self::HardStopEngaged { .. } => write!(f, "Robot {robot}: HARD STOP!"),
            Self::HardStopFailed { reason, .. } => {
                write!(f, "Robot {robot}: can't call hard stop service: {reason}")
            }
            Self::HardStopReleased { .. } => write!(f, "Robot {robot}: HARD STOP DISABLED!"),
            Self::HardStopReleaseFailed { reason, .. } => write!(
                f,
                "Robot {robot}: can't call disable hard stop service: {reason}"
            ),
            Self::SafetyHoldEngaged { .. } => write!(f, "Robot {robot}: safety trigger held"),
            Self::SafetyStop { .. } => write!(f, "Robot {robot}: safety stop"),
            Self::StopCommandSent { .. } => write!(f, "Robot {robot}: stop command sent"),
            Self::StopCommandSkipped { .. } => {
                write!(f, "Robot {robot}: stop command skipped, hard stop latched")
            }
            Self::StopCommandFailed { reason, .. } => {
                write!(f, "Robot {robot}: stop command failed: {reason}")
            }
            Self::CommandDispatched { command, .. } => write!(
                f,
                "Robot {robot}: linear={:.2} angular={:.2}",
                command.linear, command.angular
            ),
            Self::CommandFailed { reason, .. } => {
                write!(f, "Robot {robot}: velocity command failed: {reason}")
            }
        }
    }
}
