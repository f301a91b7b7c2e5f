//! Robot registry: per-robot outbound channels behind one transport.
//!
//! Maps a validated [`RobotSelector`] to the robot's velocity channel and
//! its hard-stop trigger/release services, and performs the publish/call
//! through the configured [`Transport`].

use ds4_common::consts::MAX_ROBOTS;
use ds4_common::transport::{Transport, TransportError, VelocityCommand};
use heapless::Vec as FixedVec;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RobotMode;

/// Velocity topic name.
pub const CMD_VEL: &str = "cmd_vel";
/// Hard-stop trigger service name.
pub const HARD_STOP: &str = "hard_stop";
/// Hard-stop release service name.
pub const DISABLE_HARD_STOP: &str = "disable_hard_stop";

/// Validated index of a configured robot slot.
///
/// Only obtainable through [`RobotSelector::new`], which checks the index
/// against the configured robot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RobotSelector(u8);

impl RobotSelector {
    /// First robot; always configured.
    pub const FIRST: Self = Self(0);

    /// Validate `index` against `robot_count`.
    pub fn new(index: usize, robot_count: usize) -> Option<Self> {
        (index < robot_count.min(MAX_ROBOTS)).then_some(Self(index as u8))
    }

    /// Zero-based slot index.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// One-based robot number, as shown to the operator.
    #[inline]
    pub const fn number(&self) -> usize {
        self.0 as usize + 1
    }
}

impl fmt::Display for RobotSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "robot {}", self.number())
    }
}

/// The three outbound channels of one robot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotChannels {
    /// Velocity command topic.
    pub cmd_vel: String,
    /// Hard-stop trigger service.
    pub hard_stop: String,
    /// Hard-stop release service.
    pub disable_hard_stop: String,
}

impl RobotChannels {
    /// Channels under `namespace` (`""` for the root namespace).
    pub fn in_namespace(namespace: &str) -> Self {
        Self {
            cmd_vel: format!("{namespace}/{CMD_VEL}"),
            hard_stop: format!("{namespace}/{HARD_STOP}"),
            disable_hard_stop: format!("{namespace}/{DISABLE_HARD_STOP}"),
        }
    }

    /// Channel set for each slot of `mode`.
    pub fn for_mode(mode: RobotMode) -> FixedVec<Self, MAX_ROBOTS> {
        let mut channels = FixedVec::new();
        match mode {
            RobotMode::Single => {
                let _ = channels.push(Self::in_namespace(""));
            }
            RobotMode::Dual => {
                let _ = channels.push(Self::in_namespace("/r1"));
                let _ = channels.push(Self::in_namespace("/r2"));
            }
        }
        channels
    }
}

/// Failures of registry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// Selector does not address a configured robot.
    #[error("{0} is not configured")]
    UnknownRobot(RobotSelector),

    /// Service answered with `success == false`.
    #[error("{service} refused: {message}")]
    Refused {
        /// Service name.
        service: String,
        /// Message returned by the service.
        message: String,
    },

    /// Transport-level failure (including timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Outbound channels of every configured robot.
pub struct RobotRegistry {
    channels: FixedVec<RobotChannels, MAX_ROBOTS>,
    transport: Box<dyn Transport>,
    service_timeout: Duration,
}

impl RobotRegistry {
    /// Build the registry for `mode` on top of `transport`.
    pub fn new(mode: RobotMode, transport: Box<dyn Transport>, service_timeout: Duration) -> Self {
        let channels = RobotChannels::for_mode(mode);
        for (idx, ch) in channels.iter().enumerate() {
            info!(
                "Robot {}: {} | {} | {}",
                idx + 1,
                ch.cmd_vel,
                ch.hard_stop,
                ch.disable_hard_stop
            );
        }
        Self {
            channels,
            transport,
            service_timeout,
        }
    }

    /// Number of configured robots.
    pub fn robot_count(&self) -> usize {
        self.channels.len()
    }

    /// Validated selector for `index`, if configured.
    pub fn selector(&self, index: usize) -> Option<RobotSelector> {
        RobotSelector::new(index, self.robot_count())
    }

    /// Channels of `robot`.
    pub fn channels(&self, robot: RobotSelector) -> Option<&RobotChannels> {
        self.channels.get(robot.index())
    }

    /// Name of the underlying transport.
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Publish a velocity command to `robot`.
    ///
    /// # Errors
    /// Returns `RegistryError` if the robot is unknown or the publish fails.
    pub fn dispatch_velocity(
        &mut self,
        robot: RobotSelector,
        linear: f64,
        angular: f64,
    ) -> Result<(), RegistryError> {
        let channel = &self
            .channels
            .get(robot.index())
            .ok_or(RegistryError::UnknownRobot(robot))?
            .cmd_vel;
        debug!("{channel}: linear={linear:.2} angular={angular:.2}");
        self.transport
            .publish_velocity(channel, VelocityCommand::new(linear, angular))?;
        Ok(())
    }

    /// Call the hard-stop trigger service of `robot` and wait for the answer.
    ///
    /// # Errors
    /// Returns `RegistryError` on refusal, timeout or transport failure.
    pub fn trigger_hard_stop(&mut self, robot: RobotSelector) -> Result<(), RegistryError> {
        let service = self
            .channels
            .get(robot.index())
            .ok_or(RegistryError::UnknownRobot(robot))?
            .hard_stop
            .clone();
        self.call(&service)
    }

    /// Call the hard-stop release service of `robot` and wait for the answer.
    ///
    /// # Errors
    /// Returns `RegistryError` on refusal, timeout or transport failure.
    pub fn release_hard_stop(&mut self, robot: RobotSelector) -> Result<(), RegistryError> {
        let service = self
            .channels
            .get(robot.index())
            .ok_or(RegistryError::UnknownRobot(robot))?
            .disable_hard_stop
            .clone();
        self.call(&service)
    }

    /// Shut the transport down.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.transport.shutdown() {
            warn!("Transport shutdown failed: {e}");
        }
    }

    fn call(&mut self, service: &str) -> Result<(), RegistryError> {
        let started = Instant::now();
        let response = self.transport.call_trigger(service, self.service_timeout)?;

        // A late answer counts as a timeout even if the transport returned it.
        if started.elapsed() > self.service_timeout {
            return Err(TransportError::Timeout {
                service: service.to_string(),
                timeout_ms: self.service_timeout.as_millis() as u64,
            }
            .into());
        }

        if response.success {
            Ok(())
        } else {
            Err(RegistryError::Refused {
                service: service.to_string(),
                message: response.message,
            })
        }
    }
}
