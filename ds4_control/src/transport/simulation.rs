//! Simulation transport.
//!
//! Emulates the robot side in process: each robot namespace has a
//! hard-stop latch and the last accepted velocity. Velocity commands are
//! ignored while the latch is set, as a real base would.
//!
//! ```toml
//! [transport_config.simulation]
//! fail_services = ["/r2/hard_stop"]   # answer success = false
//! response_delay_ms = 0               # service latency
//! ```

use ds4_common::transport::{Transport, TransportError, TriggerResponse, VelocityCommand};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::registry::{CMD_VEL, DISABLE_HARD_STOP, HARD_STOP};

/// Registry name of this transport.
pub const NAME: &str = "simulation";

/// `[transport_config.simulation]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Services that answer `success = false`.
    #[serde(default)]
    pub fail_services: Vec<String>,
    /// Simulated service latency [ms].
    #[serde(default)]
    pub response_delay_ms: u64,
}

impl SimulationConfig {
    /// Parse the transport section.
    ///
    /// # Errors
    /// Returns `TransportError::ConfigError` on unknown keys or wrong types.
    pub fn from_section(section: &toml::Table) -> Result<Self, TransportError> {
        toml::Value::Table(section.clone())
            .try_into()
            .map_err(|e: toml::de::Error| TransportError::ConfigError(e.to_string()))
    }
}

/// Simulated state of one robot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulatedRobot {
    /// Hard stop latched.
    pub hard_stopped: bool,
    /// Last accepted velocity.
    pub velocity: VelocityCommand,
    /// Velocity commands accepted.
    pub commands_accepted: u64,
    /// Velocity commands dropped because the latch was set.
    pub commands_dropped: u64,
}

/// In-process robot simulation.
pub struct SimulationTransport {
    config: SimulationConfig,
    failing: HashSet<String>,
    robots: BTreeMap<String, SimulatedRobot>,
}

impl SimulationTransport {
    /// Create a simulation with the given configuration.
    pub fn new(config: SimulationConfig) -> Self {
        let failing = config.fail_services.iter().cloned().collect();
        Self {
            config,
            failing,
            robots: BTreeMap::new(),
        }
    }

    /// State of the robot in namespace `prefix` (`""` for the root namespace).
    pub fn robot(&self, prefix: &str) -> Option<&SimulatedRobot> {
        self.robots.get(prefix)
    }

    fn robot_mut(&mut self, prefix: &str) -> &mut SimulatedRobot {
        self.robots.entry(prefix.to_string()).or_default()
    }
}

impl Default for SimulationTransport {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Transport for SimulationTransport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn publish_velocity(
        &mut self,
        channel: &str,
        command: VelocityCommand,
    ) -> Result<(), TransportError> {
        let Some((prefix, CMD_VEL)) = channel.rsplit_once('/') else {
            return Err(TransportError::NotConnected(channel.to_string()));
        };

        let robot = self.robot_mut(prefix);
        if robot.hard_stopped {
            robot.commands_dropped += 1;
            debug!("{channel}: dropped, hard stop latched");
        } else {
            robot.velocity = command;
            robot.commands_accepted += 1;
        }
        Ok(())
    }

    fn call_trigger(
        &mut self,
        service: &str,
        timeout: Duration,
    ) -> Result<TriggerResponse, TransportError> {
        let Some((prefix, leaf)) = service.rsplit_once('/') else {
            return Err(TransportError::NotConnected(service.to_string()));
        };
        let latch = match leaf {
            DISABLE_HARD_STOP => false,
            HARD_STOP => true,
            _ => return Err(TransportError::NotConnected(service.to_string())),
        };

        let delay = Duration::from_millis(self.config.response_delay_ms);
        if delay > timeout {
            thread::sleep(timeout);
            return Err(TransportError::Timeout {
                service: service.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        if self.failing.contains(service) {
            warn!("{service}: simulated failure");
            return Ok(TriggerResponse::failed("simulated failure"));
        }

        let robot = self.robot_mut(prefix);
        robot.hard_stopped = latch;
        if latch {
            robot.velocity = VelocityCommand::ZERO;
        }
        info!("{service}: hard stop {}", if latch { "latched" } else { "released" });
        Ok(TriggerResponse::ok(if latch {
            "hard stop engaged"
        } else {
            "hard stop released"
        }))
    }

    fn shutdown(&mut self) -> Result<(), TransportError> {
        for (prefix, robot) in &self.robots {
            info!(
                "Simulated robot '{prefix}': accepted={} dropped={} hard_stopped={}",
                robot.commands_accepted, robot.commands_dropped, robot.hard_stopped
            );
        }
        Ok(())
    }
}

/// Factory function registered as `"simulation"`.
pub fn create_transport(section: &toml::Table) -> Result<Box<dyn Transport>, TransportError> {
    let config = SimulationConfig::from_section(section)?;
    Ok(Box::new(SimulationTransport::new(config)))
}
