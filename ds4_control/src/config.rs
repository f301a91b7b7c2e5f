//! Node configuration loading and validation.
//!
//! All keys are optional; an absent file means built-in defaults.
//!
//! ```toml
//! number_of_robots = 2
//! tick_rate_hz = 10.0
//! release_policy = "optimistic"
//! transport = "simulation"
//!
//! [shared]
//! log_level = "info"
//!
//! [transport_config.simulation]
//! fail_services = ["/r2/hard_stop"]
//! ```

use ds4_common::config::{ConfigError, ConfigLoader, SharedConfig};
use ds4_common::consts::{
    DEFAULT_SERVICE_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS, DEFAULT_TICK_RATE_HZ, MAX_ANG_VEL,
    MAX_LIN_VEL,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Highest accepted control loop rate [Hz].
pub const MAX_TICK_RATE_HZ: f64 = 1000.0;

/// Transport used when none is configured.
pub const DEFAULT_TRANSPORT: &str = "simulation";

fn default_number_of_robots() -> i64 {
    1
}
fn default_tick_rate_hz() -> f64 {
    DEFAULT_TICK_RATE_HZ
}
fn default_max_linear_velocity() -> f64 {
    MAX_LIN_VEL
}
fn default_max_angular_velocity() -> f64 {
    MAX_ANG_VEL
}
fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}
fn default_service_timeout_ms() -> u64 {
    DEFAULT_SERVICE_TIMEOUT_MS
}
fn default_transport() -> String {
    DEFAULT_TRANSPORT.to_string()
}

/// How the hard-stop release combo orders the flag update and the service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleasePolicy {
    /// Clear the latch first, then call the release service.
    #[default]
    Optimistic,
    /// Clear the latch only once the release service confirms.
    Confirmed,
}

/// Channel naming scheme, derived from `number_of_robots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotMode {
    /// One robot on `/cmd_vel`, `/hard_stop`, `/disable_hard_stop`.
    Single,
    /// Two robots namespaced `/r1/…` and `/r2/…`.
    Dual,
}

impl RobotMode {
    /// Map a configured robot count to a mode.
    ///
    /// `2` selects dual mode; anything else falls back to single mode.
    /// The effective mode is logged at info.
    pub fn from_count(count: i64) -> Self {
        let mode = if count == 2 { Self::Dual } else { Self::Single };
        if matches!(count, 1 | 2) {
            info!("number_of_robots = {count}, using {mode} mode");
        } else {
            info!("number_of_robots = {count} is not supported, using {mode} mode");
        }
        mode
    }

    /// Number of robot slots.
    #[inline]
    pub const fn robot_count(&self) -> usize {
        match self {
            Self::Single => 1,
            Self::Dual => 2,
        }
    }
}

impl fmt::Display for RobotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single-robot"),
            Self::Dual => write!(f, "dual-robot"),
        }
    }
}

/// Teleop node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Logging and identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// 2 selects dual-robot namespacing, anything else single.
    #[serde(default = "default_number_of_robots")]
    pub number_of_robots: i64,

    /// Control loop rate [Hz].
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,

    /// Linear velocity at full stick deflection.
    #[serde(default = "default_max_linear_velocity")]
    pub max_linear_velocity: f64,

    /// Angular velocity at full stick deflection.
    #[serde(default = "default_max_angular_velocity")]
    pub max_angular_velocity: f64,

    /// Delay before and after the zero-velocity stop command [ms].
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Timeout for hard-stop trigger/release calls [ms].
    #[serde(default = "default_service_timeout_ms")]
    pub service_timeout_ms: u64,

    /// Ordering of the hard-stop release.
    #[serde(default)]
    pub release_policy: ReleasePolicy,

    /// Name of the outbound transport.
    #[serde(default = "default_transport")]
    pub transport: String,

    /// Per-transport configuration sections.
    /// Key = transport name, Value = transport-specific TOML table.
    #[serde(default)]
    pub transport_config: HashMap<String, toml::Table>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            number_of_robots: default_number_of_robots(),
            tick_rate_hz: default_tick_rate_hz(),
            max_linear_velocity: default_max_linear_velocity(),
            max_angular_velocity: default_max_angular_velocity(),
            settle_delay_ms: default_settle_delay_ms(),
            service_timeout_ms: default_service_timeout_ms(),
            release_policy: ReleasePolicy::default(),
            transport: default_transport(),
            transport_config: HashMap::new(),
        }
    }
}

impl NodeConfig {
    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `shared` is valid
    /// 2. `0 < tick_rate_hz <= MAX_TICK_RATE_HZ`
    /// 3. Velocity limits finite and positive
    /// 4. `service_timeout_ms > 0`
    /// 5. `transport` not empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if !(self.tick_rate_hz.is_finite()
            && self.tick_rate_hz > 0.0
            && self.tick_rate_hz <= MAX_TICK_RATE_HZ)
        {
            return Err(ConfigError::ValidationError(format!(
                "tick_rate_hz must be in (0, {MAX_TICK_RATE_HZ}], got {}",
                self.tick_rate_hz
            )));
        }

        for (name, value) in [
            ("max_linear_velocity", self.max_linear_velocity),
            ("max_angular_velocity", self.max_angular_velocity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a positive finite value, got {value}"
                )));
            }
        }

        if self.service_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "service_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.transport.is_empty() {
            return Err(ConfigError::ValidationError(
                "transport cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Channel naming scheme for the configured robot count.
    pub fn robot_mode(&self) -> RobotMode {
        RobotMode::from_count(self.number_of_robots)
    }

    /// Control loop period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz)
    }

    /// Settle delay around the zero-velocity stop command.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Hard-stop service call timeout.
    pub fn service_timeout(&self) -> Duration {
        Duration::from_millis(self.service_timeout_ms)
    }

    /// Configuration section of the selected transport (empty if absent).
    pub fn transport_section(&self) -> toml::Table {
        self.transport_config
            .get(&self.transport)
            .cloned()
            .unwrap_or_default()
    }
}

/// Load and validate the node configuration.
///
/// `None` yields the built-in defaults.
///
/// # Errors
/// Returns `ConfigError` if the file is missing, unparsable or invalid.
pub fn load_config(path: Option<&Path>) -> Result<NodeConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            NodeConfig::load(path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            NodeConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}
