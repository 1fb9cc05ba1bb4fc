//! # mimir 🧠
//!
//! mimir is the hardware access layer of the sleipnir walking core. It
//! defines the joint and sensor containers shared by the whole stack, the
//! traits through which the core talks to the robot's device layer, and a
//! deterministic loopback backend for tests and bench runs.
//!
//! The device model mirrors the actuator bus of the robot: actuators are
//! addressed through *aliases* declared once at startup
//! ([`ActuatorBus::create_alias`]) and written once per motion frame with a
//! timestamped command ([`ActuatorBus::set_alias`]). Commands use the bus'
//! clear-all / time-separate semantics: each command replaces any previously
//! queued values and carries a single send time for all joints. Sensor
//! values are fetched in bulk once per frame ([`SensorMemory::read_state`]).

use std::time::Duration;

pub mod loopback;
pub mod types;

pub use loopback::LoopbackBus;
use types::{JointArray, RobotState};

/// Error type for device bus exchanges.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to exchange data with the device bus")]
    Io(#[from] std::io::Error),
    #[error("actuator alias `{0}` has not been created")]
    UnknownAlias(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The actuator aliases the core declares at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alias {
    /// Position targets for all 22 joints.
    AllActuatorPosition,
    /// Stiffness targets for all 22 joints.
    AllActuatorStiffness,
}

impl Alias {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Alias::AllActuatorPosition => "AllActuatorPosition",
            Alias::AllActuatorStiffness => "AllActuatorStiffness",
        }
    }
}

/// A timestamped per-joint command for one actuator alias.
///
/// `send_time` is expressed on the device clock (see [`ActuatorBus::time`]);
/// the bus holds the values until that instant, which the enactor uses to
/// de-jitter the actuator cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasCommand {
    pub alias: Alias,
    /// Importance level, 0 is lowest.
    pub importance: u8,
    pub send_time: Duration,
    pub values: JointArray<f32>,
}

/// Emission modes of the ultrasound distance sensors.
///
/// The transducers respond on their own slow cycle; the enactor rotates
/// through all four modes at 4 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SonarMode {
    #[default]
    LeftToLeft,
    LeftToRight,
    RightToLeft,
    RightToRight,
}

impl SonarMode {
    pub const ALL: [SonarMode; 4] = [
        SonarMode::LeftToLeft,
        SonarMode::LeftToRight,
        SonarMode::RightToLeft,
        SonarMode::RightToRight,
    ];
}

/// Bulk sensor access, called once per motion frame by the transcriber.
pub trait SensorMemory {
    /// Fetches the values of all registered sensors.
    fn read_state(&mut self) -> Result<RobotState>;
}

/// Push-model actuator access, called once per motion frame by the enactor.
pub trait ActuatorBus {
    /// Declares an alias for a list of actuator keys. Must be called once
    /// per alias before the first [`ActuatorBus::set_alias`].
    fn create_alias(&mut self, alias: Alias, keys: &[String]) -> Result<()>;

    /// Writes a timestamped command for a previously created alias.
    fn set_alias(&mut self, command: &AliasCommand) -> Result<()>;

    /// Selects the emission mode of the ultrasound sensors.
    fn set_sonar(&mut self, mode: SonarMode) -> Result<()>;

    /// The device clock, plus `offset`.
    fn time(&self, offset: Duration) -> Duration;
}
