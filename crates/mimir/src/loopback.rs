//! A deterministic in-process backend.
//!
//! [`LoopbackBus`] implements both device traits without any hardware: joint
//! position commands are echoed back into the next sensor read with a
//! one-frame delay, the device clock advances one motion frame per read, and
//! the inertial sensors report an upright, resting robot. Tests and bench
//! runs drive the full pipeline against it.

use std::{collections::HashMap, time::Duration};

use nalgebra::Vector3;

use crate::{
    Alias, AliasCommand, Error, Result, SonarMode,
    types::{JointArray, RobotState},
};

/// The motion frame period the loopback clock advances per read.
const FRAME_PERIOD: Duration = Duration::from_millis(20);

/// Raw accelerometer reading of an upright, resting robot, in device units.
const RESTING_ACC_Z: f32 = -56.5;

#[derive(Debug, Default)]
pub struct LoopbackBus {
    clock: Duration,
    state: RobotState,
    pending_position: Option<JointArray<f32>>,
    last_stiffness: Option<JointArray<f32>>,
    aliases: HashMap<&'static str, Vec<String>>,
    sonar_mode: SonarMode,
}

impl LoopbackBus {
    #[must_use]
    pub fn new() -> Self {
        let mut state = RobotState::default();
        state.inertial.accelerometer = Vector3::new(0.0, 0.0, RESTING_ACC_Z);

        Self {
            state,
            ..Default::default()
        }
    }

    /// A loopback bus whose robot starts out in the given pose.
    #[must_use]
    pub fn with_pose(position: JointArray<f32>) -> Self {
        let mut bus = Self::new();
        bus.state.position = position;
        bus
    }

    /// The last stiffness command written to the bus, if any.
    #[must_use]
    pub fn last_stiffness(&self) -> Option<&JointArray<f32>> {
        self.last_stiffness.as_ref()
    }

    /// The current ultrasound emission mode.
    #[must_use]
    pub fn sonar_mode(&self) -> SonarMode {
        self.sonar_mode
    }
}

impl crate::SensorMemory for LoopbackBus {
    fn read_state(&mut self) -> Result<RobotState> {
        self.clock += FRAME_PERIOD;

        // commands written last frame become visible this frame
        if let Some(position) = self.pending_position.take() {
            self.state.position = position;
        }

        Ok(self.state.clone())
    }
}

impl crate::ActuatorBus for LoopbackBus {
    fn create_alias(&mut self, alias: Alias, keys: &[String]) -> Result<()> {
        self.aliases.insert(alias.name(), keys.to_vec());
        Ok(())
    }

    fn set_alias(&mut self, command: &AliasCommand) -> Result<()> {
        if !self.aliases.contains_key(command.alias.name()) {
            return Err(Error::UnknownAlias(command.alias.name()));
        }

        match command.alias {
            Alias::AllActuatorPosition => self.pending_position = Some(command.values.clone()),
            Alias::AllActuatorStiffness => self.last_stiffness = Some(command.values.clone()),
        }

        Ok(())
    }

    fn set_sonar(&mut self, mode: SonarMode) -> Result<()> {
        self.sonar_mode = mode;
        Ok(())
    }

    fn time(&self, offset: Duration) -> Duration {
        self.clock + offset
    }
}

#[cfg(test)]
mod tests {
    use crate::{ActuatorBus, SensorMemory, types::FillExt};

    use super::*;

    #[test]
    fn commands_echo_with_one_frame_delay() {
        let mut bus = LoopbackBus::new();
        bus.create_alias(Alias::AllActuatorPosition, &[]).unwrap();

        let command = AliasCommand {
            alias: Alias::AllActuatorPosition,
            importance: 0,
            send_time: bus.time(Duration::from_millis(20)),
            values: JointArray::fill(0.5),
        };
        bus.set_alias(&command).unwrap();

        let state = bus.read_state().unwrap();
        assert_eq!(state.position, JointArray::fill(0.5));
    }

    #[test]
    fn set_alias_requires_create_alias() {
        let mut bus = LoopbackBus::new();
        let command = AliasCommand {
            alias: Alias::AllActuatorStiffness,
            importance: 0,
            send_time: Duration::ZERO,
            values: JointArray::fill(0.8),
        };

        assert!(matches!(
            bus.set_alias(&command),
            Err(Error::UnknownAlias(_))
        ));
    }

    #[test]
    fn clock_advances_one_frame_per_read() {
        let mut bus = LoopbackBus::new();
        let before = bus.time(Duration::ZERO);
        bus.read_state().unwrap();
        assert_eq!(bus.time(Duration::ZERO) - before, FRAME_PERIOD);
    }
}
