//! The enactor: clips the composed joint targets against velocity and
//! safety limits and emits them on the actuator bus.

use std::time::Duration;

use bevy::prelude::*;
use mimir::{Alias, AliasCommand, SonarMode, types::JointArray};
use tracing::{error, warn};

use crate::{
    MOTION_FRAME_RATE, kinematics, motion::TargetJoints, sensor::JointPositions,
};

use super::Device;

/// Delay stamped onto every position command; removes the jitter between
/// the motion tick and the actuator cycle.
const SEND_DELAY: Duration = Duration::from_millis(20);

/// The sensed joint angles are between 20 and 40 ms old, so the clip against
/// them allows six motion steps of slack instead of one.
const SENSOR_SLACK: f32 = 6.0;

/// The ultrasound transducers respond on their own 250 ms cycle.
const SONAR_FRAME_RATE: u32 = 4;
const SONAR_IDLE_SKIP: u32 = MOTION_FRAME_RATE as u32 / SONAR_FRAME_RATE + 1;

/// Stiffness value meaning "motor decoupled"; passed through unclamped.
const STIFFNESS_UNSTIFF: f32 = -1.0;

const JOINT_NAMES: [&str; 22] = [
    "HeadYaw",
    "HeadPitch",
    "LShoulderPitch",
    "LShoulderRoll",
    "LElbowYaw",
    "LElbowRoll",
    "RShoulderPitch",
    "RShoulderRoll",
    "RElbowYaw",
    "RElbowRoll",
    "LHipYawPitch",
    "LHipRoll",
    "LHipPitch",
    "LKneePitch",
    "LAnklePitch",
    "LAnkleRoll",
    "RHipYawPitch",
    "RHipRoll",
    "RHipPitch",
    "RKneePitch",
    "RAnklePitch",
    "RAnkleRoll",
];

/// The last commands actually accepted by the bus, the clipping baseline for
/// the next frame.
#[derive(Resource, Debug, Default)]
pub struct LastCommands {
    positions: Option<JointArray<f32>>,
    stiffness: Option<JointArray<f32>>,
}

#[derive(Debug, Default)]
pub(super) struct SonarCycle {
    counter: u32,
    mode: usize,
}

pub(super) fn create_aliases(mut device: ResMut<Device>) {
    let position_keys: Vec<String> = JOINT_NAMES
        .iter()
        .map(|name| format!("{name}/Position/Actuator/Value"))
        .collect();
    let stiffness_keys: Vec<String> = JOINT_NAMES
        .iter()
        .map(|name| format!("{name}/Hardness/Actuator/Value"))
        .collect();

    device
        .0
        .create_alias(Alias::AllActuatorPosition, &position_keys)
        .expect("failed to create the position alias");
    device
        .0
        .create_alias(Alias::AllActuatorStiffness, &stiffness_keys)
        .expect("failed to create the stiffness alias");
}

/// Clips one joint command so it never outruns the motor.
///
/// Two clips are needed. The sensed angle is stale, so clipping against it
/// alone would let stale readings smuggle through over-fast commands; the
/// previously commanded angle can drift from reality, so clipping against it
/// alone would allow commands the physical pose cannot follow. Clip against
/// the last command at full rate, then against the sensed angle with
/// [`SENSOR_SLACK`] steps of slack.
#[must_use]
pub fn safety_check(sensed: f32, target: f32, last_command: f32, max_step: f32) -> f32 {
    let clipped_by_motion = target.clamp(last_command - max_step, last_command + max_step);

    clipped_by_motion.clamp(
        sensed - SENSOR_SLACK * max_step,
        sensed + SENSOR_SLACK * max_step,
    )
}

pub(super) fn send_joint_commands(
    mut device: ResMut<Device>,
    target: Res<TargetJoints>,
    sensed: Res<JointPositions>,
    mut last: ResMut<LastCommands>,
) {
    // until the first command went through, the sensed pose is the baseline
    let last_positions = last
        .positions
        .clone()
        .unwrap_or_else(|| sensed.0.clone());

    let clipped = target
        .positions
        .clone()
        .zip(last_positions)
        .zip(sensed.0.clone())
        .zip(kinematics::max_speed_per_frame())
        .map(|(((target, last_command), sensed), max_step)| {
            safety_check(sensed, target, last_command, max_step)
        });

    let command = AliasCommand {
        alias: Alias::AllActuatorPosition,
        importance: 0,
        send_time: device.0.time(SEND_DELAY),
        values: clipped.clone(),
    };

    match device.0.set_alias(&command) {
        Ok(()) => last.positions = Some(clipped),
        // keep the last known-good command as the baseline; retried next tick
        Err(e) => error!("position command failed: {e}"),
    }
}

pub(super) fn send_stiffness_commands(
    mut device: ResMut<Device>,
    target: Res<TargetJoints>,
    mut last: ResMut<LastCommands>,
) {
    let clipped = target.stiffness.clone().map(|stiffness| {
        if stiffness == STIFFNESS_UNSTIFF {
            stiffness
        } else {
            stiffness.clamp(0.0, 1.0)
        }
    });

    // the bus holds stiffness until told otherwise; only changes are sent
    if last.stiffness.as_ref() == Some(&clipped) {
        return;
    }

    let command = AliasCommand {
        alias: Alias::AllActuatorStiffness,
        importance: 0,
        send_time: device.0.time(Duration::ZERO),
        values: clipped.clone(),
    };

    match device.0.set_alias(&command) {
        Ok(()) => last.stiffness = Some(clipped),
        Err(e) => error!("stiffness command failed: {e}"),
    }
}

pub(super) fn cycle_sonar(mut device: ResMut<Device>, mut sonar: Local<SonarCycle>) {
    if sonar.counter < SONAR_IDLE_SKIP {
        sonar.counter += 1;
        return;
    }
    sonar.counter = 0;

    let mode = SonarMode::ALL[sonar.mode % SonarMode::ALL.len()];
    sonar.mode += 1;

    if let Err(e) = device.0.set_sonar(mode) {
        warn!("failed to set ultrasound mode: {e}");
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn clip_limits_travel_from_the_last_command() {
        // a full radian requested, 0.05 rad allowed per frame
        let clipped = safety_check(0.0, 1.0, 0.0, 0.05);
        assert_relative_eq!(clipped, 0.05);

        let clipped = safety_check(0.0, -1.0, 0.0, 0.05);
        assert_relative_eq!(clipped, -0.05);
    }

    #[test]
    fn clip_limits_travel_from_the_sensed_angle() {
        // the commanded history ran far ahead of the physical pose
        let clipped = safety_check(0.0, 1.0, 0.9, 0.05);
        assert_relative_eq!(clipped, SENSOR_SLACK * 0.05);
    }

    #[test]
    fn small_commands_pass_unchanged() {
        let clipped = safety_check(0.1, 0.12, 0.11, 0.05);
        assert_relative_eq!(clipped, 0.12);
    }
}
