//! Kinematics of the robot's legs.

pub mod inverse;
pub mod robot_dimensions;

use mimir::types::{FillExt, HeadJoints, JointArray, SingleArmJoints, SingleLegJoints};
use thiserror::Error;

/// Error produced by the inverse kinematics solver.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IkError {
    /// The requested ankle position is outside the reachable shell of the leg.
    #[error("leg goal at distance {distance:.1} mm is outside the reachable range [{min:.1}, {max:.1}] mm")]
    Unreachable { distance: f32, min: f32, max: f32 },
}

/// Maximum angular travel per 20 ms motion frame for every joint, in rad.
///
/// These are the unloaded motor limits; the enactor clips every outgoing
/// command against them.
#[must_use]
pub fn max_speed_per_frame() -> JointArray<f32> {
    JointArray {
        head: HeadJoints {
            yaw: 0.14,
            pitch: 0.12,
        },
        body: mimir::types::BodyJoints {
            arms: mimir::types::ArmJoints {
                left_arm: arm_speed_limits(),
                right_arm: arm_speed_limits(),
            },
            legs: mimir::types::LegJoints {
                left_leg: leg_speed_limits(),
                right_leg: leg_speed_limits(),
            },
        },
    }
}

fn arm_speed_limits() -> SingleArmJoints<f32> {
    SingleArmJoints {
        shoulder_pitch: 0.16,
        shoulder_roll: 0.14,
        elbow_yaw: 0.16,
        elbow_roll: 0.14,
    }
}

fn leg_speed_limits() -> SingleLegJoints<f32> {
    SingleLegJoints {
        hip_yaw_pitch: 0.08,
        hip_roll: 0.08,
        hip_pitch: 0.12,
        knee_pitch: 0.12,
        ankle_pitch: 0.12,
        ankle_roll: 0.08,
    }
}

/// The joint angles of a stationary stance at the given hip height and body
/// offset, used whenever a provider needs a safe pose to hold.
pub fn stance_leg_angles(
    body_off_x: f32,
    body_height: f32,
    leg_separation_y: f32,
) -> Result<mimir::types::LegJoints<f32>, IkError> {
    let half_separation = leg_separation_y / 2.0;

    let left = inverse::leg_angles(
        nalgebra::Vector3::new(
            -body_off_x,
            half_separation - robot_dimensions::HIP_OFFSET_Y,
            robot_dimensions::FOOT_HEIGHT - body_height,
        ),
        0.0,
    )?;
    let right = inverse::leg_angles(
        nalgebra::Vector3::new(
            -body_off_x,
            -half_separation + robot_dimensions::HIP_OFFSET_Y,
            robot_dimensions::FOOT_HEIGHT - body_height,
        ),
        0.0,
    )?;

    Ok(mimir::types::LegJoints {
        left_leg: left,
        right_leg: right,
    })
}

/// Arm pose held outside of walking.
#[must_use]
pub fn stance_arm_angles() -> mimir::types::ArmJoints<f32> {
    let arm = SingleArmJoints {
        shoulder_pitch: std::f32::consts::FRAC_PI_2,
        shoulder_roll: 0.15,
        elbow_yaw: 0.0,
        elbow_roll: -0.035,
    };

    mimir::types::ArmJoints {
        left_arm: arm.clone(),
        right_arm: SingleArmJoints {
            shoulder_roll: -arm.shoulder_roll,
            ..arm
        },
    }
}

/// A full stationary joint vector: stance legs, hanging arms, level head.
pub fn stance_pose(
    body_off_x: f32,
    body_height: f32,
    leg_separation_y: f32,
) -> Result<JointArray<f32>, IkError> {
    Ok(JointArray {
        head: HeadJoints::fill(0.0),
        body: mimir::types::BodyJoints {
            arms: stance_arm_angles(),
            legs: stance_leg_angles(body_off_x, body_height, leg_separation_y)?,
        },
    })
}
