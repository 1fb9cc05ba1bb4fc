//! Arm swing during the walk.

use std::f32::consts::FRAC_PI_2;

use mimir::types::SingleArmJoints;

/// Resting shoulder roll, rad.
const DEFAULT_ROLL: f32 = 0.15;

/// Resting elbow roll, rad.
const DEFAULT_ELBOW_ROLL: f32 = 0.035;

/// Compute joint positions for an arm of the robot based on the forward
/// travel of the opposite foot.
///
/// `opposite_foot_x` is the opposite foot's goal x in the COM frame, in mm;
/// `amplitude` is the gait's swing amplitude per mm of travel.
#[must_use]
pub fn swinging_arm(opposite_foot_x: f32, amplitude: f32, is_left_arm: bool) -> SingleArmJoints<f32> {
    let shoulder_pitch = FRAC_PI_2 - opposite_foot_x * amplitude;

    if is_left_arm {
        SingleArmJoints {
            shoulder_pitch,
            shoulder_roll: DEFAULT_ROLL,
            elbow_yaw: -FRAC_PI_2,
            elbow_roll: -DEFAULT_ELBOW_ROLL,
        }
    } else {
        SingleArmJoints {
            shoulder_pitch,
            shoulder_roll: -DEFAULT_ROLL,
            elbow_yaw: FRAC_PI_2,
            elbow_roll: DEFAULT_ELBOW_ROLL,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn arms_swing_against_the_opposite_foot() {
        let forward = swinging_arm(30.0, 0.01, true);
        let backward = swinging_arm(-30.0, 0.01, true);

        assert!(forward.shoulder_pitch < FRAC_PI_2);
        assert!(backward.shoulder_pitch > FRAC_PI_2);
        assert_relative_eq!(
            forward.shoulder_pitch + backward.shoulder_pitch,
            std::f32::consts::PI,
            epsilon = 1e-5
        );
    }

    #[test]
    fn rolls_mirror_between_sides() {
        let left = swinging_arm(0.0, 0.01, true);
        let right = swinging_arm(0.0, 0.01, false);

        assert_relative_eq!(left.shoulder_roll, -right.shoulder_roll);
        assert_relative_eq!(left.elbow_yaw, -right.elbow_yaw);
    }
}
