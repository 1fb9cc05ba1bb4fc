use mimir::types::SingleLegJoints;
use nalgebra::{Rotation3, Vector3};

use super::{IkError, robot_dimensions};

/// Slack on the reachable shell before a goal is rejected, in mm.
const REACH_TOLERANCE: f32 = 1.0;

/// Compute the joint angles that place the ankle of one leg at `target` with
/// the sole level and the foot turned by `foot_yaw`.
///
/// `target` is the ankle position relative to the hip joint, in the body
/// heading frame (x forward, y left, z up), in millimetres. The solver is
/// closed form: the yaw joint realizes `foot_yaw`, hip roll and pitch point
/// the leg plane at the ankle, the knee angle follows from the two segment
/// lengths, and the ankle joints level the sole against the commanded hip
/// and knee angles.
pub fn leg_angles(target: Vector3<f32>, foot_yaw: f32) -> Result<SingleLegJoints<f32>, IkError> {
    let thigh = robot_dimensions::THIGH_LENGTH;
    let tibia = robot_dimensions::TIBIA_LENGTH;

    // solve the five remaining joints in the yaw-rotated hip frame
    let hip_to_foot = Rotation3::from_axis_angle(&Vector3::z_axis(), -foot_yaw) * target;

    let leg_length = hip_to_foot.norm();
    let max = thigh + tibia;
    let min = (thigh - tibia).abs();
    if leg_length > max + REACH_TOLERANCE || leg_length < min - REACH_TOLERANCE {
        return Err(IkError::Unreachable {
            distance: leg_length,
            min,
            max,
        });
    }
    let leg_length = leg_length.clamp(min, max);

    let hip_roll = -1.0 * (-hip_to_foot.y).atan2(-hip_to_foot.z);
    let hip_pitch_minus_alpha = (-hip_to_foot.x).atan2(
        (hip_to_foot.y.powi(2) + hip_to_foot.z.powi(2)).sqrt() * -hip_to_foot.z.signum(),
    );

    let alpha_cos =
        (thigh.powi(2) + leg_length.powi(2) - tibia.powi(2)) / (2.0 * thigh * leg_length);
    let beta_cos =
        (tibia.powi(2) + leg_length.powi(2) - thigh.powi(2)) / (2.0 * tibia * leg_length);

    let alpha = -1.0 * alpha_cos.clamp(-1.0, 1.0).acos();
    let beta = -1.0 * beta_cos.clamp(-1.0, 1.0).acos();

    // the level sole normal, expressed in the thigh frame
    let foot_rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), -hip_pitch_minus_alpha)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), -hip_roll)
        * Vector3::z();

    Ok(SingleLegJoints {
        hip_yaw_pitch: foot_yaw,
        hip_roll,
        hip_pitch: hip_pitch_minus_alpha + alpha,
        knee_pitch: -alpha - beta,
        ankle_pitch: foot_rotation.x.atan2(foot_rotation.z) + beta,
        ankle_roll: (-1.0 * foot_rotation.y).asin(),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn straight_down_leg_is_symmetric() {
        let joints = leg_angles(Vector3::new(0.0, 0.0, -180.0), 0.0).unwrap();

        assert_abs_diff_eq!(joints.hip_yaw_pitch, 0.0);
        assert_abs_diff_eq!(joints.hip_roll, 0.0, epsilon = 1e-5);
        assert!(joints.knee_pitch > 0.0, "knee must bend forward");
    }

    #[test]
    fn sole_stays_level() {
        for target in [
            Vector3::new(0.0, 0.0, -180.0),
            Vector3::new(30.0, 0.0, -175.0),
            Vector3::new(-20.0, 25.0, -170.0),
        ] {
            let joints = leg_angles(target, 0.0).unwrap();

            // the pitch chain must cancel so the sole is parallel to the ground
            assert_abs_diff_eq!(
                joints.hip_pitch + joints.knee_pitch + joints.ankle_pitch,
                0.0,
                epsilon = 1e-4
            );
            assert_abs_diff_eq!(joints.hip_roll + joints.ankle_roll, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn yaw_goal_goes_to_the_yaw_joint() {
        let joints = leg_angles(Vector3::new(0.0, 0.0, -180.0), 0.3).unwrap();
        assert_abs_diff_eq!(joints.hip_yaw_pitch, 0.3);
    }

    #[test]
    fn goal_beyond_leg_length_is_unreachable() {
        let result = leg_angles(Vector3::new(0.0, 0.0, -250.0), 0.0);
        assert!(matches!(result, Err(IkError::Unreachable { .. })));
    }

    #[test]
    fn fully_stretched_goal_is_still_accepted() {
        let length = robot_dimensions::THIGH_LENGTH + robot_dimensions::TIBIA_LENGTH;
        let joints = leg_angles(Vector3::new(0.0, 0.0, -length), 0.0).unwrap();
        assert_abs_diff_eq!(joints.knee_pitch, 0.0, epsilon = 1e-3);
    }
}
