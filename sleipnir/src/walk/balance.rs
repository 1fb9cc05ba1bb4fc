//! Gyro-based ankle balance correction.
//!
//! A low-pass filtered gyroscope reading is applied as a counter rotation to
//! the support leg's ankle. The gain lives in the gait's sensor group and
//! defaults to zero.

use mimir::types::LegJoints;
use nalgebra::Vector3;

use crate::filter::LowPassFilter;

use super::step::Foot;

#[derive(Debug, Clone)]
pub struct BalanceAdjustment {
    filtered_gyro: LowPassFilter<Vector3<f32>>,
}

impl BalanceAdjustment {
    #[must_use]
    pub fn new(gyro_alpha: f32) -> Self {
        Self {
            filtered_gyro: LowPassFilter::new(Vector3::zeros(), gyro_alpha),
        }
    }

    /// Feeds one gyroscope sample, rad/s.
    pub fn update(&mut self, gyroscope: Vector3<f32>) {
        self.filtered_gyro.update(gyroscope);
    }

    /// Applies the counter rotation to the support ankle.
    pub fn apply(&self, legs: &mut LegJoints<f32>, support: Foot, gain: f32) {
        if gain == 0.0 {
            return;
        }

        let pitch = -self.filtered_gyro.state.y * gain;
        let roll = -self.filtered_gyro.state.x * gain;

        let leg = match support {
            Foot::Left => &mut legs.left_leg,
            Foot::Right => &mut legs.right_leg,
        };
        leg.ankle_pitch += pitch;
        leg.ankle_roll += roll;
    }
}

#[cfg(test)]
mod tests {
    use mimir::types::FillExt;

    use super::*;

    #[test]
    fn zero_gain_leaves_joints_untouched() {
        let mut balance = BalanceAdjustment::new(0.5);
        balance.update(Vector3::new(1.0, 1.0, 0.0));

        let mut legs = LegJoints::fill(0.0);
        balance.apply(&mut legs, Foot::Left, 0.0);
        assert_eq!(legs, LegJoints::fill(0.0));
    }

    #[test]
    fn correction_counters_the_measured_rate() {
        let mut balance = BalanceAdjustment::new(1.0);
        balance.update(Vector3::new(0.0, 0.5, 0.0));

        let mut legs = LegJoints::fill(0.0);
        balance.apply(&mut legs, Foot::Right, 0.1);

        assert!(legs.right_leg.ankle_pitch < 0.0);
        assert_eq!(legs.left_leg.ankle_pitch, 0.0);
    }
}
