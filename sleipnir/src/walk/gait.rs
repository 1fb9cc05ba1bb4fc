//! Gait parameters.
//!
//! A [`Gait`] is an immutable bundle of the tunable numbers that shape the
//! walk. A new gait never takes effect abruptly: [`MetaGait`] interpolates
//! from the active parameters to the target over a bounded number of motion
//! frames.

use bevy::prelude::*;
use runa::Config;
use serde::{Deserialize, Serialize};

use crate::MOTION_FRAME_RATE;

/// Upper bound on the gait transition time, in motion frames.
pub const MAX_GAIT_TRANSITION_FRAMES: u32 = 150;

/// Stationary geometry of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StanceConfig {
    /// Forward offset of the body from the support foot origin, mm.
    pub body_off_x: f32,
    /// Height of the hips above the ground, mm.
    pub body_height: f32,
    /// Lateral distance between the feet while standing, mm.
    pub leg_separation_y: f32,
    /// Apex height of the swing foot, mm.
    pub foot_lift: f32,
}

/// Shape and limits of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Time for one full step, s.
    pub duration: f32,
    /// Fraction of the step spent with both feet on the ground.
    pub double_support_fraction: f32,
    /// Maximum forward velocity, mm/s.
    pub max_vel_x: f32,
    /// Maximum lateral velocity, mm/s.
    pub max_vel_y: f32,
    /// Maximum turn velocity, rad/s.
    pub max_vel_theta: f32,
    /// Maximum forward velocity change per step, mm/s.
    pub max_acc_x: f32,
    /// Maximum lateral velocity change per step, mm/s.
    pub max_acc_y: f32,
    /// Maximum turn velocity change per step, rad/s.
    pub max_acc_theta: f32,
}

impl StepConfig {
    /// Number of motion frames in one step.
    #[must_use]
    pub fn duration_frames(&self) -> u32 {
        (self.duration * MOTION_FRAME_RATE).round() as u32
    }

    /// Number of motion frames spent in double support per step.
    #[must_use]
    pub fn double_support_frames(&self) -> u32 {
        (self.duration_frames() as f32 * self.double_support_fraction).round() as u32
    }

    /// Number of motion frames spent in single support per step.
    #[must_use]
    pub fn single_support_frames(&self) -> u32 {
        self.duration_frames() - self.double_support_frames()
    }
}

/// Placement of the ZMP reference relative to each support step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZmpConfig {
    /// Fraction of double support during which the reference is pinned in place.
    pub static_fraction: f32,
    /// Outward reference offset under a left support foot, mm.
    pub l_off_y: f32,
    /// Outward reference offset under a right support foot, mm.
    pub r_off_y: f32,
    /// Additional outward shift per π of turn in the step, mm.
    pub turn_off: f32,
    /// Additional outward shift per mm of strafe in the step.
    pub strafe_off: f32,
    /// Pullback of the mid anchor along the foot, mm.
    pub foot_length_x: f32,
}

/// Arm swing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Shoulder pitch amplitude per mm of opposite-foot travel, rad.
    pub amplitude: f32,
}

/// Sensor feedback parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Scale of the observer correction from the sensed ZMP. Zero disables
    /// the feedback path entirely.
    pub observer_scale: f32,
    /// Gain of the gyro ankle correction. Zero disables it.
    pub balance_gain: f32,
    /// Low-pass alpha for the gyro filter used by the balance correction.
    pub gyro_alpha: f32,
}

/// Joint stiffnesses while this gait is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessConfig {
    pub leg: f32,
    pub arm: f32,
    pub head: f32,
}

/// An immutable bundle of walk parameters.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gait {
    pub stance: StanceConfig,
    pub step: StepConfig,
    pub zmp: ZmpConfig,
    pub arm: ArmConfig,
    pub sensor: SensorConfig,
    pub stiffness: StiffnessConfig,
}

impl Config for Gait {
    const PATH: &'static str = "gait.toml";
}

impl Default for Gait {
    fn default() -> Self {
        Self {
            stance: StanceConfig {
                body_off_x: 10.0,
                body_height: 230.0,
                leg_separation_y: 100.0,
                foot_lift: 15.0,
            },
            step: StepConfig {
                duration: 0.4,
                double_support_fraction: 0.25,
                max_vel_x: 120.0,
                max_vel_y: 60.0,
                max_vel_theta: 0.8,
                max_acc_x: 15.0,
                max_acc_y: 15.0,
                max_acc_theta: 0.1,
            },
            zmp: ZmpConfig {
                static_fraction: 0.4,
                l_off_y: 15.0,
                r_off_y: 15.0,
                turn_off: 25.0,
                strafe_off: 0.05,
                foot_length_x: 0.0,
            },
            arm: ArmConfig { amplitude: 0.012 },
            sensor: SensorConfig {
                observer_scale: 0.0,
                balance_gain: 0.0,
                gyro_alpha: 0.2,
            },
            stiffness: StiffnessConfig {
                leg: 0.85,
                arm: 0.3,
                head: 0.5,
            },
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Gait {
    /// A gait linearly interpolated between `self` and `target`.
    #[must_use]
    pub fn interpolated(&self, target: &Gait, t: f32) -> Gait {
        let t = t.clamp(0.0, 1.0);

        Gait {
            stance: StanceConfig {
                body_off_x: lerp(self.stance.body_off_x, target.stance.body_off_x, t),
                body_height: lerp(self.stance.body_height, target.stance.body_height, t),
                leg_separation_y: lerp(
                    self.stance.leg_separation_y,
                    target.stance.leg_separation_y,
                    t,
                ),
                foot_lift: lerp(self.stance.foot_lift, target.stance.foot_lift, t),
            },
            step: StepConfig {
                duration: lerp(self.step.duration, target.step.duration, t),
                double_support_fraction: lerp(
                    self.step.double_support_fraction,
                    target.step.double_support_fraction,
                    t,
                ),
                max_vel_x: lerp(self.step.max_vel_x, target.step.max_vel_x, t),
                max_vel_y: lerp(self.step.max_vel_y, target.step.max_vel_y, t),
                max_vel_theta: lerp(self.step.max_vel_theta, target.step.max_vel_theta, t),
                max_acc_x: lerp(self.step.max_acc_x, target.step.max_acc_x, t),
                max_acc_y: lerp(self.step.max_acc_y, target.step.max_acc_y, t),
                max_acc_theta: lerp(self.step.max_acc_theta, target.step.max_acc_theta, t),
            },
            zmp: ZmpConfig {
                static_fraction: lerp(self.zmp.static_fraction, target.zmp.static_fraction, t),
                l_off_y: lerp(self.zmp.l_off_y, target.zmp.l_off_y, t),
                r_off_y: lerp(self.zmp.r_off_y, target.zmp.r_off_y, t),
                turn_off: lerp(self.zmp.turn_off, target.zmp.turn_off, t),
                strafe_off: lerp(self.zmp.strafe_off, target.zmp.strafe_off, t),
                foot_length_x: lerp(self.zmp.foot_length_x, target.zmp.foot_length_x, t),
            },
            arm: ArmConfig {
                amplitude: lerp(self.arm.amplitude, target.arm.amplitude, t),
            },
            sensor: SensorConfig {
                observer_scale: lerp(self.sensor.observer_scale, target.sensor.observer_scale, t),
                balance_gain: lerp(self.sensor.balance_gain, target.sensor.balance_gain, t),
                gyro_alpha: lerp(self.sensor.gyro_alpha, target.sensor.gyro_alpha, t),
            },
            stiffness: StiffnessConfig {
                leg: lerp(self.stiffness.leg, target.stiffness.leg, t),
                arm: lerp(self.stiffness.arm, target.stiffness.arm, t),
                head: lerp(self.stiffness.head, target.stiffness.head, t),
            },
        }
    }
}

/// Interpolates between the active gait and a target gait so a hot-swap of
/// parameters never jumps.
#[derive(Debug, Clone)]
pub struct MetaGait {
    start: Gait,
    target: Gait,
    elapsed: u32,
    duration: u32,
}

impl MetaGait {
    #[must_use]
    pub fn new(gait: Gait) -> Self {
        Self {
            start: gait,
            target: gait,
            elapsed: 0,
            duration: 0,
        }
    }

    /// Begins a transition from the currently interpolated gait to `target`.
    pub fn set_target(&mut self, target: Gait, transition_frames: u32) {
        self.start = self.current();
        self.target = target;
        self.elapsed = 0;
        self.duration = transition_frames.clamp(1, MAX_GAIT_TRANSITION_FRAMES);
    }

    /// Advances the transition by one motion frame and returns the gait to
    /// use this frame.
    pub fn tick(&mut self) -> Gait {
        if self.elapsed < self.duration {
            self.elapsed += 1;
        }

        self.current()
    }

    /// The currently interpolated gait.
    #[must_use]
    pub fn current(&self) -> Gait {
        if self.elapsed >= self.duration {
            return self.target;
        }

        self.start
            .interpolated(&self.target, self.elapsed as f32 / self.duration as f32)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn frame_counts_add_up() {
        let step = Gait::default().step;
        assert_eq!(step.duration_frames(), 20);
        assert_eq!(
            step.double_support_frames() + step.single_support_frames(),
            step.duration_frames()
        );
    }

    #[test]
    fn metagait_reaches_the_target() {
        let start = Gait::default();
        let mut target = start;
        target.stance.body_height = 250.0;

        let mut meta = MetaGait::new(start);
        meta.set_target(target, 10);

        for _ in 0..10 {
            meta.tick();
        }

        assert_relative_eq!(meta.current().stance.body_height, 250.0);
    }

    #[test]
    fn metagait_moves_gradually() {
        let start = Gait::default();
        let mut target = start;
        target.stance.foot_lift = start.stance.foot_lift + 10.0;

        let mut meta = MetaGait::new(start);
        meta.set_target(target, 10);

        let first = meta.tick().stance.foot_lift;
        assert!(first < target.stance.foot_lift);
        assert!(first >= start.stance.foot_lift);
    }

    #[test]
    fn transition_length_is_bounded() {
        let mut meta = MetaGait::new(Gait::default());
        meta.set_target(Gait::default(), 100_000);
        assert!(meta.duration <= MAX_GAIT_TRANSITION_FRAMES);
    }
}
