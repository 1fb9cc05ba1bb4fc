//! The per-leg state machine.
//!
//! Each leg cycles through four support modes, 180° out of phase with the
//! other leg. The step generator relies on the one-tick
//! [`WalkingLeg::is_switching_support_mode`] pulse to know when to swap the
//! support foot and the coordinate frames.

use mimir::types::{FillExt, SingleLegJoints};
use nalgebra::Vector3;
use planar::{Transform, rotation_angle, vector};

use crate::kinematics::{self, IkError, robot_dimensions};

use super::{
    gait::StiffnessConfig,
    smoothing::{ease_in_out, lift_arc},
    step::{Foot, Step},
};

/// The support modes a leg cycles through.
///
/// One full cycle is two step durations: a leg supports while the other
/// swings, both plant during double support, then the roles flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportMode {
    /// Bearing the full load while the other leg swings.
    Supporting,
    /// Off the ground, moving to the next placement.
    Swinging,
    /// First half of double support; this leg was supporting and swings next.
    DoubleSupport,
    /// Second half of double support; this leg was swinging and supports next.
    PersistentDoubleSupport,
}

/// Joint angles and stiffnesses for one leg, one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LegJointStiff {
    pub angles: SingleLegJoints<f32>,
    pub stiffness: SingleLegJoints<f32>,
}

/// Frame counts of the current step phase: `(double_support, single_support)`.
pub type PhaseFrames = (u32, u32);

#[derive(Debug, Clone)]
pub struct WalkingLeg {
    foot: Foot,
    state: SupportMode,
    frames_in_state: u32,
    /// Current goal yaw of this foot in the support frame, rad.
    foot_rotation: f32,
    /// Current goal x of this foot in the COM frame, mm. Drives arm swing.
    goal_x: f32,
}

impl WalkingLeg {
    #[must_use]
    pub fn new(foot: Foot) -> Self {
        Self {
            foot,
            state: SupportMode::DoubleSupport,
            frames_in_state: 0,
            foot_rotation: 0.0,
            goal_x: 0.0,
        }
    }

    /// Re-phases this leg for a fresh walk in which `swinging` is the first
    /// foot to leave the ground.
    pub fn start(&mut self, swinging: Foot) {
        self.state = if self.foot == swinging {
            SupportMode::DoubleSupport
        } else {
            SupportMode::PersistentDoubleSupport
        };
        self.frames_in_state = 0;
        self.foot_rotation = 0.0;
    }

    /// True for exactly the first tick after each state entry.
    #[must_use]
    pub fn is_switching_support_mode(&self) -> bool {
        self.frames_in_state == 0
    }

    #[must_use]
    pub fn state_is_double_support(&self) -> bool {
        matches!(
            self.state,
            SupportMode::DoubleSupport | SupportMode::PersistentDoubleSupport
        )
    }

    #[must_use]
    pub fn state(&self) -> SupportMode {
        self.state
    }

    /// The current goal yaw of this foot relative to the support frame.
    #[must_use]
    pub fn foot_rotation(&self) -> f32 {
        self.foot_rotation
    }

    /// The current goal x of this foot in the COM frame, mm.
    #[must_use]
    pub fn goal_x(&self) -> f32 {
        self.goal_x
    }

    /// Produces this leg's joint angles and stiffnesses for one tick.
    ///
    /// `own_step` is the step this leg is executing (the support step for
    /// the support leg, the swing destination for the swing leg), all
    /// expressed in the current support frame. `fc` takes support-frame
    /// points to the COM frame.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        own_step: &Step,
        swing_source: &Step,
        swing_dest: &Step,
        support_foot: Foot,
        phase: PhaseFrames,
        fc: &Transform,
        stiffness: &StiffnessConfig,
    ) -> Result<LegJointStiff, IkError> {
        let is_support = self.foot == support_foot;

        let (goal_f, lift) = if is_support {
            ((own_step.x, own_step.y, own_step.theta), 0.0)
        } else {
            self.swing_goal(swing_source, swing_dest, phase)
        };

        // express the goal relative to the center of mass
        let goal_c = fc * vector(goal_f.0, goal_f.1);
        let yaw_c = goal_f.2 + rotation_angle(fc);

        self.foot_rotation = goal_f.2;
        self.goal_x = goal_c.x;

        let body_height = own_step.stance_config.body_height;
        let ankle_in_hip = Vector3::new(
            goal_c.x,
            goal_c.y - self.foot.sign() * robot_dimensions::HIP_OFFSET_Y,
            robot_dimensions::FOOT_HEIGHT - body_height + lift,
        );

        let angles = kinematics::inverse::leg_angles(ankle_in_hip, yaw_c)?;

        self.advance(phase);

        Ok(LegJointStiff {
            angles,
            stiffness: SingleLegJoints::fill(stiffness.leg),
        })
    }

    /// The swing leg's goal: planted at the source during the first half of
    /// double support, a smoothed lift path while swinging, planted at the
    /// destination afterwards.
    fn swing_goal(
        &self,
        source: &Step,
        dest: &Step,
        (_, single_support_frames): PhaseFrames,
    ) -> ((f32, f32, f32), f32) {
        match self.state {
            SupportMode::DoubleSupport => ((source.x, source.y, source.theta), 0.0),
            SupportMode::Swinging => {
                let t = if single_support_frames > 1 {
                    self.frames_in_state as f32 / (single_support_frames - 1) as f32
                } else {
                    1.0
                };

                let along = ease_in_out(t);
                let goal = (
                    source.x + along * (dest.x - source.x),
                    source.y + along * (dest.y - source.y),
                    source.theta + t * (dest.theta - source.theta),
                );

                let lift = lift_arc(t) * dest.stance_config.foot_lift;
                (goal, lift)
            }
            SupportMode::PersistentDoubleSupport | SupportMode::Supporting => {
                ((dest.x, dest.y, dest.theta), 0.0)
            }
        }
    }

    fn advance(&mut self, (double_support_frames, single_support_frames): PhaseFrames) {
        self.frames_in_state += 1;

        let limit = match self.state {
            SupportMode::Supporting | SupportMode::Swinging => single_support_frames,
            SupportMode::DoubleSupport | SupportMode::PersistentDoubleSupport => {
                double_support_frames
            }
        };

        if self.frames_in_state >= limit {
            self.state = match self.state {
                SupportMode::Supporting => SupportMode::DoubleSupport,
                SupportMode::DoubleSupport => SupportMode::Swinging,
                SupportMode::Swinging => SupportMode::PersistentDoubleSupport,
                SupportMode::PersistentDoubleSupport => SupportMode::Supporting,
            };
            self.frames_in_state = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use planar::identity;

    use crate::walk::gait::Gait;
    use crate::walk::step::StepKind;

    use super::*;

    fn tick_pair(left: &mut WalkingLeg, right: &mut WalkingLeg, gait: &Gait) {
        let support = Step::zero(gait, Foot::Left, StepKind::Regular);
        let source = Step::zero(gait, Foot::Right, StepKind::Regular);
        let dest = Step::zero(gait, Foot::Right, StepKind::Regular);
        let phase = (
            gait.step.double_support_frames(),
            gait.step.single_support_frames(),
        );
        let fc = identity();

        left.tick(
            &support,
            &source,
            &dest,
            Foot::Left,
            phase,
            &fc,
            &gait.stiffness,
        )
        .unwrap();
        right
            .tick(
                &dest,
                &source,
                &dest,
                Foot::Left,
                phase,
                &fc,
                &gait.stiffness,
            )
            .unwrap();
    }

    #[test]
    fn legs_stay_out_of_phase() {
        let gait = Gait::default();
        let mut left = WalkingLeg::new(Foot::Left);
        let mut right = WalkingLeg::new(Foot::Right);

        left.start(Foot::Right);
        right.start(Foot::Right);

        assert_eq!(left.state(), SupportMode::PersistentDoubleSupport);
        assert_eq!(right.state(), SupportMode::DoubleSupport);

        // run two full step durations; the legs must mirror each other
        for _ in 0..(2 * gait.step.duration_frames()) {
            tick_pair(&mut left, &mut right, &gait);

            let mirrored = match left.state() {
                SupportMode::Supporting => SupportMode::Swinging,
                SupportMode::Swinging => SupportMode::Supporting,
                SupportMode::DoubleSupport => SupportMode::PersistentDoubleSupport,
                SupportMode::PersistentDoubleSupport => SupportMode::DoubleSupport,
            };
            assert_eq!(right.state(), mirrored);
        }
    }

    #[test]
    fn switching_pulse_lasts_one_tick() {
        let gait = Gait::default();
        let mut left = WalkingLeg::new(Foot::Left);
        let mut right = WalkingLeg::new(Foot::Right);
        left.start(Foot::Right);
        right.start(Foot::Right);

        let mut pulses = 0;
        for _ in 0..(2 * gait.step.duration_frames()) {
            if left.is_switching_support_mode() {
                pulses += 1;
            }
            tick_pair(&mut left, &mut right, &gait);
        }

        // four state entries per full cycle
        assert_eq!(pulses, 4);
    }

    #[test]
    fn cycle_length_is_two_step_durations() {
        let gait = Gait::default();
        let mut left = WalkingLeg::new(Foot::Left);
        let mut right = WalkingLeg::new(Foot::Right);
        left.start(Foot::Right);
        right.start(Foot::Right);

        let initial = left.state();
        for _ in 0..(2 * gait.step.duration_frames()) {
            tick_pair(&mut left, &mut right, &gait);
        }

        assert_eq!(left.state(), initial);
        assert!(left.is_switching_support_mode());
    }

    #[test]
    fn support_swap_condition_fires_once_per_step() {
        let gait = Gait::default();
        let mut left = WalkingLeg::new(Foot::Left);
        let mut right = WalkingLeg::new(Foot::Right);
        left.start(Foot::Right);
        right.start(Foot::Right);

        let mut swaps = 0;
        for _ in 0..(4 * gait.step.duration_frames()) {
            if left.is_switching_support_mode() && left.state_is_double_support() {
                swaps += 1;
            }
            tick_pair(&mut left, &mut right, &gait);
        }

        assert_eq!(swaps, 4);
    }
}
