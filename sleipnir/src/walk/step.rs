//! The step data model.
//!
//! A [`Step`] is a planned foot placement, expressed in its own step frame.
//! Steps snapshot the gait groups that shaped them at creation, so a gait
//! hot-swap never mutates a step that is already queued.

use serde::{Deserialize, Serialize};

use super::gait::{Gait, StanceConfig, StepConfig, ZmpConfig};
use crate::kinematics::robot_dimensions::HIP_OFFSET_Y;

/// Desired planar velocity `(x, y, θ)` in mm/s and rad/s, expressed in the
/// robot's current heading frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkVector {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

impl WalkVector {
    pub const ZERO: WalkVector = WalkVector {
        x: 0.0,
        y: 0.0,
        theta: 0.0,
    };

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.theta == 0.0
    }
}

/// Absolute foot-placement offset `(Δx, Δy, Δθ)` from one step to the next,
/// in mm and rad.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StepDisplacement {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

/// Which foot a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Foot {
    Left,
    Right,
}

impl Foot {
    #[must_use]
    pub fn opposite(self) -> Foot {
        match self {
            Foot::Left => Foot::Right,
            Foot::Right => Foot::Left,
        }
    }

    /// +1 for the left side, −1 for the right side.
    #[must_use]
    pub fn sign(self) -> f32 {
        match self {
            Foot::Left => 1.0,
            Foot::Right => -1.0,
        }
    }
}

/// The two kinds of steps the generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// A normal step with another step coming after it.
    Regular,
    /// A terminal step that centers the ZMP under the body and requires no
    /// swing.
    End,
}

/// A planned foot placement.
///
/// `y` carries the foot's lateral track: a step's position is the walked
/// displacement plus `sign · HIP_OFFSET_Y`, so the step frames of an
/// alternating walk stay on the body center line.
#[derive(Debug, Clone)]
pub struct Step {
    /// Position in this step's own frame, mm.
    pub x: f32,
    /// Position in this step's own frame, mm. Includes the hip track offset.
    pub y: f32,
    /// Foot rotation in this step's own frame, rad.
    pub theta: f32,
    /// The walk vector this step was derived from; used when re-clipping
    /// neighboring steps.
    pub walk_vector: WalkVector,
    pub step_duration_frames: u32,
    pub double_support_frames: u32,
    pub single_support_frames: u32,
    pub foot: Foot,
    pub kind: StepKind,
    /// True once this step has been expanded into ZMP reference samples.
    /// Such a step is immutable.
    pub zmpd: bool,
    pub step_config: StepConfig,
    pub zmp_config: ZmpConfig,
    pub stance_config: StanceConfig,
}

impl Step {
    /// Creates a step from a desired velocity, clipped against the gait's
    /// envelope, the per-step acceleration limits and the stance leg.
    #[must_use]
    pub fn from_velocity(
        target: WalkVector,
        last: WalkVector,
        gait: &Gait,
        foot: Foot,
        kind: StepKind,
    ) -> Step {
        // the walk vector keeps the pre-clamp lateral component so the
        // ramp toward the commanded strafe speed survives the feet that
        // cannot move that way
        let vel = accel_clip(ellipse_clip_velocities(target, &gait.step), last, &gait.step);
        let placed = lateral_clip(vel, foot);

        let duration = gait.step.duration;
        Step::with_size(
            placed.x * duration,
            placed.y * duration + foot.sign() * HIP_OFFSET_Y,
            placed.theta * duration,
            vel,
            gait,
            foot,
            kind,
        )
    }

    /// Creates a step from an absolute displacement, clipped against the
    /// per-step displacement envelope and the stance leg.
    #[must_use]
    pub fn from_displacement(
        target: StepDisplacement,
        gait: &Gait,
        foot: Foot,
        kind: StepKind,
    ) -> Step {
        let disp = ellipse_clip_displacement(target, &gait.step);
        let vel = vel_from_disp(disp, &gait.step);
        let vel = lateral_clip(vel, foot);
        let disp = disp_from_vel(vel, &gait.step);

        Step::with_size(
            disp.x,
            disp.y + foot.sign() * HIP_OFFSET_Y,
            disp.theta,
            vel,
            gait,
            foot,
            kind,
        )
    }

    /// A stationary step of the given kind, placed on its foot's track.
    #[must_use]
    pub fn zero(gait: &Gait, foot: Foot, kind: StepKind) -> Step {
        Step::with_size(
            0.0,
            foot.sign() * HIP_OFFSET_Y,
            0.0,
            WalkVector::ZERO,
            gait,
            foot,
            kind,
        )
    }

    /// A copy of `other` re-expressed at new coordinates, used when changing
    /// reference frames.
    #[must_use]
    pub fn reframed(x: f32, y: f32, theta: f32, other: &Step) -> Step {
        Step {
            x,
            y,
            theta,
            ..other.clone()
        }
    }

    fn with_size(
        x: f32,
        y: f32,
        theta: f32,
        walk_vector: WalkVector,
        gait: &Gait,
        foot: Foot,
        kind: StepKind,
    ) -> Step {
        Step {
            x,
            y,
            theta,
            walk_vector,
            step_duration_frames: gait.step.duration_frames(),
            double_support_frames: gait.step.double_support_frames(),
            single_support_frames: gait.step.single_support_frames(),
            foot,
            kind,
            zmpd: false,
            step_config: gait.step,
            zmp_config: gait.zmp,
            stance_config: gait.stance,
        }
    }
}

/// Clips a velocity so that `(x/max_x, y/max_y, θ/max_θ)` lies inside the
/// unit sphere, scaling all three components by the same factor so the
/// direction of the input is preserved.
#[must_use]
pub fn ellipse_clip_velocities(vel: WalkVector, step: &StepConfig) -> WalkVector {
    let (x, y, theta) = ellipse_clip(
        vel.x,
        vel.y,
        vel.theta,
        step.max_vel_x,
        step.max_vel_y,
        step.max_vel_theta,
    );

    WalkVector { x, y, theta }
}

/// Clips a per-step displacement against the displacement envelope
/// (velocity limits times the step duration), preserving direction.
#[must_use]
pub fn ellipse_clip_displacement(disp: StepDisplacement, step: &StepConfig) -> StepDisplacement {
    let (x, y, theta) = ellipse_clip(
        disp.x,
        disp.y,
        disp.theta,
        step.max_vel_x * step.duration,
        step.max_vel_y * step.duration,
        step.max_vel_theta * step.duration,
    );

    StepDisplacement { x, y, theta }
}

fn ellipse_clip(x: f32, y: f32, theta: f32, max_x: f32, max_y: f32, max_theta: f32) -> (f32, f32, f32) {
    let radius_sq =
        (x / max_x).powi(2) + (y / max_y).powi(2) + (theta / max_theta).powi(2);

    if radius_sq <= 1.0 || radius_sq == 0.0 {
        return (x, y, theta);
    }

    let scale = 1.0 / radius_sq.sqrt();
    (x * scale, y * scale, theta * scale)
}

/// Clips the per-step change in velocity against the acceleration limits.
fn accel_clip(vel: WalkVector, last: WalkVector, step: &StepConfig) -> WalkVector {
    WalkVector {
        x: last.x + (vel.x - last.x).clamp(-step.max_acc_x, step.max_acc_x),
        y: last.y + (vel.y - last.y).clamp(-step.max_acc_y, step.max_acc_y),
        theta: last.theta + (vel.theta - last.theta).clamp(-step.max_acc_theta, step.max_acc_theta),
    }
}

/// Disallows lateral motion that would step the swing foot into the stance
/// leg: a left step may not move right, a right step may not move left.
fn lateral_clip(vel: WalkVector, foot: Foot) -> WalkVector {
    let keep = match foot {
        Foot::Left => vel.y > 0.0,
        Foot::Right => vel.y < 0.0,
    };

    WalkVector {
        y: if keep { vel.y } else { 0.0 },
        ..vel
    }
}

/// The displacement one step at `vel` covers.
#[must_use]
pub fn disp_from_vel(vel: WalkVector, step: &StepConfig) -> StepDisplacement {
    StepDisplacement {
        x: vel.x * step.duration,
        y: vel.y * step.duration,
        theta: vel.theta * step.duration,
    }
}

/// The velocity that covers `disp` in one step.
#[must_use]
pub fn vel_from_disp(disp: StepDisplacement, step: &StepConfig) -> WalkVector {
    WalkVector {
        x: disp.x / step.duration,
        y: disp.y / step.duration,
        theta: disp.theta / step.duration,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn gait() -> Gait {
        Gait::default()
    }

    #[test]
    fn ellipse_clip_inside_envelope_is_identity() {
        let vel = WalkVector {
            x: 40.0,
            y: 10.0,
            theta: 0.1,
        };
        assert_eq!(ellipse_clip_velocities(vel, &gait().step), vel);
    }

    #[test]
    fn ellipse_clip_preserves_direction() {
        let vel = WalkVector {
            x: 500.0,
            y: 250.0,
            theta: 0.0,
        };
        let clipped = ellipse_clip_velocities(vel, &gait().step);

        assert!(clipped.x < vel.x);
        assert_relative_eq!(clipped.y / clipped.x, vel.y / vel.x, epsilon = 1e-5);

        // the clipped vector lies on the envelope
        let step = gait().step;
        let radius = (clipped.x / step.max_vel_x).powi(2)
            + (clipped.y / step.max_vel_y).powi(2)
            + (clipped.theta / step.max_vel_theta).powi(2);
        assert_relative_eq!(radius, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn acceleration_is_limited_per_step() {
        let gait = gait();
        let step = Step::from_velocity(
            WalkVector {
                x: 120.0,
                y: 0.0,
                theta: 0.0,
            },
            WalkVector::ZERO,
            &gait,
            Foot::Left,
            StepKind::Regular,
        );

        assert_relative_eq!(step.walk_vector.x, gait.step.max_acc_x);
    }

    #[test]
    fn left_step_cannot_move_right() {
        let gait = gait();
        let step = Step::from_velocity(
            WalkVector {
                x: 0.0,
                y: -30.0,
                theta: 0.0,
            },
            WalkVector {
                x: 0.0,
                y: -30.0,
                theta: 0.0,
            },
            &gait,
            Foot::Left,
            StepKind::Regular,
        );

        // the placement is clamped onto the track, the originating vector
        // keeps the commanded lateral speed
        assert_relative_eq!(step.y, HIP_OFFSET_Y);
        assert_eq!(step.walk_vector.y, -30.0);

        let step = Step::from_velocity(
            WalkVector {
                x: 0.0,
                y: -30.0,
                theta: 0.0,
            },
            WalkVector {
                x: 0.0,
                y: -30.0,
                theta: 0.0,
            },
            &gait,
            Foot::Right,
            StepKind::Regular,
        );
        assert!(step.walk_vector.y < 0.0);
        assert!(step.y < -HIP_OFFSET_Y);
    }

    #[test]
    fn velocity_displacement_round_trip() {
        let step = gait().step;
        let vel = WalkVector {
            x: 55.0,
            y: -20.0,
            theta: 0.3,
        };

        let back = vel_from_disp(disp_from_vel(vel, &step), &step);
        assert_relative_eq!(back.x, vel.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, vel.y, epsilon = 1e-4);
        assert_relative_eq!(back.theta, vel.theta, epsilon = 1e-6);
    }

    #[test]
    fn steps_snapshot_their_gait() {
        let mut gait = gait();
        let step = Step::zero(&gait, Foot::Left, StepKind::Regular);

        gait.step.duration = 1.0;
        assert_relative_eq!(step.step_config.duration, 0.4);
        assert_eq!(step.step_duration_frames, 20);
    }
}
