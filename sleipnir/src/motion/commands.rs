//! The command surface of the motion switchboard.

use bevy::prelude::*;
use mimir::types::{BodyJoints, HeadJoints};

use crate::walk::gait::Gait;

/// Desired planar walk velocity, mm/s and rad/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkCommand {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

/// Walk a fixed number of velocity-derived steps, then stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepCommand {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
    pub count: u32,
}

/// Walk a planar displacement, mm and rad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceCommand {
    pub x_mm: f32,
    pub y_mm: f32,
    pub theta_rad: f32,
}

/// How a scripted move travels from the current pose to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    /// Parabolic ease-in/ease-out.
    Smooth,
}

/// A queued scripted move for everything below the neck.
#[derive(Debug, Clone)]
pub struct BodyJointCommand {
    pub angles: BodyJoints<f32>,
    pub stiffness: f32,
    pub duration_frames: u32,
    pub interpolation: Interpolation,
}

/// A queued scripted move for the head.
#[derive(Debug, Clone)]
pub struct HeadJointCommand {
    pub angles: HeadJoints<f32>,
    pub duration_frames: u32,
    pub interpolation: Interpolation,
}

/// Track toward a head posture at a bounded speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetHeadCommand {
    pub yaw: f32,
    pub pitch: f32,
    /// Maximum angular travel per motion frame, rad.
    pub max_speed: f32,
}

/// Everything the behavior layer can ask of the motion system.
#[derive(Event, Debug, Clone)]
pub enum MotionCommand {
    Walk(WalkCommand),
    Steps(StepCommand),
    Distance(DistanceCommand),
    /// Hot-swap the gait parameters; the change is interpolated.
    Gait(Box<Gait>),
    Body(BodyJointCommand),
    Head(HeadJointCommand),
    SetHead(SetHeadCommand),
    /// Hold the current pose with stiffness kept on.
    Freeze,
    Unfreeze,
}
