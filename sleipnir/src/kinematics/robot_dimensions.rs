//! Physical dimensions of the robot, in millimetres.

/// Lateral offset of each hip joint from the body center line.
pub const HIP_OFFSET_Y: f32 = 50.0;

/// Length of the thigh, hip joint to knee joint.
pub const THIGH_LENGTH: f32 = 100.0;

/// Length of the tibia, knee joint to ankle joint.
pub const TIBIA_LENGTH: f32 = 102.9;

/// Height of the ankle joint above the sole.
pub const FOOT_HEIGHT: f32 = 45.19;
