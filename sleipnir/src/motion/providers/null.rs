use mimir::types::{BodyJoints, FillExt, HeadJoints};

/// Holds the body at a captured pose. The fallback provider, and the one a
/// freeze drops to: the pose is frozen but stiffness stays on.
pub struct NullBodyProvider {
    pose: BodyJoints<f32>,
    stiffness: BodyJoints<f32>,
}

impl NullBodyProvider {
    #[must_use]
    pub fn new(pose: BodyJoints<f32>, stiffness: BodyJoints<f32>) -> Self {
        Self { pose, stiffness }
    }

    /// Captures the pose to hold from now on.
    pub fn hold(&mut self, pose: BodyJoints<f32>, stiffness: BodyJoints<f32>) {
        self.pose = pose;
        self.stiffness = stiffness;
    }

    #[must_use]
    pub fn tick(&self) -> (BodyJoints<f32>, BodyJoints<f32>) {
        (self.pose.clone(), self.stiffness.clone())
    }
}

/// Holds the head at a captured pose.
pub struct NullHeadProvider {
    pose: HeadJoints<f32>,
    stiffness: HeadJoints<f32>,
}

impl NullHeadProvider {
    #[must_use]
    pub fn new(pose: HeadJoints<f32>, stiffness: f32) -> Self {
        Self {
            pose,
            stiffness: HeadJoints::fill(stiffness),
        }
    }

    pub fn hold(&mut self, pose: HeadJoints<f32>, stiffness: HeadJoints<f32>) {
        self.pose = pose;
        self.stiffness = stiffness;
    }

    #[must_use]
    pub fn tick(&self) -> (HeadJoints<f32>, HeadJoints<f32>) {
        (self.pose.clone(), self.stiffness.clone())
    }
}
