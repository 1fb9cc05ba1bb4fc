//! The walking engine: step planning, ZMP preview control and leg motion.

pub mod arm;
pub mod balance;
pub mod controller;
pub mod engine;
pub mod gait;
pub mod leg;
pub mod smoothing;
pub mod step;
pub mod zmp;

pub use engine::StepGenerator;
pub use gait::{Gait, MetaGait};

use thiserror::Error;

use crate::kinematics::IkError;

/// Minimum number of steps that must be enqueued while walking.
///
/// A support swap consumes the front of the queue and needs the next two
/// steps to place the support and swing feet.
pub const MIN_NUM_ENQUEUED_STEPS: usize = 3;

/// Fatal walk errors. Both reset the walk hard and drop control to the null
/// body provider.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WalkError {
    #[error(
        "support swap requires at least {MIN_NUM_ENQUEUED_STEPS} enqueued steps, have {have}"
    )]
    InsufficientSteps { have: usize },
    #[error(transparent)]
    Ik(#[from] IkError),
}
