pub mod config;
pub mod filter;
pub mod kinematics;
pub mod motion;
pub mod nao;
pub mod schedule;
pub mod sensor;
pub mod walk;

/// The rate at which the motion pipeline runs, in frames per second.
pub const MOTION_FRAME_RATE: f32 = 50.0;

/// The period of one motion frame, in seconds.
pub const MOTION_FRAME_SECONDS: f32 = 1.0 / MOTION_FRAME_RATE;

/// The sleipnir prelude conveniently includes commonly needed types and
/// traits for writing code in the framework
pub mod prelude {
    pub use crate::config::ConfigExt;
    pub use crate::schedule::{PostWrite, PreWrite, Sensor, Write};
    pub use runa::Config;
}
