//! The motion providers the switchboard arbitrates between.

mod head;
mod null;
mod scripted;
mod walk;

pub use head::HeadProvider;
pub use null::{NullBodyProvider, NullHeadProvider};
pub use scripted::ScriptedProvider;
pub use walk::WalkProvider;
