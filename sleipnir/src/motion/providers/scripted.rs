use std::collections::VecDeque;

use mimir::types::{BodyJoints, FillExt};

use crate::{
    motion::commands::{BodyJointCommand, Interpolation},
    walk::smoothing::ease_in_out,
};

/// Stiffness the scripted provider holds between moves.
const IDLE_STIFFNESS: f32 = 0.4;

struct ActiveMove {
    start: BodyJoints<f32>,
    command: BodyJointCommand,
    elapsed: u32,
}

/// Plays queued joint scripts, interpolating each move from the pose the
/// body is actually in when the move starts.
///
/// Progress is counted in motion frames, never in wall-clock time, so a
/// replayed command stream always produces the same joints.
#[derive(Default)]
pub struct ScriptedProvider {
    queue: VecDeque<BodyJointCommand>,
    active: Option<ActiveMove>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, command: BodyJointCommand) {
        self.queue.push_back(command);
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// Drops the queue and the in-flight move.
    pub fn hard_reset(&mut self) {
        self.queue.clear();
        self.active = None;
    }

    /// Produces the body joints for one frame. `current` is the pose the
    /// body held last frame; it seeds each new move and is replayed while
    /// idle.
    pub fn tick(&mut self, current: &BodyJoints<f32>) -> (BodyJoints<f32>, BodyJoints<f32>) {
        if self.active.is_none() {
            if let Some(command) = self.queue.pop_front() {
                self.active = Some(ActiveMove {
                    start: current.clone(),
                    command,
                    elapsed: 0,
                });
            }
        }

        let Some(active) = &mut self.active else {
            return (current.clone(), BodyJoints::fill(IDLE_STIFFNESS));
        };

        active.elapsed += 1;
        let duration = active.command.duration_frames.max(1);
        let progress = (active.elapsed as f32 / duration as f32).clamp(0.0, 1.0);
        let progress = match active.command.interpolation {
            Interpolation::Linear => progress,
            Interpolation::Smooth => ease_in_out(progress),
        };

        let delta = active.command.angles.clone() - active.start.clone();
        let positions = active.start.clone() + delta * progress;
        let stiffness = BodyJoints::fill(active.command.stiffness);

        if active.elapsed >= duration {
            self.active = None;
        }

        (positions, stiffness)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn command(target: f32, frames: u32, interpolation: Interpolation) -> BodyJointCommand {
        BodyJointCommand {
            angles: BodyJoints::fill(target),
            stiffness: 0.6,
            duration_frames: frames,
            interpolation,
        }
    }

    #[test]
    fn linear_move_reaches_its_target() {
        let mut provider = ScriptedProvider::new();
        provider.enqueue(command(1.0, 10, Interpolation::Linear));

        let start = BodyJoints::fill(0.0);
        let mut last = start.clone();
        for _ in 0..10 {
            (last, _) = provider.tick(&start);
        }

        assert_relative_eq!(last.legs.left_leg.knee_pitch, 1.0);
        assert!(provider.is_done());
    }

    #[test]
    fn moves_run_back_to_back() {
        let mut provider = ScriptedProvider::new();
        provider.enqueue(command(1.0, 5, Interpolation::Linear));
        provider.enqueue(command(-1.0, 5, Interpolation::Smooth));

        let start = BodyJoints::fill(0.0);
        let mut pose = start.clone();
        for _ in 0..10 {
            (pose, _) = provider.tick(&pose);
        }

        assert_relative_eq!(pose.arms.left_arm.shoulder_pitch, -1.0);
        assert!(provider.is_done());
    }

    #[test]
    fn smooth_move_eases_in() {
        let mut provider = ScriptedProvider::new();
        provider.enqueue(command(1.0, 10, Interpolation::Smooth));

        let start = BodyJoints::fill(0.0);
        let (after_one, _) = provider.tick(&start);

        // a smooth move covers less ground in its first frame than a linear
        // one would
        assert!(after_one.legs.left_leg.hip_pitch < 0.1);
    }

    #[test]
    fn idle_provider_replays_the_current_pose() {
        let mut provider = ScriptedProvider::new();
        let pose = BodyJoints::fill(0.3);
        let (replayed, _) = provider.tick(&pose);
        assert_eq!(replayed, pose);
        assert!(provider.is_done());
    }
}
