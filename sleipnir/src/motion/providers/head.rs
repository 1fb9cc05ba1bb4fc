use std::collections::VecDeque;

use mimir::types::{FillExt, HeadJoints};

use crate::{
    motion::commands::{HeadJointCommand, Interpolation, SetHeadCommand},
    walk::smoothing::ease_in_out,
};

struct ActiveMove {
    start: HeadJoints<f32>,
    command: HeadJointCommand,
    elapsed: u32,
}

/// Moves the head: either tracking a posture target at a bounded speed, or
/// playing queued head scripts.
#[derive(Default)]
pub struct HeadProvider {
    queue: VecDeque<HeadJointCommand>,
    active: Option<ActiveMove>,
    target: Option<SetHeadCommand>,
}

impl HeadProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks toward a head posture; replaces any queued scripts.
    pub fn set_head(&mut self, command: SetHeadCommand) {
        self.queue.clear();
        self.active = None;
        self.target = Some(command);
    }

    pub fn enqueue(&mut self, command: HeadJointCommand) {
        self.target = None;
        self.queue.push_back(command);
    }

    pub fn request_stop(&mut self) {
        self.queue.clear();
        self.active = None;
        self.target = None;
    }

    pub fn hard_reset(&mut self) {
        self.request_stop();
    }

    #[must_use]
    pub fn is_done(&self, current: &HeadJoints<f32>) -> bool {
        match &self.target {
            Some(target) => {
                (current.yaw - target.yaw).abs() < 1e-4
                    && (current.pitch - target.pitch).abs() < 1e-4
            }
            None => self.active.is_none() && self.queue.is_empty(),
        }
    }

    /// Produces the head joints for one frame, starting from `current`.
    pub fn tick(
        &mut self,
        current: &HeadJoints<f32>,
        stiffness: f32,
    ) -> (HeadJoints<f32>, HeadJoints<f32>) {
        if let Some(target) = self.target {
            let positions = HeadJoints {
                yaw: step_toward(current.yaw, target.yaw, target.max_speed),
                pitch: step_toward(current.pitch, target.pitch, target.max_speed),
            };
            return (positions, HeadJoints::fill(stiffness));
        }

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
            return (current.clone(), HeadJoints::fill(stiffness));
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

        if active.elapsed >= duration {
            self.active = None;
        }

        (positions, HeadJoints::fill(stiffness))
    }
}

fn step_toward(current: f32, target: f32, max_speed: f32) -> f32 {
    current + (target - current).clamp(-max_speed, max_speed)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn set_head_tracks_at_bounded_speed() {
        let mut provider = HeadProvider::new();
        provider.set_head(SetHeadCommand {
            yaw: 1.0,
            pitch: 0.0,
            max_speed: 0.1,
        });

        let mut head = HeadJoints::fill(0.0);
        (head, _) = provider.tick(&head, 0.5);
        assert_relative_eq!(head.yaw, 0.1);

        for _ in 0..20 {
            (head, _) = provider.tick(&head, 0.5);
        }
        assert_relative_eq!(head.yaw, 1.0);
        assert!(provider.is_done(&head));
    }

    #[test]
    fn scripted_head_move_completes() {
        let mut provider = HeadProvider::new();
        provider.enqueue(HeadJointCommand {
            angles: HeadJoints {
                yaw: 0.5,
                pitch: -0.2,
            },
            duration_frames: 8,
            interpolation: Interpolation::Smooth,
        });

        let mut head = HeadJoints::fill(0.0);
        for _ in 0..8 {
            (head, _) = provider.tick(&head, 0.5);
        }

        assert_relative_eq!(head.yaw, 0.5);
        assert_relative_eq!(head.pitch, -0.2);
        assert!(provider.is_done(&head));
    }
}
