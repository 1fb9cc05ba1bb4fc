//! The switchboard selects which motion provider publishes joint values.
//!
//! One body provider and one head provider are current at any time. A newly
//! requested provider is only swapped in once the outgoing provider reports
//! done and the walking legs are both planted, so joint trajectories never
//! jump. A freeze bypasses the done check but still waits for double
//! support.

use bevy::prelude::*;
use mimir::types::{BodyJoints, FillExt, HeadJoints, JointArray, LegJoints};
use tracing::{error, warn};

use crate::{sensor::imu::InertialValues, walk::Gait};

use super::{
    commands::MotionCommand,
    providers::{HeadProvider, NullBodyProvider, NullHeadProvider, ScriptedProvider, WalkProvider},
};

/// The body providers, as a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyProviderKind {
    Walk,
    Scripted,
    Null,
}

/// The head providers, as a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadProviderKind {
    Head,
    Null,
}

#[derive(Resource)]
pub struct Switchboard {
    walk: WalkProvider,
    scripted: ScriptedProvider,
    head: HeadProvider,
    null_body: NullBodyProvider,
    null_head: NullHeadProvider,

    current_body: BodyProviderKind,
    next_body: Option<BodyProviderKind>,
    current_head: HeadProviderKind,
    next_head: Option<HeadProviderKind>,

    frozen: bool,

    last_body: BodyJoints<f32>,
    last_body_stiffness: BodyJoints<f32>,
    last_head: HeadJoints<f32>,
    last_head_stiffness: HeadJoints<f32>,
}

impl Switchboard {
    #[must_use]
    pub fn new(gait: Gait, initial_pose: JointArray<f32>) -> Self {
        let body_stiffness = BodyJoints {
            arms: mimir::types::ArmJoints::fill(gait.stiffness.arm),
            legs: LegJoints::fill(gait.stiffness.leg),
        };
        let head_stiffness = HeadJoints::fill(gait.stiffness.head);

        Self {
            walk: WalkProvider::new(gait),
            scripted: ScriptedProvider::new(),
            head: HeadProvider::new(),
            null_body: NullBodyProvider::new(initial_pose.body.clone(), body_stiffness.clone()),
            null_head: NullHeadProvider::new(initial_pose.head.clone(), gait.stiffness.head),
            current_body: BodyProviderKind::Null,
            next_body: None,
            current_head: HeadProviderKind::Null,
            next_head: None,
            frozen: false,
            last_body: initial_pose.body,
            last_body_stiffness: body_stiffness,
            last_head: initial_pose.head,
            last_head_stiffness: head_stiffness,
        }
    }

    /// Routes one motion command to its provider.
    pub fn handle(&mut self, command: &MotionCommand) {
        if self.frozen && !matches!(command, MotionCommand::Unfreeze) {
            warn!("motion command ignored while frozen: {command:?}");
            return;
        }

        match command {
            MotionCommand::Walk(walk) => {
                self.walk.set_speed(walk.x, walk.y, walk.theta);
                self.request_body(BodyProviderKind::Walk);
            }
            MotionCommand::Steps(steps) => {
                self.walk
                    .take_steps(steps.x, steps.y, steps.theta, steps.count);
                self.request_body(BodyProviderKind::Walk);
            }
            MotionCommand::Distance(distance) => {
                self.walk
                    .set_distance(distance.x_mm, distance.y_mm, distance.theta_rad);
                self.request_body(BodyProviderKind::Walk);
            }
            MotionCommand::Gait(gait) => self.walk.set_gait(*gait.clone()),
            MotionCommand::Body(body) => {
                self.scripted.enqueue(body.clone());
                self.request_body(BodyProviderKind::Scripted);
            }
            MotionCommand::Head(head) => {
                self.head.enqueue(head.clone());
                self.request_head(HeadProviderKind::Head);
            }
            MotionCommand::SetHead(head) => {
                self.head.set_head(*head);
                self.request_head(HeadProviderKind::Head);
            }
            MotionCommand::Freeze => {
                self.frozen = true;
                self.next_body = Some(BodyProviderKind::Null);
                self.next_head = Some(HeadProviderKind::Null);
            }
            MotionCommand::Unfreeze => {
                self.frozen = false;
            }
        }
    }

    /// Runs one motion frame: swap providers where allowed, tick the current
    /// ones, compose the full joint vector.
    pub fn tick(&mut self, inertial: &InertialValues) -> (JointArray<f32>, JointArray<f32>) {
        self.swap_body_provider();
        self.swap_head_provider();

        let (body, body_stiffness) = match self.current_body {
            BodyProviderKind::Walk => match self.walk.tick(inertial) {
                Ok(output) => output,
                Err(e) => {
                    // an unreachable goal or a broken queue is fatal for the
                    // walk: drop to the null provider at the current pose
                    error!("walk failed: {e}; resetting hard");
                    self.walk.hard_reset();
                    self.null_body
                        .hold(self.last_body.clone(), self.last_body_stiffness.clone());
                    self.current_body = BodyProviderKind::Null;
                    self.null_body.tick()
                }
            },
            BodyProviderKind::Scripted => self.scripted.tick(&self.last_body),
            BodyProviderKind::Null => self.null_body.tick(),
        };

        let (head, head_stiffness) = match self.current_head {
            HeadProviderKind::Head => self
                .head
                .tick(&self.last_head, self.walk.gait().stiffness.head),
            HeadProviderKind::Null => self.null_head.tick(),
        };

        self.last_body = body.clone();
        self.last_body_stiffness = body_stiffness.clone();
        self.last_head = head.clone();
        self.last_head_stiffness = head_stiffness.clone();

        (
            JointArray::from_parts(head, body),
            JointArray::from_parts(head_stiffness, body_stiffness),
        )
    }

    fn request_body(&mut self, kind: BodyProviderKind) {
        if kind != self.current_body {
            self.next_body = Some(kind);
        }
    }

    fn request_head(&mut self, kind: HeadProviderKind) {
        if kind != self.current_head {
            self.next_head = Some(kind);
        }
    }

    fn swap_body_provider(&mut self) {
        let Some(next) = self.next_body else {
            return;
        };

        let outgoing_ready = match self.current_body {
            BodyProviderKind::Walk => self.walk.is_done() || self.frozen,
            BodyProviderKind::Scripted => self.scripted.is_done() || self.frozen,
            BodyProviderKind::Null => true,
        };
        let legs_ready = if self.current_body == BodyProviderKind::Walk && self.walk.is_active() {
            self.walk.legs_in_double_support()
        } else {
            true
        };

        if outgoing_ready && legs_ready {
            if next == BodyProviderKind::Null {
                self.null_body
                    .hold(self.last_body.clone(), self.last_body_stiffness.clone());
            }
            self.current_body = next;
            self.next_body = None;
        } else if self.current_body == BodyProviderKind::Walk && !self.frozen {
            // keep nudging the walk toward a stop so the swap can happen
            self.walk.request_stop();
        }
    }

    fn swap_head_provider(&mut self) {
        let Some(next) = self.next_head else {
            return;
        };

        let outgoing_ready = match self.current_head {
            HeadProviderKind::Head => self.head.is_done(&self.last_head) || self.frozen,
            HeadProviderKind::Null => true,
        };

        if outgoing_ready {
            if next == HeadProviderKind::Null {
                self.null_head
                    .hold(self.last_head.clone(), self.last_head_stiffness.clone());
            }
            self.current_head = next;
            self.next_head = None;
        }
    }

    #[must_use]
    pub fn is_walk_active(&self) -> bool {
        self.current_body == BodyProviderKind::Walk && self.walk.is_active()
    }

    #[must_use]
    pub fn is_body_active(&self) -> bool {
        match self.current_body {
            BodyProviderKind::Walk => self.walk.is_active(),
            BodyProviderKind::Scripted => !self.scripted.is_done(),
            BodyProviderKind::Null => false,
        }
    }

    #[must_use]
    pub fn is_head_active(&self) -> bool {
        self.current_head == HeadProviderKind::Head && !self.head.is_done(&self.last_head)
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[must_use]
    pub fn current_body_provider(&self) -> BodyProviderKind {
        self.current_body
    }

    pub fn stop_body_moves(&mut self) {
        match self.current_body {
            BodyProviderKind::Walk => self.walk.request_stop(),
            BodyProviderKind::Scripted => self.scripted.hard_reset(),
            BodyProviderKind::Null => {}
        }
    }

    pub fn stop_head_moves(&mut self) {
        self.head.request_stop();
    }

    pub fn reset_walk_provider(&mut self) {
        self.walk.hard_reset();
    }

    pub fn reset_scripted_provider(&mut self) {
        self.scripted.hard_reset();
    }

    /// Odometry accumulated since the previous call, `(Δx, Δy, Δθ)` in mm
    /// and rad.
    pub fn odometry_update(&mut self) -> (f32, f32, f32) {
        self.walk.odometry_update()
    }
}

#[cfg(test)]
mod tests {
    use crate::motion::commands::WalkCommand;

    use super::*;

    fn switchboard() -> Switchboard {
        let gait = Gait::default();
        let pose = crate::kinematics::stance_pose(
            gait.stance.body_off_x,
            gait.stance.body_height,
            gait.stance.leg_separation_y,
        )
        .expect("default stance must be reachable");

        Switchboard::new(gait, pose)
    }

    fn inertial() -> InertialValues {
        InertialValues::quiet()
    }

    #[test]
    fn starts_on_the_null_providers() {
        let mut sb = switchboard();
        assert_eq!(sb.current_body_provider(), BodyProviderKind::Null);
        assert!(!sb.is_body_active());

        let (positions, stiffness) = sb.tick(&inertial());
        assert_eq!(positions.iter().count(), 22);
        assert!(stiffness.iter().all(|s| *s >= 0.0));
    }

    #[test]
    fn walk_command_swaps_in_the_walk_provider() {
        let mut sb = switchboard();
        sb.handle(&MotionCommand::Walk(WalkCommand {
            x: 60.0,
            y: 0.0,
            theta: 0.0,
        }));

        sb.tick(&inertial());
        assert_eq!(sb.current_body_provider(), BodyProviderKind::Walk);
        assert!(sb.is_walk_active());
    }

    #[test]
    fn freeze_swaps_at_the_next_double_support_and_keeps_stiffness() {
        let mut sb = switchboard();
        sb.handle(&MotionCommand::Walk(WalkCommand {
            x: 80.0,
            y: 0.0,
            theta: 0.0,
        }));

        // get the walk into a single support phase
        for _ in 0..30 {
            sb.tick(&inertial());
        }
        assert!(sb.is_walk_active());
        assert!(!sb.walk.legs_in_double_support());

        sb.handle(&MotionCommand::Freeze);

        // the swap must wait for both feet to be planted
        let mut swapped_at = None;
        let mut frozen_pose = None;
        for i in 0..30 {
            let was_double_support = sb.walk.legs_in_double_support();
            let (positions, stiffness) = sb.tick(&inertial());

            if sb.current_body_provider() == BodyProviderKind::Null {
                if swapped_at.is_none() {
                    swapped_at = Some(i);
                    assert!(was_double_support, "froze outside double support");
                    frozen_pose = Some(positions.clone());
                }

                // pose frozen at the last commanded values, stiffness kept
                assert_eq!(Some(&positions), frozen_pose.as_ref());
                assert!(stiffness.iter().any(|s| *s > 0.0));
            }
        }

        assert!(swapped_at.is_some(), "freeze never swapped providers");
    }

    #[test]
    fn commands_are_ignored_while_frozen() {
        let mut sb = switchboard();
        sb.handle(&MotionCommand::Freeze);
        sb.tick(&inertial());

        sb.handle(&MotionCommand::Walk(WalkCommand {
            x: 60.0,
            y: 0.0,
            theta: 0.0,
        }));
        sb.tick(&inertial());
        assert_eq!(sb.current_body_provider(), BodyProviderKind::Null);

        sb.handle(&MotionCommand::Unfreeze);
        sb.handle(&MotionCommand::Walk(WalkCommand {
            x: 60.0,
            y: 0.0,
            theta: 0.0,
        }));
        sb.tick(&inertial());
        assert_eq!(sb.current_body_provider(), BodyProviderKind::Walk);
    }
}
