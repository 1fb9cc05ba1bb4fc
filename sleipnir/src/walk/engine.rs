//! The step generator.
//!
//! Turns a continuously changing walk vector into a queue of future foot
//! placements, expands those placements into the ZMP reference stream, runs
//! the preview controller on it, and drives the two walking legs from the
//! resulting COM trajectory.
//!
//! Every quantity lives in one of five planar frames:
//! - `i`: inertial, fixed when the walk starts,
//! - `f`: centered on the current support foot,
//! - `s`: the current step's origin (one hip offset from `f`),
//! - `s'`: the next step's origin,
//! - `c`: centered on the COM.

use std::f32::consts::PI;

use std::collections::VecDeque;

use mimir::types::SingleArmJoints;
use nalgebra::{Vector2, Vector3};
use planar::{
    Axis, Transform, Vector, identity, rotation, rotation4, safe_asin, translation, vector,
    vector4,
};
use tracing::warn;

use crate::kinematics::robot_dimensions::HIP_OFFSET_Y;

use super::{
    MIN_NUM_ENQUEUED_STEPS, WalkError,
    arm::swinging_arm,
    controller::{GRAVITY_MMSS, NUM_PREVIEW_FRAMES, Observer, PENDULUM_HEIGHT_MM, WalkController},
    gait::Gait,
    leg::{LegJointStiff, WalkingLeg},
    step::{Foot, Step, StepDisplacement, StepKind, WalkVector, ellipse_clip_displacement},
    zmp::ZmpReference,
};

/// Bail-out bound for the distance planner; far beyond any displacement a
/// single command can reasonably ask for.
const MAX_DISTANCE_STEPS: usize = 100;

/// Residual displacement below which the distance planner considers itself
/// done, in mm / mrad.
const DISTANCE_EPSILON: f32 = 1e-3;

pub struct StepGenerator {
    walk_vector: WalkVector,
    done: bool,

    com_i: Vector,
    com_f: Vector,

    zmp_ref: ZmpReference,
    future_steps: VecDeque<Step>,
    current_zmpd_steps: VecDeque<Step>,

    /// Takes step-origin coordinates of the most recently ZMP'd step into
    /// the inertial frame.
    si_transform: Transform,
    /// Where the previous step's ZMP pattern ended, in the next step's frame.
    last_zmp_end_s: Vector,

    /// Inertial → current support foot. Updated exactly once per swap.
    if_transform: Transform,
    /// Support foot → COM. Rebuilt every tick.
    fc_transform: Transform,
    /// Accumulated odometry between reads.
    cc_transform: Transform,

    next_step_is_left: bool,

    support_step_s: Step,
    swinging_step_s: Step,
    last_step_s: Step,
    support_step_f: Step,
    swinging_step_f: Step,
    swinging_step_source_f: Step,

    left_leg: WalkingLeg,
    right_leg: WalkingLeg,

    controller_x: Box<dyn WalkController + Send + Sync>,
    controller_y: Box<dyn WalkController + Send + Sync>,

    last_com_i: Vector,
    last_heading: f32,
    odometry_primed: bool,
}

impl StepGenerator {
    #[must_use]
    pub fn new(gait: &Gait) -> Self {
        let placeholder = Step::zero(gait, Foot::Left, StepKind::End);

        Self {
            walk_vector: WalkVector::ZERO,
            done: true,
            com_i: vector(0.0, 0.0),
            com_f: vector(0.0, 0.0),
            zmp_ref: ZmpReference::default(),
            future_steps: VecDeque::new(),
            current_zmpd_steps: VecDeque::new(),
            si_transform: identity(),
            last_zmp_end_s: vector(0.0, 0.0),
            if_transform: identity(),
            fc_transform: identity(),
            cc_transform: identity(),
            next_step_is_left: true,
            support_step_s: placeholder.clone(),
            swinging_step_s: placeholder.clone(),
            last_step_s: placeholder.clone(),
            support_step_f: placeholder.clone(),
            swinging_step_f: placeholder.clone(),
            swinging_step_source_f: placeholder,
            left_leg: WalkingLeg::new(Foot::Left),
            right_leg: WalkingLeg::new(Foot::Right),
            controller_x: Box::new(Observer::new()),
            controller_y: Box::new(Observer::new()),
            last_com_i: vector(0.0, 0.0),
            last_heading: 0.0,
            odometry_primed: false,
        }
    }

    /// True once the walk has fully wound down.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The foot currently bearing the load.
    #[must_use]
    pub fn support_foot(&self) -> Foot {
        self.support_step_s.foot
    }

    /// True while both legs are planted.
    #[must_use]
    pub fn legs_in_double_support(&self) -> bool {
        self.left_leg.state_is_double_support() && self.right_leg.state_is_double_support()
    }

    /// Sets the current desired velocity, in mm/s and rad/s.
    ///
    /// Starting from a stopped state resets all queues and frames and picks
    /// the starting swing foot from the commanded direction.
    pub fn set_speed(&mut self, x: f32, y: f32, theta: f32, gait: &Gait) {
        // the walk vector changed, so any tentative plans are stale
        self.clear_future_steps();

        self.walk_vector = WalkVector { x, y, theta };

        if self.done {
            self.reset_queues();
            let start_left = decide_start_left(y, theta);
            self.reset_steps(start_left, gait);
        }

        self.done = false;
    }

    /// Enqueues exactly `count` velocity-derived steps, then stops.
    pub fn take_steps(&mut self, x: f32, y: f32, theta: f32, count: u32, gait: &Gait) {
        if self.done {
            self.reset_queues();
            let start_left = decide_start_left(y, theta);
            self.reset_steps(start_left, gait);

            // the starting sequence only contains the support step; the
            // first commanded step must be produced here as well
            self.generate_step(x, y, theta, gait);
            self.done = false;
        } else {
            warn!(
                "step command ({x}, {y}, {theta}) x{count} appended: \
                 the step generator is already active"
            );
        }

        for _ in 0..count {
            self.generate_step(x, y, theta, gait);
        }

        // the end step is generated automatically once the vector is zero
        self.walk_vector = WalkVector::ZERO;
    }

    /// Enqueues the minimum number of equal-sized steps that cover the given
    /// displacement, in mm and rad.
    pub fn set_distance(&mut self, x_dist: f32, y_dist: f32, theta_dist: f32, gait: &Gait) {
        // drop any tentative steps
        self.future_steps.clear();

        let mut com_sfuture = vector(0.0, 0.0);
        let mut com_rotation_sfuture = 0.0;

        if self.done {
            let start_left = decide_start_left(y_dist, theta_dist);
            self.reset_steps(start_left, gait);
            self.done = false;
        } else if let Some(first) = self.current_zmpd_steps.front() {
            // walk the committed steps to find where the last finalized step
            // leaves the robot, relative to the current position
            let mut f_sfuture = f_s(first);
            for step in self.current_zmpd_steps.iter().skip(1) {
                f_sfuture = sprime_s(step) * f_sfuture;
            }

            com_sfuture = f_sfuture * self.com_f;
            com_rotation_sfuture = -safe_asin(f_sfuture[(1, 0)]);
        }

        let mut x_remaining = x_dist + com_sfuture.x;
        let mut y_remaining = y_dist + com_sfuture.y;
        let mut theta_remaining = theta_dist + com_rotation_sfuture;

        let mut planned = 0;
        while x_remaining.abs() > DISTANCE_EPSILON
            || y_remaining.abs() > DISTANCE_EPSILON
            || theta_remaining.abs() > DISTANCE_EPSILON
        {
            if planned >= MAX_DISTANCE_STEPS {
                warn!(
                    "distance command left unreachable remainder \
                     ({x_remaining}, {y_remaining}, {theta_remaining})"
                );
                break;
            }

            // the largest step we could take toward the goal
            let clipped = ellipse_clip_displacement(
                StepDisplacement {
                    x: x_remaining,
                    y: y_remaining,
                    theta: theta_remaining,
                },
                &gait.step,
            );

            // estimate the number of steps needed per axis, then spread the
            // remaining distance evenly over them. Lateral and turning
            // motion only progresses every other step, hence the doubling.
            let x_steps = if clipped.x != 0.0 {
                (x_remaining / clipped.x).ceil() as u32
            } else {
                0
            };

            let lateral_scale = if y_remaining > clipped.y { 2.0 } else { 1.0 };
            let y_steps = if clipped.y != 0.0 {
                (lateral_scale * y_remaining / clipped.y).ceil() as u32
            } else {
                0
            };

            let turn_scale = if theta_remaining > clipped.theta {
                2.0
            } else {
                1.0
            };
            let theta_steps = if clipped.theta != 0.0 {
                (turn_scale * theta_remaining / clipped.theta).ceil() as u32
            } else {
                0
            };

            let num_steps = x_steps.max(y_steps).max(theta_steps);
            if num_steps == 0 {
                break;
            }

            let new_step = self.generate_step_from_displacement(
                x_remaining / num_steps as f32,
                y_remaining / num_steps as f32,
                theta_remaining / num_steps as f32,
                gait,
            );

            // re-express what is left to cover in the new step's frame
            let dest_last_s = vector(x_remaining, y_remaining);
            let dest_this_s = sprime_s(&new_step) * dest_last_s;

            x_remaining = dest_this_s.x;
            y_remaining = dest_this_s.y;
            theta_remaining -= new_step.theta;
            planned += 1;
        }

        // the end step is generated automatically once the vector is zero
        self.walk_vector = WalkVector::ZERO;
    }

    /// Emergency stop: drops all queued state and reports done.
    pub fn reset_hard(&mut self) {
        self.reset_queues();
        self.done = true;
    }

    /// Advances the ZMP preview and the per-axis controllers, producing the
    /// new COM position in the inertial frame.
    pub fn tick_controller(&mut self, sensor_zmp: (f32, f32), gait: &Gait) {
        self.generate_zmp_ref(gait);

        self.controller_x.set_observer_scale(gait.sensor.observer_scale);
        self.controller_y.set_observer_scale(gait.sensor.observer_scale);

        let Some((cur_ref_x, cur_ref_y)) = self.zmp_ref.pop() else {
            return;
        };

        let com_x = self
            .controller_x
            .tick(self.zmp_ref.x(), cur_ref_x, sensor_zmp.0);
        let com_y = self
            .controller_y
            .tick(self.zmp_ref.y(), cur_ref_y, sensor_zmp.1);

        self.com_i = vector(com_x, com_y);
    }

    /// Produces the joint angles and stiffnesses for both legs this tick.
    ///
    /// Handles the support swap at the start of each double support phase,
    /// rebuilds the `f` and `c` frame transforms, and accumulates odometry.
    pub fn tick_legs(&mut self, gait: &Gait) -> Result<(LegJointStiff, LegJointStiff), WalkError> {
        // the first frame of any double support phase is the moment the
        // coordinate frames move to the new support foot
        if self.left_leg.is_switching_support_mode() && self.left_leg.state_is_double_support() {
            self.swap_support_legs()?;
        }

        // the COM relative to the support leg follows from the controller
        self.com_f = self.if_transform * self.com_i;

        let body_rot_angle_fc = self.left_leg.foot_rotation() / 2.0;
        self.fc_transform =
            rotation(body_rot_angle_fc) * translation(-self.com_f.x, -self.com_f.y);

        let support_is_left = self.support_step_f.foot == Foot::Left;
        let phase = (
            self.support_step_s.double_support_frames,
            self.support_step_s.single_support_frames,
        );

        let (left_step, right_step) = if support_is_left {
            (&self.support_step_f, &self.swinging_step_f)
        } else {
            (&self.swinging_step_f, &self.support_step_f)
        };

        let left = self.left_leg.tick(
            left_step,
            &self.swinging_step_source_f,
            &self.swinging_step_f,
            self.support_step_f.foot,
            phase,
            &self.fc_transform,
            &gait.stiffness,
        )?;
        let right = self.right_leg.tick(
            right_step,
            &self.swinging_step_source_f,
            &self.swinging_step_f,
            self.support_step_f.foot,
            phase,
            &self.fc_transform,
            &gait.stiffness,
        )?;

        self.update_odometry();

        // the walk is over once every planned step is terminal and nothing
        // new has been asked for
        if self.support_step_s.kind == StepKind::End
            && self.swinging_step_s.kind == StepKind::End
            && self.last_step_s.kind == StepKind::End
            && self.walk_vector.is_zero()
        {
            self.done = true;
        }

        Ok((left, right))
    }

    /// Produces the arm angles synchronized to the legs.
    #[must_use]
    pub fn tick_arms(&mut self, gait: &Gait) -> (SingleArmJoints<f32>, SingleArmJoints<f32>) {
        let left = swinging_arm(self.right_leg.goal_x(), gait.arm.amplitude, true);
        let right = swinging_arm(self.left_leg.goal_x(), gait.arm.amplitude, false);

        (left, right)
    }

    /// The accumulated odometry `(Δx, Δy, Δθ)` in mm and rad since the
    /// previous call; resets the accumulator.
    pub fn odometry_update(&mut self) -> (f32, f32, f32) {
        let rotation_acc = -safe_asin(self.cc_transform[(1, 0)]);
        let odo = self.cc_transform * vector(0.0, 0.0);
        self.cc_transform = identity();

        (odo.x, odo.y, rotation_acc)
    }

    /// Estimates the measured ZMP from the calibrated accelerometer, for the
    /// observer feedback path.
    ///
    /// The body-frame acceleration is first leveled with the inertial tilt
    /// angles, then rotated from the COM frame into the inertial frame.
    #[must_use]
    pub fn estimate_sensor_zmp(
        &self,
        accelerometer: Vector3<f32>,
        angles: Vector2<f32>,
    ) -> (f32, f32) {
        let leveled = rotation4(Axis::X, -angles.x)
            * rotation4(Axis::Y, -angles.y)
            * vector4(accelerometer.x, accelerometer.y, accelerometer.z);

        let angle_fc = safe_asin(self.fc_transform[(1, 0)]);
        let angle_if = safe_asin(self.if_transform[(1, 0)]);
        let acc_i = rotation(-(angle_fc + angle_if)) * vector(leveled.x, leveled.y);

        let h_over_g = PENDULUM_HEIGHT_MM / GRAVITY_MMSS;
        (
            self.controller_x.position() - h_over_g * acc_i.x,
            self.controller_y.position() - h_over_g * acc_i.y,
        )
    }

    /// Number of steps waiting to be expanded into ZMP samples.
    #[must_use]
    pub fn future_step_count(&self) -> usize {
        self.future_steps.len()
    }

    /// Number of steps already expanded into ZMP samples.
    #[must_use]
    pub fn zmpd_step_count(&self) -> usize {
        self.current_zmpd_steps.len()
    }

    /// Number of queued ZMP reference samples.
    #[must_use]
    pub fn zmp_ref_len(&self) -> usize {
        self.zmp_ref.len()
    }

    /// Ensures the ZMP reference is long enough to preview and that enough
    /// steps are committed, replenishing from the walk vector as needed.
    fn generate_zmp_ref(&mut self, gait: &Gait) {
        while self.zmp_ref.len() <= NUM_PREVIEW_FRAMES
            || self.current_zmpd_steps.len() < MIN_NUM_ENQUEUED_STEPS
        {
            if self.future_steps.is_empty() {
                let WalkVector { x, y, theta } = self.walk_vector;
                self.generate_step(x, y, theta, gait);
            } else if let Some(mut next) = self.future_steps.pop_front() {
                self.fill_zmp(&mut next);
                self.current_zmpd_steps.push_back(next);
            }
        }
    }

    /// Expands one step into its ZMP reference samples. Marks it immutable.
    fn fill_zmp(&mut self, step: &mut Step) {
        match step.kind {
            StepKind::Regular => self.fill_zmp_regular(step),
            StepKind::End => self.fill_zmp_end(step),
        }
        step.zmpd = true;
    }

    /// The reference pattern for a normal support step: hold at the previous
    /// end point, move diagonally to the new foot, hold, then traverse the
    /// foot during single support.
    fn fill_zmp_regular(&mut self, step: &Step) {
        let sign = step.foot.sign();

        // turning and strafing both need the reference pushed further toward
        // the outside of the support foot, or the robot falls inward on the
        // closing step
        let mut adjustment = (step.theta / PI) * step.zmp_config.turn_off;
        adjustment += (step.y - sign * HIP_OFFSET_Y) * step.zmp_config.strafe_off;

        let mut y_zmp_offset = match step.foot {
            Foot::Left => step.zmp_config.l_off_y,
            Foot::Right => step.zmp_config.r_off_y,
        };
        y_zmp_offset += adjustment;

        // after a turn, "outside" is rotated along with the step
        let y_zmp_offset_x = -step.theta.abs().sin() * y_zmp_offset;
        let y_zmp_offset_y = step.theta.cos() * y_zmp_offset;

        let start_s = self.last_zmp_end_s;
        let end_s = vector(
            step.x + step.stance_config.body_off_x + y_zmp_offset_x,
            step.y + sign * y_zmp_offset_y,
        );
        let mid_s = vector(end_s.x - step.zmp_config.foot_length_x, end_s.y);

        let start_i = self.si_transform * start_s;
        let mid_i = self.si_transform * mid_s;
        let end_i = self.si_transform * end_s;

        // split double support into static / moving / static phases
        let half_static = (step.double_support_frames as f32 * step.zmp_config.static_fraction
            / 2.0) as u32;
        let moving = step.double_support_frames - 2 * half_static;

        for _ in 0..half_static {
            self.zmp_ref.push(start_i.x, start_i.y);
        }

        for i in 0..moving {
            let t = i as f32 / moving as f32;
            let sample = start_i + (mid_i - start_i) * t;
            self.zmp_ref.push(sample.x, sample.y);
        }

        for _ in 0..half_static {
            self.zmp_ref.push(mid_i.x, mid_i.y);
        }

        for i in 0..step.single_support_frames {
            let t = i as f32 / step.single_support_frames as f32;
            let sample = mid_i + (end_i - mid_i) * t;
            self.zmp_ref.push(sample.x, sample.y);
        }

        self.si_transform = self.si_transform * s_sprime(step);
        self.last_zmp_end_s = sprime_s(step) * end_s;
    }

    /// The reference pattern for a terminal step: park the ZMP under the
    /// neutral stance for a whole step duration. An end step never advances
    /// `si_transform`.
    fn fill_zmp_end(&mut self, step: &Step) {
        let end_s = vector(step.stance_config.body_off_x, 0.0);
        let end_i = self.si_transform * end_s;

        for _ in 0..step.step_duration_frames {
            self.zmp_ref.push(end_i.x, end_i.y);
        }

        self.last_zmp_end_s = sprime_s(step) * end_s;
    }

    /// Moves the frames and step bookkeeping onto the next support foot.
    fn swap_support_legs(&mut self) -> Result<(), WalkError> {
        let enqueued = self.current_zmpd_steps.len() + self.future_steps.len();
        if enqueued < MIN_NUM_ENQUEUED_STEPS || self.current_zmpd_steps.len() < MIN_NUM_ENQUEUED_STEPS
        {
            return Err(WalkError::InsufficientSteps { have: enqueued });
        }

        // the front step is obsolete now; the new front is the support step
        // and the one after it the swing target
        self.last_step_s = self
            .current_zmpd_steps
            .pop_front()
            .ok_or(WalkError::InsufficientSteps { have: 0 })?;
        self.support_step_s = self.current_zmpd_steps[0].clone();
        self.swinging_step_s = self.current_zmpd_steps[1].clone();

        let step_transform = fprime_f(&self.support_step_s);
        self.if_transform = step_transform * self.if_transform;

        // the support foot is the origin of the new f frame by definition;
        // the swing source is where that foot stood in the previous frame
        let origin = vector(0.0, 0.0);
        let swing_src = step_transform * origin;

        // the swing destination comes from the step after the support step
        let swing_reverse = f_fprime(&self.swinging_step_s);
        let swing_pos = swing_reverse * origin;

        // the rotations can be read straight out of the planar transforms
        let swing_dest_angle = -safe_asin(swing_reverse[(1, 0)]);
        let swing_src_angle = -safe_asin(step_transform[(1, 0)]);

        self.support_step_f = Step::reframed(0.0, 0.0, 0.0, &self.support_step_s);
        self.swinging_step_f = Step::reframed(
            swing_pos.x,
            swing_pos.y,
            swing_dest_angle,
            &self.swinging_step_s,
        );
        self.swinging_step_source_f =
            Step::reframed(swing_src.x, swing_src.y, swing_src_angle, &self.last_step_s);

        Ok(())
    }

    /// Generates one step from the given velocity and appends it to the
    /// future queue.
    fn generate_step(&mut self, x: f32, y: f32, theta: f32, gait: &Gait) -> Step {
        let (kind, x, y, theta) = self.resolve_step_kind(x, y, theta);
        let last_vector = self
            .last_queued()
            .map_or(WalkVector::ZERO, |step| step.walk_vector);
        let foot = self.next_step_foot();

        let step = Step::from_velocity(WalkVector { x, y, theta }, last_vector, gait, foot, kind);
        self.push_step(step)
    }

    /// Generates one step from the given displacement and appends it to the
    /// future queue.
    fn generate_step_from_displacement(&mut self, x: f32, y: f32, theta: f32, gait: &Gait) -> Step {
        let (kind, x, y, theta) = self.resolve_step_kind(x, y, theta);
        let foot = self.next_step_foot();

        let step = Step::from_displacement(StepDisplacement { x, y, theta }, gait, foot, kind);
        self.push_step(step)
    }

    /// Decides the kind of the next step, repairing the queue tail where
    /// needed: a regular step must never directly follow an end step, since
    /// an end step parks the ZMP under the body.
    fn resolve_step_kind(&mut self, x: f32, y: f32, theta: f32) -> (StepKind, f32, f32, f32) {
        let stopping = x == 0.0 && y == 0.0 && theta == 0.0;
        if stopping {
            return (StepKind::End, 0.0, 0.0, 0.0);
        }

        match self.last_queued_mut() {
            Some(last) if last.kind == StepKind::End => {
                if last.zmpd {
                    // too late to rewrite the queued end step; restart with a
                    // stationary step instead
                    (StepKind::Regular, 0.0, 0.0, 0.0)
                } else {
                    last.kind = StepKind::Regular;
                    (StepKind::Regular, x, y, theta)
                }
            }
            _ => (StepKind::Regular, x, y, theta),
        }
    }

    fn next_step_foot(&self) -> Foot {
        if self.next_step_is_left {
            Foot::Left
        } else {
            Foot::Right
        }
    }

    fn push_step(&mut self, step: Step) -> Step {
        self.future_steps.push_back(step.clone());
        // feet alternate through the whole queue
        self.next_step_is_left = !self.next_step_is_left;
        step
    }

    fn last_queued(&self) -> Option<&Step> {
        self.future_steps
            .back()
            .or_else(|| self.current_zmpd_steps.back())
    }

    fn last_queued_mut(&mut self) -> Option<&mut Step> {
        if self.future_steps.is_empty() {
            self.current_zmpd_steps.back_mut()
        } else {
            self.future_steps.back_mut()
        }
    }

    /// Drops all queued steps and reference samples, including committed
    /// ones.
    fn reset_queues(&mut self) {
        self.future_steps.clear();
        self.current_zmpd_steps.clear();
        self.zmp_ref.clear();
    }

    /// Drops only the tentative steps we have not committed to, and realigns
    /// the alternation with the committed tail.
    fn clear_future_steps(&mut self) {
        self.future_steps.clear();

        if let Some(last) = self.current_zmpd_steps.back() {
            self.next_step_is_left = last.foot != Foot::Left;
        }
    }

    /// Re-arms the controller, frames and starting steps for a fresh walk.
    ///
    /// The first support step is terminal so the reference stays put while
    /// the robot shifts its weight; the dummy step ahead of it is popped by
    /// the first support swap without ever moving anything.
    fn reset_steps(&mut self, start_left: bool, gait: &Gait) {
        self.controller_x.init_state(
            gait.stance.body_off_x,
            0.0,
            gait.stance.body_off_x,
        );
        self.controller_y.init_state(0.0, 0.0, 0.0);
        self.com_i = vector(gait.stance.body_off_x, 0.0);

        self.si_transform = identity();
        self.last_zmp_end_s = vector(0.0, 0.0);

        let (dummy_foot, first_support_foot, support_sign, swinging) = if start_left {
            // the first support step is terminal, so the nominal first swing
            // does not move; the first real swing lands two steps later, on
            // the left
            (Foot::Right, Foot::Left, 1.0, Foot::Right)
        } else {
            (Foot::Left, Foot::Right, -1.0, Foot::Left)
        };
        self.next_step_is_left = !start_left;

        self.left_leg.start(swinging);
        self.right_leg.start(swinging);

        self.if_transform = translation(0.0, support_sign * HIP_OFFSET_Y);

        // odometry keeps its accumulator across restarts; only the frame
        // bookkeeping is re-primed on the first tick
        self.odometry_primed = false;

        let dummy_step = Step::zero(gait, dummy_foot, StepKind::Regular);
        let mut first_support_step = Step::zero(gait, first_support_foot, StepKind::End);

        self.support_step_s = first_support_step.clone();
        self.swinging_step_s = dummy_step.clone();
        self.last_step_s = dummy_step.clone();

        self.current_zmpd_steps.push_back(dummy_step);
        self.fill_zmp(&mut first_support_step);
        self.current_zmpd_steps.push_back(first_support_step);
    }

    fn update_odometry(&mut self) {
        let m_ic = self.fc_transform * self.if_transform;
        // atan2 instead of the asin readout: the heading accumulates beyond
        // ±π/2 on longer turns
        let heading = -m_ic[(1, 0)].atan2(m_ic[(0, 0)]);

        if !self.odometry_primed {
            self.odometry_primed = true;
            self.last_com_i = self.com_i;
            self.last_heading = heading;
            return;
        }

        let mut delta = self.com_i - self.last_com_i;
        delta.z = 0.0;
        let local = rotation(-self.last_heading) * delta;
        let delta_theta = wrap_angle(heading - self.last_heading);

        self.cc_transform =
            self.cc_transform * translation(local.x, local.y) * rotation(-delta_theta);

        self.last_com_i = self.com_i;
        self.last_heading = heading;
    }
}

/// Normalizes an angle difference into `(-π, π]`.
fn wrap_angle(angle: f32) -> f32 {
    let mut angle = angle;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Picks the starting swing foot: strafe direction wins, then turn
/// direction, and ties start right.
#[must_use]
pub fn decide_start_left(lateral_velocity: f32, radial_velocity: f32) -> bool {
    if lateral_velocity == 0.0 {
        return radial_velocity > 0.0;
    }
    lateral_velocity > 0.0
}

/// The transform from the previous support frame into the frame rooted at
/// `step`.
#[must_use]
pub fn fprime_f(step: &Step) -> Transform {
    let leg_sign = step.foot.sign();

    let trans_fprime_s = translation(0.0, -leg_sign * HIP_OFFSET_Y);
    let trans_s_f = rotation(-step.theta) * translation(-step.x, -step.y);

    trans_s_f * trans_fprime_s
}

/// The inverse of [`fprime_f`]: takes points in the frame rooted at `step`
/// back into the previous support frame.
#[must_use]
pub fn f_fprime(step: &Step) -> Transform {
    let leg_sign = step.foot.sign();

    let trans_fprime_s = translation(0.0, leg_sign * HIP_OFFSET_Y);
    let trans_s_f = translation(step.x, step.y) * rotation(step.theta);

    trans_fprime_s * trans_s_f
}

/// Takes points in the next step frame into the current one.
#[must_use]
pub fn sprime_s(step: &Step) -> Transform {
    let leg_sign = step.foot.sign();

    let trans_f_s = translation(0.0, leg_sign * HIP_OFFSET_Y);
    let trans_sprime_f = rotation(-step.theta) * translation(-step.x, -step.y);

    trans_f_s * trans_sprime_f
}

/// The inverse of [`sprime_s`]: takes points in the current step frame into
/// the next one.
#[must_use]
pub fn s_sprime(step: &Step) -> Transform {
    let leg_sign = step.foot.sign();

    let trans_f_s = translation(0.0, -leg_sign * HIP_OFFSET_Y);
    let trans_sprime_f = translation(step.x, step.y) * rotation(step.theta);

    trans_sprime_f * trans_f_s
}

/// Takes points in the support frame into the support step's frame.
#[must_use]
pub fn f_s(step: &Step) -> Transform {
    translation(0.0, step.foot.sign() * HIP_OFFSET_Y)
}
