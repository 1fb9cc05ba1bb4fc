use mimir::types::{ArmJoints, BodyJoints, FillExt, LegJoints};

use crate::{
    sensor::imu::InertialValues,
    walk::{
        Gait, MetaGait, StepGenerator, WalkError, balance::BalanceAdjustment, step::Foot,
    },
};

/// Frames over which a hot-swapped gait is interpolated.
const GAIT_TRANSITION_FRAMES: u32 = 100;

/// The walk engine behind a provider interface.
pub struct WalkProvider {
    engine: StepGenerator,
    metagait: MetaGait,
    balance: BalanceAdjustment,
}

impl WalkProvider {
    #[must_use]
    pub fn new(gait: Gait) -> Self {
        Self {
            engine: StepGenerator::new(&gait),
            metagait: MetaGait::new(gait),
            balance: BalanceAdjustment::new(gait.sensor.gyro_alpha),
        }
    }

    pub fn set_speed(&mut self, x: f32, y: f32, theta: f32) {
        let gait = self.metagait.current();
        self.engine.set_speed(x, y, theta, &gait);
    }

    pub fn take_steps(&mut self, x: f32, y: f32, theta: f32, count: u32) {
        let gait = self.metagait.current();
        self.engine.take_steps(x, y, theta, count, &gait);
    }

    pub fn set_distance(&mut self, x: f32, y: f32, theta: f32) {
        let gait = self.metagait.current();
        self.engine.set_distance(x, y, theta, &gait);
    }

    pub fn set_gait(&mut self, gait: Gait) {
        self.metagait.set_target(gait, GAIT_TRANSITION_FRAMES);
    }

    /// Asks the walk to wind down at the next opportunity.
    pub fn request_stop(&mut self) {
        if !self.engine.is_done() {
            self.set_speed(0.0, 0.0, 0.0);
        }
    }

    /// Emergency stop: drops everything, reports done immediately.
    pub fn hard_reset(&mut self) {
        self.engine.reset_hard();
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.engine.is_done()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.engine.is_done()
    }

    #[must_use]
    pub fn legs_in_double_support(&self) -> bool {
        self.engine.legs_in_double_support()
    }

    #[must_use]
    pub fn support_foot(&self) -> Foot {
        self.engine.support_foot()
    }

    /// The gait in effect this frame (interpolated during transitions).
    #[must_use]
    pub fn gait(&self) -> Gait {
        self.metagait.current()
    }

    pub fn odometry_update(&mut self) -> (f32, f32, f32) {
        self.engine.odometry_update()
    }

    /// Runs one full walk frame: controller, legs and arms.
    pub fn tick(
        &mut self,
        inertial: &InertialValues,
    ) -> Result<(BodyJoints<f32>, BodyJoints<f32>), WalkError> {
        let gait = self.metagait.tick();

        self.balance.update(inertial.gyroscope);

        let sensor_zmp = self
            .engine
            .estimate_sensor_zmp(inertial.filtered_accelerometer(), inertial.angles);
        self.engine.tick_controller(sensor_zmp, &gait);

        let (left, right) = self.engine.tick_legs(&gait)?;
        let (left_arm, right_arm) = self.engine.tick_arms(&gait);

        let mut legs = LegJoints {
            left_leg: left.angles,
            right_leg: right.angles,
        };
        self.balance
            .apply(&mut legs, self.engine.support_foot(), gait.sensor.balance_gain);

        let positions = BodyJoints {
            arms: ArmJoints {
                left_arm,
                right_arm,
            },
            legs,
        };
        let stiffness = BodyJoints {
            arms: ArmJoints::fill(gait.stiffness.arm),
            legs: LegJoints {
                left_leg: left.stiffness,
                right_leg: right.stiffness,
            },
        };

        Ok((positions, stiffness))
    }
}
