//! Motion arbitration: commands in, one composed joint vector out.

pub mod commands;
pub mod providers;
pub mod switchboard;

use bevy::prelude::*;
use mimir::types::{FillExt, JointArray};

use crate::{config::ConfigExt, kinematics, walk::Gait};

pub use commands::MotionCommand;
pub use switchboard::Switchboard;

/// The joint targets the switchboard composed this frame, consumed by the
/// enactor.
#[derive(Resource, Debug, Clone)]
pub struct TargetJoints {
    pub positions: JointArray<f32>,
    pub stiffness: JointArray<f32>,
}

impl Default for TargetJoints {
    fn default() -> Self {
        Self {
            positions: JointArray::fill(0.0),
            stiffness: JointArray::fill(0.0),
        }
    }
}

pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_config::<Gait>();
        app.add_event::<MotionCommand>();
        app.init_resource::<TargetJoints>();
        app.add_systems(Startup, setup_switchboard);
        app.add_systems(Update, tick_switchboard);
    }
}

fn setup_switchboard(mut commands: Commands, gait: Res<Gait>) {
    let pose = kinematics::stance_pose(
        gait.stance.body_off_x,
        gait.stance.body_height,
        gait.stance.leg_separation_y,
    )
    .expect("the configured stance must be reachable");

    commands.insert_resource(TargetJoints {
        positions: pose.clone(),
        stiffness: JointArray::fill(gait.stiffness.leg),
    });
    commands.insert_resource(Switchboard::new(*gait, pose));
}

fn tick_switchboard(
    mut switchboard: ResMut<Switchboard>,
    mut motion_commands: EventReader<MotionCommand>,
    inertial: Res<crate::sensor::imu::InertialValues>,
    mut target: ResMut<TargetJoints>,
) {
    for command in motion_commands.read() {
        switchboard.handle(command);
    }

    let (positions, stiffness) = switchboard.tick(&inertial);
    target.positions = positions;
    target.stiffness = stiffness;
}
