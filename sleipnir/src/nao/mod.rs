//! Device bus hookup: the enactor writes commands, the sensor read feeds
//! the next frame.

pub mod cycle;
pub mod enactor;

use bevy::prelude::*;
use mimir::{ActuatorBus, SensorMemory};
use tracing::warn;

use crate::{schedule::Write, sensor::RawRobotState};

pub use cycle::{Cycle, CycleTime};

/// An object-safe device backend: bulk sensor reads plus alias writes.
pub trait DeviceBackend: SensorMemory + ActuatorBus + Send + Sync {}

impl<T: SensorMemory + ActuatorBus + Send + Sync> DeviceBackend for T {}

/// Resource owning the connection to the device layer.
#[derive(Resource)]
pub struct Device(pub Box<dyn DeviceBackend>);

/// Plugin that adds the device write/read cycle.
///
/// Expects a [`Device`] resource to be inserted before startup; the device
/// layer itself is outside the core.
pub struct NaoPlugin;

impl Plugin for NaoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Cycle>().init_resource::<CycleTime>();
        app.init_resource::<enactor::LastCommands>();
        app.add_systems(Startup, enactor::create_aliases);
        app.add_systems(
            Write,
            (
                enactor::send_joint_commands,
                enactor::send_stiffness_commands,
                enactor::cycle_sonar,
                read_robot_state,
                cycle::update_cycle_stats,
            )
                .chain(),
        );
    }
}

/// Fetches the sensor state that the next frame's transcriber will consume.
/// A failed read reuses the previous values.
fn read_robot_state(mut device: ResMut<Device>, mut raw: ResMut<RawRobotState>) {
    match device.0.read_state() {
        Ok(state) => raw.0 = state,
        Err(e) => warn!("sensor read failed, reusing previous values: {e}"),
    }
}
