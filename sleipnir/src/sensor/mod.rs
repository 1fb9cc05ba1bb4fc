//! The transcriber: copies the raw device state into structured sensor
//! resources once per motion frame, applying calibration where needed.

pub mod fsr;
pub mod imu;

use bevy::prelude::*;
use mimir::types::{JointArray, RobotState};
use runa::Config;
use serde::{Deserialize, Serialize};

use crate::{config::ConfigExt, schedule::Sensor};

/// Per-unit sensor calibration.
#[derive(Resource, Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CalibrationConfig {
    pub accelerometer: AccelerometerCalibration,
    pub fsr: FsrCalibration,
}

/// Per-axis accelerometer calibration: `a_cal = a_raw · (−g / k_axis)`.
///
/// The `k` constants are robot specific and live in the per-robot config
/// overlay.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccelerometerCalibration {
    pub k_x: f32,
    pub k_y: f32,
    pub k_z: f32,
    /// Low-pass alpha for the filtered accelerometer.
    pub lpf_alpha: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FsrCalibration {
    /// Average load above which the robot counts as standing on the ground.
    pub ground_contact_threshold: f32,
}

impl Config for CalibrationConfig {
    const PATH: &'static str = "calibration.toml";
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            accelerometer: AccelerometerCalibration {
                k_x: 50.0,
                k_y: 54.0,
                k_z: 56.5,
                lpf_alpha: 0.3,
            },
            fsr: FsrCalibration {
                ground_contact_threshold: 0.25,
            },
        }
    }
}

/// The raw state fetched from the device bus, as of the start of this frame.
#[derive(Resource, Debug, Default, Clone, Deref, DerefMut)]
pub struct RawRobotState(pub RobotState);

/// Measured joint angles, rad.
#[derive(Resource, Debug, Default, Clone, Deref, DerefMut)]
pub struct JointPositions(pub JointArray<f32>);

/// Joint temperatures, °C.
#[derive(Resource, Debug, Default, Clone, Deref, DerefMut)]
pub struct JointTemperatures(pub JointArray<f32>);

/// Plugin that adds the transcriber systems.
pub struct SensorPlugin;

impl Plugin for SensorPlugin {
    fn build(&self, app: &mut App) {
        app.init_config::<CalibrationConfig>();
        app.init_resource::<RawRobotState>()
            .init_resource::<JointPositions>()
            .init_resource::<JointTemperatures>();
        app.add_systems(Sensor, update_joint_sensors);
        app.add_plugins((fsr::FsrSensorPlugin, imu::ImuSensorPlugin));
    }
}

fn update_joint_sensors(
    raw: Res<RawRobotState>,
    mut positions: ResMut<JointPositions>,
    mut temperatures: ResMut<JointTemperatures>,
) {
    positions.0 = raw.position.clone();
    temperatures.0 = raw.temperature.clone();
}
