use bevy::prelude::*;
use nalgebra::{Vector2, Vector3};

use crate::{filter::LowPassFilter, schedule::Sensor, walk::controller::GRAVITY_MMSS};

use super::{CalibrationConfig, RawRobotState};

/// Plugin offering a structured wrapper for the parts of the IMU, derived
/// from the raw device state.
pub struct ImuSensorPlugin;

impl Plugin for ImuSensorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_inertial_values);
        app.add_systems(Sensor, update_inertial_values);
    }
}

/// Gyroscope, accelerometer and body inclination values.
#[derive(Resource, Debug, Clone)]
pub struct InertialValues {
    /// Rotational speed around the x, y and z axes, rad/s.
    pub gyroscope: Vector3<f32>,
    /// Calibrated acceleration, mm/s².
    pub accelerometer: Vector3<f32>,
    /// Body inclination around the x and y axes, rad.
    pub angles: Vector2<f32>,

    filter: LowPassFilter<Vector3<f32>>,
}

impl InertialValues {
    fn new(lpf_alpha: f32) -> Self {
        Self {
            gyroscope: Vector3::zeros(),
            accelerometer: Vector3::zeros(),
            angles: Vector2::zeros(),
            filter: LowPassFilter::new(Vector3::zeros(), lpf_alpha),
        }
    }

    /// The low-pass filtered acceleration, mm/s².
    #[must_use]
    pub fn filtered_accelerometer(&self) -> Vector3<f32> {
        self.filter.state
    }

    /// An IMU reporting a perfectly still, upright robot. Useful for bench
    /// runs and tests that do not care about sensor feedback.
    #[must_use]
    pub fn quiet() -> Self {
        Self::new(0.0)
    }
}

fn setup_inertial_values(mut commands: Commands, config: Res<CalibrationConfig>) {
    commands.insert_resource(InertialValues::new(config.accelerometer.lpf_alpha));
}

fn update_inertial_values(
    raw: Res<RawRobotState>,
    config: Res<CalibrationConfig>,
    mut inertial: ResMut<InertialValues>,
) {
    let calibration = &config.accelerometer;
    let raw_accelerometer = raw.inertial.accelerometer;

    inertial.accelerometer = Vector3::new(
        raw_accelerometer.x * (-GRAVITY_MMSS / calibration.k_x),
        raw_accelerometer.y * (-GRAVITY_MMSS / calibration.k_y),
        raw_accelerometer.z * (-GRAVITY_MMSS / calibration.k_z),
    );
    inertial.gyroscope = raw.inertial.gyroscope;
    inertial.angles = raw.inertial.angles;

    let accelerometer = inertial.accelerometer;
    inertial.filter.update(accelerometer);
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn calibration_maps_resting_reading_to_gravity() {
        let calibration = CalibrationConfig::default().accelerometer;

        // an upright, resting robot reads −k on the z axis
        let calibrated = -calibration.k_z * (-GRAVITY_MMSS / calibration.k_z);
        assert_relative_eq!(calibrated, GRAVITY_MMSS);
    }
}
