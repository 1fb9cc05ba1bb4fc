use bevy::prelude::*;
use mimir::types::FootFsr;

use crate::schedule::Sensor;

use super::{CalibrationConfig, RawRobotState};

/// Plugin offering the foot pressure sensor data, derived from the raw
/// device state.
pub struct FsrSensorPlugin;

impl Plugin for FsrSensorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FsrValues>();
        app.add_systems(Sensor, update_force_sensitive_resistors);
    }
}

/// The force sensitive resistor readings of both feet.
#[derive(Resource, Debug, Default, Clone)]
pub struct FsrValues {
    pub left_foot: FootFsr,
    pub right_foot: FootFsr,
    /// Whether the feet carry enough load for the robot to be on the ground.
    pub ground_contact: bool,
}

fn update_force_sensitive_resistors(
    raw: Res<RawRobotState>,
    config: Res<CalibrationConfig>,
    mut fsr: ResMut<FsrValues>,
) {
    fsr.left_foot = raw.force_sensitive_resistors.left_foot;
    fsr.right_foot = raw.force_sensitive_resistors.right_foot;
    fsr.ground_contact =
        raw.force_sensitive_resistors.avg() > config.fsr.ground_contact_threshold;
}

#[cfg(test)]
mod tests {
    use mimir::types::ForceSensitiveResistors;

    use super::*;

    #[test]
    fn ground_contact_follows_the_threshold() {
        let config = CalibrationConfig::default();

        let loaded = ForceSensitiveResistors {
            left_foot: FootFsr {
                front_left: 0.5,
                front_right: 0.5,
                rear_left: 0.5,
                rear_right: 0.5,
            },
            right_foot: FootFsr {
                front_left: 0.5,
                front_right: 0.5,
                rear_left: 0.5,
                rear_right: 0.5,
            },
        };

        assert!(loaded.avg() > config.fsr.ground_contact_threshold);
        assert!(ForceSensitiveResistors::default().avg() < config.fsr.ground_contact_threshold);
    }
}
