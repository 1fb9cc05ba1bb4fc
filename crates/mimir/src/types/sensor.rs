use nalgebra::{Vector2, Vector3};

use super::JointArray;

/// The four force-sensitive resistors under one foot sole.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootFsr {
    pub front_left: f32,
    pub front_right: f32,
    pub rear_left: f32,
    pub rear_right: f32,
}

impl FootFsr {
    /// Total load on this foot.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.front_left + self.front_right + self.rear_left + self.rear_right
    }
}

/// Force-sensitive resistor readings for both feet.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForceSensitiveResistors {
    pub left_foot: FootFsr,
    pub right_foot: FootFsr,
}

impl ForceSensitiveResistors {
    /// Average load over all eight sensors.
    #[must_use]
    pub fn avg(&self) -> f32 {
        (self.left_foot.sum() + self.right_foot.sum()) / 8.0
    }
}

/// Raw inertial measurement unit values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InertialMeasurement {
    /// Rotational speed around the x, y and z axes in rad/s.
    pub gyroscope: Vector3<f32>,
    /// Raw acceleration along the x, y and z axes, in device units.
    /// The transcriber applies the per-unit calibration map.
    pub accelerometer: Vector3<f32>,
    /// Filtered body inclination around the x and y axes in rad.
    pub angles: Vector2<f32>,
}

/// Echo measurements of the ultrasound sensors, in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SonarValues {
    pub left: f32,
    pub right: f32,
}

/// One bulk sensor fetch: everything the core reads once per motion frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RobotState {
    /// Measured joint angles in rad.
    pub position: JointArray<f32>,
    /// Joint temperatures in °C.
    pub temperature: JointArray<f32>,
    pub inertial: InertialMeasurement,
    pub force_sensitive_resistors: ForceSensitiveResistors,
    pub sonar: SonarValues,
}
