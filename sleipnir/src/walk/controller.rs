//! The 1-D ZMP preview controller and its observer variant.
//!
//! Each instance models a single axis of the cart-table dynamics; the step
//! generator runs one for x and one for y. The state vector is
//! `(position, velocity, zmp)` in the inertial frame, in mm.
//!
//! The transition matrix, input and output vectors, the integral and state
//! gains, and the preview weight table are pre-computed offline for 20 ms
//! frames and the 260 mm pendulum height (Riccati iteration over the
//! preview-control design; see the tooling notes in DESIGN.md). They are
//! opaque constants here; the core never re-solves the design at runtime.

use std::collections::VecDeque;

use nalgebra::{Matrix3, RowVector3, Vector3};

/// Number of future reference samples the controller previews (1.2 s).
pub const NUM_PREVIEW_FRAMES: usize = 60;

/// Gravity, mm/s².
pub const GRAVITY_MMSS: f32 = 9806.65;

/// COM height of the cart-table model the constants were designed for, mm.
pub const PENDULUM_HEIGHT_MM: f32 = 260.0;

/// A 1-D walk controller: reference preview in, COM position out.
pub trait WalkController {
    /// Advances one motion frame. `preview` holds the next
    /// [`NUM_PREVIEW_FRAMES`] reference samples (the current one, `cur_ref`,
    /// already popped), `sensor_zmp` is the measured ZMP estimate for this
    /// frame. Returns the new COM position.
    fn tick(&mut self, preview: &VecDeque<f32>, cur_ref: f32, sensor_zmp: f32) -> f32;

    /// The current COM position, mm.
    fn position(&self) -> f32;

    /// The ZMP the controller believes it is producing, mm.
    fn zmp(&self) -> f32;

    /// Resets the state vector.
    fn init_state(&mut self, position: f32, velocity: f32, zmp: f32);

    /// Scales the sensed-ZMP correction, if the controller has one.
    fn set_observer_scale(&mut self, _scale: f32) {}
}

#[rustfmt::skip]
const A_C: [f32; 9] = [
    1.007_543_6e0,  2.0e-2,  -7.543_576_9e-3,
    7.543_576_9e-1, 1.0e0,   -7.543_576_9e-1,
    7.543_576_9e-3, 2.0e-2,   9.924_564_2e-1,
];

const B_C: [f32; 3] = [1.333_333_3e-6, 2.0e-4, -5.289_191_0e-4];

const C_C: [f32; 3] = [0.0, 0.0, 1.0];

/// Integral gain on the accumulated tracking error.
const K_E: f32 = 5.266_866_1e2;

/// State feedback gains.
const K_X: [f32; 3] = [1.170_707_0e4, 1.869_640_9e3, -2.043_639_5e3];

/// Preview gains over the next 60 reference samples.
#[rustfmt::skip]
const WEIGHTS: [f32; NUM_PREVIEW_FRAMES] = [
    -5.266_866_1e2, -6.734_081_2e2, -7.897_570_9e2,
    -8.266_810_4e2, -7.955_233_2e2, -7.250_423_3e2,
    -6.407_261_1e2, -5.585_313_7e2, -4.857_074_9e2,
    -4.238_687_6e2, -3.718_911_5e2, -3.278_298_5e2,
    -2.898_816_8e2, -2.567_026_1e2, -2.273_940_3e2,
    -2.013_736_9e2, -1.782_446_0e2, -1.577_029_2e2,
    -1.394_871_4e2, -1.233_567_8e2, -1.090_869_6e2,
    -9.646_940_5e1, -8.531_450_4e1, -7.545_221_2e1,
    -6.673_164_7e1, -5.901_967_4e1, -5.219_903_9e1,
    -4.616_644_2e1, -4.083_076_0e1, -3.611_150_9e1,
    -3.193_753_2e1, -2.824_587_9e1, -2.498_085_5e1,
    -2.209_317_7e1, -1.953_924_8e1, -1.728_050_1e1,
    -1.528_282_3e1, -1.351_604_3e1, -1.195_347_7e1,
    -1.057_152_5e1, -9.349_311_8e0, -8.268_378_0e0,
    -7.312_395_2e0, -6.466_922_5e0, -5.719_187_4e0,
    -5.057_893_3e0, -4.473_049_2e0, -3.955_818_5e0,
    -3.498_385_8e0, -3.093_839_1e0, -2.736_065_0e0,
    -2.419_656_8e0, -2.139_832_6e0, -1.892_363_2e0,
    -1.673_508_2e0, -1.479_959_7e0, -1.308_791_9e0,
    -1.157_417_2e0, -1.023_547_4e0, -9.051_585_9e-1,
];

/// Luenberger correction gains used by [`Observer`], scaled by the gait's
/// observer scale before application.
const L: [f32; 3] = [0.01, 0.1, 0.4];

/// The preview controller after Kajita and Czarnetzki.
#[derive(Debug, Clone)]
pub struct PreviewController {
    state: Vector3<f32>,
    error_sum: f32,
    a: Matrix3<f32>,
    b: Vector3<f32>,
    c: RowVector3<f32>,
}

impl Default for PreviewController {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Vector3::zeros(),
            error_sum: 0.0,
            a: Matrix3::from_row_slice(&A_C),
            b: Vector3::from_column_slice(&B_C),
            c: RowVector3::from_row_slice(&C_C),
        }
    }

    fn control(&mut self, preview: &VecDeque<f32>, cur_ref: f32) -> f32 {
        self.error_sum += (self.c * self.state).x - cur_ref;

        let mut u = -K_E * self.error_sum
            - K_X[0] * self.state.x
            - K_X[1] * self.state.y
            - K_X[2] * self.state.z;

        for (weight, reference) in WEIGHTS.iter().zip(preview.iter()) {
            u -= weight * reference;
        }

        u
    }

    fn advance(&mut self, u: f32) -> f32 {
        self.state = self.a * self.state + self.b * u;
        self.state.x
    }
}

impl WalkController for PreviewController {
    fn tick(&mut self, preview: &VecDeque<f32>, cur_ref: f32, _sensor_zmp: f32) -> f32 {
        let u = self.control(preview, cur_ref);
        self.advance(u)
    }

    fn position(&self) -> f32 {
        self.state.x
    }

    fn zmp(&self) -> f32 {
        self.state.z
    }

    fn init_state(&mut self, position: f32, velocity: f32, zmp: f32) {
        self.state = Vector3::new(position, velocity, zmp);
        self.error_sum = 0.0;
    }
}

/// A [`PreviewController`] with a Luenberger correction from the sensed ZMP.
///
/// The correction is scaled by the gait's observer scale; at the default
/// scale of zero the observer behaves exactly like the plain preview
/// controller.
#[derive(Debug, Clone, Default)]
pub struct Observer {
    inner: PreviewController,
    gain_scale: f32,
}

impl Observer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalkController for Observer {
    fn tick(&mut self, preview: &VecDeque<f32>, cur_ref: f32, sensor_zmp: f32) -> f32 {
        let u = self.inner.control(preview, cur_ref);
        let position = self.inner.advance(u);

        if self.gain_scale != 0.0 {
            let innovation = sensor_zmp - (self.inner.c * self.inner.state).x;
            let correction = Vector3::new(L[0], L[1], L[2]) * (self.gain_scale * innovation);
            self.inner.state += correction;
            return self.inner.state.x;
        }

        position
    }

    fn position(&self) -> f32 {
        self.inner.position()
    }

    fn zmp(&self) -> f32 {
        self.inner.zmp()
    }

    fn init_state(&mut self, position: f32, velocity: f32, zmp: f32) {
        self.inner.init_state(position, velocity, zmp);
    }

    fn set_observer_scale(&mut self, scale: f32) {
        self.gain_scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn constant_preview(value: f32) -> VecDeque<f32> {
        std::iter::repeat_n(value, NUM_PREVIEW_FRAMES).collect()
    }

    #[test]
    fn holds_a_constant_reference() {
        let mut controller = PreviewController::new();
        controller.init_state(10.0, 0.0, 10.0);

        let preview = constant_preview(10.0);
        for _ in 0..100 {
            controller.tick(&preview, 10.0, 10.0);
        }

        assert_abs_diff_eq!(controller.position(), 10.0, epsilon = 0.1);
        assert_abs_diff_eq!(controller.zmp(), 10.0, epsilon = 0.1);
    }

    #[test]
    fn tracks_a_reference_jump() {
        let mut controller = PreviewController::new();

        // reference steps from 0 to 30 mm after 20 frames
        let refs: Vec<f32> = (0..300)
            .map(|i| if i < 20 { 0.0 } else { 30.0 })
            .collect();

        let mut preview: VecDeque<f32> = refs[1..=NUM_PREVIEW_FRAMES].iter().copied().collect();
        for k in 0..200 {
            controller.tick(&preview, refs[k], refs[k]);
            preview.pop_front();
            preview.push_back(refs[k + NUM_PREVIEW_FRAMES + 1]);
        }

        assert_abs_diff_eq!(controller.position(), 30.0, epsilon = 0.5);
        assert_abs_diff_eq!(controller.zmp(), 30.0, epsilon = 0.5);
    }

    #[test]
    fn is_deterministic() {
        let run = || {
            let mut controller = PreviewController::new();
            let preview = constant_preview(5.0);
            (0..50)
                .map(|_| controller.tick(&preview, 5.0, 5.0))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn observer_with_zero_scale_matches_preview_controller() {
        let mut observer = Observer::new();
        let mut preview_controller = PreviewController::new();

        let preview = constant_preview(8.0);
        for _ in 0..50 {
            let a = observer.tick(&preview, 8.0, -100.0);
            let b = preview_controller.tick(&preview, 8.0, 8.0);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn init_state_resets_the_output() {
        let mut controller = PreviewController::new();
        let preview = constant_preview(50.0);
        for _ in 0..30 {
            controller.tick(&preview, 50.0, 50.0);
        }

        controller.init_state(0.0, 0.0, 0.0);
        assert_eq!(controller.position(), 0.0);
        assert_eq!(controller.zmp(), 0.0);
    }
}
