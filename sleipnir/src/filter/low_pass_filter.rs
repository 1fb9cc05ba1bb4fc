use std::ops::{Add, Mul};

/// Exponential smoothing over a stream of measurements.
///
/// `alpha` is the weight of the newest measurement: `state` moves a fixed
/// fraction of the remaining distance toward each new value, so an `alpha`
/// of 1 passes measurements straight through and smaller values trade
/// responsiveness for noise rejection. The state can be anything that
/// blends linearly, so scalar channels and whole vectors filter the same
/// way.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowPassFilter<T> {
    pub state: T,
    alpha: f32,
}

impl<T> LowPassFilter<T>
where
    T: Clone + Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    pub fn new(initial: T, alpha: f32) -> Self {
        LowPassFilter {
            state: initial,
            alpha,
        }
    }

    /// Blends `value` into the filtered state.
    pub fn update(&mut self, value: T) {
        self.state = self.state * (1.0 - self.alpha) + value * self.alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::LowPassFilter;

    #[test]
    fn approaches_a_constant_input_geometrically() {
        // alpha of 1/4 closes a quarter of the gap per update; the chosen
        // values keep every intermediate state exact in binary
        let mut filter = LowPassFilter::new(0.0f32, 0.25);

        filter.update(4.0);
        assert_eq!(filter.state, 1.0);
        filter.update(4.0);
        assert_eq!(filter.state, 1.75);
        filter.update(4.0);
        assert_eq!(filter.state, 2.3125);
    }

    #[test]
    fn follows_sign_changes_without_overshoot() {
        let mut filter = LowPassFilter::new(2.0f32, 0.5);

        filter.update(-2.0);
        assert_eq!(filter.state, 0.0);
        filter.update(-2.0);
        assert_eq!(filter.state, -1.0);
    }

    #[test]
    fn alpha_of_one_tracks_the_input_exactly() {
        let mut filter = LowPassFilter::new(0.0f32, 1.0);
        filter.update(3.5);
        assert_eq!(filter.state, 3.5);
    }

    #[test]
    fn vector_state() {
        use nalgebra::Vector3;

        let mut filter = LowPassFilter::new(Vector3::zeros(), 0.5);
        filter.update(Vector3::new(2.0, 0.0, -4.0));
        assert_eq!(filter.state, Vector3::new(1.0, 0.0, -2.0));
    }
}
