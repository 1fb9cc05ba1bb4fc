//! Progress curves for the swing phase.
//!
//! The walking legs run on a normalized phase time `t ∈ [0, 1]`. Two shapes
//! are needed: an ease for the travel from the swing source to the swing
//! destination, flat at both ends so the foot leaves and lands without a
//! velocity jump, and an arc for the lift, which starts and ends on the
//! ground with its peak at mid-swing. The scripted providers reuse the
//! ease for their joint interpolation.

use std::f32::consts::TAU;

/// Ease-in/ease-out progress: two quadratic arcs joined at the midpoint.
///
/// Zero slope at both ends, half the distance covered at `t = 0.5`.
///
/// # Examples
/// ```no_run
/// use sleipnir::walk::smoothing::ease_in_out;
///
/// assert_eq!(ease_in_out(0.25), 0.125);
/// assert_eq!(ease_in_out(0.75), 0.875);
/// ```
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - 2.0 * (1.0 - t) * (1.0 - t)
    }
}

/// Lift arc: a raised-cosine bump, zero at both ends of the swing and 1 at
/// mid-swing.
///
/// # Examples
/// ```no_run
/// use sleipnir::walk::smoothing::lift_arc;
///
/// assert_eq!(lift_arc(0.0), 0.0);
/// assert_eq!(lift_arc(0.5), 1.0);
/// ```
pub fn lift_arc(t: f32) -> f32 {
    (1.0 - (TAU * t).cos()) / 2.0
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn ease_is_symmetric_about_the_midpoint() {
        for t in [0.1, 0.3, 0.45] {
            assert_abs_diff_eq!(ease_in_out(t) + ease_in_out(1.0 - t), 1.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(ease_in_out(0.5), 0.5);
    }

    #[test]
    fn ease_covers_the_whole_interval() {
        assert_abs_diff_eq!(ease_in_out(0.0), 0.0);
        assert_abs_diff_eq!(ease_in_out(1.0), 1.0);

        // monotone: the foot never moves backwards along its path
        let mut previous = 0.0;
        for i in 1..=20 {
            let value = ease_in_out(i as f32 / 20.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn lift_touches_down_at_both_ends() {
        assert_abs_diff_eq!(lift_arc(0.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(lift_arc(1.0), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(lift_arc(0.5), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn lift_is_symmetric() {
        for t in [0.1, 0.2, 0.4] {
            assert_abs_diff_eq!(lift_arc(t), lift_arc(1.0 - t), epsilon = 1e-5);
        }
    }
}
