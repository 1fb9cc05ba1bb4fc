//! The ZMP reference queue.

use std::collections::VecDeque;

use super::controller::NUM_PREVIEW_FRAMES;

/// Two parallel sequences of reference samples, one per axis, in the
/// inertial frame.
///
/// While the walk is active the generator keeps at least
/// `NUM_PREVIEW_FRAMES + 1` samples queued; the controller consumes the
/// oldest sample every tick and previews the rest.
#[derive(Debug, Default, Clone)]
pub struct ZmpReference {
    x: VecDeque<f32>,
    y: VecDeque<f32>,
}

impl ZmpReference {
    /// Number of samples the queue must hold before a controller tick.
    pub const MIN_LEN: usize = NUM_PREVIEW_FRAMES + 1;

    /// Appends one sample pair.
    pub fn push(&mut self, x: f32, y: f32) {
        self.x.push_back(x);
        self.y.push_back(y);
    }

    /// Removes and returns the oldest sample pair.
    pub fn pop(&mut self) -> Option<(f32, f32)> {
        match (self.x.pop_front(), self.y.pop_front()) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
    }

    /// The queued x samples, oldest first.
    #[must_use]
    pub fn x(&self) -> &VecDeque<f32> {
        &self.x
    }

    /// The queued y samples, oldest first.
    #[must_use]
    pub fn y(&self) -> &VecDeque<f32> {
        &self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_returns_oldest_first() {
        let mut zmp = ZmpReference::default();
        zmp.push(1.0, -1.0);
        zmp.push(2.0, -2.0);

        assert_eq!(zmp.pop(), Some((1.0, -1.0)));
        assert_eq!(zmp.pop(), Some((2.0, -2.0)));
        assert_eq!(zmp.pop(), None);
    }

    #[test]
    fn axes_stay_parallel() {
        let mut zmp = ZmpReference::default();
        for i in 0..10 {
            zmp.push(i as f32, 0.0);
        }

        assert_eq!(zmp.len(), 10);
        assert_eq!(zmp.x().len(), zmp.y().len());
    }
}
