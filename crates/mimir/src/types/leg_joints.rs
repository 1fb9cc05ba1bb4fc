use super::{FillExt, joints};

joints! {
    /// Wrapper struct containing the joints of a single leg of the robot.
    ///
    /// Both legs carry the same six joints; the yaw joint of each hip is
    /// independently actuated.
    SingleLegJoints { hip_yaw_pitch, hip_roll, hip_pitch, knee_pitch, ankle_pitch, ankle_roll }
}

/// Wrapper struct containing joint values for both legs of the robot.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegJoints<T> {
    pub left_leg: SingleLegJoints<T>,
    pub right_leg: SingleLegJoints<T>,
}

impl<T> LegJoints<T> {
    /// Transforms each element using the provided closure `f`.
    pub fn map<F, U>(self, mut f: F) -> LegJoints<U>
    where
        F: FnMut(T) -> U,
    {
        LegJoints {
            left_leg: self.left_leg.map(&mut f),
            right_leg: self.right_leg.map(&mut f),
        }
    }

    /// Zips two containers element-wise into a container of pairs.
    pub fn zip<U>(self, other: LegJoints<U>) -> LegJoints<(T, U)> {
        LegJoints {
            left_leg: self.left_leg.zip(other.left_leg),
            right_leg: self.right_leg.zip(other.right_leg),
        }
    }

    /// Returns an iterator over references to the elements, left leg first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.left_leg.iter().chain(self.right_leg.iter())
    }
}

impl<T: Clone> FillExt<T> for LegJoints<T> {
    fn fill(value: T) -> Self {
        LegJoints {
            left_leg: SingleLegJoints::fill(value.clone()),
            right_leg: SingleLegJoints::fill(value),
        }
    }
}

impl<T: std::ops::Add<Output = T>> std::ops::Add for LegJoints<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            left_leg: self.left_leg + rhs.left_leg,
            right_leg: self.right_leg + rhs.right_leg,
        }
    }
}

impl<T: std::ops::Sub<Output = T>> std::ops::Sub for LegJoints<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            left_leg: self.left_leg - rhs.left_leg,
            right_leg: self.right_leg - rhs.right_leg,
        }
    }
}

impl<T: std::ops::Mul<Output = T> + Clone> std::ops::Mul<T> for LegJoints<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self {
            left_leg: self.left_leg * rhs.clone(),
            right_leg: self.right_leg * rhs,
        }
    }
}
