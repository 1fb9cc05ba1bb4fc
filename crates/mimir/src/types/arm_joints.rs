use super::{FillExt, joints};

joints! {
    /// Wrapper struct containing the joints of a single arm of the robot.
    SingleArmJoints { shoulder_pitch, shoulder_roll, elbow_yaw, elbow_roll }
}

/// Wrapper struct containing joint values for both arms of the robot.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmJoints<T> {
    pub left_arm: SingleArmJoints<T>,
    pub right_arm: SingleArmJoints<T>,
}

impl<T> ArmJoints<T> {
    /// Transforms each element using the provided closure `f`.
    pub fn map<F, U>(self, mut f: F) -> ArmJoints<U>
    where
        F: FnMut(T) -> U,
    {
        ArmJoints {
            left_arm: self.left_arm.map(&mut f),
            right_arm: self.right_arm.map(&mut f),
        }
    }

    /// Zips two containers element-wise into a container of pairs.
    pub fn zip<U>(self, other: ArmJoints<U>) -> ArmJoints<(T, U)> {
        ArmJoints {
            left_arm: self.left_arm.zip(other.left_arm),
            right_arm: self.right_arm.zip(other.right_arm),
        }
    }

    /// Returns an iterator over references to the elements, left arm first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.left_arm.iter().chain(self.right_arm.iter())
    }
}

impl<T: Clone> FillExt<T> for ArmJoints<T> {
    fn fill(value: T) -> Self {
        ArmJoints {
            left_arm: SingleArmJoints::fill(value.clone()),
            right_arm: SingleArmJoints::fill(value),
        }
    }
}

impl<T: std::ops::Add<Output = T>> std::ops::Add for ArmJoints<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            left_arm: self.left_arm + rhs.left_arm,
            right_arm: self.right_arm + rhs.right_arm,
        }
    }
}

impl<T: std::ops::Sub<Output = T>> std::ops::Sub for ArmJoints<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            left_arm: self.left_arm - rhs.left_arm,
            right_arm: self.right_arm - rhs.right_arm,
        }
    }
}

impl<T: std::ops::Mul<Output = T> + Clone> std::ops::Mul<T> for ArmJoints<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self {
            left_arm: self.left_arm * rhs.clone(),
            right_arm: self.right_arm * rhs,
        }
    }
}
