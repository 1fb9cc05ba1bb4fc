use super::{ArmJoints, FillExt, HeadJoints, LegJoints};

/// Wrapper struct containing joint values for everything below the neck.
///
/// This is the unit the motion switchboard's body providers produce each
/// frame; together with a [`HeadJoints`] it composes a full [`JointArray`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyJoints<T> {
    pub arms: ArmJoints<T>,
    pub legs: LegJoints<T>,
}

impl<T> BodyJoints<T> {
    /// Transforms each element using the provided closure `f`.
    pub fn map<F, U>(self, mut f: F) -> BodyJoints<U>
    where
        F: FnMut(T) -> U,
    {
        BodyJoints {
            arms: self.arms.map(&mut f),
            legs: self.legs.map(&mut f),
        }
    }

    /// Zips two containers element-wise into a container of pairs.
    pub fn zip<U>(self, other: BodyJoints<U>) -> BodyJoints<(T, U)> {
        BodyJoints {
            arms: self.arms.zip(other.arms),
            legs: self.legs.zip(other.legs),
        }
    }

    /// Returns an iterator over references to the elements, arms first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.arms.iter().chain(self.legs.iter())
    }
}

impl<T: Clone> FillExt<T> for BodyJoints<T> {
    fn fill(value: T) -> Self {
        BodyJoints {
            arms: ArmJoints::fill(value.clone()),
            legs: LegJoints::fill(value),
        }
    }
}

impl<T: std::ops::Add<Output = T>> std::ops::Add for BodyJoints<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            arms: self.arms + rhs.arms,
            legs: self.legs + rhs.legs,
        }
    }
}

impl<T: std::ops::Sub<Output = T>> std::ops::Sub for BodyJoints<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            arms: self.arms - rhs.arms,
            legs: self.legs - rhs.legs,
        }
    }
}

impl<T: std::ops::Mul<Output = T> + Clone> std::ops::Mul<T> for BodyJoints<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self {
            arms: self.arms * rhs.clone(),
            legs: self.legs * rhs,
        }
    }
}

/// Wrapper struct containing values for all 22 joints of the robot.
///
/// Iteration order is fixed: head (2), left arm (4), right arm (4),
/// left leg (6), right leg (6) — the order in which the actuator aliases
/// are declared.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointArray<T> {
    pub head: HeadJoints<T>,
    pub body: BodyJoints<T>,
}

/// Number of joints in a [`JointArray`].
pub const JOINT_COUNT: usize = 22;

impl<T> JointArray<T> {
    /// Composes a full joint vector from a head and a body part.
    pub fn from_parts(head: HeadJoints<T>, body: BodyJoints<T>) -> Self {
        JointArray { head, body }
    }

    /// Transforms each element using the provided closure `f`.
    pub fn map<F, U>(self, mut f: F) -> JointArray<U>
    where
        F: FnMut(T) -> U,
    {
        JointArray {
            head: self.head.map(&mut f),
            body: self.body.map(&mut f),
        }
    }

    /// Zips two containers element-wise into a container of pairs.
    pub fn zip<U>(self, other: JointArray<U>) -> JointArray<(T, U)> {
        JointArray {
            head: self.head.zip(other.head),
            body: self.body.zip(other.body),
        }
    }

    /// Returns an iterator over references to all 22 joints.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.head.iter().chain(self.body.iter())
    }
}

impl<T: Clone> FillExt<T> for JointArray<T> {
    fn fill(value: T) -> Self {
        JointArray {
            head: HeadJoints::fill(value.clone()),
            body: BodyJoints::fill(value),
        }
    }
}
