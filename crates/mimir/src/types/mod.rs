//! Joint and sensor containers shared by the whole stack.
//!
//! The joint containers are generic over their element type so the same
//! shapes carry angles, stiffnesses, temperatures and clipping limits.

mod arm_joints;
mod head_joints;
mod joint_array;
mod leg_joints;
mod sensor;

pub use arm_joints::{ArmJoints, SingleArmJoints};
pub use head_joints::HeadJoints;
pub use joint_array::{BodyJoints, JOINT_COUNT, JointArray};
pub use leg_joints::{LegJoints, SingleLegJoints};
pub use sensor::{FootFsr, ForceSensitiveResistors, InertialMeasurement, RobotState, SonarValues};

/// Trait for filling a container with copies of one value.
pub trait FillExt<T> {
    /// Create a new instance with all elements set to `value`.
    fn fill(value: T) -> Self;
}

/// Implements the container API for a struct whose fields are all of the
/// element type `T`: `map`, `zip`, `iter`, [`FillExt`] and element-wise
/// arithmetic.
macro_rules! joints {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name<T> {
            $(pub $field: T,)+
        }

        impl<T> $name<T> {
            /// Transforms each element using the provided closure `f`,
            /// producing a new container with the transformed values.
            pub fn map<F, U>(self, mut f: F) -> $name<U>
            where
                F: FnMut(T) -> U,
            {
                $name { $($field: f(self.$field),)+ }
            }

            /// Zips two containers element-wise into a container of pairs.
            pub fn zip<U>(self, other: $name<U>) -> $name<(T, U)> {
                $name { $($field: (self.$field, other.$field),)+ }
            }

            /// Returns an iterator over references to the elements.
            pub fn iter(&self) -> impl Iterator<Item = &T> {
                [$(&self.$field,)+].into_iter()
            }
        }

        impl<T: Clone> $crate::types::FillExt<T> for $name<T> {
            fn fill(value: T) -> Self {
                $name { $($field: value.clone(),)+ }
            }
        }

        impl<T: ::std::ops::Add<Output = T>> ::std::ops::Add for $name<T> {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field,)+ }
            }
        }

        impl<T: ::std::ops::Sub<Output = T>> ::std::ops::Sub for $name<T> {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field,)+ }
            }
        }

        impl<T: ::std::ops::Mul<Output = T> + Clone> ::std::ops::Mul<T> for $name<T> {
            type Output = Self;

            fn mul(self, rhs: T) -> Self {
                Self { $($field: self.$field * rhs.clone(),)+ }
            }
        }
    };
}

pub(crate) use joints;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_map() {
        let joints = HeadJoints::fill(1.0f32);
        let doubled = joints.map(|x| x * 2.0);
        assert_eq!(doubled, HeadJoints { yaw: 2.0, pitch: 2.0 });
    }

    #[test]
    fn zip_pairs_elements() {
        let a = SingleLegJoints::fill(1u32);
        let b = SingleLegJoints::fill(2u32);
        assert_eq!(a.zip(b), SingleLegJoints::fill((1u32, 2u32)));
    }

    #[test]
    fn joint_array_iterates_all_joints() {
        let array = JointArray::fill(0.0f32);
        assert_eq!(array.iter().count(), 22);
    }

    #[test]
    fn arithmetic_is_element_wise() {
        let a = SingleArmJoints::fill(3.0f32);
        let b = SingleArmJoints::fill(1.0f32);
        assert_eq!(a.clone() - b, SingleArmJoints::fill(2.0));
        assert_eq!(a * 2.0, SingleArmJoints::fill(6.0));
    }
}
