use bevy::{app::MainScheduleOrder, ecs::schedule::ScheduleLabel, prelude::*};

/// The schedule that contains logic that updates resources using sensor data.
///
/// This schedule runs directly after the [`First`] schedule, and is used to update resources
/// that depend on sensor data.
#[derive(ScheduleLabel, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sensor;

/// The schedule that runs before [`Write`].
///
/// This is used to finalize the joint targets for the current frame before
/// they are clipped and written to the device bus.
#[derive(ScheduleLabel, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreWrite;

/// The schedule that runs logic required to read and write data to the device bus.
///
/// This stage is used for systems that interact with the actuator bus, or depend on the
/// write order.
#[derive(ScheduleLabel, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Write;

/// This stage runs after the data has been written to the device bus, and is used for
/// systems that depend on the most up-to-date data.
#[derive(ScheduleLabel, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PostWrite;

/// Plugin that configures the robot specific schedules in the [`MainScheduleOrder`].
pub struct RobotSchedulePlugin;

impl Plugin for RobotSchedulePlugin {
    fn build(&self, app: &mut App) {
        // Add the custom schedules to the main schedule.
        app.world_mut()
            .resource_scope(|_, mut schedule: Mut<MainScheduleOrder>| {
                schedule.insert_after(First, Sensor);
                schedule.insert_after(PostUpdate, PreWrite);
                schedule.insert_after(PreWrite, Write);
                schedule.insert_after(Write, PostWrite);
            });
    }
}
