use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, prelude::*};
use mimir::LoopbackBus;
use sleipnir::{
    config::ConfigPlugin,
    motion::MotionPlugin,
    nao::{Device, NaoPlugin},
    schedule::RobotSchedulePlugin,
    sensor::SensorPlugin,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    miette::set_panic_hook();

    // the loopback bus stands in for the device layer; a robot build swaps
    // in its own backend here
    App::new()
        .add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_millis(20)))
        .add_plugins(RobotSchedulePlugin)
        .add_plugins(ConfigPlugin::default())
        .insert_resource(Device(Box::new(LoopbackBus::new())))
        .add_plugins((SensorPlugin, MotionPlugin, NaoPlugin))
        .run();
}
