use std::time::{Duration, Instant};

use bevy::prelude::*;

/// A resource that keeps track of the number of motion frames since startup.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle(pub usize);

/// A resource that keeps track of the time one full cycle takes.
///
/// This should always be around 20 ms; a slow system or a stalled device bus
/// shows up as a higher cycle time.
#[derive(Resource, Debug)]
pub struct CycleTime {
    pub cycle_start: Instant,
    pub duration: Duration,
}

impl Default for CycleTime {
    fn default() -> Self {
        Self {
            cycle_start: Instant::now(),
            duration: Duration::ZERO,
        }
    }
}

pub(super) fn update_cycle_stats(mut cycle: ResMut<Cycle>, mut cycle_time: ResMut<CycleTime>) {
    cycle.0 += 1;
    cycle_time.duration = Instant::now().duration_since(cycle_time.cycle_start);
    cycle_time.cycle_start = Instant::now();
}
