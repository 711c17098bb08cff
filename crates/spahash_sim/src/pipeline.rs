use bevy::prelude::*;

use super::world::ParticleWorld;

/// Ticks between stats log lines
const STATS_LOG_INTERVAL: u64 = 60;

/// Bevy plugin for the simulation pipeline
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (simulation_tick, log_stats).chain());
    }
}

/// One fixed-length tick per frame; the world's own frame_dt drives the physics
fn simulation_tick(mut world: ResMut<ParticleWorld>) {
    if let Err(e) = world.tick() {
        warn!("Simulation paused at tick {}: {e}", world.tick_count());
        world.paused = true;
    }
}

fn log_stats(world: Res<ParticleWorld>) {
    if world.paused || !world.is_changed() {
        return;
    }
    let tick = world.tick_count();
    if tick == 0 || tick % STATS_LOG_INTERVAL != 0 {
        return;
    }

    let stats = world.stats();
    info!(
        "Tick {}: energy {:.4}, max speed {:.4}, contacts {}, boundary hits {}, outside {}",
        stats.tick,
        stats.kinetic_energy,
        stats.max_speed,
        stats.last_tick.contacts,
        stats.last_tick.boundary_hits,
        stats.outside
    );
    if !stats.all_finite {
        warn!("Non-finite particle state at tick {}", stats.tick);
    }
}
