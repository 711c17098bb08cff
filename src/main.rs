use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use spahash_core::SimConfig;
use spahash_sim::{ParticleWorld, SimulationPlugin};

/// Frames to run before exiting when none are given on the command line
const DEFAULT_FRAMES: u32 = 600;

/// Number of frames the headless app runs for
#[derive(Resource)]
struct FrameLimit(u32);

fn main() {
    let frames = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u32>() {
            Ok(n) => n,
            Err(e) => {
                eprintln!("Invalid frame count '{arg}': {e}");
                std::process::exit(2);
            }
        },
        None => DEFAULT_FRAMES,
    };

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));

    // Built after LogPlugin so world construction is logged
    let world = match ParticleWorld::new(SimConfig::default()) {
        Ok(world) => world,
        Err(e) => {
            error!("Failed to build world: {e}");
            std::process::exit(1);
        }
    };

    app.insert_resource(world)
        .insert_resource(FrameLimit(frames))
        .add_plugins(SimulationPlugin)
        .add_systems(Last, exit_after_frames)
        .run();
}

fn exit_after_frames(
    mut frames: Local<u32>,
    limit: Res<FrameLimit>,
    world: Res<ParticleWorld>,
    mut exit: EventWriter<AppExit>,
) {
    *frames += 1;
    if *frames < limit.0 {
        return;
    }

    let stats = world.stats();
    info!(
        "Finished {} frames: energy {:.4}, max speed {:.4}, outside {}",
        stats.tick, stats.kinetic_energy, stats.max_speed, stats.outside
    );
    exit.send(AppExit::Success);
}
