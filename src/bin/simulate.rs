//! Headless batch run over several seeds.
//! Reports boundary and overlap statistics per seed, checks that serial and parallel
//! pairwise dispatch keep the same invariants, and optionally saves the last world.
//!
//! Usage: simulate [snapshot-path]

use spahash_core::{Dispatch, SimConfig};
use spahash_physics::diagnostics::count_outside;
use spahash_sim::{ParticleWorld, WorldStats};
use spahash_storage::{load_snapshot, save_snapshot, WorldSnapshot};
use std::path::PathBuf;
use std::time::Instant;

const NUM_SEEDS: u64 = 5;
const TICKS_PER_RUN: u64 = 120;

/// Outcome of one seeded run
struct RunReport {
    seed: u64,
    dispatch: Dispatch,
    initial_energy: f64,
    final_stats: WorldStats,
    overlaps: usize,
    /// Particles more than one contact distance outside the world sphere
    escaped: usize,
    total_contacts: usize,
    millis: u128,
}

impl RunReport {
    fn energy_ratio(&self) -> f64 {
        if self.initial_energy > 0.0 {
            self.final_stats.kinetic_energy / self.initial_energy
        } else {
            1.0
        }
    }
}

fn run(config: SimConfig) -> Result<(RunReport, ParticleWorld), String> {
    let seed = config.seed;
    let dispatch = config.dispatch;
    let mut world = ParticleWorld::new(config)?;
    let initial_energy = world.stats().kinetic_energy;

    let start = Instant::now();
    let mut total_contacts = 0;
    for _ in 0..TICKS_PER_RUN {
        world.tick().map_err(|e| format!("Tick {} failed: {e}", world.tick_count()))?;
        total_contacts += world.last_tick().contacts;
    }
    let millis = start.elapsed().as_millis();

    let overlaps = world.overlap_count().map_err(|e| format!("Overlap count failed: {e}"))?;
    // Contacts resolved after the last boundary pass may push a particle slightly out
    let escaped = count_outside(world.particles(), world.config().world_radius, world.config().search_radius());
    let report = RunReport {
        seed,
        dispatch,
        initial_energy,
        final_stats: world.stats(),
        overlaps,
        escaped,
        total_contacts,
        millis,
    };
    Ok((report, world))
}

fn print_report(r: &RunReport) {
    let s = &r.final_stats;
    println!(
        "  seed {:>5} {:<8} {:>6} ms  energy x{:.3}  max speed {:.3}  contacts {:>8}  overlaps {:>5}  outside {:>4}{}",
        r.seed,
        format!("{:?}", r.dispatch),
        r.millis,
        r.energy_ratio(),
        s.max_speed,
        r.total_contacts,
        r.overlaps,
        s.outside,
        if s.all_finite { "" } else { "  NON-FINITE" }
    );
}

fn main() {
    let snapshot_path = std::env::args().nth(1).map(PathBuf::from);

    eprintln!(
        "Simulating {} seeds x {} ticks ({} particles)...",
        NUM_SEEDS,
        TICKS_PER_RUN,
        SimConfig::default().particle_count
    );

    let mut reports = Vec::new();
    let mut last_world = None;
    for k in 0..NUM_SEEDS {
        let seed = 42 + k * 7919;
        for dispatch in [Dispatch::Serial, Dispatch::Parallel] {
            let config = SimConfig { seed, dispatch, ..SimConfig::default() };
            match run(config) {
                Ok((report, world)) => {
                    reports.push(report);
                    last_world = Some(world);
                }
                Err(e) => {
                    eprintln!("Seed {seed} ({dispatch:?}) failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        eprint!("  {}/{}...\r", k + 1, NUM_SEEDS);
    }
    eprintln!("Done.");

    println!("Results:");
    for r in &reports {
        print_report(r);
    }

    let mut problems = 0;
    for r in &reports {
        if !r.final_stats.all_finite {
            problems += 1;
        }
        if r.escaped > 0 {
            eprintln!("  seed {} ({:?}): {} particles escaped the world sphere", r.seed, r.dispatch, r.escaped);
            problems += 1;
        }
        if r.energy_ratio() > 1.0 + 1e-3 {
            eprintln!("  seed {} ({:?}) gained energy: x{:.4}", r.seed, r.dispatch, r.energy_ratio());
            problems += 1;
        }
    }
    println!("Invariant violations: {problems}");

    if let (Some(path), Some(world)) = (snapshot_path, last_world) {
        let snapshot = WorldSnapshot::new(world.config().clone(), world.tick_count(), world.particles().to_vec());
        if let Err(e) = save_snapshot(&snapshot, &path) {
            eprintln!("{e}");
            std::process::exit(1);
        }
        match load_snapshot(&path) {
            Ok(loaded) if loaded.particles == snapshot.particles => {
                println!("Saved snapshot {} (tick {}) to {}", loaded.id, loaded.tick, path.display());
            }
            Ok(_) => {
                eprintln!("Snapshot at {} did not read back identically", path.display());
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}
