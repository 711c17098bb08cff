use bevy::prelude::*;
use spahash_core::{Dispatch, Particle, ParticleStore, SimConfig};
use spahash_physics::diagnostics;
use spahash_physics::particle::generate_seeded;
use spahash_physics::{
    integrate, resolve_boundary, resolve_pairwise, resolve_pairwise_parallel, GridError,
    PairwiseParams, SpatialHashGrid,
};

/// Counters accumulated over the substeps of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Particle-substeps that ended outside the world sphere and were reflected
    pub boundary_hits: usize,
    pub candidates: usize,
    pub contacts: usize,
}

/// Snapshot of world-wide diagnostics
#[derive(Debug, Clone, Copy)]
pub struct WorldStats {
    pub tick: u64,
    pub particle_count: usize,
    pub kinetic_energy: f64,
    pub max_speed: f32,
    /// Particles beyond the world radius (plus a small tolerance)
    pub outside: usize,
    pub all_finite: bool,
    pub last_tick: TickStats,
}

/// The simulated particle population, tracked as a Bevy Resource
#[derive(Resource)]
pub struct ParticleWorld {
    config: SimConfig,
    store: ParticleStore,
    grid: SpatialHashGrid,
    params: PairwiseParams,
    /// Whether simulation is paused
    pub paused: bool,
    tick_count: u64,
    last_tick: TickStats,
}

/// Distance past the world radius still counted as inside
const OUTSIDE_TOLERANCE: f32 = 1e-4;

impl ParticleWorld {
    /// Build a world with seeded initial particles
    pub fn new(config: SimConfig) -> Result<Self, String> {
        config.validate()?;
        let particles = generate_seeded(&config);
        info!(
            "Generated {} particles (seed {}, world radius {})",
            particles.len(),
            config.seed,
            config.world_radius
        );
        Self::from_particles(config, particles)
    }

    /// Build a world around an existing population; `config.particle_count` must match
    pub fn from_particles(config: SimConfig, particles: Vec<Particle>) -> Result<Self, String> {
        config.validate()?;
        if particles.len() != config.particle_count as usize {
            return Err(format!(
                "config expects {} particles, got {}",
                config.particle_count,
                particles.len()
            ));
        }
        let grid = SpatialHashGrid::new(config.cell_spacing(), particles.len())
            .map_err(|e| format!("Grid error: {e}"))?;
        let params = PairwiseParams::from_config(&config);

        Ok(Self {
            config,
            store: ParticleStore::new(particles),
            grid,
            params,
            paused: false,
            tick_count: 0,
            last_tick: TickStats::default(),
        })
    }

    /// Rebuild a world saved at `tick_count`
    pub fn restore(config: SimConfig, particles: Vec<Particle>, tick_count: u64) -> Result<Self, String> {
        let mut world = Self::from_particles(config, particles)?;
        world.tick_count = tick_count;
        Ok(world)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_tick(&self) -> TickStats {
        self.last_tick
    }

    /// One substep: integrate, rebuild the grid, then resolve boundary and pairwise contacts.
    ///
    /// The grid holds the post-integration positions for the whole substep.
    pub fn substep(&mut self, dt: f32) -> Result<TickStats, GridError> {
        let particles = self.store.as_mut_slice();
        integrate(particles, dt);

        let count = particles.len();
        self.grid.rebuild(&*particles, count)?;

        let boundary_hits = resolve_boundary(particles, self.config.world_radius);
        let pairwise = match self.config.dispatch {
            Dispatch::Serial => resolve_pairwise(particles, &self.grid, &self.params),
            Dispatch::Parallel => resolve_pairwise_parallel(particles, &self.grid, &self.params),
        };

        Ok(TickStats {
            boundary_hits,
            candidates: pairwise.candidates,
            contacts: pairwise.contacts,
        })
    }

    /// Advance by one frame of `substeps` substeps. Does nothing while paused.
    pub fn tick(&mut self) -> Result<(), GridError> {
        if self.paused {
            return Ok(());
        }

        let dt = self.config.substep_dt();
        let mut total = TickStats::default();
        for _ in 0..self.config.substeps {
            let step = self.substep(dt)?;
            total.boundary_hits += step.boundary_hits;
            total.candidates += step.candidates;
            total.contacts += step.contacts;
        }

        self.last_tick = total;
        self.tick_count += 1;
        Ok(())
    }

    pub fn stats(&self) -> WorldStats {
        let particles = self.store.as_slice();
        WorldStats {
            tick: self.tick_count,
            particle_count: particles.len(),
            kinetic_energy: diagnostics::kinetic_energy(particles),
            max_speed: diagnostics::max_speed(particles),
            outside: diagnostics::count_outside(particles, self.config.world_radius, OUTSIDE_TOLERANCE),
            all_finite: diagnostics::all_finite(particles),
            last_tick: self.last_tick,
        }
    }

    /// Pairs currently closer than the contact distance, on a grid built from the current positions
    pub fn overlap_count(&self) -> Result<usize, GridError> {
        let particles = self.store.as_slice();
        let mut grid = SpatialHashGrid::new(self.config.cell_spacing(), particles.len())?;
        grid.rebuild(particles, particles.len())?;
        Ok(diagnostics::count_overlaps(particles, &grid, self.config.search_radius()))
    }

    /// Bit-level digest of the current state
    pub fn digest(&self) -> u64 {
        diagnostics::state_digest(self.store.as_slice())
    }
}
