use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::{Dispatch, SelfMatchPolicy};

/// Simulation configuration, fixed when the world is built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of particles (also the grid capacity)
    pub particle_count: u32,
    /// Radius shared by all particles
    pub particle_radius: f32,
    /// Radius of the spherical world
    pub world_radius: f32,
    /// Substeps per tick
    pub substeps: u32,
    /// Duration of one tick, split evenly across substeps
    pub frame_dt: f32,
    /// Random seed for deterministic initial state
    pub seed: u64,
    /// Fraction of the world radius covered by initial positions
    pub spawn_extent: f32,
    /// Upper bound of each initial velocity component
    pub spawn_speed: f32,
    /// What pairwise resolution does when a query returns the particle itself
    pub self_match: SelfMatchPolicy,
    /// How pairwise resolution is scheduled
    pub dispatch: Dispatch,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_radius: DEFAULT_PARTICLE_RADIUS,
            world_radius: DEFAULT_WORLD_RADIUS,
            substeps: DEFAULT_SUBSTEPS,
            frame_dt: FRAME_DT,
            seed: 42,
            spawn_extent: SPAWN_EXTENT,
            spawn_speed: SPAWN_SPEED,
            self_match: SelfMatchPolicy::Stop,
            dispatch: Dispatch::Parallel,
        }
    }
}

impl SimConfig {
    /// Interaction distance between two particle centers
    pub fn search_radius(&self) -> f32 {
        2.0 * self.particle_radius
    }

    /// Grid cell edge length; equal to the search radius
    pub fn cell_spacing(&self) -> f32 {
        self.search_radius()
    }

    pub fn substep_dt(&self) -> f32 {
        self.frame_dt / self.substeps.max(1) as f32
    }

    pub fn table_size(&self) -> usize {
        TABLE_SIZE_MULTIPLIER * self.particle_count as usize
    }

    /// Reject configurations the grid and integrator cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if !(self.particle_radius.is_finite() && self.particle_radius > 0.0) {
            return Err(format!("particle_radius must be positive, got {}", self.particle_radius));
        }
        if !(self.world_radius.is_finite() && self.world_radius > 0.0) {
            return Err(format!("world_radius must be positive, got {}", self.world_radius));
        }
        if self.world_radius <= self.particle_radius {
            return Err(format!(
                "world_radius {} must exceed particle_radius {}",
                self.world_radius, self.particle_radius
            ));
        }
        if self.table_size() >= u32::MAX as usize {
            return Err(format!(
                "particle_count {} is too large for u32 grid offsets",
                self.particle_count
            ));
        }
        if self.substeps == 0 {
            return Err("substeps must be at least 1".to_string());
        }
        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0) {
            return Err(format!("frame_dt must be positive, got {}", self.frame_dt));
        }
        if !(self.spawn_extent.is_finite() && self.spawn_extent >= 0.0) {
            return Err(format!("spawn_extent must be non-negative, got {}", self.spawn_extent));
        }
        if !(self.spawn_speed.is_finite() && self.spawn_speed >= 0.0) {
            return Err(format!("spawn_speed must be non-negative, got {}", self.spawn_speed));
        }
        Ok(())
    }
}
