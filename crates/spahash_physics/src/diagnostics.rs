use rayon::prelude::*;
use spahash_core::Particle;

use crate::grid::{QueryScratch, SpatialHashGrid};

/// Total kinetic energy with unit particle mass
pub fn kinetic_energy(particles: &[Particle]) -> f64 {
    particles
        .par_iter()
        .map(|p| 0.5 * p.velocity.length_squared() as f64)
        .sum()
}

pub fn max_speed(particles: &[Particle]) -> f32 {
    particles
        .par_iter()
        .map(|p| p.speed())
        .reduce(|| 0.0, f32::max)
}

/// True when no position or velocity component is NaN or infinite
pub fn all_finite(particles: &[Particle]) -> bool {
    particles.par_iter().all(|p| p.is_finite())
}

/// Particles further than `world_radius + tolerance` from the origin
pub fn count_outside(particles: &[Particle], world_radius: f32, tolerance: f32) -> usize {
    let limit = world_radius + tolerance;
    particles
        .par_iter()
        .filter(|p| p.position.length() > limit)
        .count()
}

/// Overlapping pairs (closer than `radius`), each counted once.
///
/// Uses the grid as built; duplicates from hash aliasing are removed per query.
pub fn count_overlaps(particles: &[Particle], grid: &SpatialHashGrid, radius: f32) -> usize {
    particles
        .par_iter()
        .enumerate()
        .map_init(QueryScratch::new, |scratch, (i, p)| {
            grid.query_into(p.position, i, radius, scratch);
            let mut ids: Vec<u32> = scratch.as_slice().to_vec();
            ids.sort_unstable();
            ids.dedup();
            ids.iter()
                .map(|&j| j as usize)
                .filter(|&j| j > i && j < particles.len())
                .filter(|&j| p.position.distance(particles[j].position) < radius)
                .count()
        })
        .sum()
}

/// FNV-1a digest of the raw particle bytes, for comparing runs bit for bit
pub fn state_digest(particles: &[Particle]) -> u64 {
    let bytes: &[u8] = bytemuck::cast_slice(particles);
    bytes.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_energy_and_speed() {
        let particles = vec![
            Particle::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)),
            Particle::new(Vec3::ONE, Vec3::new(0.0, 0.0, 1.0)),
        ];
        assert!((kinetic_energy(&particles) - 13.0).abs() < 1e-9);
        assert!((max_speed(&particles) - 5.0).abs() < 1e-6);
        assert_eq!(max_speed(&[]), 0.0);
    }

    #[test]
    fn test_finiteness_and_outside() {
        let mut particles = vec![
            Particle::new(Vec3::new(6.0, 0.0, 0.0), Vec3::ZERO),
            Particle::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        assert!(all_finite(&particles));
        assert_eq!(count_outside(&particles, 5.0, 1e-4), 1);

        particles[1].velocity.y = f32::INFINITY;
        assert!(!all_finite(&particles));
    }

    #[test]
    fn test_overlaps_counted_once() {
        let particles = vec![
            Particle::new(Vec3::ZERO, Vec3::ZERO),
            Particle::new(Vec3::new(0.01, 0.0, 0.0), Vec3::ZERO),
            Particle::new(Vec3::new(0.02, 0.0, 0.0), Vec3::ZERO),
            Particle::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ];
        let mut grid = SpatialHashGrid::new(0.04, 4).unwrap();
        grid.rebuild(&particles, 4).unwrap();

        assert_eq!(count_overlaps(&particles, &grid, 0.04), 3);
    }

    #[test]
    fn test_digest_tracks_bits() {
        let a = vec![Particle::new(Vec3::ONE, Vec3::ZERO)];
        let mut b = a.clone();
        assert_eq!(state_digest(&a), state_digest(&b));

        b[0].velocity.x = 1e-30;
        assert_ne!(state_digest(&a), state_digest(&b));
    }
}
