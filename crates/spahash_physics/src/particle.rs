use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spahash_core::{Particle, SimConfig};

/// Generate the initial particle cloud.
///
/// Positions fill the cube `[0, spawn_extent * world_radius)^3` and velocities
/// `[0, spawn_speed)^3`. Corners of the cube can poke out of the world sphere;
/// the first boundary pass pulls those particles onto the surface.
pub fn generate_initial(config: &SimConfig, rng: &mut impl Rng) -> Vec<Particle> {
    let n = config.particle_count as usize;
    let extent = config.world_radius * config.spawn_extent;
    let speed = config.spawn_speed;

    (0..n)
        .map(|_| {
            let pos = extent * unit_cube_sample(rng);
            let vel = speed * unit_cube_sample(rng);
            Particle::new(pos, vel)
        })
        .collect()
}

fn unit_cube_sample(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.gen_range(0.0..1.0f32),
        rng.gen_range(0.0..1.0f32),
        rng.gen_range(0.0..1.0f32),
    )
}

/// Initial cloud from the configured seed
pub fn generate_seeded(config: &SimConfig) -> Vec<Particle> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    generate_initial(config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            particle_count: 500,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_initial_state_within_bounds() {
        let config = small_config();
        let particles = generate_seeded(&config);
        assert_eq!(particles.len(), 500);

        let extent = config.world_radius * config.spawn_extent;
        for p in &particles {
            assert!(p.position.min_element() >= 0.0 && p.position.max_element() < extent);
            assert!(p.velocity.min_element() >= 0.0 && p.velocity.max_element() < config.spawn_speed);
        }
    }

    #[test]
    fn test_same_seed_same_cloud() {
        let config = small_config();
        assert_eq!(generate_seeded(&config), generate_seeded(&config));

        let other = SimConfig { seed: 7, ..small_config() };
        assert_ne!(generate_seeded(&config), generate_seeded(&other));
    }
}
