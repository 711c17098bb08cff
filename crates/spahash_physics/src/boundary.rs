use glam::Vec3;
use rayon::prelude::*;
use spahash_core::Particle;

/// Reflect one particle off the world sphere if it has left it.
///
/// The particle is pulled back onto the surface and its velocity mirrored about
/// the tangent plane at that point, keeping its speed. A particle at rest is only
/// pulled back. Returns whether the particle was outside.
pub fn reflect_off_sphere(particle: &mut Particle, world_radius: f32) -> bool {
    let dist = particle.position.length();
    if !(dist > world_radius) {
        return false;
    }

    let normal = particle.position / dist;
    particle.position = world_radius * normal;

    let speed = particle.velocity.length();
    if speed > 0.0 {
        let dir = particle.velocity / speed;
        let reflected: Vec3 = dir - 2.0 * dir.dot(normal) * normal;
        particle.velocity = reflected * speed;
    }
    true
}

/// Resolve boundary contacts for all particles; returns how many were outside
pub fn resolve_boundary(particles: &mut [Particle], world_radius: f32) -> usize {
    particles
        .par_iter_mut()
        .map(|p| reflect_off_sphere(p, world_radius) as usize)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outward_particle_is_clamped_and_reflected() {
        let mut particles = vec![Particle::new(Vec3::new(6.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))];
        let hits = resolve_boundary(&mut particles, 5.0);

        assert_eq!(hits, 1);
        assert!((particles[0].position.length() - 5.0).abs() < 1e-6);
        assert!((particles[0].velocity - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_oblique_reflection_negates_radial_component() {
        let position = Vec3::new(3.0, 4.0, 2.0).normalize() * 6.0;
        let velocity = Vec3::new(0.7, 0.9, -0.2);
        let normal = position.normalize();

        let mut p = Particle::new(position, velocity);
        assert!(reflect_off_sphere(&mut p, 5.0));

        assert!((p.position.length() - 5.0).abs() < 1e-5);
        assert!((p.velocity.dot(normal) + velocity.dot(normal)).abs() < 1e-5);
        let tangential_before = velocity - velocity.dot(normal) * normal;
        let tangential_after = p.velocity - p.velocity.dot(normal) * normal;
        assert!((tangential_before - tangential_after).length() < 1e-5);
        assert!((p.speed() - velocity.length()).abs() < 1e-5);
    }

    #[test]
    fn test_inside_particle_unchanged() {
        let original = Particle::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(5.0, 5.0, 5.0));
        let mut particles = vec![original];
        assert_eq!(resolve_boundary(&mut particles, 5.0), 0);
        assert_eq!(particles[0], original);
    }

    #[test]
    fn test_resting_particle_outside_stays_finite() {
        let mut p = Particle::new(Vec3::new(0.0, 0.0, -7.0), Vec3::ZERO);
        assert!(reflect_off_sphere(&mut p, 5.0));

        assert!(p.is_finite());
        assert_eq!(p.velocity, Vec3::ZERO);
        assert!((p.position - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-6);
    }
}
