use rayon::prelude::*;
use spahash_core::Particle;

/// Advance every particle along its velocity: `position += velocity * dt`
pub fn integrate(particles: &mut [Particle], dt: f32) {
    particles.par_iter_mut().for_each(|p| {
        p.position += p.velocity * dt;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_integrate_moves_along_velocity() {
        let mut particles = vec![
            Particle::new(Vec3::ZERO, Vec3::new(1.0, -2.0, 0.5)),
            Particle::new(Vec3::ONE, Vec3::ZERO),
        ];
        integrate(&mut particles, 0.1);

        assert!((particles[0].position - Vec3::new(0.1, -0.2, 0.05)).length() < 1e-6);
        assert_eq!(particles[1].position, Vec3::ONE);
        assert_eq!(particles[0].velocity, Vec3::new(1.0, -2.0, 0.5));
    }
}
