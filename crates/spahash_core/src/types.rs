use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A point particle
/// repr(C) and Pod so a store can be handed to a renderer as raw bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Anything the spatial hash can bucket
pub trait Positioned {
    fn position(&self) -> Vec3;
}

impl Positioned for Vec3 {
    fn position(&self) -> Vec3 {
        *self
    }
}

impl Positioned for Particle {
    fn position(&self) -> Vec3 {
        self.position
    }
}

/// Fixed population of particles.
/// Indices are stable for the lifetime of the store: there is no insert or remove.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable view of the particles; the slice length cannot change
    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Raw little-endian layout: position xyz, velocity xyz per particle
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }
}

/// Handling of the querying particle's own index among its candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelfMatchPolicy {
    /// Stop scanning candidates at the first self match
    #[default]
    Stop,
    /// Ignore the self match and keep scanning
    Skip,
}

/// Scheduling of the pairwise collision stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dispatch {
    /// Query and resolve particle by particle on the calling thread
    Serial,
    /// Gather candidates on the rayon pool, then resolve pairs in index order
    #[default]
    Parallel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_layout() {
        assert_eq!(std::mem::size_of::<Particle>(), 24);

        let store = ParticleStore::new(vec![
            Particle::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)),
            Particle::default(),
        ]);
        let bytes = store.as_bytes();
        assert_eq!(bytes.len(), 48);

        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(&floats[..6], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_finite_check() {
        let ok = Particle::new(Vec3::ONE, Vec3::ZERO);
        assert!(ok.is_finite());

        let bad = Particle::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO);
        assert!(!bad.is_finite());
    }
}
