use serde::{Deserialize, Serialize};
use spahash_core::{Particle, SimConfig};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Complete world snapshot for save/load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Unique id of this snapshot
    pub id: Uuid,
    /// Ticks completed when the snapshot was taken
    pub tick: u64,
    pub config: SimConfig,
    pub particles: Vec<Particle>,
}

impl WorldSnapshot {
    pub fn new(config: SimConfig, tick: u64, particles: Vec<Particle>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tick,
            config,
            particles,
        }
    }

    /// Check the particle count agrees with the stored config
    pub fn validate(&self) -> Result<(), String> {
        self.config.validate()?;
        if self.particles.len() != self.config.particle_count as usize {
            return Err(format!(
                "Snapshot {} holds {} particles but its config expects {}",
                self.id,
                self.particles.len(),
                self.config.particle_count
            ));
        }
        Ok(())
    }
}

/// Save a snapshot to disk as bincode
pub fn save_snapshot(snapshot: &WorldSnapshot, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create dir: {e}"))?;
    }
    let data = bincode::serialize(snapshot).map_err(|e| format!("Serialize error: {e}"))?;
    fs::write(path, data).map_err(|e| format!("Write error: {e}"))?;
    Ok(())
}

/// Load a snapshot from disk, rejecting inconsistent contents
pub fn load_snapshot(path: &Path) -> Result<WorldSnapshot, String> {
    let data = fs::read(path).map_err(|e| format!("Read error: {e}"))?;
    let snapshot: WorldSnapshot =
        bincode::deserialize(&data).map_err(|e| format!("Deserialize error: {e}"))?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("spahash_storage_{}", Uuid::new_v4()))
            .join(name)
    }

    fn sample() -> WorldSnapshot {
        let config = SimConfig { particle_count: 2, ..SimConfig::default() };
        let particles = vec![
            Particle::new(Vec3::new(0.5, -1.0, 2.0), Vec3::new(0.1, 0.0, -0.3)),
            Particle::new(Vec3::new(-4.0, 0.25, 0.0), Vec3::ZERO),
        ];
        WorldSnapshot::new(config, 42, particles)
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("world.bin");
        let snapshot = sample();
        save_snapshot(&snapshot, &path).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.id, snapshot.id);
        assert_eq!(loaded.tick, 42);
        assert_eq!(loaded.particles, snapshot.particles);
        assert_eq!(loaded.config.particle_count, 2);

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_load_rejects_mismatched_count() {
        let path = temp_path("broken.bin");
        let mut snapshot = sample();
        snapshot.particles.pop();
        save_snapshot(&snapshot, &path).unwrap();

        let err = load_snapshot(&path).unwrap_err();
        assert!(err.contains("expects 2"), "{err}");

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_snapshot(&temp_path("absent.bin")).unwrap_err();
        assert!(err.starts_with("Read error"));
    }

    #[test]
    fn test_fresh_ids() {
        assert_ne!(sample().id, sample().id);
    }
}
