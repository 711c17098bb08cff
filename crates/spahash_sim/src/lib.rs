pub mod pipeline;
pub mod world;

pub use pipeline::SimulationPlugin;
pub use world::{ParticleWorld, TickStats, WorldStats};
