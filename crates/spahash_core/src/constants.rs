// Simulation constants.
// Units are arbitrary scene units (the world is a sphere of radius 5 by default)
// and seconds for time.

/// Multipliers of the spatial hash, applied per cell axis before xor-ing
pub const HASH_PRIME_X: i32 = 92_837_111;
pub const HASH_PRIME_Y: i32 = 689_287_499;
pub const HASH_PRIME_Z: i32 = 283_923_481;

/// Hash table buckets per particle of capacity (fixed over-provisioning, never resized)
pub const TABLE_SIZE_MULTIPLIER: usize = 2;

/// Default number of particles
pub const DEFAULT_PARTICLE_COUNT: u32 = 10_000;

/// Radius of every particle
pub const DEFAULT_PARTICLE_RADIUS: f32 = 0.02;

/// Radius of the spherical world boundary
pub const DEFAULT_WORLD_RADIUS: f32 = 5.0;

/// Substeps per rendered frame
pub const DEFAULT_SUBSTEPS: u32 = 10;

/// Frame time the substeps subdivide
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Initial positions fill [0, SPAWN_EXTENT * world_radius) on each axis
pub const SPAWN_EXTENT: f32 = 0.8;

/// Initial velocities are drawn from [0, SPAWN_SPEED) on each axis
pub const SPAWN_SPEED: f32 = 0.5;

/// Expected candidates per query when presizing scratch buffers
pub const QUERY_SCRATCH_HINT: usize = 64;
