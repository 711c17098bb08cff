pub mod boundary;
pub mod diagnostics;
pub mod grid;
pub mod integrate;
pub mod pairwise;
pub mod particle;

pub use boundary::resolve_boundary;
pub use grid::{GridError, QueryScratch, SpatialHashGrid};
pub use integrate::integrate;
pub use pairwise::{resolve_pairwise, resolve_pairwise_parallel, PairwiseParams, PairwiseStats};
