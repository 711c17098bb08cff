use glam::Vec3;
use rayon::prelude::*;
use spahash_core::constants::QUERY_SCRATCH_HINT;
use spahash_core::{Particle, SelfMatchPolicy, SimConfig};

use crate::grid::{QueryScratch, SpatialHashGrid};

/// Particles gathered per rayon task in the parallel path
const GATHER_CHUNK: usize = 256;

#[derive(Debug, Clone, Copy)]
pub struct PairwiseParams {
    /// Contact distance between centers (twice the particle radius)
    pub search_radius: f32,
    pub self_match: SelfMatchPolicy,
}

impl PairwiseParams {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            search_radius: config.search_radius(),
            self_match: config.self_match,
        }
    }
}

/// Counters from one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairwiseStats {
    /// Candidates returned by all queries, duplicates included
    pub candidates: usize,
    /// Pairs that overlapped and were resolved
    pub contacts: usize,
}

/// Scale `v` down so its length does not exceed `max_speed`
fn cap_speed(v: Vec3, max_speed: f32) -> Vec3 {
    let speed = v.length();
    if speed > max_speed {
        v * (max_speed / speed)
    } else {
        v
    }
}

/// Resolve the contact between `i` and `j` if they overlap.
///
/// Coincident particles have no contact direction and are left alone.
pub fn collide_pair(particles: &mut [Particle], i: usize, j: usize, search_radius: f32) -> bool {
    let a = particles[i];
    let b = particles[j];

    let delta = a.position - b.position;
    let dist = delta.length();
    if !(dist > 0.0 && dist < search_radius) {
        return false;
    }

    let dir = delta / dist;
    let corr = (search_radius - dist) * 0.5;
    particles[i].position = a.position + corr * dir;
    particles[j].position = b.position - corr * dir;

    let vi = a.velocity.dot(dir);
    let vj = b.velocity.dot(dir);
    particles[i].velocity = cap_speed((vj - vi) * (a.velocity + dir), a.speed());
    particles[j].velocity = cap_speed((vi - vj) * (b.velocity + dir), b.speed());
    true
}

fn resolve_candidates(
    particles: &mut [Particle],
    i: usize,
    candidates: impl Iterator<Item = usize>,
    params: &PairwiseParams,
    stats: &mut PairwiseStats,
) {
    for j in candidates {
        if j == i {
            match params.self_match {
                SelfMatchPolicy::Stop => break,
                SelfMatchPolicy::Skip => continue,
            }
        }
        if j >= particles.len() {
            continue;
        }
        if collide_pair(particles, i, j, params.search_radius) {
            stats.contacts += 1;
        }
    }
}

/// Resolve all particle contacts on the calling thread, in index order.
///
/// Each particle queries the grid at its current (possibly already corrected) position.
pub fn resolve_pairwise(
    particles: &mut [Particle],
    grid: &SpatialHashGrid,
    params: &PairwiseParams,
) -> PairwiseStats {
    let mut stats = PairwiseStats::default();
    let mut scratch = QueryScratch::with_capacity(QUERY_SCRATCH_HINT);

    for i in 0..particles.len() {
        grid.query_into(particles[i].position, i, params.search_radius, &mut scratch);
        stats.candidates += scratch.len();
        resolve_candidates(particles, i, scratch.iter(), params, &mut stats);
    }
    stats
}

/// Candidates for a contiguous run of particles, flattened
struct CandidateBlock {
    first: usize,
    offsets: Vec<u32>,
    ids: Vec<u32>,
}

impl CandidateBlock {
    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn candidates(&self, k: usize) -> &[u32] {
        &self.ids[self.offsets[k] as usize..self.offsets[k + 1] as usize]
    }
}

/// Resolve all particle contacts with the queries spread over the rayon pool.
///
/// Candidate gathering runs in parallel, every task with its own scratch buffer,
/// against the positions as they stand on entry. Pairs are then resolved
/// sequentially in index order so no particle is written by two pairs at once.
pub fn resolve_pairwise_parallel(
    particles: &mut [Particle],
    grid: &SpatialHashGrid,
    params: &PairwiseParams,
) -> PairwiseStats {
    let radius = params.search_radius;
    let blocks: Vec<CandidateBlock> = particles
        .par_chunks(GATHER_CHUNK)
        .enumerate()
        .map(|(c, chunk)| {
            let first = c * GATHER_CHUNK;
            let mut scratch = QueryScratch::with_capacity(QUERY_SCRATCH_HINT);
            let mut block = CandidateBlock {
                first,
                offsets: Vec::with_capacity(chunk.len() + 1),
                ids: Vec::with_capacity(chunk.len() * 8),
            };
            block.offsets.push(0);
            for (k, p) in chunk.iter().enumerate() {
                grid.query_into(p.position, first + k, radius, &mut scratch);
                block.ids.extend_from_slice(scratch.as_slice());
                block.offsets.push(block.ids.len() as u32);
            }
            block
        })
        .collect();

    let mut stats = PairwiseStats::default();
    for block in &blocks {
        for k in 0..block.len() {
            let candidates = block.candidates(k);
            stats.candidates += candidates.len();
            resolve_candidates(
                particles,
                block.first + k,
                candidates.iter().map(|&id| id as usize),
                params,
                &mut stats,
            );
        }
    }
    stats
}
