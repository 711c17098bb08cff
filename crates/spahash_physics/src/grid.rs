use glam::{IVec3, Vec3};
use rayon::prelude::*;
use spahash_core::constants::{HASH_PRIME_X, HASH_PRIME_Y, HASH_PRIME_Z, TABLE_SIZE_MULTIPLIER};
use spahash_core::Positioned;

/// Errors from building or filling the grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Cell spacing was zero, negative or not finite
    InvalidSpacing(f32),
    /// Capacity too large for 32-bit bucket offsets
    CapacityTooLarge(usize),
    /// More particles than the grid was sized for
    CapacityExceeded { count: usize, capacity: usize },
    /// Fewer positions supplied than the requested count
    MissingPositions { count: usize, provided: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::InvalidSpacing(s) => write!(f, "Cell spacing must be positive, got {}", s),
            GridError::CapacityTooLarge(c) => write!(f, "Grid capacity {} exceeds u32 offsets", c),
            GridError::CapacityExceeded { count, capacity } => {
                write!(f, "Particle count {} exceeds grid capacity {}", count, capacity)
            }
            GridError::MissingPositions { count, provided } => {
                write!(f, "Requested {} particles but only {} positions given", count, provided)
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Integer cell coordinate of a scalar position (floor toward negative infinity)
#[inline]
pub fn cell_coord(coord: f32, spacing: f32) -> i32 {
    (coord / spacing).floor() as i32
}

/// Bucket of an integer cell: `|x*p1 ^ y*p2 ^ z*p3| mod table_size` in wrapping i32 arithmetic
#[inline]
pub fn hash_cell(x: i32, y: i32, z: i32, table_size: usize) -> usize {
    let h = x.wrapping_mul(HASH_PRIME_X) ^ y.wrapping_mul(HASH_PRIME_Y) ^ z.wrapping_mul(HASH_PRIME_Z);
    h.unsigned_abs() as usize % table_size
}

/// Candidate buffer owned by a single query.
///
/// Every concurrent query needs its own scratch; the grid never keeps a shared cursor.
#[derive(Debug, Clone, Default)]
pub struct QueryScratch {
    ids: Vec<u32>,
    origin: usize,
}

impl QueryScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            origin: 0,
        }
    }

    /// Index of the particle the last query was issued for
    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids.iter().map(|&id| id as usize)
    }

    fn reset(&mut self, origin: usize) {
        self.ids.clear();
        self.origin = origin;
    }
}

/// Fixed-size spatial hash over particle positions.
/// Bucket `b` owns `cell_entries[cell_start[b]..cell_start[b + 1]]`; distinct cells may share a bucket.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    spacing: f32,
    capacity: usize,
    table_size: usize,
    /// Bucket offsets into `cell_entries`, plus a guard equal to the particle count
    cell_start: Vec<u32>,
    /// Particle indices grouped by bucket
    cell_entries: Vec<u32>,
    /// Bucket of each particle from the last rebuild
    bucket_of: Vec<u32>,
    count: usize,
}

impl SpatialHashGrid {
    pub fn new(spacing: f32, capacity: usize) -> Result<Self, GridError> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(GridError::InvalidSpacing(spacing));
        }
        let table_size = capacity
            .checked_mul(TABLE_SIZE_MULTIPLIER)
            .filter(|&t| t < u32::MAX as usize)
            .ok_or(GridError::CapacityTooLarge(capacity))?;

        Ok(Self {
            spacing,
            capacity,
            table_size,
            cell_start: vec![0; table_size + 1],
            cell_entries: vec![0; capacity],
            bucket_of: Vec::with_capacity(capacity),
            count: 0,
        })
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Particles indexed by the last rebuild
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn cell_start(&self) -> &[u32] {
        &self.cell_start
    }

    pub fn cell_entries(&self) -> &[u32] {
        &self.cell_entries[..self.count]
    }

    /// Entries of one bucket
    pub fn bucket(&self, h: usize) -> &[u32] {
        let start = self.cell_start[h] as usize;
        let end = self.cell_start[h + 1] as usize;
        &self.cell_entries[start..end]
    }

    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        IVec3::new(
            cell_coord(position.x, self.spacing),
            cell_coord(position.y, self.spacing),
            cell_coord(position.z, self.spacing),
        )
    }

    pub fn hash_cell(&self, cell: IVec3) -> usize {
        hash_cell(cell.x, cell.y, cell.z, self.table_size)
    }

    pub fn hash_position(&self, position: Vec3) -> usize {
        self.hash_cell(self.cell_of(position))
    }

    /// Rebuild the bucket index from the first `count` items.
    ///
    /// Overwrites all previous contents. Entries inside one bucket end up in
    /// descending index order.
    pub fn rebuild<P: Positioned + Sync>(&mut self, items: &[P], count: usize) -> Result<(), GridError> {
        if count > self.capacity {
            return Err(GridError::CapacityExceeded {
                count,
                capacity: self.capacity,
            });
        }
        if items.len() < count {
            return Err(GridError::MissingPositions {
                count,
                provided: items.len(),
            });
        }

        self.cell_start.fill(0);
        self.count = 0;
        if count == 0 {
            return Ok(());
        }

        // Pass 1: hash every particle, then count bucket populations
        let spacing = self.spacing;
        let table_size = self.table_size;
        items[..count]
            .par_iter()
            .map(|item| {
                let p = item.position();
                hash_cell(
                    cell_coord(p.x, spacing),
                    cell_coord(p.y, spacing),
                    cell_coord(p.z, spacing),
                    table_size,
                ) as u32
            })
            .collect_into_vec(&mut self.bucket_of);

        for &h in &self.bucket_of {
            self.cell_start[h as usize] += 1;
        }

        // Inclusive prefix sum: each slot now holds the end of its bucket
        let mut start = 0u32;
        for slot in &mut self.cell_start[..table_size] {
            start += *slot;
            *slot = start;
        }
        self.cell_start[table_size] = start;

        // Pass 2: walk slots backward from each bucket end, leaving cell_start at bucket begins
        for (i, &h) in self.bucket_of.iter().enumerate() {
            let slot = &mut self.cell_start[h as usize];
            *slot -= 1;
            self.cell_entries[*slot as usize] = i as u32;
        }

        self.count = count;
        Ok(())
    }

    /// Collect every particle in the cells overlapping the cube
    /// `[position - max_distance, position + max_distance]`.
    ///
    /// `exclude` is recorded on the scratch but not filtered out. A cube covering
    /// more cells than there are buckets returns every indexed particle once.
    pub fn query_into(&self, position: Vec3, exclude: usize, max_distance: f32, out: &mut QueryScratch) {
        out.reset(exclude);
        if self.count == 0 {
            return;
        }

        let lo = self.cell_of(position - Vec3::splat(max_distance));
        let hi = self.cell_of(position + Vec3::splat(max_distance));

        let span = |a: i32, b: i32| (b as i64 - a as i64 + 1).max(0) as u64;
        let cells = span(lo.x, hi.x)
            .saturating_mul(span(lo.y, hi.y))
            .saturating_mul(span(lo.z, hi.z));
        if cells > self.table_size as u64 {
            out.ids.extend_from_slice(&self.cell_entries[..self.count]);
            return;
        }

        for xi in lo.x..=hi.x {
            for yi in lo.y..=hi.y {
                for zi in lo.z..=hi.z {
                    let h = hash_cell(xi, yi, zi, self.table_size);
                    let start = self.cell_start[h] as usize;
                    let end = self.cell_start[h + 1] as usize;
                    out.ids.extend_from_slice(&self.cell_entries[start..end]);
                }
            }
        }
    }

    pub fn query(&self, position: Vec3, exclude: usize, max_distance: f32) -> Vec<usize> {
        let mut scratch = QueryScratch::new();
        self.query_into(position, exclude, max_distance, &mut scratch);
        scratch.iter().collect()
    }
}
