//! Deduplicating, rank-partitioned store of accepted constructs.
//!
//! Values are bucketed by a spatial key: the grid cell of the point (marks) or
//! of the canonical `(angle, offset)` pair (lines). Cells are at least `2·eps`
//! wide, so anything within tolerance of a value sits in one of the 3×3 cells
//! around it; `contains` probes those buckets and compares with full
//! tolerance. Lines near the angle wrap also probe their mirrored form.
//!
//! New values go to a staging buffer first; `flush` commits them into the
//! map of their rank. Committed ranks are never revised.

use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::debug;

use crate::config::{Config, ConfigError};
use crate::geom2::{points_equal, Line, Vec2};

use super::types::{ConstructId, Rank};

/// Packed grid cell `(i, j)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u64);

impl Key {
    #[inline]
    pub fn pack(i: i32, j: i32) -> Self {
        Key(((i as u32 as u64) << 32) | (j as u32 as u64))
    }

    #[inline]
    pub fn unpack(self) -> (i32, i32) {
        ((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }
}

/// Cell sizes of the dedup grids, derived from a validated configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyGrid {
    pub resolution: u32,
    pub eps: f64,
    /// Mark cells.
    pub cell_x: f64,
    pub cell_y: f64,
    /// Line cells: canonical angle in `[0, π)` and offset in `[-diag, diag]`.
    pub cell_angle: f64,
    pub cell_offset: f64,
    diagonal: f64,
}

impl KeyGrid {
    /// Refuses any resolution whose cells would be narrower than `2·eps`.
    pub fn new(cfg: &Config) -> Result<Self, ConfigError> {
        let resolution = cfg.key_resolution();
        let min_cell = 2.0 * cfg.eps;
        let res = resolution.max(1) as f64;
        let diagonal = cfg.paper_width.hypot(cfg.paper_height);
        let grid = Self {
            resolution,
            eps: cfg.eps,
            cell_x: cfg.paper_width / res,
            cell_y: cfg.paper_height / res,
            cell_angle: PI / res,
            cell_offset: 2.0 * diagonal / res,
            diagonal,
        };
        let cell = grid
            .cell_x
            .min(grid.cell_y)
            .min(grid.cell_angle)
            .min(grid.cell_offset);
        if resolution == 0 || !(cell >= min_cell) {
            return Err(ConfigError::KeyResolution {
                resolution,
                cell,
                min_cell,
            });
        }
        Ok(grid)
    }

    #[inline]
    fn holds_tolerance(&self) -> bool {
        let min_cell = 2.0 * self.eps;
        self.cell_x >= min_cell
            && self.cell_y >= min_cell
            && self.cell_angle >= min_cell
            && self.cell_offset >= min_cell
    }

    #[inline]
    fn index(v: f64, cell: f64) -> i32 {
        // float-to-int casts saturate
        (v / cell).floor() as i32
    }
}

/// Geometry that can live in a `RankedStore`.
pub trait Keyed: Copy {
    /// Grid cell of the value.
    fn cell(&self, grid: &KeyGrid) -> (i32, i32);
    /// Second cell to probe around, for values with two representations.
    fn mirrored_cell(&self, _grid: &KeyGrid) -> Option<(i32, i32)> {
        None
    }
    /// Tolerance equality.
    fn coincides(&self, other: &Self, eps: f64) -> bool;
}

impl Keyed for Vec2 {
    fn cell(&self, grid: &KeyGrid) -> (i32, i32) {
        (
            KeyGrid::index(self.x, grid.cell_x),
            KeyGrid::index(self.y, grid.cell_y),
        )
    }

    fn coincides(&self, other: &Self, eps: f64) -> bool {
        points_equal(*self, *other, eps)
    }
}

impl Keyed for Line {
    fn cell(&self, grid: &KeyGrid) -> (i32, i32) {
        let (theta, d) = self.canonical();
        (
            KeyGrid::index(theta, grid.cell_angle),
            KeyGrid::index(d + grid.diagonal, grid.cell_offset),
        )
    }

    fn mirrored_cell(&self, grid: &KeyGrid) -> Option<(i32, i32)> {
        let (theta, d) = self.canonical();
        let band = 2.0 * grid.cell_angle;
        let theta = if theta < band {
            theta + PI
        } else if theta > PI - band {
            theta - PI
        } else {
            return None;
        };
        Some((
            KeyGrid::index(theta, grid.cell_angle),
            KeyGrid::index(-d + grid.diagonal, grid.cell_offset),
        ))
    }

    fn coincides(&self, other: &Self, eps: f64) -> bool {
        self.is_equal_to(other, eps)
    }
}

type Buckets = HashMap<Key, Vec<u32>>;

fn bucket_push(map: &mut Buckets, key: Key, idx: usize) {
    map.entry(key).or_default().push(idx as u32);
}

/// Accepted values of one kind, bucketed by rank, plus a staging buffer.
#[derive(Clone, Debug)]
pub struct RankedStore<V> {
    grid: KeyGrid,
    max_count: usize,
    /// Committed entries per rank, in acceptance order.
    ranks: Vec<Vec<(ConstructId, V)>>,
    /// Key → indices into `ranks[r]`.
    maps: Vec<Buckets>,
    committed: usize,
    staged: Vec<(ConstructId, V, Key)>,
    staged_map: Buckets,
    staged_rank: Rank,
}

impl<V: Keyed> RankedStore<V> {
    pub fn new(grid: KeyGrid, max_count: usize) -> Self {
        debug_assert!(grid.holds_tolerance(), "key cells narrower than 2·eps");
        Self {
            grid,
            max_count,
            ranks: Vec::new(),
            maps: Vec::new(),
            committed: 0,
            staged: Vec::new(),
            staged_map: HashMap::new(),
            staged_rank: 0,
        }
    }

    #[inline]
    pub fn key_of(&self, v: &V) -> Key {
        let (i, j) = v.cell(&self.grid);
        Key::pack(i, j)
    }

    /// Any committed (all ranks) or staged value equal to `v` under tolerance.
    pub fn contains(&self, v: &V) -> bool {
        self.find(v).is_some()
    }

    /// Id of the stored value equal to `v`, if any.
    pub fn find(&self, v: &V) -> Option<ConstructId> {
        let eps = self.grid.eps;
        let centers = [Some(v.cell(&self.grid)), v.mirrored_cell(&self.grid)];
        for (ci, cj) in centers.into_iter().flatten() {
            for di in -1..=1 {
                for dj in -1..=1 {
                    let key = Key::pack(ci.saturating_add(di), cj.saturating_add(dj));
                    if let Some(hits) = self.staged_map.get(&key) {
                        for &k in hits {
                            let (id, w, _) = &self.staged[k as usize];
                            if v.coincides(w, eps) {
                                return Some(*id);
                            }
                        }
                    }
                    for (r, map) in self.maps.iter().enumerate() {
                        let Some(hits) = map.get(&key) else {
                            continue;
                        };
                        for &k in hits {
                            let (id, w) = &self.ranks[r][k as usize];
                            if v.coincides(w, eps) {
                                return Some(*id);
                            }
                        }
                    }
                }
            }
        }
        None
    }

    /// Append to the staging buffer. Staging a different rank commits the
    /// pending buffer first.
    pub fn stage(&mut self, id: ConstructId, rank: Rank, v: V) -> Key {
        if !self.staged.is_empty() && rank != self.staged_rank {
            self.flush();
        }
        self.staged_rank = rank;
        let key = self.key_of(&v);
        bucket_push(&mut self.staged_map, key, self.staged.len());
        self.staged.push((id, v, key));
        key
    }

    /// Commit the staging buffer into its rank level; returns how many
    /// entries were committed.
    pub fn flush(&mut self) -> usize {
        let n = self.staged.len();
        if n == 0 {
            return 0;
        }
        let r = self.staged_rank as usize;
        while self.ranks.len() <= r {
            self.ranks.push(Vec::new());
            self.maps.push(HashMap::new());
        }
        for (id, v, key) in self.staged.drain(..) {
            bucket_push(&mut self.maps[r], key, self.ranks[r].len());
            self.ranks[r].push((id, v));
        }
        self.staged_map.clear();
        self.committed += n;
        debug!(rank = r, committed = n, total = self.committed, "store flush");
        n
    }

    /// Committed plus staged entries have reached the budget.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_count
    }

    /// Committed plus staged entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.committed + self.staged.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn committed_len(&self) -> usize {
        self.committed
    }

    #[inline]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    #[inline]
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Committed entries of one rank.
    pub fn level(&self, rank: Rank) -> &[(ConstructId, V)] {
        self.ranks
            .get(rank as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    pub fn count_at(&self, rank: Rank) -> usize {
        self.level(rank).len()
    }

    /// Number of rank levels with committed storage.
    #[inline]
    pub fn depth(&self) -> usize {
        self.ranks.len()
    }

    /// Every committed entry, rank by rank.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, ConstructId, V)> + '_ {
        self.ranks
            .iter()
            .enumerate()
            .flat_map(|(r, lvl)| lvl.iter().map(move |&(id, v)| (r as Rank, id, v)))
    }

    /// Forget everything (staging included); the grid and budget stay.
    pub fn clear(&mut self) {
        self.ranks.clear();
        self.maps.clear();
        self.committed = 0;
        self.staged.clear();
        self.staged_map.clear();
        self.staged_rank = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn grid() -> KeyGrid {
        KeyGrid::new(&Config::small(3)).unwrap()
    }

    #[test]
    fn key_packing_keeps_signs() {
        for (i, j) in [(0, 0), (-1, 5), (i32::MAX, i32::MIN), (-7, -9)] {
            assert_eq!(Key::pack(i, j).unpack(), (i, j));
        }
    }

    #[test]
    fn marks_dedup_across_cell_borders() {
        let g = grid();
        let mut s: RankedStore<Vec2> = RankedStore::new(g, 100);
        // right on a cell border
        let x = g.cell_x * 3.0;
        let p = vector![x, 0.5];
        s.stage(ConstructId(0), 1, p);
        assert!(s.contains(&vector![x - 0.4 * g.eps, 0.5]));
        s.flush();
        assert!(s.contains(&vector![x + 0.4 * g.eps, 0.5]));
        assert!(!s.contains(&vector![x + 3.0 * g.eps, 0.5]));
        assert_eq!(s.find(&p), Some(ConstructId(0)));
    }

    #[test]
    fn lines_dedup_across_orientation_and_angle_wrap() {
        let g = grid();
        let mut s: RankedStore<Line> = RankedStore::new(g, 100);
        let vertical = Line::new(0.5, vector![1.0, 0.0]).unwrap();
        s.stage(ConstructId(3), 0, vertical);
        s.flush();
        let flipped = Line::new(-0.5, vector![-1.0, 0.0]).unwrap();
        assert!(s.contains(&flipped));
        // angle just below π: canonical θ ≈ π, offset ≈ -0.5
        let tilted = Line::new(-0.5, vector![-1.0, 1e-10]).unwrap();
        assert!(s.contains(&tilted));
        let other = Line::new(0.5 + 1e-6, vector![1.0, 0.0]).unwrap();
        assert!(!s.contains(&other));
    }

    #[test]
    fn ranks_budget_and_flush() {
        let mut s: RankedStore<Vec2> = RankedStore::new(grid(), 3);
        s.stage(ConstructId(0), 0, vector![0.0, 0.0]);
        s.stage(ConstructId(1), 0, vector![1.0, 0.0]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.committed_len(), 0);
        // staging rank 1 commits rank 0 first
        s.stage(ConstructId(2), 1, vector![0.5, 0.5]);
        assert_eq!(s.count_at(0), 2);
        assert!(s.is_full());
        assert_eq!(s.flush(), 1);
        assert_eq!(s.count_at(1), 1);
        let ranks: Vec<Rank> = s.iter().map(|(r, _, _)| r).collect();
        assert_eq!(ranks, vec![0, 0, 1]);
        s.clear();
        assert!(s.is_empty() && s.level(0).is_empty());
    }
}
