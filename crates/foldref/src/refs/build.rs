//! Rank-by-rank generation of marks and lines.
//!
//! Rank 0 holds the originals and their crossings. Each later rank `R` first
//! applies every enabled axiom to inputs whose ranks sum to `R - 1` (one fold
//! on top), commits those lines, then marks the crossings of line pairs whose
//! ranks sum to `R`. Inputs always come from committed levels, so a rank is
//! frozen before anything is built from it.
//!
//! Each budget stops only its own kind: once lines are full the folds of the
//! current rank stop, but its crossings are still marked until the mark
//! budget fills. No later rank is started after either budget is hit.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Axiom, Config};
use crate::geom2::axioms::{
    o1_through_points, o2_point_to_point, o3_line_to_line, o4_perpendicular_through,
    o5_point_to_line_through_point, o6_points_to_lines, o7_point_to_line_perpendicular, Creases,
};
use crate::geom2::{Line, Vec2};
use crate::paper::Paper;

use super::store::RankedStore;
use super::types::{Construct, ConstructId, Geometry, Rank, Recipe};

/// Budget that stopped generation early.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Halt {
    LineBudget,
    MarkBudget,
}

/// Lifecycle events, delivered synchronously to the caller's sink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Progress {
    Initializing,
    Working {
        rank: Rank,
        attempts: u64,
        lines: usize,
        marks: usize,
    },
    RankComplete {
        rank: Rank,
        lines: usize,
        marks: usize,
    },
    Initialized {
        rank: Option<Rank>,
        lines: usize,
        marks: usize,
        halted: Option<Halt>,
    },
}

/// Outcome of one generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GenReport {
    /// Highest rank whose pass finished.
    pub completed_rank: Option<Rank>,
    pub lines: usize,
    pub marks: usize,
    /// Candidate solutions tried (accepted or not).
    pub attempts: u64,
    pub halted: Option<Halt>,
}

/// All ordered ways to write `total` as `N` non-negative ranks.
pub fn compositions<const N: usize>(total: Rank) -> Vec<[Rank; N]> {
    let mut out = Vec::new();
    let mut cur = [0; N];
    fn fill<const N: usize>(i: usize, left: Rank, cur: &mut [Rank; N], out: &mut Vec<[Rank; N]>) {
        if i + 1 == N {
            cur[i] = left;
            out.push(*cur);
            return;
        }
        for r in 0..=left {
            cur[i] = r;
            fill(i + 1, left - r, cur, out);
        }
    }
    if N > 0 {
        fill(0, total, &mut cur, &mut out);
    }
    out
}

/// Unordered pairs from the levels `a` and `b`; `i < j` within one level.
fn for_pairs<T: Copy, E>(
    levels: &[Vec<(ConstructId, T)>],
    a: Rank,
    b: Rank,
    mut f: impl FnMut((ConstructId, T), (ConstructId, T)) -> Result<(), E>,
) -> Result<(), E> {
    let (Some(la), Some(lb)) = (levels.get(a as usize), levels.get(b as usize)) else {
        return Ok(());
    };
    for (i, &x) in la.iter().enumerate() {
        let rest = if a == b { &lb[i + 1..] } else { &lb[..] };
        for &y in rest {
            f(x, y)?;
        }
    }
    Ok(())
}

fn level<T>(levels: &[Vec<(ConstructId, T)>], r: Rank) -> &[(ConstructId, T)] {
    levels.get(r as usize).map(Vec::as_slice).unwrap_or(&[])
}

/// Generation context over an engine's arena and stores.
pub struct Builder<'a> {
    cfg: &'a Config,
    paper: &'a Paper,
    arena: &'a mut Vec<Construct>,
    marks: &'a mut RankedStore<Vec2>,
    lines: &'a mut RankedStore<Line>,
    sink: &'a mut dyn FnMut(&Progress),
    rank: Rank,
    attempts: u64,
}

impl<'a> Builder<'a> {
    pub fn new(
        cfg: &'a Config,
        paper: &'a Paper,
        arena: &'a mut Vec<Construct>,
        marks: &'a mut RankedStore<Vec2>,
        lines: &'a mut RankedStore<Line>,
        sink: &'a mut dyn FnMut(&Progress),
    ) -> Self {
        Self {
            cfg,
            paper,
            arena,
            marks,
            lines,
            sink,
            rank: 0,
            attempts: 0,
        }
    }

    /// Build every rank up to `max_rank` or until a budget fills.
    pub fn run(mut self) -> GenReport {
        (self.sink)(&Progress::Initializing);
        let mut completed = None;
        let mut halted = None;
        for rank in 0..=self.cfg.max_rank {
            self.rank = rank;
            let pass = if rank == 0 {
                self.originals()
            } else {
                self.rank_pass(rank)
            };
            self.lines.flush();
            self.marks.flush();
            if let Err(h) = pass {
                warn!(rank, budget = ?h, lines = self.lines.len(), marks = self.marks.len(), "budget reached; generation halted");
                halted = Some(h);
                break;
            }
            completed = Some(rank);
            info!(
                rank,
                lines = self.lines.len(),
                marks = self.marks.len(),
                attempts = self.attempts,
                "rank complete"
            );
            (self.sink)(&Progress::RankComplete {
                rank,
                lines: self.lines.len(),
                marks: self.marks.len(),
            });
        }
        let report = GenReport {
            completed_rank: completed,
            lines: self.lines.len(),
            marks: self.marks.len(),
            attempts: self.attempts,
            halted,
        };
        (self.sink)(&Progress::Initialized {
            rank: completed,
            lines: report.lines,
            marks: report.marks,
            halted,
        });
        report
    }

    /// Corners, edges and diagonals, then their crossings.
    ///
    /// A full line budget still lets the crossings of the lines already
    /// taken become marks; the first budget hit is reported.
    fn originals(&mut self) -> Result<(), Halt> {
        let paper = self.paper;
        let corners = paper.corners.iter().enumerate().try_for_each(|(corner, &p)| {
            let recipe = Recipe::OriginalMark {
                corner: corner as u8,
            };
            self.submit(recipe, Geometry::Mark(p), 0)
        });
        let originals = paper.original_lines(self.cfg.use_diagonals);
        let edges = originals.iter().enumerate().try_for_each(|(index, &(l, _))| {
            let recipe = Recipe::OriginalLine { index: index as u8 };
            self.submit(recipe, Geometry::Line(l), 0)
        });
        self.lines.flush();
        self.marks.flush();
        let crossings = self.intersections(0);
        corners.and(edges).and(crossings)
    }

    /// Folds of rank `rank`, then the crossings they make.
    fn rank_pass(&mut self, rank: Rank) -> Result<(), Halt> {
        let below = rank - 1;
        let ms: Vec<Vec<(ConstructId, Vec2)>> =
            (0..rank).map(|r| self.marks.level(r).to_vec()).collect();
        let ls: Vec<Vec<(ConstructId, Line)>> =
            (0..rank).map(|r| self.lines.level(r).to_vec()).collect();
        let cfg = self.cfg;
        let folds = Axiom::ALL
            .into_iter()
            .filter(|&ax| cfg.axioms.enabled(ax))
            .try_for_each(|ax| self.apply(ax, below, &ms, &ls));
        self.lines.flush();
        let crossings = self.intersections(rank);
        folds.and(crossings)
    }

    /// One axiom over all inputs whose ranks sum to `below`.
    fn apply(
        &mut self,
        ax: Axiom,
        below: Rank,
        ms: &[Vec<(ConstructId, Vec2)>],
        ls: &[Vec<(ConstructId, Line)>],
    ) -> Result<(), Halt> {
        let eps = self.cfg.eps;
        let rank = below + 1;
        match ax {
            Axiom::O1 | Axiom::O2 => {
                for [a, b] in compositions::<2>(below) {
                    if a > b {
                        continue;
                    }
                    for_pairs(ms, a, b, |(i1, p1), (i2, p2)| {
                        let (recipe, crease) = if ax == Axiom::O1 {
                            let r = Recipe::ThroughPoints { p1: i1, p2: i2 };
                            (r, o1_through_points(p1, p2, eps))
                        } else {
                            let r = Recipe::PointToPoint { p1: i1, p2: i2 };
                            (r, o2_point_to_point(p1, p2, eps))
                        };
                        self.submit_creases(Creases::from(crease), rank, |_| recipe)
                    })?;
                }
            }
            Axiom::O3 => {
                for [a, b] in compositions::<2>(below) {
                    if a > b {
                        continue;
                    }
                    for_pairs(ls, a, b, |(i1, l1), (i2, l2)| {
                        let creases = o3_line_to_line(&l1, &l2, eps);
                        self.submit_creases(creases, rank, |root| Recipe::LineToLine {
                            l1: i1,
                            l2: i2,
                            root,
                        })
                    })?;
                }
            }
            Axiom::O4 => {
                for [a, b] in compositions::<2>(below) {
                    for &(il, l) in level(ls, a) {
                        for &(ip, p) in level(ms, b) {
                            let crease = o4_perpendicular_through(&l, p);
                            let recipe = Recipe::PerpendicularThrough { l: il, p: ip };
                            self.submit_creases(Creases::from(Some(crease)), rank, |_| recipe)?;
                        }
                    }
                }
            }
            Axiom::O5 => {
                for [a, b, c] in compositions::<3>(below) {
                    for &(i1, p1) in level(ms, a) {
                        for &(il, l) in level(ls, b) {
                            for &(i2, p2) in level(ms, c) {
                                if i1 == i2 {
                                    continue;
                                }
                                let creases = o5_point_to_line_through_point(p1, &l, p2, eps);
                                self.submit_creases(creases, rank, |root| {
                                    Recipe::PointToLineThroughPoint {
                                        p1: i1,
                                        l: il,
                                        p2: i2,
                                        root,
                                    }
                                })?;
                            }
                        }
                    }
                }
            }
            Axiom::O6 => {
                for [a, b, c, d] in compositions::<4>(below) {
                    for &(i1, p1) in level(ms, a) {
                        for &(j1, l1) in level(ls, b) {
                            for &(i2, p2) in level(ms, c) {
                                for &(j2, l2) in level(ls, d) {
                                    // (p1, l1) and (p2, l2) are interchangeable
                                    if (i1, j1) >= (i2, j2) || i1 == i2 {
                                        continue;
                                    }
                                    let creases = o6_points_to_lines(p1, &l1, p2, &l2, eps);
                                    self.submit_creases(creases, rank, |root| {
                                        Recipe::PointsToLines {
                                            p1: i1,
                                            l1: j1,
                                            p2: i2,
                                            l2: j2,
                                            root,
                                        }
                                    })?;
                                }
                            }
                        }
                    }
                }
            }
            Axiom::O7 => {
                for [a, b, c] in compositions::<3>(below) {
                    for &(ip, p) in level(ms, a) {
                        for &(j1, l1) in level(ls, b) {
                            for &(j2, l2) in level(ls, c) {
                                if j1 == j2 {
                                    continue;
                                }
                                let crease = o7_point_to_line_perpendicular(p, &l1, &l2, eps);
                                let recipe = Recipe::PointToLinePerpendicular {
                                    p: ip,
                                    l1: j1,
                                    l2: j2,
                                };
                                self.submit_creases(Creases::from(crease), rank, |_| recipe)?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Marks at crossings of committed lines whose ranks sum to `rank`.
    fn intersections(&mut self, rank: Rank) -> Result<(), Halt> {
        let ls: Vec<Vec<(ConstructId, Line)>> =
            (0..=rank).map(|r| self.lines.level(r).to_vec()).collect();
        let eps = self.cfg.eps;
        for [a, b] in compositions::<2>(rank) {
            if a > b {
                continue;
            }
            for_pairs(&ls, a, b, |(i1, l1), (i2, l2)| {
                self.tick();
                let Some(p) = l1.intersection(&l2, eps) else {
                    return Ok(());
                };
                self.submit(Recipe::Intersection { l1: i1, l2: i2 }, Geometry::Mark(p), rank)
            })?;
        }
        self.marks.flush();
        Ok(())
    }

    fn submit_creases(
        &mut self,
        creases: Creases,
        rank: Rank,
        recipe: impl Fn(u8) -> Recipe,
    ) -> Result<(), Halt> {
        self.tick();
        for (root, l) in creases.iter().enumerate() {
            self.submit(recipe(root as u8), Geometry::Line(l), rank)?;
        }
        Ok(())
    }

    fn tick(&mut self) {
        self.attempts += 1;
        if self.attempts % self.cfg.progress_interval == 0 {
            (self.sink)(&Progress::Working {
                rank: self.rank,
                attempts: self.attempts,
                lines: self.lines.len(),
                marks: self.marks.len(),
            });
        }
    }

    /// `Err` once the store for `geometry`'s kind is full.
    fn budget(&self, geometry: &Geometry) -> Result<(), Halt> {
        match geometry {
            Geometry::Line(_) if self.lines.is_full() => Err(Halt::LineBudget),
            Geometry::Mark(_) if self.marks.is_full() => Err(Halt::MarkBudget),
            _ => Ok(()),
        }
    }

    /// Validate, dedup and stage one candidate; `Err` once its budget fills.
    fn submit(&mut self, recipe: Recipe, geometry: Geometry, rank: Rank) -> Result<(), Halt> {
        self.budget(&geometry)?;
        if !recipe.accepts(&geometry, self.arena, self.paper, self.cfg) {
            return Ok(());
        }
        debug_assert_eq!(recipe.rank(self.arena), Some(rank));
        let id = ConstructId(self.arena.len());
        let key = match geometry {
            Geometry::Line(l) => {
                if self.lines.contains(&l) {
                    return Ok(());
                }
                self.lines.stage(id, rank, l)
            }
            Geometry::Mark(p) => {
                if self.marks.contains(&p) {
                    return Ok(());
                }
                self.marks.stage(id, rank, p)
            }
        };
        self.arena.push(Construct {
            recipe,
            geometry,
            rank,
            key,
        });
        self.budget(&geometry)
    }
}
