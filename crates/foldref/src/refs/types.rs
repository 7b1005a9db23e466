//! Constructs: the tagged recipe of each mark/line plus its cached geometry.
//!
//! Kept small and explicit so `build`, `sequence` and `search` read easily.
//! All constructs live in one arena (`Vec<Construct>`); prerequisites are
//! `ConstructId` indices into it.

use std::fmt;

use serde::Serialize;

use crate::config::{Axiom, Config};
use crate::geom2::axioms::{
    o1_through_points, o2_point_to_point, o3_line_to_line, o4_perpendicular_through,
    o5_point_to_line_through_point, o6_points_to_lines, o7_point_to_line_perpendicular,
};
use crate::geom2::{Line, Vec2};
use crate::paper::{Paper, CORNER_NAMES, DIAGONAL_NAMES, EDGE_NAMES};

use super::store::Key;

/// Fold-count lower bound of a construct.
pub type Rank = u32;

/// Arena index of a construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConstructId(pub usize);

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric value of a construct.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Mark(Vec2),
    Line(Line),
}

impl Geometry {
    #[inline]
    pub fn as_mark(&self) -> Option<Vec2> {
        match *self {
            Geometry::Mark(p) => Some(p),
            Geometry::Line(_) => None,
        }
    }
    #[inline]
    pub fn as_line(&self) -> Option<Line> {
        match *self {
            Geometry::Line(l) => Some(l),
            Geometry::Mark(_) => None,
        }
    }
    #[inline]
    pub fn is_mark(&self) -> bool {
        matches!(self, Geometry::Mark(_))
    }
}

/// How a construct is made. One variant per axiom, plus the originals and
/// line intersections (the only way to obtain a non-original mark).
///
/// Root indices pick among the ordered solutions of multi-solution axioms
/// (see `geom2::axioms`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Recipe {
    /// Sheet corner; index into `Paper::corners`.
    OriginalMark { corner: u8 },
    /// Sheet edge or diagonal; index into `Paper::original_lines(true)`.
    OriginalLine { index: u8 },
    /// Crossing of two lines.
    Intersection { l1: ConstructId, l2: ConstructId },
    /// O1: crease through `p1` and `p2`.
    ThroughPoints { p1: ConstructId, p2: ConstructId },
    /// O2: bring `p1` to `p2`.
    PointToPoint { p1: ConstructId, p2: ConstructId },
    /// O3: bring `l1` onto `l2`.
    LineToLine {
        l1: ConstructId,
        l2: ConstructId,
        root: u8,
    },
    /// O4: fold `l` onto itself through `p`.
    PerpendicularThrough { l: ConstructId, p: ConstructId },
    /// O5: bring `p1` onto `l`, creasing through `p2`.
    PointToLineThroughPoint {
        p1: ConstructId,
        l: ConstructId,
        p2: ConstructId,
        root: u8,
    },
    /// O6: bring `p1` onto `l1` and `p2` onto `l2`.
    PointsToLines {
        p1: ConstructId,
        l1: ConstructId,
        p2: ConstructId,
        l2: ConstructId,
        root: u8,
    },
    /// O7: bring `p` onto `l1`, folding `l2` onto itself.
    PointToLinePerpendicular {
        p: ConstructId,
        l1: ConstructId,
        l2: ConstructId,
    },
}

/// One accepted construct. Immutable once pushed into the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Construct {
    pub recipe: Recipe,
    pub geometry: Geometry,
    pub rank: Rank,
    /// Dedup key of `geometry` in its store.
    pub key: Key,
}

fn mark_of(arena: &[Construct], id: ConstructId) -> Option<Vec2> {
    arena.get(id.0)?.geometry.as_mark()
}

fn line_of(arena: &[Construct], id: ConstructId) -> Option<Line> {
    arena.get(id.0)?.geometry.as_line()
}

impl Recipe {
    pub fn axiom(&self) -> Option<Axiom> {
        match self {
            Recipe::OriginalMark { .. }
            | Recipe::OriginalLine { .. }
            | Recipe::Intersection { .. } => None,
            Recipe::ThroughPoints { .. } => Some(Axiom::O1),
            Recipe::PointToPoint { .. } => Some(Axiom::O2),
            Recipe::LineToLine { .. } => Some(Axiom::O3),
            Recipe::PerpendicularThrough { .. } => Some(Axiom::O4),
            Recipe::PointToLineThroughPoint { .. } => Some(Axiom::O5),
            Recipe::PointsToLines { .. } => Some(Axiom::O6),
            Recipe::PointToLinePerpendicular { .. } => Some(Axiom::O7),
        }
    }

    #[inline]
    pub fn is_original(&self) -> bool {
        matches!(
            self,
            Recipe::OriginalMark { .. } | Recipe::OriginalLine { .. }
        )
    }

    /// Name of an original construct.
    pub fn original_name(&self) -> Option<&'static str> {
        match *self {
            Recipe::OriginalMark { corner } => CORNER_NAMES.get(corner as usize).copied(),
            Recipe::OriginalLine { index } => EDGE_NAMES
                .iter()
                .chain(DIAGONAL_NAMES.iter())
                .nth(index as usize)
                .copied(),
            _ => None,
        }
    }

    /// Immediate prerequisites, in recipe order.
    pub fn prerequisites(&self) -> impl Iterator<Item = ConstructId> {
        let slots: [Option<ConstructId>; 4] = match *self {
            Recipe::OriginalMark { .. } | Recipe::OriginalLine { .. } => [None; 4],
            Recipe::Intersection { l1, l2 } => [Some(l1), Some(l2), None, None],
            Recipe::ThroughPoints { p1, p2 } | Recipe::PointToPoint { p1, p2 } => {
                [Some(p1), Some(p2), None, None]
            }
            Recipe::LineToLine { l1, l2, .. } => [Some(l1), Some(l2), None, None],
            Recipe::PerpendicularThrough { l, p } => [Some(l), Some(p), None, None],
            Recipe::PointToLineThroughPoint { p1, l, p2, .. } => [Some(p1), Some(l), Some(p2), None],
            Recipe::PointsToLines { p1, l1, p2, l2, .. } => [Some(p1), Some(l1), Some(p2), Some(l2)],
            Recipe::PointToLinePerpendicular { p, l1, l2 } => [Some(p), Some(l1), Some(l2), None],
        };
        slots.into_iter().flatten()
    }

    /// Rank added on top of the prerequisites: one fold per axiom, nothing
    /// for originals or for marking a crossing.
    #[inline]
    pub fn rank_increment(&self) -> Rank {
        if self.axiom().is_some() {
            1
        } else {
            0
        }
    }

    /// Sum of prerequisite ranks plus `rank_increment`; None if a
    /// prerequisite is missing from the arena.
    pub fn rank(&self, arena: &[Construct]) -> Option<Rank> {
        let mut total = self.rank_increment();
        for id in self.prerequisites() {
            total += arena.get(id.0)?.rank;
        }
        Some(total)
    }

    /// Recompute the geometry from the prerequisites (or the sheet, for
    /// originals). None if the configuration has no solution at this root.
    pub fn materialize(&self, arena: &[Construct], paper: &Paper, eps: f64) -> Option<Geometry> {
        let line = match *self {
            Recipe::OriginalMark { corner } => {
                return paper.corners.get(corner as usize).map(|&p| Geometry::Mark(p));
            }
            Recipe::OriginalLine { index } => {
                return paper
                    .original_lines(true)
                    .get(index as usize)
                    .map(|&(l, _)| Geometry::Line(l));
            }
            Recipe::Intersection { l1, l2 } => {
                let p = line_of(arena, l1)?.intersection(&line_of(arena, l2)?, eps)?;
                return Some(Geometry::Mark(p));
            }
            Recipe::ThroughPoints { p1, p2 } => {
                o1_through_points(mark_of(arena, p1)?, mark_of(arena, p2)?, eps)?
            }
            Recipe::PointToPoint { p1, p2 } => {
                o2_point_to_point(mark_of(arena, p1)?, mark_of(arena, p2)?, eps)?
            }
            Recipe::LineToLine { l1, l2, root } => {
                o3_line_to_line(&line_of(arena, l1)?, &line_of(arena, l2)?, eps).get(root as usize)?
            }
            Recipe::PerpendicularThrough { l, p } => {
                o4_perpendicular_through(&line_of(arena, l)?, mark_of(arena, p)?)
            }
            Recipe::PointToLineThroughPoint { p1, l, p2, root } => o5_point_to_line_through_point(
                mark_of(arena, p1)?,
                &line_of(arena, l)?,
                mark_of(arena, p2)?,
                eps,
            )
            .get(root as usize)?,
            Recipe::PointsToLines {
                p1,
                l1,
                p2,
                l2,
                root,
            } => o6_points_to_lines(
                mark_of(arena, p1)?,
                &line_of(arena, l1)?,
                mark_of(arena, p2)?,
                &line_of(arena, l2)?,
                eps,
            )
            .get(root as usize)?,
            Recipe::PointToLinePerpendicular { p, l1, l2 } => o7_point_to_line_perpendicular(
                mark_of(arena, p)?,
                &line_of(arena, l1)?,
                &line_of(arena, l2)?,
                eps,
            )?,
        };
        Some(Geometry::Line(line))
    }

    /// Points carried across the crease by this fold (checked for visibility).
    fn carried_points(&self, arena: &[Construct]) -> [Option<Vec2>; 2] {
        match *self {
            Recipe::PointToPoint { p1, .. }
            | Recipe::PointToLineThroughPoint { p1, .. }
            | Recipe::PointToLinePerpendicular { p: p1, .. } => [mark_of(arena, p1), None],
            Recipe::PointsToLines { p1, p2, .. } => [mark_of(arena, p1), mark_of(arena, p2)],
            _ => [None, None],
        }
    }

    /// Quality checks a candidate must pass before it is stored.
    ///
    /// Lines: pass through the sheet interior, no skinny flap, and (with
    /// `visibility_matters`) every carried point lands on the sheet.
    /// Marks: on the sheet, crossing angle not too shallow.
    pub fn accepts(&self, geometry: &Geometry, arena: &[Construct], paper: &Paper, cfg: &Config) -> bool {
        if self.is_original() {
            return true;
        }
        let eps = cfg.eps;
        match *geometry {
            Geometry::Mark(p) => {
                if !paper.encloses(p, eps) {
                    return false;
                }
                if let Recipe::Intersection { l1, l2 } = *self {
                    let (Some(a), Some(b)) = (line_of(arena, l1), line_of(arena, l2)) else {
                        return false;
                    };
                    if a.sine_with(&b) < cfg.min_angle_sine {
                        return false;
                    }
                }
                true
            }
            Geometry::Line(l) => {
                if !paper.interior_overlaps(&l, eps) {
                    return false;
                }
                if paper.makes_skinny_flap(&l, cfg.min_aspect_ratio, eps) {
                    return false;
                }
                if cfg.visibility_matters {
                    for p in self.carried_points(arena).into_iter().flatten() {
                        if !paper.encloses(l.fold_point(p), eps) {
                            return false;
                        }
                    }
                }
                true
            }
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Recipe::OriginalMark { .. } | Recipe::OriginalLine { .. } => {
                write!(f, "{}", self.original_name().unwrap_or("original"))
            }
            Recipe::Intersection { l1, l2 } => write!(f, "intersection of {l1} and {l2}"),
            Recipe::ThroughPoints { p1, p2 } => write!(f, "O1: crease through {p1} and {p2}"),
            Recipe::PointToPoint { p1, p2 } => write!(f, "O2: bring {p1} to {p2}"),
            Recipe::LineToLine { l1, l2, root } => {
                write!(f, "O3: bring {l1} onto {l2} (root {root})")
            }
            Recipe::PerpendicularThrough { l, p } => {
                write!(f, "O4: fold {l} onto itself through {p}")
            }
            Recipe::PointToLineThroughPoint { p1, l, p2, root } => {
                write!(f, "O5: bring {p1} onto {l} through {p2} (root {root})")
            }
            Recipe::PointsToLines {
                p1,
                l1,
                p2,
                l2,
                root,
            } => write!(f, "O6: bring {p1} onto {l1} and {p2} onto {l2} (root {root})"),
            Recipe::PointToLinePerpendicular { p, l1, l2 } => {
                write!(f, "O7: bring {p} onto {l1}, folding {l2} onto itself")
            }
        }
    }
}
