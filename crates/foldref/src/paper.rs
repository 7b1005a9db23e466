//! The sheet: rectangle, corners, edges, diagonals, and flap-quality checks.
//!
//! Purpose
//! - Supply the rank-0 originals (corners as marks; edges and diagonals as lines).
//! - Clip lines to the visible sheet and reject creases that miss the interior
//!   or leave a skinny flap.
//! - Validate user targets before they reach the engine.
//!
//! Conventions
//! - Bottom-left corner at the origin; sheet spans `[0, w] × [0, h]`.
//! - Edges run counter-clockwise, so every edge normal points inward.
//!
//! Code cross-refs: `geom2::{Line, Rect}`, `refs::Recipe::accepts`

use nalgebra::vector;
use thiserror::Error;

use crate::geom2::{Line, Rect, Vec2};

/// Names of the rank-0 marks, in `Paper::corners` order.
pub const CORNER_NAMES: [&str; 4] = ["bottom left corner", "bottom right corner", "top right corner", "top left corner"];
/// Names of the rank-0 lines, in `Paper::original_lines` order.
pub const EDGE_NAMES: [&str; 4] = ["bottom edge", "right edge", "top edge", "left edge"];
pub const DIAGONAL_NAMES: [&str; 2] = ["upward diagonal", "downward diagonal"];

/// Rejected user targets.
#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("target point ({x}, {y}) is not on the sheet")]
    OffSheet { x: f64, y: f64 },
    #[error("target line needs two distinct points")]
    DegenerateLine,
    #[error("target line does not cross the sheet")]
    LineMissesSheet,
}

/// Rectangular sheet of paper.
#[derive(Clone, Debug)]
pub struct Paper {
    pub rect: Rect,
    pub corners: [Vec2; 4],
    pub edges: [Line; 4],
    pub diagonals: [Line; 2],
}

impl Paper {
    pub fn new(width: f64, height: f64) -> Self {
        let corners = [
            vector![0.0, 0.0],
            vector![width, 0.0],
            vector![width, height],
            vector![0.0, height],
        ];
        let edges = [
            Line { d: 0.0, u: vector![0.0, 1.0] },
            Line { d: -width, u: vector![-1.0, 0.0] },
            Line { d: -height, u: vector![0.0, -1.0] },
            Line { d: 0.0, u: vector![1.0, 0.0] },
        ];
        let diag = width.hypot(height);
        let diagonals = [
            // bottom-left → top-right
            Line {
                d: 0.0,
                u: vector![-height / diag, width / diag],
            },
            // bottom-right → top-left
            Line {
                d: width * height / diag,
                u: vector![height / diag, width / diag],
            },
        ];
        Self {
            rect: Rect::new(corners[0], corners[2]),
            corners,
            edges,
            diagonals,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    /// Length of the diagonal; bounds `|d|` of every line that meets the sheet.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Edges, then (optionally) diagonals, with their names.
    pub fn original_lines(&self, with_diagonals: bool) -> Vec<(Line, &'static str)> {
        let mut out: Vec<(Line, &'static str)> = self.edges.iter().copied().zip(EDGE_NAMES).collect();
        if with_diagonals {
            out.extend(self.diagonals.iter().copied().zip(DIAGONAL_NAMES));
        }
        out
    }

    #[inline]
    pub fn encloses(&self, p: Vec2, eps: f64) -> bool {
        self.rect.encloses(p, eps)
    }

    /// Segment of `l` on the sheet, as `(start, end)` along `l.tangent()`.
    ///
    /// None when the line misses the sheet or only touches it in a point.
    pub fn clip_line(&self, l: &Line, eps: f64) -> Option<(Vec2, Vec2)> {
        let origin = l.foot();
        let dir = l.tangent();
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        for (o, d, min, max) in [
            (origin.x, dir.x, self.rect.bl.x, self.rect.tr.x),
            (origin.y, dir.y, self.rect.bl.y, self.rect.tr.y),
        ] {
            if d.abs() <= f64::EPSILON {
                if o < min - eps || o > max + eps {
                    return None;
                }
            } else {
                let a = (min - o) / d;
                let b = (max - o) / d;
                lo = lo.max(a.min(b));
                hi = hi.min(a.max(b));
            }
        }
        if hi - lo < eps {
            return None;
        }
        Some((origin + dir * lo, origin + dir * hi))
    }

    /// True if `l` passes through the interior (not just along an edge or
    /// through a corner).
    pub fn interior_overlaps(&self, l: &Line, eps: f64) -> bool {
        match self.clip_line(l, eps) {
            Some((a, b)) => self.rect.encloses((a + b) * 0.5, -eps),
            None => false,
        }
    }

    /// True if folding along `l` leaves a flap thinner than `min_aspect_ratio`.
    ///
    /// Each side's flap is bounded in the crease frame (x along the crease,
    /// y away from it) by the clipped crease and the corners on that side; the
    /// flap is skinny when that box's height/width falls below the threshold.
    pub fn makes_skinny_flap(&self, l: &Line, min_aspect_ratio: f64, eps: f64) -> bool {
        let Some((a, b)) = self.clip_line(l, eps) else {
            return false;
        };
        let t = l.tangent();
        let to_frame = |p: Vec2| vector![t.dot(&p), l.signed_distance(p)];
        for side in [1.0, -1.0] {
            let on_side = self
                .corners
                .iter()
                .copied()
                .filter(|&c| side * l.signed_distance(c) > eps)
                .map(|c| {
                    let f = to_frame(c);
                    vector![f.x, side * f.y]
                });
            let crease = [a, b].into_iter().map(to_frame).map(|f| vector![f.x, 0.0]);
            let Some(bounds) = Rect::bounding(crease.chain(on_side)) else {
                continue;
            };
            if bounds.height() <= eps {
                // nothing on this side; the crease runs along the boundary
                continue;
            }
            if bounds.aspect_ratio() < min_aspect_ratio {
                return true;
            }
        }
        false
    }

    /// Accept a user point target if it lies on the sheet.
    pub fn check_mark_target(&self, p: Vec2, eps: f64) -> Result<Vec2, TargetError> {
        if p.x.is_finite() && p.y.is_finite() && self.encloses(p, eps) {
            Ok(p)
        } else {
            Err(TargetError::OffSheet { x: p.x, y: p.y })
        }
    }

    /// Accept a user line target through two distinct points that crosses the sheet.
    pub fn check_line_target(&self, p1: Vec2, p2: Vec2, eps: f64) -> Result<Line, TargetError> {
        let l = Line::through(p1, p2, eps).ok_or(TargetError::DegenerateLine)?;
        if self.clip_line(&l, eps).is_none() {
            return Err(TargetError::LineMissesSheet);
        }
        Ok(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn originals_lie_on_the_corners() {
        let paper = Paper::new(1.0, 1.5);
        for (k, e) in paper.edges.iter().enumerate() {
            assert!(e.contains(paper.corners[k], 1e-12));
            assert!(e.contains(paper.corners[(k + 1) % 4], 1e-12));
            // inward normal
            assert!(e.signed_distance(paper.rect.center()) > 0.0);
        }
        assert!(paper.diagonals[0].contains(paper.corners[0], 1e-12));
        assert!(paper.diagonals[0].contains(paper.corners[2], 1e-12));
        assert!(paper.diagonals[1].contains(paper.corners[1], 1e-12));
        assert!(paper.diagonals[1].contains(paper.corners[3], 1e-12));
        assert_eq!(paper.original_lines(false).len(), 4);
        assert_eq!(paper.original_lines(true).len(), 6);
    }

    #[test]
    fn clip_line_cases() {
        let paper = Paper::new(1.0, 1.0);
        let mid = Line { d: 0.5, u: vector![1.0, 0.0] };
        let (a, b) = paper.clip_line(&mid, EPS).unwrap();
        assert!(((a - b).norm() - 1.0).abs() < 1e-12);
        assert!((a.x - 0.5).abs() < 1e-12 && (b.x - 0.5).abs() < 1e-12);

        let diag = paper.diagonals[0];
        let (a, b) = paper.clip_line(&diag, EPS).unwrap();
        assert!(((a - b).norm() - 2f64.sqrt()).abs() < 1e-12);

        let outside = Line { d: 1.5, u: vector![1.0, 0.0] };
        assert!(paper.clip_line(&outside, EPS).is_none());
        // touches only the corner (1, 1)
        let corner = Line::through(vector![2.0, 0.0], vector![0.0, 2.0], EPS).unwrap();
        assert!(paper.clip_line(&corner, EPS).is_none());
    }

    #[test]
    fn interior_overlap_excludes_edges() {
        let paper = Paper::new(1.0, 1.0);
        for e in &paper.edges {
            assert!(!paper.interior_overlaps(e, EPS));
        }
        assert!(paper.interior_overlaps(&paper.diagonals[1], EPS));
    }

    #[test]
    fn skinny_flaps() {
        let paper = Paper::new(1.0, 1.0);
        let thin = Line { d: 0.02, u: vector![0.0, 1.0] };
        assert!(paper.makes_skinny_flap(&thin, 0.1, EPS));
        let half = Line { d: 0.5, u: vector![0.0, 1.0] };
        assert!(!paper.makes_skinny_flap(&half, 0.1, EPS));
        // a small corner triangle is squat, not skinny
        let corner_cut = Line::through(vector![0.05, 0.0], vector![0.0, 0.05], EPS).unwrap();
        assert!(!paper.makes_skinny_flap(&corner_cut, 0.1, EPS));
        assert!(!paper.makes_skinny_flap(&thin, 0.0, EPS));
    }

    #[test]
    fn target_validation() {
        let paper = Paper::new(1.0, 1.0);
        assert!(paper.check_mark_target(vector![0.3, 0.9], EPS).is_ok());
        assert_eq!(
            paper.check_mark_target(vector![1.2, 0.5], EPS),
            Err(TargetError::OffSheet { x: 1.2, y: 0.5 })
        );
        assert_eq!(
            paper.check_line_target(vector![0.2, 0.2], vector![0.2, 0.2], EPS),
            Err(TargetError::DegenerateLine)
        );
        assert_eq!(
            paper.check_line_target(vector![2.0, 0.0], vector![2.0, 1.0], EPS),
            Err(TargetError::LineMissesSheet)
        );
        let l = paper
            .check_line_target(vector![0.0, 0.25], vector![1.0, 0.75], EPS)
            .unwrap();
        assert!(l.contains(vector![0.5, 0.5], 1e-12));
    }
}
