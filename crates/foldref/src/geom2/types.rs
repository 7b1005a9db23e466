//! Basic 2D fold types: points, lines in normal form, axis-aligned boxes.
//!
//! - `Vec2`: points and directions (`nalgebra::Vector2<f64>`).
//! - `Line`: closed-form line `u · p = d` with unit normal `u`.
//! - `Rect`: axis-aligned box, used for the sheet and for flap bounds.
//!
//! Code cross-refs: `util::{cross, rot90}`, `axioms`, `crate::paper::Paper`

use nalgebra::Vector2;

use super::util::{cross, rot90};

/// Point or direction in sheet coordinates.
pub type Vec2 = Vector2<f64>;

/// Tolerance-based point equality (Euclidean distance below `eps`).
#[inline]
pub fn points_equal(a: Vec2, b: Vec2, eps: f64) -> bool {
    (a - b).norm() < eps
}

/// Line `u · p = d` with `|u| = 1`.
///
/// The pair `(d, u)` and `(-d, -u)` describe the same set of points; all
/// comparisons go through `is_equal_to`, which accounts for that.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub d: f64,
    pub u: Vec2,
}

impl Line {
    /// Normalizes `u`; None for a zero or non-finite normal.
    pub fn new(d: f64, u: Vec2) -> Option<Self> {
        let norm = u.norm();
        if !norm.is_finite() || norm <= f64::EPSILON || !d.is_finite() {
            return None;
        }
        Some(Self {
            d: d / norm,
            u: u / norm,
        })
    }

    /// Line through two distinct points (normal is the direction turned CCW).
    pub fn through(p1: Vec2, p2: Vec2, eps: f64) -> Option<Self> {
        let dir = p2 - p1;
        let len = dir.norm();
        if len < eps {
            return None;
        }
        let u = rot90(dir / len);
        Some(Self { d: u.dot(&p1), u })
    }

    /// Unit direction along the line.
    #[inline]
    pub fn tangent(&self) -> Vec2 {
        rot90(self.u)
    }

    /// Point of the line closest to the origin.
    #[inline]
    pub fn foot(&self) -> Vec2 {
        self.u * self.d
    }

    #[inline]
    pub fn signed_distance(&self, p: Vec2) -> f64 {
        self.u.dot(&p) - self.d
    }

    #[inline]
    pub fn distance_to(&self, p: Vec2) -> f64 {
        self.signed_distance(p).abs()
    }

    #[inline]
    pub fn contains(&self, p: Vec2, eps: f64) -> bool {
        self.distance_to(p) < eps
    }

    /// Reflect `p` across this line (the image of `p` after folding).
    #[inline]
    pub fn fold_point(&self, p: Vec2) -> Vec2 {
        p - self.u * (2.0 * self.signed_distance(p))
    }

    /// Reflect another line across this one.
    pub fn fold_line(&self, l: &Line) -> Line {
        let c = self.u.dot(&l.u);
        Line {
            d: l.d - 2.0 * self.d * c,
            u: l.u - self.u * (2.0 * c),
        }
    }

    /// |sin| of the angle between the two lines.
    #[inline]
    pub fn sine_with(&self, other: &Line) -> f64 {
        cross(self.u, other.u).abs()
    }

    #[inline]
    pub fn is_parallel_to(&self, other: &Line, eps: f64) -> bool {
        self.sine_with(other) < eps
    }

    pub fn is_equal_to(&self, other: &Line, eps: f64) -> bool {
        if !self.is_parallel_to(other, eps) {
            return false;
        }
        let d_other = if self.u.dot(&other.u) >= 0.0 {
            other.d
        } else {
            -other.d
        };
        (self.d - d_other).abs() < eps
    }

    /// Crossing point; None for (near) parallel lines.
    pub fn intersection(&self, other: &Line, eps: f64) -> Option<Vec2> {
        let det = cross(self.u, other.u);
        if det.abs() < eps {
            return None;
        }
        Some(Vec2::new(
            (self.d * other.u.y - other.d * self.u.y) / det,
            (self.u.x * other.d - other.u.x * self.d) / det,
        ))
    }

    /// Orientation-free form: angle of the normal in `[0, π)` and the
    /// matching signed distance.
    pub fn canonical(&self) -> (f64, f64) {
        let mut theta = self.u.y.atan2(self.u.x);
        let mut d = self.d;
        if theta < 0.0 {
            theta += std::f64::consts::PI;
            d = -d;
        }
        if theta >= std::f64::consts::PI {
            theta -= std::f64::consts::PI;
            d = -d;
        }
        (theta, d)
    }
}

/// Axis-aligned rectangle spanned by bottom-left `bl` and top-right `tr`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub bl: Vec2,
    pub tr: Vec2,
}

impl Rect {
    #[inline]
    pub fn new(bl: Vec2, tr: Vec2) -> Self {
        Self { bl, tr }
    }

    /// Smallest rectangle holding all points; None for an empty iterator.
    pub fn bounding<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut r = Rect::new(first, first);
        for p in it {
            r.include(p);
        }
        Some(r)
    }

    /// Grow to include `p`.
    pub fn include(&mut self, p: Vec2) {
        self.bl.x = self.bl.x.min(p.x);
        self.bl.y = self.bl.y.min(p.y);
        self.tr.x = self.tr.x.max(p.x);
        self.tr.y = self.tr.y.max(p.y);
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.tr.x - self.bl.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.tr.y - self.bl.y
    }

    /// Height over width; infinite for a zero-width box.
    pub fn aspect_ratio(&self) -> f64 {
        let w = self.width();
        if w <= 0.0 {
            return f64::INFINITY;
        }
        self.height() / w
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.bl + self.tr) * 0.5
    }

    /// Membership with slack: `eps > 0` enlarges the box, `eps < 0` shrinks it.
    #[inline]
    pub fn encloses(&self, p: Vec2, eps: f64) -> bool {
        p.x >= self.bl.x - eps
            && p.x <= self.tr.x + eps
            && p.y >= self.bl.y - eps
            && p.y <= self.tr.y + eps
    }
}
