//! Huzita–Hatori axioms as pure crease solvers.
//!
//! Every function returns the crease line(s) for one axiom application. An
//! empty result means the configuration has no (non-degenerate) solution;
//! callers treat that as "no candidate", never as an error.
//!
//! | axiom | inputs | solutions |
//! |---|---|---|
//! | O1 | crease through `p1`, `p2` | 0..1 |
//! | O2 | bring `p1` to `p2` | 0..1 |
//! | O3 | bring `l1` onto `l2` | 0..2 (one when parallel) |
//! | O4 | fold `l` onto itself through `p` | 1 |
//! | O5 | bring `p1` onto `l` through `p2` | 0..2 |
//! | O6 | bring `p1` onto `l1` and `p2` onto `l2` | 0..3 |
//! | O7 | bring `p` onto `l1`, fold `l2` onto itself | 0..1 |
//!
//! Multi-solution axioms order their creases deterministically, so a root
//! index picks the same crease every time it is recomputed.

use super::solvers::solve_cubic;
use super::types::{points_equal, Line, Vec2};

/// A solved crease must reproduce its defining incidences to this accuracy.
const INCIDENCE_CHECK: f64 = 1e-7;

/// Up to three creases from one axiom application.
#[derive(Clone, Copy, Debug, Default)]
pub struct Creases {
    buf: [Option<Line>; 3],
    len: usize,
}

impl Creases {
    fn push(&mut self, l: Line) {
        if self.len < 3 {
            self.buf[self.len] = Some(l);
            self.len += 1;
        }
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Crease for a root index.
    #[inline]
    pub fn get(&self, root: usize) -> Option<Line> {
        if root < self.len {
            self.buf[root]
        } else {
            None
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = Line> + '_ {
        self.buf[..self.len].iter().flatten().copied()
    }
}

impl From<Option<Line>> for Creases {
    fn from(l: Option<Line>) -> Self {
        let mut c = Creases::default();
        if let Some(l) = l {
            c.push(l);
        }
        c
    }
}

/// O1: crease through two points.
pub fn o1_through_points(p1: Vec2, p2: Vec2, eps: f64) -> Option<Line> {
    Line::through(p1, p2, eps)
}

/// O2: perpendicular bisector of `p1 p2`.
pub fn o2_point_to_point(p1: Vec2, p2: Vec2, eps: f64) -> Option<Line> {
    let n = p2 - p1;
    let len = n.norm();
    if len < eps {
        return None;
    }
    let u = n / len;
    Some(Line {
        d: u.dot(&(p1 + p2)) * 0.5,
        u,
    })
}

/// O3: bisectors that lay `l1` onto `l2`.
///
/// Parallel lines have the single mid-line; crossing lines have two
/// bisectors, root 0 along `u1 + u2`, root 1 along `u1 - u2`.
pub fn o3_line_to_line(l1: &Line, l2: &Line, eps: f64) -> Creases {
    let mut out = Creases::default();
    if l1.is_parallel_to(l2, eps) {
        let (u2, d2) = if l1.u.dot(&l2.u) >= 0.0 {
            (l2.u, l2.d)
        } else {
            (-l2.u, -l2.d)
        };
        if (l1.d - d2).abs() < eps {
            return out;
        }
        // |u1 + u2| ≈ 2, so this is the mean offset
        if let Some(mid) = Line::new(l1.d + d2, l1.u + u2) {
            out.push(mid);
        }
        return out;
    }
    let Some(p) = l1.intersection(l2, eps) else {
        return out;
    };
    for n in [l1.u + l2.u, l1.u - l2.u] {
        if let Some(bisector) = Line::new(n.dot(&p), n) {
            out.push(bisector);
        }
    }
    out
}

/// O4: perpendicular to `l` through `p`.
pub fn o4_perpendicular_through(l: &Line, p: Vec2) -> Line {
    let u = l.tangent();
    Line { d: u.dot(&p), u }
}

/// O5: crease through `p2` that lands `p1` on `l`.
///
/// The image of `p1` lies on the circle around `p2` through `p1`; root 0
/// takes the crossing further along `l.tangent()`.
pub fn o5_point_to_line_through_point(p1: Vec2, l: &Line, p2: Vec2, eps: f64) -> Creases {
    let mut out = Creases::default();
    let r = (p1 - p2).norm();
    if r < eps {
        return out;
    }
    let h = l.signed_distance(p2);
    let disc = r * r - h * h;
    if disc < -eps {
        return out;
    }
    let foot = p2 - l.u * h;
    let s = disc.max(0.0).sqrt();
    let t = l.tangent();
    let images = [foot + t * s, foot - t * s];
    let count = if s < eps { 1 } else { 2 };
    for &img in &images[..count] {
        if points_equal(img, p1, eps) {
            continue;
        }
        if let Some(crease) = o2_point_to_point(p1, img, eps) {
            out.push(crease);
        }
    }
    out
}

/// O6: crease that lands `p1` on `l1` and `p2` on `l2` at the same time.
///
/// Parametrize the image of `p1` as `q(t) = foot(l1) + t·tangent(l1)`. The
/// crease is the perpendicular bisector of `p1 q(t)`, with normal
/// `n(t) = q(t) - p1`; requiring the reflected `p2` to lie on `l2` gives
///
/// `(u2·n + e)|n|² - 2 (n·w)(u2·n) = 0`, `e = u2·p2 - d2`, `w = p2 - p1`,
///
/// a cubic in `t`. Roots are taken ascending; each surviving root is checked
/// against both incidences before it is reported.
pub fn o6_points_to_lines(p1: Vec2, l1: &Line, p2: Vec2, l2: &Line, eps: f64) -> Creases {
    let mut out = Creases::default();
    let v = l1.tangent();
    let a = l1.foot();
    let n0 = a - p1;
    let w = p2 - p1;
    let e = l2.signed_distance(p2);

    // |n|² = a0 + a1 t + t², u2·n = b0 + b1 t, n·w = c0 + c1 t
    let a0 = n0.dot(&n0);
    let a1 = 2.0 * n0.dot(&v);
    let b0 = l2.u.dot(&n0);
    let b1 = l2.u.dot(&v);
    let c0 = n0.dot(&w);
    let c1 = v.dot(&w);

    let k3 = b1;
    let k2 = b0 + b1 * a1 + e - 2.0 * c1 * b1;
    let k1 = b0 * a1 + b1 * a0 + e * a1 - 2.0 * (c0 * b1 + c1 * b0);
    let k0 = b0 * a0 + e * a0 - 2.0 * c0 * b0;

    for &t in solve_cubic(k3, k2, k1, k0).as_slice() {
        let q = a + v * t;
        if points_equal(q, p1, eps) {
            continue;
        }
        let Some(crease) = o2_point_to_point(p1, q, eps) else {
            continue;
        };
        let lands1 = l1.distance_to(crease.fold_point(p1)) < INCIDENCE_CHECK;
        let lands2 = l2.distance_to(crease.fold_point(p2)) < INCIDENCE_CHECK;
        if lands1 && lands2 {
            out.push(crease);
        }
    }
    out
}

/// O7: crease perpendicular to `l2` that lands `p` on `l1`.
///
/// The crease normal is `tangent(l2)`, so only its offset is unknown and the
/// incidence condition is linear in it.
pub fn o7_point_to_line_perpendicular(p: Vec2, l1: &Line, l2: &Line, eps: f64) -> Option<Line> {
    let u = l2.tangent();
    let denom = l1.u.dot(&u);
    if denom.abs() < eps {
        return None;
    }
    let off = l1.signed_distance(p);
    if off.abs() < eps {
        return None;
    }
    Some(Line {
        d: u.dot(&p) - off / (2.0 * denom),
        u,
    })
}
