//! Real-root solvers for the quadratic and cubic fold axioms.
//!
//! - `solve_quadratic`: numerically stable two-root form.
//! - `solve_cubic`: depressed cubic with Cardano (one real root) or the
//!   trigonometric form (three real roots), followed by guarded Newton polish.
//!
//! Conventions
//! - Leading coefficients that are negligible relative to the others drop the
//!   degree (cubic → quadratic → linear).
//! - Discriminants within a relative band around zero are treated as a double
//!   root, so rounding never turns a repeated real root into a complex pair.
//! - Roots are returned ascending with near-duplicates merged.
//!
//! Code cross-refs: `axioms::o6_points_to_lines`

use super::util::max_abs;

/// Coefficients below this fraction of the largest one count as zero.
const DEGREE_DROP: f64 = 1e-12;
/// Relative half-width of the "double root" band around a zero discriminant.
const DISC_BAND: f64 = 1e-10;
/// Roots closer than this are merged.
const ROOT_MERGE: f64 = 1e-9;

/// Up to three real roots, ascending.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Roots {
    vals: [f64; 3],
    len: usize,
}

impl Roots {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.vals[..self.len]
    }
    fn push(&mut self, x: f64) {
        if x.is_finite() && self.len < 3 {
            self.vals[self.len] = x;
            self.len += 1;
        }
    }
    /// Sort ascending and merge roots closer than `ROOT_MERGE`.
    fn normalize(mut self) -> Self {
        let s = &mut self.vals[..self.len];
        s.sort_by(f64::total_cmp);
        let mut out = Roots::default();
        for &x in s.iter() {
            if out.len == 0 || (x - out.vals[out.len - 1]).abs() > ROOT_MERGE {
                out.push(x);
            }
        }
        out
    }
}

/// Real roots of `a x² + b x + c = 0`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    let mut r = Roots::default();
    let scale = max_abs(&[a, b, c]);
    if scale == 0.0 || !scale.is_finite() {
        return r;
    }
    let (a, b, c) = (a / scale, b / scale, c / scale);
    if a.abs() <= DEGREE_DROP {
        if b.abs() > DEGREE_DROP {
            r.push(-c / b);
        }
        return r;
    }
    let disc = b * b - 4.0 * a * c;
    let band = DISC_BAND * (b * b).max((4.0 * a * c).abs()).max(DEGREE_DROP);
    if disc < -band {
        return r;
    }
    if disc <= band {
        r.push(-b / (2.0 * a));
        return r;
    }
    // q avoids cancellation between -b and sqrt(disc)
    // disc > 0 here, so q != 0
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    r.push(q / a);
    r.push(c / q);
    r.normalize()
}

/// Real roots of `c3 x³ + c2 x² + c1 x + c0 = 0`.
pub fn solve_cubic(c3: f64, c2: f64, c1: f64, c0: f64) -> Roots {
    let scale = max_abs(&[c3, c2, c1, c0]);
    if scale == 0.0 || !scale.is_finite() {
        return Roots::default();
    }
    if (c3 / scale).abs() <= DEGREE_DROP {
        return solve_quadratic(c2, c1, c0);
    }
    let (a, b, c) = (c2 / c3, c1 / c3, c0 / c3);
    // x = t - a/3 gives t³ + p t + q = 0
    let shift = -a / 3.0;
    let p = b - a * a / 3.0;
    let q = 2.0 * a * a * a / 27.0 - a * b / 3.0 + c;
    let half_q = 0.5 * q;
    let third_p = p / 3.0;
    let disc = half_q * half_q + third_p * third_p * third_p;
    let band = DISC_BAND * (half_q * half_q).max(third_p.abs().powi(3));

    let mut r = Roots::default();
    if p.abs() <= DEGREE_DROP && q.abs() <= DEGREE_DROP {
        r.push(shift);
    } else if disc > band {
        let s = disc.sqrt();
        r.push((-half_q + s).cbrt() + (-half_q - s).cbrt() + shift);
    } else if disc < -band {
        // p < 0 here
        let m = 2.0 * (-third_p).sqrt();
        let arg = (3.0 * q / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let phi = arg.acos() / 3.0;
        for k in 0..3 {
            let theta = phi - 2.0 * std::f64::consts::PI * (k as f64) / 3.0;
            r.push(m * theta.cos() + shift);
        }
    } else {
        let u = (-half_q).cbrt();
        r.push(2.0 * u + shift);
        r.push(-u + shift);
    }
    let coeffs = [c3, c2, c1, c0];
    let mut polished = Roots::default();
    for &x in r.as_slice() {
        polished.push(newton_polish(&coeffs, x));
    }
    polished.normalize()
}

/// Two Newton steps, each kept only if it lowers the residual.
fn newton_polish(c: &[f64; 4], mut x: f64) -> f64 {
    let f = |x: f64| ((c[0] * x + c[1]) * x + c[2]) * x + c[3];
    let df = |x: f64| (3.0 * c[0] * x + 2.0 * c[1]) * x + c[2];
    for _ in 0..2 {
        let fx = f(x);
        let dfx = df(x);
        if dfx == 0.0 || !dfx.is_finite() {
            break;
        }
        let next = x - fx / dfx;
        if next.is_finite() && f(next).abs() < fx.abs() {
            x = next;
        } else {
            break;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn cubic_three_distinct_roots() {
        // (x-1)(x-2)(x-3)
        let r = solve_cubic(1.0, -6.0, 11.0, -6.0);
        assert!(close(r.as_slice(), &[1.0, 2.0, 3.0]), "{r:?}");
    }

    #[test]
    fn cubic_single_real_root() {
        // x³ + x + 1 has one real root near -0.6823
        let r = solve_cubic(1.0, 0.0, 1.0, 1.0);
        assert_eq!(r.len(), 1);
        assert!((r.as_slice()[0] + 0.682_327_803_828_019_3).abs() < 1e-9);
    }

    #[test]
    fn cubic_double_root_is_not_lost() {
        // (x-1)²(x-2): zero discriminant
        let r = solve_cubic(1.0, -4.0, 5.0, -2.0);
        assert!(close(r.as_slice(), &[1.0, 2.0]), "{r:?}");
    }

    #[test]
    fn cubic_triple_root() {
        // (x-0.5)³
        let r = solve_cubic(1.0, -1.5, 0.75, -0.125);
        assert_eq!(r.len(), 1);
        assert!((r.as_slice()[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn cubic_degrades_to_quadratic_and_linear() {
        let r = solve_cubic(0.0, 1.0, -3.0, 2.0);
        assert!(close(r.as_slice(), &[1.0, 2.0]));
        let r = solve_cubic(0.0, 0.0, 2.0, -1.0);
        assert!(close(r.as_slice(), &[0.5]));
        assert!(solve_cubic(0.0, 0.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn quadratic_cases() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert!(close(solve_quadratic(1.0, -2.0, 1.0).as_slice(), &[1.0]));
        assert!(close(solve_quadratic(1.0, 0.0, -4.0).as_slice(), &[-2.0, 2.0]));
        assert!(close(
            solve_quadratic(2.0, -7.0, 3.0).as_slice(),
            &[0.5, 3.0]
        ));
    }
}
