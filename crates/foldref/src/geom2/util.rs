use super::types::Vec2;

/// z-component of `a × b`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotate by +90°.
#[inline]
pub fn rot90(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Largest absolute value in `xs` (0 for an empty slice).
#[inline]
pub(crate) fn max_abs(xs: &[f64]) -> f64 {
    xs.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}
