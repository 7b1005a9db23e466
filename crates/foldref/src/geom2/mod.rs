//! 2D fold kernel: points, lines in normal form, rectangles, axiom solvers.
//!
//! Purpose
//! - Provide value types (`Vec2`, `Line`, `Rect`) with fold-reflection,
//!   intersection, parallelism and bounding operations.
//! - Solve each Huzita–Hatori axiom in closed form (O1–O5, O7) or through
//!   the cubic solver (O6).
//!
//! Conventions
//! - Lines are `u · p = d` with unit `u`; `(d, u)` and `(-d, -u)` are the same line.
//! - Every predicate takes an explicit `eps`; nothing here reads global state.
//!
//! Code cross-refs: `Line`, `Rect`, `axioms`, `solvers::{solve_quadratic, solve_cubic}`

pub mod axioms;
mod solvers;
mod types;
mod util;

pub use axioms::Creases;
pub use solvers::{solve_cubic, solve_quadratic, Roots};
pub use types::{points_equal, Line, Rect, Vec2};
pub use util::{cross, rot90};

#[cfg(test)]
mod tests;
