//! Curated API for the CLI, benches and integration tests.
//!
//! Important
//! - Convenience re-exports only; breaking changes follow the modules.

// Configuration
pub use crate::config::{Axiom, Axioms, Config, ConfigError, RANK_LIMIT};
// Geometry kernel
pub use crate::geom2::axioms::{
    o1_through_points, o2_point_to_point, o3_line_to_line, o4_perpendicular_through,
    o5_point_to_line_through_point, o6_points_to_lines, o7_point_to_line_perpendicular, Creases,
};
pub use crate::geom2::{solve_cubic, solve_quadratic, Line, Rect, Roots, Vec2};
// Sheet
pub use crate::paper::{Paper, TargetError};
// Constructs, generation and search
pub use crate::engine::Engine;
pub use crate::refs::{
    Construct, ConstructId, GenReport, Geometry, Halt, Match, Ordinal, Progress, Rank, Recipe,
    Sequence, Step,
};
// Statistics
pub use crate::stats::{calc_statistics, ErrorStats, StatsCfg};
