//! Fold reference finder: generate, deduplicate and search the marks and
//! lines reachable on a sheet by Huzita–Hatori folds.
//!
//! Layout
//! - `geom2`: points, lines, rectangles, root solvers, axiom solvers.
//! - `paper`: the sheet, clipping, flap-quality checks, target validation.
//! - `refs`: constructs, rank-partitioned stores, generation, sequences, search.
//! - `engine`: one search session owning configuration, arena and stores.
//! - `stats`: seeded error statistics over random targets.
//!
//! API Policy
//! - `api` is the curated surface for the CLI and tests; module paths may move.

pub mod api;
pub mod config;
pub mod engine;
pub mod geom2;
pub mod paper;
pub mod refs;
pub mod stats;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::{Config, ConfigError};
pub use engine::Engine;
pub use geom2::{Line, Vec2};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::config::{Axiom, Axioms, Config};
    pub use crate::engine::Engine;
    pub use crate::geom2::{Line, Vec2};
    pub use crate::refs::{ConstructId, Match, Progress, Recipe, Sequence};
    pub use nalgebra::vector;
}
