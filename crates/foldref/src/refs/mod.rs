//! Reference constructs: recipes, deduplicating stores, generation, fold
//! sequences and search.
//!
//! Purpose
//! - Enumerate every mark and line reachable by folding within a rank
//!   budget, keep one representative per tolerance class, and answer
//!   "closest construct to this target" queries with a fold order.
//!
//! Layout
//! - `types.rs`: `Recipe` (tagged variant per axiom plus originals and
//!   intersections), `Construct`, `ConstructId`, `Geometry`.
//! - `store.rs`: `RankedStore` with spatial keys (`KeyGrid`) and a staging
//!   buffer.
//! - `build.rs`: rank-by-rank `Builder`, `Progress` events, budgets.
//! - `sequence.rs`: producers-before-consumers fold order.
//! - `search.rs`: error/rank ordering of matches.
//!
//! Conventions
//! - One arena (`Vec<Construct>`) per engine; prerequisites are indices.
//! - Rank 0 for originals; an axiom fold adds 1 to the sum of its inputs'
//!   ranks; marking a crossing adds nothing.
//!
//! Code cross-refs: `geom2::axioms`, `paper::Paper`, `engine::Engine`

mod build;
mod search;
mod sequence;
mod store;
mod types;

pub use build::{compositions, Builder, GenReport, Halt, Progress};
pub use search::{best_lines, best_marks, line_error, rank_matches, Match};
pub use sequence::{build_sequence, Ordinal, Sequence, Step};
pub use store::{Key, KeyGrid, Keyed, RankedStore};
pub use types::{Construct, ConstructId, Geometry, Rank, Recipe};
