//! Generation and search configuration.
//!
//! `Config` is plain data (serde in/out) plus `validate()`. An `Engine` is
//! only ever built from a validated config; changing any field means building
//! a new engine, since key grids and rank maps are derived from it.
//!
//! Code cross-refs: `crate::engine::Engine::new`, `crate::refs::KeyGrid`

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::refs::KeyGrid;

/// Hard ceiling for `max_rank`; rank partitions grow combinatorially.
pub const RANK_LIMIT: u32 = 24;

/// The seven Huzita–Hatori axioms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axiom {
    O1,
    O2,
    O3,
    O4,
    O5,
    O6,
    O7,
}

impl Axiom {
    pub const ALL: [Axiom; 7] = [
        Axiom::O1,
        Axiom::O2,
        Axiom::O3,
        Axiom::O4,
        Axiom::O5,
        Axiom::O6,
        Axiom::O7,
    ];
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Axiom::O1 => 1,
            Axiom::O2 => 2,
            Axiom::O3 => 3,
            Axiom::O4 => 4,
            Axiom::O5 => 5,
            Axiom::O6 => 6,
            Axiom::O7 => 7,
        };
        write!(f, "O{n}")
    }
}

/// Per-axiom toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Axioms {
    pub o1: bool,
    pub o2: bool,
    pub o3: bool,
    pub o4: bool,
    pub o5: bool,
    pub o6: bool,
    pub o7: bool,
}

impl Default for Axioms {
    fn default() -> Self {
        Self {
            o1: true,
            o2: true,
            o3: true,
            o4: true,
            o5: true,
            o6: true,
            o7: true,
        }
    }
}

impl Axioms {
    /// Only the listed axioms enabled.
    pub fn only(list: &[Axiom]) -> Self {
        let mut a = Axioms {
            o1: false,
            o2: false,
            o3: false,
            o4: false,
            o5: false,
            o6: false,
            o7: false,
        };
        for &ax in list {
            *a.slot(ax) = true;
        }
        a
    }

    pub fn enabled(&self, ax: Axiom) -> bool {
        match ax {
            Axiom::O1 => self.o1,
            Axiom::O2 => self.o2,
            Axiom::O3 => self.o3,
            Axiom::O4 => self.o4,
            Axiom::O5 => self.o5,
            Axiom::O6 => self.o6,
            Axiom::O7 => self.o7,
        }
    }

    fn slot(&mut self, ax: Axiom) -> &mut bool {
        match ax {
            Axiom::O1 => &mut self.o1,
            Axiom::O2 => &mut self.o2,
            Axiom::O3 => &mut self.o3,
            Axiom::O4 => &mut self.o4,
            Axiom::O5 => &mut self.o5,
            Axiom::O6 => &mut self.o6,
            Axiom::O7 => &mut self.o7,
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paper_width: f64,
    pub paper_height: f64,
    /// Equality tolerance for points and lines.
    pub eps: f64,
    pub max_rank: u32,
    pub max_lines: usize,
    pub max_marks: usize,
    /// Grid cells per sheet side for dedup keys; derived when `None`.
    pub key_resolution: Option<u32>,
    /// Errors at or below this are "good enough" and tie on rank.
    pub good_enough_error: f64,
    /// Search drops candidates above this error; unlimited when `None`.
    pub max_error: Option<f64>,
    /// Minimum height/width of either flap in the crease frame.
    pub min_aspect_ratio: f64,
    /// Minimum |sin| of the crossing angle for intersection marks.
    pub min_angle_sine: f64,
    /// Points carried by a fold must land on the sheet.
    pub visibility_matters: bool,
    /// Diagonals count as rank-0 lines.
    pub use_diagonals: bool,
    /// Line error is the worse of the two clipped endpoints (else their mean).
    pub line_worst_case_error: bool,
    pub axioms: Axioms,
    /// Candidate attempts between `Progress::Working` events.
    pub progress_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paper_width: 1.0,
            paper_height: 1.0,
            eps: 1e-8,
            max_rank: 6,
            max_lines: 500_000,
            max_marks: 500_000,
            key_resolution: None,
            good_enough_error: 0.005,
            max_error: None,
            min_aspect_ratio: 0.1,
            min_angle_sine: 0.342,
            visibility_matters: true,
            use_diagonals: true,
            line_worst_case_error: true,
            axioms: Axioms::default(),
            progress_interval: 200_000,
        }
    }
}

/// Configuration precondition violations.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be at least 1")]
    ZeroBudget { field: &'static str },

    #[error("max_rank {max_rank} exceeds the limit {limit}")]
    RankTooDeep { max_rank: u32, limit: u32 },

    #[error(
        "key resolution {resolution} gives {cell:e}-wide cells, narrower than 2·eps = {min_cell:e}"
    )]
    KeyResolution {
        resolution: u32,
        cell: f64,
        min_cell: f64,
    },
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl Config {
    /// Preset for quick runs: default tolerances, sheet and axioms, the
    /// given `max_rank`, and both stores capped at 20 000 entries.
    pub fn small(max_rank: u32) -> Self {
        Self {
            max_rank,
            max_lines: 20_000,
            max_marks: 20_000,
            ..Self::default()
        }
    }

    /// Check every precondition of generation, including the key grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("paper_width", self.paper_width)?;
        positive("paper_height", self.paper_height)?;
        positive("eps", self.eps)?;
        in_range("eps", self.eps, 0.0, 1e-3 * self.paper_width.min(self.paper_height))?;
        if self.max_rank > RANK_LIMIT {
            return Err(ConfigError::RankTooDeep {
                max_rank: self.max_rank,
                limit: RANK_LIMIT,
            });
        }
        if self.max_lines == 0 {
            return Err(ConfigError::ZeroBudget { field: "max_lines" });
        }
        if self.max_marks == 0 {
            return Err(ConfigError::ZeroBudget { field: "max_marks" });
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::ZeroBudget {
                field: "progress_interval",
            });
        }
        in_range("good_enough_error", self.good_enough_error, 0.0, f64::MAX)?;
        if let Some(max_error) = self.max_error {
            in_range("max_error", max_error, 0.0, f64::MAX)?;
        }
        in_range("min_aspect_ratio", self.min_aspect_ratio, 0.0, 1.0)?;
        in_range("min_angle_sine", self.min_angle_sine, 0.0, 1.0)?;
        KeyGrid::new(self).map(|_| ())
    }

    /// Grid resolution actually used for dedup keys.
    ///
    /// Derived from the budgets (about one cell per stored construct) and
    /// capped so cells never get narrower than `2·eps`.
    pub fn key_resolution(&self) -> u32 {
        if let Some(res) = self.key_resolution {
            return res;
        }
        let budget = self.max_lines.max(self.max_marks) as f64;
        let short_side = self
            .paper_width
            .min(self.paper_height)
            .min(std::f64::consts::PI);
        let finest = (short_side / (2.0 * self.eps)).floor().max(1.0);
        budget.sqrt().ceil().max(16.0).min(finest).min((1u32 << 24) as f64) as u32
    }
}
