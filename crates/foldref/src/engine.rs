//! Search session: configuration, sheet, arena and both stores.
//!
//! An `Engine` is built from a validated `Config`. `generate` (re)builds the
//! whole corpus; search before generation returns nothing. There is no
//! shared state between engines.

use tracing::info;

use crate::config::{Config, ConfigError};
use crate::geom2::{Line, Vec2};
use crate::paper::{Paper, TargetError};
use crate::refs::{
    best_lines, best_marks, build_sequence, Builder, Construct, ConstructId, GenReport, KeyGrid,
    Match, Progress, RankedStore, Sequence,
};

pub struct Engine {
    cfg: Config,
    paper: Paper,
    grid: KeyGrid,
    arena: Vec<Construct>,
    marks: RankedStore<Vec2>,
    lines: RankedStore<Line>,
    report: Option<GenReport>,
}

impl Engine {
    /// Validates `cfg`; nothing is generated yet.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let grid = KeyGrid::new(&cfg)?;
        let paper = Paper::new(cfg.paper_width, cfg.paper_height);
        Ok(Self {
            marks: RankedStore::new(grid, cfg.max_marks),
            lines: RankedStore::new(grid, cfg.max_lines),
            arena: Vec::new(),
            report: None,
            grid,
            paper,
            cfg,
        })
    }

    /// Build the corpus, discarding any earlier one.
    pub fn generate(&mut self) -> GenReport {
        self.generate_with(&mut |_: &Progress| {})
    }

    /// As `generate`, streaming progress events to `sink`.
    pub fn generate_with(&mut self, sink: &mut dyn FnMut(&Progress)) -> GenReport {
        self.arena.clear();
        self.marks.clear();
        self.lines.clear();
        info!(
            max_rank = self.cfg.max_rank,
            max_lines = self.cfg.max_lines,
            max_marks = self.cfg.max_marks,
            resolution = self.grid.resolution,
            "generating references"
        );
        let report = Builder::new(
            &self.cfg,
            &self.paper,
            &mut self.arena,
            &mut self.marks,
            &mut self.lines,
            sink,
        )
        .run();
        self.report = Some(report);
        report
    }

    /// Best marks for `target`, ordered by error then rank.
    pub fn find_best_marks(&self, target: Vec2, count: usize) -> Vec<Match> {
        best_marks(&self.marks, &self.cfg, target, count)
    }

    /// Best lines for `target`, ordered by error then rank.
    pub fn find_best_lines(&self, target: &Line, count: usize) -> Vec<Match> {
        best_lines(&self.lines, &self.paper, &self.cfg, target, count)
    }

    /// Validate a point target against the sheet, then search.
    pub fn find_marks_near(&self, x: f64, y: f64, count: usize) -> Result<Vec<Match>, TargetError> {
        let p = self.paper.check_mark_target(Vec2::new(x, y), self.cfg.eps)?;
        Ok(self.find_best_marks(p, count))
    }

    /// Validate a two-point line target against the sheet, then search.
    pub fn find_lines_near(&self, p1: Vec2, p2: Vec2, count: usize) -> Result<Vec<Match>, TargetError> {
        let l = self.paper.check_line_target(p1, p2, self.cfg.eps)?;
        Ok(self.find_best_lines(&l, count))
    }

    /// Fold order ending in `id`.
    pub fn sequence(&self, id: ConstructId) -> Option<Sequence> {
        build_sequence(&self.arena, id)
    }

    #[inline]
    pub fn construct(&self, id: ConstructId) -> Option<&Construct> {
        self.arena.get(id.0)
    }

    /// The whole arena, in acceptance order.
    #[inline]
    pub fn constructs(&self) -> &[Construct] {
        &self.arena
    }

    #[inline]
    pub fn marks(&self) -> &RankedStore<Vec2> {
        &self.marks
    }

    #[inline]
    pub fn lines(&self) -> &RankedStore<Line> {
        &self.lines
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn paper(&self) -> &Paper {
        &self.paper
    }

    #[inline]
    pub fn grid(&self) -> &KeyGrid {
        &self.grid
    }

    /// Report of the last `generate`, if any.
    #[inline]
    pub fn report(&self) -> Option<GenReport> {
        self.report
    }
}
