//! Error statistics of a generated corpus over random target points.
//!
//! Draws `trials` points uniformly on the sheet from a seeded `StdRng`, finds
//! the best mark for each and summarizes the errors. Same seed, same engine
//! configuration, same numbers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::Engine;
use crate::geom2::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsCfg {
    pub trials: usize,
    pub seed: u64,
    /// Histogram bucket width.
    pub bucket_size: f64,
    /// Regular buckets; errors beyond the last go to the overflow bucket.
    pub num_buckets: usize,
}

impl Default for StatsCfg {
    fn default() -> Self {
        Self {
            trials: 1000,
            seed: 42,
            bucket_size: 0.001,
            num_buckets: 11,
        }
    }
}

/// Summary of best-mark errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErrorStats {
    pub trials: usize,
    /// Trials that found any mark.
    pub found: usize,
    pub mean: f64,
    pub max: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    /// Counts per bucket `[k·size, (k+1)·size)`.
    pub buckets: Vec<usize>,
    pub overflow: usize,
}

/// Nearest-rank percentile of an ascending slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

pub fn calc_statistics(engine: &Engine, cfg: &StatsCfg) -> ErrorStats {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let (w, h) = (engine.paper().width(), engine.paper().height());
    let mut errors = Vec::with_capacity(cfg.trials);
    for _ in 0..cfg.trials {
        let p = Vec2::new(rng.gen_range(0.0..=w), rng.gen_range(0.0..=h));
        if let Some(best) = engine.find_best_marks(p, 1).first() {
            errors.push(best.error);
        }
    }
    errors.sort_by(f64::total_cmp);

    let mut buckets = vec![0; cfg.num_buckets];
    let mut overflow = 0;
    for &e in &errors {
        let k = (e / cfg.bucket_size).floor();
        if k >= 0.0 && (k as usize) < cfg.num_buckets {
            buckets[k as usize] += 1;
        } else {
            overflow += 1;
        }
    }
    let found = errors.len();
    let stats = ErrorStats {
        trials: cfg.trials,
        found,
        mean: if found == 0 {
            0.0
        } else {
            errors.iter().sum::<f64>() / found as f64
        },
        max: errors.last().copied().unwrap_or(0.0),
        p50: percentile(&errors, 0.50),
        p90: percentile(&errors, 0.90),
        p99: percentile(&errors, 0.99),
        buckets,
        overflow,
    };
    info!(
        trials = stats.trials,
        mean = stats.mean,
        max = stats.max,
        "error statistics"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn percentile_nearest_rank() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&v, 0.5), 2.0);
        assert_eq!(percentile(&v, 0.99), 4.0);
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn statistics_are_seeded_and_consistent() {
        let mut e = Engine::new(Config::small(1)).unwrap();
        e.generate();
        let cfg = StatsCfg {
            trials: 200,
            ..StatsCfg::default()
        };
        let a = calc_statistics(&e, &cfg);
        let b = calc_statistics(&e, &cfg);
        assert_eq!(a, b);
        assert_eq!(a.found, 200);
        assert_eq!(a.buckets.iter().sum::<usize>() + a.overflow, 200);
        assert!(a.p50 <= a.p90 && a.p90 <= a.p99 && a.p99 <= a.max);
        assert!(a.mean <= a.max);
    }

    #[test]
    fn ungenerated_engine_finds_nothing() {
        let e = Engine::new(Config::small(1)).unwrap();
        let s = calc_statistics(&e, &StatsCfg::default());
        assert_eq!(s.found, 0);
        assert_eq!(s.overflow, 0);
        assert_eq!(s.max, 0.0);
    }
}
