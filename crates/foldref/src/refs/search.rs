//! Best-match search over a generated store.
//!
//! Full scan, error first. Matches whose errors are indistinguishable (within
//! `eps` of the first member of their run) or all good enough form a tie
//! group ordered by rank, so a simpler construction beats a marginally more
//! accurate one. Grouping happens over an error-sorted list, which keeps the
//! final order total.

use serde::Serialize;

use crate::config::Config;
use crate::geom2::{Line, Vec2};
use crate::paper::Paper;

use super::store::{Keyed, RankedStore};
use super::types::{ConstructId, Rank};

/// One search result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Match {
    pub id: ConstructId,
    pub rank: Rank,
    pub error: f64,
}

/// Distance between a candidate line and the target, measured on the sheet.
///
/// The target is clipped to the sheet; the error is the larger (or, with
/// `worst_case = false`, the mean) distance of the clipped endpoints from the
/// candidate. A target that misses the sheet compares by its foot point.
pub fn line_error(paper: &Paper, candidate: &Line, target: &Line, worst_case: bool, eps: f64) -> f64 {
    let (a, b) = paper
        .clip_line(target, eps)
        .unwrap_or((target.foot(), target.foot()));
    let (ea, eb) = (candidate.distance_to(a), candidate.distance_to(b));
    if worst_case {
        ea.max(eb)
    } else {
        0.5 * (ea + eb)
    }
}

/// Sort by error, then reorder tie groups by rank; keep `count`.
pub fn rank_matches(mut matches: Vec<Match>, count: usize, eps: f64, good_enough: f64) -> Vec<Match> {
    if count == 0 {
        return Vec::new();
    }
    matches.sort_by(|a, b| a.error.total_cmp(&b.error).then(a.id.cmp(&b.id)));
    let mut start = 0;
    while start < matches.len() {
        let lead = matches[start].error;
        let mut end = start + 1;
        while end < matches.len() {
            let e = matches[end].error;
            let tied = e - lead < eps || (lead <= good_enough && e <= good_enough);
            if !tied {
                break;
            }
            end += 1;
        }
        matches[start..end].sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then(a.error.total_cmp(&b.error))
                .then(a.id.cmp(&b.id))
        });
        if end >= count {
            break;
        }
        start = end;
    }
    matches.truncate(count);
    matches
}

fn scan<V: Keyed>(
    store: &RankedStore<V>,
    cfg: &Config,
    count: usize,
    error: impl Fn(&V) -> f64,
) -> Vec<Match> {
    let limit = cfg.max_error.unwrap_or(f64::INFINITY);
    let matches = store
        .iter()
        .filter_map(|(rank, id, v)| {
            let e = error(&v);
            (e.is_finite() && e <= limit).then_some(Match { id, rank, error: e })
        })
        .collect();
    rank_matches(matches, count, cfg.eps, cfg.good_enough_error)
}

/// Best `count` marks for a target point.
pub fn best_marks(store: &RankedStore<Vec2>, cfg: &Config, target: Vec2, count: usize) -> Vec<Match> {
    scan(store, cfg, count, |p| (p - target).norm())
}

/// Best `count` lines for a target line.
pub fn best_lines(
    store: &RankedStore<Line>,
    paper: &Paper,
    cfg: &Config,
    target: &Line,
    count: usize,
) -> Vec<Match> {
    scan(store, cfg, count, |l| {
        line_error(paper, l, target, cfg.line_worst_case_error, cfg.eps)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn m(id: usize, rank: Rank, error: f64) -> Match {
        Match {
            id: ConstructId(id),
            rank,
            error,
        }
    }

    #[test]
    fn near_ties_prefer_lower_rank() {
        let out = rank_matches(
            vec![m(0, 5, 0.010), m(1, 2, 0.010 + 1e-12), m(2, 1, 0.5)],
            3,
            1e-8,
            0.0,
        );
        let ids: Vec<usize> = out.iter().map(|x| x.id.0).collect();
        assert_eq!(ids, vec![1, 0, 2]);
    }

    #[test]
    fn good_enough_errors_tie_on_rank() {
        let out = rank_matches(vec![m(0, 4, 0.0), m(1, 1, 0.004), m(2, 0, 0.02)], 2, 1e-8, 0.005);
        let ids: Vec<usize> = out.iter().map(|x| x.id.0).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn clear_winner_beats_rank() {
        let out = rank_matches(vec![m(0, 0, 0.3), m(1, 6, 0.01)], 1, 1e-8, 0.0);
        assert_eq!(out[0].id, ConstructId(1));
        assert!(rank_matches(vec![m(0, 0, 0.0)], 0, 1e-8, 0.0).is_empty());
    }

    #[test]
    fn line_error_uses_clipped_target() {
        let paper = Paper::new(1.0, 1.0);
        let target = Line::new(0.5, vector![1.0, 0.0]).unwrap();
        let tilted = Line::through(vector![0.5, 0.0], vector![0.6, 1.0], 1e-10).unwrap();
        let worst = line_error(&paper, &tilted, &target, true, 1e-10);
        let mean = line_error(&paper, &tilted, &target, false, 1e-10);
        let expected = tilted.distance_to(vector![0.5, 1.0]);
        assert!((worst - expected).abs() < 1e-12);
        assert!((mean - 0.5 * expected).abs() < 1e-12);
        assert!(line_error(&paper, &target, &target, true, 1e-10) < 1e-12);
    }
}
