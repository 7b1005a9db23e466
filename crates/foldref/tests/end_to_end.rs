//! End-to-end checks: generate a corpus, search it, rebuild fold orders.

use foldref::api::*;
use nalgebra::vector;

fn engine(cfg: Config) -> Engine {
    let mut e = Engine::new(cfg).expect("valid config");
    e.generate();
    e
}

/// Unit square, edges and corners only, two-fold reach.
fn square(max_rank: u32, axioms: Axioms) -> Config {
    Config {
        use_diagonals: false,
        axioms,
        good_enough_error: 0.0,
        ..Config::small(max_rank)
    }
}

#[test]
fn center_is_two_axis_aligned_o2_folds() {
    let e = engine(square(2, Axioms::only(&[Axiom::O2])));
    let best = e.find_best_marks(vector![0.5, 0.5], 3);
    assert_eq!(best[0].rank, 2);
    assert!(best[0].error < 1e-12);
    // the axis-aligned halvings exist one rank lower
    let halves = [
        Line::new(0.5, vector![1.0, 0.0]).unwrap(),
        Line::new(0.5, vector![0.0, 1.0]).unwrap(),
    ];
    for h in &halves {
        let m = e.find_best_lines(h, 1);
        assert_eq!(m[0].rank, 1);
        assert!(m[0].error < 1e-12);
        let c = e.construct(m[0].id).unwrap();
        assert_eq!(c.recipe.axiom(), Some(Axiom::O2));
    }
    let seq = e.sequence(best[0].id).unwrap();
    assert!(seq.is_topological(e.constructs()));
    assert_eq!(seq.fold_count(e.constructs()), 2);
}

#[test]
fn reachable_points_are_found_exactly() {
    let e = engine(square(2, Axioms::default()));
    let eps = e.config().eps;
    for (_, id, p) in e.marks().iter().step_by(37) {
        let best = e.find_best_marks(p, 1);
        assert!(best[0].error < eps);
        let rank = e.construct(id).unwrap().rank;
        // a tolerance-equal construct never needs more folds than the stored one
        assert!(best[0].rank <= rank);
    }
}

#[test]
fn every_result_has_a_valid_fold_order() {
    let e = engine(Config::small(2));
    let targets = [vector![0.1, 0.7], vector![0.33, 0.33], vector![0.9, 0.05]];
    for t in targets {
        let found = e.find_best_marks(t, 5);
        assert_eq!(found.len(), 5);
        assert!(found.windows(2).all(|w| w[0].error <= w[1].error + 0.005 + 1e-8));
        for m in &found {
            let seq = e.sequence(m.id).unwrap();
            assert!(seq.is_topological(e.constructs()));
            let ids: Vec<_> = seq.ids().collect();
            let mut unique = ids.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), ids.len());
            assert_eq!(ids.last(), Some(&m.id));
        }
    }
}

#[test]
fn quarter_line_takes_two_folds() {
    let e = engine(square(2, Axioms::only(&[Axiom::O1, Axiom::O2, Axiom::O4])));
    let quarter = Line::new(0.25, vector![0.0, 1.0]).unwrap();
    let best = e.find_best_lines(&quarter, 1);
    // bottom-left corner onto the midpoint of the left edge
    assert!(best[0].error < 1e-12, "{best:?}");
    assert_eq!(best[0].rank, 2);
}

#[test]
fn invalid_targets_never_reach_the_search() {
    let e = engine(square(1, Axioms::default()));
    assert_eq!(
        e.find_marks_near(1.5, 0.5, 3),
        Err(TargetError::OffSheet { x: 1.5, y: 0.5 })
    );
    assert_eq!(
        e.find_lines_near(vector![0.3, 0.3], vector![0.3, 0.3], 3),
        Err(TargetError::DegenerateLine)
    );
    let ok = e.find_lines_near(vector![0.0, 0.5], vector![1.0, 0.5], 1).unwrap();
    assert!(ok[0].error < 1e-12);
}

#[test]
fn invalid_config_is_refused() {
    let bad = Config {
        eps: 1e-3,
        key_resolution: Some(1_000),
        ..Config::default()
    };
    assert!(matches!(
        Engine::new(bad).err(),
        Some(ConfigError::KeyResolution { .. })
    ));
    let deep = Config {
        max_rank: RANK_LIMIT + 1,
        ..Config::default()
    };
    assert!(Engine::new(deep).is_err());
}

#[test]
fn messer_cube_root_of_two() {
    // Thirds of the square, then one O6 fold: the bottom-left corner lands on
    // the right edge and the left end of the lower third on the upper third.
    let paper = Paper::new(1.0, 1.0);
    let right = paper.edges[1];
    let upper = Line::new(2.0 / 3.0, vector![0.0, 1.0]).unwrap();
    let creases = o6_points_to_lines(paper.corners[0], &right, vector![0.0, 1.0 / 3.0], &upper, 1e-10);
    assert_eq!(creases.len(), 1);
    let crease = creases.get(0).unwrap();
    let landed = crease.fold_point(paper.corners[0]);
    assert!(right.contains(landed, 1e-12));
    assert!(upper.contains(crease.fold_point(vector![0.0, 1.0 / 3.0]), 1e-12));
    let ratio = (1.0 - landed.y) / landed.y;
    assert!((ratio - 2f64.cbrt()).abs() < 1e-10, "{ratio}");
    assert!(paper.interior_overlaps(&crease, 1e-10));
}

#[test]
fn config_files_round_trip() {
    let cfg = Config {
        max_rank: 4,
        axioms: Axioms::only(&[Axiom::O1, Axiom::O6]),
        max_error: Some(0.01),
        ..Config::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}
