use super::axioms::*;
use super::*;
use nalgebra::vector;

const EPS: f64 = 1e-10;

fn horizontal(y: f64) -> Line {
    Line {
        d: y,
        u: vector![0.0, 1.0],
    }
}

fn vertical(x: f64) -> Line {
    Line {
        d: x,
        u: vector![1.0, 0.0],
    }
}

#[test]
fn line_through_and_incidence() {
    let l = Line::through(vector![0.0, 0.0], vector![1.0, 1.0], EPS).unwrap();
    assert!(l.contains(vector![0.3, 0.3], 1e-12));
    assert!((l.distance_to(vector![1.0, 0.0]) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    assert!(Line::through(vector![0.2, 0.2], vector![0.2, 0.2], EPS).is_none());
}

#[test]
fn fold_point_is_an_involution() {
    let l = Line::through(vector![0.1, 0.0], vector![0.7, 1.0], EPS).unwrap();
    let p = vector![0.9, 0.2];
    let q = l.fold_point(p);
    assert!(!points_equal(p, q, 1e-6));
    assert!(points_equal(l.fold_point(q), p, 1e-12));
    // midpoint lies on the crease
    assert!(l.contains((p + q) * 0.5, 1e-12));
}

#[test]
fn fold_line_maps_points_consistently() {
    let crease = Line::through(vector![0.0, 0.2], vector![1.0, 0.6], EPS).unwrap();
    let l = Line::through(vector![0.0, 0.9], vector![0.8, 0.0], EPS).unwrap();
    let image = crease.fold_line(&l);
    for p in [vector![0.0, 0.9], vector![0.8, 0.0], vector![0.4, 0.45]] {
        assert!(image.contains(crease.fold_point(p), 1e-12));
    }
    assert!((image.u.norm() - 1.0).abs() < 1e-12);
}

#[test]
fn equality_ignores_orientation() {
    let a = horizontal(0.25);
    let b = Line {
        d: -0.25,
        u: vector![0.0, -1.0],
    };
    assert!(a.is_equal_to(&b, EPS));
    assert!(!a.is_equal_to(&horizontal(0.26), EPS));
    assert!(a.is_parallel_to(&horizontal(0.9), EPS));
    let (ta, da) = a.canonical();
    let (tb, db) = b.canonical();
    assert!((ta - tb).abs() < 1e-12 && (da - db).abs() < 1e-12);
}

#[test]
fn intersection_and_parallel() {
    let p = vertical(0.3).intersection(&horizontal(0.7), EPS).unwrap();
    assert!(points_equal(p, vector![0.3, 0.7], 1e-12));
    assert!(vertical(0.3).intersection(&vertical(0.5), EPS).is_none());
    assert!((vertical(0.3).sine_with(&horizontal(0.1)) - 1.0).abs() < 1e-12);
}

#[test]
fn rect_bounds_and_aspect() {
    let r = Rect::bounding([vector![0.5, 0.2], vector![-0.5, 0.0], vector![0.0, 0.4]]).unwrap();
    assert!((r.width() - 1.0).abs() < 1e-12);
    assert!((r.height() - 0.4).abs() < 1e-12);
    assert!((r.aspect_ratio() - 0.4).abs() < 1e-12);
    assert!(r.encloses(vector![0.0, 0.1], 0.0));
    assert!(!r.encloses(vector![0.0, 0.41], 0.0));
    assert!(r.encloses(vector![0.0, 0.41], 0.02));
    assert!(Rect::bounding(std::iter::empty()).is_none());
}

#[test]
fn o1_o2_o4_closed_forms() {
    let a = vector![0.0, 0.0];
    let b = vector![1.0, 0.0];
    let o1 = o1_through_points(a, b, EPS).unwrap();
    assert!(o1.is_equal_to(&horizontal(0.0), EPS));
    let o2 = o2_point_to_point(a, b, EPS).unwrap();
    assert!(o2.is_equal_to(&vertical(0.5), EPS));
    assert!(points_equal(o2.fold_point(a), b, 1e-12));
    let o4 = o4_perpendicular_through(&horizontal(0.0), vector![0.25, 0.6]);
    assert!(o4.is_equal_to(&vertical(0.25), EPS));
}

#[test]
fn o3_parallel_and_crossing() {
    let mid = o3_line_to_line(&horizontal(0.0), &horizontal(1.0), EPS);
    assert_eq!(mid.len(), 1);
    assert!(mid.get(0).unwrap().is_equal_to(&horizontal(0.5), EPS));
    // opposite orientation of the second line gives the same mid-line
    let flipped = Line {
        d: -1.0,
        u: vector![0.0, -1.0],
    };
    let mid2 = o3_line_to_line(&horizontal(0.0), &flipped, EPS);
    assert!(mid2.get(0).unwrap().is_equal_to(&horizontal(0.5), EPS));
    // identical lines have no crease
    assert!(o3_line_to_line(&horizontal(0.3), &horizontal(0.3), EPS).is_empty());

    let bisectors = o3_line_to_line(&horizontal(0.0), &vertical(0.0), EPS);
    assert_eq!(bisectors.len(), 2);
    for crease in bisectors.iter() {
        let image = crease.fold_line(&horizontal(0.0));
        assert!(image.is_equal_to(&vertical(0.0), 1e-9));
    }
}

#[test]
fn o5_two_one_and_zero_solutions() {
    // circle radius 0.5 around (0.5, 0.5) hits y = 0.2 twice
    let p1 = vector![0.5, 1.0];
    let p2 = vector![0.5, 0.5];
    let two = o5_point_to_line_through_point(p1, &horizontal(0.2), p2, EPS);
    assert_eq!(two.len(), 2);
    for crease in two.iter() {
        assert!(crease.contains(p2, 1e-9));
        assert!(horizontal(0.2).contains(crease.fold_point(p1), 1e-9));
    }
    // tangent: y = 0.0 touches the circle once
    let one = o5_point_to_line_through_point(p1, &horizontal(0.0), p2, EPS);
    assert_eq!(one.len(), 1);
    // too far away
    assert!(o5_point_to_line_through_point(p1, &horizontal(-0.2), p2, EPS).is_empty());
}

#[test]
fn o6_three_real_creases() {
    let p1 = vector![0.0, 0.0];
    let l1 = horizontal(0.5);
    let p2 = vector![1.0, 1.0];
    let l2 = vertical(0.0);
    let creases = o6_points_to_lines(p1, &l1, p2, &l2, EPS);
    assert_eq!(creases.len(), 3);
    for crease in creases.iter() {
        assert!(l1.contains(crease.fold_point(p1), 1e-9));
        assert!(l2.contains(crease.fold_point(p2), 1e-9));
    }
    // the middle root lands p1 at x ≈ 0.26466
    let mid = creases.get(1).unwrap();
    assert!((mid.fold_point(p1).x - 0.264_658_290_064_419_7).abs() < 1e-9);
}

#[test]
fn o6_single_real_crease() {
    let p1 = vector![0.0, 0.0];
    let l1 = horizontal(1.0);
    let p2 = vector![1.0, 0.0];
    let l2 = vertical(0.0);
    let creases = o6_points_to_lines(p1, &l1, p2, &l2, EPS);
    assert_eq!(creases.len(), 1);
    let crease = creases.get(0).unwrap();
    assert!(l1.contains(crease.fold_point(p1), 1e-9));
    assert!(l2.contains(crease.fold_point(p2), 1e-9));
    assert!(creases.get(1).is_none());
}

#[test]
fn o6_parallel_lines_give_zero_or_two_creases() {
    let (l1, l2) = (horizontal(0.0), horizontal(1.0));
    // points 0.24 apart cannot straddle lines 1.0 apart
    let none = o6_points_to_lines(vector![0.0, 0.37], &l1, vector![0.0, 0.61], &l2, EPS);
    assert!(none.is_empty());

    let (p1, p2) = (vector![0.2, 0.9], vector![0.9, 0.1]);
    let creases = o6_points_to_lines(p1, &l1, p2, &l2, EPS);
    assert_eq!(creases.len(), 2);
    let mut landed = Vec::new();
    for crease in creases.iter() {
        assert!(l1.contains(crease.fold_point(p1), 1e-9));
        assert!(l2.contains(crease.fold_point(p2), 1e-9));
        landed.push(crease.fold_point(p1).x);
    }
    // p1 lands at x = 0.55 ± √0.13 / 2
    landed.sort_by(f64::total_cmp);
    let half = 0.5 * 0.13f64.sqrt();
    assert!((landed[0] - (0.55 - half)).abs() < 1e-9, "{landed:?}");
    assert!((landed[1] - (0.55 + half)).abs() < 1e-9, "{landed:?}");
}

#[test]
fn o7_lands_point_and_stays_perpendicular() {
    let p = vector![0.2, 0.1];
    let l1 = horizontal(0.6);
    let l2 = Line::through(vector![0.0, 0.0], vector![1.0, 1.0], EPS).unwrap();
    let crease = o7_point_to_line_perpendicular(p, &l1, &l2, EPS).unwrap();
    assert!(l1.contains(crease.fold_point(p), 1e-12));
    assert!(crease.u.dot(&l2.u).abs() < 1e-12);
    // creases perpendicular to a horizontal l2 cannot carry p onto another horizontal
    assert!(o7_point_to_line_perpendicular(p, &horizontal(0.6), &horizontal(0.0), EPS).is_none());
    // p already on l1: the fold would not move it
    assert!(o7_point_to_line_perpendicular(vector![0.2, 0.6], &l1, &l2, EPS).is_none());
}
