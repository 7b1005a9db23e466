//! Text and JSON rendering of search results and their fold orders.

use foldref::api::{Construct, ConstructId, Engine, Geometry, Match, Recipe, Sequence};
use serde::Serialize;

/// Geometry as plain numbers.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    Mark { x: f64, y: f64 },
    Line { d: f64, ux: f64, uy: f64 },
}

impl From<Geometry> for Value {
    fn from(g: Geometry) -> Self {
        match g {
            Geometry::Mark(p) => Value::Mark { x: p.x, y: p.y },
            Geometry::Line(l) => Value::Line {
                d: l.d,
                ux: l.u.x,
                uy: l.u.y,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub label: String,
    pub rank: u32,
    pub how: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub id: usize,
    pub rank: u32,
    pub error: f64,
    pub folds: usize,
    pub value: Value,
    pub steps: Vec<StepReport>,
}

/// Name of a construct inside a sequence: original name or ordinal.
fn label(engine: &Engine, seq: &Sequence, id: ConstructId) -> String {
    match engine.construct(id) {
        Some(c) if c.recipe.is_original() => c.recipe.original_name().unwrap_or("sheet").to_string(),
        _ => seq
            .ordinal_of(id)
            .map(|o| o.to_string())
            .unwrap_or_else(|| id.to_string()),
    }
}

/// One instruction, with prerequisites named by their labels.
fn how(engine: &Engine, seq: &Sequence, c: &Construct) -> String {
    let l = |id| label(engine, seq, id);
    match c.recipe {
        Recipe::OriginalMark { .. } | Recipe::OriginalLine { .. } => "given".to_string(),
        Recipe::Intersection { l1, l2 } => format!("crossing of {} and {}", l(l1), l(l2)),
        Recipe::ThroughPoints { p1, p2 } => format!("fold through {} and {}", l(p1), l(p2)),
        Recipe::PointToPoint { p1, p2 } => format!("bring {} to {}", l(p1), l(p2)),
        Recipe::LineToLine { l1, l2, .. } => format!("bring {} onto {}", l(l1), l(l2)),
        Recipe::PerpendicularThrough { l: ln, p } => {
            format!("fold {} onto itself through {}", l(ln), l(p))
        }
        Recipe::PointToLineThroughPoint { p1, l: ln, p2, .. } => {
            format!("bring {} onto {}, creasing through {}", l(p1), l(ln), l(p2))
        }
        Recipe::PointsToLines { p1, l1, p2, l2, .. } => format!(
            "bring {} onto {} and {} onto {}",
            l(p1),
            l(l1),
            l(p2),
            l(l2)
        ),
        Recipe::PointToLinePerpendicular { p, l1, l2 } => format!(
            "bring {} onto {}, folding {} onto itself",
            l(p),
            l(l1),
            l(l2)
        ),
    }
}

pub fn report(engine: &Engine, m: &Match) -> Option<MatchReport> {
    let c = engine.construct(m.id)?;
    let seq = engine.sequence(m.id)?;
    let steps = seq
        .steps
        .iter()
        .filter(|s| s.ordinal.is_some())
        .filter_map(|s| {
            let sc = engine.construct(s.id)?;
            let axiom = sc.recipe.axiom().map(|a| format!("{a}: ")).unwrap_or_default();
            Some(StepReport {
                label: label(engine, &seq, s.id),
                rank: sc.rank,
                how: format!("{axiom}{}", how(engine, &seq, sc)),
                value: sc.geometry.into(),
            })
        })
        .collect();
    Some(MatchReport {
        id: m.id.0,
        rank: m.rank,
        error: m.error,
        folds: seq.fold_count(engine.constructs()),
        value: c.geometry.into(),
        steps,
    })
}

fn value_text(v: &Value) -> String {
    match *v {
        Value::Mark { x, y } => format!("({x:.4}, {y:.4})"),
        Value::Line { d, ux, uy } => format!("{ux:.4}·x + {uy:.4}·y = {d:.4}"),
    }
}

pub fn render_text(reports: &[MatchReport]) -> String {
    let mut out = String::new();
    for (k, r) in reports.iter().enumerate() {
        out.push_str(&format!(
            "#{} {}  error {:.6}  rank {}  folds {}\n",
            k + 1,
            value_text(&r.value),
            r.error,
            r.rank,
            r.folds
        ));
        for s in &r.steps {
            out.push_str(&format!("    {:>3}  {}  -> {}\n", s.label, s.how, value_text(&s.value)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldref::api::{Axiom, Axioms, Config};
    use nalgebra::vector;

    #[test]
    fn center_report_names_its_steps() {
        let mut e = Engine::new(Config {
            use_diagonals: false,
            axioms: Axioms::only(&[Axiom::O2]),
            ..Config::small(2)
        })
        .unwrap();
        e.generate();
        let best = e.find_best_marks(vector![0.5, 0.5], 1);
        let r = report(&e, &best[0]).unwrap();
        assert_eq!(r.folds, 2);
        // two folds and the crossing mark
        assert_eq!(r.steps.len(), 3);
        assert_eq!(r.steps[0].label, "L1");
        assert!(r.steps[0].how.starts_with("O2: bring bottom left corner to"));
        assert_eq!(r.steps[2].label, "A");
        assert!(r.steps[2].how.contains("crossing of L1 and L2"));
        let text = render_text(&[r]);
        assert!(text.starts_with("#1 (0.5000, 0.5000)"));
    }
}
