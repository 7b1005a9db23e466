//! Fold order reconstruction.
//!
//! A sequence lists a construct after all of its prerequisites, each
//! construct once. Non-original steps get an ordinal label: lines are
//! numbered `L1, L2, …` and marks lettered `A, B, …` in the order they are
//! made, so a printed recipe can refer back to earlier steps.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::types::{Construct, ConstructId};

/// Per-sequence label of a made construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Ordinal {
    Line(u32),
    Mark(u32),
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Ordinal::Line(n) => write!(f, "L{}", n + 1),
            Ordinal::Mark(n) => write!(f, "{}", mark_label(n)),
        }
    }
}

/// `A..Z`, then `AA, AB, …`.
fn mark_label(mut n: u32) -> String {
    let mut s = Vec::new();
    loop {
        s.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    s.reverse();
    String::from_utf8_lossy(&s).into_owned()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: ConstructId,
    /// None for originals.
    pub ordinal: Option<Ordinal>,
}

/// Constructs in fold order, producers before consumers.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Sequence {
    pub steps: Vec<Step>,
}

impl Sequence {
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ConstructId> + '_ {
        self.steps.iter().map(|s| s.id)
    }

    /// Label of a construct within this sequence.
    pub fn ordinal_of(&self, id: ConstructId) -> Option<Ordinal> {
        self.steps.iter().find(|s| s.id == id)?.ordinal
    }

    /// Steps that take an actual fold (intersections and originals excluded).
    pub fn fold_count(&self, arena: &[Construct]) -> usize {
        self.steps
            .iter()
            .filter_map(|s| arena.get(s.id.0))
            .filter(|c| c.recipe.axiom().is_some())
            .count()
    }

    /// Every step follows its prerequisites and appears once.
    pub fn is_topological(&self, arena: &[Construct]) -> bool {
        let mut seen = HashSet::new();
        for s in &self.steps {
            let Some(c) = arena.get(s.id.0) else {
                return false;
            };
            if !c.recipe.prerequisites().all(|p| seen.contains(&p)) {
                return false;
            }
            if !seen.insert(s.id) {
                return false;
            }
        }
        true
    }
}

/// Fold order that ends in `target`; None if `target` is not in the arena.
pub fn build_sequence(arena: &[Construct], target: ConstructId) -> Option<Sequence> {
    arena.get(target.0)?;
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    // explicit stack; the bool marks "prerequisites already pushed"
    let mut stack = vec![(target, false)];
    while let Some((id, expanded)) = stack.pop() {
        if seen.contains(&id) {
            continue;
        }
        if expanded {
            seen.insert(id);
            order.push(id);
            continue;
        }
        let c = arena.get(id.0)?;
        stack.push((id, true));
        let prereqs: Vec<ConstructId> = c.recipe.prerequisites().collect();
        for &p in prereqs.iter().rev() {
            if !seen.contains(&p) {
                stack.push((p, false));
            }
        }
    }
    let (mut lines, mut marks) = (0u32, 0u32);
    let steps = order
        .into_iter()
        .map(|id| {
            let c = &arena[id.0];
            let ordinal = if c.recipe.is_original() {
                None
            } else if c.geometry.is_mark() {
                marks += 1;
                Some(Ordinal::Mark(marks - 1))
            } else {
                lines += 1;
                Some(Ordinal::Line(lines - 1))
            };
            Step { id, ordinal }
        })
        .collect();
    Some(Sequence { steps })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_labels_roll_over() {
        assert_eq!(mark_label(0), "A");
        assert_eq!(mark_label(25), "Z");
        assert_eq!(mark_label(26), "AA");
        assert_eq!(mark_label(27), "AB");
        assert_eq!(Ordinal::Line(0).to_string(), "L1");
    }
}
