//! The trail and decision-level index.
use crate::lit::Lit;

/// Assignment history and decision-level boundaries.
///
/// `pos_in_trail[d]` is the trail length at the moment decision level `d + 1` opened: the
/// prefix `trail[..pos_in_trail[d]]` holds exactly the assignments at level `<= d`.
#[derive(Default)]
pub struct Trail {
    trail: Vec<Lit>,
    propagated: usize,
    pos_in_trail: Vec<usize>,
}

impl Trail {
    /// Appends `lit` to the trail. Does not touch `propagated`; the propagator consumes
    /// entries from there independently.
    pub fn push(&mut self, lit: Lit) {
        self.trail.push(lit);
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Current decision level (number of opened levels).
    pub fn current_level(&self) -> usize {
        self.pos_in_trail.len()
    }

    /// Opens a new decision level starting at the current trail length.
    pub fn new_decision_level(&mut self) {
        self.pos_in_trail.push(self.trail.len());
    }

    /// Trail length at which decision level `level` opened.
    pub fn level_start(&self, level: usize) -> Option<usize> {
        self.pos_in_trail.get(level).copied()
    }

    /// Number of literals not yet swept by the propagator.
    pub fn propagated(&self) -> usize {
        self.propagated
    }

    pub fn set_propagated(&mut self, propagated: usize) {
        self.propagated = propagated;
    }

    /// Pops the next literal to sweep, advancing the propagated cursor.
    pub fn next_to_propagate(&mut self) -> Option<Lit> {
        if self.propagated < self.trail.len() {
            let lit = self.trail[self.propagated];
            self.propagated += 1;
            Some(lit)
        } else {
            None
        }
    }

    /// Undoes all assignments above `level`, returning the undone literals in trail
    /// order (most recent last) so the caller can unassign and phase-save them. A no-op
    /// (returns an empty vec) if decision level `level` was never reached.
    pub fn truncate_to_level(&mut self, level: usize) -> Vec<Lit> {
        if level >= self.pos_in_trail.len() {
            return Vec::new();
        }
        let new_len = self.pos_in_trail[level];
        let undone = self.trail[new_len..].to_vec();
        self.trail.truncate(new_len);
        self.pos_in_trail.truncate(level);
        self.propagated = new_len;
        undone
    }
}
