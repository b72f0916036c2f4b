//! The solver engine: a single struct owning all state, orchestrating propagate → analyze
//! → backtrack → decide and exposing the external hint-ingest operation.
use log::{debug, trace};

use crate::analyze::{self, LbdTracker};
use crate::clause::{Clause, ClauseDb, ClauseRef};
use crate::config::SolverConfig;
use crate::decide::{self, DecideResult};
use crate::heap::ActivityHeap;
use crate::lit::{Lit, Var};
use crate::propagate;
use crate::trail::Trail;
use crate::variables::{Reason, Variables};
use crate::watch::Watchlists;

/// Result codes for [`Engine::solve_limited`], matching the documented contract.
pub const SAT: i32 = 10;
pub const UNSAT: i32 = 20;
pub const TRAPPED: i32 = 1;
pub const CONTINUE: i32 = 0;

/// The solver's entire state. Owns every arena and per-variable array directly; there is
/// no hidden process-wide state and no interior mutability.
#[derive(Default)]
pub struct Engine {
    vars: Variables,
    trail: Trail,
    clauses: ClauseDb,
    watches: Watchlists,
    heap: ActivityHeap,
    lbd: LbdTracker,
    config: SolverConfig,
    time_stamp: u64,
    var_count: usize,
    /// Set when a contradiction is detected outside of BCP, i.e. at parse time between two
    /// top-level unit facts whose watch lists would never otherwise collide.
    contradiction: bool,
}

impl Engine {
    /// Allocates state for `count` variables. Must be called once, before any clause is
    /// added.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = count;
        self.vars.set_var_count(count);
        self.watches.set_var_count(count);
        self.heap.set_var_count(count, self.vars.activity());
    }

    pub fn var_count(&self) -> usize {
        self.var_count
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.config.trap_threshold = threshold;
    }

    pub fn threshold(&self) -> f64 {
        self.config.trap_threshold
    }

    /// Appends a hard clause. For clauses of two or more literals, installs watchers on
    /// the first two positions. A unit clause has no watchers; the caller is responsible
    /// for asserting it (the parser does this immediately, per the ingest contract).
    pub fn add_clause(&mut self, lits: Vec<Lit>) -> ClauseRef {
        let cref = self.clauses.add_clause(lits);
        let clause = self.clauses.clause(cref);
        if clause.len() >= 2 {
            let watched = [clause.lits()[0], clause.lits()[1]];
            self.watches.watch_clause(cref, watched);
        }
        cref
    }

    pub fn add_soft_clause(&mut self, lits: Vec<Lit>) {
        self.clauses.add_soft_clause(lits);
    }

    pub fn mark_origin(&mut self) {
        self.clauses.mark_origin();
    }

    /// Asserts `lit` as a top-level fact, outside of the watch/BCP mechanism. Used for unit
    /// hard clauses, which carry no watchers and so can never be discovered as conflicting
    /// by propagation alone. Detects and records a contradiction if `lit`'s negation is
    /// already asserted at level 0.
    pub fn assert_top_level_unit(&mut self, lit: Lit) {
        match self.vars.value_of_lit(lit) {
            1 => {}
            -1 => self.contradiction = true,
            _ => {
                self.vars.assign(lit, 0, Reason::TopLevelUnit);
                self.trail.push(lit);
            }
        }
    }

    /// Asserts an empty hard clause's immediate contradiction.
    pub fn assert_contradiction(&mut self) {
        self.contradiction = true;
    }

    pub fn has_contradiction(&self) -> bool {
        self.contradiction
    }

    /// Low-level hook: runs BCP to fixpoint from the current trail cursor.
    pub fn propagate(&mut self) -> Option<ClauseRef> {
        propagate::propagate(&mut self.trail, &mut self.vars, &mut self.clauses, &mut self.watches)
    }

    /// Low-level hook: analyzes a conflict, returning the learnt clause, backtrack level
    /// and LBD, or `None` if the conflict already sits at level 0 (unsatisfiable).
    pub fn analyze(&mut self, conflict: ClauseRef) -> Option<analyze::Analysis> {
        let result =
            analyze::analyze(conflict, &self.trail, &mut self.vars, &self.clauses, &mut self.time_stamp);
        if let Some(a) = &result {
            self.lbd.record(a.lbd);
        }
        result
    }

    /// Low-level hook: unwinds the trail to `level`, phase-saving and reinserting
    /// unassigned variables into the heap. A no-op if `level` was never reached.
    pub fn backtrack(&mut self, level: u32) {
        let undone = self.trail.truncate_to_level(level as usize);
        for lit in undone {
            let var = lit.var();
            self.vars.unassign(var, lit.sign() as i8);
            if !self.heap.in_heap(var) {
                self.heap.insert(var, self.vars.activity());
            }
        }
    }

    /// Low-level hook: assigns `lit` as a decision at a freshly opened decision level.
    pub fn assign_decision(&mut self, lit: Lit) {
        self.trail.new_decision_level();
        let level = self.trail.current_level() as u32;
        self.vars.assign(lit, level, Reason::Decision);
        self.trail.push(lit);
    }

    /// Runs the propagate → analyze → backtrack → decide loop until it can report one of
    /// the documented outcomes.
    pub fn solve_limited(&mut self) -> i32 {
        if self.contradiction {
            return UNSAT;
        }
        loop {
            if let Some(conflict) = self.propagate() {
                trace!("conflict in clause {}", conflict);
                match self.analyze(conflict) {
                    None => {
                        debug!("level-0 conflict, unsatisfiable");
                        return UNSAT;
                    }
                    Some(analysis) => {
                        self.backtrack(analysis.backtrack_level);
                        self.apply_learnt(analysis);
                    }
                }
            } else {
                match decide::decide(&mut self.heap, &mut self.vars, &mut self.trail, self.config.trap_threshold)
                {
                    DecideResult::Satisfied => {
                        debug!("all variables assigned, satisfiable");
                        return SAT;
                    }
                    DecideResult::Trapped => return TRAPPED,
                    DecideResult::Continue => {}
                }
            }
        }
    }

    fn apply_learnt(&mut self, analysis: analyze::Analysis) {
        let uip = analysis.learnt[0];
        if analysis.learnt.len() == 1 {
            self.vars.assign(uip, 0, Reason::TopLevelUnit);
            self.trail.push(uip);
        } else {
            let cref = self.add_clause(analysis.learnt);
            self.clauses.clause_mut(cref).set_lbd(analysis.lbd);
            let level = self.trail.current_level() as u32;
            self.vars.assign(uip, level, Reason::Clause(cref));
            self.trail.push(uip);
        }
    }

    /// Overwrites activity and saved phase from an external continuous relaxation vector.
    /// Leaves the trail and all clause/watch state untouched; safe to call mid-search.
    pub fn from_ising(&mut self, hint: &[f64]) {
        debug_assert_eq!(hint.len(), self.var_count, "hint vector length must match variable count");
        for (i, &x) in hint.iter().enumerate() {
            let var = Var::from_index((i + 1) as u32);
            self.vars.set_activity(var, x.abs());
            if !self.heap.in_heap(var) {
                self.heap.insert(var, self.vars.activity());
            }
            self.heap.update(var, self.vars.activity());
            self.vars.set_saved(var, if x < 0.0 { 1 } else { -1 });
        }
    }

    pub fn get_model(&self) -> Vec<i8> {
        (1..=self.var_count).map(|i| self.vars.value_of_var(Var::from_index(i as u32))).collect()
    }

    pub fn get_activity(&self) -> Vec<f64> {
        (1..=self.var_count).map(|i| self.vars.activity_of(Var::from_index(i as u32))).collect()
    }

    pub fn get_hard_clause(&self) -> Vec<Vec<i32>> {
        self.clauses.original_hard_clauses().iter().map(clause_to_ints).collect()
    }

    pub fn get_soft_clause(&self) -> Vec<Vec<i32>> {
        self.clauses.soft_clauses().iter().map(clause_to_ints).collect()
    }
}

fn clause_to_ints(c: &Clause) -> Vec<i32> {
    c.lits().iter().map(|l| l.to_i32()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(raw: &[i32]) -> Vec<Lit> {
        raw.iter().map(|&l| Lit::from_i32(l)).collect()
    }

    #[test]
    fn scenario_single_unit_clause_is_sat() {
        let mut engine = Engine::default();
        engine.set_var_count(1);
        engine.assert_top_level_unit(Lit::from_i32(1));
        engine.mark_origin();
        assert_eq!(engine.propagate(), None);
        assert_eq!(engine.solve_limited(), SAT);
        assert_eq!(engine.get_model(), vec![1]);
    }

    #[test]
    fn scenario_contradicting_units_is_unsat() {
        let mut engine = Engine::default();
        engine.set_var_count(1);
        engine.assert_top_level_unit(Lit::from_i32(1));
        engine.assert_top_level_unit(Lit::from_i32(-1));
        engine.mark_origin();
        assert!(engine.has_contradiction());
        assert_eq!(engine.solve_limited(), UNSAT);
    }

    #[test]
    fn scenario_three_clause_formula_is_sat() {
        let mut engine = Engine::default();
        engine.set_var_count(3);
        engine.add_clause(lits(&[1, 2]));
        engine.add_clause(lits(&[-1, 3]));
        engine.add_clause(lits(&[-2, -3]));
        engine.mark_origin();
        assert_eq!(engine.solve_limited(), SAT);

        let model = engine.get_model();
        let satisfied = |c: &[i32]| c.iter().any(|&l| {
            let v = l.unsigned_abs() as usize - 1;
            (l > 0) == (model[v] == 1)
        });
        assert!(satisfied(&[1, 2]));
        assert!(satisfied(&[-1, 3]));
        assert!(satisfied(&[-2, -3]));
    }

    #[test]
    fn soft_clause_is_stored_but_not_enforced() {
        let mut engine = Engine::default();
        engine.set_var_count(2);
        engine.add_clause(lits(&[1, 2]));
        engine.add_soft_clause(lits(&[-1, -2]));
        engine.mark_origin();
        assert_eq!(engine.solve_limited(), SAT);
        assert_eq!(engine.get_soft_clause(), vec![vec![-1, -2]]);
    }

    #[test]
    fn from_ising_biases_decision_toward_positive_literal() {
        let mut engine = Engine::default();
        engine.set_var_count(3);
        engine.add_clause(lits(&[1, 2]));
        engine.add_clause(lits(&[-1, 3]));
        engine.add_clause(lits(&[-2, -3]));
        engine.mark_origin();
        engine.from_ising(&[-10.0, 0.0, 0.0]);

        let result = decide::decide(&mut engine.heap, &mut engine.vars, &mut engine.trail, engine.config.trap_threshold);
        assert_eq!(result, DecideResult::Continue);
        assert_eq!(engine.vars.value_of_var(Var::from_index(1)), 1);
    }

    #[test]
    fn high_threshold_traps_on_first_decision() {
        let mut engine = Engine::default();
        engine.set_var_count(3);
        engine.add_clause(lits(&[1, 2]));
        engine.add_clause(lits(&[-1, 3]));
        engine.add_clause(lits(&[-2, -3]));
        engine.mark_origin();
        engine.set_threshold(1e9);
        assert_eq!(engine.solve_limited(), TRAPPED);
    }

    #[test]
    fn exhaustive_two_var_formula_forces_conflict_driven_unsat() {
        let mut engine = Engine::default();
        engine.set_var_count(2);
        engine.add_clause(lits(&[1, 2]));
        engine.add_clause(lits(&[-1, 2]));
        engine.add_clause(lits(&[1, -2]));
        engine.add_clause(lits(&[-1, -2]));
        engine.mark_origin();
        assert_eq!(engine.solve_limited(), UNSAT);
    }

    #[test]
    fn from_ising_is_idempotent() {
        let mut engine = Engine::default();
        engine.set_var_count(2);
        engine.from_ising(&[1.5, -2.0]);
        let first = engine.get_activity();
        engine.from_ising(&[1.5, -2.0]);
        let second = engine.get_activity();
        assert_eq!(first, second);
    }
}
