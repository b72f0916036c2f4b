//! Watchlists used to detect clauses that became unit or conflicting.
//!
//! Each hard clause with two or more literals is watched by exactly two entries, kept in
//! the watchlists of the negations of its two watched literals. Every watcher carries a
//! blocking literal: another literal of the clause that, if already true, proves the
//! clause satisfied without dereferencing the clause itself. The blocker is a hint only —
//! it can go stale as the clause's other literals change, and the propagator always
//! revalidates it against the clause before trusting it past the first check.
//!
//! Indexing: literal `l` (1-based variable, signed) maps to one of two tables keyed by
//! `var(l) - 1`, selected by sign. This sidesteps the `l + V` offset arithmetic a single
//! flat table needs, at the cost of a branch on sign -- a wash either way, chosen here for
//! clarity.
use crate::clause::ClauseRef;
use crate::lit::Lit;

/// A watcher: a clause, identified by its watched literal's negation living in this list,
/// plus a blocking literal used as a satisfied-clause shortcut.
#[derive(Copy, Clone, Debug)]
pub struct Watcher {
    pub cref: ClauseRef,
    pub blocker: Lit,
}

/// Per-literal watchlists.
#[derive(Default)]
pub struct Watchlists {
    positive: Vec<Vec<Watcher>>,
    negative: Vec<Vec<Watcher>>,
}

impl Watchlists {
    pub fn set_var_count(&mut self, count: usize) {
        self.positive.resize(count + 1, Vec::new());
        self.negative.resize(count + 1, Vec::new());
    }

    fn table(&self, lit: Lit) -> &Vec<Watcher> {
        let table = if lit.is_negative() { &self.negative } else { &self.positive };
        &table[lit.var().array_index()]
    }

    fn table_mut(&mut self, lit: Lit) -> &mut Vec<Watcher> {
        let table = if lit.is_negative() { &mut self.negative } else { &mut self.positive };
        &mut table[lit.var().array_index()]
    }

    /// Literals currently watched by `lit`.
    pub fn watchers(&self, lit: Lit) -> &[Watcher] {
        self.table(lit)
    }

    /// Adds a single watcher to `lit`'s list.
    pub fn add_watcher(&mut self, lit: Lit, watcher: Watcher) {
        self.table_mut(lit).push(watcher);
    }

    /// Starts watching a clause on its first two literals, `lits[0]` and `lits[1]`.
    /// Watches live in the lists of the negations of the watched literals.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        self.add_watcher(!lits[0], Watcher { cref, blocker: lits[1] });
        self.add_watcher(!lits[1], Watcher { cref, blocker: lits[0] });
    }

    /// Replaces the watcher list for `lit` with exactly `watchers`, in order. Used by the
    /// propagator to write back a compacted list after a sweep.
    pub fn set_watchers(&mut self, lit: Lit, watchers: Vec<Watcher>) {
        *self.table_mut(lit) = watchers;
    }

    /// Takes the current watcher list for `lit`, leaving an empty list in its place. The
    /// propagator sweeps the taken list and writes a (possibly shorter) one back via
    /// [`Watchlists::set_watchers`].
    pub fn take_watchers(&mut self, lit: Lit) -> Vec<Watcher> {
        std::mem::take(self.table_mut(lit))
    }
}
