//! Boolean constraint propagation over the two-watched-literal scheme.
use crate::clause::{ClauseDb, ClauseRef};
use crate::lit::Lit;
use crate::trail::Trail;
use crate::variables::{Reason, Variables};
use crate::watch::{Watcher, Watchlists};

/// Sweeps the trail from its `propagated` cursor to the end, applying unit propagation
/// through the watch index. Returns the conflicting clause, if any.
///
/// On conflict, the watch list under examination at the time is left with its unread tail
/// untouched, matching the pre-conflict state a resumed sweep would have seen.
pub fn propagate(
    trail: &mut Trail,
    vars: &mut Variables,
    clauses: &mut ClauseDb,
    watches: &mut Watchlists,
) -> Option<ClauseRef> {
    while let Some(p) = trail.next_to_propagate() {
        if let Some(conflict) = propagate_lit(p, trail, vars, clauses, watches) {
            return Some(conflict);
        }
    }
    None
}

fn propagate_lit(
    p: Lit,
    trail: &mut Trail,
    vars: &mut Variables,
    clauses: &mut ClauseDb,
    watches: &mut Watchlists,
) -> Option<ClauseRef> {
    let level = trail.current_level() as u32;
    let watchers = watches.take_watchers(p);
    let mut kept: Vec<Watcher> = Vec::with_capacity(watchers.len());
    let mut conflict = None;

    let mut iter = watchers.into_iter();
    while let Some(w) = iter.next() {
        if vars.value_of_lit(w.blocker) == 1 {
            kept.push(w);
            continue;
        }

        let c = clauses.clause_mut(w.cref);
        {
            let lits = c.lits_mut();
            if lits[0] == !p {
                lits.swap(0, 1);
            }
        }
        let new_watcher = Watcher { cref: w.cref, blocker: c.lits()[0] };

        if vars.value_of_lit(new_watcher.blocker) == 1 {
            kept.push(new_watcher);
            continue;
        }

        let len = c.len();
        let mut moved = false;
        for k in 2..len {
            if vars.value_of_lit(c.lits()[k]) != -1 {
                c.lits_mut().swap(1, k);
                let new_watch_lit = c.lits()[1];
                watches.add_watcher(!new_watch_lit, new_watcher);
                moved = true;
                break;
            }
        }
        if moved {
            continue;
        }

        kept.push(new_watcher);
        if vars.value_of_lit(c.lits()[0]) == -1 {
            // Conflict: preserve the remainder of this list verbatim.
            for rest in iter {
                kept.push(rest);
            }
            conflict = Some(w.cref);
            break;
        } else {
            let unit_lit = c.lits()[0];
            vars.assign(unit_lit, level, Reason::Clause(w.cref));
            trail.push(unit_lit);
        }
    }

    watches.set_watchers(p, kept);
    conflict
}
