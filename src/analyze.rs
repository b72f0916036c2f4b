//! First-UIP conflict analysis and LBD bookkeeping.
use crate::clause::{ClauseDb, ClauseRef};
use crate::lit::Lit;
use crate::trail::Trail;
use crate::variables::{Reason, Variables};

/// Capacity of the fast-LBD ring buffer.
const LBD_QUEUE_CAPACITY: usize = 50;

/// Tracks recent LBD values for the (currently unused) restart/reduction hooks a fuller
/// engine would consult. Maintained as contract even though nothing in this engine acts on
/// it yet.
#[derive(Default)]
pub struct LbdTracker {
    queue: Vec<u32>,
    write_pos: usize,
    pub fast_lbd_sum: u64,
    pub slow_lbd_sum: u64,
    pub analyses: u64,
}

impl LbdTracker {
    pub fn record(&mut self, lbd: u32) {
        self.slow_lbd_sum += lbd.min(50) as u64;
        self.analyses += 1;
        if self.queue.len() < LBD_QUEUE_CAPACITY {
            self.queue.push(lbd);
            self.fast_lbd_sum += lbd as u64;
        } else {
            let pos = self.write_pos % LBD_QUEUE_CAPACITY;
            self.fast_lbd_sum -= self.queue[pos] as u64;
            self.queue[pos] = lbd;
            self.fast_lbd_sum += lbd as u64;
        }
        self.write_pos += 1;
    }
}

/// Outcome of a successful conflict analysis.
pub struct Analysis {
    pub learnt: Vec<Lit>,
    pub backtrack_level: u32,
    pub lbd: u32,
}

/// Analyzes a conflict found at clause `conflict`, producing a learnt clause via
/// resolution back to the first unique implication point.
///
/// Returns `None` if the conflict's highest decision level is 0 — the caller reports
/// unsatisfiability in that case rather than trying to construct a backtrack target.
pub fn analyze(
    conflict: ClauseRef,
    trail: &Trail,
    vars: &mut Variables,
    clauses: &ClauseDb,
    time_stamp: &mut u64,
) -> Option<Analysis> {
    *time_stamp += 1;
    let stamp = *time_stamp;

    let conflict_lits = clauses.clause(conflict).lits().to_vec();
    let highest_level = vars.level(conflict_lits[0].var());
    if highest_level == 0 {
        return None;
    }

    let mut learnt: Vec<Lit> = vec![conflict_lits[0]];
    let mut should_visit_ct: i64 = 0;
    let mut resolve_lit: Option<Lit> = None;
    let mut index = trail.len();
    let mut current: Vec<Lit> = conflict_lits;

    loop {
        let start = if resolve_lit.is_some() { 1 } else { 0 };
        for &l in &current[start..] {
            let v = l.var();
            if vars.mark(v) != stamp && vars.level(v) > 0 {
                vars.set_mark(v, stamp);
                if vars.level(v) >= highest_level {
                    should_visit_ct += 1;
                } else {
                    learnt.push(l);
                }
            }
        }

        loop {
            index -= 1;
            let l = trail.trail()[index];
            let v = l.var();
            if vars.mark(v) == stamp && vars.level(v) == highest_level {
                resolve_lit = Some(l);
                break;
            }
        }
        let v = resolve_lit.unwrap().var();
        vars.set_mark(v, stamp - 1);
        should_visit_ct -= 1;

        if should_visit_ct == 0 {
            break;
        }

        match vars.reason(v) {
            Reason::Clause(cref) => {
                current = clauses.clause(cref).lits().to_vec();
            }
            Reason::Decision | Reason::TopLevelUnit => {
                unreachable!("a variable still under resolution must have a clausal reason")
            }
        }
    }

    let uip = !resolve_lit.unwrap();
    learnt[0] = uip;

    let backtrack_level = if learnt.len() == 1 {
        0
    } else {
        let mut max_pos = 1;
        let mut max_level = vars.level(learnt[1].var());
        for i in 2..learnt.len() {
            let lvl = vars.level(learnt[i].var());
            if lvl > max_level {
                max_level = lvl;
                max_pos = i;
            }
        }
        learnt.swap(1, max_pos);
        max_level
    };

    let lbd = compute_lbd(&learnt, vars, time_stamp);

    Some(Analysis { learnt, backtrack_level, lbd })
}

fn compute_lbd(lits: &[Lit], vars: &mut Variables, time_stamp: &mut u64) -> u32 {
    *time_stamp += 1;
    let stamp = *time_stamp;
    let mut count = 0;
    for &l in lits {
        let level = vars.level(l.var()) as usize;
        if level > 0 && vars.mark_raw(level) != stamp {
            vars.set_mark_raw(level, stamp);
            count += 1;
        }
    }
    count
}
