//! Decision procedure: picks the next branching variable by activity, subject to the trap
//! threshold, and applies phase saving.
use crate::heap::ActivityHeap;
use crate::lit::Lit;
use crate::trail::Trail;
use crate::variables::{Reason, Variables};

/// Result of a call to [`decide`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DecideResult {
    /// A new decision was made; the caller should keep searching.
    Continue,
    /// The most important remaining variable falls at or below the trap threshold;
    /// control returns to the external driver.
    Trapped,
    /// Every variable is assigned: the formula is satisfied.
    Satisfied,
}

/// Pops the heap until an unassigned variable surfaces, then either opens a new decision
/// level and assigns it by saved phase, or reports a trap if its activity is too low.
pub fn decide(
    heap: &mut ActivityHeap,
    vars: &mut Variables,
    trail: &mut Trail,
    threshold: f64,
) -> DecideResult {
    let var = loop {
        match heap.pop(vars.activity()) {
            None => return DecideResult::Satisfied,
            Some(v) => {
                if vars.value_of_var(v) == 0 {
                    break v;
                }
                // Stale heap entry left behind by backtracking; already assigned, skip it.
            }
        }
    };

    if vars.activity_of(var) <= threshold {
        heap.insert(var, vars.activity());
        return DecideResult::Trapped;
    }

    trail.new_decision_level();
    let level = trail.current_level() as u32;
    let negative = vars.saved(var) < 0;
    let lit = Lit::from_var(var, negative);
    vars.assign(lit, level, Reason::Decision);
    trail.push(lit);

    DecideResult::Continue
}
