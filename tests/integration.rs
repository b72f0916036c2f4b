//! Drives the public `parse` / `solve_limited` / accessor surface end to end, exactly as an
//! external caller would: through a WCNF-formatted string, never touching engine internals.
use proptest::prelude::*;
use rand::Rng;

use isingsat::engine::{self, Engine};
use isingsat::wcnf;

fn solve(wcnf_text: &str) -> (Engine, i32) {
    let mut engine = Engine::default();
    let parse_result = wcnf::parse_reader(&mut engine, wcnf_text.as_bytes()).unwrap();
    if parse_result == engine::UNSAT {
        return (engine, engine::UNSAT);
    }
    let result = engine.solve_limited();
    (engine, result)
}

fn clause_satisfied(clause: &[i32], model: &[i8]) -> bool {
    clause.iter().any(|&l| {
        let v = (l.unsigned_abs() - 1) as usize;
        (l > 0) == (model[v] == 1)
    })
}

#[test]
fn scenario_1_single_positive_unit_is_sat() {
    let (engine, result) = solve("p wcnf 1 1 2\n2 1 0\n");
    assert_eq!(result, engine::SAT);
    assert_eq!(engine.get_model(), vec![1]);
}

#[test]
fn scenario_2_contradicting_units_is_unsat_at_parse() {
    let (_, result) = solve("p wcnf 1 2 2\n2 1 0\n2 -1 0\n");
    assert_eq!(result, engine::UNSAT);
}

#[test]
fn scenario_3_three_clause_formula_is_sat_and_satisfies_all_clauses() {
    let (engine, result) = solve("p wcnf 3 3 5\n5 1 2 0\n5 -1 3 0\n5 -2 -3 0\n");
    assert_eq!(result, engine::SAT);
    let model = engine.get_model();
    for clause in engine.get_hard_clause() {
        assert!(clause_satisfied(&clause, &model), "clause {:?} unsatisfied by {:?}", clause, model);
    }
}

#[test]
fn scenario_4_soft_clause_is_stored_but_not_enforced() {
    let (engine, result) = solve("p wcnf 2 2 10\n10 1 2 0\n3 -1 -2 0\n");
    assert_eq!(result, engine::SAT);
    assert_eq!(engine.get_soft_clause(), vec![vec![-1, -2]]);
}

#[test]
fn scenario_5_from_ising_steers_first_decision() {
    let mut engine = Engine::default();
    wcnf::parse_reader(&mut engine, "p wcnf 3 3 5\n5 1 2 0\n5 -1 3 0\n5 -2 -3 0\n".as_bytes())
        .unwrap();
    engine.from_ising(&[-10.0, 0.0, 0.0]);
    assert_eq!(engine.solve_limited(), engine::SAT);
    assert_eq!(engine.get_model()[0], 1);
}

#[test]
fn scenario_6_high_threshold_traps_on_first_decision() {
    let mut engine = Engine::default();
    wcnf::parse_reader(&mut engine, "p wcnf 3 3 5\n5 1 2 0\n5 -1 3 0\n5 -2 -3 0\n".as_bytes())
        .unwrap();
    engine.set_threshold(1e9);
    assert_eq!(engine.solve_limited(), engine::TRAPPED);
}

#[test]
fn pigeonhole_two_into_one_is_unsat() {
    // Two pigeons (1, 2), one hole: each pigeon must be in the hole, but not both.
    let wcnf = "p wcnf 2 3 2\n2 1 0\n2 2 0\n2 -1 -2 0\n";
    let (_, result) = solve(wcnf);
    assert_eq!(result, engine::UNSAT);
}

#[test]
fn pigeonhole_three_into_two_is_unsat() {
    // Variables: pigeon p in hole h -> var = p * 2 + h + 1, p in 0..3, h in 0..2.
    let var = |p: usize, h: usize| (p * 2 + h + 1) as i32;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    for p in 0..3 {
        clauses.push(vec![var(p, 0), var(p, 1)]);
    }
    for h in 0..2 {
        for p1 in 0..3 {
            for p2 in (p1 + 1)..3 {
                clauses.push(vec![-var(p1, h), -var(p2, h)]);
            }
        }
    }
    let wcnf = render_wcnf(6, &clauses, &[]);
    let (_, result) = solve(&wcnf);
    assert_eq!(result, engine::UNSAT);
}

fn render_wcnf(var_count: usize, hard: &[Vec<i32>], soft: &[Vec<i32>]) -> String {
    let top = 1000;
    let mut text = format!("p wcnf {} {} {}\n", var_count, hard.len() + soft.len(), top);
    for clause in hard {
        text.push_str(&top.to_string());
        for lit in clause {
            text.push(' ');
            text.push_str(&lit.to_string());
        }
        text.push_str(" 0\n");
    }
    for clause in soft {
        text.push('1');
        for lit in clause {
            text.push(' ');
            text.push_str(&lit.to_string());
        }
        text.push_str(" 0\n");
    }
    text
}

/// Builds a satisfiable formula from a random full assignment, then generates only clauses
/// compatible with it, following the same idea as this corpus's solver-level satisfiable
/// instance generator: pick an assignment first, then clauses that can't contradict it.
fn compatible_clause(
    assignment: &[bool],
    rng: &mut impl rand::Rng,
    density: f64,
) -> Vec<i32> {
    use rand::seq::SliceRandom;
    let fixed = rng.gen_range(0, assignment.len());
    let mut clause = vec![lit_for(fixed, assignment[fixed])];
    for (idx, &value) in assignment.iter().enumerate() {
        if idx != fixed && rng.gen_bool(density) {
            clause.push(lit_for(idx, value));
        }
    }
    clause.shuffle(rng);
    clause
}

fn lit_for(index: usize, true_in_assignment: bool) -> i32 {
    let v = (index + 1) as i32;
    if true_in_assignment {
        v
    } else {
        -v
    }
}

proptest! {
    #[test]
    fn random_satisfiable_formula_is_solved_and_verified(
        var_count in 2usize..8,
        clause_count in 1usize..20,
        seed in any::<u64>(),
    ) {
        use rand::{rngs::StdRng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(seed);
        let assignment: Vec<bool> = (0..var_count).map(|_| rng.gen_bool(0.5)).collect();

        let clauses: Vec<Vec<i32>> =
            (0..clause_count).map(|_| compatible_clause(&assignment, &mut rng, 0.4)).collect();

        let wcnf = render_wcnf(var_count, &clauses, &[]);
        let (engine, result) = solve(&wcnf);

        prop_assert_eq!(result, engine::SAT);
        let model = engine.get_model();
        for clause in &clauses {
            prop_assert!(clause_satisfied(clause, &model));
        }
    }

    #[test]
    fn from_ising_is_idempotent_on_activity_and_phase(
        var_count in 1usize..6,
        raw in proptest::collection::vec(-100.0f64..100.0, 1..6),
    ) {
        prop_assume!(raw.len() >= var_count);
        let hint = &raw[..var_count];

        let mut engine = Engine::default();
        engine.set_var_count(var_count);
        engine.from_ising(hint);
        let first = engine.get_activity();
        engine.from_ising(hint);
        let second = engine.get_activity();
        prop_assert_eq!(first, second);
    }
}
