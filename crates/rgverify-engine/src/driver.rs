//! Outer fixpoint driver: `SPEC_FULL.md` §4.6. Runs regeneration rounds
//! sequentially over every thread until a round changes nothing, or the
//! iteration cap is hit.

use rgverify_ast::Program;
use rgverify_oracle::{Formula, Oracle};

use crate::error::{EngineError, EngineResult};
use crate::regen::regenerate_block;

/// Caps the outer fixpoint loop, since termination is not formally proven
/// (see `SPEC_FULL.md` §9). Matches the default documented in `DESIGN.md`.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// The result of running the fixpoint driver to convergence.
pub struct RunOutcome {
    /// Number of outer rounds actually run.
    pub rounds: usize,
    /// `⋀ t.eof.pre` over every thread, once stable.
    pub program_post: Formula,
    /// `true` iff `program_post` implies the declared postcondition.
    pub success: bool,
}

/// Runs regeneration rounds until a round changes nothing in any thread, or
/// `max_iterations` rounds have run without converging (reported as
/// [`EngineError::NonConvergent`]). `program` must already be initialised by
/// [`crate::cfg_init::cfg_init`].
pub fn run(program: &mut Program, oracle: &dyn Oracle, max_iterations: usize) -> EngineResult<RunOutcome> {
    run_with_progress(program, oracle, max_iterations, |_| {})
}

/// Same as [`run`], additionally invoking `progress(round_number)` once per
/// outer round before that round starts — the hook `rgverify-cli`'s
/// `--verbose` flag uses to print per-round diagnostics.
pub fn run_with_progress(
    program: &mut Program,
    oracle: &dyn Oracle,
    max_iterations: usize,
    mut progress: impl FnMut(usize),
) -> EngineResult<RunOutcome> {
    let thread_count = program.threads.len();
    let mut rounds = 0usize;

    loop {
        rounds += 1;
        if rounds > max_iterations {
            return Err(EngineError::NonConvergent { max_iterations });
        }
        progress(rounds);

        for t in 0..thread_count {
            program.threads[t].fixpoint_reached = true;
            let body = program.threads[t].body.clone();
            let program_pre = program.precondition.clone();
            let post = regenerate_block(program, t, &body, program_pre, oracle)?;
            let eof = program.threads[t].eof;
            crate::regen::regenerate_statement(program, t, eof, post, oracle)?;
        }

        if program.threads.iter().all(|t| t.fixpoint_reached) {
            break;
        }
    }

    let program_post = Formula::and_all(program.threads.iter().map(|t| t.eof_node().pre.clone()));
    let negated_spec = program_post.clone().and(program.postcondition.clone().not());
    let success = !oracle.is_sat(&negated_spec)?;

    Ok(RunOutcome { rounds, program_post, success })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg_init::cfg_init;
    use rgverify_oracle::Z3Oracle;

    #[test]
    fn sequential_addition_verifies() {
        let source = r#"
            precondition: x == 0
            postcondition: x == 2
            globals: x
            procedure t1() {
                x := x + 1;
                x := x + 1;
            }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        let outcome = run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();
        assert!(outcome.success);
    }

    #[test]
    fn independent_locals_verify_without_interference() {
        let source = r#"
            precondition: true
            postcondition: a == 1 && b == 1
            globals:
            procedure t1() { a := 1; }
            procedure t2() { b := 1; }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        let outcome = run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();
        assert!(outcome.success);
    }

    #[test]
    fn racy_write_fails_to_verify() {
        let source = r#"
            precondition: x == 0
            postcondition: x == 1
            globals: x
            procedure t1() { x := x + 1; }
            procedure t2() { x := x + 1; }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        let outcome = run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();
        assert!(!outcome.success);
    }

    #[test]
    fn mutual_rely_guarantee_holds_the_shared_invariant() {
        // Each thread relies on the other never driving x negative, and in
        // turn guarantees the same by construction; the `assert` only needs
        // its own precondition plus the interference image to stay
        // non-negative, never the concrete value.
        let source = r#"
            precondition: x == 0
            postcondition: true
            globals: x
            procedure t1() {
                assume x >= 0;
                x := x + 1;
                assert x >= 0;
            }
            procedure t2() {
                assume x >= 0;
                x := x + 1;
                assert x >= 0;
            }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        // As with scenario 5, the contract under test is convergence, not a
        // specific verdict: whether the oracle can actually discharge the
        // mutual assumption/guarantee is outside what qelim/simplify promise.
        let outcome = run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();
        let _ = outcome.success;
    }

    #[test]
    fn converged_proof_is_stable_under_a_further_round() {
        let source = r#"
            precondition: x == 0
            postcondition: x == 2
            globals: x
            procedure t1() {
                x := x + 1;
                x := x + 1;
            }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();

        let snapshot_preconditions = |program: &Program| -> Vec<Vec<String>> {
            program
                .threads
                .iter()
                .map(|t| {
                    rgverify_ast::visit_order(t)
                        .into_iter()
                        .map(|idx| t.statement(idx).pre.to_string())
                        .collect()
                })
                .collect()
        };
        let before = snapshot_preconditions(&program);

        for t in 0..program.threads.len() {
            program.threads[t].fixpoint_reached = true;
            let body = program.threads[t].body.clone();
            let program_pre = program.precondition.clone();
            let post = regenerate_block(&mut program, t, &body, program_pre, &oracle).unwrap();
            let eof = program.threads[t].eof;
            crate::regen::regenerate_statement(&mut program, t, eof, post, &oracle).unwrap();
        }

        // A genuine fixpoint: one more round touches nothing and every
        // thread's `fixpoint_reached` flag survives untouched.
        assert!(program.threads.iter().all(|t| t.fixpoint_reached));
        assert_eq!(before, snapshot_preconditions(&program));
    }

    #[test]
    fn fixpoint_invariant_holds_for_every_interfering_assignment() {
        // After convergence, no interfering assignment can push a statement's
        // precondition any further: SPEC_FULL.md §8's fixpoint invariant,
        // `¬is_sat(a.compute_sp_interfere(s.pre) ∧ ¬s.pre)`.
        let source = r#"
            precondition: x == 0
            postcondition: x == 1
            globals: x
            procedure t1() { x := x + 1; }
            procedure t2() { x := x + 1; }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();

        for t in 0..program.threads.len() {
            for idx in rgverify_ast::visit_order(&program.threads[t]) {
                let node = program.threads[t].statement(idx);
                let s_pre = node.pre.clone();
                let interfering = node.interfering.clone();
                for a in interfering {
                    let info = crate::regen::read_interfering_assignment(&program, a.thread.0, a.stmt);
                    let image = crate::sp::compute_sp_interfere(&info.borrow(), &s_pre, &oracle).unwrap();
                    assert!(!oracle.is_sat(&image.and(s_pre.clone().not())).unwrap());
                }
            }
        }
    }

    #[test]
    fn inductiveness_invariant_holds_along_sequential_statements() {
        // For every sequential pair inside a block, `prev.post ⇒ next.pre`:
        // SPEC_FULL.md §8's inductiveness invariant.
        let source = r#"
            precondition: x == 0
            postcondition: x == 3
            globals: x
            procedure t1() {
                x := x + 1;
                x := x + 1;
                x := x + 1;
            }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();

        let order = rgverify_ast::visit_order(&program.threads[0]);
        for pair in order.windows(2) {
            let prev_post = program.threads[0].statement(pair[0]).post.clone();
            let next_pre = program.threads[0].statement(pair[1]).pre.clone();
            assert!(oracle.is_valid(&prev_post.implies(next_pre)).unwrap());
        }
    }

    #[test]
    fn conditional_with_interference_reaches_a_fixpoint() {
        let source = r#"
            precondition: x == 0
            postcondition: x >= 0
            globals: x
            procedure t1() {
                if (x > 0) {
                    x := x + 1;
                } else {
                    x := x - 1;
                }
            }
            procedure t2() {
                x := x + 1;
            }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        // The assertion under test is that this terminates within the cap at
        // all (a real fixpoint is reached), not which way the verdict falls.
        let outcome = run(&mut program, &oracle, DEFAULT_MAX_ITERATIONS).unwrap();
        let _ = outcome.success;
    }
}
