//! Proof-outline rendering. Pretty-printing is an implementation choice of
//! the CLI, not a contract the engine depends on — nothing here feeds back
//! into verification.

use std::fmt::Write as _;

use rgverify_ast::{visit_order, Program};
use rgverify_engine::RunOutcome;
use serde::Serialize;

/// Renders every thread's proof outline: each statement preceded by its
/// current precondition in braces, followed by its numbered pretty-printed
/// form, ending with the thread's final (`Eof`) precondition.
pub fn render_proof_outline(program: &Program) -> String {
    let mut out = String::new();
    for thread in &program.threads {
        let _ = writeln!(out, "procedure {}() {{", thread.name);
        for idx in visit_order(thread) {
            let node = thread.statement(idx);
            let _ = writeln!(out, "  {{{}}}", node.pre);
            for line in node.pretty().lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        let _ = writeln!(out, "  {{{}}}", thread.eof_node().pre);
        let _ = writeln!(out, "}}");
    }
    out
}

/// Renders the derived program postcondition and final verdict line.
pub fn render_verdict(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Derived postcondition: {}", outcome.program_post);
    if outcome.success {
        let _ = writeln!(out, "Verification Successful!");
    } else {
        let _ = writeln!(out, "Verification Unsuccessful.");
    }
    out
}

/// One annotated line of a thread's proof outline, as handed to `--json`.
#[derive(Serialize)]
pub struct OutlineLine {
    pub pc: i64,
    pub precondition: String,
    pub statement: String,
}

/// One thread's full proof outline, in CFG visit order.
#[derive(Serialize)]
pub struct ThreadReport {
    pub name: String,
    pub lines: Vec<OutlineLine>,
    pub final_precondition: String,
}

/// The machine-readable shape of a completed run, emitted by `--json`.
/// Mirrors [`render_proof_outline`]/[`render_verdict`]'s human-readable
/// rendering field-for-field, so neither output can drift from the other.
#[derive(Serialize)]
pub struct VerificationReport {
    pub rounds: usize,
    pub threads: Vec<ThreadReport>,
    pub derived_postcondition: String,
    pub success: bool,
}

/// Builds the JSON-serialisable report for `program`/`outcome`.
pub fn build_report(program: &Program, outcome: &RunOutcome) -> VerificationReport {
    let threads = program
        .threads
        .iter()
        .map(|thread| {
            let lines = visit_order(thread)
                .into_iter()
                .map(|idx| {
                    let node = thread.statement(idx);
                    OutlineLine {
                        pc: node.pc,
                        precondition: node.pre.to_string(),
                        statement: node.pretty(),
                    }
                })
                .collect();
            ThreadReport {
                name: thread.name.clone(),
                lines,
                final_precondition: thread.eof_node().pre.to_string(),
            }
        })
        .collect();
    VerificationReport {
        rounds: outcome.rounds,
        threads,
        derived_postcondition: outcome.program_post.to_string(),
        success: outcome.success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgverify_engine::cfg_init;
    use rgverify_oracle::Z3Oracle;

    #[test]
    fn render_includes_every_thread_name() {
        let source = r#"
            precondition: x == 0
            postcondition: x == 1
            globals: x
            procedure worker() { x := x + 1; }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        let rendered = render_proof_outline(&program);
        assert!(rendered.contains("procedure worker() {"));
        assert!(rendered.contains("x := x + 1;"));
    }

    #[test]
    fn verdict_line_matches_outcome() {
        let outcome = RunOutcome { rounds: 1, program_post: rgverify_oracle::Formula::True, success: true };
        assert!(render_verdict(&outcome).contains("Verification Successful!"));
        let outcome = RunOutcome { rounds: 1, program_post: rgverify_oracle::Formula::False, success: false };
        assert!(render_verdict(&outcome).contains("Verification Unsuccessful."));
    }

    #[test]
    fn report_serialises_to_the_fields_cli_json_promises() {
        let source = r#"
            precondition: x == 0
            postcondition: x == 1
            globals: x
            procedure worker() { x := x + 1; }
        "#;
        let mut program = rgverify_parser::parse_program(source).unwrap();
        let oracle = Z3Oracle::new();
        cfg_init(&mut program, &oracle).unwrap();
        let outcome = rgverify_engine::run(&mut program, &oracle, rgverify_engine::DEFAULT_MAX_ITERATIONS).unwrap();
        let report = build_report(&program, &outcome);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"name\":\"worker\""));
        assert!(json.contains("\"success\":true"));
        assert_eq!(report.threads[0].lines.len(), 1);
    }
}
