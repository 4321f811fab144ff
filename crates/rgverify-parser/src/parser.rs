//! Recursive-descent parser for the program grammar in `SPEC_FULL.md` §6:
//!
//! ```text
//! precondition: <formula>
//! postcondition: <formula>
//! globals: <var>*
//! procedure <name>() { <stmt>* } …
//! ```
//!
//! # Architecture
//!
//! 1. [`crate::lexer::tokenize`] turns the source text into a flat token
//!    stream, each token carrying its [`Span`].
//! 2. [`Parser`] consumes that stream with one function per grammar
//!    production: [`Parser::parse_program`] at the top, down through
//!    statements, to a standard precedence-climbing expression parser for
//!    formulas (`==>` lowest, then `||`, `&&`, unary `!`, then a single
//!    comparison over two [`ArithTerm`]s) and arithmetic (`+ -` then `* /`
//!    then unary `-`).
//! 3. Every statement is pushed directly into its owning
//!    [`Thread`](rgverify_ast::Thread)'s flat storage as it is parsed, so the
//!    resulting [`Program`](rgverify_ast::Program) already has the shape
//!    `rgverify-engine`'s CFG initialiser expects — just without PCs,
//!    interference sets, or reachable-PC formulas populated yet.
//!
//! Variable names become [`Symbol`]s via `Symbol::new` at the point they are
//! read; nothing here tries to resolve a name to "the" declared symbol it
//! refers to, since `Symbol` equality already coincides with name equality
//! for every symbol this workspace ever constructs (see `rgverify_oracle`'s
//! `Symbol` doc comment).

use std::collections::HashSet;

use rgverify_ast::{Program, StatementKind, StmtIdx, Thread};
use rgverify_base::{Result as ParseResult, Span, SpannedError};
use rgverify_oracle::{ArithTerm, CmpOp, Formula, Symbol};

use crate::lexer::{tokenize, Token, TokenKind};

/// Parses a complete program from source text.
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let tokens = tokenize(source).map_err(|span| SpannedError::new("unrecognised character", span))?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> SpannedError {
        SpannedError::new(format!("expected {what}, found {:?}", self.peek().kind), self.peek().span)
    }

    /// Consumes an identifier equal to `word` (a contextual keyword: this
    /// grammar has no reserved words beyond what appears literally in the
    /// fixed program shape, so `precondition`/`globals`/`procedure`/etc. are
    /// recognised by spelling, not by a distinct token kind).
    fn expect_keyword(&mut self, word: &str) -> ParseResult<Span> {
        match &self.peek().kind {
            TokenKind::Ident(name) if name == word => {
                let span = self.peek().span;
                self.advance();
                Ok(span)
            }
            _ => Err(self.unexpected(&format!("'{word}'"))),
        }
    }

    fn parse_ident(&mut self) -> ParseResult<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect_keyword("precondition")?;
        self.expect(TokenKind::Colon, "':'")?;
        let precondition = self.parse_formula()?;

        self.expect_keyword("postcondition")?;
        self.expect(TokenKind::Colon, "':'")?;
        let postcondition = self.parse_formula()?;

        self.expect_keyword("globals")?;
        self.expect(TokenKind::Colon, "':'")?;
        let globals = self.parse_global_list()?;

        let mut threads = Vec::new();
        let mut thread_id = 1usize;
        while !self.at_eof() {
            threads.push(self.parse_procedure(thread_id)?);
            thread_id += 1;
        }
        if threads.is_empty() {
            return Err(SpannedError::new("program declares no procedures", self.peek().span));
        }

        Ok(Program { precondition, postcondition, globals, threads })
    }

    /// `globals: <var>*`, a possibly-empty list of identifiers (comma or
    /// whitespace separated — both read identically once tokenised) ending
    /// where the next `procedure` keyword begins.
    fn parse_global_list(&mut self) -> ParseResult<HashSet<Symbol>> {
        let mut seen_names = HashSet::new();
        let mut globals = HashSet::new();
        loop {
            match &self.peek().kind {
                TokenKind::Ident(name) if name == "procedure" => break,
                TokenKind::Ident(name) => {
                    let name = name.clone();
                    let span = self.peek().span;
                    if !seen_names.insert(name.clone()) {
                        return Err(SpannedError::new(format!("global '{name}' declared more than once"), span));
                    }
                    globals.insert(Symbol::new(name));
                    self.advance();
                    if self.check(&TokenKind::Comma) {
                        self.advance();
                    }
                }
                _ => return Err(self.unexpected("a global variable name or 'procedure'")),
            }
        }
        Ok(globals)
    }

    fn parse_procedure(&mut self, thread_id: usize) -> ParseResult<Thread> {
        self.expect_keyword("procedure")?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::LParen, "'('")?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut thread = Thread::new(name, thread_id);
        let body = self.parse_block(&mut thread)?;
        thread.body = body;

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(thread)
    }

    /// Parses statements until the next token is `}`, pushing each one into
    /// `thread`'s flat storage and returning the indices in order.
    fn parse_block(&mut self, thread: &mut Thread) -> ParseResult<Vec<StmtIdx>> {
        let mut block = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.unexpected("'}'"));
            }
            block.push(self.parse_statement(thread)?);
        }
        Ok(block)
    }

    fn parse_statement(&mut self, thread: &mut Thread) -> ParseResult<StmtIdx> {
        match &self.peek().kind {
            TokenKind::Ident(kw) if kw == "assume" => {
                self.advance();
                let cond = self.parse_formula()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(thread.push_statement(StatementKind::Assume(cond)))
            }
            TokenKind::Ident(kw) if kw == "assert" => {
                self.advance();
                let cond = self.parse_formula()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(thread.push_statement(StatementKind::Assert(cond)))
            }
            TokenKind::Ident(kw) if kw == "if" => self.parse_conditional(thread),
            TokenKind::Ident(_) => {
                let name = self.parse_ident()?;
                self.expect(TokenKind::Assign, "':='")?;
                let rhs = self.parse_arith()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(thread.push_statement(StatementKind::Assignment { lhs: Symbol::new(name), rhs }))
            }
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn parse_conditional(&mut self, thread: &mut Thread) -> ParseResult<StmtIdx> {
        self.expect_keyword("if")?;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_formula()?;
        self.expect(TokenKind::RParen, "')'")?;
        let true_brace = self.expect(TokenKind::LBrace, "'{'")?;
        let true_block = self.parse_block(thread)?;
        self.expect(TokenKind::RBrace, "'}'")?;

        let false_block = if let TokenKind::Ident(kw) = &self.peek().kind {
            if kw == "else" {
                self.advance();
                self.expect(TokenKind::LBrace, "'{'")?;
                let block = self.parse_block(thread)?;
                self.expect(TokenKind::RBrace, "'}'")?;
                block
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };

        // The reachable-PC walk (`cfg_init::last_pc_in_block`) needs a last
        // statement out of a branch the moment the *other* branch is
        // non-empty, so an empty `if` body paired with a non-empty `else`
        // has no PC to anchor the split on. Reject it here rather than
        // panicking deep in initialisation.
        if true_block.is_empty() && !false_block.is_empty() {
            return Err(SpannedError::new(
                "an 'if' branch with an 'else' clause must contain at least one statement",
                true_brace.span,
            ));
        }

        Ok(thread.push_statement(StatementKind::Conditional { cond, true_block, false_block }))
    }

    // -----------------------------------------------------------------
    // Formulas: ==>  (right-assoc, lowest)  >  ||  >  &&  >  unary !  >
    // a single comparison between two arithmetic terms  >  true/false/(..)
    // -----------------------------------------------------------------

    fn parse_formula(&mut self) -> ParseResult<Formula> {
        self.parse_implies()
    }

    fn parse_implies(&mut self) -> ParseResult<Formula> {
        let left = self.parse_or()?;
        if self.check(&TokenKind::Implies) {
            self.advance();
            let right = self.parse_implies()?;
            Ok(left.implies(right))
        } else {
            Ok(left)
        }
    }

    fn parse_or(&mut self) -> ParseResult<Formula> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = left.or(right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Formula> {
        let mut left = self.parse_not()?;
        while self.check(&TokenKind::AndAnd) {
            self.advance();
            let right = self.parse_not()?;
            left = left.and(right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Formula> {
        if self.check(&TokenKind::Bang) {
            self.advance();
            let inner = self.parse_not()?;
            Ok(inner.not())
        } else {
            self.parse_formula_atom()
        }
    }

    fn parse_formula_atom(&mut self) -> ParseResult<Formula> {
        if self.check(&TokenKind::LParen) {
            self.advance();
            let inner = self.parse_formula()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(inner);
        }
        if let TokenKind::Ident(name) = &self.peek().kind {
            if name == "true" {
                self.advance();
                return Ok(Formula::True);
            }
            if name == "false" {
                self.advance();
                return Ok(Formula::False);
            }
        }
        let lhs = self.parse_arith()?;
        let op = self.parse_cmp_op()?;
        let rhs = self.parse_arith()?;
        Ok(Formula::cmp(op, lhs, rhs))
    }

    fn parse_cmp_op(&mut self) -> ParseResult<CmpOp> {
        let op = match &self.peek().kind {
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::Le => CmpOp::Le,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::Ge => CmpOp::Ge,
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::Ne => CmpOp::Ne,
            _ => return Err(self.unexpected("a comparison operator")),
        };
        self.advance();
        Ok(op)
    }

    // -----------------------------------------------------------------
    // Arithmetic: + -  (left-assoc)  >  * /  (left-assoc)  >  unary -  >
    // int literal / variable / parenthesised expression
    // -----------------------------------------------------------------

    fn parse_arith(&mut self) -> ParseResult<ArithTerm> {
        let mut left = self.parse_term()?;
        loop {
            if self.check(&TokenKind::Plus) {
                self.advance();
                left = left.add(self.parse_term()?);
            } else if self.check(&TokenKind::Minus) {
                self.advance();
                left = left.sub(self.parse_term()?);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<ArithTerm> {
        let mut left = self.parse_unary()?;
        loop {
            if self.check(&TokenKind::Star) {
                self.advance();
                left = left.mul(self.parse_unary()?);
            } else if self.check(&TokenKind::Slash) {
                self.advance();
                left = left.div(self.parse_unary()?);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<ArithTerm> {
        if self.check(&TokenKind::Minus) {
            self.advance();
            Ok(self.parse_unary()?.neg())
        } else {
            self.parse_atom()
        }
    }

    fn parse_atom(&mut self) -> ParseResult<ArithTerm> {
        match self.peek().kind.clone() {
            TokenKind::Int(v) => {
                self.advance();
                Ok(ArithTerm::int(v))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(ArithTerm::var(Symbol::new(name)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_arith()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("a number, variable, or '('")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_thread_program() {
        let source = r#"
            precondition: x == 0
            postcondition: x == 2
            globals: x
            procedure t1() {
                x := x + 1;
                x := x + 1;
            }
        "#;
        let program = parse_program(source).unwrap();
        assert_eq!(program.threads.len(), 1);
        assert_eq!(program.threads[0].body.len(), 2);
        assert!(program.globals.contains(&Symbol::new("x")));
    }

    #[test]
    fn parses_conditional_with_else() {
        let source = r#"
            precondition: true
            postcondition: true
            globals: x
            procedure t1() {
                if (x > 0) {
                    assert x > 0;
                } else {
                    assert x <= 0;
                }
            }
        "#;
        let program = parse_program(source).unwrap();
        let thread = &program.threads[0];
        assert_eq!(thread.body.len(), 1);
        let node = thread.statement(thread.body[0]);
        match &node.kind {
            StatementKind::Conditional { true_block, false_block, .. } => {
                assert_eq!(true_block.len(), 1);
                assert_eq!(false_block.len(), 1);
            }
            other => panic!("expected Conditional, got {other:?}"),
        }
    }

    #[test]
    fn parses_conditional_without_else() {
        let source = r#"
            precondition: true
            postcondition: true
            globals:
            procedure t1() {
                if (x > 0) {
                    assume x > 0;
                }
            }
        "#;
        let program = parse_program(source).unwrap();
        let thread = &program.threads[0];
        let node = thread.statement(thread.body[0]);
        match &node.kind {
            StatementKind::Conditional { false_block, .. } => assert!(false_block.is_empty()),
            other => panic!("expected Conditional, got {other:?}"),
        }
    }

    #[test]
    fn parses_two_threads() {
        let source = r#"
            precondition: true
            postcondition: a == 1 && b == 1
            globals:
            procedure t1() { a := 1; }
            procedure t2() { b := 1; }
        "#;
        let program = parse_program(source).unwrap();
        assert_eq!(program.threads.len(), 2);
        assert_eq!(program.threads[0].name, "t1");
        assert_eq!(program.threads[1].name, "t2");
    }

    #[test]
    fn operator_precedence_matches_grammar() {
        // a + b * c should parse as a + (b * c)
        let source = r#"
            precondition: true
            postcondition: true
            globals: a, b, c, x
            procedure t1() {
                x := a + b * c;
            }
        "#;
        let program = parse_program(source).unwrap();
        let thread = &program.threads[0];
        let node = thread.statement(thread.body[0]);
        match &node.kind {
            StatementKind::Assignment { rhs, .. } => {
                assert_eq!(rhs.to_string(), "(a + (b * c))");
            }
            other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_global_declaration() {
        let source = r#"
            precondition: true
            postcondition: true
            globals: x, x
            procedure t1() { x := 1; }
        "#;
        assert!(parse_program(source).is_err());
    }

    #[test]
    fn rejects_missing_semicolon() {
        let source = r#"
            precondition: true
            postcondition: true
            globals: x
            procedure t1() { x := 1 }
        "#;
        assert!(parse_program(source).is_err());
    }

    #[test]
    fn rejects_program_with_no_procedures() {
        let source = "precondition: true\npostcondition: true\nglobals:\n";
        assert!(parse_program(source).is_err());
    }

    #[test]
    fn rejects_empty_true_block_with_non_empty_else() {
        // An empty `if` body paired with a non-empty `else` has no PC for
        // the reachable-PC walk to anchor the true branch on; this must be
        // rejected at parse time rather than panic in `cfg_init`.
        let source = r#"
            precondition: true
            postcondition: true
            globals: x
            procedure t1() {
                if (x > 0) {
                } else {
                    x := 1;
                }
            }
        "#;
        assert!(parse_program(source).is_err());
    }

    #[test]
    fn accepts_empty_false_block_after_explicit_else() {
        let source = r#"
            precondition: true
            postcondition: true
            globals: x
            procedure t1() {
                if (x > 0) {
                    x := 1;
                } else {
                }
            }
        "#;
        let program = parse_program(source).unwrap();
        let thread = &program.threads[0];
        let node = thread.statement(thread.body[0]);
        match &node.kind {
            StatementKind::Conditional { true_block, false_block, .. } => {
                assert_eq!(true_block.len(), 1);
                assert!(false_block.is_empty());
            }
            other => panic!("expected Conditional, got {other:?}"),
        }
    }
}
