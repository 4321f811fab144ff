//! First-order formulas over integer arithmetic.
//!
//! A [`Formula`] is the opaque predicate the rest of the workspace treats as
//! a symbolic assertion — built here, but only ever *interpreted* (checked
//! for validity/satisfiability, eliminated of quantifiers) through an
//! [`Oracle`](crate::Oracle).

use crate::symbol::Symbol;
use crate::term::ArithTerm;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A comparison operator between two [`ArithTerm`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    /// The operator obtained by negating a comparison built with this one:
    /// `!(a < b)` is `a >= b`, and so on.
    pub fn negate(self) -> CmpOp {
        match self {
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
        }
    }

    /// The operator obtained by swapping the two operands: `a < b` becomes
    /// `b > a`.
    pub fn flip_operands(self) -> CmpOp {
        match self {
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Ge => CmpOp::Le,
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::Ne => CmpOp::Ne,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        };
        f.write_str(s)
    }
}

/// A first-order formula over integer-sorted variables.
#[derive(Clone, Debug)]
pub enum Formula {
    True,
    False,
    Cmp(CmpOp, ArithTerm, ArithTerm),
    Not(Box<Formula>),
    /// `n`-ary conjunction; an empty vector is `True`.
    And(Vec<Formula>),
    /// `n`-ary disjunction; an empty vector is `False`.
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Exists(Vec<Symbol>, Box<Formula>),
    ForAll(Vec<Symbol>, Box<Formula>),
}

impl Formula {
    pub fn cmp(op: CmpOp, lhs: ArithTerm, rhs: ArithTerm) -> Formula {
        Formula::Cmp(op, lhs, rhs)
    }

    pub fn eq(lhs: ArithTerm, rhs: ArithTerm) -> Formula {
        Formula::Cmp(CmpOp::Eq, lhs, rhs)
    }

    pub fn not(self) -> Formula {
        Formula::Not(Box::new(self))
    }

    /// Flattening conjunction: nested `And`s are merged into one.
    pub fn and(self, other: Formula) -> Formula {
        let mut parts = Vec::new();
        flatten_and(self, &mut parts);
        flatten_and(other, &mut parts);
        Formula::And(parts)
    }

    pub fn and_all(parts: impl IntoIterator<Item = Formula>) -> Formula {
        let mut out = Vec::new();
        for p in parts {
            flatten_and(p, &mut out);
        }
        Formula::And(out)
    }

    /// Flattening disjunction: nested `Or`s are merged into one.
    pub fn or(self, other: Formula) -> Formula {
        let mut parts = Vec::new();
        flatten_or(self, &mut parts);
        flatten_or(other, &mut parts);
        Formula::Or(parts)
    }

    pub fn or_all(parts: impl IntoIterator<Item = Formula>) -> Formula {
        let mut out = Vec::new();
        for p in parts {
            flatten_or(p, &mut out);
        }
        Formula::Or(out)
    }

    pub fn implies(self, then: Formula) -> Formula {
        Formula::Implies(Box::new(self), Box::new(then))
    }

    pub fn exists(vars: Vec<Symbol>, body: Formula) -> Formula {
        if vars.is_empty() {
            body
        } else {
            Formula::Exists(vars, Box::new(body))
        }
    }

    pub fn forall(vars: Vec<Symbol>, body: Formula) -> Formula {
        if vars.is_empty() {
            body
        } else {
            Formula::ForAll(vars, Box::new(body))
        }
    }

    /// Free variables occurring in this formula.
    pub fn free_vars(&self) -> HashSet<Symbol> {
        let mut out = HashSet::new();
        self.collect_free_vars(&mut out);
        out
    }

    fn collect_free_vars(&self, out: &mut HashSet<Symbol>) {
        match self {
            Formula::True | Formula::False => {}
            Formula::Cmp(_, l, r) => {
                out.extend(l.free_vars());
                out.extend(r.free_vars());
            }
            Formula::Not(a) => a.collect_free_vars(out),
            Formula::And(parts) | Formula::Or(parts) => {
                for p in parts {
                    p.collect_free_vars(out);
                }
            }
            Formula::Implies(a, b) => {
                a.collect_free_vars(out);
                b.collect_free_vars(out);
            }
            Formula::Exists(vars, body) | Formula::ForAll(vars, body) => {
                let mut inner = HashSet::new();
                body.collect_free_vars(&mut inner);
                for v in vars {
                    inner.remove(v);
                }
                out.extend(inner);
            }
        }
    }

    /// `true` if this formula contains no `Exists`/`ForAll` node.
    pub fn is_quantifier_free(&self) -> bool {
        match self {
            Formula::True | Formula::False | Formula::Cmp(..) => true,
            Formula::Not(a) => a.is_quantifier_free(),
            Formula::And(parts) | Formula::Or(parts) => parts.iter().all(Formula::is_quantifier_free),
            Formula::Implies(a, b) => a.is_quantifier_free() && b.is_quantifier_free(),
            Formula::Exists(..) | Formula::ForAll(..) => false,
        }
    }

    /// Capture-free substitution of variables by terms.
    pub fn substitute(&self, subst: &HashMap<Symbol, ArithTerm>) -> Formula {
        match self {
            Formula::True => Formula::True,
            Formula::False => Formula::False,
            Formula::Cmp(op, l, r) => Formula::Cmp(*op, l.substitute(subst), r.substitute(subst)),
            Formula::Not(a) => Formula::Not(Box::new(a.substitute(subst))),
            Formula::And(parts) => Formula::And(parts.iter().map(|p| p.substitute(subst)).collect()),
            Formula::Or(parts) => Formula::Or(parts.iter().map(|p| p.substitute(subst)).collect()),
            Formula::Implies(a, b) => {
                Formula::Implies(Box::new(a.substitute(subst)), Box::new(b.substitute(subst)))
            }
            Formula::Exists(vars, body) => {
                // Capture-avoidance: bound variables are never substituted,
                // and every symbol in this system carries a globally unique
                // name (see `Symbol`'s doc comment), so no bound variable in
                // `body` can ever collide with a term being substituted in.
                let mut inner = subst.clone();
                for v in vars {
                    inner.remove(v);
                }
                Formula::Exists(vars.clone(), Box::new(body.substitute(&inner)))
            }
            Formula::ForAll(vars, body) => {
                let mut inner = subst.clone();
                for v in vars {
                    inner.remove(v);
                }
                Formula::ForAll(vars.clone(), Box::new(body.substitute(&inner)))
            }
        }
    }
}

fn flatten_and(f: Formula, out: &mut Vec<Formula>) {
    match f {
        Formula::True => {}
        Formula::And(parts) => out.extend(parts),
        other => out.push(other),
    }
}

fn flatten_or(f: Formula, out: &mut Vec<Formula>) {
    match f {
        Formula::False => {}
        Formula::Or(parts) => out.extend(parts),
        other => out.push(other),
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "true"),
            Formula::False => write!(f, "false"),
            Formula::Cmp(op, l, r) => write!(f, "{l} {op} {r}"),
            Formula::Not(a) => write!(f, "!({a})"),
            Formula::And(parts) => {
                if parts.is_empty() {
                    return write!(f, "true");
                }
                let rendered: Vec<String> = parts.iter().map(|p| format!("({p})")).collect();
                write!(f, "{}", rendered.join(" && "))
            }
            Formula::Or(parts) => {
                if parts.is_empty() {
                    return write!(f, "false");
                }
                let rendered: Vec<String> = parts.iter().map(|p| format!("({p})")).collect();
                write!(f, "{}", rendered.join(" || "))
            }
            Formula::Implies(a, b) => write!(f, "({a}) ==> ({b})"),
            Formula::Exists(vars, body) => {
                let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
                write!(f, "exists {} . ({body})", names.join(", "))
            }
            Formula::ForAll(vars, body) => {
                let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
                write!(f, "forall {} . ({body})", names.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_flattens_nested_conjunctions() {
        let a = Formula::Cmp(CmpOp::Eq, ArithTerm::int(1), ArithTerm::int(1));
        let b = Formula::Cmp(CmpOp::Eq, ArithTerm::int(2), ArithTerm::int(2));
        let c = Formula::Cmp(CmpOp::Eq, ArithTerm::int(3), ArithTerm::int(3));
        let nested = a.clone().and(b.clone());
        let flat = nested.and(c.clone());
        match flat {
            Formula::And(parts) => assert_eq!(parts.len(), 3),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn free_vars_excludes_bound_variables() {
        let x = Symbol::new("x");
        let y = Symbol::new("y");
        let body = Formula::Cmp(CmpOp::Eq, ArithTerm::var(x.clone()), ArithTerm::var(y.clone()));
        let quantified = Formula::exists(vec![y.clone()], body);
        let fv = quantified.free_vars();
        assert!(fv.contains(&x));
        assert!(!fv.contains(&y));
    }

    #[test]
    fn substitute_does_not_cross_quantifier_boundary_for_bound_name() {
        let x = Symbol::new("x");
        let y = Symbol::new("y");
        let body = Formula::Cmp(CmpOp::Eq, ArithTerm::var(x.clone()), ArithTerm::var(y.clone()));
        let quantified = Formula::exists(vec![y.clone()], body);
        let mut subst = HashMap::new();
        subst.insert(y.clone(), ArithTerm::int(5));
        let result = quantified.substitute(&subst);
        // y is bound, so the substitution for y must not reach into the body.
        assert_eq!(result.to_string(), "exists y . (x == y)");
    }
}
