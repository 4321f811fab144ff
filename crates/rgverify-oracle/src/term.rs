//! Arithmetic terms over integer variables.

use crate::symbol::Symbol;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// An arithmetic expression over integer-sorted [`Symbol`]s.
#[derive(Clone, Debug)]
pub enum ArithTerm {
    Int(i64),
    Var(Symbol),
    Neg(Box<ArithTerm>),
    Add(Box<ArithTerm>, Box<ArithTerm>),
    Sub(Box<ArithTerm>, Box<ArithTerm>),
    Mul(Box<ArithTerm>, Box<ArithTerm>),
    Div(Box<ArithTerm>, Box<ArithTerm>),
}

impl ArithTerm {
    pub fn int(v: i64) -> Self {
        ArithTerm::Int(v)
    }

    pub fn var(s: Symbol) -> Self {
        ArithTerm::Var(s)
    }

    pub fn neg(self) -> Self {
        ArithTerm::Neg(Box::new(self))
    }

    pub fn add(self, rhs: ArithTerm) -> Self {
        ArithTerm::Add(Box::new(self), Box::new(rhs))
    }

    pub fn sub(self, rhs: ArithTerm) -> Self {
        ArithTerm::Sub(Box::new(self), Box::new(rhs))
    }

    pub fn mul(self, rhs: ArithTerm) -> Self {
        ArithTerm::Mul(Box::new(self), Box::new(rhs))
    }

    pub fn div(self, rhs: ArithTerm) -> Self {
        ArithTerm::Div(Box::new(self), Box::new(rhs))
    }

    /// Free variables occurring in this term.
    pub fn free_vars(&self) -> HashSet<Symbol> {
        let mut out = HashSet::new();
        self.collect_free_vars(&mut out);
        out
    }

    fn collect_free_vars(&self, out: &mut HashSet<Symbol>) {
        match self {
            ArithTerm::Int(_) => {}
            ArithTerm::Var(s) => {
                out.insert(s.clone());
            }
            ArithTerm::Neg(a) => a.collect_free_vars(out),
            ArithTerm::Add(a, b)
            | ArithTerm::Sub(a, b)
            | ArithTerm::Mul(a, b)
            | ArithTerm::Div(a, b) => {
                a.collect_free_vars(out);
                b.collect_free_vars(out);
            }
        }
    }

    /// `true` if `v` occurs free in this term.
    pub fn mentions(&self, v: &Symbol) -> bool {
        match self {
            ArithTerm::Int(_) => false,
            ArithTerm::Var(s) => s == v,
            ArithTerm::Neg(a) => a.mentions(v),
            ArithTerm::Add(a, b)
            | ArithTerm::Sub(a, b)
            | ArithTerm::Mul(a, b)
            | ArithTerm::Div(a, b) => a.mentions(v) || b.mentions(v),
        }
    }

    /// Capture-free substitution of variables by terms. Variables not
    /// present in `subst` are left untouched.
    pub fn substitute(&self, subst: &HashMap<Symbol, ArithTerm>) -> ArithTerm {
        match self {
            ArithTerm::Int(v) => ArithTerm::Int(*v),
            ArithTerm::Var(s) => subst.get(s).cloned().unwrap_or_else(|| self.clone()),
            ArithTerm::Neg(a) => ArithTerm::Neg(Box::new(a.substitute(subst))),
            ArithTerm::Add(a, b) => {
                ArithTerm::Add(Box::new(a.substitute(subst)), Box::new(b.substitute(subst)))
            }
            ArithTerm::Sub(a, b) => {
                ArithTerm::Sub(Box::new(a.substitute(subst)), Box::new(b.substitute(subst)))
            }
            ArithTerm::Mul(a, b) => {
                ArithTerm::Mul(Box::new(a.substitute(subst)), Box::new(b.substitute(subst)))
            }
            ArithTerm::Div(a, b) => {
                ArithTerm::Div(Box::new(a.substitute(subst)), Box::new(b.substitute(subst)))
            }
        }
    }

    /// Evaluates a ground (variable-free) term. Returns `None` if the term
    /// still contains a variable, or division by a literal zero is attempted.
    pub fn eval_ground(&self) -> Option<i64> {
        match self {
            ArithTerm::Int(v) => Some(*v),
            ArithTerm::Var(_) => None,
            ArithTerm::Neg(a) => a.eval_ground().map(|v| -v),
            ArithTerm::Add(a, b) => Some(a.eval_ground()? + b.eval_ground()?),
            ArithTerm::Sub(a, b) => Some(a.eval_ground()? - b.eval_ground()?),
            ArithTerm::Mul(a, b) => Some(a.eval_ground()? * b.eval_ground()?),
            ArithTerm::Div(a, b) => {
                let (a, b) = (a.eval_ground()?, b.eval_ground()?);
                if b == 0 {
                    None
                } else {
                    Some(a / b)
                }
            }
        }
    }

    /// Extracts the coefficient of `v` assuming this term is linear in `v`:
    /// returns `(coeff, remainder)` such that the term is semantically
    /// `coeff * v + remainder`, where `remainder` does not mention `v`.
    /// Returns `None` if the term is not linear in `v` (e.g. `v` appears
    /// under a `Mul`/`Div` with a non-constant operand, or as a divisor).
    pub fn linear_coeff(&self, v: &Symbol) -> Option<(i64, ArithTerm)> {
        match self {
            ArithTerm::Int(n) => Some((0, ArithTerm::Int(*n))),
            ArithTerm::Var(s) if s == v => Some((1, ArithTerm::Int(0))),
            ArithTerm::Var(_) => Some((0, self.clone())),
            ArithTerm::Neg(a) => {
                let (c, r) = a.linear_coeff(v)?;
                Some((-c, r.neg()))
            }
            ArithTerm::Add(a, b) => {
                let (ca, ra) = a.linear_coeff(v)?;
                let (cb, rb) = b.linear_coeff(v)?;
                Some((ca + cb, ra.add(rb)))
            }
            ArithTerm::Sub(a, b) => {
                let (ca, ra) = a.linear_coeff(v)?;
                let (cb, rb) = b.linear_coeff(v)?;
                Some((ca - cb, ra.sub(rb)))
            }
            ArithTerm::Mul(a, b) => {
                if !a.mentions(v) {
                    let k = a.eval_ground()?;
                    let (cb, rb) = b.linear_coeff(v)?;
                    Some((k * cb, ArithTerm::Int(k).mul(rb)))
                } else if !b.mentions(v) {
                    let k = b.eval_ground()?;
                    let (ca, ra) = a.linear_coeff(v)?;
                    Some((k * ca, ra.mul(ArithTerm::Int(k))))
                } else {
                    None
                }
            }
            ArithTerm::Div(a, b) => {
                if b.mentions(v) {
                    return None;
                }
                let (ca, ra) = a.linear_coeff(v)?;
                if ca == 0 {
                    Some((0, ra.div((**b).clone())))
                } else {
                    // `v` under a division by a non-unit constant is not
                    // linear in the strict sense; treat as non-linear rather
                    // than silently rounding.
                    None
                }
            }
        }
    }
}

impl fmt::Display for ArithTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithTerm::Int(v) => write!(f, "{v}"),
            ArithTerm::Var(s) => write!(f, "{s}"),
            ArithTerm::Neg(a) => write!(f, "-({a})"),
            ArithTerm::Add(a, b) => write!(f, "({a} + {b})"),
            ArithTerm::Sub(a, b) => write!(f, "({a} - {b})"),
            ArithTerm::Mul(a, b) => write!(f, "({a} * {b})"),
            ArithTerm::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_replaces_only_named_var() {
        let x = Symbol::new("x");
        let y = Symbol::new("y");
        let term = ArithTerm::var(x.clone()).add(ArithTerm::int(1));
        let mut subst = HashMap::new();
        subst.insert(x, ArithTerm::var(y.clone()));
        let result = term.substitute(&subst);
        assert_eq!(result.to_string(), "(y + 1)");
    }

    #[test]
    fn linear_coeff_extracts_unit_coefficient() {
        let x = Symbol::new("x");
        let term = ArithTerm::var(x.clone()).add(ArithTerm::int(1));
        let (coeff, rem) = term.linear_coeff(&x).unwrap();
        assert_eq!(coeff, 1);
        assert_eq!(rem.eval_ground(), Some(1));
    }

    #[test]
    fn linear_coeff_handles_scaled_variable() {
        let x = Symbol::new("x");
        let term = ArithTerm::int(2).mul(ArithTerm::var(x.clone()));
        let (coeff, rem) = term.linear_coeff(&x).unwrap();
        assert_eq!(coeff, 2);
        assert_eq!(rem.eval_ground(), Some(0));
    }

    #[test]
    fn linear_coeff_rejects_quadratic_term() {
        let x = Symbol::new("x");
        let term = ArithTerm::var(x.clone()).mul(ArithTerm::var(x.clone()));
        assert!(term.linear_coeff(&x).is_none());
    }

    #[test]
    fn eval_ground_computes_constant_expression() {
        let term = ArithTerm::int(6).div(ArithTerm::int(2)).sub(ArithTerm::int(1));
        assert_eq!(term.eval_ground(), Some(2));
    }
}
