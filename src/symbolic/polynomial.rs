//! # Polynomial normal form
//!
//! Sparse multivariate polynomial with real coefficients, kept as a sorted map
//! from monomials (exponent vectors aligned with an explicit variable list) to
//! coefficients. Building it from an [`Expr`] *is* the expansion step: sums,
//! products and non-negative integer powers are multiplied out and like terms
//! are merged, so after `from_expr` every "does this term contain x²" or
//! "coefficient of x²" question is a direct lookup.
//!
//! Because the map is ordered, two expressions that differ only by the order of
//! their summands expand to equal polynomials.

use crate::errors::{CalcError, CalcResult};
use crate::symbolic::symbolic_engine::Expr;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// exponent vector aligned with `Polynomial::vars`
pub type Monomial = Vec<u32>;

/// coefficients smaller than this are treated as cancelled
const COEFF_EPS: f64 = 1e-12;
/// largest integer power expanded
const MAX_POWER: u32 = 64;

/// One addend of an expanded polynomial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Term<'a> {
    pub coefficient: f64,
    pub monomial: &'a [u32],
}

impl Term<'_> {
    pub fn exponent(&self, var_idx: usize) -> u32 {
        self.monomial.get(var_idx).copied().unwrap_or(0)
    }

    /// the term contains the variable to any power
    pub fn contains_var(&self, var_idx: usize) -> bool {
        self.exponent(var_idx) > 0
    }

    /// the term has exactly `v^2` as a factor (x^2*y counts, x^3 does not)
    pub fn contains_square(&self, var_idx: usize) -> bool {
        self.exponent(var_idx) == 2
    }

    /// the term is `c * v^2` and nothing else
    pub fn is_pure_square(&self, var_idx: usize) -> bool {
        self.contains_square(var_idx)
            && self
                .monomial
                .iter()
                .enumerate()
                .all(|(i, &e)| i == var_idx || e == 0)
    }

    /// Coefficient multiplying `v^2` when it is a plain number.
    ///
    /// `3*x^2` gives `Some(3.0)`; `x^2*y` gives `None` because the
    /// coefficient of `x^2` is `y`, whose sign is unknown.
    pub fn square_coefficient(&self, var_idx: usize) -> Option<f64> {
        if self.is_pure_square(var_idx) {
            Some(self.coefficient)
        } else {
            None
        }
    }

    pub fn is_constant(&self) -> bool {
        self.monomial.iter().all(|&e| e == 0)
    }

    pub fn degree(&self) -> u32 {
        self.monomial.iter().sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    vars: Vec<String>,
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    pub fn zero(vars: Vec<String>) -> Self {
        Polynomial {
            vars,
            terms: BTreeMap::new(),
        }
    }

    pub fn constant(vars: Vec<String>, value: f64) -> Self {
        let mut poly = Polynomial::zero(vars);
        let monomial = vec![0; poly.vars.len()];
        poly.insert(monomial, value);
        poly
    }

    pub fn from_var(vars: Vec<String>, name: &str) -> CalcResult<Self> {
        let idx = vars
            .iter()
            .position(|v| v == name)
            .ok_or_else(|| CalcError::NotPolynomial(format!("symbol '{}' is not one of {:?}", name, vars)))?;
        let mut monomial = vec![0; vars.len()];
        monomial[idx] = 1;
        let mut poly = Polynomial::zero(vars);
        poly.insert(monomial, 1.0);
        Ok(poly)
    }

    /// Expands `expr` into normal form over exactly the variables `vars`.
    ///
    /// Fails with `CalcError::NotPolynomial` when the expression contains a
    /// symbol outside `vars`, divides by a non-constant, raises to a negative or
    /// fractional power, or applies a function to a non-constant argument.
    pub fn from_expr(expr: &Expr, vars: &[&str]) -> CalcResult<Self> {
        let vars: Vec<String> = vars.iter().map(|v| v.to_string()).collect();
        Self::expand(expr, &vars)
    }

    /// Same as `from_expr`, with the sorted free variables of `expr`.
    pub fn from_expr_auto(expr: &Expr) -> CalcResult<Self> {
        let vars = expr.all_arguments_are_variables();
        Self::expand(expr, &vars)
    }

    /// Same as `from_expr_auto`, with `var` added to the variables if it does not occur.
    pub fn from_expr_including(expr: &Expr, var: &str) -> CalcResult<Self> {
        let mut vars = expr.all_arguments_are_variables();
        if !vars.iter().any(|v| v == var) {
            vars.push(var.to_string());
            vars.sort();
        }
        Self::expand(expr, &vars)
    }

    fn expand(expr: &Expr, vars: &[String]) -> CalcResult<Self> {
        let vars_vec = vars.to_vec();
        match expr {
            Expr::Var(name) => Polynomial::from_var(vars_vec, name),
            Expr::Const(c) if c.is_finite() => Ok(Polynomial::constant(vars_vec, *c)),
            Expr::Const(c) => Err(CalcError::NotPolynomial(format!("non-finite constant {}", c))),
            Expr::Add(lhs, rhs) => Ok(Self::expand(lhs, vars)?.add(&Self::expand(rhs, vars)?)),
            Expr::Sub(lhs, rhs) => Ok(Self::expand(lhs, vars)?.sub(&Self::expand(rhs, vars)?)),
            Expr::Mul(lhs, rhs) => Ok(Self::expand(lhs, vars)?.mul(&Self::expand(rhs, vars)?)),
            Expr::Div(lhs, rhs) => {
                let numerator = Self::expand(lhs, vars)?;
                match Self::expand(rhs, vars)?.as_constant() {
                    Some(c) if c.abs() > COEFF_EPS => Ok(numerator.scale(1.0 / c)),
                    _ => Err(CalcError::NotPolynomial(format!("division by {}", rhs))),
                }
            }
            Expr::Pow(base, exp) => {
                let base = Self::expand(base, vars)?;
                let exponent = Self::expand(exp, vars)?
                    .as_constant()
                    .ok_or_else(|| CalcError::NotPolynomial(format!("symbolic exponent {}", exp)))?;
                if let Some(b) = base.as_constant() {
                    return Ok(Polynomial::constant(vars_vec, b.powf(exponent)));
                }
                let rounded = exponent.round();
                if (exponent - rounded).abs() > 1e-9 || rounded < 0.0 || rounded > MAX_POWER as f64 {
                    return Err(CalcError::NotPolynomial(format!(
                        "exponent {} is not a small non-negative integer",
                        exponent
                    )));
                }
                Ok(base.pow(rounded as u32))
            }
            _ => {
                // a function of a constant argument is still a constant
                let value = constant_value(expr).ok_or_else(|| {
                    CalcError::NotPolynomial(format!("transcendental function {}", expr))
                })?;
                Ok(Polynomial::constant(vars_vec, value))
            }
        }
    }

    fn insert(&mut self, monomial: Monomial, coefficient: f64) {
        // only the touched entry can cancel
        match self.terms.entry(monomial) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().abs() <= COEFF_EPS {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                if coefficient.abs() > COEFF_EPS {
                    entry.insert(coefficient);
                }
            }
        }
    }

    //___________________________________QUERIES____________________________________

    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    pub fn index_of(&self, var: &str) -> Option<usize> {
        self.vars.iter().position(|v| v == var)
    }

    /// all terms, constant included, in monomial order
    pub fn terms(&self) -> impl Iterator<Item = Term<'_>> + '_ {
        self.terms.iter().map(|(monomial, &coefficient)| Term {
            coefficient,
            monomial: monomial.as_slice(),
        })
    }

    /// terms that contain at least one variable
    pub fn variable_terms(&self) -> impl Iterator<Item = Term<'_>> + '_ {
        self.terms().filter(|t| !t.is_constant())
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn constant_term(&self) -> f64 {
        self.terms().find(|t| t.is_constant()).map_or(0.0, |t| t.coefficient)
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Some(c) if the polynomial has no variable terms
    pub fn as_constant(&self) -> Option<f64> {
        if self.variable_terms().next().is_none() {
            Some(self.constant_term())
        } else {
            None
        }
    }

    pub fn degree_in(&self, var_idx: usize) -> u32 {
        self.terms().map(|t| t.exponent(var_idx)).max().unwrap_or(0)
    }

    pub fn total_degree(&self) -> u32 {
        self.terms().map(|t| t.degree()).max().unwrap_or(0)
    }

    pub fn is_linear(&self) -> bool {
        self.total_degree() <= 1
    }

    /// Coefficient of `var^1` in a linear polynomial.
    pub fn linear_coefficient(&self, var_idx: usize) -> f64 {
        self.terms()
            .find(|t| t.degree() == 1 && t.exponent(var_idx) == 1)
            .map_or(0.0, |t| t.coefficient)
    }

    /// Splits `p` as `sum_k c_k * v^k`; returns `[c_0, c_1, ...]`, each free of `v`.
    pub fn coefficients_in(&self, var_idx: usize) -> Vec<Polynomial> {
        let degree = self.degree_in(var_idx) as usize;
        let mut coefficients = vec![Polynomial::zero(self.vars.clone()); degree + 1];
        for term in self.terms() {
            let k = term.exponent(var_idx) as usize;
            let mut monomial = term.monomial.to_vec();
            if var_idx < monomial.len() {
                monomial[var_idx] = 0;
            }
            coefficients[k].insert(monomial, term.coefficient);
        }
        coefficients
    }

    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms()
            .map(|t| {
                t.monomial
                    .iter()
                    .zip(values)
                    .fold(t.coefficient, |acc, (&e, &v)| acc * v.powi(e as i32))
            })
            .sum()
    }

    //___________________________________ARITHMETIC____________________________________

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut result = self.clone();
        for term in other.terms() {
            result.insert(term.monomial.to_vec(), term.coefficient);
        }
        result
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.scale(-1.0))
    }

    pub fn scale(&self, factor: f64) -> Polynomial {
        let mut result = Polynomial::zero(self.vars.clone());
        for term in self.terms() {
            result.insert(term.monomial.to_vec(), term.coefficient * factor);
        }
        result
    }

    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        let mut result = Polynomial::zero(self.vars.clone());
        for a in self.terms() {
            for b in other.terms() {
                let monomial: Monomial = a.monomial.iter().zip(b.monomial).map(|(x, y)| x + y).collect();
                result.insert(monomial, a.coefficient * b.coefficient);
            }
        }
        result
    }

    pub fn pow(&self, n: u32) -> Polynomial {
        let mut result = Polynomial::constant(self.vars.clone(), 1.0);
        for _ in 0..n {
            result = result.mul(self);
        }
        result
    }

    /// exact partial derivative
    pub fn derivative(&self, var_idx: usize) -> Polynomial {
        let mut result = Polynomial::zero(self.vars.clone());
        for term in self.terms() {
            let k = term.exponent(var_idx);
            if k == 0 {
                continue;
            }
            let mut monomial = term.monomial.to_vec();
            monomial[var_idx] -= 1;
            result.insert(monomial, term.coefficient * k as f64);
        }
        result
    }

    /// exact antiderivative in one variable, without constant of integration
    pub fn antiderivative(&self, var_idx: usize) -> Polynomial {
        let mut result = Polynomial::zero(self.vars.clone());
        for term in self.terms() {
            let k = term.exponent(var_idx);
            let mut monomial = term.monomial.to_vec();
            monomial[var_idx] += 1;
            result.insert(monomial, term.coefficient / (k + 1) as f64);
        }
        result
    }

    //___________________________________BACK TO EXPR____________________________________

    /// Rebuilds an expression, highest degree first: `x^2 + y^2 + z^2 - 1`.
    pub fn to_expr(&self) -> Expr {
        let mut ordered: Vec<Term> = self.terms().collect();
        ordered.sort_by(|a, b| b.degree().cmp(&a.degree()).then_with(|| b.monomial.cmp(a.monomial)));
        let mut exprs = ordered.iter().map(|t| self.term_to_expr(t));
        let Some(first) = exprs.next() else {
            return Expr::Const(0.0);
        };
        exprs.fold(first, |acc, e| acc + e)
    }

    fn term_to_expr(&self, term: &Term) -> Expr {
        let factors: Vec<Expr> = term
            .monomial
            .iter()
            .zip(&self.vars)
            .filter(|(e, _)| **e > 0)
            .map(|(&e, name)| {
                let var = Expr::Var(name.clone());
                if e == 1 { var } else { var.pow(Expr::Const(e as f64)) }
            })
            .collect();
        let Some(product) = factors.into_iter().reduce(|acc, f| acc * f) else {
            return Expr::Const(term.coefficient);
        };
        if term.coefficient == 1.0 {
            product
        } else if term.coefficient == -1.0 {
            -product
        } else {
            Expr::Const(term.coefficient) * product
        }
    }
}

/// numeric value of a variable-free expression
fn constant_value(expr: &Expr) -> Option<f64> {
    if !expr.all_arguments_are_variables().is_empty() {
        return None;
    }
    let value = expr.eval_expression(&[], &[]).ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(input: &str) -> Polynomial {
        let expr = Expr::parse_expression(input).unwrap();
        Polynomial::from_expr(&expr, &["x", "y", "z"]).unwrap()
    }

    #[test]
    fn test_expansion_merges_like_terms() {
        let p = poly("(x + y)^2 - 2*x*y");
        assert_eq!(p, poly("x^2 + y^2"));
        assert_eq!(p.num_terms(), 2);
    }

    #[test]
    fn test_order_of_summands_is_irrelevant() {
        assert_eq!(poly("z - x**2 + y**2"), poly("y**2 + z - x**2"));
    }

    #[test]
    fn test_cancellation_removes_terms() {
        let p = poly("x*y - y*x + 3");
        assert_eq!(p.as_constant(), Some(3.0));
        let p = poly("(x + y)^6 - (x - y)^6");
        assert!(p.terms().all(|t| t.exponent(1) % 2 == 1));
        assert_eq!(p.num_terms(), 3);
        assert!(poly("(x + y + z)^5 - (z + y + x)^5").is_zero());
    }

    #[test]
    fn test_high_power_expansion() {
        // one term per monomial of total degree <= 24 in three variables
        let p = poly("(x + y + z + 1)^24");
        assert_eq!(p.num_terms(), 2925);
        assert_eq!(p.total_degree(), 24);
        assert_eq!(p.eval(&[1.0, 1.0, 1.0]), 4f64.powi(24));
        assert_eq!(p.constant_term(), 1.0);
    }

    #[test]
    fn test_division_by_constant_and_foreign_symbols() {
        let p = poly("x^2/4");
        let term = p.terms().next().unwrap();
        assert_eq!(term.square_coefficient(0), Some(0.25));

        let expr = Expr::parse_expression("x^2 + w").unwrap();
        assert!(Polynomial::from_expr(&expr, &["x", "y", "z"]).is_err());
        let expr = Expr::parse_expression("1/x").unwrap();
        assert!(Polynomial::from_expr(&expr, &["x", "y", "z"]).is_err());
        let expr = Expr::parse_expression("x^0.5").unwrap();
        assert!(Polynomial::from_expr(&expr, &["x", "y", "z"]).is_err());
        let expr = Expr::parse_expression("sin(x)").unwrap();
        assert!(Polynomial::from_expr(&expr, &["x", "y", "z"]).is_err());
    }

    #[test]
    fn test_constant_functions_fold() {
        let p = poly("x + cos(0)");
        assert_eq!(p.constant_term(), 1.0);
    }

    #[test]
    fn test_term_queries() {
        let p = poly("3*x^2*y - 2*z^2 + x^3");
        let terms: Vec<Term> = p.variable_terms().collect();
        let mixed = terms.iter().find(|t| t.exponent(1) == 1).unwrap();
        assert!(mixed.contains_square(0));
        assert!(!mixed.is_pure_square(0));
        assert_eq!(mixed.square_coefficient(0), None);

        let z2 = terms.iter().find(|t| t.contains_var(2)).unwrap();
        assert_eq!(z2.square_coefficient(2), Some(-2.0));

        let cube = terms.iter().find(|t| t.exponent(0) == 3).unwrap();
        assert!(!cube.contains_square(0));
    }

    #[test]
    fn test_coefficients_in() {
        let p = poly("x^2 + y^2 - z^2 - 1");
        let c = p.coefficients_in(2);
        assert_eq!(c.len(), 3);
        assert_eq!(c[0], poly("x^2 + y^2 - 1"));
        assert!(c[1].is_zero());
        assert_eq!(c[2].as_constant(), Some(-1.0));
    }

    #[test]
    fn test_calculus_on_normal_form() {
        let p = poly("x^3 + 2*x*y");
        assert_eq!(p.derivative(0), poly("3*x^2 + 2*y"));
        assert_eq!(p.antiderivative(1), poly("x^3*y + x*y^2"));
        assert_eq!(p.eval(&[2.0, 1.0, 0.0]), 12.0);
    }

    #[test]
    fn test_to_expr_prints_highest_degree_first() {
        let p = poly("-1 + z^2 + x^2 + y^2");
        assert_eq!(p.to_expr().to_string(), "x^2 + y^2 + z^2 - 1");
        let p = poly("z - x^2 - y^2");
        assert_eq!(p.to_expr().to_string(), "-x^2 - y^2 + z");
    }
}
