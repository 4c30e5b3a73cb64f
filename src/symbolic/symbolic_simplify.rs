//! # Symbolic Expression Simplification Module
//!
//! Brings expressions into a readable form before they are printed (partial
//! derivatives, integrals, solved branches).
//!
//! ## Simplification Strategy
//!
//! 1. **Polynomial normal form**: a subtree that is a polynomial in its own free
//!    variables is expanded and rebuilt through [`Polynomial`], which collects like
//!    terms (`3x + 2x = 5x`) and orders them by degree.
//! 2. **Constant Folding**: operations and functions applied to numbers are evaluated.
//! 3. **Algebraic Identities**: x + 0 = x, x * 1 = x, x * 0 = 0, x^1 = x, x^0 = 1, x / 1 = x.
//!
//! Non-polynomial nodes are simplified bottom-up, so the polynomial pieces inside
//! `sin(...)` or a quotient are still normalised.

use crate::symbolic::polynomial::Polynomial;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_engine_derivatives::real_pow;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Simplifies the expression.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("2*x + 3*x - 0*y").unwrap();
    /// assert_eq!(f.simplify().to_string(), "5 * x");
    /// ```
    pub fn simplify(&self) -> Expr {
        if let Ok(poly) = Polynomial::from_expr_auto(self) {
            return poly.to_expr();
        }
        let simplified = self.map_children(|child| child.simplify());
        simplified.simplify_numbers()
    }

    /// One level of constant folding and neutral-element rules; children are assumed simplified.
    pub fn simplify_numbers(&self) -> Expr {
        match self {
            Expr::Add(lhs, rhs) => match (lhs.as_const(), rhs.as_const()) {
                (Some(a), Some(b)) => Expr::Const(a + b),
                (Some(a), _) if a == 0.0 => rhs.as_ref().clone(),
                (_, Some(b)) if b == 0.0 => lhs.as_ref().clone(),
                _ => self.clone(),
            },
            Expr::Sub(lhs, rhs) => match (lhs.as_const(), rhs.as_const()) {
                (Some(a), Some(b)) => Expr::Const(a - b),
                (Some(a), _) if a == 0.0 => -(rhs.as_ref().clone()),
                (_, Some(b)) if b == 0.0 => lhs.as_ref().clone(),
                _ if lhs == rhs => Expr::Const(0.0),
                _ => self.clone(),
            },
            Expr::Mul(lhs, rhs) => match (lhs.as_const(), rhs.as_const()) {
                (Some(a), Some(b)) => Expr::Const(a * b),
                (Some(a), _) | (_, Some(a)) if a == 0.0 => Expr::Const(0.0),
                (Some(a), _) if a == 1.0 => rhs.as_ref().clone(),
                (_, Some(b)) if b == 1.0 => lhs.as_ref().clone(),
                // constants to the left: x * 2 -> 2 * x
                (None, Some(b)) => Expr::Const(b) * lhs.as_ref().clone(),
                _ => self.clone(),
            },
            Expr::Div(lhs, rhs) => match (lhs.as_const(), rhs.as_const()) {
                (Some(a), Some(b)) if b != 0.0 => Expr::Const(a / b),
                (Some(a), _) if a == 0.0 => Expr::Const(0.0),
                (_, Some(b)) if b == 1.0 => lhs.as_ref().clone(),
                _ if lhs == rhs => Expr::Const(1.0),
                _ => self.clone(),
            },
            Expr::Pow(base, exp) => match (base.as_const(), exp.as_const()) {
                (Some(a), Some(b)) => Expr::Const(real_pow(a, b)),
                (_, Some(b)) if b == 0.0 => Expr::Const(1.0),
                (_, Some(b)) if b == 1.0 => base.as_ref().clone(),
                (Some(a), _) if a == 1.0 => Expr::Const(1.0),
                _ => self.clone(),
            },
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            // functions of numbers
            _ => match self.eval_expression(&[], &[]) {
                Ok(value) if value.is_finite() => Expr::Const(value),
                _ => self.clone(),
            },
        }
    }
}
