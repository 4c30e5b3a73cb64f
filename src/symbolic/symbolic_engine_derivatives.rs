//! # Symbolic Engine Derivatives Module
//!
//! Extends [`Expr`] with analytical differentiation and direct numerical
//! evaluation. The calculator prints the simplified partial derivatives of the
//! user's function and feeds gradients and Hessians to the critical point and
//! Lagrange solvers.
//!
//! ## Key Methods
//! - `diff(var)` - partial derivative
//! - `diff_multi_args(vars)` / `diff_multi()` - gradient in a given / sorted variable order
//! - `hessian(vars)` - matrix of second partial derivatives
//! - `eval_expression(vars, values)` - evaluate once without building a closure

use crate::errors::{CalcError, CalcResult};
use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard rules:
    /// - Power rule: d/dx(x^n) = n*x^(n-1), general rule for exponents that depend on x
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    ///
    /// The result is not simplified; call `simplify()` for a readable form.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x").simplify(); // 2 * x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Pow(rhs.clone(), Box::new(Expr::Const(2.0)))),
            ),
            Expr::Pow(base, exp) if !exp.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(
                    exp.clone(),
                    Box::new(Expr::Pow(
                        base.clone(),
                        Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                    )),
                )),
                Box::new(base.diff(var)),
            ),
            // f^g with g depending on var: f^g * (g' ln f + g f'/f)
            Expr::Pow(base, exp) => Expr::Mul(
                Box::new(self.clone()),
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(Box::new(exp.diff(var)), Box::new(Expr::Ln(base.clone())))),
                    Box::new(Expr::Div(
                        Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                        base.clone(),
                    )),
                )),
            ),
            Expr::Exp(expr) => Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var))),
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var))),
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::cos(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::arcsin(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arccos(expr) => Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::arcsin(expr.clone()).diff(var)),
            ),
            Expr::arctg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
        }
    }

    /// Partial derivatives in the order of `all_vars`.
    pub fn diff_multi_args(&self, all_vars: &[&str]) -> Vec<Expr> {
        all_vars.iter().map(|var| self.diff(var)).collect()
    }

    /// Computes all partial derivatives, variables in alphabetical order.
    pub fn diff_multi(&self) -> Vec<Expr> {
        let all_vars = self.all_arguments_are_variables();
        all_vars.iter().map(|var| self.diff(var)).collect()
    }

    /// Simplified matrix of second partial derivatives, rows and columns in the order of `vars`.
    pub fn hessian(&self, vars: &[&str]) -> Vec<Vec<Expr>> {
        let gradient: Vec<Expr> = vars.iter().map(|v| self.diff(v).simplify()).collect();
        gradient
            .iter()
            .map(|g| vars.iter().map(|v| g.diff(v).simplify()).collect())
            .collect()
    }

    /// EVALUATION

    /// Evaluates the expression at the given values.
    ///
    /// # Arguments
    /// * `vars` - Variable names in order matching values array
    /// * `values` - Numerical values for each variable
    ///
    /// # Errors
    /// `CalcError::UnknownVariable` when the expression holds a variable missing from `vars`.
    ///
    /// # Performance
    /// Use lambdify() for repeated evaluation, eval_expression() for one-time use
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> CalcResult<f64> {
        let value = match self {
            Expr::Var(name) => {
                let index = vars
                    .iter()
                    .position(|&x| x == name)
                    .filter(|&i| i < values.len())
                    .ok_or_else(|| CalcError::UnknownVariable(name.clone()))?;
                values[index]
            }
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_expression(vars, values)? + rhs.eval_expression(vars, values)?,
            Expr::Sub(lhs, rhs) => lhs.eval_expression(vars, values)? - rhs.eval_expression(vars, values)?,
            Expr::Mul(lhs, rhs) => lhs.eval_expression(vars, values)? * rhs.eval_expression(vars, values)?,
            Expr::Div(lhs, rhs) => lhs.eval_expression(vars, values)? / rhs.eval_expression(vars, values)?,
            Expr::Pow(base, exp) => {
                let base_fn = base.eval_expression(vars, values)?;
                let exp_fn = exp.eval_expression(vars, values)?;
                real_pow(base_fn, exp_fn)
            }
            Expr::Exp(expr) => expr.eval_expression(vars, values)?.exp(),
            Expr::Ln(expr) => expr.eval_expression(vars, values)?.ln(),
            Expr::sin(expr) => expr.eval_expression(vars, values)?.sin(),
            Expr::cos(expr) => expr.eval_expression(vars, values)?.cos(),
            Expr::tg(expr) => expr.eval_expression(vars, values)?.tan(),
            Expr::arcsin(expr) => expr.eval_expression(vars, values)?.asin(),
            Expr::arccos(expr) => expr.eval_expression(vars, values)?.acos(),
            Expr::arctg(expr) => expr.eval_expression(vars, values)?.atan(),
        };
        Ok(value)
    }
}

/// `powf` with integer exponents routed through `powi`, so `(-2)^3 = -8` instead of NaN
pub(crate) fn real_pow(base: f64, exp: f64) -> f64 {
    if exp.fract() == 0.0 && exp.abs() < i32::MAX as f64 {
        base.powi(exp as i32)
    } else {
        base.powf(exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diff_polynomial() {
        let f = Expr::parse_expression("x^3 + 2*x*y").unwrap();
        let df_dx = f.diff("x");
        assert_relative_eq!(df_dx.eval_expression(&["x", "y"], &[2.0, 5.0]).unwrap(), 22.0);
        let df_dy = f.diff("y");
        assert_relative_eq!(df_dy.eval_expression(&["x", "y"], &[2.0, 5.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_diff_chain_rule() {
        let f = Expr::parse_expression("sin(x^2) + exp(2*x) + ln(x)").unwrap();
        let x: f64 = 0.7;
        let expected = (x * x).cos() * 2.0 * x + 2.0 * (2.0 * x).exp() + 1.0 / x;
        assert_relative_eq!(f.diff("x").eval_expression(&["x"], &[x]).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_diff_inverse_trig() {
        let f = Expr::parse_expression("arcsin(x) + arccos(x) + arctg(x)").unwrap();
        let x: f64 = 0.3;
        let expected = 1.0 / (1.0 + x * x);
        assert_relative_eq!(f.diff("x").eval_expression(&["x"], &[x]).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_diff_variable_exponent() {
        let f = Expr::parse_expression("x^x").unwrap();
        let x: f64 = 1.5;
        let expected = x.powf(x) * (x.ln() + 1.0);
        assert_relative_eq!(f.diff("x").eval_expression(&["x"], &[x]).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_in_sorted_order() {
        let f = Expr::parse_expression("y*z + x^2").unwrap();
        let grad = f.diff_multi();
        assert_eq!(grad.len(), 3);
        let at = |d: &Expr| d.eval_expression(&["x", "y", "z"], &[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(at(&grad[0]), 2.0);
        assert_relative_eq!(at(&grad[1]), 3.0);
        assert_relative_eq!(at(&grad[2]), 2.0);
        assert_eq!(f.diff_multi_args(&["z"]).len(), 1);
    }

    #[test]
    fn test_hessian_of_quadratic() {
        let f = Expr::parse_expression("x^2 + 3*x*y - y^2").unwrap();
        let h = f.hessian(&["x", "y"]);
        assert_eq!(h[0][0], Expr::Const(2.0));
        assert_eq!(h[0][1], Expr::Const(3.0));
        assert_eq!(h[1][0], Expr::Const(3.0));
        assert_eq!(h[1][1], Expr::Const(-2.0));
    }

    #[test]
    fn test_eval_unknown_variable() {
        let f = Expr::parse_expression("x + w").unwrap();
        assert!(matches!(
            f.eval_expression(&["x"], &[1.0]),
            Err(CalcError::UnknownVariable(name)) if name == "w"
        ));
    }

    #[test]
    fn test_eval_negative_base_integer_power() {
        let f = Expr::parse_expression("x^3").unwrap();
        assert_relative_eq!(f.eval_expression(&["x"], &[-2.0]).unwrap(), -8.0);
    }
}
