use crate::errors::{CalcError, CalcResult};
use crate::symbolic::polynomial::Polynomial;
use crate::symbolic::symbolic_engine::Expr;
use log::debug;

impl Expr {
    /// SYMBOLIC INTEGRATION

    /// Indefinite integral with respect to `var`, without constant of integration.
    ///
    /// Polynomials are integrated exactly term by term. Otherwise the integral is
    /// built structurally: sums, constant factors, and `exp`, `sin`, `cos`,
    /// powers and reciprocals of arguments linear in `var`. Anything else is a
    /// `CalcError::Integration` and the caller falls back to quadrature.
    pub fn integrate(&self, var: &str) -> CalcResult<Expr> {
        if let Some(poly) = self.as_polynomial_with(var) {
            if let Some(idx) = poly.index_of(var) {
                return Ok(poly.antiderivative(idx).to_expr());
            }
        }
        let result = self.integrate_structural(var)?;
        Ok(result.simplify())
    }

    /// ∫ f d(var) from `lower` to `upper`; bounds may contain other variables.
    pub fn definite_integrate(&self, var: &str, lower: &Expr, upper: &Expr) -> CalcResult<Expr> {
        let antiderivative = self.integrate(var)?;
        debug!("∫ {} d{} = {}", self, var, antiderivative);
        let at_upper = antiderivative.substitute_variable(var, upper);
        let at_lower = antiderivative.substitute_variable(var, lower);
        Ok((at_upper - at_lower).simplify())
    }

    fn integrate_structural(&self, var: &str) -> CalcResult<Expr> {
        let x = Expr::Var(var.to_string());
        if !self.contains_variable(var) {
            // ∫ c dx = c*x
            return Ok(self.clone() * x);
        }
        match self {
            Expr::Add(lhs, rhs) => Ok(lhs.integrate_structural(var)? + rhs.integrate_structural(var)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.integrate_structural(var)? - rhs.integrate_structural(var)?),
            Expr::Mul(lhs, rhs) if !lhs.contains_variable(var) => {
                Ok(lhs.as_ref().clone() * rhs.integrate_structural(var)?)
            }
            Expr::Mul(lhs, rhs) if !rhs.contains_variable(var) => {
                Ok(rhs.as_ref().clone() * lhs.integrate_structural(var)?)
            }
            Expr::Div(lhs, rhs) if !rhs.contains_variable(var) => {
                Ok(lhs.integrate_structural(var)? / rhs.as_ref().clone())
            }
            // ∫ c/(a x + b) dx = c ln(a x + b)/a
            Expr::Div(lhs, rhs) if !lhs.contains_variable(var) => {
                let a = self.linear_slope(rhs, var)?;
                Ok(lhs.as_ref().clone() * rhs.as_ref().clone().ln() / Expr::Const(a))
            }
            Expr::Pow(base, exp) if !exp.contains_variable(var) => {
                let a = self.linear_slope(base, var)?;
                let n = exp.eval_expression(&[], &[]).map_err(|_| self.unsupported(var))?;
                if n == -1.0 {
                    Ok(base.as_ref().clone().ln() / Expr::Const(a))
                } else {
                    Ok(base.as_ref().clone().pow(Expr::Const(n + 1.0)) / Expr::Const(a * (n + 1.0)))
                }
            }
            // ∫ c^(a x + b) dx = c^(a x + b)/(a ln c)
            Expr::Pow(base, exp) if !base.contains_variable(var) => {
                let a = self.linear_slope(exp, var)?;
                Ok(self.clone() / (Expr::Const(a) * base.as_ref().clone().ln()))
            }
            Expr::Exp(arg) => {
                let a = self.linear_slope(arg, var)?;
                Ok(self.clone() / Expr::Const(a))
            }
            Expr::sin(arg) => {
                let a = self.linear_slope(arg, var)?;
                Ok(Expr::cos(arg.clone()) / Expr::Const(-a))
            }
            Expr::cos(arg) => {
                let a = self.linear_slope(arg, var)?;
                Ok(Expr::sin(arg.clone()) / Expr::Const(a))
            }
            _ => Err(self.unsupported(var)),
        }
    }

    /// `a` when `arg = a*var + b` with numeric `a != 0`
    fn linear_slope(&self, arg: &Expr, var: &str) -> CalcResult<f64> {
        let poly = arg.as_polynomial_with(var).ok_or_else(|| self.unsupported(var))?;
        let idx = poly.index_of(var).ok_or_else(|| self.unsupported(var))?;
        let coefficients = poly.coefficients_in(idx);
        match coefficients.as_slice() {
            [_, slope] => slope
                .as_constant()
                .filter(|a| *a != 0.0)
                .ok_or_else(|| self.unsupported(var)),
            _ => Err(self.unsupported(var)),
        }
    }

    fn as_polynomial_with(&self, var: &str) -> Option<Polynomial> {
        Polynomial::from_expr_including(self, var).ok()
    }

    fn unsupported(&self, var: &str) -> CalcError {
        CalcError::Integration(format!("no closed form for ∫ {} d{}", self, var))
    }
}
