//! Iterated Gauss-Legendre quadrature over regions with variable bounds
use crate::errors::{CalcError, CalcResult};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::LambdaFn;
use gauss_quad::GaussLegendre;
use log::debug;

/// `lower <= var <= upper`; the bounds may depend on the variables of the outer integrals
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationBound {
    pub var: String,
    pub lower: Expr,
    pub upper: Expr,
}

impl IntegrationBound {
    pub fn new(var: &str, lower: Expr, upper: Expr) -> Self {
        Self {
            var: var.to_string(),
            lower,
            upper,
        }
    }
}

struct CompiledRegion {
    integrand: LambdaFn,
    lower: Vec<LambdaFn>,
    upper: Vec<LambdaFn>,
    rule: GaussLegendre,
}

impl CompiledRegion {
    /// integrates over the variable of `level` and everything inside it; `point`
    /// already holds the values of the outer variables
    fn integrate_level(&self, level: usize, point: &[f64]) -> f64 {
        let a = (self.lower[level])(point);
        let b = (self.upper[level])(point);
        self.rule.integrate(a, b, |t| {
            let mut inner = point.to_vec();
            inner[level] = t;
            if level == 0 {
                (self.integrand)(inner.as_slice())
            } else {
                self.integrate_level(level - 1, inner.as_slice())
            }
        })
    }
}

/// Numerical value of the iterated integral of `f`.
///
/// `bounds` is ordered from the innermost integral outwards (`dx dy dz`), so
/// the bounds of `bounds[k]` may use the variables of `bounds[k + 1..]`.
/// `degree` is the number of Gauss-Legendre nodes per dimension.
pub fn integrate_nested(f: &Expr, bounds: &[IntegrationBound], degree: usize) -> CalcResult<f64> {
    if bounds.is_empty() || bounds.len() > 3 {
        return Err(CalcError::Integration(format!(
            "quadrature supports 1 to 3 dimensions, got {}",
            bounds.len()
        )));
    }
    let vars: Vec<&str> = bounds.iter().map(|b| b.var.as_str()).collect();
    let rule = GaussLegendre::new(degree).map_err(|e| {
        CalcError::Integration(format!("Failed to create Gauss-Legendre quadrature: {:?}", e))
    })?;
    let region = CompiledRegion {
        integrand: f.lambdify(&vars)?,
        lower: bounds
            .iter()
            .map(|b| b.lower.lambdify(&vars))
            .collect::<CalcResult<Vec<_>>>()?,
        upper: bounds
            .iter()
            .map(|b| b.upper.lambdify(&vars))
            .collect::<CalcResult<Vec<_>>>()?,
        rule,
    };
    let outer = bounds.len() - 1;
    let value = region.integrate_level(outer, &vec![0.0; bounds.len()][..]);
    debug!("Gauss-Legendre ({} nodes) of {} over {:?} = {}", degree, f, vars, value);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::Integration(format!(
            "quadrature of {} did not give a finite value",
            f
        )))
    }
}
