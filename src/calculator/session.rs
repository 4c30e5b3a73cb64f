//! The calculator operations, one function per menu entry. Every function returns a
//! result struct; printing is left to `report` and `menu`.
use crate::Utils::plots::{plot_2d, plot_3d, plot_implicit_quadric};
use crate::Utils::settings_parser::{CalcSettings, QuadratureSettings, SolverSettings};
use crate::errors::{CalcError, CalcResult};
use crate::numerical::critical_points::{CriticalPoint, find_critical_points, gradient};
use crate::numerical::lagrange::{LagrangeReport, solve_lagrange};
use crate::numerical::quadrature::{IntegrationBound, integrate_nested};
use crate::symbolic::quadric_surfaces::{SurfaceKind, classify};
use crate::symbolic::symbolic_engine::Expr;
use log::{info, warn};
use std::path::PathBuf;
use strum_macros::Display;

/// integrals and plots are limited to this many variables
pub const MAX_DIMENSIONS: usize = 3;

/// A parsed user function with its variables in sorted order
#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    pub expr: Expr,
    pub variables: Vec<String>,
}

impl UserFunction {
    pub fn parse(input: &str) -> CalcResult<UserFunction> {
        let expr = Expr::parse_expression(input)?;
        let variables = expr.all_arguments_are_variables();
        info!("parsed {} with variables {:?}", expr, variables);
        Ok(UserFunction { expr, variables })
    }

    pub fn vars(&self) -> Vec<&str> {
        self.variables.iter().map(|s| s.as_str()).collect()
    }

    pub fn is_constant(&self) -> bool {
        self.variables.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeReport {
    pub variables: Vec<String>,
    /// simplified ∂f/∂v in the order of `variables`
    pub partials: Vec<Expr>,
    pub critical_points: Vec<CriticalPoint>,
}

pub fn derivatives(f: &UserFunction, settings: &SolverSettings) -> CalcResult<DerivativeReport> {
    let vars = f.vars();
    let partials = gradient(&f.expr, &vars);
    let critical_points = find_critical_points(&f.expr, &vars, settings)?;
    if critical_points.is_empty() {
        warn!("no critical points found for {}", f.expr);
    }
    Ok(DerivativeReport {
        variables: f.variables.clone(),
        partials,
        critical_points,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IntegrationMethod {
    #[strum(to_string = "symbolic")]
    Symbolic,
    #[strum(to_string = "Gauss-Legendre quadrature")]
    GaussLegendre,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegralReport {
    pub value: f64,
    /// closed form of the integral when the symbolic route succeeded
    pub exact: Option<Expr>,
    pub method: IntegrationMethod,
}

/// Iterated definite integral, innermost bound first. Symbolic integration is tried
/// first, Gauss-Legendre quadrature is the fallback.
pub fn definite_integral(
    f: &Expr,
    bounds: &[IntegrationBound],
    settings: &QuadratureSettings,
) -> CalcResult<IntegralReport> {
    if bounds.is_empty() || bounds.len() > MAX_DIMENSIONS {
        return Err(CalcError::Integration(format!(
            "integrals of 1 to {} variables are supported",
            MAX_DIMENSIONS
        )));
    }
    match symbolic_integral(f, bounds) {
        Ok((exact, value)) => Ok(IntegralReport {
            value,
            exact: Some(exact),
            method: IntegrationMethod::Symbolic,
        }),
        Err(e) => {
            info!("{}; falling back to Gauss-Legendre quadrature", e);
            let value = integrate_nested(f, bounds, settings.degree)?;
            Ok(IntegralReport {
                value,
                exact: None,
                method: IntegrationMethod::GaussLegendre,
            })
        }
    }
}

fn symbolic_integral(f: &Expr, bounds: &[IntegrationBound]) -> CalcResult<(Expr, f64)> {
    let mut current = f.clone();
    for bound in bounds {
        current = current.definite_integrate(&bound.var, &bound.lower, &bound.upper)?;
    }
    let value = current.eval_expression(&[], &[]).map_err(|_| {
        CalcError::Integration(format!("symbolic result {} still holds variables", current))
    })?;
    if !value.is_finite() {
        return Err(CalcError::Integration(format!(
            "symbolic result {} is not finite",
            current
        )));
    }
    Ok((current, value))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotReport {
    pub path: PathBuf,
    /// set for 3-variable relations recognized as a quadric
    pub surface: Option<SurfaceKind>,
}

/// 1 variable: curve, 2: surface `z = f`, 3: implicit surface `f = 0` with the
/// last variable as height.
pub fn plot(f: &UserFunction, settings: &CalcSettings) -> CalcResult<PlotReport> {
    let vars = f.vars();
    match vars.as_slice() {
        [x] => Ok(PlotReport {
            path: plot_2d(&f.expr, x, &settings.plot)?,
            surface: None,
        }),
        [x, y] => Ok(PlotReport {
            path: plot_3d(&f.expr, x, y, &settings.plot)?,
            surface: None,
        }),
        [x, y, z] => {
            let surface = classify(&f.expr, &vars);
            Ok(PlotReport {
                path: plot_implicit_quadric(&f.expr, x, y, z, &settings.plot)?,
                surface,
            })
        }
        _ => Err(CalcError::Plot(format!(
            "plotting supports 1 to {} variables, got {}",
            MAX_DIMENSIONS,
            vars.len()
        ))),
    }
}

pub fn lagrange(objective: &str, constraint: &str, settings: &SolverSettings) -> CalcResult<LagrangeReport> {
    let f = Expr::parse_expression(objective)?;
    let g = Expr::parse_expression(constraint)?;
    solve_lagrange(&f, &g, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::critical_points::CriticalPointKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_user_function_variables_are_sorted() {
        let f = UserFunction::parse("z*y + x^2").unwrap();
        assert_eq!(f.variables, vec!["x", "y", "z"]);
        assert!(UserFunction::parse("2 + 3").unwrap().is_constant());
        assert!(UserFunction::parse("(x + 1").is_err());
    }

    #[test]
    fn test_derivatives_report() {
        let f = UserFunction::parse("x^2 + y^2 - 2*x").unwrap();
        let report = derivatives(&f, &SolverSettings::default()).unwrap();
        assert_eq!(report.partials[0].to_string(), "2 * x - 2");
        assert_eq!(report.partials[1].to_string(), "2 * y");
        assert_eq!(report.critical_points.len(), 1);
        assert_eq!(report.critical_points[0].kind, CriticalPointKind::LocalMinimum);
        assert_relative_eq!(report.critical_points[0].value, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_symbolic_double_integral() {
        let f = Expr::parse_expression("x*y").unwrap();
        let bounds = [
            IntegrationBound::new("x", Expr::Const(0.0), Expr::Const(2.0)),
            IntegrationBound::new("y", Expr::Const(0.0), Expr::Const(1.0)),
        ];
        let report = definite_integral(&f, &bounds, &QuadratureSettings::default()).unwrap();
        assert_eq!(report.method, IntegrationMethod::Symbolic);
        assert_relative_eq!(report.value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quadrature_fallback() {
        let f = Expr::parse_expression("exp(x^2)").unwrap();
        let bounds = [IntegrationBound::new("x", Expr::Const(0.0), Expr::Const(1.0))];
        let report = definite_integral(&f, &bounds, &QuadratureSettings::default()).unwrap();
        assert_eq!(report.method, IntegrationMethod::GaussLegendre);
        assert!(report.exact.is_none());
        assert_relative_eq!(report.value, 1.4626517459071816, epsilon = 1e-12);
    }

    #[test]
    fn test_too_many_dimensions() {
        let f = Expr::parse_expression("x").unwrap();
        let bounds: Vec<IntegrationBound> = ["a", "b", "c", "d"]
            .iter()
            .map(|v| IntegrationBound::new(v, Expr::Const(0.0), Expr::Const(1.0)))
            .collect();
        assert!(definite_integral(&f, &bounds, &QuadratureSettings::default()).is_err());
        let four = UserFunction::parse("a + b + c + d").unwrap();
        assert!(matches!(plot(&four, &CalcSettings::default()), Err(CalcError::Plot(_))));
    }

    #[test]
    fn test_lagrange_from_text() {
        let report = lagrange("x*y", "x + y - 2", &SolverSettings::default()).unwrap();
        assert_eq!(report.solutions.len(), 1);
        assert_relative_eq!(report.solutions[0].objective, 1.0, epsilon = 1e-8);
    }
}
