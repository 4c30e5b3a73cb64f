//! Points where every partial derivative vanishes, with the second-derivative test
use crate::Utils::settings_parser::SolverSettings;
use crate::errors::CalcResult;
use crate::numerical::NR::solve_multistart;
use crate::symbolic::polynomial::Polynomial;
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use strum_macros::Display;

/// eigenvalues closer to zero than this are treated as zero
const EIGEN_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CriticalPointKind {
    #[strum(to_string = "local minimum")]
    LocalMinimum,
    #[strum(to_string = "local maximum")]
    LocalMaximum,
    #[strum(to_string = "saddle point")]
    Saddle,
    #[strum(to_string = "inconclusive")]
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPoint {
    pub coordinates: Vec<f64>,
    pub value: f64,
    pub kind: CriticalPointKind,
}

/// simplified partial derivatives of `f`, one per variable
pub fn gradient(f: &Expr, vars: &[&str]) -> Vec<Expr> {
    f.diff_multi_args(vars)
        .into_iter()
        .map(|d| d.simplify())
        .collect()
}

/// Solves `grad f = 0`.
///
/// A gradient whose components are all linear in `vars` is solved exactly; a singular
/// system there has no isolated critical point and gives an empty vector. Otherwise
/// Newton-Raphson is started from a grid of points (see [`solve_multistart`]).
pub fn find_critical_points(
    f: &Expr,
    vars: &[&str],
    settings: &SolverSettings,
) -> CalcResult<Vec<CriticalPoint>> {
    let grad = gradient(f, vars);
    let points = match linear_system(&grad, vars) {
        Some((a, b)) => {
            info!("gradient of {} is linear, solving exactly", f);
            solve_linear(a, b).into_iter().collect()
        }
        None => solve_multistart(&grad, vars, settings)?,
    };
    let hessian = f.hessian(vars);
    points
        .into_iter()
        .map(|p| {
            let coordinates: Vec<f64> = p.iter().copied().collect();
            let h = evaluate_matrix(&hessian, vars, &coordinates)?;
            let kind = classify_point(&h);
            let value = f.eval_expression(vars, &coordinates)?;
            debug!("critical point {:?}: {}", coordinates, kind);
            Ok(CriticalPoint {
                coordinates,
                value,
                kind,
            })
        })
        .collect()
}

/// `A x = b` when every equation is a polynomial of degree at most one in `vars`
fn linear_system(equations: &[Expr], vars: &[&str]) -> Option<(DMatrix<f64>, DVector<f64>)> {
    let polys = equations
        .iter()
        .map(|e| Polynomial::from_expr(e, vars).ok().filter(|p| p.is_linear()))
        .collect::<Option<Vec<_>>>()?;
    let n = vars.len();
    let a = DMatrix::from_fn(polys.len(), n, |i, j| polys[i].linear_coefficient(j));
    let b = DVector::from_iterator(polys.len(), polys.iter().map(|p| -p.constant_term()));
    Some((a, b))
}

fn solve_linear(a: DMatrix<f64>, b: DVector<f64>) -> Option<DVector<f64>> {
    if a.nrows() != a.ncols() || a.determinant().abs() < EIGEN_EPS {
        debug!("singular gradient system, no isolated critical point");
        return None;
    }
    a.lu().solve(&b)
}

fn evaluate_matrix(m: &[Vec<Expr>], vars: &[&str], point: &[f64]) -> CalcResult<DMatrix<f64>> {
    let n = m.len();
    let mut out = DMatrix::zeros(n, n);
    for (i, row) in m.iter().enumerate() {
        for (j, e) in row.iter().enumerate() {
            out[(i, j)] = e.eval_expression(vars, point)?;
        }
    }
    Ok(out)
}

/// Second-derivative test on a symmetric Hessian through its eigenvalues
pub fn classify_point(hessian: &DMatrix<f64>) -> CriticalPointKind {
    let eigenvalues = hessian.clone().symmetric_eigenvalues();
    let positive = eigenvalues.iter().filter(|&&l| l > EIGEN_EPS).count();
    let negative = eigenvalues.iter().filter(|&&l| l < -EIGEN_EPS).count();
    let n = eigenvalues.len();
    if positive == n {
        CriticalPointKind::LocalMinimum
    } else if negative == n {
        CriticalPointKind::LocalMaximum
    } else if positive > 0 && negative > 0 {
        CriticalPointKind::Saddle
    } else {
        CriticalPointKind::Inconclusive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    #[test]
    fn test_gradient_is_simplified() {
        let grad = gradient(&parse("x^2 + 3*x*y"), &["x", "y"]);
        assert_eq!(grad[0].to_string(), "2 * x + 3 * y");
        assert_eq!(grad[1].to_string(), "3 * x");
    }

    #[test]
    fn test_quadratic_bowl_exact_minimum() {
        let f = parse("(x - 1)^2 + (y + 2)^2 + 3");
        let points = find_critical_points(&f, &["x", "y"], &SolverSettings::default()).unwrap();
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].coordinates[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(points[0].coordinates[1], -2.0, epsilon = 1e-12);
        assert_relative_eq!(points[0].value, 3.0, epsilon = 1e-12);
        assert_eq!(points[0].kind, CriticalPointKind::LocalMinimum);
    }

    #[test]
    fn test_saddle_and_maximum() {
        let saddle = find_critical_points(&parse("x^2 - y^2"), &["x", "y"], &SolverSettings::default()).unwrap();
        assert_eq!(saddle[0].kind, CriticalPointKind::Saddle);
        let max = find_critical_points(&parse("-x^2 - y^2 - z^2"), &["x", "y", "z"], &SolverSettings::default())
            .unwrap();
        assert_eq!(max[0].kind, CriticalPointKind::LocalMaximum);
    }

    #[test]
    fn test_no_isolated_point() {
        // gradient (1, 1) never vanishes, gradient of (x+y)^2 vanishes on a line
        let settings = SolverSettings::default();
        assert!(find_critical_points(&parse("x + y"), &["x", "y"], &settings).unwrap().is_empty());
        assert!(find_critical_points(&parse("(x + y)^2"), &["x", "y"], &settings).unwrap().is_empty());
    }

    #[test]
    fn test_nonlinear_gradient_uses_newton() {
        // f = x^3 - 3x + y^2: critical points (-1, 0) max/saddle and (1, 0) min
        let f = parse("x^3 - 3*x + y^2");
        let points = find_critical_points(&f, &["x", "y"], &SolverSettings::default()).unwrap();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].coordinates[0], -1.0, epsilon = 1e-8);
        assert_eq!(points[0].kind, CriticalPointKind::Saddle);
        assert_relative_eq!(points[1].coordinates[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(points[1].coordinates[1], 0.0, epsilon = 1e-8);
        assert_eq!(points[1].kind, CriticalPointKind::LocalMinimum);
    }

    #[test]
    fn test_degenerate_hessian_is_inconclusive() {
        let h = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 0.0]);
        assert_eq!(classify_point(&h), CriticalPointKind::Inconclusive);
        assert_eq!(CriticalPointKind::Saddle.to_string(), "saddle point");
    }
}
