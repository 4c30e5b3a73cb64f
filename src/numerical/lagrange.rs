//! Constrained extrema of `f` subject to `g = 0` by Lagrange multipliers
use crate::Utils::settings_parser::SolverSettings;
use crate::errors::{CalcError, CalcResult};
use crate::numerical::NR::solve_multistart;
use crate::symbolic::symbolic_engine::Expr;
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeSolution {
    pub coordinates: Vec<f64>,
    pub lambda: f64,
    pub objective: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeReport {
    /// sorted union of the variables of objective and constraint
    pub variables: Vec<String>,
    pub multiplier: String,
    pub equations: Vec<Expr>,
    pub solutions: Vec<LagrangeSolution>,
}

/// Builds `L = f - λ g` and solves `∂L/∂v = 0` for every variable together with `g = 0`.
/// Only 2 or 3 variables are accepted.
pub fn solve_lagrange(f: &Expr, g: &Expr, settings: &SolverSettings) -> CalcResult<LagrangeReport> {
    let mut variables = f.all_arguments_are_variables();
    variables.extend(g.all_arguments_are_variables());
    variables.sort();
    variables.dedup();
    if !(2..=3).contains(&variables.len()) {
        return Err(CalcError::Solver(format!(
            "Lagrange multipliers need 2 or 3 variables, found {}",
            variables.len()
        )));
    }
    let multiplier = multiplier_name(&variables);
    let lambda = Expr::Var(multiplier.clone());
    let lagrangian = f.clone() - lambda * g.clone();

    let mut unknowns: Vec<&str> = variables.iter().map(|s| s.as_str()).collect();
    unknowns.push(multiplier.as_str());
    let mut equations: Vec<Expr> = variables
        .iter()
        .map(|v| lagrangian.diff(v).simplify())
        .collect();
    equations.push(g.simplify());
    info!(
        "Lagrange system: {}",
        equations.iter().map(|e| format!("{} = 0", e)).collect::<Vec<_>>().join(", ")
    );

    let roots = solve_multistart(&equations, &unknowns, settings)?;
    let n = variables.len();
    let solutions = roots
        .iter()
        .map(|r| {
            let coordinates: Vec<f64> = r.iter().take(n).copied().collect();
            Ok(LagrangeSolution {
                objective: f.eval_expression(&unknowns[..n], &coordinates)?,
                lambda: r[n],
                coordinates,
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;
    Ok(LagrangeReport {
        variables,
        multiplier,
        equations,
        solutions,
    })
}

/// `lambda`, or `lambda_`, `lambda__`... when the user's variables already take it
fn multiplier_name(variables: &[String]) -> String {
    let mut name = "lambda".to_string();
    while variables.contains(&name) {
        name.push('_');
    }
    name
}
