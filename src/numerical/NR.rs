///  Example#1
/// ```
///  use RustedQuadrics::numerical::NR::NR;
///  use RustedQuadrics::symbolic::symbolic_engine::Expr;
///    // first define system of equations and initial guess
///    let mut NR_instanse = NR::new();
///    let vec_of_expr = Expr::parse_vector_expression(&["x^2+y^2-10", "x-y-4"]).unwrap();
///    let initial_guess = vec![1.0, 1.0];
///    NR_instanse
///        .set_equation_system(vec_of_expr, None, initial_guess, 1e-9, 100)
///        .unwrap();
///    NR_instanse.eq_generate().unwrap();
///    let solution = NR_instanse.main_loop().unwrap();
///    // converges to one of the two intersections (3, -1) and (1, -3)
///    assert!((solution[0] - solution[1] - 4.0).abs() < 1e-8);
///    assert!((solution.norm_squared() - 10.0).abs() < 1e-8);
///  ```
/// Example#2
///  ```
///    // all isolated roots over a box of starting points
///     use RustedQuadrics::numerical::NR::solve_multistart;
///     use RustedQuadrics::symbolic::symbolic_engine::Expr;
///     use RustedQuadrics::Utils::settings_parser::SolverSettings;
///     let vec_of_expr = Expr::parse_vector_expression(&["x^2+y^2-10", "x-y-4"]).unwrap();
///     let roots = solve_multistart(&vec_of_expr, &["x", "y"], &SolverSettings::default()).unwrap();
///     assert_eq!(roots.len(), 2);
///  ```
use crate::Utils::settings_parser::SolverSettings;
use crate::errors::{CalcError, CalcResult};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_functions::Jacobian;
use crate::symbolic::utils::linspace;
use itertools::Itertools;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// two roots closer than this are the same root
pub const ROOT_DEDUP_TOL: f64 = 1e-6;
/// a converged point is accepted as a root only if the residual norm is below this
pub const RESIDUAL_TOL: f64 = 1e-6;

pub struct NR {
    pub jacobian: Jacobian, // instance of Jacobian struct, contains jacobian matrix function and equation functions
    pub eq_system: Vec<Expr>, // vector of equations
    pub values: Vec<String>,  // vector of variables
    pub initial_guess: Vec<f64>, // initial guess
    pub tolerance: f64,       // tolerance
    pub max_iterations: usize, // max number of iterations

    max_error: f64,                   // max error
    pub i: usize,                     // iteration counter
    pub jac: DMatrix<f64>,            // jacobian matrix
    pub result: Option<DVector<f64>>, // result of the iteration
    calc_statistics: HashMap<String, usize>,
}

impl Default for NR {
    fn default() -> Self {
        Self::new()
    }
}

impl NR {
    pub fn new() -> NR {
        NR {
            jacobian: Jacobian::new(),
            eq_system: Vec::new(),
            values: Vec::new(),
            initial_guess: Vec::new(),
            tolerance: 1e-9,
            max_iterations: 100,
            max_error: 0.0,
            i: 0,
            jac: DMatrix::zeros(0, 0),
            result: None,
            calc_statistics: HashMap::new(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    /// Basic methods to set the equation system
    pub fn set_equation_system(
        &mut self,
        eq_system: Vec<Expr>,
        unknowns: Option<Vec<String>>,
        initial_guess: Vec<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) -> CalcResult<()> {
        let values = match unknowns {
            Some(values) => values,
            None => {
                let mut args: Vec<String> = eq_system
                    .iter()
                    .flat_map(|x| x.all_arguments_are_variables())
                    .collect();
                args.sort();
                args.dedup();
                args
            }
        };
        if values.is_empty() {
            return Err(CalcError::Solver("no variables found in the equations".to_string()));
        }
        if values.len() != eq_system.len() {
            return Err(CalcError::Solver(format!(
                "{} equations for {} unknowns, the system must be square",
                eq_system.len(),
                values.len()
            )));
        }
        if initial_guess.len() != values.len() {
            return Err(CalcError::Solver(
                "initial guess and vector of variables should have the same length".to_string(),
            ));
        }
        if !(tolerance > 0.0) || max_iterations == 0 {
            return Err(CalcError::Solver(
                "tolerance and max iterations should be positive".to_string(),
            ));
        }
        self.eq_system = eq_system;
        self.values = values;
        self.initial_guess = initial_guess;
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        Ok(())
    }

    pub fn set_initial_guess(&mut self, initial_guess: Vec<f64>) {
        self.initial_guess = initial_guess;
        self.i = 0;
        self.max_error = 0.0;
        self.result = None;
    }

    ///Set system of equations with vector of symbolic expressions
    pub fn eq_generate(&mut self) -> CalcResult<()> {
        let args: Vec<&str> = self.values.iter().map(|x| x.as_str()).collect();
        let mut Jacobian_instance = Jacobian::from_vectors(self.eq_system.clone(), &args);
        Jacobian_instance.calc_jacobian();
        Jacobian_instance.jacobian_generate()?;
        Jacobian_instance.lambdify_funcvector()?;
        self.jacobian = Jacobian_instance;
        Ok(())
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    /// realize iteration of Newton-Raphson - calculate new iteration vector by using Jacobian matrix.
    /// `None` when the jacobian is singular at `x`
    pub fn iteration(&mut self, x: &DVector<f64>) -> Option<DVector<f64>> {
        let point = x.as_slice();
        self.jac = self.jacobian.evaluate_func_jacobian_DMatrix_unmut(point);
        let f = self.jacobian.evaluate_funvector_lambdified_DVector_unmut(point);
        let delta = self.jac.clone().lu().solve(&f)?;
        Some(x - delta)
    }

    /// main function to solve the system of equations
    pub fn main_loop(&mut self) -> Option<DVector<f64>> {
        let mut x = DVector::from_vec(self.initial_guess.clone());
        while self.i < self.max_iterations {
            let Some(new_x) = self.iteration(&x) else {
                debug!("singular jacobian at {:?}", x.as_slice());
                return None;
            };
            if new_x.iter().any(|v| !v.is_finite()) {
                debug!("iteration diverged from {:?}", self.initial_guess);
                return None;
            }
            let error = (&new_x - &x).norm();
            if error > self.max_error && self.i > 0 {
                debug!("Error is increasing");
            }
            self.max_error = error;
            x = new_x;
            self.i += 1;
            debug!("iteration = {}, error = {}", self.i, error);
            if error < self.tolerance {
                self.result = Some(x.clone());
                return Some(x);
            }
        }
        info!(
            "Maximum number of iterations reached from {:?}. No solution found.",
            self.initial_guess
        );
        None
    }

    /// norm of the equation vector at `x`
    pub fn residual(&self, x: &DVector<f64>) -> f64 {
        self.jacobian
            .evaluate_funvector_lambdified_DVector_unmut(x.as_slice())
            .norm()
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    pub fn solve(&mut self) -> CalcResult<Option<DVector<f64>>> {
        let begin = Instant::now();
        self.eq_generate()?;
        let res = self.main_loop();
        let time = begin.elapsed().as_millis() as usize;
        self.calc_statistics.insert("time elapsed, ms".to_string(), time);
        self.calc_statistics();
        self.result = res;
        Ok(self.result.clone())
    }

    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result.clone()
    }

    fn calc_statistics(&self) {
        let mut stats = self.calc_statistics.clone();
        let jac_shape = self.jac.shape();
        stats.insert(
            "number of jacobian elements".to_string(),
            jac_shape.0 * jac_shape.1,
        );
        stats.insert("length of y vector".to_string(), self.values.len());
        stats.insert("number of iterations".to_string(), self.i);
        let mut table = Builder::from(stats).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table);
    }
}

/// Runs Newton-Raphson from every point of a regular grid over `settings.search_range`
/// (`starts_per_axis` points per unknown) and returns the distinct roots, sorted
/// lexicographically. An empty vector means no start converged.
pub fn solve_multistart(
    eq_system: &[Expr],
    unknowns: &[&str],
    settings: &SolverSettings,
) -> CalcResult<Vec<DVector<f64>>> {
    let n = unknowns.len();
    let mut NR_instanse = NR::new();
    NR_instanse.set_equation_system(
        eq_system.to_vec(),
        Some(unknowns.iter().map(|s| s.to_string()).collect()),
        vec![0.0; n],
        settings.tolerance,
        settings.max_iterations,
    )?;
    NR_instanse.eq_generate()?;

    let (start, end) = settings.search_range;
    let axis = linspace(start, end, settings.starts_per_axis);
    let begin = Instant::now();
    let mut roots: Vec<DVector<f64>> = Vec::new();
    let mut starts = 0usize;
    for guess in std::iter::repeat_n(axis.iter().copied(), n).multi_cartesian_product() {
        starts += 1;
        NR_instanse.set_initial_guess(guess);
        let Some(root) = NR_instanse.main_loop() else {
            continue;
        };
        if NR_instanse.residual(&root) > RESIDUAL_TOL {
            debug!("rejected point {:?}: residual too large", root.as_slice());
            continue;
        }
        if roots.iter().all(|r| (r - &root).norm() > ROOT_DEDUP_TOL) {
            roots.push(root.map(clean_zero));
        }
    }
    roots.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    info!(
        "multistart Newton-Raphson: {} starts, {} distinct roots, {} ms",
        starts,
        roots.len(),
        begin.elapsed().as_millis()
    );
    if roots.is_empty() {
        warn!("no start converged for {} equations", eq_system.len());
    }
    Ok(roots)
}

/// `-0.0` and rounding noise around zero print as `0`
fn clean_zero(v: f64) -> f64 {
    if v.abs() < 1e-12 { 0.0 } else { v }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     TESTS
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_NR_set_equation_sysytem() {
        let vec_of_expr = Expr::parse_vector_expression(&["x^2+y^2-10", "x-y-4"]).unwrap();
        let initial_guess = vec![1.0, 1.0];
        let mut NR_instanse = NR::new();
        let values = vec!["x".to_string(), "y".to_string()];
        NR_instanse
            .set_equation_system(vec_of_expr, Some(values), initial_guess, 1e-9, 100)
            .unwrap();
        NR_instanse.eq_generate().unwrap();
        NR_instanse.main_loop();
        let solution = NR_instanse.get_result().unwrap();
        assert_relative_eq!(solution[0] - solution[1], 4.0, epsilon = 1e-8);
        assert_relative_eq!(solution.norm_squared(), 10.0, epsilon = 1e-8);
    }

    #[test]
    fn test_NR_solve_with_statistics() {
        let vec_of_expr = Expr::parse_vector_expression(&["x^2 - 4", "y - x"]).unwrap();
        let mut NR_instanse = NR::new();
        NR_instanse
            .set_equation_system(vec_of_expr, None, vec![1.0, 0.0], 1e-10, 50)
            .unwrap();
        let solution = NR_instanse.solve().unwrap().unwrap();
        assert_relative_eq!(solution[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(solution[1], 2.0, epsilon = 1e-9);
        assert!(NR_instanse.i > 0);
    }

    #[test]
    fn test_NR_rejects_non_square_system() {
        let vec_of_expr = Expr::parse_vector_expression(&["x + y + z", "x - y"]).unwrap();
        let mut NR_instanse = NR::new();
        let res = NR_instanse.set_equation_system(vec_of_expr, None, vec![0.0, 0.0], 1e-9, 100);
        assert!(matches!(res, Err(CalcError::Solver(_))));
    }

    #[test]
    fn test_NR_singular_jacobian_gives_none() {
        // jacobian 2x vanishes at the start
        let vec_of_expr = Expr::parse_vector_expression(&["x^2 + 1"]).unwrap();
        let mut NR_instanse = NR::new();
        NR_instanse
            .set_equation_system(vec_of_expr, None, vec![0.0], 1e-9, 100)
            .unwrap();
        NR_instanse.eq_generate().unwrap();
        assert!(NR_instanse.main_loop().is_none());
    }

    #[test]
    fn test_multistart_finds_both_intersections() {
        let vec_of_expr = Expr::parse_vector_expression(&["x^2+y^2-10", "x-y-4"]).unwrap();
        let roots = solve_multistart(&vec_of_expr, &["x", "y"], &SolverSettings::default()).unwrap();
        assert_eq!(roots.len(), 2);
        // sorted by x
        assert_relative_eq!(roots[0][0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(roots[0][1], -3.0, epsilon = 1e-8);
        assert_relative_eq!(roots[1][0], 3.0, epsilon = 1e-8);
        assert_relative_eq!(roots[1][1], -1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_multistart_without_real_roots() {
        let vec_of_expr = Expr::parse_vector_expression(&["x^2 + 1"]).unwrap();
        let roots = solve_multistart(&vec_of_expr, &["x"], &SolverSettings::default()).unwrap();
        assert!(roots.is_empty());
    }
}
