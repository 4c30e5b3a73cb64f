#![allow(non_camel_case_types)]

use crate::errors::CalcResult;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::LambdaFn;
use nalgebra::{DMatrix, DVector};

///
/// calculate symbolic jacobian and evaluate it
/// Example#
/// ```
/// use RustedQuadrics::symbolic::symbolic_functions::Jacobian;
/// let mut Jacobian_instance = Jacobian::new();
/// // gradient of x^2 + y^2 - 10 and x - y - 4
/// Jacobian_instance
///     .set_funcvecor_from_str(&["x^2+y^2-10", "x-y-4"])
///     .unwrap();
/// Jacobian_instance.set_variables(&["x", "y"]);
/// Jacobian_instance.calc_jacobian();
/// Jacobian_instance.jacobian_generate().unwrap();
/// Jacobian_instance.lambdify_funcvector().unwrap();
/// Jacobian_instance.evaluate_func_jacobian_DMatrix(&[1.0, 2.0]);
/// assert_eq!(Jacobian_instance.evaluated_jacobian_DMatrix[(0, 1)], 4.0);
/// ```
pub struct Jacobian {
    pub vector_of_functions: Vec<Expr>,  // vector of symbolic functions/expressions
    pub lambdified_functions: Vec<LambdaFn>, // functions converted to rust closures
    pub vector_of_variables: Vec<Expr>,  // vector of symbolic variables
    pub variable_string: Vec<String>,    // vector of string representation of variables
    pub symbolic_jacobian: Vec<Vec<Expr>>, // vector of symbolic jacobian
    pub readable_jacobian: Vec<Vec<String>>, // human readable jacobian
    pub function_jacobian: Vec<Vec<LambdaFn>>,
    pub evaluated_jacobian_DMatrix: DMatrix<f64>,
    pub evaluated_functions_DVector: DVector<f64>,
}

impl Default for Jacobian {
    fn default() -> Self {
        Self::new()
    }
}

impl Jacobian {
    pub fn new() -> Self {
        Self {
            vector_of_functions: Vec::new(),
            lambdified_functions: Vec::new(),
            vector_of_variables: Vec::new(),
            variable_string: Vec::new(),
            symbolic_jacobian: Vec::new(),
            readable_jacobian: Vec::new(),
            function_jacobian: Vec::new(),
            evaluated_jacobian_DMatrix: DMatrix::zeros(0, 0),
            evaluated_functions_DVector: DVector::zeros(0),
        }
    }

    pub fn from_vectors(vector_of_functions: Vec<Expr>, variables: &[&str]) -> Self {
        let mut jac = Self::new();
        jac.set_vector_of_functions(vector_of_functions);
        jac.set_variables(variables);
        jac
    }

    /// Basic functionality: setting variables and functions
    pub fn set_vector_of_functions(&mut self, value: Vec<Expr>) {
        self.vector_of_functions = value;
    }

    pub fn set_funcvecor_from_str(&mut self, value: &[&str]) -> CalcResult<()> {
        self.vector_of_functions = Expr::parse_vector_expression(value)?;
        Ok(())
    }

    pub fn set_variables(&mut self, varvec: &[&str]) {
        let vec_trimmed: Vec<String> = varvec.iter().map(|s| s.trim().to_string()).collect();
        self.vector_of_variables = Expr::Symbols(&vec_trimmed.join(","));
        self.variable_string = vec_trimmed;
    }

    fn variables(&self) -> Vec<&str> {
        self.variable_string.iter().map(|s| s.as_str()).collect()
    }

    /// calculate the symbolic jacobian, every element simplified
    pub fn calc_jacobian(&mut self) {
        let vars = self.variables();
        let new_jac: Vec<Vec<Expr>> = self
            .vector_of_functions
            .iter()
            .map(|func| vars.iter().map(|v| func.diff(v).simplify()).collect())
            .collect();
        self.symbolic_jacobian = new_jac;
    }

    /// turn jacobian into readable format
    pub fn readable_jacobian(&mut self) {
        self.readable_jacobian = self
            .symbolic_jacobian
            .iter()
            .map(|row| row.iter().map(|e| e.to_string()).collect())
            .collect();
    }

    /// creating function jacobian a matrix of functions with partial derivatives
    pub fn jacobian_generate(&mut self) -> CalcResult<()> {
        let vars = self.variables();
        let function_jacobian = self
            .symbolic_jacobian
            .iter()
            .map(|row| row.iter().map(|e| e.lambdify(&vars)).collect::<CalcResult<Vec<_>>>())
            .collect::<CalcResult<Vec<_>>>()?;
        self.function_jacobian = function_jacobian;
        Ok(())
    }

    pub fn lambdify_funcvector(&mut self) -> CalcResult<()> {
        let vars = self.variables();
        let lambdified = self
            .vector_of_functions
            .iter()
            .map(|f| f.lambdify(&vars))
            .collect::<CalcResult<Vec<_>>>()?;
        self.lambdified_functions = lambdified;
        Ok(())
    }

    // evaluate jacobian to nalgebra DMatrix
    pub fn evaluate_func_jacobian_DMatrix(&mut self, x: &[f64]) {
        self.evaluated_jacobian_DMatrix = self.evaluate_func_jacobian_DMatrix_unmut(x);
    }

    pub fn evaluate_func_jacobian_DMatrix_unmut(&self, x: &[f64]) -> DMatrix<f64> {
        let rows = self.function_jacobian.len();
        let cols = self.variable_string.len();
        DMatrix::from_fn(rows, cols, |i, j| self.function_jacobian[i][j](x))
    }

    pub fn evaluate_funvector_lambdified_DVector(&mut self, x: &[f64]) {
        self.evaluated_functions_DVector = self.evaluate_funvector_lambdified_DVector_unmut(x);
    }

    pub fn evaluate_funvector_lambdified_DVector_unmut(&self, x: &[f64]) -> DVector<f64> {
        DVector::from_iterator(
            self.lambdified_functions.len(),
            self.lambdified_functions.iter().map(|f| f(x)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jacobian_of_quadratic_system() {
        let mut jac = Jacobian::new();
        jac.set_funcvecor_from_str(&["x^2 + y^2 - 10", "x - y - 4"]).unwrap();
        jac.set_variables(&["x", "y"]);
        jac.calc_jacobian();
        jac.readable_jacobian();
        assert_eq!(jac.readable_jacobian[0], vec!["2 * x", "2 * y"]);
        assert_eq!(jac.readable_jacobian[1], vec!["1", "-1"]);

        jac.jacobian_generate().unwrap();
        jac.lambdify_funcvector().unwrap();
        jac.evaluate_func_jacobian_DMatrix(&[3.0, -1.0]);
        jac.evaluate_funvector_lambdified_DVector(&[3.0, -1.0]);
        assert_eq!(jac.evaluated_jacobian_DMatrix, DMatrix::from_row_slice(2, 2, &[6.0, -2.0, 1.0, -1.0]));
        assert_eq!(jac.evaluated_functions_DVector, DVector::from_vec(vec![0.0, 0.0]));
    }

    #[test]
    fn test_unknown_variable_is_reported() {
        let mut jac = Jacobian::from_vectors(vec![Expr::parse_expression("x + w").unwrap()], &["x"]);
        jac.calc_jacobian();
        assert!(jac.lambdify_funcvector().is_err());
    }
}
