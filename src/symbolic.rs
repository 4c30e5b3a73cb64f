#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedQuadrics::symbolic::symbolic_engine::Expr;
/// let input = "x**2 + y^2 - z^2 - 1";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// assert_eq!(parsed_expression.to_string(), "x^2 + y^2 - z^2 - 1");
/// let parsed_function = parsed_expression.lambdify(&["x", "y", "z"]).unwrap();
/// assert_eq!(parsed_function(&[1.0, 1.0, 1.0]), 0.0);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the expression tree and its printing
/// 2) differentiates, simplifies, integrates and solves expressions
/// 3) turns a symbolic expression into a Rust function
///# Example#
/// ```
/// use RustedQuadrics::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("exp(x) + ln(y)").unwrap();
/// // return vec of all arguments
/// assert_eq!(parsed_expression.all_arguments_are_variables(), vec!["x", "y"]);
/// // differentiate with respect to x and y
/// let df_dx = parsed_expression.diff("x").simplify();
/// let df_dy = parsed_expression.diff("y").simplify();
/// assert_eq!(df_dx.to_string(), "exp(x)");
/// assert_eq!(df_dy.to_string(), "1 / y");
/// // evaluate the expression
/// let f_res = parsed_expression.eval_expression(&["x", "y"], &[0.0, 1.0]).unwrap();
/// assert_eq!(f_res, 1.0);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
pub mod symbolic_integration;
pub mod symbolic_lambdify;
pub mod symbolic_simplify;
pub mod symbolic_solve;
///________________________________________________________________________________________________________________________________________________
/// calculate symbolic jacobian and evaluate it
pub mod symbolic_functions;
///________________________________________________________________________________________________________________________________________________
/// expanded polynomial normal form: coefficient × monomial terms
pub mod polynomial;
/// names the quadric family of an implicit equation f(x, y, z) = 0
pub mod quadric_surfaces;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions mainly for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
