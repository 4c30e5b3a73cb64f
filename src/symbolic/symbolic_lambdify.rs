use crate::errors::{CalcError, CalcResult};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_engine_derivatives::real_pow;

/// compiled expression: arguments in the order given to `lambdify`
pub type LambdaFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions

    /// Converts the expression into a closure of the variables `vars`.
    ///
    /// The closure mirrors the expression tree, so there is no parsing or
    /// lookup at call time. Used for sampling plot grids, quadrature and the
    /// Newton-Raphson residuals.
    ///
    /// # Errors
    /// `CalcError::UnknownVariable` if the expression uses a variable missing from `vars`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x^2 + y").unwrap();
    /// let func = f.lambdify(&["x", "y"]).unwrap();
    /// assert_eq!(func(&[3.0, 1.0]), 10.0);
    /// ```
    pub fn lambdify(&self, vars: &[&str]) -> CalcResult<LambdaFn> {
        if let Some(missing) = self
            .all_arguments_are_variables()
            .into_iter()
            .find(|v| !vars.contains(&v.as_str()))
        {
            return Err(CalcError::UnknownVariable(missing));
        }
        Ok(self.compile(vars))
    }

    /// Single-variable version used by the 2D plot.
    pub fn lambdify1D(&self, var: &str) -> CalcResult<Box<dyn Fn(f64) -> f64 + Send + Sync>> {
        let compiled_func = self.lambdify(&[var])?;
        Ok(Box::new(move |x| compiled_func(&[x])))
    }

    /// Evaluates the expression over `num_values` evenly spaced points of `[start, end]`.
    pub fn lambdify1D_from_linspace(
        &self,
        var: &str,
        start: f64,
        end: f64,
        num_values: usize,
    ) -> CalcResult<Vec<f64>> {
        let func = self.lambdify1D(var)?;
        Ok(crate::symbolic::utils::linspace(start, end, num_values)
            .into_iter()
            .map(func)
            .collect())
    }

    fn compile(&self, vars: &[&str]) -> LambdaFn {
        match self {
            Expr::Var(name) => {
                let index = vars.iter().position(|&x| x == name).unwrap_or(usize::MAX);
                Box::new(move |args| args.get(index).copied().unwrap_or(f64::NAN))
            }
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lf = lhs.compile(vars);
                let rf = rhs.compile(vars);
                Box::new(move |args| lf(args) + rf(args))
            }
            Expr::Sub(lhs, rhs) => {
                let lf = lhs.compile(vars);
                let rf = rhs.compile(vars);
                Box::new(move |args| lf(args) - rf(args))
            }
            Expr::Mul(lhs, rhs) => {
                let lf = lhs.compile(vars);
                let rf = rhs.compile(vars);
                Box::new(move |args| lf(args) * rf(args))
            }
            Expr::Div(lhs, rhs) => {
                let lf = lhs.compile(vars);
                let rf = rhs.compile(vars);
                Box::new(move |args| lf(args) / rf(args))
            }
            Expr::Pow(b, e) => {
                let bf = b.compile(vars);
                // integer exponents are by far the most common case
                if let Some(n) = e.as_const().filter(|n| n.fract() == 0.0 && n.abs() < 1e6) {
                    let n = n as i32;
                    return Box::new(move |args| bf(args).powi(n));
                }
                let ef = e.compile(vars);
                Box::new(move |args| real_pow(bf(args), ef(args)))
            }
            Expr::Exp(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).exp())
            }
            Expr::Ln(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).ln())
            }
            Expr::sin(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).sin())
            }
            Expr::cos(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).cos())
            }
            Expr::tg(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).tan())
            }
            Expr::arcsin(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).asin())
            }
            Expr::arccos(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).acos())
            }
            Expr::arctg(e) => {
                let f = e.compile(vars);
                Box::new(move |args| f(args).atan())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lambdify_matches_eval() {
        let f = Expr::parse_expression("x^2*sin(y) + exp(z)/2 - sqrt(x)").unwrap();
        let vars = ["x", "y", "z"];
        let func = f.lambdify(&vars).unwrap();
        let point = [1.7, -0.4, 0.3];
        assert_relative_eq!(func(&point), f.eval_expression(&vars, &point).unwrap(), epsilon = 1e-14);
    }

    #[test]
    fn test_lambdify_argument_order() {
        let f = Expr::parse_expression("x - y").unwrap();
        assert_eq!(f.lambdify(&["x", "y"]).unwrap()(&[3.0, 1.0]), 2.0);
        assert_eq!(f.lambdify(&["y", "x"]).unwrap()(&[3.0, 1.0]), -2.0);
    }

    #[test]
    fn test_lambdify_unknown_variable() {
        let f = Expr::parse_expression("x + y").unwrap();
        assert!(f.lambdify(&["x"]).is_err());
    }

    #[test]
    fn test_lambdify1D_from_linspace() {
        let f = Expr::parse_expression("2*t + 1").unwrap();
        let values = f.lambdify1D_from_linspace("t", 0.0, 1.0, 3).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_negative_base_integer_power() {
        let f = Expr::parse_expression("x^3").unwrap();
        assert_eq!(f.lambdify(&["x"]).unwrap()(&[-2.0]), -8.0);
    }
}
