//! explicit solution of `expr = 0` for one variable when `expr` is at most quadratic in it
use crate::errors::{CalcError, CalcResult};
use crate::symbolic::polynomial::Polynomial;
use crate::symbolic::symbolic_engine::Expr;
use log::debug;

impl Expr {
    /// Roots of `self = 0` in `var`, as expressions of the remaining variables.
    ///
    /// - linear in `var`: one root `-b/a`
    /// - quadratic: the branches `(-b ± sqrt(b^2 - 4ac)) / 2a`, a single one when
    ///   the discriminant vanishes identically, none when it is a negative number
    ///
    /// # Examples
    /// ```rust, ignore
    /// let sphere = Expr::parse_expression("x^2 + y^2 + z^2 - 1").unwrap();
    /// let branches = sphere.solve_for("z").unwrap(); // ±(-x^2 - y^2 + 1)^0.5
    /// ```
    pub fn solve_for(&self, var: &str) -> CalcResult<Vec<Expr>> {
        let poly = Polynomial::from_expr_including(self, var)
            .map_err(|e| CalcError::Solver(format!("cannot solve {} = 0 for {}: {}", self, var, e)))?;
        let idx = poly
            .index_of(var)
            .ok_or_else(|| CalcError::UnknownVariable(var.to_string()))?;
        let roots = match poly.coefficients_in(idx).as_slice() {
            [b, a] => vec![linear_root(a, b)],
            [c, b, a] => quadratic_roots(a, b, c),
            _ => {
                return Err(CalcError::Solver(format!(
                    "{} = 0 is not linear or quadratic in {}",
                    self, var
                )));
            }
        };
        debug!("{} = 0 solved for {}: {:?}", self, var, roots.iter().map(|r| r.to_string()).collect::<Vec<_>>());
        Ok(roots)
    }
}

fn linear_root(a: &Polynomial, b: &Polynomial) -> Expr {
    match a.as_constant() {
        Some(a) => b.scale(-1.0 / a).to_expr(),
        None => (-(b.to_expr()) / a.to_expr()).simplify(),
    }
}

fn quadratic_roots(a: &Polynomial, b: &Polynomial, c: &Polynomial) -> Vec<Expr> {
    let discriminant = b.mul(b).sub(&a.mul(c).scale(4.0));
    if discriminant.as_constant().is_some_and(|d| d < 0.0) {
        return Vec::new();
    }
    let sqrt = |p: &Polynomial| p.to_expr().pow(Expr::Const(0.5));
    match a.as_constant() {
        Some(a) => {
            // -b/2a ± sqrt(D/4a^2)
            let vertex = b.scale(-0.5 / a);
            if discriminant.is_zero() {
                return vec![vertex.to_expr()];
            }
            let offset = sqrt(&discriminant.scale(0.25 / (a * a)));
            if vertex.is_zero() {
                vec![offset.clone(), -offset]
            } else {
                vec![vertex.to_expr() + offset.clone(), vertex.to_expr() - offset]
            }
        }
        None => {
            let two_a = Expr::Const(2.0) * a.to_expr();
            let minus_b = -(b.to_expr());
            if discriminant.is_zero() {
                return vec![(minus_b / two_a).simplify()];
            }
            let root = sqrt(&discriminant);
            vec![
                (minus_b.clone() + root.clone()) / two_a.clone(),
                (minus_b - root) / two_a,
            ]
        }
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
    fn test_linear_in_z() {
        let roots = parse("z - x^2 - y^2").solve_for("z").unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].to_string(), "x^2 + y^2");
        let roots = parse("2*z + 4*x").solve_for("z").unwrap();
        assert_eq!(roots[0].to_string(), "-2 * x");
    }

    #[test]
    fn test_sphere_has_two_branches() {
        let roots = parse("x^2 + y^2 + z^2 - 1").solve_for("z").unwrap();
        assert_eq!(roots.len(), 2);
        let vars = ["x", "y"];
        let upper = roots[0].eval_expression(&vars, &[0.6, 0.0]).unwrap();
        let lower = roots[1].eval_expression(&vars, &[0.6, 0.0]).unwrap();
        assert_relative_eq!(upper, 0.8, epsilon = 1e-12);
        assert_relative_eq!(lower, -0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_shifted_quadratic() {
        // (z - 1)^2 = x  ->  z = 1 ± sqrt(x)
        let roots = parse("z^2 - 2*z + 1 - x").solve_for("z").unwrap();
        let values: Vec<f64> = roots
            .iter()
            .map(|r| r.eval_expression(&["x"], &[4.0]).unwrap())
            .collect();
        assert_relative_eq!(values[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(values[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_double_root_and_no_root() {
        assert_eq!(parse("z^2").solve_for("z").unwrap(), vec![Expr::Const(0.0)]);
        assert!(parse("z^2 + 1").solve_for("z").unwrap().is_empty());
    }

    #[test]
    fn test_symbolic_leading_coefficient() {
        let roots = parse("x*z - 1").solve_for("z").unwrap();
        assert_relative_eq!(roots[0].eval_expression(&["x"], &[4.0]).unwrap(), 0.25);
    }

    #[test]
    fn test_unsolvable() {
        assert!(parse("z^3 - x").solve_for("z").is_err());
        assert!(parse("x + y").solve_for("z").is_err());
        assert!(parse("sin(z)").solve_for("z").is_err());
    }
}
