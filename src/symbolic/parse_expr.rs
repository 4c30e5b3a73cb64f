use crate::errors::{CalcError, CalcResult};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{
    brackets_are_balanced, find_leftmost_char_outside_brackets, find_pair_to_this_bracket,
    find_rightmost_operator_outside_brackets,
};
use log::debug;
use std::f64::consts::{E, PI};
/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use RustedQuadrics::symbolic::symbolic_engine::Expr;
/// let parsed = Expr::parse_expression("x**2 + y^2 - 1").unwrap();
/// assert_eq!(parsed.all_arguments_are_variables(), vec!["x", "y"]);
/// ```
//                  search recursion diagram
//                "y^2+exp(x)-x^2*z"                |
//                |       left  | right             |
//                |_________________________________|
//                |     split by rightmost + or -   |
//                |_________________________________|
//                |  y^2+exp(x) |   x^2*z           |
//                |       |     |     |             |
//                |______\|/____|____\|/____________|
//                |   split +   | split by * or /   |
//                |_____________|___________________|
//                | y^2 |exp(x) |  x^2  |   z       |
//                |_\|/_|__\|/__|__\|/__|___________|
//                |  ^  | func  |   ^   |  atom     |
//                  etc...
pub fn parse_expression_func(input: &str) -> CalcResult<Expr> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace("**", "^");
    if normalized.is_empty() {
        return Err(CalcError::Parse("empty expression".to_string()));
    }
    if !brackets_are_balanced(&normalized) {
        return Err(CalcError::Parse(format!("unbalanced brackets in '{}'", input)));
    }
    parse_node(&normalized)
}

fn parse_node(input: &str) -> CalcResult<Expr> {
    if input.is_empty() {
        return Err(CalcError::Parse("missing operand".to_string()));
    }
    // addition and subtraction, left-associative
    if let Some(pos) = find_rightmost_operator_outside_brackets(input, &['+', '-']) {
        let lhs = parse_node(&input[..pos])?;
        let rhs = parse_node(&input[pos + 1..])?;
        return Ok(if input[pos..].starts_with('+') {
            lhs + rhs
        } else {
            lhs - rhs
        });
    }
    // multiplication and division, left-associative
    if let Some(pos) = find_rightmost_operator_outside_brackets(input, &['*', '/']) {
        let lhs = parse_node(&input[..pos])?;
        let rhs = parse_node(&input[pos + 1..])?;
        return Ok(if input[pos..].starts_with('*') {
            lhs * rhs
        } else {
            lhs / rhs
        });
    }
    // unary signs bind weaker than powers: -x^2 = -(x^2)
    if let Some(rest) = input.strip_prefix('-') {
        return Ok(match parse_node(rest)? {
            Expr::Const(c) => Expr::Const(-c),
            inner => -inner,
        });
    }
    if let Some(rest) = input.strip_prefix('+') {
        return parse_node(rest);
    }
    // power, right-associative
    if let Some(pos) = find_leftmost_char_outside_brackets(input, '^') {
        let base = parse_node(&input[..pos])?;
        let exponent = parse_node(&input[pos + 1..])?;
        return Ok(base.pow(exponent));
    }
    let last = input.len() - 1;
    if input.starts_with('(') && find_pair_to_this_bracket(input, 0) == Some(last) {
        return parse_node(&input[1..last]);
    }
    if input.ends_with(')') {
        if let Some(open) = input.find('(') {
            if find_pair_to_this_bracket(input, open) == Some(last) {
                let argument = parse_node(&input[open + 1..last])?;
                return apply_function(&input[..open], argument);
            }
        }
    }
    parse_atom(input)
}

fn apply_function(name: &str, arg: Expr) -> CalcResult<Expr> {
    let expr = match name {
        "exp" => Expr::Exp(arg.boxed()),
        "ln" | "log" => Expr::Ln(arg.boxed()),
        "sin" => Expr::sin(arg.boxed()),
        "cos" => Expr::cos(arg.boxed()),
        "tan" | "tg" => Expr::tg(arg.boxed()),
        "asin" | "arcsin" => Expr::arcsin(arg.boxed()),
        "acos" | "arccos" => Expr::arccos(arg.boxed()),
        "atan" | "arctan" | "arctg" => Expr::arctg(arg.boxed()),
        "sqrt" => arg.pow(Expr::Const(0.5)),
        _ => return Err(CalcError::Parse(format!("unknown function '{}'", name))),
    };
    Ok(expr)
}

fn parse_atom(input: &str) -> CalcResult<Expr> {
    let first = input.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() || first == '.' {
        return input
            .parse::<f64>()
            .map(Expr::Const)
            .map_err(|_| CalcError::Parse(format!("invalid number '{}'", input)));
    }
    match input {
        "pi" => return Ok(Expr::Const(PI)),
        "E" => return Ok(Expr::Const(E)),
        _ => {}
    }
    let is_identifier = (first.is_alphabetic() || first == '_')
        && input.chars().all(|c| c.is_alphanumeric() || c == '_');
    if is_identifier {
        Ok(Expr::Var(input.to_string()))
    } else {
        Err(CalcError::Parse(format!("unexpected token '{}'", input)))
    }
}

impl Expr {
    /// Parses a mathematical expression from string representation.
    ///
    /// # Supported Syntax
    /// - Variables: x, y, var_name
    /// - Constants: 3.14, 2.5e-3, pi, E
    /// - Operators: +, -, *, /, ^ and ** for powers
    /// - Functions: exp, ln/log, sin, cos, tan/tg, asin, acos, atan, sqrt
    /// - Parentheses for grouping
    pub fn parse_expression(input: &str) -> CalcResult<Expr> {
        let expr = parse_expression_func(input)?;
        debug!("parsed '{}' as {}", input, expr);
        Ok(expr)
    }

    /// Parses multiple expressions, stopping at the first failure.
    pub fn parse_vector_expression(input: &[&str]) -> CalcResult<Vec<Expr>> {
        input.iter().map(|s| Expr::parse_expression(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    #[test]
    fn test_parse_sum_is_left_associative() {
        let parsed = Expr::parse_expression("x - y + z").unwrap();
        assert_eq!(parsed, (var("x") - var("y")) + var("z"));
    }

    #[test]
    fn test_parse_python_power() {
        let a = Expr::parse_expression("x**2").unwrap();
        let b = Expr::parse_expression("x^2").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, var("x").pow(Expr::Const(2.0)));
    }

    #[test]
    fn test_parse_unary_minus_binds_weaker_than_power() {
        let parsed = Expr::parse_expression("-x^2").unwrap();
        assert_eq!(parsed, -(var("x").pow(Expr::Const(2.0))));
        let parsed = Expr::parse_expression("-2*x").unwrap();
        assert_eq!(parsed, Expr::Const(-2.0) * var("x"));
    }

    #[test]
    fn test_parse_division_chain() {
        let parsed = Expr::parse_expression("a/b*c").unwrap();
        assert_eq!(parsed, (var("a") / var("b")) * var("c"));
    }

    #[test]
    fn test_parse_functions_and_constants() {
        let parsed = Expr::parse_expression("sin(x*y^2) + sqrt(x) + pi").unwrap();
        let expected = Expr::sin((var("x") * var("y").pow(Expr::Const(2.0))).boxed())
            + var("x").pow(Expr::Const(0.5))
            + Expr::Const(PI);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_scientific_notation() {
        let parsed = Expr::parse_expression("1e-3*x").unwrap();
        assert_eq!(parsed, Expr::Const(1e-3) * var("x"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Expr::parse_expression("").is_err());
        assert!(Expr::parse_expression("x +").is_err());
        assert!(Expr::parse_expression("(x + 1").is_err());
        assert!(Expr::parse_expression("foo(x)").is_err());
        assert!(Expr::parse_expression("x $ y").is_err());
    }

    #[test]
    fn test_parse_vector_expression() {
        let exprs = Expr::parse_vector_expression(&["x^2+y^2-10", "x-y-4"]).unwrap();
        assert_eq!(exprs.len(), 2);
        assert!(Expr::parse_vector_expression(&["x", "*"]).is_err());
    }
}
