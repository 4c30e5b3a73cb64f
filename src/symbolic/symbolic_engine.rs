//! # Symbolic Engine Module
//!
//! Core expression tree of the calculator. Everything the menu does (derivatives,
//! critical points, integrals, plots, Lagrange multipliers and the quadric
//! classifier) starts from an [`Expr`] produced by the parser.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "y"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `arcsin`, `arccos`, `arctg`
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - create several variables from a comma-separated string
//! - `set_variable()` / `set_variable_from_map()` - substitute numbers for variables
//! - `substitute_variable()` - substitute an expression for a variable
//! - `all_arguments_are_variables()` - sorted list of free variables
//!
//! The `Display` implementation prints with the minimal set of parentheses,
//! e.g. `x^2 + y^2 - z^2 - 1`.

#![allow(non_camel_case_types)]

use std::collections::HashMap;
use std::fmt;

/// Symbolic expression tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedQuadrics::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = x.clone() * x + Expr::Const(2.0);
/// assert_eq!(expr.to_string(), "x * x + 2");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// left + right
    Add(Box<Expr>, Box<Expr>),
    /// left - right
    Sub(Box<Expr>, Box<Expr>),
    /// left * right
    Mul(Box<Expr>, Box<Expr>),
    /// left / right
    Div(Box<Expr>, Box<Expr>),
    /// base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// e^x
    Exp(Box<Expr>),
    /// natural logarithm
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// tangent, mathematical notation 'tg'
    tg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    /// arctangent, mathematical notation 'arctg'
    arctg(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                match rhs.split_sign() {
                    (true, magnitude) => {
                        write!(f, " - ")?;
                        magnitude.fmt_operand(f, 2)
                    }
                    (false, _) => {
                        write!(f, " + ")?;
                        rhs.fmt_operand(f, 1)
                    }
                }
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, " - ")?;
                rhs.fmt_operand(f, 2)
            }
            Expr::Mul(lhs, rhs) => {
                if let Expr::Const(c) = lhs.as_ref() {
                    if *c == -1.0 {
                        write!(f, "-")?;
                        return rhs.fmt_operand(f, 2);
                    }
                    if *c < 0.0 {
                        write!(f, "-{} * ", -c)?;
                        return rhs.fmt_operand(f, 2);
                    }
                }
                lhs.fmt_operand(f, 2)?;
                write!(f, " * ")?;
                rhs.fmt_operand(f, 2)
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_operand(f, 2)?;
                write!(f, " / ")?;
                rhs.fmt_operand(f, 3)
            }
            Expr::Pow(base, exp) => {
                base.fmt_operand(f, 4)?;
                write!(f, "^")?;
                exp.fmt_operand(f, 4)
            }
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let vars = Expr::Symbols("x, y, z");
    /// assert_eq!(vars.len(), 3);
    /// ```
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// Rebuilds the node with `f` applied to every direct child.
    pub(crate) fn map_children<F>(&self, f: F) -> Expr
    where
        F: Fn(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Mul(lhs, rhs) => Expr::Mul(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Div(lhs, rhs) => Expr::Div(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Pow(base, exp) => Expr::Pow(Box::new(f(base)), Box::new(f(exp))),
            Expr::Exp(expr) => Expr::Exp(Box::new(f(expr))),
            Expr::Ln(expr) => Expr::Ln(Box::new(f(expr))),
            Expr::sin(expr) => Expr::sin(Box::new(f(expr))),
            Expr::cos(expr) => Expr::cos(Box::new(f(expr))),
            Expr::tg(expr) => Expr::tg(Box::new(f(expr))),
            Expr::arcsin(expr) => Expr::arcsin(Box::new(f(expr))),
            Expr::arccos(expr) => Expr::arccos(Box::new(f(expr))),
            Expr::arctg(expr) => Expr::arctg(Box::new(f(expr))),
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        match self {
            Expr::Var(name) if name == var => Expr::Const(value),
            _ => self.map_children(|child| child.set_variable(var, value)),
        }
    }

    /// Substitutes every variable present in `var_map` with its value.
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, f64>) -> Expr {
        match self {
            Expr::Var(name) if var_map.contains_key(name) => Expr::Const(var_map[name]),
            _ => self.map_children(|child| child.set_variable_from_map(var_map)),
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_children(|child| child.substitute_variable(var, expr)),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::arcsin(expr)
            | Expr::arccos(expr)
            | Expr::arctg(expr) => expr.contains_variable(var_name),
        }
    }

    /// Extracts all unique variable names, sorted alphabetically.
    ///
    /// The calculator uses this order as "the" variable order of a function,
    /// so for `z - x^2 - y^2` the variables are `["x", "y", "z"]`.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Expr::Var(name) => vars.push(name.clone()),
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_variables(vars);
                rhs.collect_variables(vars);
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::arcsin(expr)
            | Expr::arccos(expr)
            | Expr::arctg(expr) => expr.collect_variables(vars),
        }
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// true if expression is Const(0.0)
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Numeric value of a constant node.
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }

    //__________________________________PRINTING HELPERS____________________________________

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Const(c) if *c < 0.0 => 1,
            Expr::Mul(lhs, _) if matches!(lhs.as_ref(), Expr::Const(c) if *c < 0.0) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Pow(..) => 3,
            _ => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    /// Splits a leading minus off a term: `-3 * x` -> (true, `3 * x`).
    fn split_sign(&self) -> (bool, Expr) {
        match self {
            Expr::Const(c) if *c < 0.0 => (true, Expr::Const(-c)),
            Expr::Mul(lhs, rhs) => match lhs.as_ref() {
                Expr::Const(c) if *c == -1.0 => (true, rhs.as_ref().clone()),
                Expr::Const(c) if *c < 0.0 => (true, Expr::Const(-c) * rhs.as_ref().clone()),
                _ => (false, self.clone()),
            },
            _ => (false, self.clone()),
        }
    }
}

//___________________________________MACROS____________________________________

/// Macro to create symbolic variables from a comma-separated list
/// Usage: symbols!(x, y, z) -> creates variables x, y, z
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        (
            $(
                $crate::symbolic::symbolic_engine::Expr::Var(stringify!($var).to_string())
            ),+
        )
    };
}
