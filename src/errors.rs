//! crate-wide error type
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("Expression is not a polynomial: {0}")]
    NotPolynomial(String),
    #[error("Integration error: {0}")]
    Integration(String),
    #[error("Solver error: {0}")]
    Solver(String),
    #[error("Plot error: {0}")]
    Plot(String),
    #[error("Settings error: {0}")]
    Settings(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

pub type CalcResult<T> = Result<T, CalcError>;
