//! interactive loop of the calculator
use crate::Utils::settings_parser::CalcSettings;
use crate::calculator::report::{
    critical_points_table, derivatives_table, integral_summary, lagrange_table, plot_summary,
};
use crate::calculator::session::{
    MAX_DIMENSIONS, UserFunction, definite_integral, derivatives, lagrange, plot,
};
use crate::errors::{CalcError, CalcResult};
use crate::numerical::quadrature::IntegrationBound;
use crate::symbolic::symbolic_engine::Expr;
use log::{error, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

const MENU: &str = "
Multivariable calculator
  1. Derivatives and critical points
  2. Definite integral
  3. Plot
  4. Lagrange multipliers
  5. Exit";

/// Source of user input; `None` ends the session (Ctrl-C, Ctrl-D).
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> CalcResult<Option<String>>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> CalcResult<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                let _ = self.add_history_entry(line.as_str());
                Ok(Some(line.trim().to_string()))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(CalcError::Readline(e)),
        }
    }
}

/// what the loop does after a menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Menu<S: LineSource> {
    source: S,
    settings: CalcSettings,
}

impl Menu<DefaultEditor> {
    pub fn with_terminal(settings: CalcSettings) -> CalcResult<Self> {
        Ok(Menu::new(DefaultEditor::new()?, settings))
    }
}

impl<S: LineSource> Menu<S> {
    pub fn new(source: S, settings: CalcSettings) -> Self {
        Menu { source, settings }
    }

    pub fn run(&mut self) -> CalcResult<()> {
        loop {
            println!("{}", MENU);
            let Some(choice) = self.source.read_line("Choose an option (1-5): ")? else {
                return Ok(());
            };
            let flow = match choice.as_str() {
                "1" => self.derivatives_entry(),
                "2" => self.integral_entry(),
                "3" => self.plot_entry(),
                "4" => self.lagrange_entry(),
                "5" => Ok(Flow::Exit),
                other => {
                    println!("Invalid choice '{}', enter a number from 1 to 5.", other);
                    Ok(Flow::Continue)
                }
            };
            match flow {
                Ok(Flow::Exit) => return Ok(()),
                Ok(Flow::Continue) => {}
                // a failed readline ends the session, any other error is reported
                Err(e @ CalcError::Readline(_)) => return Err(e),
                Err(e) => {
                    error!("{}", e);
                    println!("Error: {}", e);
                }
            }
        }
    }

    /// asks for a function and echoes its variables; `None` for a constant
    fn read_function(&mut self, prompt: &str) -> CalcResult<Option<UserFunction>> {
        let Some(input) = self.source.read_line(prompt)? else {
            return Ok(None);
        };
        let f = UserFunction::parse(&input)?;
        if f.is_constant() {
            warn!("{} has no variables", f.expr);
            println!("The expression has no variables.");
            return Ok(None);
        }
        println!("Variables: {}", f.variables.join(", "));
        Ok(Some(f))
    }

    fn derivatives_entry(&mut self) -> CalcResult<Flow> {
        let Some(f) = self.read_function("f = ")? else {
            return Ok(Flow::Continue);
        };
        let report = derivatives(&f, &self.settings.solver)?;
        println!("{}", derivatives_table(&report));
        match critical_points_table(&report) {
            Some(table) => println!("Critical points:\n{}", table),
            None => println!("No critical points found."),
        }
        Ok(Flow::Continue)
    }

    fn integral_entry(&mut self) -> CalcResult<Flow> {
        let Some(f) = self.read_function("f = ")? else {
            return Ok(Flow::Continue);
        };
        if f.variables.len() > MAX_DIMENSIONS {
            println!("Integrals of more than {} variables are not supported.", MAX_DIMENSIONS);
            return Ok(Flow::Continue);
        }
        let mut bounds = Vec::with_capacity(f.variables.len());
        for var in &f.variables {
            let Some(lower) = self.source.read_line(&format!("lower bound of {}: ", var))? else {
                return Ok(Flow::Exit);
            };
            let Some(upper) = self.source.read_line(&format!("upper bound of {}: ", var))? else {
                return Ok(Flow::Exit);
            };
            bounds.push(IntegrationBound::new(
                var,
                Expr::parse_expression(&lower)?,
                Expr::parse_expression(&upper)?,
            ));
        }
        let report = definite_integral(&f.expr, &bounds, &self.settings.quadrature)?;
        println!("{}", integral_summary(&report));
        Ok(Flow::Continue)
    }

    fn plot_entry(&mut self) -> CalcResult<Flow> {
        let Some(f) = self.read_function("f = ")? else {
            return Ok(Flow::Continue);
        };
        if f.variables.len() > MAX_DIMENSIONS {
            println!("Plotting is supported for 1 to {} variables.", MAX_DIMENSIONS);
            return Ok(Flow::Continue);
        }
        let report = plot(&f, &self.settings)?;
        println!("{}", plot_summary(&report));
        Ok(Flow::Continue)
    }

    fn lagrange_entry(&mut self) -> CalcResult<Flow> {
        let Some(objective) = self.source.read_line("objective f = ")? else {
            return Ok(Flow::Exit);
        };
        let Some(constraint) = self.source.read_line("constraint g = 0, g = ")? else {
            return Ok(Flow::Exit);
        };
        let report = lagrange(&objective, &constraint, &self.settings.solver)?;
        println!("Variables: {}", report.variables.join(", "));
        for equation in &report.equations {
            println!("  {} = 0", equation);
        }
        match lagrange_table(&report) {
            Some(table) => println!("{}", table),
            None => println!("No solution found."),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// replays fixed answers, then behaves like Ctrl-D
    struct Script {
        lines: VecDeque<String>,
        prompts: Vec<String>,
    }

    impl Script {
        fn new(lines: &[&str]) -> Self {
            Script {
                lines: lines.iter().map(|s| s.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl LineSource for &mut Script {
        fn read_line(&mut self, prompt: &str) -> CalcResult<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front())
        }
    }

    fn run(lines: &[&str]) -> Script {
        let mut script = Script::new(lines);
        Menu::new(&mut script, CalcSettings::default()).run().unwrap();
        script
    }

    #[test]
    fn test_exit_and_end_of_input() {
        let script = run(&["5", "1"]);
        assert_eq!(script.lines.len(), 1);
        let script = run(&[]);
        assert_eq!(script.prompts.len(), 1);
    }

    #[test]
    fn test_invalid_choice_reprompts() {
        let script = run(&["7", "abc", "5"]);
        assert_eq!(script.prompts.len(), 3);
        assert!(script.prompts.iter().all(|p| p.starts_with("Choose")));
    }

    #[test]
    fn test_integral_prompts_bounds_per_variable() {
        let script = run(&["2", "x*y", "0", "2", "0", "1", "5"]);
        let bound_prompts: Vec<&String> = script.prompts.iter().filter(|p| p.contains("bound")).collect();
        assert_eq!(
            bound_prompts,
            vec!["lower bound of x: ", "upper bound of x: ", "lower bound of y: ", "upper bound of y: "]
        );
        assert!(script.lines.is_empty());
    }

    #[test]
    fn test_constant_and_bad_input_return_to_menu() {
        // constant expression, then a parse error, then too many variables
        let script = run(&["1", "2 + 3", "1", "(x", "2", "a+b+c+d", "5"]);
        assert!(script.lines.is_empty());
        let menu_prompts = script.prompts.iter().filter(|p| p.starts_with("Choose")).count();
        assert_eq!(menu_prompts, 4);
    }

    #[test]
    fn test_derivatives_and_lagrange_entries() {
        let script = run(&["1", "x^2 + y^2", "4", "x + y", "x^2 + y^2 - 1", "5"]);
        assert!(script.lines.is_empty());
    }
}
