//! tables printed by the menu
use crate::calculator::session::{DerivativeReport, IntegralReport, PlotReport};
use crate::numerical::lagrange::LagrangeReport;
use tabled::{builder::Builder, settings::Style};

/// 6 decimals at most, no trailing zeros
pub fn format_number(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

pub fn derivatives_table(report: &DerivativeReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["derivative", "expression"]);
    for (var, partial) in report.variables.iter().zip(&report.partials) {
        builder.push_record([format!("∂f/∂{}", var), partial.to_string()]);
    }
    render(builder)
}

/// `None` when there is nothing to show
pub fn critical_points_table(report: &DerivativeReport) -> Option<String> {
    if report.critical_points.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    let mut header: Vec<String> = report.variables.clone();
    header.extend(["f".to_string(), "type".to_string()]);
    builder.push_record(header);
    for point in &report.critical_points {
        let mut row: Vec<String> = point.coordinates.iter().map(|&c| format_number(c)).collect();
        row.push(format_number(point.value));
        row.push(point.kind.to_string());
        builder.push_record(row);
    }
    Some(render(builder))
}

pub fn integral_summary(report: &IntegralReport) -> String {
    match &report.exact {
        Some(exact) => format!(
            "Integral = {} ({}, exact {})",
            format_number(report.value),
            report.method,
            exact
        ),
        None => format!("Integral ≈ {} ({})", format_number(report.value), report.method),
    }
}

pub fn plot_summary(report: &PlotReport) -> String {
    match report.surface {
        Some(kind) => format!("{} plotted to {}", kind, report.path.display()),
        None => format!("plot saved to {}", report.path.display()),
    }
}

/// `None` when the system has no solution
pub fn lagrange_table(report: &LagrangeReport) -> Option<String> {
    if report.solutions.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    let mut header = report.variables.clone();
    header.extend([report.multiplier.clone(), "f".to_string()]);
    builder.push_record(header);
    for solution in &report.solutions {
        let mut row: Vec<String> = solution.coordinates.iter().map(|&c| format_number(c)).collect();
        row.push(format_number(solution.lambda));
        row.push(format_number(solution.objective));
        builder.push_record(row);
    }
    Some(render(builder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::session::IntegrationMethod;
    use crate::numerical::critical_points::{CriticalPoint, CriticalPointKind};
    use crate::numerical::lagrange::LagrangeSolution;
    use crate::symbolic::quadric_surfaces::SurfaceKind;
    use crate::symbolic::symbolic_engine::Expr;
    use std::path::PathBuf;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(-1e-9), "0");
    }

    #[test]
    fn test_derivative_tables() {
        let report = DerivativeReport {
            variables: vec!["x".to_string(), "y".to_string()],
            partials: vec![
                Expr::parse_expression("2*x").unwrap(),
                Expr::parse_expression("2*y").unwrap(),
            ],
            critical_points: vec![CriticalPoint {
                coordinates: vec![0.0, 0.0],
                value: 0.0,
                kind: CriticalPointKind::LocalMinimum,
            }],
        };
        let table = derivatives_table(&report);
        assert!(table.contains("∂f/∂x"));
        assert!(table.contains("2 * y"));
        let points = critical_points_table(&report).unwrap();
        assert!(points.contains("local minimum"));

        let empty = DerivativeReport {
            critical_points: Vec::new(),
            ..report
        };
        assert!(critical_points_table(&empty).is_none());
    }

    #[test]
    fn test_summaries() {
        let exact = IntegralReport {
            value: 0.5,
            exact: Some(Expr::Const(0.5)),
            method: IntegrationMethod::Symbolic,
        };
        assert_eq!(integral_summary(&exact), "Integral = 0.5 (symbolic, exact 0.5)");
        let numeric = IntegralReport {
            value: 1.4626517,
            exact: None,
            method: IntegrationMethod::GaussLegendre,
        };
        assert_eq!(integral_summary(&numeric), "Integral ≈ 1.462652 (Gauss-Legendre quadrature)");
        let plot = PlotReport {
            path: PathBuf::from("surface.png"),
            surface: Some(SurfaceKind::Ellipsoid),
        };
        assert_eq!(plot_summary(&plot), "Ellipsoid plotted to surface.png");
    }

    #[test]
    fn test_lagrange_table() {
        let report = LagrangeReport {
            variables: vec!["x".to_string(), "y".to_string()],
            multiplier: "lambda".to_string(),
            equations: Vec::new(),
            solutions: vec![LagrangeSolution {
                coordinates: vec![1.0, 1.0],
                lambda: 1.0,
                objective: 1.0,
            }],
        };
        let table = lagrange_table(&report).unwrap();
        assert!(table.contains("lambda"));
        assert!(lagrange_table(&LagrangeReport { solutions: Vec::new(), ..report }).is_none());
    }
}
