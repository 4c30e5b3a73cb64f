//! PNG plots of curves, explicit surfaces and implicit quadrics
use crate::Utils::settings_parser::PlotSettings;
use crate::errors::{CalcError, CalcResult};
use crate::symbolic::quadric_surfaces::classify;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::LambdaFn;
use crate::symbolic::utils::linspace;
use chrono::Local;
use log::{debug, info};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

fn plot_err<E: std::fmt::Debug>(e: E) -> CalcError {
    CalcError::Plot(format!("{:?}", e))
}

/// Samples of `f` over `xs × ys`, `values[i][j] = f(xs[i], ys[j])`
pub fn sample_grid(f: &LambdaFn, xs: &[f64], ys: &[f64]) -> Vec<Vec<f64>> {
    xs.iter()
        .map(|&x| ys.iter().map(|&y| f(&[x, y][..])).collect())
        .collect()
}

/// finite `(min, max)` of the samples, widened when flat; `None` if nothing is finite
fn finite_range<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return None;
    }
    if max - min < 1e-12 {
        Some((min - 1.0, max + 1.0))
    } else {
        Some((min, max))
    }
}

/// `z`, or `z_`, `z__`... when `x` or `y` is already called so
fn height_name(x: &str, y: &str) -> String {
    let mut name = "z".to_string();
    while name == x || name == y {
        name.push('_');
    }
    name
}

/// Title of the graph of `z = f(x, y)`: the surface label when `z - f` is a quadric
pub fn surface_title(f: &Expr, x: &str, y: &str) -> String {
    let z = height_name(x, y);
    let relation = Expr::Var(z.clone()) - f.clone();
    match classify(&relation, &[x, y, &z]) {
        Some(kind) => format!("Surface: {}  ({} = {})", kind, z, f),
        None => format!("f({}, {}) = {}", x, y, f),
    }
}

/// Title of the implicit surface `expr = 0`
pub fn implicit_title(expr: &Expr, x: &str, y: &str, z: &str) -> String {
    match classify(expr, &[x, y, z]) {
        Some(kind) => format!("Surface: {}  ({} = 0)", kind, expr),
        None => format!("{} = 0", expr),
    }
}

/// The explicit branches `z = g(x, y)` of `expr = 0`
pub fn implicit_branches(expr: &Expr, z: &str) -> CalcResult<Vec<Expr>> {
    let roots = expr
        .solve_for(z)
        .map_err(|e| {
            debug!("{}", e);
            CalcError::Plot("could not solve for z".to_string())
        })?;
    if roots.is_empty() {
        return Err(CalcError::Plot("could not solve for z".to_string()));
    }
    Ok(roots)
}

fn output_path(settings: &PlotSettings, stem: &str) -> CalcResult<PathBuf> {
    let dir = Path::new(&settings.output_dir);
    std::fs::create_dir_all(dir)?;
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S%.3f");
    Ok(dir.join(format!("{}_{}.png", stem, date_and_time)))
}

/// Curve of `f(var)` over `settings.curve_range`; undefined samples break the line.
pub fn plot_2d(f: &Expr, var: &str, settings: &PlotSettings) -> CalcResult<PathBuf> {
    let func = f.lambdify1D(var)?;
    let (start, end) = settings.curve_range;
    let points: Vec<(f64, f64)> = linspace(start, end, settings.curve_points)
        .into_iter()
        .map(|x| (x, func(x)))
        .collect();
    let (y_min, y_max) = finite_range(points.iter().map(|(_, y)| y))
        .ok_or_else(|| CalcError::Plot(format!("{} has no real values on [{}, {}]", f, start, end)))?;

    let path = output_path(settings, "curve")?;
    {
        let root_area = BitMapBackend::new(&path, (settings.width, settings.height)).into_drawing_area();
        root_area.fill(&WHITE).map_err(plot_err)?;
        let mut chart = ChartBuilder::on(&root_area)
            .caption(format!("f({}) = {}", var, f), ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(start..end, y_min..y_max)
            .map_err(plot_err)?;
        chart
            .configure_mesh()
            .x_desc(var)
            .y_desc(format!("f({})", var))
            .draw()
            .map_err(plot_err)?;
        for segment in points.split(|(_, y)| !y.is_finite()).filter(|s| !s.is_empty()) {
            chart
                .draw_series(LineSeries::new(segment.iter().copied(), &Palette99::pick(0)))
                .map_err(plot_err)?;
        }
        root_area.present().map_err(plot_err)?;
    }
    info!("plot saved to {}", path.display());
    Ok(path)
}

/// Graph of `z = f(x, y)` over the settings grid.
pub fn plot_3d(f: &Expr, x: &str, y: &str, settings: &PlotSettings) -> CalcResult<PathBuf> {
    let func = f.lambdify(&[x, y])?;
    let title = surface_title(f, x, y);
    draw_surfaces(&[func], &title, x, y, settings)
}

/// Implicit surface `expr = 0`, drawn as every real branch `z = g(x, y)`.
pub fn plot_implicit_quadric(
    expr: &Expr,
    x: &str,
    y: &str,
    z: &str,
    settings: &PlotSettings,
) -> CalcResult<PathBuf> {
    let branches = implicit_branches(expr, z)?
        .iter()
        .map(|b| b.lambdify(&[x, y]))
        .collect::<CalcResult<Vec<_>>>()?;
    let title = implicit_title(expr, x, y, z);
    draw_surfaces(&branches, &title, x, y, settings)
}

fn draw_surfaces(
    branches: &[LambdaFn],
    title: &str,
    x: &str,
    y: &str,
    settings: &PlotSettings,
) -> CalcResult<PathBuf> {
    let xs = linspace(settings.x_range.0, settings.x_range.1, settings.grid_points);
    let ys = linspace(settings.y_range.0, settings.y_range.1, settings.grid_points);
    let samples: Vec<Vec<Vec<f64>>> = branches.iter().map(|b| sample_grid(b, &xs, &ys)).collect();
    let (z_min, z_max) = finite_range(samples.iter().flatten().flatten())
        .ok_or_else(|| CalcError::Plot("surface has no real points in the plotted range".to_string()))?;

    let path = output_path(settings, "surface")?;
    {
        let root_area = BitMapBackend::new(&path, (settings.width, settings.height)).into_drawing_area();
        root_area.fill(&WHITE).map_err(plot_err)?;
        let mut chart = ChartBuilder::on(&root_area)
            .caption(title, ("sans-serif", 30))
            .margin(20)
            .build_cartesian_3d(
                settings.x_range.0..settings.x_range.1,
                z_min..z_max,
                settings.y_range.0..settings.y_range.1,
            )
            .map_err(plot_err)?;
        chart.with_projection(|mut pb| {
            pb.yaw = 0.6;
            pb.pitch = 0.35;
            pb.scale = 0.85;
            pb.into_matrix()
        });
        chart
            .configure_axes()
            .x_labels(5)
            .y_labels(5)
            .z_labels(5)
            .draw()
            .map_err(plot_err)?;

        let (xs, ys) = (&xs, &ys);
        for (k, values) in samples.iter().enumerate() {
            let style = Palette99::pick(k).mix(0.6).filled();
            // one quad per grid cell, cells touching an undefined sample are left out
            let cells = (0..xs.len().saturating_sub(1)).flat_map(move |i| {
                (0..ys.len().saturating_sub(1)).filter_map(move |j| {
                    let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
                    corners
                        .iter()
                        .map(|&(a, b)| {
                            let v = values[a][b];
                            v.is_finite().then_some((xs[a], v, ys[b]))
                        })
                        .collect::<Option<Vec<_>>>()
                })
            });
            chart
                .draw_series(cells.map(|c| Polygon::new(c, style)))
                .map_err(plot_err)?;
        }
        root_area.present().map_err(plot_err)?;
    }
    info!("{} : plot saved to {} ({} {} grid)", title, path.display(), x, y);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    #[test]
    fn test_surface_titles() {
        assert_eq!(
            surface_title(&parse("x^2 + y^2"), "x", "y"),
            "Surface: Elliptic paraboloid  (z = x^2 + y^2)"
        );
        assert_eq!(
            surface_title(&parse("x^2 - y^2"), "x", "y"),
            "Surface: Hyperbolic paraboloid  (z = x^2 - y^2)"
        );
        assert_eq!(surface_title(&parse("sin(x)*y"), "x", "y"), "f(x, y) = sin(x) * y");
        // the height variable does not clash with the plotted ones
        assert!(surface_title(&parse("y^2 + z^2"), "y", "z").starts_with("Surface: Elliptic paraboloid"));
    }

    #[test]
    fn test_implicit_title() {
        let sphere = parse("x^2 + y^2 + z^2 - 1");
        assert_eq!(
            implicit_title(&sphere, "x", "y", "z"),
            "Surface: Ellipsoid  (x^2 + y^2 + z^2 - 1 = 0)"
        );
        assert_eq!(implicit_title(&parse("x*y + z^2"), "x", "y", "z"), "x * y + z^2 = 0");
    }

    #[test]
    fn test_implicit_branches() {
        assert_eq!(implicit_branches(&parse("x^2 + y^2 + z^2 - 1"), "z").unwrap().len(), 2);
        assert_eq!(implicit_branches(&parse("z - x^2 - y^2"), "z").unwrap().len(), 1);
        let no_branch = implicit_branches(&parse("z^2 + 1"), "z");
        assert!(matches!(no_branch, Err(CalcError::Plot(msg)) if msg == "could not solve for z"));
        assert!(implicit_branches(&parse("z^3 - x"), "z").is_err());
    }

    #[test]
    fn test_sampling_marks_missing_points() {
        let upper = implicit_branches(&parse("x^2 + y^2 + z^2 - 1"), "z").unwrap()[0]
            .lambdify(&["x", "y"])
            .unwrap();
        let grid = sample_grid(&upper, &[0.0, 2.0], &[0.0]);
        assert!((grid[0][0] - 1.0).abs() < 1e-12);
        assert!(grid[1][0].is_nan());
        assert_eq!(finite_range([1.0, f64::NAN, 3.0].iter()), Some((1.0, 3.0)));
        assert_eq!(finite_range([2.0].iter()), Some((1.0, 3.0)));
        assert_eq!(finite_range([f64::NAN].iter()), None);
    }

    #[test]
    fn test_undefined_curve_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PlotSettings {
            output_dir: dir.path().to_string_lossy().to_string(),
            curve_range: (-3.0, -1.0),
            ..PlotSettings::default()
        };
        assert!(matches!(plot_2d(&parse("ln(x)"), "x", &settings), Err(CalcError::Plot(_))));
    }
}
