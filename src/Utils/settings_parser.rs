/// parse a settings document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4"
/// (titles followed by pairs key - list of values) and turn it into the calculator settings.
/*
example of a settings file:

 // plot grid and output
 plot
 grid_points: 100
 x_range: -5, 5
 y_range: -5, 5
 output_dir: plots
 solver
 tolerance: 1e-9
 logging
 loglevel: warn
 log_to_file: false

every key is optional, missing keys keep their defaults
*/
use crate::Utils::logger::level_filter;
use crate::errors::{CalcError, CalcResult};
use log::info;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Vec<Value>>;

/// env variable holding the path of the settings file
pub const SETTINGS_ENV: &str = "CALC_SETTINGS";
/// settings file looked up in the working directory
pub const SETTINGS_FILE: &str = "calc_settings.txt";

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self { Some(s) } else { None }
    }

    /// integers are accepted where a float is expected
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self { Some(*i) } else { None }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self { Some(*b) } else { None }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

//___________________________________NOM PARSERS____________________________________

/// word characters without spaces
fn parse_identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

pub(crate) fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = parse_identifier(input)?;
    Ok((input.trim(), result))
}

pub(crate) fn parse_key(input: &str) -> IResult<&str, String> {
    parse_identifier(input)
}

pub(crate) fn parse_value(input: &str) -> IResult<&str, Value> {
    // single value: everything up to a comma, whitespace or semicolon
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<Value, String> {
        let s = s.trim();
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    });
    value_parser.parse(input)
}

pub(crate) fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = space0(input)?;
    let separator_coma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list0(separator_coma, parse_value);
    value_parser.parse(input)
}

pub(crate) fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_key, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim_start(), result))
}

pub(crate) fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// drops comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a map title -> key -> values.
pub fn parse_document(input: &str) -> CalcResult<DocumentMap> {
    let filtered = filter_comments(input);
    if filtered.trim().is_empty() {
        return Ok(DocumentMap::new());
    }
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    let (remaining, sections) = parser
        .parse(filtered.as_str())
        .map_err(|e| CalcError::Settings(format!("parsing error: {:?}", e)))?;
    if !remaining.trim().is_empty() {
        return Err(CalcError::Settings(format!(
            "failed to parse entire document, remaining: '{}'",
            remaining
        )));
    }
    let mut result = DocumentMap::new();
    for (title, section) in sections {
        result.entry(title).or_default().extend(section);
    }
    Ok(result)
}

//___________________________________SETTINGS____________________________________

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    /// samples per axis of a 3D surface
    pub grid_points: usize,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// abscissa range of a 2D curve
    pub curve_range: (f64, f64),
    pub curve_points: usize,
    pub output_dir: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            grid_points: 100,
            x_range: (-5.0, 5.0),
            y_range: (-5.0, 5.0),
            curve_range: (-10.0, 10.0),
            curve_points: 500,
            output_dir: ".".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
    /// starting points per unknown for the multistart Newton-Raphson
    pub starts_per_axis: usize,
    pub search_range: (f64, f64),
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            tolerance: 1e-9,
            max_iterations: 100,
            starts_per_axis: 5,
            search_range: (-5.0, 5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureSettings {
    /// Gauss-Legendre nodes per dimension
    pub degree: usize,
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        QuadratureSettings { degree: 32 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub loglevel: String,
    pub log_to_file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            loglevel: "warn".to_string(),
            log_to_file: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalcSettings {
    pub plot: PlotSettings,
    pub solver: SolverSettings,
    pub quadrature: QuadratureSettings,
    pub logging: LoggingSettings,
}

impl CalcSettings {
    /// Settings from a parsed document; absent keys keep their defaults.
    pub fn from_document(document: &DocumentMap) -> CalcResult<CalcSettings> {
        let mut settings = CalcSettings::default();
        for (title, section) in document {
            for (key, values) in section {
                settings.apply(title, key, values)?;
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_text(input: &str) -> CalcResult<CalcSettings> {
        Self::from_document(&parse_document(input)?)
    }

    pub fn load(path: &Path) -> CalcResult<CalcSettings> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_text(&content)?;
        info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Reads the file named by `CALC_SETTINGS`, else `calc_settings.txt`; defaults when neither exists.
    pub fn load_default() -> CalcResult<CalcSettings> {
        if let Ok(path) = std::env::var(SETTINGS_ENV) {
            return Self::load(Path::new(&path));
        }
        let path = Path::new(SETTINGS_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(CalcSettings::default())
        }
    }

    fn apply(&mut self, title: &str, key: &str, values: &[Value]) -> CalcResult<()> {
        match (title, key) {
            ("plot", "grid_points") => self.plot.grid_points = count(title, key, values)?,
            ("plot", "x_range") => self.plot.x_range = range(title, key, values)?,
            ("plot", "y_range") => self.plot.y_range = range(title, key, values)?,
            ("plot", "curve_range") => self.plot.curve_range = range(title, key, values)?,
            ("plot", "curve_points") => self.plot.curve_points = count(title, key, values)?,
            ("plot", "output_dir") => self.plot.output_dir = text(title, key, values)?,
            ("plot", "width") => self.plot.width = count(title, key, values)? as u32,
            ("plot", "height") => self.plot.height = count(title, key, values)? as u32,
            ("solver", "tolerance") => self.solver.tolerance = float(title, key, values)?,
            ("solver", "max_iterations") => self.solver.max_iterations = count(title, key, values)?,
            ("solver", "starts_per_axis") => self.solver.starts_per_axis = count(title, key, values)?,
            ("solver", "search_range") => self.solver.search_range = range(title, key, values)?,
            ("quadrature", "degree") => self.quadrature.degree = count(title, key, values)?,
            ("logging", "loglevel") => self.logging.loglevel = text(title, key, values)?.to_lowercase(),
            ("logging", "log_to_file") => self.logging.log_to_file = boolean(title, key, values)?,
            _ => {
                return Err(CalcError::Settings(format!("unknown setting '{} {}'", title, key)));
            }
        }
        Ok(())
    }

    fn validate(&self) -> CalcResult<()> {
        let ranges = [
            ("plot x_range", self.plot.x_range),
            ("plot y_range", self.plot.y_range),
            ("plot curve_range", self.plot.curve_range),
            ("solver search_range", self.solver.search_range),
        ];
        if let Some((name, _)) = ranges.iter().find(|(_, (a, b))| a >= b) {
            return Err(CalcError::Settings(format!("{}: lower bound must be below upper bound", name)));
        }
        if self.plot.grid_points < 2 || self.plot.curve_points < 2 {
            return Err(CalcError::Settings("plot needs at least 2 points per axis".to_string()));
        }
        if self.solver.tolerance <= 0.0 || self.solver.max_iterations == 0 || self.solver.starts_per_axis == 0 {
            return Err(CalcError::Settings(
                "solver tolerance, max_iterations and starts_per_axis must be positive".to_string(),
            ));
        }
        if self.quadrature.degree < 2 {
            return Err(CalcError::Settings("quadrature degree must be at least 2".to_string()));
        }
        level_filter(&self.logging.loglevel)?;
        Ok(())
    }
}

fn single<'a>(title: &str, key: &str, values: &'a [Value]) -> CalcResult<&'a Value> {
    match values {
        [value] => Ok(value),
        _ => Err(CalcError::Settings(format!("'{} {}' expects one value", title, key))),
    }
}

fn wrong_type(title: &str, key: &str, expected: &str) -> CalcError {
    CalcError::Settings(format!("'{} {}' expects {}", title, key, expected))
}

fn count(title: &str, key: &str, values: &[Value]) -> CalcResult<usize> {
    single(title, key, values)?
        .as_integer()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| wrong_type(title, key, "a non-negative integer"))
}

fn float(title: &str, key: &str, values: &[Value]) -> CalcResult<f64> {
    single(title, key, values)?
        .as_float()
        .ok_or_else(|| wrong_type(title, key, "a number"))
}

fn boolean(title: &str, key: &str, values: &[Value]) -> CalcResult<bool> {
    single(title, key, values)?
        .as_boolean()
        .ok_or_else(|| wrong_type(title, key, "true or false"))
}

fn text(title: &str, key: &str, values: &[Value]) -> CalcResult<String> {
    Ok(single(title, key, values)?.to_string())
}

fn range(title: &str, key: &str, values: &[Value]) -> CalcResult<(f64, f64)> {
    match values {
        [a, b] => match (a.as_float(), b.as_float()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(wrong_type(title, key, "two numbers")),
        },
        _ => Err(wrong_type(title, key, "two numbers")),
    }
}
