//! # Quadric surface recognition
//!
//! Names the shape family of an implicit equation `f(x, y, z) = 0` by looking at
//! the *syntax* of its expanded polynomial: which squares appear, with which
//! signs, and how many summands there are. No coefficients are fitted and no
//! canonical form is computed, so algebraically equivalent equations written in
//! a different grouping (cross terms, extra constants) may stay unrecognised.
//!
//! The rules are tried in a fixed order and the first match wins:
//!
//! 1. ellipsoid
//! 2. hyperboloid of one / two sheets
//! 3. elliptic / hyperbolic paraboloid
//! 4. elliptic cone
//! 5. elliptic / parabolic cylinder
//!
//! The constant term plays the role of the right-hand side of the canonical
//! forms (`x^2 + y^2 + z^2 - 1` is `x^2 + y^2 + z^2 = 1`) and is not counted by
//! rules 1 and 2. For rule 3 the equation must consist of exactly two
//! summands: the group of terms free of z and the group of terms carrying z,
//! with no constant. Rule 4 wants exactly two terms, no constant, and z
//! somewhere; both terms share an x² or y² factor, or both carry z².
//!
//! # Example
//! ```
//! use RustedQuadrics::symbolic::quadric_surfaces::{classify, SurfaceKind};
//! use RustedQuadrics::symbolic::symbolic_engine::Expr;
//! let f = Expr::parse_expression("z - x**2 - y**2").unwrap();
//! assert_eq!(classify(&f, &["x", "y", "z"]), Some(SurfaceKind::EllipticParaboloid));
//! ```

use crate::symbolic::polynomial::{Polynomial, Term};
use crate::symbolic::symbolic_engine::Expr;
use log::debug;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum SurfaceKind {
    #[strum(to_string = "Ellipsoid")]
    Ellipsoid,
    #[strum(to_string = "Hyperboloid of one sheet")]
    HyperboloidOneSheet,
    #[strum(to_string = "Hyperboloid of two sheets")]
    HyperboloidTwoSheets,
    #[strum(to_string = "Elliptic paraboloid")]
    EllipticParaboloid,
    #[strum(to_string = "Hyperbolic paraboloid")]
    HyperbolicParaboloid,
    #[strum(to_string = "Elliptic cone")]
    EllipticCone,
    #[strum(to_string = "Elliptic cylinder")]
    EllipticCylinder,
    #[strum(to_string = "Parabolic cylinder")]
    ParabolicCylinder,
}

impl SurfaceKind {
    /// textbook equation of the family
    pub fn canonical_form(&self) -> &'static str {
        match self {
            SurfaceKind::Ellipsoid => "x²/a² + y²/b² + z²/c² = 1",
            SurfaceKind::HyperboloidOneSheet => "x²/a² + y²/b² - z²/c² = 1",
            SurfaceKind::HyperboloidTwoSheets => "-x²/a² - y²/b² + z²/c² = 1",
            SurfaceKind::EllipticParaboloid => "z/c = x²/a² + y²/b²",
            SurfaceKind::HyperbolicParaboloid => "z/c = x²/a² - y²/b²",
            SurfaceKind::EllipticCone => "x²/a² + y²/b² = z²/c²",
            SurfaceKind::EllipticCylinder => "x²/a² + y²/b² = 1",
            SurfaceKind::ParabolicCylinder => "x² + 2py = 0",
        }
    }
}

/// Classifies `expr = 0` with `vars` naming x, y and z, in that order.
///
/// Returns `None` when `vars` is not a triple of distinct names, when `expr`
/// contains other symbols or is not a polynomial, or when no rule matches.
pub fn classify(expr: &Expr, vars: &[&str]) -> Option<SurfaceKind> {
    let [x, y, z] = vars else {
        debug!("quadric classification needs 3 variables, got {:?}", vars);
        return None;
    };
    if x == y || y == z || x == z {
        debug!("quadric classification needs distinct variables, got {:?}", vars);
        return None;
    }
    let poly = Polynomial::from_expr(expr, vars)
        .map_err(|e| debug!("{} is not classified: {}", expr, e))
        .ok()?;
    classify_polynomial(&poly, x, y, z)
}

/// Same as [`classify`] on an already expanded polynomial.
pub fn classify_polynomial(poly: &Polynomial, x: &str, y: &str, z: &str) -> Option<SurfaceKind> {
    let view = TripleView::new(poly, x, y, z)?;
    let kind = ellipsoid(&view)
        .or_else(|| hyperboloid(&view))
        .or_else(|| paraboloid(&view))
        .or_else(|| cone(&view))
        .or_else(|| cylinder(&view));
    debug!("{} classified as {:?}", poly.to_expr(), kind);
    kind
}

/// The expanded terms, seen through the (x, y, z) triple.
struct TripleView<'a> {
    x: usize,
    y: usize,
    z: usize,
    terms: Vec<Term<'a>>,
    has_constant: bool,
}

impl<'a> TripleView<'a> {
    fn new(poly: &'a Polynomial, x: &str, y: &str, z: &str) -> Option<Self> {
        let (x, y, z) = (poly.index_of(x)?, poly.index_of(y)?, poly.index_of(z)?);
        let terms: Vec<Term<'a>> = poly.variable_terms().collect();
        let foreign = terms.iter().any(|t| {
            (0..t.monomial.len()).any(|i| i != x && i != y && i != z && t.contains_var(i))
        });
        if foreign {
            return None;
        }
        Some(TripleView {
            x,
            y,
            z,
            terms,
            has_constant: poly.constant_term() != 0.0,
        })
    }

    fn triple(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// (variable index, coefficient) when the term is a pure square of a triple variable
    fn pure_square(&self, term: &Term) -> Option<(usize, f64)> {
        self.triple()
            .into_iter()
            .find_map(|v| term.square_coefficient(v).map(|c| (v, c)))
    }

    fn z_free_terms(&self) -> Vec<&Term<'a>> {
        self.terms.iter().filter(|t| !t.contains_var(self.z)).collect()
    }

    fn z_terms(&self) -> Vec<&Term<'a>> {
        self.terms.iter().filter(|t| t.contains_var(self.z)).collect()
    }

    /// both variable groups present and nothing else
    fn has_two_summands(&self) -> bool {
        !self.has_constant && !self.z_free_terms().is_empty() && !self.z_terms().is_empty()
    }
}

fn ellipsoid(view: &TripleView) -> Option<SurfaceKind> {
    if view.terms.len() != 3 {
        return None;
    }
    let squares: Vec<(usize, f64)> = view
        .terms
        .iter()
        .map(|t| view.pure_square(t))
        .collect::<Option<Vec<_>>>()?;
    let all_vars = view.triple().iter().all(|v| squares.iter().any(|(i, _)| i == v));
    let same_sign =
        squares.iter().all(|(_, c)| *c > 0.0) || squares.iter().all(|(_, c)| *c < 0.0);
    (all_vars && same_sign).then_some(SurfaceKind::Ellipsoid)
}

fn hyperboloid(view: &TripleView) -> Option<SurfaceKind> {
    // terms that are not pure squares are ambiguous and left out
    let (positive, negative) = view
        .terms
        .iter()
        .filter_map(|t| view.pure_square(t))
        .fold((0, 0), |(p, n), (_, c)| if c > 0.0 { (p + 1, n) } else { (p, n + 1) });
    match (positive, negative) {
        (2, 1) => Some(SurfaceKind::HyperboloidOneSheet),
        (1, 2) => Some(SurfaceKind::HyperboloidTwoSheets),
        _ => None,
    }
}

fn paraboloid(view: &TripleView) -> Option<SurfaceKind> {
    if !view.has_two_summands() {
        return None;
    }
    let z_terms = view.z_terms();
    let [z_term] = z_terms.as_slice() else {
        return None;
    };
    let linear_z = z_term.exponent(view.z) == 1
        && !z_term.contains_square(view.x)
        && !z_term.contains_square(view.y);
    if !linear_z {
        return None;
    }
    let rest = view.z_free_terms();
    if rest.len() != 2 {
        return None;
    }
    let x_coeff = rest.iter().find_map(|t| t.square_coefficient(view.x))?;
    let y_coeff = rest.iter().find_map(|t| t.square_coefficient(view.y))?;
    if x_coeff.signum() == y_coeff.signum() {
        Some(SurfaceKind::EllipticParaboloid)
    } else {
        Some(SurfaceKind::HyperbolicParaboloid)
    }
}

fn cone(view: &TripleView) -> Option<SurfaceKind> {
    // z-free pairs are left to the cylinder rule
    if view.has_constant || view.terms.len() != 2 || view.z_terms().is_empty() {
        return None;
    }
    let xy_squares = view
        .terms
        .iter()
        .all(|t| t.contains_square(view.x) || t.contains_square(view.y));
    let z_squares = view.terms.iter().all(|t| t.contains_square(view.z));
    (xy_squares || z_squares).then_some(SurfaceKind::EllipticCone)
}

fn cylinder(view: &TripleView) -> Option<SurfaceKind> {
    if !view.z_terms().is_empty() {
        return None;
    }
    let has_x2 = view.terms.iter().any(|t| t.contains_square(view.x));
    let has_y2 = view.terms.iter().any(|t| t.contains_square(view.y));
    match (has_x2, has_y2) {
        (true, true) => Some(SurfaceKind::EllipticCylinder),
        (true, false) | (false, true) => Some(SurfaceKind::ParabolicCylinder),
        (false, false) => None,
    }
}
