use RustedQuadrics::symbolic::polynomial::Polynomial;
use RustedQuadrics::symbolic::quadric_surfaces::{classify, classify_polynomial};
use RustedQuadrics::symbolic::symbolic_engine::Expr;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const SURFACES: [&str; 8] = [
    "x**2 + y**2 + z**2 - 1",
    "x**2 + y**2 - z**2 - 1",
    "-x**2 - y**2 + z**2 - 1",
    "z - x**2 - y**2",
    "z - x**2 + y**2",
    "x**2 + y**2",
    "x**2",
    "x*y + z**2",
];

fn bench_parse_and_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse and classify");
    for (i, input) in SURFACES.iter().enumerate() {
        group.bench_function(format!("surface {}", i + 1), |b| {
            b.iter(|| {
                let expr = Expr::parse_expression(black_box(input)).ok()?;
                classify(&expr, &["x", "y", "z"])
            })
        });
    }
    group.finish();
}

fn bench_classify_expanded(c: &mut Criterion) {
    // products have to be multiplied out before the rules see them
    let expr = Expr::parse_expression("(x - 1)*(x + 1) + (y + z)*(y - z)").unwrap_or(Expr::Const(0.0));
    c.bench_function("classify after expansion", |b| {
        b.iter(|| classify(black_box(&expr), &["x", "y", "z"]))
    });
    if let Ok(poly) = Polynomial::from_expr(&expr, &["x", "y", "z"]) {
        c.bench_function("classify expanded polynomial", |b| {
            b.iter(|| classify_polynomial(black_box(&poly), "x", "y", "z"))
        });
    }
}

criterion_group!(benches, bench_parse_and_classify, bench_classify_expanded);
criterion_main!(benches);
