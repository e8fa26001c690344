use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlgate::clause::{WhereClause, WhereSpec};
use sqlgate::name::NameExpression;

/// `n` named equalities followed by a group of `n` OR-joined string conditions:
/// `col0 = ? AND … AND (c0 > ? OR c1 > ? …)`
fn build_spec(n: usize) -> WhereSpec {
    let mut spec = WhereSpec::new();
    for i in 0..n {
        spec = spec.eq(format!("t.col{i}"), i as i64);
    }
    let mut group = WhereSpec::new();
    for i in 0..n {
        group = group.expr(format!("c{i} > {i}"));
    }
    spec.group(group)
}

/// Groups nested `depth` levels deep, two conditions per level.
fn build_nested(depth: usize) -> WhereSpec {
    let mut spec = WhereSpec::new().expr("a = 1").expr("b = 2");
    for i in 0..depth {
        spec = WhereSpec::new().expr(format!("d{i} = {i}")).group(spec);
    }
    spec
}

fn bench_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_clause/flat");

    for n in [1, 5, 10, 50, 100] {
        let spec = build_spec(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &spec, |b, spec| {
            b.iter(|| black_box(WhereClause::build(spec)));
        });
    }

    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_clause/nested");

    for depth in [1, 4, 16, 64] {
        let spec = build_nested(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &spec, |b, spec| {
            b.iter(|| black_box(WhereClause::build(spec)));
        });
    }

    group.finish();
}

fn bench_name_parse(c: &mut Criterion) {
    let tokens = [
        "id",
        "u.email",
        "count(o.id) orders",
        "concat(u.first_name, u.last_name) AS full_name",
    ];

    c.bench_function("name_expression/parse", |b| {
        b.iter(|| {
            for token in tokens {
                black_box(NameExpression::parse(token).to_string());
            }
        });
    });
}

criterion_group!(benches, bench_flat, bench_nested, bench_name_parse);
criterion_main!(benches);
