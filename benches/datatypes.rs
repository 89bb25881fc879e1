use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xsd_datatypes::{FacetSet, SimpleTypeDecl, TypeUniverse};

fn sample_values() -> Vec<(&'static str, &'static str)> {
    vec![
        ("decimal", "-1234567.890"),
        ("double", "6.02214076E23"),
        ("dateTime", "2002-10-10T12:00:00.125-05:00"),
        ("duration", "P1Y2M3DT10H30M12.5S"),
        ("NCName", "element-name_01"),
        ("base64Binary", "SGVsbG8sIFdvcmxkIQ=="),
        ("anyURI", "http://example.com/path?q=1#frag"),
    ]
}

fn benchmark_builtin_validation(c: &mut Criterion) {
    let universe = TypeUniverse::xsd10();
    let ctx = universe.context();
    let values: Vec<_> = sample_values()
        .into_iter()
        .map(|(name, literal)| (universe.require(name).expect("built-in type"), literal))
        .collect();

    c.bench_function("validate/builtins", |b| {
        b.iter(|| {
            for (decl, literal) in &values {
                let value = decl.validate(black_box(literal), &ctx).expect("valid literal");
                black_box(value);
            }
        })
    });
}

fn benchmark_restricted_validation(c: &mut Criterion) {
    let universe = TypeUniverse::xsd10();
    let ctx = universe.context();
    let base = universe.require("int").expect("built-in type");
    let percent = SimpleTypeDecl::restrict(&base)
        .name("percent")
        .facets(
            FacetSet::new()
                .min_inclusive("0")
                .max_inclusive("100")
                .pattern("[0-9]+"),
        )
        .build(&ctx)
        .expect("valid restriction");

    c.bench_function("validate/restricted_int", |b| {
        b.iter(|| black_box(percent.is_valid(black_box("42"), &ctx)))
    });
}

fn benchmark_comparison(c: &mut Criterion) {
    let universe = TypeUniverse::xsd10();
    let ctx = universe.context();
    let date_time = universe.require("dateTime").expect("built-in type");
    let zoned = date_time
        .validate("2000-01-15T12:00:00+03:00", &ctx)
        .expect("valid literal");
    let local = date_time
        .validate("2000-01-16T01:00:00", &ctx)
        .expect("valid literal");
    let duration = universe.require("duration").expect("built-in type");
    let month = duration.validate("P1M", &ctx).expect("valid literal");
    let days = duration.validate("P30D", &ctx).expect("valid literal");

    c.bench_function("compare/date_time_mixed_zone", |b| {
        b.iter(|| black_box(zoned.compare(black_box(&local))))
    });
    c.bench_function("compare/duration", |b| {
        b.iter(|| black_box(month.compare(black_box(&days))))
    });
}

criterion_group!(
    benches,
    benchmark_builtin_validation,
    benchmark_restricted_validation,
    benchmark_comparison
);
criterion_main!(benches);
