use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tinkergraph::graph::{Direction, ElementKind, Graph, PropertyValue};
use tinkergraph::query::{Aggregation, PropertyPredicate};

fn people(size: usize, indexed: bool) -> Graph {
    let mut graph = Graph::new();
    if indexed {
        graph.create_index(ElementKind::Vertex, "age").unwrap();
        graph.create_range_index(ElementKind::Vertex, "score").unwrap();
        graph
            .create_composite_index(ElementKind::Vertex, &["dept", "active"])
            .unwrap();
    }
    for i in 0..size {
        graph
            .add_vertex_with_properties(
                "person",
                [
                    ("name", PropertyValue::String(format!("Person{}", i))),
                    ("age", PropertyValue::Integer((i % 100) as i64)),
                    ("score", PropertyValue::Integer((i * 7 % 1000) as i64)),
                    ("dept", PropertyValue::String(format!("dept{}", i % 10))),
                    ("active", PropertyValue::Boolean(i % 2 == 0)),
                ],
            )
            .unwrap();
    }
    graph
}

/// Benchmark vertex insertion throughput with and without index maintenance
fn bench_vertex_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("plain", size), size, |b, &size| {
            b.iter(|| criterion::black_box(people(size, false).vertex_count()));
        });
        group.bench_with_input(BenchmarkId::new("indexed", size), size, |b, &size| {
            b.iter(|| criterion::black_box(people(size, true).vertex_count()));
        });
    }
    group.finish();
}

/// Benchmark exact lookups: index (cached after the first hit) vs full scan
fn bench_exact_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_lookup");

    for size in [1000, 10_000].iter() {
        let plain = people(*size, false);
        let indexed = people(*size, true);
        let predicate = PropertyPredicate::exact("age", 25);

        group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
            b.iter(|| criterion::black_box(plain.query_vertices(&predicate).unwrap().len()));
        });
        group.bench_with_input(BenchmarkId::new("index", size), size, |b, _| {
            b.iter(|| criterion::black_box(indexed.query_vertices(&predicate).unwrap().len()));
        });
        group.bench_with_input(BenchmarkId::new("index_uncached", size), size, |b, _| {
            b.iter(|| {
                indexed.clear_cache();
                criterion::black_box(indexed.query_vertices(&predicate).unwrap().len())
            });
        });
    }
    group.finish();
}

/// Benchmark range and compound predicates
fn bench_range_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_filter");

    let plain = people(10_000, false);
    let indexed = people(10_000, true);
    let narrow = PropertyPredicate::range("score", Some(100.into()), Some(120.into()), true, false);
    let compound = PropertyPredicate::and([
        PropertyPredicate::exact("dept", "dept3"),
        PropertyPredicate::exact("active", false),
        PropertyPredicate::greater_than("score", 500, true),
    ]);

    group.bench_function("narrow_scan", |b| {
        b.iter(|| criterion::black_box(plain.query_vertices(&narrow).unwrap().len()));
    });
    group.bench_function("narrow_index", |b| {
        b.iter(|| {
            indexed.clear_cache();
            criterion::black_box(indexed.query_vertices(&narrow).unwrap().len())
        });
    });
    group.bench_function("compound_scan", |b| {
        b.iter(|| criterion::black_box(plain.query_vertices(&compound).unwrap().len()));
    });
    group.bench_function("compound_index", |b| {
        b.iter(|| {
            indexed.clear_cache();
            criterion::black_box(indexed.query_vertices(&compound).unwrap().len())
        });
    });

    group.finish();
}

/// Benchmark aggregation over a filtered walk
fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let graph = people(10_000, true);
    let filter = PropertyPredicate::exact("age", 42);

    for aggregation in [Aggregation::Count, Aggregation::Sum, Aggregation::Average] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", aggregation)),
            &aggregation,
            |b, &aggregation| {
                b.iter(|| criterion::black_box(graph.aggregate_vertices(&filter, "score", aggregation).unwrap()));
            },
        );
    }
    group.finish();
}

/// Benchmark one-hop adjacency
fn bench_adjacency(c: &mut Criterion) {
    let mut group = c.benchmark_group("adjacency");

    for size in [100, 1000].iter() {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..*size).map(|_| graph.add_vertex("person").unwrap()).collect();
        for (i, id) in ids.iter().enumerate() {
            for step in 1..=5 {
                let other = &ids[(i + step) % ids.len()];
                graph.add_edge(id, other, "knows").unwrap();
            }
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut total = 0;
                for id in &ids {
                    total += graph.adjacent_vertices(id, Direction::Out, &["knows"]).unwrap().len();
                }
                criterion::black_box(total);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_vertex_insertion,
    bench_exact_lookup,
    bench_range_filter,
    bench_aggregation,
    bench_adjacency,
);
criterion_main!(benches);
