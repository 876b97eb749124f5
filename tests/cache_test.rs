use std::sync::Arc;
use tinkergraph::graph::{ElementKind, Graph, GraphConfig, PropertyValue};
use tinkergraph::platform::ManualClock;
use tinkergraph::query::PropertyPredicate;

fn graph_with_clock(max_size: usize, max_age_ms: u64) -> (Graph, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let config = GraphConfig::default().with_cache_limits(max_size, max_age_ms);
    let graph: Graph = Graph::with_runtime(config, clock.clone());
    (graph, clock)
}

fn add_person(graph: &mut Graph, name: &str, age: i64, city: &str) {
    graph
        .add_vertex_with_properties(
            "person",
            [("name", name.into()), ("age", PropertyValue::Integer(age)), ("city", city.into())],
        )
        .unwrap();
}

fn names(graph: &Graph, predicate: &PropertyPredicate) -> Vec<String> {
    graph
        .query_vertices(predicate)
        .unwrap()
        .into_iter()
        .filter_map(|v| v.value::<String>("name"))
        .collect()
}

#[test]
fn test_cached_lookup_hits_then_expires() {
    let (mut graph, clock) = graph_with_clock(10, 1_000);
    graph.create_index(ElementKind::Vertex, "city").unwrap();
    add_person(&mut graph, "alice", 25, "lisbon");

    let lisbon = PropertyPredicate::exact("city", "lisbon");
    assert_eq!(names(&graph, &lisbon), vec!["alice"]);
    clock.advance(999);
    assert_eq!(names(&graph, &lisbon), vec!["alice"]);

    let stats = graph.cache_statistics();
    assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    assert!((stats.hit_ratio - 0.5).abs() < f64::EPSILON);

    clock.advance(1);
    assert_eq!(names(&graph, &lisbon), vec!["alice"]);
    let stats = graph.cache_statistics();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.size, 1);
}

#[test]
fn test_capacity_evicts_oldest() {
    let (mut graph, clock) = graph_with_clock(2, 60_000);
    graph.create_index(ElementKind::Vertex, "city").unwrap();
    for (name, city) in [("alice", "lisbon"), ("bob", "porto"), ("carol", "braga")] {
        add_person(&mut graph, name, 30, city);
    }

    for city in ["lisbon", "porto", "braga"] {
        graph.query_vertices(&PropertyPredicate::exact("city", city)).unwrap();
        clock.advance(10);
    }
    let stats = graph.cache_statistics();
    assert_eq!(stats.size, 2);
    assert_eq!(stats.max_size, 2);
    assert_eq!(stats.evictions, 1);

    // lisbon was the oldest entry and must be recomputed
    graph.query_vertices(&PropertyPredicate::exact("city", "porto")).unwrap();
    assert_eq!(graph.cache_statistics().hits, 1);
    graph.query_vertices(&PropertyPredicate::exact("city", "lisbon")).unwrap();
    assert_eq!(graph.cache_statistics().misses, 4);
}

#[test]
fn test_cache_follows_writes() {
    let (mut graph, _clock) = graph_with_clock(10, 60_000);
    graph.create_index(ElementKind::Vertex, "city").unwrap();
    graph.create_range_index(ElementKind::Vertex, "age").unwrap();
    add_person(&mut graph, "alice", 25, "lisbon");

    let lisbon = PropertyPredicate::exact("city", "lisbon");
    let adults = PropertyPredicate::greater_than("age", 18, true);
    assert_eq!(names(&graph, &lisbon), vec!["alice"]);
    assert_eq!(names(&graph, &adults), vec!["alice"]);

    add_person(&mut graph, "bob", 40, "lisbon");
    assert_eq!(names(&graph, &lisbon), vec!["alice", "bob"]);
    assert_eq!(names(&graph, &adults), vec!["alice", "bob"]);

    let bob = graph.query_vertices(&PropertyPredicate::exact("name", "bob")).unwrap()[0]
        .id()
        .clone();
    graph.set_vertex_property(&bob, "city", "porto").unwrap();
    graph.set_vertex_property(&bob, "age", 12).unwrap();
    assert_eq!(names(&graph, &lisbon), vec!["alice"]);
    assert_eq!(names(&graph, &adults), vec!["alice"]);
}

#[test]
fn test_removal_invalidates_every_index_kind() {
    let (mut graph, _clock) = graph_with_clock(10, 60_000);
    graph.create_index(ElementKind::Vertex, "name").unwrap();
    graph.create_range_index(ElementKind::Vertex, "age").unwrap();
    add_person(&mut graph, "alice", 25, "lisbon");
    let alice = graph.vertices().next().unwrap().id().clone();

    let by_name = PropertyPredicate::exact("name", "alice");
    let by_age = PropertyPredicate::range("age", Some(20.into()), Some(30.into()), true, true);
    assert_eq!(names(&graph, &by_name), vec!["alice"]);
    assert_eq!(names(&graph, &by_age), vec!["alice"]);
    assert_eq!(graph.cache_statistics().size, 2);

    graph.remove_vertex(&alice).unwrap();
    assert_eq!(graph.cache_statistics().size, 0);

    assert!(names(&graph, &by_name).is_empty());
    assert!(names(&graph, &by_age).is_empty());
    let stats = graph.index_statistics(ElementKind::Vertex).unwrap();
    assert_eq!(stats.exact_entries, 0);
    assert_eq!(stats.range_entries, 0);
}

#[test]
fn test_drop_index_invalidates_its_entries() {
    let (mut graph, _clock) = graph_with_clock(10, 60_000);
    graph.create_index(ElementKind::Vertex, "city").unwrap();
    graph.create_range_index(ElementKind::Vertex, "age").unwrap();
    add_person(&mut graph, "alice", 25, "lisbon");

    graph.query_vertices(&PropertyPredicate::exact("city", "lisbon")).unwrap();
    graph.query_vertices(&PropertyPredicate::less_than("age", 30, false)).unwrap();
    assert_eq!(graph.cache_statistics().size, 2);

    graph.drop_range_index(ElementKind::Vertex, "age").unwrap();
    assert_eq!(graph.cache_statistics().size, 1);
}

#[test]
fn test_cleanup_and_clear() {
    let (mut graph, clock) = graph_with_clock(10, 100);
    graph.create_index(ElementKind::Vertex, "city").unwrap();
    add_person(&mut graph, "alice", 25, "lisbon");
    add_person(&mut graph, "bob", 31, "porto");

    graph.query_vertices(&PropertyPredicate::exact("city", "lisbon")).unwrap();
    clock.advance(50);
    graph.query_vertices(&PropertyPredicate::exact("city", "porto")).unwrap();
    clock.advance(60);

    assert_eq!(graph.cleanup_cache(), 1);
    assert_eq!(graph.cache_statistics().size, 1);

    // clearing drops entries but keeps the counters
    graph.clear_cache();
    let stats = graph.cache_statistics();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.evictions, 1);
}

#[test]
fn test_zero_capacity_disables_caching() {
    let (mut graph, _clock) = graph_with_clock(0, 60_000);
    graph.create_index(ElementKind::Vertex, "city").unwrap();
    add_person(&mut graph, "alice", 25, "lisbon");

    let lisbon = PropertyPredicate::exact("city", "lisbon");
    assert_eq!(names(&graph, &lisbon), vec!["alice"]);
    assert_eq!(names(&graph, &lisbon), vec!["alice"]);

    let stats = graph.cache_statistics();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 2);
}

#[test]
fn test_range_conjunction_caches_only_the_chosen_leg() {
    let (mut graph, _clock) = graph_with_clock(10, 60_000);
    graph.create_range_index(ElementKind::Vertex, "age").unwrap();
    graph.create_range_index(ElementKind::Vertex, "score").unwrap();
    for (i, name) in ["alice", "bob", "carol", "dave", "erin"].iter().enumerate() {
        graph
            .add_vertex_with_properties(
                "person",
                [
                    ("name", (*name).into()),
                    ("age", PropertyValue::Integer(20 + i as i64 * 10)),
                    ("score", PropertyValue::Integer(i as i64)),
                ],
            )
            .unwrap();
    }

    // age >= 20 holds for everyone, score > 3 only for erin
    let narrow = PropertyPredicate::and([
        PropertyPredicate::greater_than("age", 20, true),
        PropertyPredicate::greater_than("score", 3, false),
    ]);
    assert_eq!(names(&graph, &narrow), vec!["erin"]);
    let stats = graph.cache_statistics();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.misses, 1);

    assert_eq!(names(&graph, &narrow), vec!["erin"]);
    let stats = graph.cache_statistics();
    assert_eq!((stats.size, stats.hits), (1, 1));
    assert_eq!(graph.metrics().full_scans, 0);
}
