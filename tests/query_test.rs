use tinkergraph::graph::{Cardinality, ElementKind, Graph, PropertyValue};
use tinkergraph::query::{Aggregation, PropertyPredicate};

fn companies() -> Graph {
    let mut graph = Graph::new();
    graph.create_index(ElementKind::Vertex, "type").unwrap();
    graph
        .add_vertex_with_properties(
            "company",
            [("type", "company".into()), ("name", "Acme".into()), ("employees", 500.into())],
        )
        .unwrap();
    graph
        .add_vertex_with_properties(
            "company",
            [("type", "company".into()), ("name", "Tiny".into()), ("employees", 25.into())],
        )
        .unwrap();
    graph
        .add_vertex_with_properties("person", [("type", "person".into()), ("name", "marko".into())])
        .unwrap();
    graph
}

#[test]
fn test_sum_over_filtered_vertices() {
    let graph = companies();
    let filter = PropertyPredicate::exact("type", "company");

    let sum = graph.aggregate_vertices(&filter, "employees", Aggregation::Sum).unwrap();
    assert_eq!(sum, PropertyValue::Float(525.0));

    let avg = graph.aggregate_vertices(&filter, "employees", Aggregation::Average).unwrap();
    assert_eq!(avg, PropertyValue::Float(262.5));

    let min = graph.aggregate_vertices(&filter, "employees", Aggregation::Min).unwrap();
    let max = graph.aggregate_vertices(&filter, "employees", Aggregation::Max).unwrap();
    assert_eq!(min, PropertyValue::Float(25.0));
    assert_eq!(max, PropertyValue::Float(500.0));
}

#[test]
fn test_count_on_missing_key_is_zero() {
    let graph = companies();
    let filter = PropertyPredicate::exact("type", "company");

    let count = graph.aggregate_vertices(&filter, "revenue", Aggregation::Count).unwrap();
    assert_eq!(count, PropertyValue::Integer(0));

    let sum = graph.aggregate_vertices(&filter, "revenue", Aggregation::Sum).unwrap();
    assert_eq!(sum, PropertyValue::Null);

    let names = graph.aggregate_vertices(&filter, "name", Aggregation::Count).unwrap();
    assert_eq!(names, PropertyValue::Integer(2));
}

#[test]
fn test_count_includes_every_list_value() {
    let mut graph = Graph::new();
    let v = graph.add_vertex("person").unwrap();
    for score in [3, 4, 5] {
        graph
            .set_vertex_property_with_cardinality(&v, "score", score, Cardinality::List)
            .unwrap();
    }
    let all = PropertyPredicate::exists("score");
    assert_eq!(
        graph.aggregate_vertices(&all, "score", Aggregation::Count).unwrap(),
        PropertyValue::Integer(3)
    );
    assert_eq!(
        graph.aggregate_vertices(&all, "score", Aggregation::Sum).unwrap(),
        PropertyValue::Float(12.0)
    );
}

#[test]
fn test_edge_aggregation() {
    let mut graph = Graph::new();
    let a = graph.add_vertex("person").unwrap();
    let b = graph.add_vertex("person").unwrap();
    graph
        .add_edge_with_properties(&a, &b, "knows", [("weight", PropertyValue::Float(0.5))])
        .unwrap();
    graph
        .add_edge_with_properties(&b, &a, "knows", [("weight", PropertyValue::Float(1.0))])
        .unwrap();

    let total = graph
        .aggregate_edges(&PropertyPredicate::exists("weight"), "weight", Aggregation::Sum)
        .unwrap();
    assert_eq!(total, PropertyValue::Float(1.5));
}

#[test]
fn test_contains_predicate() {
    let graph = companies();
    let sensitive = graph
        .query_vertices(&PropertyPredicate::contains("name", "acm", true))
        .unwrap();
    assert!(sensitive.is_empty());

    let insensitive = graph
        .query_vertices(&PropertyPredicate::contains("name", "ACM", false))
        .unwrap();
    assert_eq!(insensitive.len(), 1);
    assert_eq!(insensitive[0].value::<String>("name"), Some("Acme".to_string()));
}

#[test]
fn test_cardinality_predicate() {
    let mut graph = Graph::new();
    let a = graph.add_vertex("person").unwrap();
    let b = graph.add_vertex("person").unwrap();
    graph
        .set_vertex_property_with_cardinality(&a, "nick", "m", Cardinality::List)
        .unwrap();
    graph.set_vertex_property(&b, "nick", "v").unwrap();

    let lists = graph
        .query_vertices(&PropertyPredicate::cardinality("nick", Cardinality::List))
        .unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].id(), &a);
}

#[test]
fn test_index_plan_matches_scan() {
    let mut indexed = Graph::new();
    indexed.create_index(ElementKind::Vertex, "city").unwrap();
    indexed.create_range_index(ElementKind::Vertex, "age").unwrap();
    indexed
        .create_composite_index(ElementKind::Vertex, &["city", "team"])
        .unwrap();
    let mut plain = Graph::new();

    let rows = [
        ("lisbon", "red", 21),
        ("porto", "red", 34),
        ("lisbon", "blue", 40),
        ("braga", "blue", 34),
        ("lisbon", "red", 58),
    ];
    for graph in [&mut indexed, &mut plain] {
        for (city, team, age) in rows {
            graph
                .add_vertex_with_properties("person", [("city", city.into()), ("team", team.into()), ("age", age.into())])
                .unwrap();
        }
    }

    let predicates = [
        PropertyPredicate::exact("city", "lisbon"),
        PropertyPredicate::and([PropertyPredicate::exact("city", "lisbon"), PropertyPredicate::exact("team", "red")]),
        PropertyPredicate::range("age", Some(30.into()), Some(40.into()), true, false),
        PropertyPredicate::and([
            PropertyPredicate::greater_than("age", 30, false),
            PropertyPredicate::exact("team", "blue"),
        ]),
        PropertyPredicate::exact("age", 34),
        PropertyPredicate::exact("age", 34.0),
        PropertyPredicate::less_than("age", "z", true),
    ];
    for predicate in &predicates {
        let from_index: Vec<_> = indexed
            .query_vertices(predicate)
            .unwrap()
            .into_iter()
            .map(|v| v.id().clone())
            .collect();
        let from_scan: Vec<_> = plain
            .query_vertices(predicate)
            .unwrap()
            .into_iter()
            .map(|v| v.id().clone())
            .collect();
        assert_eq!(from_index, from_scan, "{predicate:?}");
    }
    assert_eq!(plain.metrics().index_lookups, 0);
    assert_eq!(indexed.metrics().full_scans, 0);
}

#[test]
fn test_count_helpers() {
    let graph = companies();
    let engine = graph.query_engine().unwrap();
    assert_eq!(engine.count_vertices(&PropertyPredicate::exists("employees")), 2);
    assert_eq!(engine.count_edges(&PropertyPredicate::exists("weight")), 0);
}
