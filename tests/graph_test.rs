use tinkergraph::graph::{
    Cardinality, Direction, ElementId, ElementKind, Graph, GraphConfig, GraphError, IdManager, PropertyValue,
};
use tinkergraph::query::PropertyPredicate;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn skills(graph: &Graph, id: &ElementId) -> Vec<PropertyValue> {
    graph
        .vertex(id)
        .unwrap()
        .properties("skill")
        .iter()
        .map(|p| p.value().clone())
        .collect()
}

#[test]
fn test_list_property_indexed_per_value() {
    init_tracing();
    let mut graph = Graph::new();
    graph.create_index(ElementKind::Vertex, "skill").unwrap();

    let v = graph.add_vertex("person").unwrap();
    graph
        .set_vertex_property_with_cardinality(&v, "skill", "Java", Cardinality::List)
        .unwrap();
    graph
        .set_vertex_property_with_cardinality(&v, "skill", "Python", Cardinality::List)
        .unwrap();

    assert_eq!(skills(&graph, &v), vec!["Java".into(), "Python".into()]);
    for skill in ["Java", "Python"] {
        let hits = graph.query_vertices(&PropertyPredicate::exact("skill", skill)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), &v);
    }
}

#[test]
fn test_cardinality_rules() {
    let mut graph = Graph::new();
    let v = graph.add_vertex("person").unwrap();

    // LIST keeps duplicates in write order
    for skill in ["rust", "go", "rust"] {
        graph
            .set_vertex_property_with_cardinality(&v, "skill", skill, Cardinality::List)
            .unwrap();
    }
    assert_eq!(skills(&graph, &v), vec!["rust".into(), "go".into(), "rust".into()]);

    // SET ignores a value already present and returns its property id
    let first = graph
        .set_vertex_property_with_cardinality(&v, "tag", "a", Cardinality::Set)
        .unwrap();
    let again = graph
        .set_vertex_property_with_cardinality(&v, "tag", "a", Cardinality::Set)
        .unwrap();
    assert_eq!(first, again);
    assert_eq!(graph.vertex(&v).unwrap().properties("tag").len(), 1);

    // SINGLE replaces everything
    graph
        .set_vertex_property_with_cardinality(&v, "skill", "zig", Cardinality::Single)
        .unwrap();
    assert_eq!(skills(&graph, &v), vec!["zig".into()]);
}

#[test]
fn test_remove_vertex_cascades_to_edges() {
    let mut graph = Graph::new();
    graph.create_index(ElementKind::Edge, "since").unwrap();

    let marko = graph.add_vertex("person").unwrap();
    let josh = graph.add_vertex("person").unwrap();
    let lop = graph.add_vertex("software").unwrap();
    graph
        .add_edge_with_properties(&marko, &josh, "knows", [("since", PropertyValue::Integer(2009))])
        .unwrap();
    graph.add_edge(&josh, &lop, "created").unwrap();
    graph.add_edge(&marko, &marko, "self").unwrap();

    graph.remove_vertex(&marko).unwrap();

    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(matches!(graph.vertex(&marko), Err(GraphError::VertexNotFound(_))));
    assert!(graph
        .query_edges(&PropertyPredicate::exact("since", 2009))
        .unwrap()
        .is_empty());
    assert!(graph.adjacent_edges(&josh, Direction::In, &[]).unwrap().is_empty());
    assert_eq!(graph.adjacent_edges(&josh, Direction::Out, &[]).unwrap().len(), 1);
}

#[test]
fn test_adjacency_with_labels() {
    let mut graph = Graph::new();
    let marko = graph.add_vertex("person").unwrap();
    let vadas = graph.add_vertex("person").unwrap();
    let lop = graph.add_vertex("software").unwrap();
    graph.add_edge(&marko, &vadas, "knows").unwrap();
    graph.add_edge(&marko, &lop, "created").unwrap();

    let out = graph.adjacent_vertices(&marko, Direction::Out, &[]).unwrap();
    assert_eq!(out.len(), 2);

    let known = graph.adjacent_vertices(&marko, Direction::Out, &["knows"]).unwrap();
    assert_eq!(known.len(), 1);
    assert_eq!(known[0].id(), &vadas);

    let creators = graph.adjacent_vertices(&lop, Direction::In, &[]).unwrap();
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].id(), &marko);

    assert!(graph.adjacent_vertices(&vadas, Direction::Out, &[]).unwrap().is_empty());
    assert_eq!(graph.adjacent_edges(&lop, Direction::Both, &[]).unwrap().len(), 1);
}

#[test]
fn test_user_supplied_ids() {
    let mut graph = Graph::new();
    let id = graph
        .add_vertex_with_id(42, "person", Vec::<(&str, PropertyValue)>::new())
        .unwrap();
    assert_eq!(id, ElementId::Long(42));

    // numeric strings convert under the LONG manager
    let dup = graph.add_vertex_with_id("42", "person", Vec::<(&str, PropertyValue)>::new());
    assert_eq!(dup, Err(GraphError::DuplicateIdentifier(ElementId::Long(42))));

    let bad = graph.add_vertex_with_id("marko", "person", Vec::<(&str, PropertyValue)>::new());
    assert!(matches!(bad, Err(GraphError::InvalidIdentifier(_))));

    // generated ids stay ahead of supplied ones
    let next = graph.add_vertex("person").unwrap();
    assert_eq!(next, ElementId::Long(43));
}

#[test]
fn test_generated_ids_exhausted_after_max_long() {
    let mut graph = Graph::new();
    let a = graph
        .add_vertex_with_id(i64::MAX, "person", Vec::<(&str, PropertyValue)>::new())
        .unwrap();

    let next = graph.add_vertex("person");
    assert_eq!(next, Err(GraphError::IdSpaceExhausted(ElementKind::Vertex)));
    assert_eq!(graph.vertex_count(), 1);

    // supplied ids still work, and edges have their own id space
    let b = graph
        .add_vertex_with_id(7, "person", Vec::<(&str, PropertyValue)>::new())
        .unwrap();
    graph
        .add_edge_with_id(i64::MAX, &a, &b, "knows", Vec::<(&str, PropertyValue)>::new())
        .unwrap();
    assert_eq!(
        graph.add_edge(&b, &a, "knows"),
        Err(GraphError::IdSpaceExhausted(ElementKind::Edge))
    );
    assert_eq!(graph.edge_count(), 1);

    graph.clear().unwrap();
    assert_eq!(graph.add_vertex("person").unwrap(), ElementId::Long(1));
}

#[test]
fn test_config_from_json() {
    let config = GraphConfig::from_json_str(
        r#"{
            "vertex_id_manager": "ANY",
            "edge_id_manager": "UUID",
            "default_vertex_property_cardinality": "LIST",
            "allow_null_property_values": true
        }"#,
    )
    .unwrap();
    assert_eq!(config.vertex_id_manager, IdManager::Any);
    assert_eq!(config.cache_max_size, GraphConfig::default().cache_max_size);

    let mut graph = Graph::with_config(config);
    let features = graph.features();
    assert!(features.vertex.element.supports_string_ids);
    assert!(features.edge.element.supports_uuid_ids);
    assert!(features.vertex.element.supports_null_property_values);

    let marko = graph
        .add_vertex_with_id("marko", "person", [("nick", PropertyValue::Null)])
        .unwrap();
    assert_eq!(marko, ElementId::String("marko".to_string()));

    graph.set_vertex_property(&marko, "alias", "m").unwrap();
    graph.set_vertex_property(&marko, "alias", "m").unwrap();
    assert_eq!(graph.vertex(&marko).unwrap().properties("alias").len(), 2);

    let v = graph.add_vertex("person").unwrap();
    let e = graph.add_edge(&marko, &v, "knows").unwrap();
    assert!(e.as_uuid().is_some());
}

#[test]
fn test_null_values_rejected_by_default() {
    let mut graph = Graph::new();
    let v = graph.add_vertex("person").unwrap();
    assert_eq!(
        graph.set_vertex_property(&v, "nick", PropertyValue::Null),
        Err(GraphError::NullPropertyRejected("nick".to_string()))
    );
    assert!(matches!(
        graph.set_vertex_property(&v, "", 1),
        Err(GraphError::InvalidPropertyKey(_))
    ));
}

#[test]
fn test_meta_properties() {
    let mut graph = Graph::new();
    let v = graph.add_vertex("person").unwrap();
    let lisbon = graph
        .set_vertex_property_with_cardinality(&v, "location", "lisbon", Cardinality::List)
        .unwrap();
    let porto = graph
        .set_vertex_property_with_cardinality(&v, "location", "porto", Cardinality::List)
        .unwrap();
    graph.set_meta_property(&v, &lisbon, "start_time", 1997).unwrap();
    graph.set_meta_property(&v, &porto, "start_time", 2005).unwrap();

    let vertex = graph.vertex(&v).unwrap();
    let engine = graph.query_engine().unwrap();
    let hits = engine.query_vertex_properties(
        vertex,
        &PropertyPredicate::meta_property("location", "start_time", Some(2005.into())),
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), &porto);

    let found = graph
        .query_vertices(&PropertyPredicate::meta_property("location", "start_time", None))
        .unwrap();
    assert_eq!(found.len(), 1);

    let removed = graph.remove_meta_property(&v, &lisbon, "start_time").unwrap();
    assert_eq!(removed, Some(PropertyValue::Integer(1997)));
    let missing = graph.set_meta_property(&v, &ElementId::Long(999), "k", 1);
    assert!(matches!(missing, Err(GraphError::VertexPropertyNotFound(_))));
}

#[test]
fn test_clear_keeps_index_definitions() {
    let mut graph = Graph::new();
    graph.create_index(ElementKind::Vertex, "name").unwrap();
    graph
        .add_vertex_with_properties("person", [("name", PropertyValue::from("marko"))])
        .unwrap();
    graph.clear().unwrap();

    assert_eq!(graph.vertex_count(), 0);
    assert!(graph.has_index(ElementKind::Vertex, "name"));
    assert_eq!(graph.index_statistics(ElementKind::Vertex).unwrap().exact_entries, 0);

    let v = graph
        .add_vertex_with_properties("person", [("name", PropertyValue::from("marko"))])
        .unwrap();
    assert_eq!(v, ElementId::Long(1));
    let hits = graph.query_vertices(&PropertyPredicate::exact("name", "marko")).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_close_is_terminal() {
    let mut graph = Graph::new();
    graph.create_index(ElementKind::Vertex, "name").unwrap();
    let v = graph.add_vertex("person").unwrap();

    graph.close();
    graph.close();
    assert!(graph.is_closed());
    assert_eq!(graph.vertex(&v), Err(GraphError::GraphClosed));
    assert_eq!(graph.add_vertex("person"), Err(GraphError::GraphClosed));
    assert!(graph.query_vertices(&PropertyPredicate::exists("name")).is_err());
    assert!(!graph.has_index(ElementKind::Vertex, "name"));
}

#[test]
fn test_statistics_serialize() {
    let mut graph = Graph::new();
    graph.create_range_index(ElementKind::Vertex, "age").unwrap();
    let a = graph
        .add_vertex_with_properties("person", [("age", PropertyValue::Integer(29))])
        .unwrap();
    let b = graph.add_vertex("person").unwrap();
    graph.add_edge(&a, &b, "knows").unwrap();

    let stats = graph.statistics();
    assert_eq!(stats.vertex_count, 2);
    assert_eq!(stats.edge_count, 1);
    assert_eq!(stats.vertex_property_count, 1);
    assert_eq!(stats.vertex_indices.range_entries, 1);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["vertex_count"], 2);
    assert_eq!(json["vertex_indices"]["range_keys"][0], "age");
}
