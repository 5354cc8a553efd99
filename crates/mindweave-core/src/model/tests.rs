use super::*;
use crate::geom::point;
use crate::Error;

fn chain() -> (Graph, Vec<crate::NodeId>) {
    // center -> a -> b, center -> c
    let mut g = Graph::new("root", point(0.0, 0.0));
    let center = g.center_id().unwrap();
    let a = Node::new("a", point(10.0, 0.0), false);
    let b = Node::new("b", point(20.0, 0.0), false);
    let c = Node::new("c", point(0.0, 10.0), false);
    let ids = vec![center, a.id, b.id, c.id];
    g.push_child(a.clone(), Connection::new(center, a.id));
    g.push_child(b.clone(), Connection::new(a.id, b.id));
    g.push_child(c.clone(), Connection::new(center, c.id));
    (g, ids)
}

#[test]
fn new_graph_has_single_center() {
    let g = Graph::new("idea", point(200.0, 300.0));
    assert_eq!(g.node_count(), 1);
    let center = g.center().unwrap();
    assert!(center.is_center);
    assert_eq!(center.text, "idea");
    assert_eq!(center.style, NodeStyle::CENTER);
    assert!(g.validate().is_ok());
}

#[test]
fn children_parent_and_depth_queries() {
    let (g, ids) = chain();
    let &[center, a, b, c] = ids.as_slice() else { unreachable!() };
    assert_eq!(g.children_of(center), vec![a, c]);
    assert_eq!(g.children_of(a), vec![b]);
    assert!(g.children_of(b).is_empty());
    assert_eq!(g.parent_of(b), Some(a));
    assert_eq!(g.parent_of(center), None);
    assert_eq!(g.incoming_connection(c).unwrap().from_node_id, center);
    assert_eq!(g.depth_of(center), Some(0));
    assert_eq!(g.depth_of(b), Some(2));
    assert_eq!(g.index_of(c), Some(3));
}

#[test]
fn is_descendant_follows_outgoing_connections_only() {
    let (g, ids) = chain();
    let &[center, a, b, c] = ids.as_slice() else { unreachable!() };
    assert!(g.is_descendant(b, center));
    assert!(g.is_descendant(b, a));
    assert!(!g.is_descendant(a, b));
    assert!(!g.is_descendant(c, a));
    assert!(!g.is_descendant(a, a));
}

#[test]
fn subtree_is_closure_under_outgoing_connections() {
    let (g, ids) = chain();
    let &[center, a, b, c] = ids.as_slice() else { unreachable!() };
    let sub = g.subtree_of(a);
    assert_eq!(sub.iter().copied().collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(g.subtree_of(center).len(), 4);
    assert_eq!(g.subtree_of(c).len(), 1);
}

#[test]
fn validate_rejects_second_center() {
    let (g, _) = chain();
    let mut nodes = g.nodes().to_vec();
    nodes[1].is_center = true;
    let err = Graph::from_parts("root", nodes, g.connections().to_vec()).unwrap_err();
    assert!(matches!(err, Error::InvariantViolation { .. }));
    assert!(err.to_string().contains("exactly one center"));
}

#[test]
fn validate_rejects_dangling_and_orphaned_nodes() {
    let (g, ids) = chain();
    let mut connections = g.connections().to_vec();
    connections[0].from_node_id = crate::NodeId::new();
    assert!(Graph::from_parts("root", g.nodes().to_vec(), connections).is_err());

    let mut connections = g.connections().to_vec();
    connections.retain(|c| c.to_node_id != ids[3]);
    let err = Graph::from_parts("root", g.nodes().to_vec(), connections).unwrap_err();
    assert!(err.to_string().contains("incoming connections"));
}

#[test]
fn validate_rejects_cycles() {
    let (g, ids) = chain();
    let &[_, a, b, _] = ids.as_slice() else { unreachable!() };
    let mut connections = g.connections().to_vec();
    // a -> b and b -> a form a detached cycle.
    connections[0].from_node_id = b;
    connections[0].to_node_id = a;
    let err = Graph::from_parts("root", g.nodes().to_vec(), connections).unwrap_err();
    assert!(matches!(err, Error::InvariantViolation { .. }));
}

#[test]
fn remove_nodes_drops_incident_connections() {
    let (mut g, ids) = chain();
    let sub = g.subtree_of(ids[1]);
    let removed = g.remove_nodes(&sub);
    assert_eq!(removed, 2);
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.connections().len(), 1);
    assert!(g.validate().is_ok());
}

#[test]
fn node_style_payload_uses_flat_field_names() {
    let json = NodeStyle::BRANCH.encode();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "fillR", "fillG", "fillB", "fillA", "borderR", "borderG", "borderB", "borderA",
            "textR", "textG", "textB", "textA"
        ]
    );
    assert_eq!(NodeStyle::decode(&json).unwrap(), NodeStyle::BRANCH);
}

#[test]
fn connection_style_payload_uses_flat_field_names() {
    let style = ConnectionStyle {
        line_color: Rgba::new(0.25, 0.5, 0.75, 1.0),
        line_width: 3.5,
    };
    assert_eq!(
        style.encode(),
        r#"{"lineR":0.25,"lineG":0.5,"lineB":0.75,"lineA":1.0,"lineWidth":3.5}"#
    );
    assert_eq!(ConnectionStyle::decode(&style.encode()).unwrap(), style);
}

#[test]
fn malformed_style_payload_is_rejected() {
    let err = NodeStyle::decode(r#"{"fillR":1.0}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidStylePayload { .. }));
}

#[test]
fn graph_serde_keeps_node_order() {
    let (g, _) = chain();
    let json = serde_json::to_string(&g).unwrap();
    assert!(json.contains("\"centerText\":\"root\""));
    assert!(json.contains("\"fillR\""));
    let back: Graph = serde_json::from_str(&json).unwrap();
    assert_eq!(back, g);
}

#[test]
fn graph_deserialize_rejects_missing_center() {
    let (g, _) = chain();
    let mut value = serde_json::to_value(&g).unwrap();
    value["nodes"][0]["isCenter"] = serde_json::Value::from(false);

    let err = serde_json::from_value::<Graph>(value).unwrap_err();
    assert!(err.to_string().contains("center"), "{err}");
}

#[test]
fn graph_deserialize_rejects_dangling_connection() {
    let (g, _) = chain();
    let mut value = serde_json::to_value(&g).unwrap();
    let nodes = value["nodes"].as_array_mut().unwrap();
    nodes.pop();

    assert!(serde_json::from_value::<Graph>(value).is_err());
}
