use mindweave_core::{
    EditingSession, EditorConfig, Error, GraphChange, MemoryStore, NodeId, StyleEngine,
};
use std::cell::RefCell;
use std::rc::Rc;

fn session() -> EditingSession {
    EditingSession::new("Trip", EditorConfig::default())
}

fn center(s: &EditingSession) -> NodeId {
    s.graph().center_id().unwrap()
}

#[test]
fn new_session_places_center_at_default_position() {
    let s = session();
    let c = s.graph().center().unwrap();
    assert_eq!((c.position.x, c.position.y), (200.0, 300.0));
    assert_eq!(c.text, "Trip");
    assert!(!s.history().can_undo());
}

#[test]
fn observers_see_every_committed_change() {
    let mut s = session();
    let seen: Rc<RefCell<Vec<GraphChange>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let sub = s.subscribe(move |graph, change| {
        assert!(graph.validate().is_ok());
        sink.borrow_mut().push(change.clone());
    });

    let c = center(&s);
    let a = s.add_child_node(c, "a").unwrap();
    s.update_node_text(a, "b").unwrap();
    s.delete_node(a).unwrap();
    s.undo();

    assert_eq!(
        seen.borrow().as_slice(),
        &[
            GraphChange::NodeAdded { id: a, parent: c },
            GraphChange::NodeUpdated { id: a },
            GraphChange::NodesRemoved { ids: vec![a] },
            GraphChange::Restored,
        ]
    );

    assert!(s.unsubscribe(sub));
    assert!(!s.unsubscribe(sub));
    s.add_child_node(c, "quiet").unwrap();
    assert_eq!(seen.borrow().len(), 4);
}

#[test]
fn failed_mutations_do_not_notify() {
    let mut s = session();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    s.subscribe(move |_, _| *sink.borrow_mut() += 1);

    let c = center(&s);
    assert!(matches!(s.delete_node(c), Err(Error::CannotDeleteCenter)));
    assert!(s.add_child_node(NodeId::new(), "x").is_err());
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn drag_collapses_into_one_undo_step() {
    let mut s = session();
    let c = center(&s);
    let a = s.add_child_node(c, "a").unwrap();
    let start = s.graph().node(a).unwrap().position;
    let depth = s.history().undo_depth();

    s.begin_drag(a).unwrap();
    for _ in 0..10 {
        s.update_drag(3.0, 4.0).unwrap();
    }
    assert_eq!(s.end_drag(), Some(a));
    assert_eq!(s.history().undo_depth(), depth + 1);

    let moved = s.graph().node(a).unwrap().position;
    assert!((moved.x - (start.x + 30.0)).abs() < 1e-9);
    assert!((moved.y - (start.y + 40.0)).abs() < 1e-9);

    assert!(s.undo());
    assert_eq!(s.graph().node(a).unwrap().position, start);
}

#[test]
fn update_drag_without_begin_is_ignored() {
    let mut s = session();
    assert_eq!(s.update_drag(1.0, 1.0).unwrap(), None);
    assert!(matches!(
        s.begin_drag(NodeId::new()),
        Err(Error::NodeNotFound { .. })
    ));
    assert_eq!(s.dragging(), None);
}

#[test]
fn move_node_is_a_single_undoable_step() {
    let mut s = session();
    let c = center(&s);
    let p = s.move_node(c, -20.0, 5.0).unwrap();
    assert_eq!((p.x, p.y), (180.0, 305.0));
    assert!(s.undo());
    let back = s.graph().center().unwrap().position;
    assert_eq!((back.x, back.y), (200.0, 300.0));
}

#[test]
fn text_edit_records_one_step_when_changed() {
    let mut s = session();
    let c = center(&s);
    let a = s.add_child_node(c, "").unwrap();
    let depth = s.history().undo_depth();

    s.begin_text_edit(a).unwrap();
    for partial in ["I", "Id", "Ide", "Idea"] {
        assert!(s.update_text_edit(partial));
    }
    assert_eq!(s.history().undo_depth(), depth);
    assert!(s.end_text_edit());
    assert_eq!(s.history().undo_depth(), depth + 1);
    assert_eq!(s.graph().node(a).unwrap().text, "Idea");

    assert!(s.undo());
    assert_eq!(s.graph().node(a).unwrap().text, "");
}

#[test]
fn unchanged_text_edit_records_nothing() {
    let mut s = session();
    let c = center(&s);
    s.begin_text_edit(c).unwrap();
    s.update_text_edit("Other");
    s.update_text_edit("Trip");
    assert!(!s.end_text_edit());
    assert!(!s.history().can_undo());
    assert!(!s.update_text_edit("late"));
}

#[test]
fn structural_edit_commits_pending_text_edit_first() {
    let mut s = session();
    let c = center(&s);
    s.begin_text_edit(c).unwrap();
    s.update_text_edit("Holiday");
    let a = s.add_child_node(c, "a").unwrap();

    assert!(s.undo());
    assert!(!s.graph().contains_node(a));
    assert_eq!(s.graph().center_text, "Holiday");
    assert!(s.undo());
    assert_eq!(s.graph().center_text, "Trip");
}

#[test]
fn favorite_applies_only_through_unify() {
    let mut styles = StyleEngine::load(MemoryStore::new()).unwrap();
    let mut selection = styles.apply_favorite(0).unwrap();
    selection.connection_style.line_width = 5.0;
    styles.save_to_slot(0, selection).unwrap();

    let mut s = session();
    let c = center(&s);
    s.add_child_node(c, "a").unwrap();
    let picked = styles.apply_favorite(0).unwrap();
    assert!(s.graph().connections().iter().all(|c| c.style.line_width == 2.0));

    s.unify_style(&picked);
    assert!(s.graph().connections().iter().all(|c| c.style.line_width == 5.0));
}

#[test]
fn state_round_trip_keeps_history() {
    let mut s = session();
    let c = center(&s);
    let a = s.add_child_node(c, "a").unwrap();
    let json = serde_json::to_string(&s.to_state()).unwrap();

    let state = serde_json::from_str(&json).unwrap();
    let mut resumed = EditingSession::restore(state, EditorConfig::default()).unwrap();
    assert!(resumed.graph().contains_node(a));
    assert!(resumed.undo());
    assert!(!resumed.graph().contains_node(a));
}

#[test]
fn reset_graph_uses_configured_center() {
    let mut config = EditorConfig::default();
    config.default_center = mindweave_core::geom::point(10.0, 20.0);
    let mut s = EditingSession::new("a", config);
    let c = center(&s);
    s.add_child_node(c, "x").unwrap();
    s.reset_graph("b");
    let center = s.graph().center().unwrap();
    assert_eq!(center.text, "b");
    assert_eq!((center.position.x, center.position.y), (10.0, 20.0));
    assert_eq!(s.graph().node_count(), 1);
}

#[test]
fn restore_applies_configured_history_capacity() {
    let mut s = session();
    let c = center(&s);
    for i in 0..5 {
        s.add_child_node(c, format!("n{i}")).unwrap();
    }
    assert_eq!(s.history().undo_depth(), 5);

    let mut config = EditorConfig::default();
    config.history_capacity = 2;
    let mut resumed = EditingSession::restore(s.to_state(), config).unwrap();
    assert_eq!(resumed.history().capacity(), 2);
    assert_eq!(resumed.history().undo_depth(), 2);
    assert!(resumed.undo());
    assert!(resumed.undo());
    assert!(!resumed.undo());
    assert_eq!(resumed.graph().node_count(), 4);
}

#[test]
fn saved_state_with_broken_history_snapshot_is_rejected() {
    let mut s = session();
    let c = center(&s);
    s.add_child_node(c, "a").unwrap();
    let mut value = serde_json::to_value(s.to_state()).unwrap();
    value["history"]["undo"][0]["nodes"][0]["isCenter"] = serde_json::Value::from(false);

    assert!(serde_json::from_value::<mindweave_core::SessionState>(value).is_err());
}

#[test]
fn graph_without_center_cannot_be_opened() {
    let s = session();
    let mut value = serde_json::to_value(s.graph()).unwrap();
    value["nodes"][0]["isCenter"] = serde_json::Value::from(false);

    assert!(serde_json::from_value::<mindweave_core::Graph>(value).is_err());
}
