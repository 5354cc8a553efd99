use super::*;
use crate::geom::point;

fn graph(text: &str) -> Graph {
    Graph::new(text, point(0.0, 0.0))
}

#[test]
fn undo_on_empty_history_is_none() {
    let mut history = HistoryManager::default();
    assert!(history.undo(&graph("live")).is_none());
    assert!(!history.can_undo());
}

#[test]
fn undo_returns_snapshots_in_reverse_order() {
    let mut history = HistoryManager::default();
    history.snapshot(&graph("s0"));
    history.snapshot(&graph("s1"));

    assert_eq!(history.undo(&graph("s2")).unwrap().center_text, "s1");
    assert_eq!(history.undo(&graph("s1")).unwrap().center_text, "s0");
    assert!(history.undo(&graph("s0")).is_none());
}

#[test]
fn redo_replays_undone_states_until_a_new_snapshot() {
    let mut history = HistoryManager::default();
    history.snapshot(&graph("s0"));
    let back = history.undo(&graph("s1")).unwrap();
    assert_eq!(back.center_text, "s0");
    assert!(history.can_redo());

    let forward = history.redo(&back).unwrap();
    assert_eq!(forward.center_text, "s1");
    assert_eq!(history.undo(&forward).unwrap().center_text, "s0");

    history.snapshot(&graph("other"));
    assert!(!history.can_redo());
    assert!(history.redo(&graph("x")).is_none());
}

#[test]
fn capacity_drops_oldest_snapshot() {
    let mut history = HistoryManager::default();
    for i in 0..21 {
        history.snapshot(&graph(&format!("s{i}")));
    }
    assert_eq!(history.undo_depth(), 20);

    let mut live = graph("s21");
    let mut seen = Vec::new();
    while let Some(prev) = history.undo(&live) {
        seen.push(prev.center_text.clone());
        live = prev;
    }
    assert_eq!(seen.len(), 20);
    assert_eq!(seen.first().map(String::as_str), Some("s20"));
    assert_eq!(seen.last().map(String::as_str), Some("s1"));
}

#[test]
fn snapshots_are_independent_of_the_live_graph() {
    let mut history = HistoryManager::default();
    let mut live = graph("before");
    history.snapshot(&live);
    live.center_text = "after".to_string();
    assert_eq!(history.undo(&live).unwrap().center_text, "before");
}

#[test]
fn shrinking_capacity_keeps_newest_snapshots() {
    let mut history = HistoryManager::new(10);
    for i in 0..6 {
        history.snapshot(&graph(&format!("s{i}")));
    }
    history.set_capacity(3);
    assert_eq!(history.capacity(), 3);
    assert_eq!(history.undo_depth(), 3);
    assert_eq!(
        history.undo(&graph("live")).map(|g| g.center_text),
        Some("s5".to_string())
    );

    history.set_capacity(0);
    assert_eq!(history.capacity(), 1);
    assert_eq!(history.undo_depth(), 1);
}
