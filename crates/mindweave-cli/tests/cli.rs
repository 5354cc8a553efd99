use assert_cmd::prelude::*;
use std::path::Path;
use std::process::Command;

fn cli(store: &Path) -> Command {
    let exe = assert_cmd::cargo_bin!("mindweave-cli");
    let mut cmd = Command::new(exe);
    cmd.env_remove("MINDWEAVE_LOG")
        .arg("--store")
        .arg(store.to_string_lossy().as_ref());
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.output().expect("run cli");
    assert!(
        out.status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("utf8 stdout")
}

#[test]
fn cli_without_command_prints_usage() {
    let exe = assert_cmd::cargo_bin!("mindweave-cli");
    Command::new(exe).assert().failure().code(2);
}

#[test]
fn cli_requires_an_existing_map() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");
    cli(&store).arg("outline").assert().failure().code(1);
}

#[test]
fn cli_builds_and_prints_an_outline() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");

    stdout_of(cli(&store).args(["new", "Trip"]));
    let child = stdout_of(cli(&store).args(["add", "center", "Packing"]));
    stdout_of(cli(&store).args(["add", child.trim(), "Socks"]));
    stdout_of(cli(&store).args(["add", "0", "Tickets"]));

    let outline = stdout_of(cli(&store).arg("outline"));
    assert_eq!(
        outline,
        "[0] Trip\n  [1] Packing\n    [2] Socks\n  [3] Tickets\n"
    );
}

#[test]
fn cli_delete_and_undo_round_trip() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");

    stdout_of(cli(&store).args(["new", "Root"]));
    stdout_of(cli(&store).args(["add", "center", "A"]));
    stdout_of(cli(&store).args(["add", "1", "B"]));

    let removed = stdout_of(cli(&store).args(["delete", "1"]));
    assert_eq!(removed.trim(), "removed 2 node(s)");
    assert_eq!(stdout_of(cli(&store).arg("outline")), "[0] Root\n");

    stdout_of(cli(&store).arg("undo"));
    assert_eq!(
        stdout_of(cli(&store).arg("outline")),
        "[0] Root\n  [1] A\n    [2] B\n"
    );

    stdout_of(cli(&store).arg("redo"));
    assert_eq!(stdout_of(cli(&store).arg("outline")), "[0] Root\n");

    cli(&store).arg("redo").assert().failure().code(1);
}

#[test]
fn cli_refuses_to_delete_center() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");

    stdout_of(cli(&store).args(["new", "Root"]));
    cli(&store).args(["delete", "center"]).assert().failure().code(1);
}

#[test]
fn cli_move_accepts_negative_offsets() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");

    stdout_of(cli(&store).args(["new", "Root"]));
    stdout_of(cli(&store).args(["add", "center", "A"]));
    let out = stdout_of(cli(&store).args(["move", "1", "10", "-5"]));

    let coords: Vec<f64> = out
        .split_whitespace()
        .map(|v| v.parse().expect("number"))
        .collect();
    assert_eq!(coords.len(), 2);
    assert!((coords[0] - 210.0).abs() < 1e-9, "x = {}", coords[0]);
    assert!((coords[1] - 135.0).abs() < 1e-9, "y = {}", coords[1]);
}

#[test]
fn cli_show_emits_graph_json() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");

    stdout_of(cli(&store).args(["new", "Root"]));
    stdout_of(cli(&store).args(["add", "center", "A"]));
    stdout_of(cli(&store).args(["reason", "1", "because"]));

    let json: serde_json::Value =
        serde_json::from_str(&stdout_of(cli(&store).arg("show"))).expect("graph json");
    assert_eq!(json["centerText"], "Root");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["connections"][0]["reason"], "because");
}

#[test]
fn cli_favorite_slots_and_unify() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");

    stdout_of(cli(&store).args(["new", "Root"]));
    stdout_of(cli(&store).args(["add", "center", "A"]));

    let favorites: serde_json::Value =
        serde_json::from_str(&stdout_of(cli(&store).arg("favorites"))).expect("json");
    let slots = favorites.as_array().expect("array");
    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|s| s["configured"] == false));

    stdout_of(cli(&store).args(["favorite-save", "2", "center"]));
    cli(&store).args(["favorite-save", "4", "center"]).assert().failure().code(2);

    let favorites: serde_json::Value =
        serde_json::from_str(&stdout_of(cli(&store).arg("favorites"))).expect("json");
    assert_eq!(favorites[1]["configured"], true);

    stdout_of(cli(&store).args(["unify", "2"]));
    let graph: serde_json::Value =
        serde_json::from_str(&stdout_of(cli(&store).arg("show"))).expect("json");
    assert_eq!(graph["nodes"][0]["style"], graph["nodes"][1]["style"]);
}

#[test]
fn cli_drafts_fill_up_at_capacity() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");
    let config = tmp.path().join("config.json");
    std::fs::write(&config, r#"{ "quota": { "localDraftCapacity": 2 } }"#).expect("config");

    stdout_of(cli(&store).args(["new", "Root"]));
    for _ in 0..2 {
        stdout_of(
            cli(&store)
                .arg("--config")
                .arg(config.to_string_lossy().as_ref())
                .arg("draft-save"),
        );
    }
    cli(&store)
        .arg("--config")
        .arg(config.to_string_lossy().as_ref())
        .arg("draft-save")
        .assert()
        .failure()
        .code(1);

    let drafts: serde_json::Value =
        serde_json::from_str(&stdout_of(cli(&store).arg("drafts"))).expect("json");
    assert_eq!(drafts.as_array().map(Vec::len), Some(2));
    assert_eq!(drafts[0]["title"], "Root");
}

#[test]
fn cli_quota_reports_monthly_window() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");

    let quota: serde_json::Value = serde_json::from_str(&stdout_of(
        cli(&store).args(["--today", "2024-03-15", "quota"]),
    ))
    .expect("json");
    assert_eq!(quota["serverSaveCount"], 0);
    assert_eq!(quota["remainingServerSaves"], 3);
    assert_eq!(quota["remainingLocalSlots"], 12);
    assert_eq!(quota["lastResetYearMonth"], 202403);
}

#[test]
fn cli_keeps_a_corrupted_session_instead_of_replacing_it() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");
    std::fs::write(&store, r#"{ "session.current": "{not json" }"#).expect("seed store");

    cli(&store).args(["new", "Root"]).assert().failure().code(1);
    cli(&store).arg("outline").assert().failure().code(1);

    let text = std::fs::read_to_string(&store).expect("read store");
    assert!(text.contains("{not json"), "{text}");
}
