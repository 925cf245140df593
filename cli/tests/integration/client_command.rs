//! Integration tests for `chefboot client`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::fixture::Workspace;

#[test]
fn test_client_shows_recorded_and_derived_names() {
    let ws = Workspace::configured();
    ws.chefboot()
        .args(["client", "web", "db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web-7 (registered)"))
        .stdout(predicate::str::contains("db-1 (derived)"));
}

#[test]
fn test_client_json_lists_identities() {
    let ws = Workspace::configured();
    let output = ws
        .chefboot()
        .args(["--json", "client", "web", "db", "web"])
        .output()
        .expect("run chefboot");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    let clients = value["clients"].as_array().expect("clients array");
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0]["name"], "web-7");
    assert_eq!(clients[0]["group"], "web");
    assert_eq!(clients[0]["registered"], true);
    assert_eq!(clients[1]["name"], "db-1");
    assert_eq!(clients[1]["registered"], false);
}

#[test]
fn test_client_missing_inventory_fails() {
    let ws = Workspace::bare();
    ws.write_config(&format!(
        "inventory:\n  path: {}\n",
        ws.path().join("absent.yaml").display()
    ));
    ws.chefboot()
        .args(["client", "web"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("lookup for group 'web' failed"));
}
