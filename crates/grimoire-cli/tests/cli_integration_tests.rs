//! CLI integration tests
//!
//! Drive the `grimoire` binary against JSON documents in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

fn spell(dir: &TempDir) -> PathBuf {
    write_json(
        dir,
        "fireball.json",
        &json!({
            "_id": "fireball",
            "name": "Fireball",
            "type": "spell",
            "data": {"level": {"value": 3}, "overlays": {}}
        }),
    )
}

fn grimoire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grimoire"))
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_diff_prints_patch() {
    let dir = TempDir::new().unwrap();
    let a = write_json(&dir, "a.json", &json!({"name": "Shield", "data": {"level": 1, "school": "abjuration"}}));
    let b = write_json(&dir, "b.json", &json!({"name": "Shield", "data": {"level": 2}}));

    let output = grimoire(&["diff", arg(&a), arg(&b)]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"data": {"level": 2, "-=school": null}})
    );
}

#[test]
fn test_overlay_lifecycle() {
    let dir = TempDir::new().unwrap();
    let doc = spell(&dir);

    let created = grimoire(&["overlay", "create", arg(&doc)]);
    assert!(created.status.success(), "{}", String::from_utf8_lossy(&created.stderr));
    let id = String::from_utf8(created.stdout).unwrap().trim().to_string();

    let updated = grimoire(&[
        "overlay",
        "update",
        arg(&doc),
        &id,
        r#"{"name": "Fireball (5th)", "data": {"level": {"value": 5}}}"#,
    ]);
    assert!(updated.status.success(), "{}", String::from_utf8_lossy(&updated.stderr));
    assert_eq!(stdout_json(&updated)["data"]["level"]["value"], 5);

    let listed = grimoire(&["variants", arg(&doc), "--json"]);
    assert!(listed.status.success());
    let choices = stdout_json(&listed);
    assert_eq!(choices[0], json!({"overlay_id": null, "label": "Fireball (base)"}));
    assert_eq!(choices[1], json!({"overlay_id": id, "label": "Fireball (5th)"}));

    let picked = grimoire(&["variants", arg(&doc), "--pick", "1"]);
    assert!(picked.status.success());
    assert_eq!(stdout_json(&picked)["data"]["level"]["value"], 5);

    let kind = grimoire(&["overlay", "kind", arg(&doc), &id]);
    assert_eq!(String::from_utf8(kind.stdout).unwrap().trim(), "override");

    let deleted = grimoire(&["overlay", "delete", arg(&doc), &id]);
    assert!(deleted.status.success());
    let persisted: Value = serde_json::from_slice(&fs::read(&doc).unwrap()).unwrap();
    assert_eq!(persisted["data"]["overlays"], json!({}));
}

#[test]
fn test_delete_missing_overlay_fails() {
    let dir = TempDir::new().unwrap();
    let doc = spell(&dir);
    let before = fs::read(&doc).unwrap();

    let output = grimoire(&["overlay", "delete", arg(&doc), "missing-id"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not have an overlay"));
    assert_eq!(fs::read(&doc).unwrap(), before);
}

#[test]
fn test_unsupported_kind_fails() {
    let dir = TempDir::new().unwrap();
    let doc = spell(&dir);

    let output = grimoire(&["overlay", "create", arg(&doc), "--kind", "variant"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported overlay kind"));
}

#[test]
fn test_prepare_prints_report() {
    let dir = TempDir::new().unwrap();
    let actor = write_json(
        &dir,
        "ezren.json",
        &json!({
            "_id": "ezren",
            "name": "Ezren",
            "data": {"light": {"bright": 20}},
            "items": [{
                "_id": "torch",
                "name": "Torch",
                "rules": [
                    {"type": "TokenLight", "value": {"bright": "@actor.light.bright", "dim": 40}},
                    {"type": "TokenLight", "value": {"bright": -1}}
                ]
            }]
        }),
    );

    let output = grimoire(&["prepare", arg(&actor)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report = stdout_json(&output);
    assert_eq!(report["elements"][0]["outcome"], "active");
    assert_eq!(report["elements"][1]["outcome"], "suppressed");
    assert_eq!(report["synthetics"]["tokenOverrides"]["light"]["bright"], 20.0);
}

#[test]
fn test_config_disables_rule_kind() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("grimoire.toml");
    fs::write(&config, "[rules]\ndisabled_kinds = [\"TokenLight\"]\n").unwrap();
    let actor = write_json(
        &dir,
        "ezren.json",
        &json!({
            "_id": "ezren",
            "items": [{"_id": "torch", "rules": [{"type": "TokenLight", "value": {"bright": 5}}]}]
        }),
    );

    let output = grimoire(&["--config", arg(&config), "prepare", arg(&actor)]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["elements"][0]["outcome"], "disabled");
}

#[test]
fn test_malformed_config_exits_with_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("grimoire.toml");
    fs::write(&config, "[rules\n").unwrap();
    let doc = spell(&dir);

    let output = grimoire(&["--config", arg(&config), "variants", arg(&doc)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid configuration"));
}
