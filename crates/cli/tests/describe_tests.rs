//! Integration tests for `confdecl describe`.

mod common;

use common::{confdecl_cmd, confdecl_cmd_with_config, live_config};
use predicates::prelude::*;
use serde_json::{Value, json};

fn datapusher_payload() -> Value {
    json!({
        "groups": [{
            "annotation": "Datapusher settings",
            "options": [
                {
                    "default": "csv xls xlsx tsv application/csv application/vnd.ms-excel \
                                application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                    "key": "ckan.datapusher.formats",
                },
                {
                    "default": "http://127.0.0.1:8800/",
                    "key": "ckan.datapusher.url",
                },
                {
                    "default": 3600,
                    "key": "ckan.datapusher.assume_task_stale_after",
                    "validators": "convert_int",
                },
            ],
        }],
        "version": 1,
    })
}

fn describe(format: &str) -> String {
    let output = confdecl_cmd()
        .args(["describe", "datapusher", "--format", format])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_nothing_selected_prints_nothing() {
    confdecl_cmd()
        .arg("describe")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_core_declarations() {
    confdecl_cmd()
        .args(["describe", "--core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database settings"));
}

#[test]
fn test_explicit_plugin() {
    confdecl_cmd()
        .args(["describe", "datastore"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Datastore settings"));
}

#[test]
fn test_enabled_plugins_from_live_config() {
    let config = live_config(".toml", "[ckan]\nplugins = \"datastore\"\n");
    confdecl_cmd_with_config(&config)
        .args(["describe", "--enabled"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Datastore settings"));
}

#[test]
fn test_dict_format() {
    let data: Value = serde_json::from_str(&describe("dict")).unwrap();
    assert_eq!(data, datapusher_payload());
}

#[test]
fn test_json_format() {
    let output = describe("json");
    assert_eq!(output.lines().count(), 1);
    let data: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(data, datapusher_payload());
}

#[test]
fn test_yaml_format() {
    let data: Value = serde_yaml::from_str(&describe("yaml")).unwrap();
    assert_eq!(data, datapusher_payload());
}

#[test]
fn test_toml_format() {
    let data: Value = toml::from_str(&describe("toml")).unwrap();
    assert_eq!(data, datapusher_payload());
}

#[test]
fn test_rust_format() {
    let output = describe("rust");
    assert!(output.starts_with("\ndeclaration.annotate(\"Datapusher settings\")?;\n"));
    assert!(output.contains(
        "declaration.declare(Key::parse(\"ckan.datapusher.assume_task_stale_after\")?, json!(3600))?\
         .set_validators(\"convert_int\");"
    ));
}

#[test]
fn test_python_format_generates_same_code() {
    assert_eq!(describe("python"), describe("rust"));
}

#[test]
fn test_unknown_format_is_validation_error() {
    confdecl_cmd()
        .args(["describe", "datapusher", "--format", "xml"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Unknown describe format 'xml'"));
}

#[test]
fn test_unknown_plugin_is_ignored() {
    confdecl_cmd()
        .args(["describe", "spatial"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
