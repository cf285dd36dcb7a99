//! End-to-end runs of the `toolschema` binary.

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A binary isolated from any user or project config.
fn toolschema(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("toolschema").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("TOOLSCHEMA_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn convert_from_stdin() {
    let dir = TempDir::new().unwrap();
    let output = toolschema(&dir)
        .args(["convert", "-", "--dialect", "openai"])
        .write_stdin(r#"{"type": ["integer", "null"]}"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"anyOf": [{"type": "integer"}, {"type": "null"}]})
    );
}

#[test]
fn convert_failure_report() {
    let dir = TempDir::new().unwrap();
    let output = toolschema(&dir)
        .args(["convert", "-", "--dialect", "gemini", "--report"])
        .write_stdin(r##"{"$ref": "#/$defs/IMissing"}"##)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let report = stdout_json(&output);
    assert_eq!(report["success"], json!(false));
    assert_eq!(report["error"]["reasons"][0]["kind"], json!("dangling_reference"));
}

#[test]
fn project_config_selects_dialect() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".toolschema")).unwrap();
    std::fs::write(
        dir.path().join(".toolschema").join("config.toml"),
        "dialect = \"gemini\"\n",
    )
    .unwrap();
    let output = toolschema(&dir)
        .args(["convert", "-"])
        .write_stdin(r#"{"type": ["string", "null"]}"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"type": "string", "nullable": true})
    );
}

#[test]
fn unknown_dialect_fails() {
    let dir = TempDir::new().unwrap();
    let output = toolschema(&dir)
        .args(["convert", "-", "--dialect", "cobol"])
        .write_stdin("{}")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown dialect \"cobol\""), "{stderr}");
}

#[test]
fn invert_reads_dialect_layout() {
    let dir = TempDir::new().unwrap();
    let output = toolschema(&dir)
        .args(["invert", "-", "--dialect", "gemini"])
        .write_stdin(r#"{"type": "number", "nullable": true}"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let document = stdout_json(&output);
    assert_eq!(
        document["schema"],
        json!({"oneOf": [{"type": "number"}, {"type": "null"}]})
    );
}

#[test]
fn covers_check_exit_status() {
    let dir = TempDir::new().unwrap();
    let wide = dir.path().join("wide.json");
    let narrow = dir.path().join("narrow.json");
    std::fs::write(&wide, r#"{"type": "number"}"#).unwrap();
    std::fs::write(&narrow, r#"{"type": "integer", "minimum": 0}"#).unwrap();

    let output = toolschema(&dir)
        .arg("covers")
        .arg(&wide)
        .arg(&narrow)
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output), json!(true));

    let output = toolschema(&dir)
        .args(["covers", "--check"])
        .arg(&narrow)
        .arg(&wide)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output), json!(false));
}

#[test]
fn separate_splits_media_properties() {
    let dir = TempDir::new().unwrap();
    let output = toolschema(&dir)
        .args(["separate", "-", "--dialect", "claude"])
        .write_stdin(
            r#"{
                "type": "object",
                "properties": {
                    "caption": {"type": "string"},
                    "image": {"type": "string", "contentMediaType": "image/png"}
                },
                "required": ["caption", "image"]
            }"#,
        )
        .output()
        .unwrap();
    assert!(output.status.success());
    let sides = stdout_json(&output);
    assert_eq!(
        sides["llm"]["properties"],
        json!({"caption": {"type": "string"}})
    );
    assert_eq!(
        sides["human"]["properties"],
        json!({"image": {"type": "string", "contentMediaType": "image/png"}})
    );
}

#[test]
fn dialects_are_listed() {
    let dir = TempDir::new().unwrap();
    let output = toolschema(&dir).arg("dialects").output().unwrap();
    let listing = String::from_utf8_lossy(&output.stdout);
    for name in ["openai", "claude", "gemini", "llama", "openapi-3.0", "openapi-3.1"] {
        assert!(listing.contains(name), "{listing}");
    }
}

#[test]
fn schema_flag_prints_config_schema() {
    let dir = TempDir::new().unwrap();
    let output = toolschema(&dir).arg("--schema").output().unwrap();
    let response = stdout_json(&output);
    assert_eq!(response["config_path"], json!(".toolschema/config.toml"));
    assert!(response["schema"]["properties"]["convert"].is_object());
}
