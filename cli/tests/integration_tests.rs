use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_schema-registry");

const BLOG: &str = r#"
interfaces: [Timestamped]
models:
  - name: User
    location: src/models/user.rs
    fields:
      - { name: email, type: email, unique: true }
      - { name: handle, type: string, unique: true }
      - { name: status, type: enum, enum_name: UserStatus, enum_values: [ACTIVE, BANNED] }
    relations:
      - { property: posts, target: Post, list: true }
  - name: Post
    fields:
      - { name: title, type: string }
      - { name: title, type: string, nullable: true }
    relations:
      - { property: author, target: User, list: false }
      - { property: tags, target: Tag, list: true }
  - name: Timestamped
    fields:
      - { name: stamp, type: date }
"#;

fn write_blog(dir: &Path) {
    fs::write(dir.join("blog.yaml"), BLOG).expect("failed to write declarations");
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .env_remove("FILTER_BY_DEFAULT")
        .output()
        .expect("failed to run schema-registry")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_json_lists_models_without_interfaces() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());

    let output = run(&[
        "inspect",
        dir.path().to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let models: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = models
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Post", "User"]);
    assert_eq!(models[1]["columns"][0]["property_name"], "id");
}

#[test]
fn inspect_filter_flag_overrides_environment() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());
    let input = dir.path().join("blog.yaml");

    let output = Command::new(BIN)
        .args([
            "inspect",
            input.to_str().unwrap(),
            "--model",
            "Post",
            "--format",
            "json",
            "--filter-by-default",
            "false",
        ])
        .env("FILTER_BY_DEFAULT", "true")
        .output()
        .expect("failed to run schema-registry");
    assert!(output.status.success());

    let models: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let title = &models[0]["columns"][8];
    assert_eq!(title["property_name"], "title");
    assert_eq!(title["filter"], false);
    assert_eq!(title["sort"], false);
}

#[test]
fn inspect_config_file_sets_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());
    let config = dir.path().join("registry.yml");
    fs::write(&config, "filter_by_default: \"false\"\n").unwrap();

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "inspect",
        dir.path().join("blog.yaml").to_str().unwrap(),
        "--model",
        "User",
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let models: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(models[0]["columns"][8]["sort"], false);
}

#[test]
fn inspect_unknown_model_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());

    let output = run(&["inspect", dir.path().to_str().unwrap(), "--model", "Nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Unknown model 'Nope'"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// uniques / enums
// ---------------------------------------------------------------------------

#[test]
fn uniques_prints_one_name_per_line() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());

    let output = run(&["uniques", dir.path().to_str().unwrap(), "--model", "User"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "id\nemail\nhandle\n");
}

#[test]
fn enums_table_lists_values() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());

    let output = run(&["enums", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "User.status  UserStatus  ACTIVE | BANNED\n");
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_findings() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());

    let output = run(&["check", dir.path().to_str().unwrap()]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("duplicate column title in model Post"), "stdout: {out}");
    assert!(out.contains("relation Post.tags targets unknown model Tag"), "stdout: {out}");
    assert!(out.contains("Checked 2 model(s): 2 finding(s)."), "stdout: {out}");
}

#[test]
fn check_strict_fails_on_findings() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());

    let output = run(&["check", dir.path().to_str().unwrap(), "--strict"]);
    assert!(!output.status.success());
}

#[test]
fn missing_relation_argument_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bad.yaml"),
        "models:\n  - name: Post\n    relations:\n      - { target: User, list: false }\n",
    )
    .unwrap();

    let output = run(&["check", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing relation options for Post: property_name"),
        "stderr: {stderr}"
    );
}

// ---------------------------------------------------------------------------
// snapshot
// ---------------------------------------------------------------------------

#[test]
fn snapshot_writes_hashed_json() {
    let dir = tempfile::tempdir().unwrap();
    write_blog(dir.path());
    let out_path = dir.path().join("out").join("schema.json");

    let output = run(&[
        "snapshot",
        dir.path().join("blog.yaml").to_str().unwrap(),
        "--output",
        out_path.to_str().unwrap(),
        "--dedupe",
        "keep-last",
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Wrote snapshot of 2 model(s)"));

    let snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(snapshot["snapshot_hash"].as_str().unwrap().len(), 64);
    assert_eq!(snapshot["interfaces"][0], "Timestamped");

    let post_columns = snapshot["models"]["Post"]["columns"].as_array().unwrap();
    let titles: Vec<_> = post_columns
        .iter()
        .filter(|c| c["property_name"] == "title")
        .collect();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["nullable"], true);
}
