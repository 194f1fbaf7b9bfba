// CLI integration tests for build/inspect flows and exit codes.
use std::fs;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_mkscript");
    let mut command = Command::new(exe);
    command.stdin(Stdio::null());
    command
}

fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("valid json")
}

#[test]
fn build_derives_output_and_reports_counts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("level1.csv");
    fs::write(&input, "10,sys,a,b,cmd,hello\n").unwrap();

    let build = cmd()
        .args(["build", input.to_str().unwrap()])
        .output()
        .expect("build");
    assert!(build.status.success());
    let stdout = String::from_utf8(build.stdout).expect("utf8");
    assert!(stdout.contains("1 total commands."));
    assert!(stdout.contains("Size: 40 bytes."));

    let bytes = fs::read(temp.path().join("level1.sdf")).expect("output");
    let mut expected = b"FDS\0v0.9.0\x01\0\0\0".to_vec();
    expected.extend_from_slice(&[0x0A, 0, 0, 0, 0, 0, 0, 0]);
    expected.extend_from_slice(b"sys\0a\0b\0cmd\0hello\0");
    assert_eq!(bytes, expected);
}

#[test]
fn build_json_report_and_inspect_round_trip() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("events.json");
    let output = temp.path().join("intro.sdf");
    fs::write(
        &input,
        r#"{"first": [0, "spawner", "", "", "new", "ship;10;20"], "second": [-5, "hud", "", "", "text", "go"]}"#,
    )
    .unwrap();

    let build = cmd()
        .args([
            "--json",
            "build",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
        ])
        .output()
        .expect("build");
    assert!(build.status.success());
    let report = parse_json(&build.stdout);
    assert_eq!(report["records"], 2);
    assert_eq!(report["format"], "json");
    assert_eq!(
        report["bytes"].as_u64().unwrap(),
        fs::metadata(&output).unwrap().len()
    );

    let inspect = cmd()
        .args(["inspect", "--json", output.to_str().unwrap()])
        .output()
        .expect("inspect");
    assert!(inspect.status.success());
    let script = parse_json(&inspect.stdout);
    assert_eq!(script["header"]["version"], "v0.9.0");
    assert_eq!(script["header"]["records"], 2);
    assert_eq!(script["records"][0]["command"], "new");
    assert_eq!(script["records"][0]["args"][1], "10");
    assert_eq!(script["records"][1]["timer"], -5);
}

#[test]
fn existing_output_requires_confirmation() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("level.csv");
    let output = temp.path().join("level.sdf");
    fs::write(&input, "0,a,b,c,d,e\n").unwrap();
    fs::write(&output, b"keep me").unwrap();

    let refused = cmd()
        .args(["build", input.to_str().unwrap()])
        .output()
        .expect("build");
    assert_eq!(refused.status.code().unwrap(), 4);
    assert_eq!(fs::read(&output).unwrap(), b"keep me");

    let forced = cmd()
        .args(["build", input.to_str().unwrap(), "--yes"])
        .output()
        .expect("build");
    assert!(forced.status.success());
    let first = fs::read(&output).unwrap();
    assert!(first.starts_with(b"FDS\0"));

    let again = cmd()
        .args(["build", input.to_str().unwrap(), "-y"])
        .output()
        .expect("build");
    assert!(again.status.success());
    assert_eq!(fs::read(&output).unwrap(), first);
}

#[test]
fn arity_error_names_row_and_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("level.csv");
    fs::write(&input, "0,a,b,c,d,e\n1,a,b,c,d,e,f\n").unwrap();

    let build = cmd()
        .args(["build", input.to_str().unwrap()])
        .output()
        .expect("build");
    assert_eq!(build.status.code().unwrap(), 7);
    let stderr = String::from_utf8(build.stderr).expect("utf8");
    assert!(stderr.contains("row 2"));
    assert!(!temp.path().join("level.sdf").exists());
}

#[test]
fn json_errors_are_structured() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("level.csv");
    fs::write(&input, "soon,a,b,c,d,e\n").unwrap();

    let build = cmd()
        .args(["--json", "build", input.to_str().unwrap()])
        .output()
        .expect("build");
    assert_eq!(build.status.code().unwrap(), 8);
    let err = parse_json(&build.stderr);
    assert_eq!(err["error"]["kind"], "FieldType");
    assert_eq!(err["error"]["row"], 1);
    assert_eq!(err["error"]["field"], "timer");
}

#[test]
fn unsupported_extension_and_missing_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("level.yml");
    fs::write(&input, "- [0, a, b, c, d, e]\n").unwrap();

    let build = cmd()
        .args(["build", input.to_str().unwrap()])
        .output()
        .expect("build");
    assert_eq!(build.status.code().unwrap(), 5);
    assert!(!temp.path().join("level.sdf").exists());

    let missing = cmd()
        .args(["build", temp.path().join("nope.csv").to_str().unwrap()])
        .output()
        .expect("build");
    assert_eq!(missing.status.code().unwrap(), 3);

    let missing_yml = cmd()
        .args(["build", temp.path().join("nope.yml").to_str().unwrap()])
        .output()
        .expect("build");
    assert_eq!(missing_yml.status.code().unwrap(), 5);
}

#[test]
fn inspect_labels_every_field() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("level.csv");
    fs::write(&input, "7,sys,a,b,cmd,x;y\n").unwrap();
    let build = cmd()
        .args(["build", input.to_str().unwrap()])
        .output()
        .expect("build");
    assert!(build.status.success());

    let inspect = cmd()
        .args(["inspect", temp.path().join("level.sdf").to_str().unwrap()])
        .output()
        .expect("inspect");
    assert!(inspect.status.success());
    let stdout = String::from_utf8(inspect.stdout).expect("utf8");
    assert!(stdout.contains("system=sys to=a from=b command=cmd args=x;y"));
}

#[test]
fn format_override_accepts_other_extensions() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("level.txt");
    fs::write(&input, "0,a,b,c,d,e\n").unwrap();

    let build = cmd()
        .args(["build", input.to_str().unwrap(), "--in", "csv"])
        .output()
        .expect("build");
    assert!(build.status.success());
    assert!(temp.path().join("level.sdf").exists());
}

#[test]
fn empty_input_is_no_data() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("empty.json");
    fs::write(&input, "{}").unwrap();

    let build = cmd()
        .args(["build", input.to_str().unwrap()])
        .output()
        .expect("build");
    assert_eq!(build.status.code().unwrap(), 10);
    assert!(!temp.path().join("empty.sdf").exists());
}

#[test]
fn usage_exit_code() {
    let build = cmd().args(["build", "--in", "xml", "a.csv"]).output().expect("build");
    assert_eq!(build.status.code().unwrap(), 2);
}
