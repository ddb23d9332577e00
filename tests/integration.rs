use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_scaddoc")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn stdout_of(args: &[&str]) -> String {
    let assert = cmd().args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

// -- text modes --

#[test]
fn stdin_sig_doc() {
    cmd()
        .write_stdin("/** Adds one. */\nfunction inc(x) = x + 1;\nmodule m() {}\n")
        .assert()
        .success()
        .stdout("\nfunction inc(x)\n/** Adds one. */\n\nmodule m()\n** NO DOCUMENT FOR SYMBOL **\n");
}

#[test]
fn ids_in_file_order() {
    let out = stdout_of(&["--show", "id", &fixture_path("shapes.scad"), &fixture_path("uses.scad")]);
    assert_eq!(out, "shifter\nsquare_at\n_private_helper\napply\norigin\n");
}

#[test]
fn id_filter_with_line_numbers() {
    let out = stdout_of(&["--show", "code", "--id", "square_at", "-n", &fixture_path("shapes.scad")]);
    assert_eq!(out, "41: module square_at(size = 1) {\n42:   square(size);\n43: }\n");
}

#[test]
fn summary_mode() {
    cmd()
        .args(["--show", "summary", &fixture_path("shapes.scad")])
        .assert()
        .success()
        .stdout(predicate::str::contains("module square_at(size = 1) (lines 41-43)"))
        .stdout(predicate::str::contains("function _private_helper() (line 46)"));
}

// -- markdown --

#[test]
fn markdown_reference() {
    cmd()
        .args(["--show", "md", &fixture_path("shapes.scad"), &fixture_path("uses.scad")])
        .assert()
        .success()
        .stdout(predicate::str::contains("📘shapes.scad</span><a id='file-shapes.scad'></a>"))
        .stdout(predicate::str::contains("> ℹ️ NOTE: all sizes are in millimetres."))
        .stdout(predicate::str::contains("#### ⚙️shifter<a id='f-shifter'></a>"))
        .stdout(predicate::str::contains("    shifter(d) (p) : Point"))
        .stdout(predicate::str::contains("#### 🧊square\\_at<a id='m-square_at'></a>"))
        .stdout(predicate::str::contains(" *(Default: `1`)*"))
        .stdout(predicate::str::contains("#### 🧩⚙️Mapper<a id='t-Mapper'></a>"))
        .stdout(predicate::str::contains("#### ⚙️apply<a id='f-apply'></a>"))
        .stdout(predicate::str::contains("_private_helper").not());
}

#[test]
fn markdown_with_private() {
    cmd()
        .args(["--show", "md-with-private", &fixture_path("shapes.scad")])
        .assert()
        .success()
        .stdout(predicate::str::contains("#### ⚙️\\_private\\_helper<a id='f-_private_helper'></a>"));
}

#[test]
fn markdown_toc() {
    let out = stdout_of(&["--show", "md", "--toc", &fixture_path("shapes.scad")]);
    assert!(out.starts_with("## Table of Contents\n\n<details><summary>"), "{out}");
    assert!(out.contains("• <a href=\"#f-shifter\">⚙️shifter</a><br>"));
    assert!(out.contains("• <a href=\"#t-Point\">🧩Point</a><br>"));
}

#[test]
fn toc_requires_markdown() {
    cmd()
        .args(["--toc", &fixture_path("shapes.scad")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--toc requires"));
}

// -- json --

#[test]
fn json_tracking() {
    let out = stdout_of(&["--show", "json", &fixture_path("shapes.scad"), &fixture_path("uses.scad")]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["hash_algo"], "SHA256");
    assert_eq!(json["combined_hash"].as_str().unwrap().len(), 64);
    assert_eq!(json["ids"]["apply"]["type"], "function");
    assert_eq!(json["ids"]["origin"]["type"], "value");
    assert_eq!(json["ids"]["square_at"]["line_start"], 41);
    assert_eq!(json["filenames"][fixture_path("uses.scad")]["order"], 1);
    assert!(json["mtime"].as_str().unwrap().ends_with("GMT+0000"));
}

// -- writing files --

#[test]
fn write_to_files_per_input() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("shapes.scad");
    std::fs::copy(fixture_path("shapes.scad"), &src).unwrap();

    cmd()
        .args(["--show", "sig", "--write-to-files", "txt", src.to_str().unwrap()])
        .assert()
        .success()
        .stdout("");

    let out = std::fs::read_to_string(dir.path().join("shapes.scad.txt")).unwrap();
    assert!(out.starts_with("function shifter(d)\n"));
}

#[test]
fn write_to_file_truncates() {
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("API.md");
    std::fs::write(&out_path, "stale contents").unwrap();

    cmd()
        .args(["--show", "md", "--write-to-file", out_path.to_str().unwrap(), &fixture_path("shapes.scad")])
        .assert()
        .success();

    let out = std::fs::read_to_string(&out_path).unwrap();
    assert!(!out.contains("stale contents"));
    assert!(out.contains("<a id='t-Point'></a>"));
}

#[test]
fn write_to_files_rejected_on_stdin() {
    cmd()
        .args(["--write-to-files", "md"])
        .write_stdin("x = 1;\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stdin"));
}

// -- diagnostics --

#[test]
fn use_before_declaration_fails() {
    cmd()
        .args(["--show", "id", &fixture_path("uses.scad"), &fixture_path("shapes.scad")])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("uses type 'Point' which has not been defined yet"));
}

#[test]
fn over_documented_params_fail() {
    cmd()
        .arg(fixture_path("over_documented.scad"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("documents 3 parameters but only 2 are declared"));
}

#[test]
fn under_documented_params_warn() {
    cmd()
        .args(["--show", "id", &fixture_path("under_documented.scad")])
        .assert()
        .success()
        .stdout("g\n")
        .stderr(predicate::str::contains("isn't documenting all callable parameters (1 of 3)"));
}

#[test]
fn unterminated_string_on_stdin() {
    cmd()
        .write_stdin("x = 1;\ny = \"oops;\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<stdin>:2: unterminated string literal"));
}

#[test]
fn missing_file_pattern_fails() {
    cmd()
        .arg(fixture_path("nope-*.scad"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no files matched"));
}
