#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PERSON: &str = r#"namespace RecordGeneratorTests
{
    [Record]
    class Person
    {
        public string FirstName { get; }

        public string LastName { get; }
    }
}
"#;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("record-generator").unwrap();
    cmd.env_remove("RECORD_GENERATOR_VERSION")
        .env_remove("RECORD_GENERATOR_JSON")
        .env_remove("RUST_LOG");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, text) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    dir
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn test_check_reports_findings_and_fails() {
    let dir = project(&[("Person.cs", PERSON)]);

    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Person.cs(4,11): RecordPartialMissing"))
        .stdout(predicate::str::contains("RecordAttributeDeclarationMissing"));
}

#[test]
fn test_fix_then_check_is_clean() {
    let dir = project(&[("Models/Person.cs", PERSON)]);

    cli()
        .args(["--generator-version", "1.0.0", "fix"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote companion"));

    assert!(read(dir.path(), "Models/Person.cs").contains("    partial class Person\n"));
    let companion = read(dir.path(), "Models/Person.RecordPartial.cs");
    assert!(companion.starts_with("// Record partial generated by RecordGenerator\n"));
    assert!(companion.contains(r#"GeneratedCode("RecordGenerator", "1.0.0")"#));
    assert!(read(dir.path(), "Models/RecordAttribute.cs").contains("class RecordAttribute"));

    cli()
        .args(["--generator-version", "1.0.0", "check"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All 1 record(s) up to date"));

    // A new generator version makes the companion stale.
    cli()
        .args(["--generator-version", "2.0.0", "check"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("GeneratorVersionDifferent"));
}

#[test]
fn test_fix_dry_run_writes_nothing() {
    let dir = project(&[("Person.cs", PERSON)]);

    cli()
        .args(["fix", "--dry-run"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("would add partial to"));

    assert_eq!(read(dir.path(), "Person.cs"), PERSON);
    assert!(!dir.path().join("Person.RecordPartial.cs").exists());
}

#[test]
fn test_check_json_output() {
    let dir = project(&[("Person.cs", PERSON)]);

    let output = cli()
        .args(["--json", "check"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = json["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0]["kind"], "RecordAttributeDeclarationMissing");
    assert_eq!(findings[1]["kind"], "RecordPartialMissing");
    assert_eq!(findings[1]["line"], 4);
    assert_eq!(findings[1]["record"], "Person");
}

#[test]
fn test_generate_prints_companion() {
    let dir = project(&[("Person.cs", PERSON)]);

    cli()
        .args(["--generator-version", "0.0.123.456", "generate"])
        .arg(dir.path().join("Person.cs"))
        .args(["--type", "Person"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"[System.CodeDom.Compiler.GeneratedCode("RecordGenerator", "0.0.123.456")]"#,
        ))
        .stdout(predicate::str::contains(
            "public Person(string FirstName, string LastName)",
        ))
        .stdout(predicate::str::contains(
            "return new Person(FirstName, LastName);",
        ));
}

#[test]
fn test_generate_unknown_type_fails() {
    let dir = project(&[("Person.cs", PERSON)]);

    cli()
        .arg("generate")
        .arg(dir.path().join("Person.cs"))
        .args(["--type", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Type Nobody not declared"));
}

#[test]
fn test_attribute_command() {
    cli()
        .args(["attribute", "--namespace", "My.App"])
        .assert()
        .success()
        .stdout(predicate::str::contains("namespace My.App"))
        .stdout(predicate::str::contains("public bool GenerateMutators { get; set; } = true;"));
}

#[test]
fn test_version_from_environment() {
    cli()
        .env("RECORD_GENERATOR_VERSION", "9.9.9")
        .arg("attribute")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""RecordGenerator", "9.9.9""#));
}

#[test]
fn test_json_from_environment() {
    let dir = project(&[("Person.cs", PERSON)]);

    let output = cli()
        .env("RECORD_GENERATOR_JSON", "1")
        .arg("check")
        .arg(dir.path())
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["findings"].is_array());
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = TempDir::new().unwrap();

    cli()
        .arg("check")
        .arg(dir.path().join("missing"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No such file or directory"));
}

#[test]
fn test_check_fails_when_a_file_is_skipped() {
    let dir = project(&[("Broken.cs", "[Record] partial class Broken { public int X { get; }")]);

    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Broken.cs"))
        .stdout(predicate::str::contains("warning: file skipped"))
        .stdout(predicate::str::contains(
            "All 0 record(s) up to date, 1 file(s) skipped",
        ));
}

#[cfg(unix)]
#[test]
fn test_symlink_loop_is_walked_once() {
    let dir = project(&[("src/A.cs", "[Record] partial class A { public int X { get; } }")]);
    std::os::unix::fs::symlink(dir.path(), dir.path().join("src/loop")).unwrap();

    cli()
        .arg("fix")
        .arg("--dry-run")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("A.RecordPartial.cs"))
        .stdout(predicate::str::contains("loop/").not());

    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2 finding(s)"));
}
