//! Exit codes and messages of the bpmn-layout binary

#[cfg(feature = "cli")]
use std::process::Command;
#[cfg(feature = "cli")]
use tempfile::TempDir;

#[cfg(feature = "cli")]
fn bpmn_layout() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bpmn-layout"))
}

#[cfg(feature = "cli")]
#[test]
fn test_binary_requires_two_arguments() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.bpmn");

    let output = bpmn_layout().arg(&input).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(feature = "cli")]
#[test]
fn test_binary_help_exits_zero() {
    let output = bpmn_layout().arg("--help").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("bpmn-layout"));
}

#[cfg(feature = "cli")]
#[test]
fn test_binary_reports_import_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.bpmn");
    let target = dir.path().join("out.bpmn");
    std::fs::write(&input, "<definitions>").unwrap();

    let output = bpmn_layout().arg(&input).arg(&target).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: import error: "));
    assert!(!target.exists());
}

#[cfg(feature = "cli")]
#[test]
fn test_binary_success() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.bpmn");
    let target = dir.path().join("out.bpmn");
    std::fs::write(
        &input,
        r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><process id="P"><task id="T"/></process></definitions>"#,
    )
    .unwrap();

    let output = bpmn_layout().arg(&input).arg(&target).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains(r#"bpmnElement="T""#));
}
