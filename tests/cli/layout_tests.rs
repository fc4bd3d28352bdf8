//! Layout command tests

#[cfg(feature = "cli")]
use bpmn_di_layout::cli::commands::layout::{LayoutArgs, handle_layout};
#[cfg(feature = "cli")]
use bpmn_di_layout::cli::error::CliError;
#[cfg(feature = "cli")]
use bpmn_di_layout::validation::validate_well_formed;
#[cfg(feature = "cli")]
use std::io::Write;
#[cfg(feature = "cli")]
use tempfile::{NamedTempFile, TempDir};

#[cfg(feature = "cli")]
const PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="Definitions_1">
  <bpmn:process id="Process_1">
    <bpmn:startEvent id="Start"/>
    <bpmn:task id="Task" name="Do it"/>
    <bpmn:endEvent id="End"/>
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start" targetRef="Task"/>
    <bpmn:sequenceFlow id="Flow_2" sourceRef="Task" targetRef="End"/>
  </bpmn:process>
</bpmn:definitions>
"#;

#[cfg(feature = "cli")]
fn input_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_layout_writes_output() {
    let input = input_file(PROCESS);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.bpmn");

    let args = LayoutArgs {
        input: input.path().to_path_buf(),
        output: output.clone(),
    };
    handle_layout(&args).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(validate_well_formed(&written).is_ok());
    assert!(written.contains(r#"<bpmndi:BPMNShape id="Task_di" bpmnElement="Task">"#));
    assert!(written.contains(r#"<bpmndi:BPMNEdge id="Flow_2_di" bpmnElement="Flow_2">"#));
    // Pretty-printed with two-space indentation
    assert!(written.contains("\n  <bpmn:process id=\"Process_1\">\n"));
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_layout_twice_gives_same_output() {
    let input = input_file(PROCESS);
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.bpmn");
    let second = dir.path().join("second.bpmn");

    for output in [&first, &second] {
        let args = LayoutArgs {
            input: input.path().to_path_buf(),
            output: output.clone(),
        };
        handle_layout(&args).unwrap();
    }
    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        std::fs::read_to_string(&second).unwrap()
    );
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_layout_missing_input() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.bpmn");

    let args = LayoutArgs {
        input: dir.path().join("does-not-exist.bpmn"),
        output: output.clone(),
    };
    let result = handle_layout(&args);
    assert!(matches!(result, Err(CliError::FileReadError(..))));
    assert!(!output.exists());
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_layout_malformed_input() {
    let input = input_file("<bpmn:definitions xmlns:bpmn=\"x\"><bpmn:process>");
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.bpmn");

    let args = LayoutArgs {
        input: input.path().to_path_buf(),
        output: output.clone(),
    };
    let err = handle_layout(&args).unwrap_err();
    assert!(matches!(err, CliError::ImportError(_)));
    assert!(err.to_string().starts_with("import error: "));
    assert!(!output.exists());
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_layout_failed_import_keeps_existing_output() {
    let input = input_file("not xml at all");
    let mut output = NamedTempFile::new().unwrap();
    write!(output, "previous").unwrap();
    output.flush().unwrap();

    let args = LayoutArgs {
        input: input.path().to_path_buf(),
        output: output.path().to_path_buf(),
    };
    assert!(handle_layout(&args).is_err());
    assert_eq!(std::fs::read_to_string(output.path()).unwrap(), "previous");
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_layout_overwrites_existing_output() {
    let input = input_file(PROCESS);
    let mut output = NamedTempFile::new().unwrap();
    write!(output, "previous").unwrap();
    output.flush().unwrap();

    let args = LayoutArgs {
        input: input.path().to_path_buf(),
        output: output.path().to_path_buf(),
    };
    handle_layout(&args).unwrap();
    let written = std::fs::read_to_string(output.path()).unwrap();
    assert!(written.starts_with("<?xml"));
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_layout_writes_saved_xml_unchanged() {
    use bpmn_di_layout::export::SaveOptions;
    use bpmn_di_layout::modeler::Modeler;

    let source = PROCESS.replace(r#"name="Do it""#, r#"name="Do &lt;it&gt;&#10;&amp; done""#);
    let input = input_file(&source);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.bpmn");

    let args = LayoutArgs {
        input: input.path().to_path_buf(),
        output: output.clone(),
    };
    handle_layout(&args).unwrap();

    let mut modeler = Modeler::new();
    modeler.import_xml(&source).unwrap();
    let saved = modeler.save_xml(&SaveOptions { format: true }).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, saved);
    assert!(written.contains(r#"name="Do &lt;it&gt;&#10;&amp; done""#));
}
