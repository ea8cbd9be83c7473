use robot::{
    evaluate,
    parser::{parse_source, LoadError},
    vm::{self, OperationError, RunError, VMOptions},
    Error,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_unary_add() {
    let source = include_str!("../benches/programs/unary_add.robot");
    let output = evaluate(source.lines(), strings(&["|||", "||"])).unwrap();
    assert_eq!(output, strings(&["xxxxx"]));

    let output = evaluate(source.lines(), strings(&["", ""])).unwrap();
    assert_eq!(output, strings(&[""]));
}

#[test]
fn test_replace_all() {
    let source = include_str!("../benches/programs/replace_all.robot");
    let output = evaluate(source.lines(), strings(&["cat, concatenate, catalogue"])).unwrap();
    assert_eq!(output, strings(&["dog, condogenate, dogalogue"]));
}

#[test]
fn test_hello_world() {
    let output = evaluate(["PUSH 'World'", "PUSH 'Hello, '", "CONCAT", "WRITE"], Vec::new()).unwrap();
    assert_eq!(output, strings(&["Hello, World"]));
}

#[test]
fn test_echo_until_input_runs_out() {
    let source = ["LABEL loop", "READ", "WRITE", "POP", "JMP loop"];
    let program = parse_source(&source.join("\n")).unwrap();
    let mut output = Vec::new();
    let err = vm::run(&program, strings(&["a", "b"]).into_iter(), &mut output, &VMOptions::default()).unwrap_err();
    assert_eq!(err.operation_error(), Some(&OperationError::InputExhausted));
    assert_eq!(output, strings(&["a", "b"]));
}

#[test]
fn test_load_errors_are_reported_before_running() {
    let err = evaluate(["PUSH 'x'", "WRITE", "JMP missing"], Vec::new()).unwrap_err();
    assert_eq!(err, Error::Load(LoadError::UndefinedLabel { label: "missing".to_string(), line: 3 }));

    let err = evaluate(["LABEL same", "LABEL same"], Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Load(LoadError::DuplicateLabel { .. })));
}

#[test]
fn test_run_errors() {
    let err = evaluate(["POP"], Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Run(RunError::InstructionFailed { index: 0, error: OperationError::StackUnderflow { .. }, .. })));
    assert_eq!(err.to_string(), "Instruction 0 (POP) failed (instruction counter 0): Stack underflow: no element at position 0 below the head (stack has 0 elements)");
}
