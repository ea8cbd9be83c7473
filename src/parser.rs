//! Parsing Robot source text into a [`Program`].
//!
//! Every source line is `COMMAND[ ARGUMENT]`. Lines that are empty or start
//! with whitespace are comments. Loading is done in two passes: labels are
//! recorded while the lines are parsed, jumps to named labels get a
//! placeholder and are patched once every label is known.
use std::sync::LazyLock;

use log::debug;
use rustc_hash::FxHashMap as HashMap;
use thiserror::Error;

use crate::{
    ops::Op,
    program::{LabelTable, Program},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Unknown command: `{0}`.")]
    UnknownCommand(String),
    #[error("Command {command} does not take arguments, got `{argument}`.")]
    UnexpectedArgument { command: &'static str, argument: String },
    #[error("String literal must be enclosed in single quotes: `{0}`.")]
    UnquotedLiteral(String),
    #[error("String literal contains an unescaped single quote (use `''`): `{0}`.")]
    UnescapedQuote(String),
    #[error("Command {command} expects {expected} positive integer(s) separated by a space, got `{argument}`.")]
    InvalidIndices { command: &'static str, expected: usize, argument: String },
    #[error("Stack positions of {command} are 1-based, 0 is not allowed.")]
    ZeroIndex { command: &'static str },
    #[error("Command LABEL requires a non-empty name.")]
    EmptyLabel,
}

/// What a single source line turned into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// A complete instruction.
    Op(Op),
    /// `LABEL name`, compiles to [`Op::Nop`].
    Label(String),
    /// `JMP name`, resolved after the whole program is read.
    JumpTo(String),
}

type CommandParser = fn(&str) -> Result<Instruction, ParserError>;

static COMMANDS: LazyLock<HashMap<&'static str, CommandParser>> = LazyLock::new(|| {
    let commands: [(&'static str, CommandParser); 10] = [
        ("POP", |arg| no_arguments("POP", arg, Op::Pop)),
        ("PUSH", parse_push),
        ("WRITE", |arg| no_arguments("WRITE", arg, Op::Write)),
        ("READ", |arg| no_arguments("READ", arg, Op::Read)),
        ("SWAP", parse_swap),
        ("COPY", parse_copy),
        ("LABEL", parse_label),
        ("JMP", parse_jump),
        ("CONCAT", |arg| no_arguments("CONCAT", arg, Op::Concat)),
        ("REPLACEONE", |arg| no_arguments("REPLACEONE", arg, Op::ReplaceOne)),
    ];
    commands.into_iter().collect()
});

fn no_arguments(command: &'static str, argument: &str, op: Op) -> Result<Instruction, ParserError> {
    if !argument.is_empty() {
        return Err(ParserError::UnexpectedArgument { command, argument: argument.to_string() });
    }
    Ok(Instruction::Op(op))
}

fn parse_push(argument: &str) -> Result<Instruction, ParserError> {
    parse_literal(argument).map(|value| Instruction::Op(Op::Push(value)))
}

/// Parses `'text'`, where `''` stands for one quote inside the literal.
pub fn parse_literal(argument: &str) -> Result<String, ParserError> {
    let inner = argument
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .ok_or_else(|| ParserError::UnquotedLiteral(argument.to_string()))?;

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return Err(ParserError::UnescapedQuote(argument.to_string()));
        }
        value.push(c);
    }
    Ok(value)
}

/// Parses space-separated 1-based positions and converts them to 0-based offsets.
fn parse_positions<const N: usize>(command: &'static str, argument: &str) -> Result<[usize; N], ParserError> {
    let invalid = || ParserError::InvalidIndices { command, expected: N, argument: argument.to_string() };

    let mut positions = [0; N];
    let mut parts = argument.split(' ');
    for position in positions.iter_mut() {
        let part = parts.next().ok_or_else(invalid)?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let n: usize = part.parse().map_err(|_| invalid())?;
        *position = n.checked_sub(1).ok_or(ParserError::ZeroIndex { command })?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(positions)
}

fn parse_swap(argument: &str) -> Result<Instruction, ParserError> {
    let [a, b] = parse_positions::<2>("SWAP", argument)?;
    Ok(Instruction::Op(Op::Swap(a, b)))
}

fn parse_copy(argument: &str) -> Result<Instruction, ParserError> {
    let [n] = parse_positions::<1>("COPY", argument)?;
    Ok(Instruction::Op(Op::Copy(n)))
}

fn parse_label(argument: &str) -> Result<Instruction, ParserError> {
    if argument.is_empty() {
        return Err(ParserError::EmptyLabel);
    }
    Ok(Instruction::Label(argument.to_string()))
}

fn parse_jump(argument: &str) -> Result<Instruction, ParserError> {
    if argument.is_empty() {
        Ok(Instruction::Op(Op::JumpDynamic))
    } else {
        Ok(Instruction::JumpTo(argument.to_string()))
    }
}

/// Parses one instruction line.
pub fn parse_instruction(line: &str) -> Result<Instruction, ParserError> {
    let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
    let parser = COMMANDS
        .get(command)
        .ok_or_else(|| ParserError::UnknownCommand(command.to_string()))?;
    parser(argument)
}

/// Empty lines and lines starting with whitespace carry no instruction.
pub fn is_comment(line: &str) -> bool {
    line.chars().next().map_or(true, char::is_whitespace)
}

/// An error that makes a program impossible to load.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Syntax error on line {line}: {error}")]
    Syntax { line: usize, error: ParserError },
    #[error("Label `{label}` on line {line} is already defined (instruction {existing}).")]
    DuplicateLabel { label: String, line: usize, existing: usize },
    #[error("Jump on line {line} refers to undefined label `{label}`.")]
    UndefinedLabel { label: String, line: usize },
}

/// A `JMP name` waiting for its label.
struct PendingJump {
    index: usize,
    label: String,
    line: usize,
}

/// Builds a program from source lines. Line numbers in errors are 1-based
/// and count comment lines too.
pub fn parse_program<I, S>(lines: I) -> Result<Program, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ops = Vec::new();
    let mut labels = LabelTable::new();
    let mut pending = Vec::new();

    for (line_index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let line_number = line_index + 1;
        if is_comment(line) {
            continue;
        }

        let instruction = parse_instruction(line)
            .map_err(|error| LoadError::Syntax { line: line_number, error })?;
        let index = ops.len();
        match instruction {
            Instruction::Op(op) => ops.push(op),
            Instruction::Label(label) => {
                labels.insert(&label, index).map_err(|existing| LoadError::DuplicateLabel {
                    label: label.clone(),
                    line: line_number,
                    existing,
                })?;
                ops.push(Op::Nop);
            }
            Instruction::JumpTo(label) => {
                pending.push(PendingJump { index, label, line: line_number });
                ops.push(Op::Nop);
            }
        }
    }

    for PendingJump { index, label, line } in pending {
        let target = labels.get(&label).ok_or(LoadError::UndefinedLabel { label, line })?;
        ops[index] = Op::Jump(target);
    }

    debug!("Loaded program with {} instructions and {} labels", ops.len(), labels.len());
    Ok(Program::new(ops, labels))
}

/// Builds a program from a whole source text.
pub fn parse_source(source: &str) -> Result<Program, LoadError> {
    parse_program(source.lines())
}
