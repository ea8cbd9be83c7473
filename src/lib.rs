//! # robot
//! An interpreter for Robot, a tiny stack language where every value is a string.
//!
//! A program is a list of lines, one instruction per line:
//!
//! | Command | Effect |
//! |---|---|
//! | `PUSH 'text'` | push a literal, `''` inside the quotes is a single quote |
//! | `POP` | remove the head |
//! | `WRITE` | output the head, leaving it on the stack |
//! | `READ` | push the next input value |
//! | `SWAP a b` | exchange the elements at 1-based positions `a` and `b` (1 is the head) |
//! | `COPY n` | push a copy of the element at 1-based position `n` |
//! | `LABEL name` | mark a jump target |
//! | `JMP name` | jump to a label; plain `JMP` pops the label name from the stack |
//! | `CONCAT` | pop `a`, pop `b`, push `a` followed by `b` |
//! | `REPLACEONE` | pop text, pattern, replacement and a label; replace the first occurrence of the pattern, or jump to the label if there is none |
//!
//! Lines that are empty or start with whitespace are comments.
//!
//! ```
//! let output = robot::evaluate(
//!     ["PUSH 'World'", "PUSH 'Hello '", "CONCAT", "WRITE"],
//!     Vec::new(),
//! ).unwrap();
//! assert_eq!(output, vec!["Hello World".to_string()]);
//! ```
use thiserror::Error;

pub mod config;
pub mod ops;
pub mod parser;
pub mod program;
pub mod search;
pub mod vm;

/// Either stage of [`evaluate`] failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] parser::LoadError),
    #[error(transparent)]
    Run(#[from] vm::RunError),
}

/// Loads `lines` and runs the program with default options, returning
/// everything it wrote.
pub fn evaluate<L, S>(lines: L, input: Vec<String>) -> Result<Vec<String>, Error>
where
    L: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let program = parser::parse_program(lines)?;
    let mut output = Vec::new();
    vm::run(&program, input.into_iter(), &mut output, &vm::VMOptions::default())?;
    Ok(output)
}
