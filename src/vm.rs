//! Functions for executing Robot programs.
use std::io;

use log::{debug, trace};
use rustc_hash::FxHashMap as HashMap;
use thiserror::Error;

use crate::{config::RobotConfig, ops::Op, program::Program, search::SearchAlgorithm};


/// The source of values for `READ`. Values are pulled one at a time and
/// never re-read.
pub trait Input {
    /// The next value, or `None` once the input is exhausted.
    fn read(&mut self) -> Result<Option<String>, OperationError>;
}

impl<I: Iterator<Item = String>> Input for I {
    #[inline]
    fn read(&mut self) -> Result<Option<String>, OperationError> {
        Ok(self.next())
    }
}

/// Reads every value as one line from an [`io::BufRead`].
#[derive(Debug)]
pub struct LineInput<B: io::BufRead>(pub io::Lines<B>);

impl<B: io::BufRead> LineInput<B> {
    pub fn new(reader: B) -> Self {
        Self(reader.lines())
    }
}

impl<B: io::BufRead> Input for LineInput<B> {
    fn read(&mut self) -> Result<Option<String>, OperationError> {
        self.0.next().transpose().map_err(|err| OperationError::InputFailed { message: err.to_string() })
    }
}

/// The sink for `WRITE`.
pub trait Output {
    fn write(&mut self, value: &str) -> Result<(), OperationError>;
}

impl Output for Vec<String> {
    #[inline]
    fn write(&mut self, value: &str) -> Result<(), OperationError> {
        self.push(value.to_string());
        Ok(())
    }
}

/// Writes every value as one line to an [`io::Write`].
#[derive(Debug)]
pub struct WriteOutput<W: io::Write>(pub W);

impl<W: io::Write> Output for WriteOutput<W> {
    fn write(&mut self, value: &str) -> Result<(), OperationError> {
        writeln!(self.0, "{value}").map_err(|err| OperationError::OutputFailed { message: err.to_string() })
    }
}

/// An implementation of [`Tracer`] that does not track anything.
///
/// This is the best choice if you do not need to track anything while the
/// program is executed.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoStats {}

impl Tracer for NoStats {
    #[inline(always)]
    fn push(&mut self, _: &str) {}
    #[inline(always)]
    fn pop(&mut self) {}
    #[inline(always)]
    fn instruction(&mut self, _ip: usize, _op: &Op, _: &Result<Effect, OperationError>) {}
}

/// A trait for observing the VM while it runs.
///
/// You can implement this trait to track any statistics you need.
pub trait Tracer {
    fn push(&mut self, value: &str);
    fn pop(&mut self);
    fn instruction(&mut self, ip: usize, op: &Op, result: &Result<Effect, OperationError>);
}

/// Counts executed instructions and stack traffic.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Executed instructions by command keyword, failed ones included.
    pub instructions: HashMap<&'static str, u64>,
    pub pushes: u64,
    pub pops: u64,
    /// The largest number of elements the stack held at once.
    pub max_depth: usize,
    pub jumps_taken: u64,
    depth: usize,
}

impl Tracer for Stats {
    fn push(&mut self, _: &str) {
        self.pushes += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop(&mut self) {
        self.pops += 1;
        self.depth = self.depth.saturating_sub(1);
    }

    fn instruction(&mut self, _ip: usize, op: &Op, result: &Result<Effect, OperationError>) {
        *self.instructions.entry(op.keyword()).or_default() += 1;
        if let Ok(Effect::SetInstructionPointer(_)) = result {
            self.jumps_taken += 1;
        }
    }
}

/// An error that can occur during the execution of a single instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationError {
    #[error("Stack underflow: no element at position {depth} below the head (stack has {stack_len} elements)")]
    StackUnderflow { depth: usize, stack_len: usize },
    #[error("Input exhausted, there is nothing left to read")]
    InputExhausted,
    #[error("Reading input failed: {message}")]
    InputFailed { message: String },
    #[error("Undefined label `{label}`")]
    UndefinedLabel { label: String },
    #[error("Adding to a full stack")]
    PushFailed,
    #[error("Value used as instruction index is too large: {index}")]
    InstructionOutOfRange { index: usize },
    #[error("Writing output failed: {message}")]
    OutputFailed { message: String },
}

/// How an instruction moves the instruction pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Continue with the next instruction.
    None,
    SetInstructionPointer(usize),
}

/// Options for the Robot virtual machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VMOptions {
    /// The maximum size of the stack.
    max_stack_size: usize,
    /// The maximum number of instructions to run, if this is reached,
    /// the program will stop with an error.
    ///
    /// Set to [`u64::MAX`] to disable this limit.
    max_op_count: u64,
    /// The search engine used by [`Op::ReplaceOne`].
    search: SearchAlgorithm,
}

impl VMOptions {
    pub fn new(max_stack_size: usize, max_op_count: u64, search: SearchAlgorithm) -> Self {
        Self { max_stack_size, max_op_count, search }
    }

    pub fn from_config(config: &RobotConfig) -> Self {
        Self::new(config.max_stack_size, config.max_op_count, config.search)
    }

    pub fn with_max_stack_size(self, max_stack_size: usize) -> Self {
        Self { max_stack_size, ..self }
    }

    pub fn with_max_op_count(self, max_op_count: u64) -> Self {
        Self { max_op_count, ..self }
    }

    pub fn with_search(self, search: SearchAlgorithm) -> Self {
        Self { search, ..self }
    }

    pub fn search(&self) -> SearchAlgorithm {
        self.search
    }
}

impl Default for VMOptions {
    fn default() -> Self {
        Self { max_stack_size: usize::MAX, max_op_count: u64::MAX, search: SearchAlgorithm::default() }
    }
}

/// An error that happened while running a Robot program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    /// A specific instruction failed.
    #[error("Instruction {index} ({instruction}) failed (instruction counter {instruction_counter}): {error}")]
    InstructionFailed {
        /// The instruction which failed
        instruction: Op,
        /// The 0-based index of this instruction in the program.
        index: usize,
        /// The number of instructions which have been run before this one.
        /// Differs from index once jumps have been taken.
        instruction_counter: u64,
        /// The specific error within the instruction.
        error: OperationError,
    },
    /// The program executed more instructions than the limit specified within [`VMOptions`].
    #[error("The program ran for too long ({instruction_counter} instructions had been run).")]
    RunTooLong {
        /// The number of instructions which have been run
        instruction_counter: u64,
    },
}

impl RunError {
    /// The instruction-level error, if a specific instruction failed.
    pub fn operation_error(&self) -> Option<&OperationError> {
        match self {
            RunError::InstructionFailed { error, .. } => Some(error),
            RunError::RunTooLong { .. } => None,
        }
    }
}

/// The successful result of running a Robot program.
#[derive(Debug, Clone)]
pub struct RunResult<T: Tracer> {
    /// The stack after the program has finished, head last.
    pub stack: Vec<String>,
    /// The number of instructions which have been run.
    pub instruction_counter: u64,
    /// The instruction pointer at the end of the program.
    pub instruction_pointer: usize,
    pub tracer: T,
}

/// The internal state of the VM.
struct State<'a, I: Input, O: Output, T: Tracer> {
    stack: Vec<String>,
    ip: usize,
    instructions_run: u64,
    program: &'a Program,
    input: I,
    output: &'a mut O,
    tracer: T,
    max_stack_size: usize,
    search: SearchAlgorithm,
}

fn peek(stack: &[String], depth: usize) -> Result<&String, OperationError> {
    stack
        .len()
        .checked_sub(depth)
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| stack.get(index))
        .ok_or(OperationError::StackUnderflow { depth, stack_len: stack.len() })
}

impl<'a, I: Input, O: Output, T: Tracer> State<'a, I, O, T> {
    fn pop(&mut self) -> Result<String, OperationError> {
        let value = self.stack.pop().ok_or(OperationError::StackUnderflow { depth: 0, stack_len: 0 })?;
        self.tracer.pop();
        Ok(value)
    }

    fn push(&mut self, value: String) -> Result<(), OperationError> {
        if self.stack.len() >= self.max_stack_size {
            return Err(OperationError::PushFailed);
        }

        self.tracer.push(&value);
        self.stack.push(value);
        Ok(())
    }

    fn jump_to(&self, label: &str) -> Result<Effect, OperationError> {
        self.program
            .label(label)
            .map(Effect::SetInstructionPointer)
            .ok_or_else(|| OperationError::UndefinedLabel { label: label.to_string() })
    }

    fn apply(&mut self, op: &Op) -> Result<Effect, OperationError> {
        match op {
            Op::Push(value) => self.push(value.clone())?,
            Op::Pop => {
                self.pop()?;
            }
            Op::Write => {
                let head = peek(&self.stack, 0)?;
                self.output.write(head)?;
            }
            Op::Read => {
                let value = self.input.read()?.ok_or(OperationError::InputExhausted)?;
                self.push(value)?;
            }
            Op::Swap(a, b) => {
                let len = self.stack.len();
                let deepest = (*a).max(*b);
                if deepest >= len {
                    return Err(OperationError::StackUnderflow { depth: deepest, stack_len: len });
                }
                self.stack.swap(len - 1 - a, len - 1 - b);
            }
            Op::Copy(n) => {
                let value = peek(&self.stack, *n)?.clone();
                self.push(value)?;
            }
            Op::Nop => {}
            Op::Jump(target) => return Ok(Effect::SetInstructionPointer(*target)),
            Op::JumpDynamic => {
                let label = self.pop()?;
                return self.jump_to(&label);
            }
            Op::Concat => {
                // The head goes first; its buffer is reused for the result.
                let mut head = self.pop()?;
                let below = self.pop()?;
                head.push_str(&below);
                self.push(head)?;
            }
            Op::ReplaceOne => {
                let mut text = self.pop()?;
                let pattern = self.pop()?;
                let replacement = self.pop()?;
                let fail_label = self.pop()?;

                match self.search.find(&text, &pattern) {
                    Some(start) => {
                        text.replace_range(start..start + pattern.len(), &replacement);
                        self.push(text)?;
                    }
                    // The popped operands stay consumed.
                    None => return self.jump_to(&fail_label),
                }
            }
        }

        Ok(Effect::None)
    }
}

/// Run a Robot program, reading `READ` values from `input` and sending
/// `WRITE` values to `output`.
///
/// When the run fails, `output` keeps everything written before the failing
/// instruction.
///
/// # Example
/// ```
/// use robot::parser::parse_source;
/// use robot::vm::{run, VMOptions};
///
/// let program = parse_source("READ\nPUSH 'Hello, '\nCONCAT\nWRITE").unwrap();
/// let mut output: Vec<String> = Vec::new();
/// let result = run(&program, vec!["World".to_string()].into_iter(), &mut output, &VMOptions::default());
/// assert!(result.is_ok());
/// assert_eq!(output, vec!["Hello, World".to_string()]);
/// ```
pub fn run<I: Input, O: Output>(
    program: &Program,
    input: I,
    output: &mut O,
    options: &VMOptions,
) -> Result<RunResult<NoStats>, RunError> {
    run_with_stats(program, input, output, options, NoStats::default())
}

/// Run a Robot program and collect statistics with `tracer`.
/// If you do not need statistics, use the [`run`] function instead.
pub fn run_with_stats<I: Input, O: Output, T: Tracer>(
    program: &Program,
    input: I,
    output: &mut O,
    options: &VMOptions,
    tracer: T,
) -> Result<RunResult<T>, RunError> {
    let mut s = State {
        stack: Vec::new(),
        ip: 0,
        instructions_run: 0,
        program,
        input,
        output,
        tracer,
        max_stack_size: options.max_stack_size,
        search: options.search,
    };
    run_state(&mut s, options)?;
    debug!("Program finished after {} instructions, {} values left on the stack", s.instructions_run, s.stack.len());
    Ok(RunResult {
        stack: s.stack,
        instruction_counter: s.instructions_run,
        instruction_pointer: s.ip,
        tracer: s.tracer,
    })
}

#[inline]
fn run_state<I: Input, O: Output, T: Tracer>(
    s: &mut State<'_, I, O, T>,
    options: &VMOptions,
) -> Result<(), RunError> {
    let program = s.program;
    while let Some(op) = program.get(s.ip) {
        if s.instructions_run >= options.max_op_count {
            return Err(RunError::RunTooLong { instruction_counter: s.instructions_run });
        }

        let ip = s.ip;
        let instruction_counter = s.instructions_run;
        let build_err = |error| RunError::InstructionFailed {
            instruction: op.clone(),
            index: ip,
            instruction_counter,
            error,
        };

        trace!("{ip}: {op} (stack {}, head {:?})", s.stack.len(), s.stack.last());
        let result = s.apply(op);
        s.tracer.instruction(ip, op, &result);

        match result {
            Err(error) => return Err(build_err(error)),
            Ok(Effect::None) => s.ip += 1,
            Ok(Effect::SetInstructionPointer(new_ip)) => {
                if new_ip > program.len() {
                    return Err(build_err(OperationError::InstructionOutOfRange { index: new_ip }));
                }
                trace!("Branching {ip}->{new_ip} {:?}", program.get(new_ip));
                s.ip = new_ip;
            }
        }

        s.instructions_run += 1;
    }

    Ok(())
}
