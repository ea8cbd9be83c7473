use std::fmt;

/// A single resolved Robot instruction.
///
/// Every operand is resolved at load time, so an `Op` never refers back to
/// parser state. Label names survive only inside the program's
/// [`LabelTable`](crate::program::LabelTable).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Op {
    /// Pushes the literal onto the stack.
    Push(String),
    Pop,
    /// Emits the head of the stack without removing it.
    Write,
    /// Pushes the next value of the input source.
    Read,
    /// Exchanges two elements, given as 0-based offsets below the head.
    Swap(usize, usize),
    /// Pushes a duplicate of the element at the given 0-based offset below the head.
    Copy(usize),
    /// Label marker, does nothing when executed.
    Nop,
    /// Jump to a resolved instruction index.
    Jump(usize),
    /// Pops a label name and jumps to it.
    JumpDynamic,
    Concat,
    ReplaceOne,
}

impl Op {
    /// The command keyword this instruction is written with.
    pub fn keyword(&self) -> &'static str {
        match self {
            Op::Push(_) => "PUSH",
            Op::Pop => "POP",
            Op::Write => "WRITE",
            Op::Read => "READ",
            Op::Swap(_, _) => "SWAP",
            Op::Copy(_) => "COPY",
            Op::Nop => "LABEL",
            Op::Jump(_) | Op::JumpDynamic => "JMP",
            Op::Concat => "CONCAT",
            Op::ReplaceOne => "REPLACEONE",
        }
    }
}

/// Writes `value` as a single-quoted literal, doubling embedded quotes.
pub fn write_literal(f: &mut impl fmt::Write, value: &str) -> fmt::Result {
    f.write_char('\'')?;
    for part in value.split_inclusive('\'') {
        f.write_str(part)?;
        if part.ends_with('\'') {
            f.write_char('\'')?;
        }
    }
    f.write_char('\'')
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Push(value) => {
                f.write_str("PUSH ")?;
                write_literal(f, value)
            }
            Op::Swap(a, b) => write!(f, "SWAP {} {}", a + 1, b + 1),
            Op::Copy(n) => write!(f, "COPY {}", n + 1),
            Op::Jump(target) => write!(f, "JMP #{target}"),
            op => f.write_str(op.keyword()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Op::Push("it's".to_string()).to_string(), "PUSH 'it''s'");
        assert_eq!(Op::Push(String::new()).to_string(), "PUSH ''");
        assert_eq!(Op::Swap(0, 2).to_string(), "SWAP 1 3");
        assert_eq!(Op::Copy(4).to_string(), "COPY 5");
        assert_eq!(Op::Jump(7).to_string(), "JMP #7");
        assert_eq!(Op::JumpDynamic.to_string(), "JMP");
        assert_eq!(Op::ReplaceOne.to_string(), "REPLACEONE");
    }
}
