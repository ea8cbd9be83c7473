use arbitrary::Arbitrary;
use robot::{
    ops::Op,
    program::{LabelTable, Program},
    search::{naive, SearchAlgorithm},
    vm::{self, VMOptions},
};

/// Small alphabet so that patterns actually occur in the texts.
const ALPHABET: &[char] = &['a', 'b', 'c', 'ž'];

pub const LABELS: &[&str] = &["l0", "l1", "l2"];

#[derive(Clone, PartialEq, Eq)]
pub struct SmallString(pub String);

impl<'a> Arbitrary<'a> for SmallString {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let len = u.int_in_range(0..=12)?;
        let mut s = String::new();
        for _ in 0..len {
            s.push(*u.choose(ALPHABET)?);
        }
        Ok(SmallString(s))
    }
}

impl std::fmt::Debug for SmallString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { std::fmt::Debug::fmt(&self.0, f) }
}

/// Every search engine must agree with naive search.
pub fn verify_search(text: &str, pattern: &str) {
    let expected = naive(text.as_bytes(), pattern.as_bytes());
    for algorithm in SearchAlgorithm::ALL {
        assert_eq!(algorithm.find(text, pattern), expected, "{algorithm} text: {text:?} pattern: {pattern:?}");
    }
}

pub struct ArbitraryOp(pub Op);

impl<'a> Arbitrary<'a> for ArbitraryOp {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let op = match u.int_in_range(0..=10)? {
            0 => Op::Push(SmallString::arbitrary(u)?.0),
            1 => Op::Push(u.choose(LABELS)?.to_string()),
            2 => Op::Pop,
            3 => Op::Write,
            4 => Op::Read,
            5 => Op::Swap(u.int_in_range(0..=4)?, u.int_in_range(0..=4)?),
            6 => Op::Copy(u.int_in_range(0..=4)?),
            7 => Op::Jump(u.choose_index(LABELS.len())?),
            8 => Op::JumpDynamic,
            9 => Op::Concat,
            _ => Op::ReplaceOne,
        };
        Ok(ArbitraryOp(op))
    }
}

impl std::fmt::Debug for ArbitraryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { std::fmt::Debug::fmt(&self.0, f) }
}

/// Puts the labels in front of the program so that every jump target exists.
pub fn build_program(ops: Vec<Op>) -> Program {
    let mut labels = LabelTable::new();
    let mut all_ops = Vec::with_capacity(ops.len() + LABELS.len());
    for (index, label) in LABELS.iter().enumerate() {
        // names are distinct
        let _ = labels.insert(label, index);
        all_ops.push(Op::Nop);
    }
    all_ops.extend(ops);
    Program::new(all_ops, labels)
}

/// Runs the program once per search engine; results and output must be identical.
/// The program text must also survive printing and parsing again.
pub fn verify_program(ops: Vec<Op>, input: Vec<String>) {
    let program = build_program(ops);
    let reparsed = robot::parser::parse_source(&program.to_string()).expect("printed program must parse");
    assert_eq!(reparsed, program);

    let mut results = Vec::new();
    for search in SearchAlgorithm::ALL {
        let options = VMOptions::default().with_search(search).with_max_op_count(10_000).with_max_stack_size(1_000);
        let mut output: Vec<String> = Vec::new();
        let result = vm::run(&program, input.iter().cloned(), &mut output, &options);
        results.push((result.map(|r| r.stack), output));
    }
    for other in &results[1..] {
        assert_eq!(&results[0], other);
    }
}
