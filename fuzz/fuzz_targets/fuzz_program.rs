#![no_main]

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use robot::ops::Op;
use robot_fuzz::{verify_program, ArbitraryOp, SmallString};

#[derive(Arbitrary)]
struct FuzzInput {
    program: Vec<ArbitraryOp>,
    input: Vec<SmallString>,
}

impl std::fmt::Debug for FuzzInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "FuzzInput {{")?;
        writeln!(f, "    program: {:?},", self.program)?;
        writeln!(f, "    input: {:?},", self.input)?;
        write!(f, "}}")?;
        writeln!(f, "Reproduce with:")?;
        writeln!(f, "#[test]")?;
        writeln!(f, "fn fuzz_repro() {{")?;
        writeln!(f, "    let ops = vec![")?;
        for op in &self.program {
            writeln!(f, "        {:?},", op.0)?;
        }
        writeln!(f, "    ];")?;
        writeln!(f, "    verify_program(ops, strings(&{:?}));", self.input.iter().map(|s| s.0.as_str()).collect::<Vec<_>>())?;
        writeln!(f, "}}")?;
        Ok(())
    }
}

fuzz_target!(|data: FuzzInput| {
    let FuzzInput { program, input } = data;
    let ops: Vec<Op> = program.into_iter().map(|op| op.0).collect();

    if ops.is_empty() { return } // uninteresting edge case

    verify_program(ops, input.into_iter().map(|s| s.0).collect());
});
