//! Loaded Robot programs.
use std::fmt;

use rustc_hash::FxHashMap as HashMap;

use crate::ops::Op;

/// Label names and the instruction indices they resolve to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name` at `index`.
    ///
    /// A name can only be recorded once; on a duplicate the table is left
    /// untouched and the index the name already points to is returned.
    pub fn insert(&mut self, name: &str, index: usize) -> Result<(), usize> {
        if let Some(&existing) = self.labels.get(name) {
            return Err(existing);
        }
        self.labels.insert(name.to_string(), index);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(name, &index)| (name.as_str(), index))
    }

    fn names_by_index(&self) -> HashMap<usize, &str> {
        self.iter().map(|(name, index)| (index, name)).collect()
    }
}

/// A fully resolved program: the instruction sequence and its label table.
///
/// Built by [`parse_program`](crate::parser::parse_program) and never
/// modified afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op>,
    labels: LabelTable,
}

impl Program {
    pub fn new(ops: Vec<Op>, labels: LabelTable) -> Self {
        Self { ops, labels }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Op> {
        self.ops.get(index)
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name)
    }
}

/// Prints the program in source form, one instruction per line.
///
/// Jumps are printed against the label at their target when there is one.
/// Programs built by the parser load back unchanged; a hand-built program may
/// contain a `Nop` without a label or a jump to an unlabeled index, which print
/// as `LABEL` and `JMP #index` and do not load again.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.labels.names_by_index();
        for (index, op) in self.ops.iter().enumerate() {
            match op {
                Op::Nop => match names.get(&index) {
                    Some(name) => write!(f, "LABEL {name}")?,
                    None => f.write_str("LABEL")?,
                },
                Op::Jump(target) => match names.get(target) {
                    Some(name) => write!(f, "JMP {name}")?,
                    None => write!(f, "{op}")?,
                },
                op => write!(f, "{op}")?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
