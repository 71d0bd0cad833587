use super::command::Instruction;
use crate::definitions::Address;
use crate::parse::LabelTable;
use std::collections::BTreeMap;

/// An assembled program: the decoded instructions by address and the labels that were defined
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: BTreeMap<Address, Instruction>,
    labels: LabelTable,
}

impl Program {
    pub fn new(instructions: BTreeMap<Address, Instruction>, labels: LabelTable) -> Self {
        Self {
            instructions,
            labels,
        }
    }

    pub fn get(&self, address: Address) -> Option<&Instruction> {
        self.instructions.get(&address)
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn label(&self, label: &str) -> Option<Address> {
        self.labels.lookup(label)
    }

    /// the instructions in address order
    pub fn iter(&self) -> impl Iterator<Item = (Address, &Instruction)> {
        self.instructions.iter().map(|(a, i)| (*a, i))
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
