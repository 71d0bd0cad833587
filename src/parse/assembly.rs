use super::error::{AssemblyError, AssemblyResult, ParseError, ParseResult};
use super::lexer::lex_line;
use super::line::{parse_line, Line};
use super::symbols::LabelTable;
use crate::definitions::Address;
use crate::simulators::cpu::command::{Instruction, Offset};
use crate::simulators::cpu::program::Program;
use std::collections::BTreeMap;

use log::debug;

pub struct SourceFile<'src> {
    source: &'src str,
}

impl<'src> SourceFile<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source }
    }

    fn lines(&self) -> impl Iterator<Item = (usize, &'src str)> {
        self.source.lines().enumerate()
    }
}

/// The address for whatever starts at `next`, if that is still inside the address space
fn placement(next: u64) -> ParseResult<Address> {
    Address::try_from(next).map_err(|_| ParseError::ProgramTooLarge)
}

pub struct AssemblyParser<'src> {
    source: SourceFile<'src>,
    labels: LabelTable,
    instructions: BTreeMap<Address, Instruction>,
}

impl<'src> AssemblyParser<'src> {
    pub fn new(source: SourceFile<'src>) -> Self {
        Self {
            source,
            labels: LabelTable::default(),
            instructions: BTreeMap::new(),
        }
    }

    /// First pass: give every instruction its address and remember where the labels point
    fn layout(&mut self) -> AssemblyResult<()> {
        // one past the last byte, so a program may end exactly at the top of the address space
        let mut next: u64 = 0;

        for (line_idx, text) in self.source.lines() {
            let at_line = |e: ParseError| AssemblyError::new(line_idx, e);

            let tokens = lex_line(text).map_err(at_line)?;
            let Line { label, operation } = parse_line(&tokens).map_err(at_line)?;

            if let Some(label) = label {
                let address = placement(next).map_err(at_line)?;
                self.labels.define(label, address).map_err(at_line)?;
            }

            if let Some(operation) = operation {
                let address = placement(next).map_err(at_line)?;
                next += u64::from(operation.size());
                self.instructions
                    .insert(address, Instruction::new(operation, line_idx));
            }
        }

        Ok(())
    }

    /// Second pass: replace label references inside of addresses with the label's address
    fn resolve_labels(&mut self) -> AssemblyResult<()> {
        for instruction in self.instructions.values_mut() {
            let Some(address) = instruction.operation.address_mut() else {
                continue;
            };

            if let Some(Offset::Label(label)) = &address.offset {
                let resolved = self.labels.lookup(label).ok_or_else(|| {
                    AssemblyError::new(
                        instruction.line_idx,
                        ParseError::UndefinedLabel(label.clone()),
                    )
                })?;
                address.offset = Some(Offset::Value(resolved));
            }
        }

        Ok(())
    }

    pub fn parse(mut self) -> AssemblyResult<Program> {
        self.layout()?;
        self.resolve_labels()?;

        debug!(
            "assembled {} instructions with {} labels",
            self.instructions.len(),
            self.labels.len()
        );
        Ok(Program::new(self.instructions, self.labels))
    }
}

/// Assemble a whole program, failing at the first error
pub fn assemble(source: &str) -> AssemblyResult<Program> {
    AssemblyParser::new(SourceFile::new(source)).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulators::cpu::command::{AddressExpr, Operation, Register};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const COUNTDOWN: &str = "loop: copy r0, 5\n zjump r0, [end]\n add r0, r0, -1\n jump [loop]\n end: return";

    fn label_addr(address: Address) -> AddressExpr {
        AddressExpr {
            base: None,
            index: None,
            offset: Some(Offset::Value(address)),
        }
    }

    #[test]
    fn test_addresses_accumulate_sizes() {
        let program = assemble(COUNTDOWN).unwrap();
        let layout: Vec<(Address, usize)> = program.iter().map(|(a, i)| (a, i.line_idx)).collect();
        assert_eq!(vec![(0, 0), (6, 1), (14, 2), (21, 3), (28, 4)], layout);
        assert_eq!(Some(0), program.label("loop"));
        assert_eq!(Some(28), program.label("end"));
    }

    #[test]
    fn test_labels_are_resolved_in_addresses() {
        let program = assemble(COUNTDOWN).unwrap();
        assert_eq!(
            Some(&Operation::Zjump(Register::R0, label_addr(28))),
            program.get(6).map(|i| &i.operation)
        );
        assert_eq!(
            Some(&Operation::Jump(label_addr(0))),
            program.get(21).map(|i| &i.operation)
        );
    }

    #[test]
    fn test_forward_and_backward_references() {
        let src = "jump [later r1]\nearlier: return\nlater: call [earlier]";
        let program = assemble(src).unwrap();
        assert_eq!(
            Some(&Operation::Jump(AddressExpr {
                base: Some(Register::R1),
                index: None,
                offset: Some(Offset::Value(8)),
            })),
            program.get(0).map(|i| &i.operation)
        );
        assert_eq!(
            Some(&Operation::Call(label_addr(7))),
            program.get(8).map(|i| &i.operation)
        );
    }

    #[test]
    fn test_several_labels_on_one_address() {
        let program = assemble("a:\nb:\n\n# comment\nc: return").unwrap();
        assert_eq!(Some(0), program.label("a"));
        assert_eq!(Some(0), program.label("b"));
        assert_eq!(Some(0), program.label("c"));
        assert_eq!(1, program.len());
    }

    #[test]
    fn test_duplicate_label() {
        let src = "start: copy r0, 1\nstart: copy r0, 2";
        assert_eq!(
            Err(AssemblyError::new(
                1,
                ParseError::LabelRedefined("start".to_owned())
            )),
            assemble(src)
        );
    }

    #[test]
    fn test_undefined_label() {
        let src = "copy r0, 1\n\njump [nowhere]";
        assert_eq!(
            Err(AssemblyError::new(
                2,
                ParseError::UndefinedLabel("nowhere".to_owned())
            )),
            assemble(src)
        );
    }

    #[test]
    fn test_first_error_wins() {
        let src = "copy r0, 1\ncopy r0, $\njump [nowhere]";
        let error = assemble(src).unwrap_err();
        assert_eq!(1, error.line_idx);
        assert_eq!(
            ParseError::UnexpectedCharacter {
                character: '$',
                column: 9
            },
            error.error
        );
        assert_eq!("Line 2: Invalid character '$' in column 10", error.to_string());
    }

    #[test]
    fn test_empty_source() {
        let program = assemble("").unwrap();
        assert!(program.is_empty());
        assert!(program.labels().is_empty());
    }

    #[test]
    fn test_placement_up_to_the_top_of_the_address_space() {
        assert_eq!(Ok(0), placement(0));
        assert_eq!(Ok(0xFFFF_FFFF), placement(0xFFFF_FFFF));
        // an instruction ending at 2^32 fits, but nothing can follow it
        assert_eq!(Err(ParseError::ProgramTooLarge), placement(0x1_0000_0000));
    }

    #[test]
    fn test_windows_line_endings() {
        let program = assemble("copy r0, 1\r\nreturn\r\n").unwrap();
        assert_eq!(2, program.len());
        assert!(program.get(6).is_some());
    }

    const TEMPLATES: [&str; 10] = [
        "copy r0, 5",
        "loop: add r1, r1, -1",
        "zjump r1, [loop]",
        "sw [r2 0x4000_0000], r1",
        "# comment",
        "",
        "call [loop r3]",
        "return",
        "end:",
        "lshift r4, r4, 3",
    ];

    /// Joins the picked templates, numbering the label definitions so that each is only
    /// defined once. References all go to `base_loop`, which is always defined
    fn numbered_source(picks: &[usize]) -> String {
        let body = picks
            .iter()
            .map(|&i| TEMPLATES[i])
            .enumerate()
            .map(|(n, line)| {
                if line.starts_with("loop:") || line.starts_with("end:") {
                    format!("l{}_{}", n, line)
                } else {
                    line.replace("loop", "base_loop")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("base_loop: return\n{}", body)
    }

    #[test]
    fn test_numbered_labels_do_not_collide_with_the_base_label() {
        let source = numbered_source(&[1, 1, 8, 2]);
        let program = assemble(&source).unwrap();
        assert_eq!(Some(0), program.label("base_loop"));
        assert_eq!(Some(1), program.label("l0_loop"));
        assert_eq!(Some(8), program.label("l1_loop"));
        assert_eq!(Some(15), program.label("l2_end"));
    }

    proptest! {
        #[test]
        fn assembling_is_deterministic(picks in proptest::collection::vec(0..TEMPLATES.len(), 0..40)) {
            let source = numbered_source(&picks);
            let first = assemble(&source);
            let second = assemble(&source);
            prop_assert!(first.is_ok());
            prop_assert_eq!(first, second);
        }
    }
}
