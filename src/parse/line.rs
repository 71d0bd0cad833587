use super::error::{ParseError, ParseResult};
use super::lexer::Token;
use super::Spanned;
use crate::simulators::cpu::command::{AddressExpr, Offset, Opcode, Operand, Operation, Register};
use crate::simulators::cpu::isa;

/// The result of parsing one source line. Both parts are optional
#[derive(Debug, PartialEq, Eq)]
pub struct Line<'src> {
    pub label: Option<&'src str>,
    pub operation: Option<Operation>,
}

type Tokens<'t, 'src> = std::slice::Iter<'t, Spanned<Token<'src>>>;

fn content<'src>(token: Option<&Spanned<Token<'src>>>) -> Option<Token<'src>> {
    token.map(|t| t.content)
}

/// `[space] [label ':'] [space] [mnemonic operands]`
pub fn parse_line<'src>(tokens: &[Spanned<Token<'src>>]) -> ParseResult<Line<'src>> {
    let mut idx = 0;
    if let Some(Token::Space) = content(tokens.get(idx)) {
        idx += 1;
    }

    let mut label = None;
    if let (Some(Token::Identifier(name)), Some(Token::Colon)) =
        (content(tokens.get(idx)), content(tokens.get(idx + 1)))
    {
        label = Some(name);
        idx += 2;
    }

    if let Some(Token::Space) = content(tokens.get(idx)) {
        idx += 1;
    }

    let mnemonic = match content(tokens.get(idx)) {
        None => {
            return Ok(Line {
                label,
                operation: None,
            })
        }
        Some(Token::Identifier(mnemonic)) => mnemonic,
        Some(_) => return Err(ParseError::ExpectedMnemonic),
    };

    let operands = parse_operands(&tokens[idx + 1..])?;
    let operation = resolve(mnemonic, operands)?;

    Ok(Line {
        label,
        operation: Some(operation),
    })
}

fn register_operand(name: &str) -> ParseResult<Operand> {
    if name == "pc" {
        return Err(ParseError::ProgramCounterOperand);
    }
    Register::try_from(name)
        .map(Operand::Register)
        .map_err(|_| ParseError::BareLabelOperand(name.to_owned()))
}

/// Comma separated operands without leading, trailing or doubled commas
pub fn parse_operands(tokens: &[Spanned<Token<'_>>]) -> ParseResult<Vec<Operand>> {
    let mut operands = Vec::with_capacity(3);
    // only accept commas after operands
    let mut comma_expected = false;
    // after a comma, another operand has to follow
    let mut operand_expected = false;

    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        let operand = match token.content {
            Token::Space => continue,
            Token::Comma => {
                if !comma_expected {
                    return Err(ParseError::UnexpectedComma);
                }
                comma_expected = false;
                operand_expected = true;
                continue;
            }
            _ if comma_expected => return Err(ParseError::MissingComma),
            Token::Number(value) => Operand::Immediate(value),
            Token::Identifier(name) => register_operand(name)?,
            Token::SquareLeft => Operand::Address(parse_address(&mut iter)?),
            Token::SquareRight | Token::Colon => return Err(ParseError::UnexpectedToken),
        };

        operands.push(operand);
        comma_expected = true;
        operand_expected = false;
    }

    if operand_expected {
        return Err(ParseError::MissingOperandAfterComma);
    }
    Ok(operands)
}

/// Parses the inside of `[...]`, the opening bracket is already consumed
fn parse_address(tokens: &mut Tokens<'_, '_>) -> ParseResult<AddressExpr> {
    let mut address = AddressExpr::default();
    let mut offsets = 0;
    let mut registers = 0;
    let mut closed = false;

    for token in tokens.by_ref() {
        match token.content {
            Token::Space => {}
            Token::Number(value) => {
                address.offset = Some(Offset::Value(value));
                offsets += 1;
            }
            Token::Identifier("pc") => return Err(ParseError::ProgramCounterInAddress),
            Token::Identifier(name) => match Register::try_from(name) {
                Ok(reg) => {
                    if address.base.is_none() {
                        address.base = Some(reg);
                    } else {
                        address.index = Some(reg);
                    }
                    registers += 1;
                }
                // must be a label
                Err(_) => {
                    address.offset = Some(Offset::Label(name.to_owned()));
                    offsets += 1;
                }
            },
            Token::SquareRight => {
                closed = true;
                break;
            }
            _ => return Err(ParseError::UnexpectedTokenInAddress),
        }
    }

    if !closed {
        return Err(ParseError::UnterminatedAddress);
    }
    if offsets > 1 {
        return Err(ParseError::MultipleOffsets);
    }
    if registers > 2 {
        return Err(ParseError::TooManyRegisters);
    }
    if offsets + registers == 0 {
        return Err(ParseError::EmptyAddress);
    }
    Ok(address)
}

fn matches_pattern(pattern: &str, operands: &[Operand]) -> bool {
    pattern.len() == operands.len()
        && pattern
            .chars()
            .zip(operands)
            .all(|(kind, operand)| operand.kind() == kind)
}

/// Pick the first encoding of the mnemonic whose pattern fits the operands
pub fn resolve(mnemonic: &str, operands: Vec<Operand>) -> ParseResult<Operation> {
    let alternatives = isa::alternatives(mnemonic)
        .ok_or_else(|| ParseError::UnknownMnemonic(mnemonic.to_owned()))?;

    let opcode = alternatives
        .iter()
        .find(|(_, pattern)| matches_pattern(pattern, &operands))
        .map(|(opcode, _)| *opcode)
        .ok_or_else(|| ParseError::NoMatchingPattern {
            mnemonic: mnemonic.to_owned(),
            found: operands.iter().map(Operand::kind).collect(),
        })?;

    build_operation(opcode, operands)
}

/// Hands out the operands in order, checking their kinds
struct OperandList {
    mnemonic: &'static str,
    operands: std::vec::IntoIter<Operand>,
}

impl OperandList {
    fn mismatch(&self) -> ParseError {
        ParseError::NoMatchingPattern {
            mnemonic: self.mnemonic.to_owned(),
            found: self.operands.as_slice().iter().map(Operand::kind).collect(),
        }
    }

    fn reg(&mut self) -> ParseResult<Register> {
        match self.operands.next() {
            Some(Operand::Register(reg)) => Ok(reg),
            _ => Err(self.mismatch()),
        }
    }

    fn value(&mut self) -> ParseResult<u32> {
        match self.operands.next() {
            Some(Operand::Immediate(value)) => Ok(value),
            _ => Err(self.mismatch()),
        }
    }

    fn address(&mut self) -> ParseResult<AddressExpr> {
        match self.operands.next() {
            Some(Operand::Address(address)) => Ok(address),
            _ => Err(self.mismatch()),
        }
    }
}

fn build_operation(opcode: Opcode, operands: Vec<Operand>) -> ParseResult<Operation> {
    let mut ops = OperandList {
        mnemonic: opcode.mnemonic(),
        operands: operands.into_iter(),
    };

    macro_rules! rrr {
        ($variant:ident) => {
            Operation::$variant(ops.reg()?, ops.reg()?, ops.reg()?)
        };
    }

    macro_rules! rrv {
        ($variant:ident) => {
            Operation::$variant(ops.reg()?, ops.reg()?, ops.value()?)
        };
    }

    Ok(match opcode {
        Opcode::Copy => Operation::Copy(ops.reg()?, ops.reg()?),
        Opcode::CopyImm => Operation::CopyImm(ops.reg()?, ops.value()?),
        Opcode::Sb => Operation::Sb(ops.address()?, ops.reg()?),
        Opcode::Lb => Operation::Lb(ops.reg()?, ops.address()?),
        Opcode::Sw => Operation::Sw(ops.address()?, ops.reg()?),
        Opcode::Lw => Operation::Lw(ops.reg()?, ops.address()?),
        Opcode::Add => rrr!(Add),
        Opcode::AddImm => rrv!(AddImm),
        Opcode::Sub => rrr!(Sub),
        Opcode::Mul => rrr!(Mul),
        Opcode::Div => rrr!(Div),
        Opcode::Mod => rrr!(Mod),
        Opcode::Neg => Operation::Neg(ops.reg()?),
        Opcode::Flow => Operation::Flow(ops.reg()?),
        Opcode::Eq => rrr!(Eq),
        Opcode::Neq => rrr!(Neq),
        Opcode::Gt => rrr!(Gt),
        Opcode::Lt => rrr!(Lt),
        Opcode::Gte => rrr!(Gte),
        Opcode::Lte => rrr!(Lte),
        Opcode::And => rrr!(And),
        Opcode::AndImm => rrv!(AndImm),
        Opcode::Or => rrr!(Or),
        Opcode::OrImm => rrv!(OrImm),
        Opcode::Xor => rrr!(Xor),
        Opcode::XorImm => rrv!(XorImm),
        Opcode::LshiftImm => rrv!(LshiftImm),
        Opcode::Lshift => rrr!(Lshift),
        Opcode::ZrshiftImm => rrv!(ZrshiftImm),
        Opcode::Zrshift => rrr!(Zrshift),
        Opcode::RshiftImm => rrv!(RshiftImm),
        Opcode::Rshift => rrr!(Rshift),
        Opcode::Jump => Operation::Jump(ops.address()?),
        Opcode::Zjump => Operation::Zjump(ops.reg()?, ops.address()?),
        Opcode::Call => Operation::Call(ops.address()?),
        Opcode::Return => Operation::Return,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::lexer::lex_line;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> ParseResult<Line<'_>> {
        let tokens = lex_line(src)?;
        // the tokens borrow from src, not from the vec, so the line can outlive them
        parse_line(&tokens)
    }

    fn op(src: &str) -> Operation {
        parse(src).unwrap().operation.unwrap()
    }

    fn addr(base: Option<Register>, index: Option<Register>, offset: Option<Offset>) -> AddressExpr {
        AddressExpr {
            base,
            index,
            offset,
        }
    }

    #[test]
    fn test_blank_and_comment_lines() {
        for src in ["", "   ", "# just a comment", "   # indented comment"] {
            assert_eq!(
                Line {
                    label: None,
                    operation: None
                },
                parse(src).unwrap()
            );
        }
    }

    #[test]
    fn test_label_only() {
        assert_eq!(
            Line {
                label: Some("end"),
                operation: None
            },
            parse("end:").unwrap()
        );
        assert_eq!(Some("end"), parse("  end:  # trailing").unwrap().label);
    }

    #[test]
    fn test_label_and_instruction() {
        assert_eq!(
            Line {
                label: Some("loop"),
                operation: Some(Operation::CopyImm(Register::R0, 5))
            },
            parse("loop: copy r0, 5").unwrap()
        );
    }

    #[test]
    fn test_register_and_immediate_forms() {
        assert_eq!(Operation::Copy(Register::R1, Register::Sp), op("copy r1, sp"));
        assert_eq!(Operation::CopyImm(Register::R1, 0x20), op("copy r1, 0x20"));
        assert_eq!(
            Operation::Add(Register::R0, Register::R1, Register::R2),
            op("add r0, r1, r2")
        );
        assert_eq!(
            Operation::AddImm(Register::R0, Register::R0, 0xFFFF_FFFF),
            op("add r0, r0, -1")
        );
        assert_eq!(
            Operation::LshiftImm(Register::R3, Register::R3, 4),
            op("lshift r3,r3,4")
        );
    }

    #[test]
    fn test_eq_and_neq_resolve_to_comparisons() {
        assert_eq!(
            Operation::Eq(Register::R0, Register::R1, Register::R2),
            op("eq r0, r1, r2")
        );
        assert_eq!(
            Operation::Neq(Register::R0, Register::R1, Register::R2),
            op("neq r0, r1, r2")
        );
    }

    #[test]
    fn test_address_forms() {
        assert_eq!(
            Operation::Sw(addr(Some(Register::R1), None, None), Register::R1),
            op("sw [r1], r1")
        );
        assert_eq!(
            Operation::Lb(
                Register::R2,
                addr(
                    Some(Register::R1),
                    Some(Register::R3),
                    Some(Offset::Value(16))
                )
            ),
            op("lb r2, [16 r1 r3]")
        );
        assert_eq!(
            Operation::Zjump(
                Register::R0,
                addr(None, None, Some(Offset::Label("end".to_owned())))
            ),
            op("zjump r0, [end]")
        );
        assert_eq!(Operation::Return, op("return"));
    }

    #[test]
    fn test_comma_errors() {
        assert_eq!(Err(ParseError::UnexpectedComma), parse("copy , r0, r1"));
        assert_eq!(Err(ParseError::UnexpectedComma), parse("copy r0,, r1"));
        assert_eq!(Err(ParseError::MissingOperandAfterComma), parse("copy r0, r1,"));
        assert_eq!(Err(ParseError::MissingComma), parse("copy r0 r1"));
        assert_eq!(Err(ParseError::MissingComma), parse("copy r0, 5 6"));
    }

    #[test]
    fn test_address_errors() {
        assert_eq!(Err(ParseError::UnterminatedAddress), parse("jump [r1"));
        assert_eq!(Err(ParseError::MultipleOffsets), parse("jump [1 2]"));
        assert_eq!(Err(ParseError::MultipleOffsets), parse("jump [here 2]"));
        assert_eq!(Err(ParseError::TooManyRegisters), parse("jump [r1 r2 r3]"));
        assert_eq!(Err(ParseError::EmptyAddress), parse("jump []"));
        assert_eq!(Err(ParseError::ProgramCounterInAddress), parse("jump [pc]"));
        assert_eq!(
            Err(ParseError::UnexpectedTokenInAddress),
            parse("jump [r1, r2]")
        );
    }

    #[test]
    fn test_operand_errors() {
        assert_eq!(Err(ParseError::ProgramCounterOperand), parse("copy r0, pc"));
        assert_eq!(
            Err(ParseError::BareLabelOperand("start".to_owned())),
            parse("copy r0, start")
        );
        assert_eq!(Err(ParseError::ExpectedMnemonic), parse("5"));
        assert_eq!(Err(ParseError::ExpectedMnemonic), parse("loop: [r1]"));
    }

    #[test]
    fn test_resolution_errors() {
        assert_eq!(
            Err(ParseError::UnknownMnemonic("mov".to_owned())),
            parse("mov r0, r1")
        );
        assert_eq!(
            Err(ParseError::NoMatchingPattern {
                mnemonic: "sub".to_owned(),
                found: "rrv".to_owned()
            }),
            parse("sub r0, r1, 1")
        );
        assert_eq!(
            Err(ParseError::NoMatchingPattern {
                mnemonic: "return".to_owned(),
                found: "r".to_owned()
            }),
            parse("return r0")
        );
    }

    #[test]
    fn test_add_register_identities_survive_a_round_trip() {
        let add = op("add r3, r1, r7");
        assert_eq!(Operation::Add(Register::R3, Register::R1, Register::R7), add);
        // the disassembly parses back into the same operation
        assert_eq!(add, op(&add.to_string()));
    }

    #[test]
    fn test_disassembly_round_trips() {
        for src in [
            "copy r0, 4294967295",
            "sb [r1 r2 0x40000000], r3",
            "lw sp, [sp]",
            "zjump r5, [0x1C]",
            "rshift r1, r2, r3",
            "flow r4",
            "call [r6]",
        ] {
            let operation = op(src);
            assert_eq!(operation, op(&operation.to_string()));
        }
    }
}
