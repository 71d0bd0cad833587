use super::command::Opcode;
use std::collections::HashMap;

use lazy_static::lazy_static;

/// one way to encode a mnemonic: the opcode and the operand kinds it expects
/// ('r' register, 'v' immediate value, 'a' address)
pub type Alternative = (Opcode, &'static str);

lazy_static! {
    static ref MNEMONICS: HashMap<&'static str, Vec<Alternative>> = {
        use Opcode::*;
        let mut map = HashMap::new();
        map.insert("copy", vec![(Copy, "rr"), (CopyImm, "rv")]);
        map.insert("sb", vec![(Sb, "ar")]);
        map.insert("lb", vec![(Lb, "ra")]);
        map.insert("sw", vec![(Sw, "ar")]);
        map.insert("lw", vec![(Lw, "ra")]);

        map.insert("add", vec![(Add, "rrr"), (AddImm, "rrv")]);
        map.insert("sub", vec![(Sub, "rrr")]);
        map.insert("mul", vec![(Mul, "rrr")]);
        map.insert("div", vec![(Div, "rrr")]);
        map.insert("mod", vec![(Mod, "rrr")]);
        map.insert("neg", vec![(Neg, "r")]);
        map.insert("flow", vec![(Flow, "r")]);

        map.insert("eq", vec![(Eq, "rrr")]);
        map.insert("neq", vec![(Neq, "rrr")]);
        map.insert("gt", vec![(Gt, "rrr")]);
        map.insert("lt", vec![(Lt, "rrr")]);
        map.insert("gte", vec![(Gte, "rrr")]);
        map.insert("lte", vec![(Lte, "rrr")]);

        map.insert("and", vec![(And, "rrr"), (AndImm, "rrv")]);
        map.insert("or", vec![(Or, "rrr"), (OrImm, "rrv")]);
        map.insert("xor", vec![(Xor, "rrr"), (XorImm, "rrv")]);

        map.insert("lshift", vec![(Lshift, "rrr"), (LshiftImm, "rrv")]);
        map.insert("zrshift", vec![(Zrshift, "rrr"), (ZrshiftImm, "rrv")]);
        map.insert("rshift", vec![(Rshift, "rrr"), (RshiftImm, "rrv")]);

        map.insert("jump", vec![(Jump, "a")]);
        map.insert("zjump", vec![(Zjump, "ra")]);
        map.insert("call", vec![(Call, "a")]);
        map.insert("return", vec![(Return, "")]);
        map
    };
}

/// All encodings of a mnemonic in the order they should be tried
pub fn alternatives(mnemonic: &str) -> Option<&'static [Alternative]> {
    MNEMONICS.get(mnemonic).map(Vec::as_slice)
}

impl Opcode {
    /// the numeric tag of the encoding
    pub fn code(self) -> u8 {
        self as u8
    }

    /// size of the encoded instruction in bytes
    pub fn size(self) -> u32 {
        use Opcode::*;
        match self {
            Copy => 3,
            CopyImm => 6,
            Sb | Lb | Sw | Lw => 8,
            Add | Sub | Mul | Div | Mod => 4,
            AddImm => 7,
            Neg | Flow => 2,
            Eq | Neq | Gt | Lt | Gte | Lte => 4,
            And | Or | Xor => 4,
            AndImm | OrImm | XorImm => 7,
            Lshift | Zrshift | Rshift => 4,
            LshiftImm | ZrshiftImm | RshiftImm => 7,
            Jump | Call => 7,
            Zjump => 8,
            Return => 1,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Copy | CopyImm => "copy",
            Sb => "sb",
            Lb => "lb",
            Sw => "sw",
            Lw => "lw",
            Add | AddImm => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Mod => "mod",
            Neg => "neg",
            Flow => "flow",
            Eq => "eq",
            Neq => "neq",
            Gt => "gt",
            Lt => "lt",
            Gte => "gte",
            Lte => "lte",
            And | AndImm => "and",
            Or | OrImm => "or",
            Xor | XorImm => "xor",
            Lshift | LshiftImm => "lshift",
            Zrshift | ZrshiftImm => "zrshift",
            Rshift | RshiftImm => "rshift",
            Jump => "jump",
            Zjump => "zjump",
            Call => "call",
            Return => "return",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_alternative_names_its_own_mnemonic() {
        for (mnemonic, alternatives) in MNEMONICS.iter() {
            for (opcode, _) in alternatives {
                assert_eq!(*mnemonic, opcode.mnemonic());
            }
        }
    }

    #[test]
    fn test_register_forms_come_first() {
        let copy = alternatives("copy").unwrap();
        assert_eq!((Opcode::Copy, "rr"), copy[0]);
        assert_eq!((Opcode::CopyImm, "rv"), copy[1]);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(3, Opcode::Copy.size());
        assert_eq!(8, Opcode::Sw.size());
        assert_eq!(8, Opcode::Zjump.size());
        assert_eq!(1, Opcode::Return.size());
    }

    #[test]
    fn test_codes() {
        assert_eq!(0x00, Opcode::Copy.code());
        assert_eq!(0x01, Opcode::CopyImm.code());
        assert_eq!(0x17, Opcode::Flow.code());
        assert_eq!(0x45, Opcode::Rshift.code());
        assert_eq!(0x53, Opcode::Return.code());
    }

    #[test]
    fn test_unknown_mnemonic() {
        assert!(alternatives("mov").is_none());
        assert!(alternatives("COPY").is_none());
    }
}
