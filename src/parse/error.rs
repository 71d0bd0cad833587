use std::error;
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    // lexing
    UnexpectedCharacter { character: char, column: usize },
    ExpectedDigits { column: usize },
    IntLiteralOutOfRange(String),

    // parsing a line
    ExpectedMnemonic,
    UnexpectedComma,
    MissingComma,
    MissingOperandAfterComma,
    UnexpectedToken,
    ProgramCounterOperand,
    BareLabelOperand(String),

    // address expressions
    UnterminatedAddress,
    UnexpectedTokenInAddress,
    ProgramCounterInAddress,
    MultipleOffsets,
    TooManyRegisters,
    EmptyAddress,

    // mnemonic resolution
    UnknownMnemonic(String),
    NoMatchingPattern { mnemonic: String, found: String },

    // labels
    LabelRedefined(String),
    UndefinedLabel(String),

    ProgramTooLarge,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter { character, column } => {
                write!(f, "Invalid character {:?} in column {}", character, column + 1)
            }
            Self::ExpectedDigits { column } => {
                write!(f, "Expected digits in column {}", column + 1)
            }
            Self::IntLiteralOutOfRange(literal) => write!(
                f,
                "Number {} is outside of the range -2147483648 to 4294967295",
                literal
            ),
            Self::ExpectedMnemonic => write!(f, "Expected mnemonic"),
            Self::UnexpectedComma => write!(f, "Unexpected comma"),
            Self::MissingComma => write!(f, "Missing comma between operands"),
            Self::MissingOperandAfterComma => write!(f, "Missing operand after comma"),
            Self::UnexpectedToken => write!(f, "Unexpected token"),
            Self::ProgramCounterOperand => write!(f, "The pc register cannot be used as an operand"),
            Self::BareLabelOperand(label) => {
                write!(f, "Label {} can only be used inside of an address", label)
            }
            Self::UnterminatedAddress => write!(f, "Address is missing closing ]"),
            Self::UnexpectedTokenInAddress => write!(f, "Unexpected token in address"),
            Self::ProgramCounterInAddress => write!(f, "Cannot use pc in an address"),
            Self::MultipleOffsets => write!(f, "Address has more than one offset"),
            Self::TooManyRegisters => write!(f, "Address has more than two registers"),
            Self::EmptyAddress => write!(f, "Address has no registers or offset"),
            Self::UnknownMnemonic(mnemonic) => write!(f, "Unknown mnemonic: {}", mnemonic),
            Self::NoMatchingPattern { mnemonic, found } => write!(
                f,
                "Invalid operands for {}: no encoding takes '{}'",
                mnemonic, found
            ),
            Self::LabelRedefined(label) => {
                write!(f, "Cannot define label {} more than once", label)
            }
            Self::UndefinedLabel(label) => write!(f, "Label {} is not defined", label),
            Self::ProgramTooLarge => write!(f, "Program does not fit into the address space"),
        }
    }
}

impl error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// A ParseError together with the source line it was found on
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AssemblyError {
    pub line_idx: usize,
    pub error: ParseError,
}

impl AssemblyError {
    pub fn new(line_idx: usize, error: ParseError) -> Self {
        Self { line_idx, error }
    }
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}: {}", self.line_idx + 1, self.error)
    }
}

impl error::Error for AssemblyError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;
