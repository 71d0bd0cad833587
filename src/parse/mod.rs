pub mod assembly;
pub mod error;
pub mod lexer;
pub mod line;
mod string_lexer;
mod symbols;

pub use assembly::assemble;
pub use error::{AssemblyError, ParseError};
pub use string_lexer::{Spanned, StringLexer};
pub use symbols::LabelTable;
