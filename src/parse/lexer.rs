use super::error::{ParseError, ParseResult};
use super::{Spanned, StringLexer};
use crate::definitions::{Word, MAX_LITERAL, MIN_LITERAL};

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Token<'src> {
    SquareLeft,
    SquareRight,
    Colon,
    Comma,
    Number(Word),
    Identifier(&'src str),
    /// any run of blanks
    Space,
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub struct Lexer<'src> {
    walker: StringLexer<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(line: &'src str) -> Self {
        Self {
            walker: StringLexer::new(line),
        }
    }

    fn consume_single(&mut self, tok: Token<'src>) -> ParseResult<Spanned<Token<'src>>> {
        let start_idx = self.walker.position();
        self.walker.advance();
        Ok(Spanned::new(start_idx, start_idx + 1, tok))
    }

    fn consume_hex(&mut self) -> ParseResult<Spanned<Token<'src>>> {
        let start_idx = self.walker.position();
        // skip 0x
        self.walker.advance();
        self.walker.advance();

        let digits = self
            .walker
            .take_chars_while(|c| c.is_ascii_hexdigit() || c == '_');
        let stripped = digits.content.replace('_', "");
        if stripped.is_empty() {
            return Err(ParseError::ExpectedDigits {
                column: digits.start_idx,
            });
        }

        let value = Word::from_str_radix(&stripped, 16).map_err(|_| {
            ParseError::IntLiteralOutOfRange(format!("0x{}", digits.content))
        })?;
        Ok(Spanned::new(start_idx, digits.end_idx, Token::Number(value)))
    }

    fn consume_decimal(&mut self) -> ParseResult<Spanned<Token<'src>>> {
        let start_idx = self.walker.position();
        let negative = self.walker.rest().starts_with('-');
        if negative {
            self.walker.advance();
        }

        let digits = self.walker.take_chars_while(|c| c.is_ascii_digit());
        if digits.content.is_empty() {
            return Err(ParseError::ExpectedDigits {
                column: digits.start_idx,
            });
        }

        let literal = if negative {
            format!("-{}", digits.content)
        } else {
            digits.content.to_owned()
        };

        // anything that doesn't even fit into an i64 is certainly out of range
        let value = literal
            .parse::<i64>()
            .ok()
            .filter(|v| (MIN_LITERAL..=MAX_LITERAL).contains(v))
            .ok_or(ParseError::IntLiteralOutOfRange(literal))?;

        // negative values wrap around into two's complement
        Ok(Spanned::new(
            start_idx,
            digits.end_idx,
            Token::Number(value as Word),
        ))
    }

    fn scan_token(&mut self) -> Option<ParseResult<Spanned<Token<'src>>>> {
        let Spanned {
            content: current_char,
            start_idx,
            ..
        } = self.walker.current_char()?;

        let result = match current_char {
            '#' => {
                // comments run until the end of the line
                self.walker.skip_rest();
                return None;
            }
            '[' => self.consume_single(Token::SquareLeft),
            ']' => self.consume_single(Token::SquareRight),
            ':' => self.consume_single(Token::Colon),
            ',' => self.consume_single(Token::Comma),
            c if is_blank(c) => {
                let blanks = self.walker.take_chars_while(is_blank);
                Ok(blanks.with_new_content(Token::Space))
            }
            '0' if self.walker.rest().starts_with("0x") || self.walker.rest().starts_with("0X") => {
                self.consume_hex()
            }
            c if c == '-' || c.is_ascii_digit() => self.consume_decimal(),
            c if is_ident_char(c) => {
                let ident = self.walker.take_chars_while(is_ident_char);
                let wrapped_content = Token::Identifier(ident.content);
                Ok(ident.with_new_content(wrapped_content))
            }
            character => Err(ParseError::UnexpectedCharacter {
                character,
                column: start_idx,
            }),
        };

        Some(result)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = ParseResult<Spanned<Token<'src>>>;
    fn next(&mut self) -> Option<Self::Item> {
        self.scan_token()
    }
}

/// Split a single line into tokens, stopping at the first error
pub fn lex_line(line: &str) -> ParseResult<Vec<Spanned<Token<'_>>>> {
    Lexer::new(line).collect()
}

/// Parses text that consists of exactly one number literal, the way the assembler would
pub fn parse_literal(text: &str) -> Option<Word> {
    match lex_line(text).ok()?.as_slice() {
        [Spanned {
            content: Token::Number(value),
            ..
        }] => Some(*value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(line: &str) -> Vec<Token<'_>> {
        lex_line(line)
            .unwrap()
            .into_iter()
            .map(|s| s.content)
            .collect()
    }

    #[test]
    fn test_full_line() {
        assert_eq!(
            vec![
                Token::Identifier("loop"),
                Token::Colon,
                Token::Space,
                Token::Identifier("zjump"),
                Token::Space,
                Token::Identifier("r0"),
                Token::Comma,
                Token::Space,
                Token::SquareLeft,
                Token::Identifier("end"),
                Token::SquareRight,
                Token::Space,
            ],
            tokens("loop:   zjump r0, [end] # done yet?")
        );
    }

    #[test]
    fn test_comment_only_line_is_empty() {
        assert_eq!(Vec::<Token>::new(), tokens("# nothing to see here"));
        assert_eq!(Vec::<Token>::new(), tokens(""));
    }

    #[test]
    fn test_hex_literals() {
        assert_eq!(vec![Token::Number(0x20)], tokens("0x20"));
        assert_eq!(vec![Token::Number(0x4000_0000)], tokens("0x4000_0000"));
        assert_eq!(vec![Token::Number(0xDEAD_BEEF)], tokens("0XdeadBEEF"));
        assert_eq!(vec![Token::Number(u32::MAX)], tokens("0xFFFF_FFFF"));
    }

    #[test]
    fn test_hex_literal_too_large() {
        assert_eq!(
            Err(ParseError::IntLiteralOutOfRange("0x1_0000_0000".to_owned())),
            lex_line("0x1_0000_0000")
        );
    }

    #[test]
    fn test_hex_literal_without_digits() {
        assert_eq!(
            Err(ParseError::ExpectedDigits { column: 2 }),
            lex_line("0x")
        );
    }

    #[test]
    fn test_decimal_literals_wrap_negative_values() {
        assert_eq!(vec![Token::Number(5)], tokens("5"));
        assert_eq!(vec![Token::Number(0xFFFF_FFFF)], tokens("-1"));
        assert_eq!(vec![Token::Number(0x8000_0000)], tokens("-2147483648"));
        assert_eq!(vec![Token::Number(4_294_967_295)], tokens("4294967295"));
    }

    #[test]
    fn test_decimal_literals_out_of_range() {
        assert_eq!(
            Err(ParseError::IntLiteralOutOfRange("4294967296".to_owned())),
            lex_line("4294967296")
        );
        assert_eq!(
            Err(ParseError::IntLiteralOutOfRange("-2147483649".to_owned())),
            lex_line("-2147483649")
        );
        assert!(lex_line("99999999999999999999999").is_err());
    }

    #[test]
    fn test_lonely_minus() {
        assert_eq!(
            Err(ParseError::ExpectedDigits { column: 1 }),
            lex_line("- 5")
        );
    }

    #[test]
    fn test_numbers_are_tried_before_identifiers() {
        assert_eq!(
            vec![Token::Number(1), Token::Identifier("abc")],
            tokens("1abc")
        );
        assert_eq!(vec![Token::Identifier("_1abc")], tokens("_1abc"));
    }

    #[test]
    fn test_blanks_collapse() {
        assert_eq!(
            vec![Token::Identifier("a"), Token::Space, Token::Identifier("b")],
            tokens("a \t  b")
        );
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            Err(ParseError::UnexpectedCharacter {
                character: '+',
                column: 3
            }),
            lex_line("[r1+4]")
        );
    }

    #[test]
    fn test_spans() {
        let spanned = lex_line("sw [r1], r2").unwrap();
        assert_eq!(Spanned::new(0, 2, Token::Identifier("sw")), spanned[0]);
        assert_eq!(Spanned::new(4, 6, Token::Identifier("r1")), spanned[3]);
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Some(0x20), parse_literal("0x20"));
        assert_eq!(Some(u32::MAX), parse_literal("-1"));
        assert_eq!(None, parse_literal("r1"));
        assert_eq!(None, parse_literal("1 2"));
    }
}
