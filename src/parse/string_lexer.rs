use std::iter::Peekable;
use std::str::CharIndices;

#[derive(PartialEq, Eq, Debug, Clone)]
/// Something with a position in a source line. This is useful for proper error reporting
pub struct Spanned<T>
where
    T: PartialEq + Eq,
{
    pub start_idx: usize, // inclusive
    pub end_idx: usize,   // exclusive
    pub content: T,
}

impl<T> Spanned<T>
where
    T: PartialEq + Eq,
{
    pub fn new(start_idx: usize, end_idx: usize, content: T) -> Self {
        Self {
            start_idx,
            end_idx,
            content,
        }
    }

    /// Keeps the same location data as the old Spanned, but swaps out the inner value
    pub fn with_new_content<O>(&self, o: O) -> Spanned<O>
    where
        O: PartialEq + Eq,
    {
        Spanned::new(self.start_idx, self.end_idx, o)
    }
}

/// A char walker over a single source line
pub struct StringLexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
}

impl<'src> StringLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        StringLexer {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// byte offset of the next char, or the length of the line at the end
    pub fn position(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    pub fn current_char(&mut self) -> Option<Spanned<char>> {
        self.chars
            .peek()
            .map(|&(i, c)| Spanned::new(i, i + c.len_utf8(), c))
    }

    /// Everything that has not been consumed yet
    pub fn rest(&mut self) -> &'src str {
        let position = self.position();
        &self.source[position..]
    }

    pub fn advance(&mut self) -> Option<Spanned<char>> {
        let (i, c) = self.chars.next()?;
        Some(Spanned::new(i, i + c.len_utf8(), c))
    }

    /// Consumes chars as long as the predicate holds. The result may be empty
    pub fn take_chars_while<P>(&mut self, mut predicate: P) -> Spanned<&'src str>
    where
        P: FnMut(char) -> bool,
    {
        let start_idx = self.position();
        while self.chars.next_if(|&(_, c)| predicate(c)).is_some() {}
        let end_idx = self.position();
        Spanned::new(start_idx, end_idx, &self.source[start_idx..end_idx])
    }

    /// Drops the rest of the line
    pub fn skip_rest(&mut self) {
        for _ in self.chars.by_ref() {}
    }
}
