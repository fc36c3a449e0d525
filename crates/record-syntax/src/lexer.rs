//! Tokenizer for C# source.
//!
//! Comments, whitespace and preprocessor lines are dropped. String literals keep
//! both their source text and their decoded value so attribute arguments can be
//! read without re-parsing.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::ast::Span;
use crate::error::ParseError;

/// Token categories the declaration parser cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword. C# contextual keywords make a closed keyword set
    /// more trouble than it is worth at declaration level.
    Ident,
    /// String literal of any flavour; `value` is the decoded content.
    Str { value: String },
    Char,
    Number,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    /// True for an identifier token with exactly this text.
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    /// True for a punctuation token with exactly this text.
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }

    pub fn string_value(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Str { value } => Some(value),
            _ => None,
        }
    }
}

const TWO_CHAR_PUNCT: &[&str] = &[
    "=>", "::", "==", "!=", "<=", ">=", "&&", "||", "??", "++", "--", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "->", "?.",
];

/// Lex a whole source string.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(source);
    lexer.lex_all()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
    line: u32,
    line_start: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            tokens: Vec::new(),
            line: 1,
            line_start: 0,
            at_line_start: true,
        }
    }

    fn lex_all(&mut self) -> Result<(), ParseError> {
        // Skip a UTF-8 byte order mark.
        if let Some(&(0, '\u{feff}')) = self.chars.peek() {
            self.bump();
        }

        while let Some(&(start, ch)) = self.chars.peek() {
            match ch {
                '\n' => {
                    self.bump();
                    self.at_line_start = true;
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => self.skip_line(),
                '/' if self.peek_second() == Some('*') => self.skip_block_comment(start)?,
                '#' if self.at_line_start => self.skip_line(),
                c if c == '_' || c.is_alphabetic() => self.lex_identifier(start),
                '@' if matches!(self.peek_second(), Some(c) if c == '_' || c.is_alphabetic()) => {
                    self.bump();
                    self.lex_identifier(start);
                }
                '@' | '$' => self.lex_prefixed_string(start)?,
                '"' => self.lex_string(start, false, false)?,
                '\'' => self.lex_char(start)?,
                c if c.is_ascii_digit() => self.lex_number(start),
                _ => self.lex_punct(start),
            }
        }
        Ok(())
    }

    fn bump(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.line_start = pos + 1;
        }
        Some(ch)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(pos, _)| pos)
            .unwrap_or(self.source.len())
    }

    fn span_at(&self, start: usize, end: usize, line: u32, line_start: usize) -> Span {
        let column = self.source[line_start..start].chars().count() as u32 + 1;
        Span {
            start,
            end,
            line,
            column,
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: u32, line_start: usize) {
        let end = self.offset();
        let span = self.span_at(start, end, line, line_start);
        self.tokens.push(Token {
            kind,
            text: self.source[start..end].to_string(),
            span,
        });
        self.at_line_start = false;
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, start: usize) -> Result<(), ParseError> {
        let (line, line_start) = (self.line, self.line_start);
        self.bump();
        self.bump();
        while let Some(c) = self.bump() {
            if c == '*' && self.peek_char() == Some('/') {
                self.bump();
                return Ok(());
            }
        }
        Err(ParseError::Unterminated {
            what: "block comment",
            span: self.span_at(start, self.source.len(), line, line_start),
        })
    }

    fn lex_identifier(&mut self, start: usize) {
        let (line, line_start) = (self.line, self.line_start);
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Ident, start, line, line_start);
    }

    fn lex_number(&mut self, start: usize) {
        let (line, line_start) = (self.line, self.line_start);
        while let Some(c) = self.peek_char() {
            let continues = c.is_ascii_alphanumeric()
                || c == '_'
                || (c == '.' && matches!(self.peek_second(), Some(d) if d.is_ascii_digit()));
            if !continues {
                break;
            }
            self.bump();
        }
        self.push(TokenKind::Number, start, line, line_start);
    }

    fn lex_punct(&mut self, start: usize) {
        let (line, line_start) = (self.line, self.line_start);
        let first = self.bump();
        if let (Some(first), Some(second)) = (first, self.peek_char()) {
            let pair: String = [first, second].iter().collect();
            if TWO_CHAR_PUNCT.contains(&pair.as_str()) {
                self.bump();
            }
        }
        self.push(TokenKind::Punct, start, line, line_start);
    }

    /// `@"..."`, `$"..."`, `$@"..."` and `@$"..."`.
    fn lex_prefixed_string(&mut self, start: usize) -> Result<(), ParseError> {
        let mut verbatim = false;
        let mut interpolated = false;
        while let Some(c) = self.peek_char() {
            match c {
                '@' => verbatim = true,
                '$' => interpolated = true,
                _ => break,
            }
            self.bump();
        }
        if self.peek_char() != Some('"') {
            // Stray sigil; treat it as punctuation so the parser can report it.
            let (line, line_start) = (self.line, self.line_start);
            self.push(TokenKind::Punct, start, line, line_start);
            return Ok(());
        }
        self.lex_string(start, verbatim, interpolated)
    }

    fn lex_string(
        &mut self,
        start: usize,
        verbatim: bool,
        interpolated: bool,
    ) -> Result<(), ParseError> {
        let (line, line_start) = (self.line, self.line_start);
        let unterminated = |lexer: &Self| ParseError::Unterminated {
            what: "string literal",
            span: lexer.span_at(start, lexer.source.len(), line, line_start),
        };

        let mut quotes = 0;
        while self.peek_char() == Some('"') {
            self.bump();
            quotes += 1;
            if quotes == 2 && self.peek_char() != Some('"') {
                // `""` is the empty string, not the start of a raw literal.
                self.push(
                    TokenKind::Str {
                        value: String::new(),
                    },
                    start,
                    line,
                    line_start,
                );
                return Ok(());
            }
        }

        let mut value = String::new();
        if quotes >= 3 {
            let mut run = 0;
            loop {
                match self.bump() {
                    Some('"') => {
                        run += 1;
                        if run == quotes {
                            break;
                        }
                    }
                    Some(c) => {
                        value.extend(std::iter::repeat('"').take(run));
                        run = 0;
                        value.push(c);
                    }
                    None => return Err(unterminated(self)),
                }
            }
            let trimmed = value.trim_matches('\n').to_string();
            self.push(TokenKind::Str { value: trimmed }, start, line, line_start);
            return Ok(());
        }

        let mut depth = 0usize;
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(unterminated(self)),
            };
            if interpolated && depth > 0 {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                value.push(c);
                continue;
            }
            match c {
                '"' if verbatim && self.peek_char() == Some('"') => {
                    self.bump();
                    value.push('"');
                }
                '"' => break,
                '\n' if !verbatim => return Err(unterminated(self)),
                '\\' if !verbatim => {
                    let escaped = self.bump().ok_or_else(|| unterminated(self))?;
                    value.push(self.unescape(escaped));
                }
                '{' if interpolated && self.peek_char() == Some('{') => {
                    self.bump();
                    value.push('{');
                }
                '{' if interpolated => {
                    depth = 1;
                    value.push(c);
                }
                _ => value.push(c),
            }
        }
        self.push(TokenKind::Str { value }, start, line, line_start);
        Ok(())
    }

    fn unescape(&mut self, escaped: char) -> char {
        match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            'u' | 'x' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    match self.peek_char().and_then(|c| c.to_digit(16)) {
                        Some(digit) => {
                            code = code * 16 + digit;
                            self.bump();
                        }
                        None => break,
                    }
                }
                char::from_u32(code).unwrap_or('\u{fffd}')
            }
            other => other,
        }
    }

    fn lex_char(&mut self, start: usize) -> Result<(), ParseError> {
        let (line, line_start) = (self.line, self.line_start);
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('\'') => break,
                Some('\n') | None => {
                    return Err(ParseError::Unterminated {
                        what: "character literal",
                        span: self.span_at(start, self.source.len(), line, line_start),
                    })
                }
                Some(_) => {}
            }
        }
        self.push(TokenKind::Char, start, line, line_start);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        lex(source).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_skips_comments_and_directives() {
        let src = "// header\n#region x\nclass /* inline */ Person\n#endregion\n{ }";
        assert_eq!(texts(src), vec!["class", "Person", "{", "}"]);
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = lex("\nnamespace A\n{\n    partial class Person\n").unwrap();
        let person = tokens.iter().find(|t| t.text == "Person").unwrap();
        assert_eq!(person.span.line, 4);
        assert_eq!(person.span.column, 19);
    }

    #[test]
    fn test_string_values_are_decoded() {
        let tokens = lex(r#"F("a\"b", @"c""d", $"x{y}z", """raw "q" text""")"#).unwrap();
        let values: Vec<&str> = tokens.iter().filter_map(|t| t.string_value()).collect();
        assert_eq!(values, vec!["a\"b", "c\"d", "x{y}z", "raw \"q\" text"]);
    }

    #[test]
    fn test_empty_string_is_not_raw() {
        let tokens = lex(r#"x = "";"#).unwrap();
        assert_eq!(tokens[2].string_value(), Some(""));
        assert!(tokens[3].is_punct(";"));
    }

    #[test]
    fn test_two_char_punctuation() {
        assert_eq!(texts("a => b :: c"), vec!["a", "=>", "b", "::", "c"]);
        // Closing generics stay separate.
        assert_eq!(texts("List<List<int>>"), vec!["List", "<", "List", "<", "int", ">", ">"]);
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = lex("var s = \"open\n").unwrap_err();
        assert!(matches!(err, ParseError::Unterminated { .. }));
    }
}
