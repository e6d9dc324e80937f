//! Indentation-aware lexer: character stream -> token stream.
//!
//! Follows the teacher's hand-rolled, character-dispatch style
//! (`Peekable<Chars>` walked with `peek`/`next`/`next_if`), generalized
//! with the indentation stack spec.md requires: DEDENT tokens are emitted
//! (not just a flat INDENT), and the indent stack is strictly monotonic.

mod token;

pub use token::{Num, Position, Token, TokenKind};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::LexerError;

/// Keywords recognised after an identifier is scanned. Built once, mirrors
/// the teacher's `LEX_MAP` (`lazy_static!` in the teacher; this crate uses
/// `once_cell`, the crate actually declared in the teacher's manifest).
static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("var", TokenKind::Var);
    m.insert("func", TokenKind::Func);
    m.insert("if", TokenKind::If);
    m.insert("else", TokenKind::Else);
    m.insert("elif", TokenKind::Elif);
    m.insert("while", TokenKind::While);
    m.insert("return", TokenKind::Return);
    m.insert("for", TokenKind::For);
    m.insert("in", TokenKind::In);
    m.insert("continue", TokenKind::Continue);
    m.insert("break", TokenKind::Break);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("nil", TokenKind::Nil);
    m
});

type LexResult<T> = Result<T, LexerError>;

pub struct Lexer<'a> {
    iterator: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    indent_stack: Vec<usize>,
    /// true right after a newline, before any non-blank content has been
    /// scanned on the new logical line.
    at_line_start: bool,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            iterator: input.chars().peekable(),
            tokens: vec![],
            indent_stack: vec![0],
            at_line_start: true,
            line: 1,
            col: 1,
        }
    }

    fn position(&self) -> Position {
        (self.line, self.col)
    }

    fn peek(&mut self) -> Option<char> {
        self.iterator.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let next = self.iterator.next();
        if let Some(c) = next {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        next
    }

    fn next_if(&mut self, func: impl FnOnce(&char) -> bool) -> Option<char> {
        if self.peek().map(|c| func(&c)).unwrap_or(false) {
            self.next()
        } else {
            None
        }
    }

    fn push(&mut self, kind: TokenKind, position: Position) {
        self.tokens.push(Token { kind, position });
    }

    /// Skip blank lines (runs of whitespace-only lines), then measure the
    /// indentation width of the next logical line and emit INDENT/DEDENT.
    fn handle_newline(&mut self) -> LexResult<()> {
        loop {
            let mut width = 0;
            while let Some(' ') = self.peek() {
                self.next();
                width += 1;
            }

            match self.peek() {
                // blank line: nothing meaningful before the next newline.
                Some('\n') => {
                    self.next();
                    continue;
                }
                // end of input: no logical line follows, leave dedenting
                // to run()'s final flush.
                None => return Ok(()),
                _ => {
                    self.apply_indent(width)?;
                    return Ok(());
                }
            }
        }
    }

    fn apply_indent(&mut self, width: usize) -> LexResult<()> {
        let position = self.position();
        let top = *self.indent_stack.last().unwrap();
        if width > top {
            self.indent_stack.push(width);
            self.push(TokenKind::Indent, position);
        } else {
            while width < *self.indent_stack.last().unwrap() {
                self.indent_stack.pop();
                self.push(TokenKind::Dedent, position);
            }
            if width != *self.indent_stack.last().unwrap() {
                return Err(LexerError::new(
                    format!("inconsistent indentation (width {width})"),
                    position,
                ));
            }
        }
        Ok(())
    }

    fn scan_string(&mut self) -> LexResult<()> {
        let position = self.position();
        let mut chars = vec!['"'];
        self.next();
        loop {
            match self.peek() {
                Some('"') => {
                    self.next();
                    break;
                }
                Some(c) => {
                    chars.push(c);
                    self.next();
                }
                None => {
                    return Err(LexerError::new("unterminated string literal", position));
                }
            }
        }
        chars.push('"');
        self.push(TokenKind::String(chars.into_iter().collect()), position);
        Ok(())
    }

    fn scan_number(&mut self) -> LexResult<()> {
        let position = self.position();
        let mut chars = vec![];
        while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
            chars.push(c);
        }

        let is_float = self.peek() == Some('.')
            && self
                .iterator
                .clone()
                .nth(1)
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false);

        if is_float {
            chars.push('.');
            self.next();
            while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
                chars.push(c);
            }
            let text: String = chars.into_iter().collect();
            let value: f64 = text
                .parse()
                .map_err(|_| LexerError::new(format!("invalid float literal '{text}'"), position))?;
            self.push(TokenKind::Number(Num::Float(value)), position);
        } else {
            let text: String = chars.into_iter().collect();
            let value: i64 = text
                .parse()
                .map_err(|_| LexerError::new(format!("invalid integer literal '{text}'"), position))?;
            self.push(TokenKind::Number(Num::Int(value)), position);
        }
        Ok(())
    }

    fn scan_identifier(&mut self) -> LexResult<()> {
        let position = self.position();
        let mut chars = vec![];
        while let Some(c) = self.next_if(|c| c.is_alphanumeric() || *c == '_') {
            chars.push(c);
        }
        let text: String = chars.into_iter().collect();
        match KEYWORDS.get(text.as_str()) {
            Some(kind) => self.push(kind.clone(), position),
            None => self.push(TokenKind::Id(text), position),
        }
        Ok(())
    }

    fn scan_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.next();
        }
    }

    /// Try to recognise a two-character operator starting at the current
    /// position. Two-character operators are checked before their
    /// single-character prefixes, per spec.md §4.1.
    fn scan_two_char(&mut self, first: char) -> Option<TokenKind> {
        let second = self.iterator.clone().nth(1)?;
        let kind = match (first, second) {
            ('<', '=') => TokenKind::LessEqual,
            ('>', '=') => TokenKind::GreaterEqual,
            ('=', '=') => TokenKind::Equal,
            ('!', '=') => TokenKind::NotEqual,
            ('&', '&') => TokenKind::And,
            ('|', '|') => TokenKind::Or,
            _ => return None,
        };
        self.next();
        self.next();
        Some(kind)
    }

    fn scan_single_char(&mut self, c: char) -> LexResult<()> {
        let position = self.position();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LSquare,
            ']' => TokenKind::RSquare,
            '{' => TokenKind::LCurly,
            '}' => TokenKind::RCurly,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '!' => TokenKind::Not,
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Mul,
            '/' => TokenKind::Div,
            '%' => TokenKind::Mod,
            other => return Err(LexerError::new(format!("unexpected character '{other}'"), position)),
        };
        self.next();
        self.push(kind, position);
        Ok(())
    }

    /// Consume the whole input and return the token stream, terminated by
    /// a single EOF token.
    pub fn run(mut self) -> LexResult<Vec<Token>> {
        loop {
            if self.at_line_start {
                self.at_line_start = false;
                self.handle_newline()?;
            }

            let Some(c) = self.peek() else { break };

            match c {
                '\n' => {
                    self.next();
                    self.at_line_start = true;
                }
                ' ' | '\t' | '\r' => {
                    self.next();
                }
                '#' => self.scan_comment(),
                '"' => self.scan_string()?,
                c if c.is_ascii_digit() => self.scan_number()?,
                c if c.is_alphabetic() || c == '_' => self.scan_identifier()?,
                '<' | '>' | '=' | '!' | '&' | '|' => {
                    let position = self.position();
                    if let Some(kind) = self.scan_two_char(c) {
                        self.push(kind, position);
                    } else if c == '&' || c == '|' {
                        return Err(LexerError::new(format!("unexpected character '{c}'"), position));
                    } else {
                        self.scan_single_char(c)?;
                    }
                }
                c => self.scan_single_char(c)?,
            }
        }

        let eof_position = self.position();
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(TokenKind::Dedent, eof_position);
        }
        self.push(TokenKind::Eof, eof_position);

        Ok(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .run()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_hello_print() {
        let tokens = kinds("print(\"hello\")\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Id("print".into()),
                TokenKind::LParen,
                TokenKind::String("\"hello\"".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn indent_and_dedent_are_balanced() {
        let src = "if true:\n    var a = 1\nvar b = 2\n";
        let tokens = kinds(src);
        let indents = tokens.iter().filter(|t| **t == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|t| **t == TokenKind::Dedent).count();
        assert_eq!(indents, dedents);
        assert_eq!(indents, 1);
    }

    #[test]
    fn nested_dedent_emits_multiple_dedents() {
        let src = "if true:\n    if true:\n        var a = 1\nvar b = 2\n";
        let tokens = kinds(src);
        // two INDENTs going in, then two DEDENTs back to back before `var b`.
        let positions: Vec<_> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == TokenKind::Dedent)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[1], positions[0] + 1);
    }

    #[test]
    fn trailing_newline_does_not_spuriously_indent() {
        let src = "var a = 1\n";
        let tokens = kinds(src);
        assert!(!tokens.contains(&TokenKind::Indent));
        assert!(!tokens.contains(&TokenKind::Dedent));
    }

    #[test]
    fn two_char_operators_before_prefixes() {
        let tokens = kinds("a <= b && c\n");
        assert!(tokens.contains(&TokenKind::LessEqual));
        assert!(tokens.contains(&TokenKind::And));
    }

    #[test]
    fn comment_is_dropped() {
        let tokens = kinds("# a comment\nvar a = 1\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Var,
                TokenKind::Id("a".into()),
                TokenKind::Assign,
                TokenKind::Number(Num::Int(1)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn float_literal() {
        let tokens = kinds("1.5\n");
        assert_eq!(tokens, vec![TokenKind::Number(Num::Float(1.5)), TokenKind::Eof]);
    }

    #[test]
    fn unexpected_character_is_an_error() {
        let err = Lexer::new("@\n").run().unwrap_err();
        assert!(err.message.contains('@'));
    }
}
