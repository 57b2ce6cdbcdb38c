//! Lexer for minic.
//!
//! The lexer is deliberately permissive: it never fails. Characters it
//! does not recognize are dropped and unterminated literals are closed at
//! the end of their line. Tokens carry their own text so later stages do
//! not need the source string.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;

/// Kind of a token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Operator,
    Literal,
    Delimiter,
    Comment,
}

/// A single token with its text and 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(rename = "value")]
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// True when the token has the given kind and exact text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

/// Reserved words. Extending the language surface means editing these
/// tables only.
pub const KEYWORDS: &[&str] = &[
    "int", "float", "double", "char", "void", "if", "else", "while", "for", "do", "return",
    "break", "continue", "const", "struct", "switch", "case", "default", "sizeof",
];

/// Words lexed as literals rather than identifiers.
pub const BOOLEAN_LITERALS: &[&str] = &["true", "false"];

/// Operators checked before any single-character rule.
pub const TWO_CHAR_OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "<<", ">>",
];

pub const OPERATORS: &[char] = &[
    '+', '-', '*', '/', '%', '=', '<', '>', '!', '&', '|', '^', '~', '?',
];

pub const DELIMITERS: &[char] = &['(', ')', '{', '}', '[', ']', ';', ',', ':', '.'];

/// Lex a source string into tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new().tokenize(source)
}

/// Line-oriented tokenizer.
///
/// Holds only the token buffer for the call in progress; `tokenize`
/// clears it at entry, so one instance can be reused for independent
/// sources.
#[derive(Debug, Default)]
pub struct Lexer {
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new() -> Self {
        Lexer::default()
    }

    pub fn tokenize(&mut self, source: &str) -> Vec<Token> {
        self.tokens.clear();
        for (index, line) in source.lines().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            LineScanner {
                chars: &chars,
                index: 0,
                line: index as u32 + 1,
                tokens: &mut self.tokens,
            }
            .run();
        }
        core::mem::take(&mut self.tokens)
    }
}

struct LineScanner<'a> {
    chars: &'a [char],
    index: usize,
    line: u32,
    tokens: &'a mut Vec<Token>,
}

impl LineScanner<'_> {
    fn run(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.index += 1;
                continue;
            }

            let start = self.index;

            if ch == '/' && self.peek_next() == Some('/') {
                self.index = self.chars.len();
                self.push(TokenKind::Comment, start);
                return;
            }

            if let Some(next) = self.peek_next() {
                let pair: String = [ch, next].iter().collect();
                if TWO_CHAR_OPERATORS.contains(&pair.as_str()) {
                    self.index += 2;
                    self.push(TokenKind::Operator, start);
                    continue;
                }
            }

            match ch {
                '"' | '\'' => self.lex_quoted(ch, start),
                '0'..='9' => self.lex_number(start),
                _ if is_ident_start(ch) => self.lex_ident_or_keyword(start),
                _ if OPERATORS.contains(&ch) => {
                    self.index += 1;
                    self.push(TokenKind::Operator, start);
                }
                _ if DELIMITERS.contains(&ch) => {
                    self.index += 1;
                    self.push(TokenKind::Delimiter, start);
                }
                _ => {
                    // unknown characters produce no token
                    self.index += 1;
                }
            }
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let text: String = self.chars[start..self.index].iter().collect();
        self.tokens
            .push(Token::new(kind, text, self.line, start as u32 + 1));
    }

    /// Scan a quoted literal. Escaped pairs are kept verbatim; a missing
    /// closing quote ends the literal at the end of the line.
    fn lex_quoted(&mut self, quote: char, start: usize) {
        self.index += 1;
        while let Some(ch) = self.peek_char() {
            self.index += 1;
            if ch == quote {
                break;
            }
            if ch == '\\' && self.peek_char().is_some() {
                self.index += 1;
            }
        }
        self.push(TokenKind::Literal, start);
    }

    /// Digits and dots, greedily. `1.2.3` is a single literal.
    fn lex_number(&mut self, start: usize) {
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || ch == '.' {
                self.index += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Literal, start);
    }

    fn lex_ident_or_keyword(&mut self, start: usize) {
        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) {
                self.index += 1;
            } else {
                break;
            }
        }

        let text: String = self.chars[start..self.index].iter().collect();
        let kind = if KEYWORDS.contains(&text.as_str()) {
            TokenKind::Keyword
        } else if BOOLEAN_LITERALS.contains(&text.as_str()) {
            TokenKind::Literal
        } else {
            TokenKind::Identifier
        };
        self.tokens
            .push(Token::new(kind, text, self.line, start as u32 + 1));
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
