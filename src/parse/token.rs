//! Tokens produced by the scanner and consumed by the parser.

use std::fmt;

use serde::Serialize;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Bare word: command name, argument, path, flag.
    Word,
    /// Single- or double-quoted string, escapes already decoded.
    String,
    /// `$name` or `${name}`; the payload is the name, not the value.
    Variable,
    /// Back-tick substitution; the payload is the raw captured text.
    Tick,
    /// `&`: background marker
    Amp,
    /// `&&`: run next only if previous succeeded
    AndAnd,
    /// `||`: run next only if previous failed
    OrOr,
    /// `<`: input redirect
    Less,
    /// `>`: output redirect
    Greater,
    /// `=`: assignment
    Equals,
    /// `;`: statement separator
    Semicolon,
    If,
    Then,
    Else,
    Fi,
    For,
    In,
    While,
    Do,
    Done,
    /// End of input. Sticky: the scanner keeps returning it.
    Eof,
    /// Unrecognized character or malformed quote/substitution.
    Error,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
    ("fi", TokenKind::Fi),
    ("for", TokenKind::For),
    ("in", TokenKind::In),
    ("while", TokenKind::While),
    ("do", TokenKind::Do),
    ("done", TokenKind::Done),
];

impl TokenKind {
    /// Look up the keyword kind for a scanned word.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == word)
            .map(|(_, kind)| *kind)
    }

    /// Tokens that can stand as a command argument or assignment value.
    pub fn is_argument(self) -> bool {
        matches!(
            self,
            TokenKind::Word | TokenKind::String | TokenKind::Variable | TokenKind::Tick
        )
    }

    /// Human-readable name used in parse error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::String => "string",
            TokenKind::Variable => "variable",
            TokenKind::Tick => "substitution",
            TokenKind::Amp => "'&'",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::Equals => "'='",
            TokenKind::Semicolon => "';'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::Fi => "'fi'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Done => "'done'",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "invalid input",
        }
    }
}

/// 1-based line and column of a token's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A classified, positioned lexical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
