//! Character-level scanner: turns a [`CharSource`] into positioned tokens.

use std::collections::VecDeque;
use std::time::Duration;

use super::source::{CharSource, StrSource};
use super::token::{Position, Token, TokenKind};

/// How long a pull may wait on an interactive source.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Characters that may appear in a bare word besides alphanumerics.
const WORD_PUNCTUATION: &[char] = &[
    '_', '-', '.', '/', '?', '!', '@', '#', '%', '^', '(', ')', '[', ']', '+', ':', ',', '~',
    '*',
];

/// Whether `c` continues a bare word.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || WORD_PUNCTUATION.contains(&c)
}

/// Pull-based tokenizer with one character of current state and an
/// on-demand lookahead buffer.
pub struct Scanner<S> {
    source: S,
    timeout: Duration,
    current: Option<char>,
    pending: VecDeque<char>,
    line: usize,
    column: usize,
    token: String,
    exhausted: bool,
}

impl<S: CharSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self::with_timeout(source, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(mut source: S, timeout: Duration) -> Self {
        let current = source.next_char(timeout);
        Self {
            source,
            timeout,
            current,
            pending: VecDeque::new(),
            line: 1,
            column: 1,
            token: String::new(),
            exhausted: false,
        }
    }

    /// Position of the current (not yet consumed) character.
    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Produce the next token. Returns `Eof` forever once input ends.
    pub fn next_token(&mut self) -> Token {
        self.skip_blanks();

        let start = self.current_position();
        self.token.clear();

        let kind = match self.current {
            None | Some('\0') => TokenKind::Eof,
            Some('&') => {
                self.accept();
                if self.current == Some('&') {
                    self.accept();
                    TokenKind::AndAnd
                } else {
                    TokenKind::Amp
                }
            }
            Some('|') => {
                self.accept();
                if self.current == Some('|') {
                    self.accept();
                    TokenKind::OrOr
                } else {
                    // Pipes between processes are not part of the grammar
                    TokenKind::Error
                }
            }
            Some('>') => {
                self.accept();
                TokenKind::Greater
            }
            Some('<') => {
                self.accept();
                TokenKind::Less
            }
            Some('=') => {
                self.accept();
                TokenKind::Equals
            }
            Some(';') => {
                self.accept();
                TokenKind::Semicolon
            }
            Some('$') => self.scan_variable(),
            Some('"') => self.scan_double_quoted(),
            Some('\'') => self.scan_single_quoted(),
            Some('`') => self.scan_tick(),
            Some(c) if is_word_char(c) => {
                self.scan_word();
                // `!=` reads as one word so `[ a != b ]` works
                if self.token == "!" && self.current == Some('=') {
                    self.accept();
                }
                TokenKind::keyword(&self.token).unwrap_or(TokenKind::Word)
            }
            Some(_) => {
                self.accept();
                TokenKind::Error
            }
        };

        let token = Token::new(kind, std::mem::take(&mut self.token), start);
        if token.kind == TokenKind::Error {
            log::debug!(
                "{}: scan error at {:?} (next {:?})",
                token.position,
                token.text,
                self.current
            );
        } else {
            log::trace!("{}: {:?} {:?}", token.position, token.kind, token.text);
        }
        token
    }

    // ── character handling ──

    fn pull(&mut self) -> Option<char> {
        match self.pending.pop_front() {
            Some(c) => Some(c),
            None => self.source.next_char(self.timeout),
        }
    }

    /// The character after the current one, without consuming anything.
    fn peek(&mut self) -> Option<char> {
        if self.pending.is_empty() {
            let c = self.source.next_char(self.timeout)?;
            self.pending.push_back(c);
        }
        self.pending.front().copied()
    }

    /// Move past the current character, updating line/column.
    fn advance(&mut self) {
        let Some(c) = self.current else {
            return;
        };
        let line_break = c == '\n' || (c == '\r' && self.peek() != Some('\n'));
        if line_break {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.current = self.pull();
    }

    /// Store the current character in the token, then advance.
    fn accept(&mut self) {
        if let Some(c) = self.current {
            self.token.push(c);
        }
        self.advance();
    }

    fn skip_blanks(&mut self) {
        loop {
            match self.current {
                Some(c) if c.is_whitespace() => self.advance(),
                Some('#') => {
                    while !matches!(self.current, None | Some('\n') | Some('\0')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    // ── token shapes ──

    fn scan_word(&mut self) {
        while self.current.is_some_and(is_word_char) {
            self.accept();
        }
    }

    fn scan_variable(&mut self) -> TokenKind {
        self.advance(); // $
        let braced = self.current == Some('{');
        if braced {
            self.advance();
        }
        self.scan_word();
        if braced {
            if self.current != Some('}') {
                return TokenKind::Error;
            }
            self.advance();
        }
        TokenKind::Variable
    }

    fn scan_double_quoted(&mut self) -> TokenKind {
        self.advance(); // opening quote
        loop {
            match self.current {
                None | Some('\0') => return TokenKind::Error,
                Some('"') => {
                    self.advance();
                    return TokenKind::String;
                }
                Some('\\') => {
                    let decoded = match self.peek() {
                        Some('\\') => Some('\\'),
                        Some('"') => Some('"'),
                        Some('n') => Some('\n'),
                        Some('r') => Some('\r'),
                        Some('t') => Some('\t'),
                        Some('b') => Some('\u{8}'),
                        _ => None,
                    };
                    match decoded {
                        Some(c) => {
                            self.advance();
                            self.advance();
                            self.token.push(c);
                        }
                        None => self.accept(),
                    }
                }
                Some(_) => self.accept(),
            }
        }
    }

    fn scan_single_quoted(&mut self) -> TokenKind {
        self.advance(); // opening quote
        loop {
            match self.current {
                None | Some('\0') => return TokenKind::Error,
                Some('\'') => {
                    self.advance();
                    return TokenKind::String;
                }
                Some('\\') => {
                    if matches!(self.peek(), Some('\\') | Some('\'')) {
                        self.advance();
                    }
                    self.accept();
                }
                Some(_) => self.accept(),
            }
        }
    }

    fn scan_tick(&mut self) -> TokenKind {
        self.advance(); // opening back-tick
        loop {
            match self.current {
                None | Some('\0') => return TokenKind::Error,
                Some('`') => {
                    self.advance();
                    return TokenKind::Tick;
                }
                Some(_) => self.accept(),
            }
        }
    }
}

impl<S: CharSource> Iterator for Scanner<S> {
    type Item = Token;

    /// Yields every token including the final `Eof`, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.exhausted = true;
        }
        Some(token)
    }
}

/// Scan a whole string, dropping the trailing `Eof`.
pub fn tokenize(text: &str) -> Vec<Token> {
    Scanner::new(StrSource::new(text))
        .take_while(|t| t.kind != TokenKind::Eof)
        .collect()
}
