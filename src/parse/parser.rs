//! Recursive-descent parser with one token of lookahead.
//!
//! ```text
//! Program      := List EOF
//! List         := { Pipeline }
//! Pipeline     := ( AssignOrExpr | If | For | While | Tick ) [';']
//! AssignOrExpr := WORD '=' [Arg] | Expression
//! Expression   := Command { ('&&' | '||') Command }
//! Command      := Arg { Arg | '=' | '<' Arg | '>' Arg | '&' }
//! Arg          := WORD | STRING | VARIABLE | TICK
//! If           := 'if' List 'then' Pipeline [ 'else' Pipeline ] 'fi'
//! For          := 'for' WORD [ 'in' { Arg } ] 'do' List 'done'
//! While        := 'while' [ List ] 'do' [ List ] 'done'
//! Tick         := TICK
//! ```
//!
//! The production is always chosen from the lookahead kind alone. A `=` after
//! the command name is an ordinary argument, as in `[ $a = b ]`. A back-tick
//! token is re-parsed on the spot by a fresh scanner/parser pair over its raw
//! text.

use super::ast::{
    Assignment, Command, Expression, ForLoop, IfClause, List, Operator, Pipeline, Tick,
    WhileLoop, Word,
};
use super::error::ParseError;
use super::scanner::Scanner;
use super::source::{CharSource, StrSource};
use super::token::{Token, TokenKind};

/// Maximum nesting of constructs and substitutions.
pub const MAX_DEPTH: usize = 64;

/// Whether a token of this kind begins a pipeline.
fn starts_pipeline(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Word
            | TokenKind::String
            | TokenKind::Variable
            | TokenKind::If
            | TokenKind::For
            | TokenKind::While
            | TokenKind::Tick
    )
}

pub struct Parser<S> {
    scanner: Scanner<S>,
    lookahead: Token,
    depth: usize,
}

impl<S: CharSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Self::from_scanner(Scanner::new(source))
    }

    pub fn from_scanner(mut scanner: Scanner<S>) -> Self {
        let lookahead = scanner.next_token();
        Self {
            scanner,
            lookahead,
            depth: 0,
        }
    }

    /// The token the next production will be chosen from.
    pub fn lookahead(&self) -> &Token {
        &self.lookahead
    }

    pub fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Parse the whole input as one program.
    pub fn parse_program(&mut self) -> Result<List, ParseError> {
        let list = self.parse_list()?;
        if !self.at_eof() {
            return Err(self.unexpected("a command or end of input"));
        }
        Ok(list)
    }

    /// Parse one top-level pipeline, or `None` at end of input.
    ///
    /// Lets a driver evaluate each pipeline before reading further.
    pub fn next_pipeline(&mut self) -> Option<Result<Pipeline, ParseError>> {
        if self.at_eof() {
            return None;
        }
        if !starts_pipeline(self.lookahead.kind) {
            return Some(Err(self.unexpected("a command")));
        }
        Some(self.parse_pipeline())
    }

    /// Skip the offending lookahead after an error so parsing can resume.
    pub fn recover(&mut self) {
        if !self.at_eof() {
            let skipped = self.bump();
            log::debug!("{}: skipping {:?}", skipped.position, skipped.text);
        }
    }

    // ── token plumbing ──

    fn at(&self, kind: TokenKind) -> bool {
        self.lookahead.kind == kind
    }

    fn bump(&mut self) -> Token {
        let next = self.scanner.next_token();
        std::mem::replace(&mut self.lookahead, next)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::unexpected(&self.lookahead, expected)
    }

    fn skip_semicolon(&mut self) {
        if self.at(TokenKind::Semicolon) {
            self.bump();
        }
    }

    // ── grammar ──

    fn parse_list(&mut self) -> Result<List, ParseError> {
        let mut list = List::new();
        while starts_pipeline(self.lookahead.kind) {
            list.push(self.parse_pipeline()?);
        }
        Ok(list)
    }

    fn parse_pipeline(&mut self) -> Result<Pipeline, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                position: self.lookahead.position,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = match self.lookahead.kind {
            TokenKind::Word | TokenKind::String => self.parse_assignment_or_expression(),
            TokenKind::Variable => self
                .parse_word()
                .and_then(|name| self.parse_expression(name))
                .map(Pipeline::Expression),
            TokenKind::If => self.parse_if().map(Pipeline::If),
            TokenKind::For => self.parse_for().map(Pipeline::For),
            TokenKind::While => self.parse_while().map(Pipeline::While),
            TokenKind::Tick => self.parse_tick().map(Pipeline::Tick),
            _ => Err(self.unexpected("a command")),
        };
        self.depth -= 1;
        match &result {
            Ok(_) => self.skip_semicolon(),
            Err(e) => log::debug!("pipeline discarded: {e}"),
        }
        result
    }

    fn parse_assignment_or_expression(&mut self) -> Result<Pipeline, ParseError> {
        let first = self.bump();
        let pipeline = if self.at(TokenKind::Equals) {
            self.bump();
            let value = if self.lookahead.kind.is_argument() {
                Some(self.parse_word()?)
            } else {
                None
            };
            Pipeline::Assignment(Assignment { name: first, value })
        } else {
            Pipeline::Expression(self.parse_expression(Word::Plain(first))?)
        };
        Ok(pipeline)
    }

    /// Parse a chain whose first command name has already been consumed.
    fn parse_expression(&mut self, name: Word) -> Result<Expression, ParseError> {
        let mut expr = Expression::single(self.parse_command(name)?);
        loop {
            let op = match self.lookahead.kind {
                TokenKind::AndAnd => Operator::And,
                TokenKind::OrOr => Operator::Or,
                _ => break,
            };
            self.bump();
            if !self.lookahead.kind.is_argument() {
                return Err(self.unexpected("a command"));
            }
            let name = self.parse_word()?;
            let command = self.parse_command(name)?;
            expr.push(op, command);
        }
        Ok(expr)
    }

    fn parse_command(&mut self, name: Word) -> Result<Command, ParseError> {
        let mut command = Command::new(name);
        loop {
            match self.lookahead.kind {
                kind if kind.is_argument() => {
                    let arg = self.parse_word()?;
                    command.args.push(arg);
                }
                TokenKind::Equals => {
                    let token = self.bump();
                    command.args.push(Word::Plain(Token::new(
                        TokenKind::Word,
                        token.text,
                        token.position,
                    )));
                }
                TokenKind::Less => command.input = Some(self.parse_redirect()?),
                TokenKind::Greater => command.output = Some(self.parse_redirect()?),
                TokenKind::Amp => {
                    self.bump();
                    command.background = true;
                    break;
                }
                _ => break,
            }
        }
        Ok(command)
    }

    fn parse_redirect(&mut self) -> Result<Word, ParseError> {
        self.bump(); // < or >
        if !self.lookahead.kind.is_argument() {
            return Err(self.unexpected("a redirect target"));
        }
        self.parse_word()
    }

    fn parse_word(&mut self) -> Result<Word, ParseError> {
        if self.at(TokenKind::Tick) {
            return self.parse_tick().map(Word::Tick);
        }
        Ok(Word::Plain(self.bump()))
    }

    fn parse_if(&mut self) -> Result<IfClause, ParseError> {
        self.bump(); // if
        let test = self.parse_list()?;
        self.expect(TokenKind::Then)?;
        let then_branch = Box::new(self.parse_pipeline()?);
        let else_branch = if self.at(TokenKind::Else) {
            self.bump();
            Some(Box::new(self.parse_pipeline()?))
        } else {
            None
        };
        self.expect(TokenKind::Fi)?;
        Ok(IfClause {
            test,
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<ForLoop, ParseError> {
        self.bump(); // for
        let variable = self.expect(TokenKind::Word)?;
        let words = if self.at(TokenKind::In) {
            self.bump();
            let mut words = Vec::new();
            while self.lookahead.kind.is_argument() {
                words.push(self.parse_word()?);
            }
            Some(words)
        } else {
            None
        };
        self.expect(TokenKind::Do)?;
        let body = self.parse_list()?;
        self.expect(TokenKind::Done)?;
        Ok(ForLoop {
            variable,
            words,
            body,
        })
    }

    fn parse_while(&mut self) -> Result<WhileLoop, ParseError> {
        self.bump(); // while
        let test = if self.at(TokenKind::Do) {
            None
        } else {
            Some(self.parse_list()?)
        };
        self.expect(TokenKind::Do)?;
        let body = self.parse_list()?;
        self.expect(TokenKind::Done)?;
        Ok(WhileLoop { test, body })
    }

    /// Re-parse a back-tick's raw text as a complete nested program.
    fn parse_tick(&mut self) -> Result<Tick, ParseError> {
        let token = self.bump();
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                position: token.position,
                limit: MAX_DEPTH,
            });
        }
        let mut nested = Parser::new(StrSource::new(&token.text));
        nested.depth = self.depth + 1;
        let program = nested
            .parse_program()
            .map_err(|e| ParseError::Substitution {
                position: token.position,
                source: Box::new(e),
            })?;
        log::trace!("{}: substitution parsed ({} pipelines)", token.position, program.len());
        Ok(Tick { token, program })
    }
}

/// Parse a complete program from text.
pub fn parse(text: &str) -> Result<List, ParseError> {
    Parser::new(StrSource::new(text)).parse_program()
}
