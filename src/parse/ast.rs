//! Abstract syntax tree produced by the parser and walked by the interpreter.
//!
//! Every node exclusively owns its children. `Display` renders a node back to
//! normalized source text that parses to an equal tree.

use std::fmt;

use serde::Serialize;

use super::token::{Token, TokenKind};

/// Operator joining consecutive commands of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    /// `&&`: run next only if previous succeeded
    And,
    /// `||`: run next only if previous failed
    Or,
    /// `;`: run next unconditionally. The parser ends a pipeline at `;`
    /// instead, so only ASTs built by hand carry this operator.
    Semi,
}

impl Operator {
    /// The operator's shell syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Semi => ";",
        }
    }
}

/// A back-tick substitution: the originating token and the program parsed
/// from its raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tick {
    pub token: Token,
    pub program: List,
}

/// One argument-like item: a command word, redirect target, loop word or
/// assignment value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Word {
    /// A `Word`, `String` or `Variable` token, resolved at evaluation time.
    Plain(Token),
    /// A substitution whose captured output becomes the word's text.
    Tick(Tick),
}

impl Word {
    /// The originating token.
    pub fn token(&self) -> &Token {
        match self {
            Word::Plain(token) => token,
            Word::Tick(tick) => &tick.token,
        }
    }
}

/// A simple command: `name args... [< in] [> out] [&]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    /// Never empty; `args[0]` is the command name.
    pub args: Vec<Word>,
    pub input: Option<Word>,
    pub output: Option<Word>,
    pub background: bool,
}

impl Command {
    pub fn new(name: Word) -> Self {
        Self {
            args: vec![name],
            input: None,
            output: None,
            background: false,
        }
    }

    pub fn name(&self) -> &Word {
        &self.args[0]
    }
}

/// A short-circuit chain of commands, evaluated left to right.
///
/// Stored flat so arbitrarily long chains never recurse when cloned,
/// compared, serialized or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expression {
    pub command: Command,
    /// Each following command with the operator joining it to its predecessor.
    pub rest: Vec<(Operator, Command)>,
}

impl Expression {
    pub fn single(command: Command) -> Self {
        Self {
            command,
            rest: Vec::new(),
        }
    }

    /// Append `command`, joined to the current last command by `op`.
    pub fn push(&mut self, op: Operator, command: Command) {
        self.rest.push((op, command));
    }

    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Iterate the chain's commands with the operator that follows each.
    pub fn links(&self) -> Links<'_> {
        Links {
            expr: self,
            index: 0,
        }
    }
}

/// Iterator over `(command, trailing operator)` pairs of an expression chain.
pub struct Links<'a> {
    expr: &'a Expression,
    index: usize,
}

impl<'a> Iterator for Links<'a> {
    type Item = (&'a Command, Option<Operator>);

    fn next(&mut self) -> Option<Self::Item> {
        let command = match self.index {
            0 => &self.expr.command,
            i => &self.expr.rest.get(i - 1)?.1,
        };
        let op = self.expr.rest.get(self.index).map(|(op, _)| *op);
        self.index += 1;
        Some((command, op))
    }
}

/// `name = value`. A missing value means the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub name: Token,
    pub value: Option<Word>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfClause {
    pub test: List,
    pub then_branch: Box<Pipeline>,
    pub else_branch: Option<Box<Pipeline>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForLoop {
    pub variable: Token,
    /// `None` when the loop has no `in` clause: it then runs zero times.
    pub words: Option<Vec<Word>>,
    pub body: List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhileLoop {
    /// `None` means the test is always true.
    pub test: Option<List>,
    pub body: List,
}

/// One evaluable unit of a [`List`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Pipeline {
    Assignment(Assignment),
    Expression(Expression),
    If(IfClause),
    For(ForLoop),
    While(WhileLoop),
    Tick(Tick),
}

/// An ordered sequence of pipelines: one program or sub-program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct List {
    pub pipelines: Vec<Pipeline>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pipeline: Pipeline) {
        self.pipelines.push(pipeline);
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

// ── Display: normalized source text ──

/// Render a string token so the scanner decodes it back to `text`.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{8}' => f.write_str("\\b")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = self.token();
        match token.kind {
            TokenKind::String => write_quoted(f, &token.text),
            TokenKind::Variable => write!(f, "${{{}}}", token.text),
            TokenKind::Tick => write!(f, "`{}`", token.text),
            _ => f.write_str(&token.text),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{arg}")?;
        }
        if let Some(input) = &self.input {
            write!(f, " < {input}")?;
        }
        if let Some(output) = &self.output {
            write!(f, " > {output}")?;
        }
        if self.background {
            f.write_str(" &")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (command, op) in self.links() {
            write!(f, "{command}")?;
            match op {
                Some(Operator::Semi) => f.write_str("; ")?,
                Some(op) => write!(f, " {} ", op.as_str())?,
                None => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} =", self.name.text)?;
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::Assignment(a) => write!(f, "{a}"),
            Pipeline::Expression(e) => write!(f, "{e}"),
            Pipeline::If(clause) => {
                write!(f, "if {} then {}", clause.test, clause.then_branch)?;
                if let Some(other) = &clause.else_branch {
                    write!(f, " else {other}")?;
                }
                f.write_str(" fi")
            }
            Pipeline::For(lp) => {
                write!(f, "for {}", lp.variable.text)?;
                if let Some(words) = &lp.words {
                    f.write_str(" in")?;
                    for word in words {
                        write!(f, " {word}")?;
                    }
                }
                write!(f, " do {} done", lp.body)
            }
            Pipeline::While(lp) => {
                f.write_str("while")?;
                if let Some(test) = &lp.test {
                    write!(f, " {test}")?;
                }
                f.write_str(" do")?;
                if !lp.body.is_empty() {
                    write!(f, " {}", lp.body)?;
                }
                f.write_str(" done")
            }
            Pipeline::Tick(tick) => write!(f, "`{}`", tick.token.text),
        }
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pipeline) in self.pipelines.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{pipeline}")?;
        }
        Ok(())
    }
}
