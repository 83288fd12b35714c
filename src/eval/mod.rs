//! Tree-walking interpreter.
//!
//! Statuses follow shell convention: 0 is success and counts as true for
//! `if`, `while`, `&&` and `||`.

pub mod vars;

pub use vars::{STATUS, VariableStore, Variables};

use crate::exec::{Backend, Invocation, Sink};
use crate::parse::{
    Command, Expression, ForLoop, IfClause, List, Operator, Pipeline, Tick, TokenKind, WhileLoop,
    Word,
};

/// Evaluates parsed programs against a variable store and a backend.
///
/// A substitution runs in a nested interpreter that reborrows the same store
/// and backend but captures output instead of inheriting the sink.
pub struct Interpreter<'a, V: ?Sized, B: ?Sized> {
    vars: &'a mut V,
    backend: &'a mut B,
    capture: Option<&'a mut Vec<u8>>,
    loop_limit: usize,
}

impl<'a, V, B> Interpreter<'a, V, B>
where
    V: VariableStore + ?Sized,
    B: Backend + ?Sized,
{
    pub fn new(vars: &'a mut V, backend: &'a mut B) -> Self {
        Self {
            vars,
            backend,
            capture: None,
            loop_limit: 0,
        }
    }

    /// Stop `while` loops after `limit` iterations; 0 means unlimited.
    pub fn with_loop_limit(mut self, limit: usize) -> Self {
        self.loop_limit = limit;
        self
    }

    /// Evaluate each pipeline in order. Status of the last, 0 when empty.
    pub fn eval_list(&mut self, list: &List) -> i32 {
        let mut status = 0;
        for pipeline in &list.pipelines {
            status = self.eval_pipeline(pipeline);
        }
        status
    }

    pub fn eval_pipeline(&mut self, pipeline: &Pipeline) -> i32 {
        match pipeline {
            Pipeline::Assignment(assignment) => {
                let value = match &assignment.value {
                    Some(word) => self.resolve(word),
                    None => String::new(),
                };
                self.vars.set(&assignment.name.text, &value, true);
                0
            }
            Pipeline::Expression(expr) => self.eval_expression(expr),
            Pipeline::If(clause) => self.eval_if(clause),
            Pipeline::For(lp) => self.eval_for(lp),
            Pipeline::While(lp) => self.eval_while(lp),
            // Output already flows to this interpreter's sink.
            Pipeline::Tick(tick) => self.eval_list(&tick.program),
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> i32 {
        let mut status = 0;
        for (command, op) in expr.links() {
            status = self.eval_command(command);
            let proceed = match op {
                Some(Operator::And) => status == 0,
                Some(Operator::Or) => status != 0,
                Some(Operator::Semi) => true,
                None => false,
            };
            if !proceed {
                break;
            }
        }
        status
    }

    fn eval_command(&mut self, command: &Command) -> i32 {
        let argv: Vec<String> = command.args.iter().map(|w| self.resolve(w)).collect();
        let input = command.input.as_ref().map(|w| self.resolve(w));
        let output = command.output.as_ref().map(|w| self.resolve(w));
        let invocation = Invocation {
            argv,
            background: command.background,
            input,
            output,
        };

        let sink = match self.capture.as_deref_mut() {
            Some(buf) => Sink::Capture(buf),
            None => Sink::Inherit,
        };
        let status = self.backend.run(&invocation, sink);
        log::debug!("{} -> {status}", invocation.display());
        self.vars.set(STATUS, &status.to_string(), true);
        status
    }

    fn eval_if(&mut self, clause: &IfClause) -> i32 {
        let test = self.eval_list(&clause.test);
        if test == 0 {
            self.eval_pipeline(&clause.then_branch)
        } else if let Some(other) = &clause.else_branch {
            self.eval_pipeline(other)
        } else {
            test
        }
    }

    fn eval_for(&mut self, lp: &ForLoop) -> i32 {
        let Some(words) = &lp.words else {
            return 0;
        };
        let values: Vec<String> = words.iter().map(|w| self.resolve(w)).collect();
        let mut status = 0;
        for value in &values {
            self.vars.set(&lp.variable.text, value, true);
            status = self.eval_list(&lp.body);
        }
        status
    }

    fn eval_while(&mut self, lp: &WhileLoop) -> i32 {
        let mut status = 0;
        let mut iterations = 0usize;
        loop {
            if let Some(test) = &lp.test
                && self.eval_list(test) != 0
            {
                break;
            }
            if self.loop_limit > 0 && iterations >= self.loop_limit {
                log::warn!("while loop stopped after {iterations} iterations");
                break;
            }
            status = self.eval_list(&lp.body);
            iterations += 1;
        }
        status
    }

    /// The text a word stands for at this point of evaluation.
    fn resolve(&mut self, word: &Word) -> String {
        match word {
            Word::Plain(token) if token.kind == TokenKind::Variable => {
                self.vars.get(&token.text).unwrap_or_default()
            }
            Word::Plain(token) => token.text.clone(),
            Word::Tick(tick) => self.substitute(tick),
        }
    }

    /// Run a substitution and return its output without trailing newlines.
    fn substitute(&mut self, tick: &Tick) -> String {
        let mut buf = Vec::new();
        let status = Interpreter {
            vars: &mut *self.vars,
            backend: &mut *self.backend,
            capture: Some(&mut buf),
            loop_limit: self.loop_limit,
        }
        .eval_list(&tick.program);
        log::trace!("`{}` -> {status}", tick.token.text);

        let mut text = String::from_utf8_lossy(&buf).into_owned();
        let trimmed = text.trim_end_matches('\n').len();
        text.truncate(trimmed);
        text
    }
}
