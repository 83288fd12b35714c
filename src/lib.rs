//! tinysh: a small line-oriented shell.
//!
//! Text is pulled character by character through a [`parse::Scanner`], turned
//! into an AST by a recursive-descent [`parse::Parser`], and walked by an
//! [`eval::Interpreter`] that hands resolved commands to an
//! [`exec::Backend`].
//!
//! # Architecture
//!
//! - **[`parse`]**: character sources, scanner, tokens, AST and parser.
//! - **[`eval`]**: interpreter and variable store.
//! - **[`exec`]**: backends. [`exec::Executor`] runs builtins in-process and
//!   spawns everything else.
//! - **[`builtins`]**: `echo`, `true`, `false`, `seq`, `test`/`[`.
//! - **[`config`]**: embedded defaults plus user overlay merge.
//! - **[`logging`]**: `simplelog` setup.

/// In-process commands.
pub mod builtins;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Tree-walking interpreter and variable storage.
pub mod eval;
/// Command execution backends.
pub mod exec;
/// Logger installation.
pub mod logging;
/// Scanner, parser and AST.
pub mod parse;

use eval::{Interpreter, VariableStore};
use exec::Backend;
use parse::ParseError;

/// Parse `text` as a whole program and evaluate it.
///
/// Returns the status of the last pipeline. Nothing runs if the text does not
/// parse.
pub fn run<V, B>(text: &str, vars: &mut V, backend: &mut B) -> Result<i32, ParseError>
where
    V: VariableStore + ?Sized,
    B: Backend + ?Sized,
{
    let program = parse::parse(text)?;
    Ok(Interpreter::new(vars, backend).eval_list(&program))
}
