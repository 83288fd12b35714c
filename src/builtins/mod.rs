//! In-process commands.
//!
//! Each builtin writes its standard output to the supplied writer and returns
//! an exit status. The executor decides which names are enabled.

/// `echo`: print arguments joined by spaces.
pub mod echo;
/// `seq`: print an inclusive integer range.
pub mod seq;
/// `true`/`false`: commands that only return a status.
pub mod truth;

use std::io::Write;

/// A command run inside the shell process.
pub trait Builtin: Send + Sync {
    /// Run with the arguments following the command name.
    fn run(&self, args: &[String], out: &mut dyn Write) -> i32;
}

/// Names of every builtin this crate provides.
pub const NAMES: &[&str] = &["echo", "true", "false", "seq", "test", "["];

/// Construct the builtin registered under `name`.
pub fn lookup(name: &str) -> Option<Box<dyn Builtin>> {
    use self::{echo::Echo, seq::Seq, test::Test, truth::FixedStatus};

    let builtin: Box<dyn Builtin> = match name {
        "echo" => Box::new(Echo),
        "true" => Box::new(FixedStatus::new(0)),
        "false" => Box::new(FixedStatus::new(1)),
        "seq" => Box::new(Seq),
        "test" => Box::new(Test::plain()),
        "[" => Box::new(Test::bracket()),
        _ => return None,
    };
    Some(builtin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert!(lookup(name).is_some(), "no builtin for {name}");
        }
        assert!(lookup("ls").is_none());
    }
}
