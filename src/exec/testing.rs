//! Scripted backend for tests.

use std::collections::HashMap;

use super::{Backend, Invocation, Sink};
use crate::builtins::{self, Builtin};

/// Canned reply for a scripted command.
#[derive(Debug, Clone)]
struct Response {
    status: i32,
    output: String,
}

/// Backend that records every invocation instead of spawning processes.
///
/// Scripted commands reply with a fixed status and output. Builtins run for
/// real. Anything else reports status 127. Output that is not captured by a
/// substitution accumulates in [`stdout`](Self::stdout); `>` redirects are
/// recorded but never touch the filesystem.
pub struct RecordingBackend {
    invocations: Vec<Invocation>,
    responses: HashMap<String, Response>,
    builtins: HashMap<String, Box<dyn Builtin>>,
    stdout: Vec<u8>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// A recorder with every builtin enabled.
    pub fn new() -> Self {
        let builtins = builtins::NAMES
            .iter()
            .filter_map(|name| builtins::lookup(name).map(|b| (name.to_string(), b)))
            .collect();
        Self {
            invocations: Vec::new(),
            responses: HashMap::new(),
            builtins,
            stdout: Vec::new(),
        }
    }

    /// A recorder with no builtins: every command is recorded or scripted.
    pub fn bare() -> Self {
        Self {
            builtins: HashMap::new(),
            ..Self::new()
        }
    }

    /// Script `name` to print `output` and return `status`.
    pub fn respond(mut self, name: &str, status: i32, output: &str) -> Self {
        self.responses.insert(
            name.to_string(),
            Response {
                status,
                output: output.to_string(),
            },
        );
        self
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Every recorded command line, argv joined with spaces.
    pub fn commands(&self) -> Vec<String> {
        self.invocations.iter().map(|i| i.argv.join(" ")).collect()
    }

    /// Uncaptured output so far.
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

impl Backend for RecordingBackend {
    fn run(&mut self, invocation: &Invocation, sink: Sink<'_>) -> i32 {
        self.invocations.push(invocation.clone());
        let out = match sink {
            Sink::Capture(buf) => buf,
            Sink::Inherit => &mut self.stdout,
        };
        if let Some(response) = self.responses.get(invocation.name()) {
            out.extend_from_slice(response.output.as_bytes());
            return response.status;
        }
        match self.builtins.get(invocation.name()) {
            Some(builtin) => builtin.run(invocation.args(), out),
            None => super::process::NOT_FOUND,
        }
    }
}
