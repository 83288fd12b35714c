//! Command execution backends.
//!
//! The interpreter hands each fully resolved command to a [`Backend`]. The
//! production backend is [`Executor`]; [`testing::RecordingBackend`] is a
//! scripted double for tests.

/// Child process spawning with redirects.
pub mod process;
/// Scripted test double.
pub mod testing;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::process::Child;

use serde::Serialize;

use crate::builtins::{self, Builtin};
use crate::config::Config;

/// A command ready to run: every word resolved to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Never empty; `argv[0]` is the command name.
    pub argv: Vec<String>,
    pub background: bool,
    /// Path to read standard input from.
    pub input: Option<String>,
    /// Path whose contents standard output replaces.
    pub output: Option<String>,
}

impl Invocation {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            background: false,
            input: None,
            output: None,
        }
    }

    pub fn name(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    /// Shell-quoted rendering for log lines.
    pub fn display(&self) -> String {
        shlex::try_join(self.argv.iter().map(String::as_str))
            .unwrap_or_else(|_| self.argv.join(" "))
    }
}

/// Where a command's standard output goes when it has no `>` redirect.
pub enum Sink<'a> {
    /// The shell's own standard output.
    Inherit,
    /// Collected for a back-tick substitution.
    Capture(&'a mut Vec<u8>),
}

/// Something that can run a resolved command and report its status.
pub trait Backend {
    fn run(&mut self, invocation: &Invocation, sink: Sink<'_>) -> i32;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn run(&mut self, invocation: &Invocation, sink: Sink<'_>) -> i32 {
        (**self).run(invocation, sink)
    }
}

/// Expand `~` in a redirect target.
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}

/// Run a builtin, routing its output to the redirect target or the sink.
pub fn run_builtin(builtin: &dyn Builtin, invocation: &Invocation, sink: Sink<'_>) -> i32 {
    if invocation.input.is_some() {
        log::debug!("{}: builtins ignore input redirects", invocation.name());
    }
    if let Some(path) = &invocation.output {
        let path = expand_path(path);
        let mut file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                log::error!("{path}: {e}");
                return 1;
            }
        };
        return builtin.run(invocation.args(), &mut file);
    }
    match sink {
        Sink::Capture(buf) => builtin.run(invocation.args(), buf),
        Sink::Inherit => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let status = builtin.run(invocation.args(), &mut out);
            if let Err(e) = out.flush() {
                log::warn!("stdout: {e}");
            }
            status
        }
    }
}

/// Production backend: enabled builtins in-process, everything else spawned.
///
/// Background children are kept until they finish and are reaped before each
/// command runs.
pub struct Executor {
    builtins: HashMap<String, Box<dyn Builtin>>,
    jobs: Vec<Child>,
}

impl Executor {
    /// Build the executor from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut builtins: HashMap<String, Box<dyn Builtin>> = HashMap::new();
        for name in &config.builtins.enabled {
            match builtins::lookup(name) {
                Some(builtin) => {
                    builtins.insert(name.clone(), builtin);
                }
                None => log::warn!("config: unknown builtin {name:?}"),
            }
        }
        Self {
            builtins,
            jobs: Vec::new(),
        }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Collect finished background children. Returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        process::reap(&mut self.jobs)
    }

    /// Background children not yet reaped.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }
}

impl Backend for Executor {
    fn run(&mut self, invocation: &Invocation, sink: Sink<'_>) -> i32 {
        self.reap();
        if let Some(builtin) = self.builtins.get(invocation.name()) {
            log::debug!("builtin: {}", invocation.display());
            if invocation.background {
                log::debug!("{}: builtins run in the foreground", invocation.name());
            }
            return run_builtin(builtin.as_ref(), invocation, sink);
        }
        match process::spawn(invocation, sink) {
            process::Spawned::Exited(code) => code,
            process::Spawned::Background(child) => {
                self.jobs.push(child);
                0
            }
        }
    }
}
