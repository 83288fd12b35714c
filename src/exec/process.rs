use std::fs::File;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};

use super::{Invocation, Sink, expand_path};

/// Status for a command that could not be found.
pub const NOT_FOUND: i32 = 127;
/// Status for a command that was found but could not be started.
pub const CANNOT_EXECUTE: i32 = 126;

/// Map a child's exit status to a shell status. Signals become 128 + n.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

fn open_redirect(path: &str, write: bool) -> io::Result<File> {
    let path = expand_path(path);
    if write {
        File::create(path)
    } else {
        File::open(path)
    }
}

/// Result of [`spawn`].
#[derive(Debug)]
pub enum Spawned {
    /// The child ran to completion, or never started.
    Exited(i32),
    /// A background child still running. The caller owns reaping it.
    Background(Child),
}

impl Spawned {
    /// Shell status of the spawn. Background children report 0.
    pub fn status(&self) -> i32 {
        match self {
            Spawned::Exited(code) => *code,
            Spawned::Background(_) => 0,
        }
    }
}

/// Spawn `invocation` as a child process.
///
/// Background children are handed back unwaited. A foreground child writing
/// to a capture sink has its stdout piped and collected.
pub fn spawn(invocation: &Invocation, sink: Sink<'_>) -> Spawned {
    match start(invocation, sink) {
        Ok(spawned) => spawned,
        Err(code) => Spawned::Exited(code),
    }
}

fn start(invocation: &Invocation, sink: Sink<'_>) -> Result<Spawned, i32> {
    let name = invocation.name();
    let mut command = Command::new(name);
    command.args(invocation.args());

    for (target, write) in [(&invocation.input, false), (&invocation.output, true)] {
        let Some(path) = target else { continue };
        match open_redirect(path, write) {
            Ok(file) if write => {
                command.stdout(file);
            }
            Ok(file) => {
                command.stdin(file);
            }
            Err(e) => {
                log::error!("{path}: {e}");
                return Err(1);
            }
        }
    }

    let capture = match sink {
        Sink::Capture(buf) if invocation.output.is_none() && !invocation.background => {
            command.stdout(Stdio::piped());
            Some(buf)
        }
        _ => None,
    };

    log::debug!("spawn: {}", invocation.display());
    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::error!("{name}: command not found");
            return Err(NOT_FOUND);
        }
        Err(e) => {
            log::error!("{name}: {e}");
            return Err(CANNOT_EXECUTE);
        }
    };

    if invocation.background {
        log::info!("[{}] {}", child.id(), invocation.display());
        return Ok(Spawned::Background(child));
    }

    let status = match capture {
        Some(buf) => child.wait_with_output().map(|output| {
            buf.extend_from_slice(&output.stdout);
            output.status
        }),
        None => {
            let mut child = child;
            child.wait()
        }
    };
    match status {
        Ok(status) => {
            let code = exit_code(status);
            log::trace!("{name} exited with {code}");
            Ok(Spawned::Exited(code))
        }
        Err(e) => {
            log::error!("{name}: {e}");
            Err(1)
        }
    }
}

/// Collect every finished child from `jobs`, keeping the ones still running.
/// Returns how many were reaped.
pub fn reap(jobs: &mut Vec<Child>) -> usize {
    let before = jobs.len();
    jobs.retain_mut(|child| match child.try_wait() {
        Ok(Some(status)) => {
            log::debug!("[{}] done with {}", child.id(), exit_code(status));
            false
        }
        Ok(None) => true,
        Err(e) => {
            log::warn!("[{}] {e}", child.id());
            false
        }
    });
    before - jobs.len()
}
