use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::Settings;

/// Directory holding the optional log file.
const LOG_DIR: &str = "~/.local/share/tinysh";

/// Resolve the effective level: the configured one raised once per `-v`.
pub fn level(settings: &Settings, verbose: u8) -> LevelFilter {
    let configured = LevelFilter::from_str(&settings.log_level).unwrap_or_else(|_| {
        eprintln!("tinysh: unknown log_level {:?}, using warn", settings.log_level);
        LevelFilter::Warn
    });
    let levels = LevelFilter::iter().collect::<Vec<_>>();
    let index = levels
        .iter()
        .position(|l| *l == configured)
        .unwrap_or_default();
    levels[(index + verbose as usize).min(levels.len() - 1)]
}

/// Path of the log file, ~/.local/share/tinysh/tinysh.log.
pub fn log_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(LOG_DIR).as_ref()).join("tinysh.log")
}

/// Install the global logger: stderr always, plus the log file when
/// `log_file` is set. Best-effort: a logger that cannot be set up is skipped
/// and never stops the shell.
pub fn init(settings: &Settings, verbose: u8) {
    let level = level(settings, verbose);
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if settings.log_file {
        let path = log_path();
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => loggers.push(WriteLogger::new(level, ConfigBuilder::new().build(), file)),
            Err(e) => eprintln!("tinysh: cannot open {}: {e}", path.display()),
        }
    }

    let _ = CombinedLogger::init(loggers);
}
