//! tinysh command-line driver.
//!
//! Without FILE or `-c` it reads one line at a time from stdin, parses and
//! runs it, reports parse errors and carries on. With FILE or `-c` the program
//! is parsed and run one top-level pipeline at a time and the first parse
//! error aborts the rest.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use tinysh::config::{Config, Settings};
use tinysh::eval::{Interpreter, Variables};
use tinysh::exec::Executor;
use tinysh::logging;
use tinysh::parse::{self, CharSource, Pipeline, ReaderSource, Scanner, StrSource};

/// Exit status when a batch program fails to parse.
const PARSE_FAILURE: i32 = 2;

#[derive(Parser)]
#[command(name = "tinysh")]
#[command(about = "A small shell with if/for/while and back-tick substitution")]
#[command(version)]
struct Cli {
    /// Script file to run; interactive when omitted
    #[arg()]
    file: Option<PathBuf>,

    /// Run COMMAND instead of reading a file or stdin
    #[arg(short = 'c', value_name = "COMMAND", conflicts_with = "file")]
    command: Option<String>,

    /// Print the parsed program as JSON and exit without running it
    #[arg(long = "dump-ast")]
    dump_ast: bool,

    /// Print each pipeline as normalized source before running it
    #[arg(long = "print-ast")]
    print_ast: bool,

    /// Stop `while` loops after N iterations (0 = unlimited)
    #[arg(long = "loop-limit", value_name = "N")]
    loop_limit: Option<usize>,

    /// Raise the log level; repeatable
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// Shell state shared by every pipeline of a session.
struct Session {
    settings: Settings,
    vars: Variables,
    executor: Executor,
    status: i32,
}

impl Session {
    fn new(config: Config) -> Self {
        let vars = Variables::from_config(&config);
        let executor = Executor::from_config(&config);
        Self {
            settings: config.settings,
            vars,
            executor,
            status: 0,
        }
    }

    fn execute(&mut self, pipeline: &Pipeline) {
        if self.settings.print_ast {
            println!("{pipeline}");
        } else {
            log::debug!("run: {pipeline}");
        }
        self.status = Interpreter::new(&mut self.vars, &mut self.executor)
            .with_loop_limit(self.settings.loop_limit)
            .eval_pipeline(pipeline);
    }

    fn parser<S: CharSource>(&self, source: S) -> parse::Parser<S> {
        parse::Parser::from_scanner(Scanner::with_timeout(source, self.settings.read_timeout()))
    }

    /// Run pipelines as they parse; stop at the first parse error.
    fn run_batch<S: CharSource>(&mut self, source: S) -> i32 {
        let mut parser = self.parser(source);
        while let Some(result) = parser.next_pipeline() {
            match result {
                Ok(pipeline) => self.execute(&pipeline),
                Err(e) => {
                    report(&e);
                    return PARSE_FAILURE;
                }
            }
        }
        self.status
    }

    /// Prompt, read a line, run it; repeat until end of input.
    fn run_interactive(&mut self) -> i32 {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            self.executor.reap();
            print!("{} ", self.settings.prompt);
            let _ = io::stdout().flush();

            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    log::error!("stdin: {e}");
                    break;
                }
            }

            let mut parser = self.parser(StrSource::new(&line));
            while let Some(result) = parser.next_pipeline() {
                match result {
                    Ok(pipeline) => self.execute(&pipeline),
                    Err(e) => {
                        report(&e);
                        parser.recover();
                    }
                }
            }
        }
        println!();
        self.status
    }
}

fn report(err: &parse::ParseError) {
    eprintln!("tinysh: {err}");
    log::debug!("parse error: {err:?}");
}

/// Clamp a shell status into the range a process can exit with.
fn exit_code(status: i32) -> i32 {
    status.clamp(0, 255)
}

/// Read the whole program for `--dump-ast`.
fn read_program(cli: &Cli) -> io::Result<String> {
    if let Some(text) = &cli.command {
        return Ok(text.clone());
    }
    match &cli.file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn dump_ast(cli: &Cli) -> i32 {
    let text = match read_program(cli) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("tinysh: cannot read program: {e}");
            return 1;
        }
    };
    let program = match parse::parse(&text) {
        Ok(program) => program,
        Err(e) => {
            report(&e);
            return PARSE_FAILURE;
        }
    };
    match serde_json::to_string_pretty(&program) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("tinysh: {e}");
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut config = Config::load();
    if cli.print_ast {
        config.settings.print_ast = true;
    }
    if let Some(limit) = cli.loop_limit {
        config.settings.loop_limit = limit;
    }
    logging::init(&config.settings, cli.verbose);

    if cli.dump_ast {
        std::process::exit(dump_ast(&cli));
    }

    let mut session = Session::new(config);
    let status = if let Some(text) = &cli.command {
        session.run_batch(StrSource::new(text))
    } else if let Some(path) = &cli.file {
        match File::open(path) {
            Ok(file) => session.run_batch(ReaderSource::new(BufReader::new(file))),
            Err(e) => {
                eprintln!("tinysh: {}: {e}", path.display());
                std::process::exit(if e.kind() == io::ErrorKind::NotFound { 127 } else { 126 });
            }
        }
    } else {
        session.run_interactive()
    };

    std::process::exit(exit_code(status));
}
