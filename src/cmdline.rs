use crate::evaluator;
use crate::host::{Console, FileLoader};
use crate::interpreter::Interpreter;
use crate::printer::{pr_str, PrintMode};
use crate::types::Cell;
use ansi_term::Colour::{Red, Yellow};
use linefeed::{DefaultTerminal, Interface, ReadResult, Terminal};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    IOError(io::Error),
    ScriptFailed { path: String, failures: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IOError(e) => write!(f, "{}", e),
            Error::ScriptFailed { path, failures } => {
                write!(f, "{}: {} form(s) failed", path, failures)
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IOError(e)
    }
}

pub fn setup() -> io::Result<Interface<DefaultTerminal>> {
    let interface = linefeed::Interface::new("tinylisp")?;
    interface.set_prompt("tinylisp> ")?;
    if let Some(path) = history_path() {
        interface.load_history(path).ok();
    };
    Ok(interface)
}

fn history_path() -> Option<PathBuf> {
    match dirs::data_dir() {
        Some(mut path) => {
            path.push(".tinylisp_history");
            Some(path)
        }
        None => None,
    }
}

pub fn save_history<T: Terminal>(interface: &Interface<T>) -> io::Result<()> {
    match history_path() {
        Some(path) => interface.save_history(path),
        None => Ok(()),
    }
}

fn report_error(e: &evaluator::Error) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{} {}", Red.bold().paint("error:"), e);
    } else {
        eprintln!("error: {}", e);
    }
}

fn report_diagnostics(interp: &mut Interpreter) {
    let colour = atty::is(atty::Stream::Stderr);
    for diagnostic in interp.take_diagnostics() {
        if colour {
            eprintln!("{} {}", Yellow.paint("warning:"), diagnostic);
        } else {
            eprintln!("warning: {}", diagnostic);
        }
    }
}

/// Run each form of one line, echoing values in their readable form.
fn rep(interp: &mut Interpreter, line: &str) -> Vec<String> {
    let mut echoed = Vec::new();
    for result in interp.eval_each(line) {
        match result {
            Ok(value) => echoed.push(pr_str(&value, PrintMode::ReadableRepresentation)),
            Err(e) => report_error(&e),
        }
    }
    report_diagnostics(interp);
    echoed
}

pub fn repl<T: Terminal>(
    interface: &Interface<T>,
    mut processor: impl FnMut(&str) -> Vec<String>,
) {
    loop {
        match interface.read_line() {
            Ok(ReadResult::Eof) => break,
            Ok(ReadResult::Signal(sig)) => {
                writeln!(interface, "Received signal {:?}", sig).ok();
            }
            Ok(ReadResult::Input(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                interface.add_history_unique(line.clone());
                for value in processor(&line) {
                    writeln!(interface, "{}", value).ok();
                }
            }
            Err(e) => {
                writeln!(interface, "Error: {}", e).ok();
                break;
            }
        }
    }
}

/// Evaluate a script file form by form. Failing forms are reported and skipped; the run
/// fails overall if any of them did.
pub fn run_script(interp: &mut Interpreter, path: &str) -> Result<(), Error> {
    let source = fs::read_to_string(path)?;
    let mut failures = 0;
    for result in interp.eval_each(&source) {
        if let Err(e) = result {
            failures += 1;
            report_error(&e);
        }
    }
    report_diagnostics(interp);
    match failures {
        0 => Ok(()),
        _ => Err(Error::ScriptFailed {
            path: path.into(),
            failures,
        }),
    }
}

/// `tinylisp [script] [args...]`. The arguments after the script are bound to `args` as a
/// List of Strings.
pub fn launch(args: Vec<String>) -> Result<(), Error> {
    let mut interp = Interpreter::new(FileLoader::default(), Console);
    let script_args = args.iter().skip(2).map(|s| Cell::new_string(s)).collect();
    interp.define("args", Cell::wrap_list(script_args));
    match args.get(1) {
        Some(path) => run_script(&mut interp, path),
        None => {
            let interface = setup()?;
            repl(&interface, |line| rep(&mut interp, line));
            save_history(&interface)?;
            Ok(())
        }
    }
}
