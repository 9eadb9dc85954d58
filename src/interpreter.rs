use crate::environment::Environment;
use crate::evaluator::{Diagnostic, Result};
use crate::host::{Console, FileLoader, Loader, Output};
use crate::reader::{Reader, DEFAULT_MAX_READ_DEPTH};
use crate::types::{Cell, Symbol};
use std::collections::HashSet;
use std::mem;
use std::rc::Rc;

/// How many nested `eval` calls are allowed before giving up with a stack overflow.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Where a `defun` closure keeps its parameters while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureScoping {
    /// Every invocation binds its parameters in a new environment.
    FreshPerCall,
    /// One environment per function, cleared at the start of every invocation. A
    /// recursive call therefore clobbers the caller's parameters once it returns.
    SharedPerFunction,
}

impl Default for ClosureScoping {
    fn default() -> Self {
        ClosureScoping::FreshPerCall
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub max_depth: usize,
    pub max_read_depth: usize,
    pub closure_scoping: ClosureScoping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_read_depth: DEFAULT_MAX_READ_DEPTH,
            closure_scoping: ClosureScoping::default(),
        }
    }
}

/// One interpreter session: the global environment, the set of imported units and the
/// host collaborators. Sessions share nothing with each other.
pub struct Interpreter {
    pub(crate) global: Rc<Environment>,
    pub(crate) imported: HashSet<String>,
    pub(crate) loader: Box<dyn Loader>,
    pub(crate) output: Box<dyn Output>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) config: Config,
    pub(crate) depth: usize,
}

impl Interpreter {
    pub fn new(loader: impl Loader + 'static, output: impl Output + 'static) -> Self {
        Self::with_config(Config::default(), loader, output)
    }

    pub fn with_config(
        config: Config,
        loader: impl Loader + 'static,
        output: impl Output + 'static,
    ) -> Self {
        Self {
            global: Environment::global(),
            imported: HashSet::new(),
            loader: Box::new(loader),
            output: Box::new(output),
            diagnostics: Vec::new(),
            config,
            depth: 0,
        }
    }

    pub fn global(&self) -> &Rc<Environment> {
        &self.global
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind a host-provided value in the global environment.
    pub fn define(&mut self, name: &str, value: Cell) {
        self.global.set(Symbol::from(name), value);
    }

    pub fn is_imported(&self, name: &str) -> bool {
        self.imported.contains(name)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }

    fn reader<'a>(&self, source: &'a str) -> crate::reader::Result<Reader<'a>> {
        Ok(Reader::from_source(source)?.with_max_depth(self.config.max_read_depth))
    }

    /// Read and evaluate every top-level form of `source` in `env`, returning the value of
    /// the last one (Null if there are none). Stops at the first error.
    pub fn eval_source(&mut self, source: &str, env: &Rc<Environment>) -> Result {
        let mut reader = self.reader(source)?;
        let mut last = Cell::Null;
        while !reader.is_exhausted() {
            let form = reader.read_form()?;
            last = self.eval(&form, env)?;
        }
        Ok(last)
    }

    /// Evaluate a whole program against the global environment.
    pub fn eval_program(&mut self, source: &str) -> Result {
        let global = self.global.clone();
        self.eval_source(source, &global)
    }

    /// Like [`Interpreter::eval_program`], but an evaluation error only abandons the form
    /// that raised it. A lex or parse error ends the run, as the entry for the form that
    /// could not be read.
    pub fn eval_each(&mut self, source: &str) -> Vec<Result> {
        let global = self.global.clone();
        let mut reader = match self.reader(source) {
            Ok(reader) => reader,
            Err(e) => return vec![Err(e.into())],
        };
        let mut results = Vec::new();
        while !reader.is_exhausted() {
            match reader.read_form() {
                Ok(form) => results.push(self.eval(&form, &global)),
                Err(e) => {
                    results.push(Err(e.into()));
                    break;
                }
            }
        }
        results
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(FileLoader::default(), Console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Error;
    use crate::host::{Buffer, MemoryLoader};

    fn interpreter() -> Interpreter {
        Interpreter::new(MemoryLoader::new(), Buffer::new())
    }

    #[test]
    fn empty_program_is_null() {
        assert_eq!(interpreter().eval_program("").unwrap(), Cell::Null);
        assert_eq!(interpreter().eval_program("; just a comment").unwrap(), Cell::Null);
    }

    #[test]
    fn program_value_is_the_last_form() {
        assert_eq!(
            interpreter().eval_program("1 2 (+ 1 2)").unwrap(),
            Cell::Int(3)
        );
    }

    #[test]
    fn eval_each_keeps_going_after_an_evaluation_error() {
        let mut interp = interpreter();
        let results = interp.eval_each("(set a 1) (/ 1 0) (set b 2) b");
        assert_eq!(results.len(), 4);
        assert!(matches!(results[1], Err(Error::DivisionByZero("/"))));
        assert!(matches!(&results[3], Ok(Cell::Int(2))));
    }

    #[test]
    fn eval_each_stops_at_a_parse_error() {
        let mut interp = interpreter();
        let results = interp.eval_each("(set a 1) (set b");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Read(_))));
        assert_eq!(interp.global().get("a"), Some(Cell::Int(1)));
    }

    #[test]
    fn eval_each_reports_lex_errors() {
        let results = interpreter().eval_each("(print \"unterminated)");
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::Read(_))));
    }

    #[test]
    fn define_binds_globally() {
        let mut interp = interpreter();
        interp.define("answer", Cell::Int(42));
        assert_eq!(interp.eval_program("answer").unwrap(), Cell::Int(42));
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut first = interpreter();
        let mut second = interpreter();
        first.eval_program("(set shared 1)").unwrap();
        assert_eq!(second.eval_program("shared").unwrap(), Cell::Null);
    }

    #[test]
    fn depth_is_restored_after_errors() {
        let mut interp = interpreter();
        assert!(interp.eval_program("(+ 1 (get (list) 0))").is_err());
        assert_eq!(interp.depth, 0);
    }
}
