use crate::environment::Environment;
use crate::interpreter::{ClosureScoping, Interpreter};
use crate::reader::ReadError;
use crate::special_forms;
use crate::strings::FormatError;
use crate::types::{Arity, BadArgCount, Cell, Closure, Int, PrimitiveFn, Proc, TypeMismatch};
use itertools::Itertools;
use std::fmt;
use std::io;
use std::rc::Rc;

pub type Result<T = Cell> = std::result::Result<T, Error>;

/// When less native stack than this is left, evaluation moves to a new segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Errors that abort evaluation of the current top-level form.
#[derive(Debug)]
pub enum Error {
    Read(ReadError),
    TypeMismatch(TypeMismatch),
    BadArgCount(BadArgCount),
    DivisionByZero(&'static str),
    IndexOutOfRange { index: Int, len: usize },
    UnresolvedImport { name: String, source: io::Error },
    StackOverflow(usize),
    Format(FormatError),
    IOError(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read(ReadError::Tokenizer(e)) => write!(f, "lex error: {}", e),
            Error::Read(e) => write!(f, "parse error: {}", e),
            Error::TypeMismatch(e) => write!(f, "type mismatch: {}", e),
            Error::BadArgCount(e) => write!(f, "arity error: {}", e),
            Error::DivisionByZero(op) => write!(f, "division by zero in {}", op),
            Error::IndexOutOfRange { index, len } => write!(
                f,
                "index out of range: {} not in range [0, {})",
                index, len
            ),
            Error::UnresolvedImport { name, source } => {
                write!(f, "cannot import {:?}: {}", name, source)
            }
            Error::StackOverflow(limit) => write!(
                f,
                "stack overflow: evaluation nested more than {} deep",
                limit
            ),
            Error::Format(e) => write!(f, "format error: {}", e),
            Error::IOError(e) => write!(f, "io error: {}", e),
        }
    }
}

impl From<TypeMismatch> for Error {
    fn from(t: TypeMismatch) -> Self {
        Self::TypeMismatch(t)
    }
}

impl From<BadArgCount> for Error {
    fn from(e: BadArgCount) -> Self {
        Self::BadArgCount(e)
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IOError(e)
    }
}

/// Problems that are reported but do not stop evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A list whose head did not evaluate to a procedure. The call evaluated to Null.
    UndefinedProcedure(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UndefinedProcedure(name) => write!(f, "symbol {} undefined", name),
        }
    }
}

pub(crate) fn pretty_print_args(args: &[Cell]) -> String {
    match args.len() {
        0 => "no args".into(),
        1 => args[0].to_string(),
        _ => format!("\n\t{}", args.iter().join("\n\t")),
    }
}

impl Interpreter {
    /// Evaluate one form. `env` is the local environment; the global environment is the
    /// fallback for every lookup that misses it.
    pub fn eval(&mut self, cell: &Cell, env: &Rc<Environment>) -> Result {
        if self.depth >= self.config.max_depth {
            return Err(Error::StackOverflow(self.config.max_depth));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.eval_inner(cell, env)
        });
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, cell: &Cell, env: &Rc<Environment>) -> Result {
        match cell {
            Cell::Symbol(name) => Ok(self.resolve(name, env)),
            Cell::List(list) => match list.split_first() {
                None => Ok(Cell::Null),
                Some((head, args)) => self.eval_list(head, args, env),
            },
            _ => Ok(cell.clone()),
        }
    }

    /// Look `name` up locally, then globally. Unbound names are Null, silently.
    pub fn resolve(&self, name: &str, env: &Rc<Environment>) -> Cell {
        env.get(name)
            .or_else(|| self.global.get(name))
            .unwrap_or(Cell::Null)
    }

    fn eval_list(&mut self, head: &Cell, args: &[Cell], env: &Rc<Environment>) -> Result {
        if let Cell::Symbol(name) = head {
            match name.as_str() {
                "import" => return special_forms::apply_import(self, args),
                "set" => return special_forms::apply_set(self, args, env),
                "setg" => return special_forms::apply_setg(self, args, env),
                "if" => return special_forms::apply_if(self, args, env),
                "while" => return special_forms::apply_while(self, args, env),
                "defun" => return special_forms::apply_defun(args, env),
                "eval" => return special_forms::apply_eval(self, args, env),
                "typeof" => return special_forms::apply_typeof(self, args, env),
                // Any other head is a procedure call, handled below.
                _ => (),
            }
        }
        let callable = match self.eval(head, env)? {
            Cell::Proc(p) => p,
            _ => {
                self.report(Diagnostic::UndefinedProcedure(head.to_string()));
                return Ok(Cell::Null);
            }
        };
        let args = self.evaluate_sequence_elementwise(args, env)?;
        self.apply(&callable, &args)
    }

    pub fn evaluate_sequence_elementwise(
        &mut self,
        seq: &[Cell],
        env: &Rc<Environment>,
    ) -> Result<Vec<Cell>> {
        seq.iter().map(|cell| self.eval(cell, env)).collect()
    }

    pub fn apply(&mut self, callable: &Proc, args: &[Cell]) -> Result {
        match callable {
            Proc::Primitive(f) => self.call_primitive(f, args),
            Proc::Closure(f) => self.call_closure(f, args),
        }
    }

    fn call_primitive(&mut self, func: &PrimitiveFn, args: &[Cell]) -> Result {
        func.arity.validate_for(args.len(), func.name)?;
        log::trace!("Call {} with {}", func.name, pretty_print_args(args));
        let result = (func.fn_ptr)(args, self.output.as_mut());
        match &result {
            Ok(val) => log::trace!("Call to {} resulted in {}", func.name, val),
            Err(e) => log::trace!("Call to {} failed: {}", func.name, e),
        }
        result
    }

    fn call_closure(&mut self, func: &Closure, args: &[Cell]) -> Result {
        Arity::exactly(func.parameters.len()).validate_for(args.len(), &func.name)?;
        log::trace!("Call {} with {}", func.name, pretty_print_args(args));
        let locals = match self.config.closure_scoping {
            ClosureScoping::FreshPerCall => Environment::new(),
            ClosureScoping::SharedPerFunction => {
                func.locals.clear();
                func.locals.clone()
            }
        };
        for (key, value) in func.parameters.iter().zip(args) {
            locals.set(key.clone(), value.clone());
        }
        let mut last = Cell::Null;
        for form in &func.body {
            last = self.eval(form, &locals)?;
        }
        Ok(last)
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
