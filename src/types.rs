use crate::environment::Environment;
use crate::evaluator;
use crate::host::Output;
use derive_more::{Deref, Display};
use itertools::Itertools;
use std::borrow::Borrow;
use std::fmt;
use std::fmt::Formatter;
use std::ops::{RangeFrom, RangeInclusive};
use std::rc::Rc;

pub type Int = i64;
pub type Float = f64;

/// The dynamic type tag of a [`Cell`]. Displays as the name `typeof` reports.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Symbol,
    Int,
    Float,
    Bool,
    String,
    List,
    Proc,
    Null,
}

#[derive(Deref, Display, Debug, PartialEq, Eq, Hash, Clone)]
pub struct Symbol(pub String);

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol(name.into())
    }
}

#[derive(Deref, Debug, Default, PartialEq)]
pub struct CellList(pub Vec<Cell>);

#[derive(Debug, Clone)]
pub enum Arity {
    Between(RangeInclusive<usize>),
    AtLeast(RangeFrom<usize>),
}

#[derive(Debug)]
pub struct BadArgCount {
    pub name: String,
    pub expected: Arity,
    pub got: usize,
}

impl fmt::Display for BadArgCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "when evaluating {} expected {} arguments, but received {} arguments",
            self.name, self.expected, self.got
        )
    }
}

impl Arity {
    pub(crate) const fn exactly(n: usize) -> Self {
        Self::Between(n..=n)
    }

    pub(crate) const fn at_least(n: usize) -> Self {
        Self::AtLeast(n..)
    }

    pub(crate) fn contains(&self, n: usize) -> bool {
        match self {
            Self::Between(range) => range.contains(&n),
            Self::AtLeast(range) => range.contains(&n),
        }
    }

    pub(crate) fn validate_for(&self, n: usize, name: &str) -> Result<(), BadArgCount> {
        match self.contains(n) {
            true => Ok(()),
            false => Err(BadArgCount {
                name: name.into(),
                expected: self.clone(),
                got: n,
            }),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Between(r) => {
                if r.start() == r.end() {
                    write!(f, "exactly {}", r.start())
                } else {
                    write!(f, "from {} to {}", r.start(), r.end())
                }
            }
            Arity::AtLeast(r) => write!(f, "at least {}", r.start),
        }
    }
}

/// A builtin procedure. Builtins that produce output write through the host's [`Output`].
pub struct PrimitiveFn {
    pub name: &'static str,
    pub arity: Arity,
    pub fn_ptr: fn(&[Cell], &mut dyn Output) -> evaluator::Result,
}

impl fmt::Debug for PrimitiveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "primitive function #<{}>", self.name)
    }
}

/// A procedure defined by `defun`.
pub struct Closure {
    pub name: Symbol,
    pub parameters: Vec<Symbol>,
    pub body: Vec<Cell>,
    /// The function-local environment attached at definition time. Only used when
    /// closures share one environment per function.
    pub locals: Rc<Environment>,
}

impl fmt::Debug for Closure {
    // Not derived: the locals may well contain this Closure.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Closure{{name: {}, parameters: ({}), body: {:?}}}",
            self.name,
            self.parameters.iter().join(" "),
            self.body
        )
    }
}

#[derive(Debug, Clone)]
pub enum Proc {
    Primitive(&'static PrimitiveFn),
    Closure(Rc<Closure>),
}

impl Proc {
    pub fn name(&self) -> &str {
        match self {
            Proc::Primitive(f) => f.name,
            Proc::Closure(c) => &c.name,
        }
    }
}

impl PartialEq for Proc {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Proc::Primitive(x), Proc::Primitive(y)) => std::ptr::eq(*x, *y),
            (Proc::Closure(x), Proc::Closure(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Cell {
    Symbol(Symbol),
    Int(Int),
    Float(Float),
    Bool(bool),
    String(String),
    List(Rc<CellList>),
    Proc(Proc),
    Null,
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Null
    }
}

/// A numeric payload, after the Int/Float tag has been checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(Int),
    Float(Float),
}

impl Number {
    pub fn as_float(self) -> Float {
        match self {
            Number::Int(x) => x as Float,
            Number::Float(x) => x,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Number::Float(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMismatch {
    pub expected: &'static str,
    pub got: CellType,
}

impl TypeMismatch {
    pub(crate) fn new(expected: &'static str, got: &Cell) -> Self {
        Self {
            expected,
            got: got.cell_type(),
        }
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} but got {}", self.expected, self.got)
    }
}

impl Cell {
    pub fn cell_type(&self) -> CellType {
        match self {
            Cell::Symbol(_) => CellType::Symbol,
            Cell::Int(_) => CellType::Int,
            Cell::Float(_) => CellType::Float,
            Cell::Bool(_) => CellType::Bool,
            Cell::String(_) => CellType::String,
            Cell::List(_) => CellType::List,
            Cell::Proc(_) => CellType::Proc,
            Cell::Null => CellType::Null,
        }
    }

    pub fn as_int(&self) -> Result<Int, TypeMismatch> {
        match self {
            Cell::Int(x) => Ok(*x),
            _ => Err(TypeMismatch::new("Int", self)),
        }
    }

    pub fn as_number(&self) -> Result<Number, TypeMismatch> {
        match self {
            Cell::Int(x) => Ok(Number::Int(*x)),
            Cell::Float(x) => Ok(Number::Float(*x)),
            _ => Err(TypeMismatch::new("a number", self)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, TypeMismatch> {
        match self {
            Cell::Bool(b) => Ok(*b),
            _ => Err(TypeMismatch::new("Bool", self)),
        }
    }

    pub fn as_string(&self) -> Result<&str, TypeMismatch> {
        match self {
            Cell::String(s) => Ok(s),
            _ => Err(TypeMismatch::new("String", self)),
        }
    }

    pub fn as_list(&self) -> Result<&[Cell], TypeMismatch> {
        match self {
            Cell::List(x) => Ok(x),
            _ => Err(TypeMismatch::new("List", self)),
        }
    }

    pub fn as_symbol(&self) -> Result<&Symbol, TypeMismatch> {
        match self {
            Cell::Symbol(s) => Ok(s),
            _ => Err(TypeMismatch::new("Symbol", self)),
        }
    }

    pub fn as_proc(&self) -> Result<&Proc, TypeMismatch> {
        match self {
            Cell::Proc(p) => Ok(p),
            _ => Err(TypeMismatch::new("Proc", self)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl Cell {
    pub fn new_list() -> Self {
        Self::List(Rc::new(CellList::default()))
    }

    pub fn wrap_list(elements: Vec<Cell>) -> Self {
        Self::List(Rc::new(CellList(elements)))
    }

    pub fn new_symbol(name: &str) -> Self {
        Self::Symbol(Symbol::from(name))
    }

    pub fn new_string(text: &str) -> Self {
        Self::String(text.into())
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        use Cell::*;
        match (self, other) {
            (Symbol(x), Symbol(y)) => x == y,
            (Int(x), Int(y)) => x == y,
            (Float(x), Float(y)) => x == y,
            (Bool(x), Bool(y)) => x == y,
            (String(x), String(y)) => x == y,
            (List(x), List(y)) => x == y,
            (Proc(x), Proc(y)) => x == y,
            (Null, Null) => true,
            (_, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_access_checks_the_tag() {
        assert_eq!(Cell::Int(3).as_int(), Ok(3));
        assert_eq!(
            Cell::Float(3.0).as_int(),
            Err(TypeMismatch {
                expected: "Int",
                got: CellType::Float
            })
        );
        assert_eq!(
            Cell::Null.as_bool().unwrap_err().got,
            CellType::Null
        );
        assert!(Cell::new_string("x").as_list().is_err());
    }

    #[test]
    fn equality_is_by_type_and_value() {
        assert_eq!(Cell::Int(1), Cell::Int(1));
        assert_ne!(Cell::Int(1), Cell::Float(1.0));
        assert_ne!(Cell::new_string("a"), Cell::new_symbol("a"));
        assert_eq!(
            Cell::wrap_list(vec![Cell::Int(1), Cell::Null]),
            Cell::wrap_list(vec![Cell::Int(1), Cell::Null])
        );
        assert_ne!(
            Cell::wrap_list(vec![Cell::Int(1)]),
            Cell::wrap_list(vec![Cell::Int(1), Cell::Int(2)])
        );
    }

    #[test]
    fn type_names() {
        assert_eq!(Cell::Null.cell_type().to_string(), "Null");
        assert_eq!(Cell::new_list().cell_type().to_string(), "List");
        assert_eq!(Cell::Float(0.5).cell_type().to_string(), "Float");
    }

    #[test]
    fn arity_messages() {
        let err = Arity::exactly(2).validate_for(3, "get").unwrap_err();
        assert_eq!(
            err.to_string(),
            "when evaluating get expected exactly 2 arguments, but received 3 arguments"
        );
        assert!(Arity::at_least(1).validate_for(0, "-").is_err());
        assert!(Arity::Between(1..=19).validate_for(19, "format").is_ok());
    }
}
