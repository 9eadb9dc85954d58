use crate::core;
use crate::types::{Cell, Proc, Symbol};
use itertools::Itertools;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A flat table from names to values. There is no parent link: lookups that miss the
/// local table fall back to the interpreter's global table and nowhere else.
#[derive(Default)]
pub struct Environment {
    symbols: RefCell<HashMap<Symbol, Cell>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A fresh global environment holding the builtin library and the
    /// `true`/`false`/`null` bindings.
    pub fn global() -> Rc<Self> {
        let env = Self::new();
        for (&name, &func) in core::CORE.iter() {
            env.set(name, Cell::Proc(Proc::Primitive(func)));
        }
        env.set("true", Cell::Bool(true));
        env.set("false", Cell::Bool(false));
        env.set("null", Cell::Null);
        env
    }

    pub fn set<T>(&self, key: T, value: Cell) -> Option<Cell>
    where
        T: Into<Symbol>,
    {
        self.symbols.borrow_mut().insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<Cell> {
        self.symbols.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.symbols.borrow().contains_key(key)
    }

    pub fn clear(&self) {
        self.symbols.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.symbols.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.borrow().is_empty()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.symbols.borrow();
        write!(f, "{{{}}}", symbols.keys().map(|s| s.as_str()).sorted().join(", "))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment{}", self)
    }
}
