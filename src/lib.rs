pub mod cmdline;
pub mod core;
pub mod environment;
pub mod evaluator;
pub mod host;
pub mod interpreter;
pub mod printer;
pub mod reader;
pub mod special_forms;
pub mod strings;

#[macro_use]
extern crate lazy_static;

pub mod tokens;
pub mod types;

pub use evaluator::{Diagnostic, Error};
pub use host::{Buffer, Console, FileLoader, Loader, MemoryLoader, Output};
pub use interpreter::{ClosureScoping, Config, Interpreter};
pub use types::{Cell, CellType, Proc, TypeMismatch};
