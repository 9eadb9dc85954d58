//! The two things the interpreter needs from whoever embeds it: a way to fetch the text of
//! an `import`ed unit, and somewhere to send program output.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::read_to_string;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

pub trait Loader {
    fn load(&self, name: &str) -> io::Result<String>;
}

pub trait Output {
    fn write(&mut self, text: &str) -> io::Result<()>;
}

/// Loads units from the filesystem, relative to `root` if given or the working directory
/// otherwise.
#[derive(Debug, Default, Clone)]
pub struct FileLoader {
    pub root: Option<PathBuf>,
}

impl FileLoader {
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl Loader for FileLoader {
    fn load(&self, name: &str) -> io::Result<String> {
        let path = match &self.root {
            Some(root) => root.join(name),
            None => PathBuf::from(name),
        };
        log::trace!("reading {}", path.display());
        read_to_string(path)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    units: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, source: &str) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: &str, source: &str) {
        self.units.insert(name.into(), source.into());
    }
}

impl Loader for MemoryLoader {
    fn load(&self, name: &str) -> io::Result<String> {
        self.units.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no unit named {}", name))
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Output for Console {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(text.as_bytes())?;
        handle.flush()
    }
}

/// An in-memory sink. Clones share the same text, so a host can keep one handle and give
/// the other to the interpreter.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    text: Rc<RefCell<String>>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn take(&self) -> String {
        self.text.replace(String::new())
    }
}

impl Output for Buffer {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.text.borrow_mut().push_str(text);
        Ok(())
    }
}
