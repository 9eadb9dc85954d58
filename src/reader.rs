use crate::tokens::{tokenize, Token, TokenizerError};
use crate::types::{Cell, Float, Int};
use std::fmt;
use std::iter::Peekable;
use std::vec;

/// Lists nested deeper than this are rejected rather than risking the native stack.
pub const DEFAULT_MAX_READ_DEPTH: usize = 256;

pub type Result<T = Cell> = std::result::Result<T, ReadError>;

#[derive(Debug, PartialEq)]
pub enum ReadError {
    Tokenizer(TokenizerError),
    UnexpectedEof,
    UnexpectedCloseParen,
    BadInt(String),
    BadFloat(String),
    TooDeep(usize),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Tokenizer(e) => write!(f, "{}", e),
            ReadError::UnexpectedEof => write!(f, "unexpected end of input: missing ')'"),
            ReadError::UnexpectedCloseParen => write!(f, "unexpected ')' with no matching '('"),
            ReadError::BadInt(text) => write!(f, "cannot read {:?} as an Int", text),
            ReadError::BadFloat(text) => write!(f, "cannot read {:?} as a Float", text),
            ReadError::TooDeep(limit) => {
                write!(f, "lists nested more than {} deep", limit)
            }
        }
    }
}

impl From<TokenizerError> for ReadError {
    fn from(e: TokenizerError) -> Self {
        ReadError::Tokenizer(e)
    }
}

/// Consumes tokens front to back, one top-level form per call to [`Reader::read_form`].
pub struct Reader<'a> {
    tokens: Peekable<vec::IntoIter<Token<'a>>>,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            max_depth: DEFAULT_MAX_READ_DEPTH,
        }
    }

    pub fn from_source(input: &'a str) -> Result<Self> {
        Ok(Self::new(tokenize(input)?))
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_exhausted(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    pub fn read_form(&mut self) -> Result {
        self.read_form_at(0)
    }

    fn read_form_at(&mut self, depth: usize) -> Result {
        match self.tokens.next() {
            Some(Token::OpenParen) => self.read_list(depth + 1),
            Some(Token::CloseParen) => Err(ReadError::UnexpectedCloseParen),
            Some(Token::StringLiteral(s)) => Ok(Cell::new_string(s)),
            Some(Token::Atom(chars)) => read_atom(chars),
            None => Err(ReadError::UnexpectedEof),
        }
    }

    fn read_list(&mut self, depth: usize) -> Result {
        if depth > self.max_depth {
            return Err(ReadError::TooDeep(self.max_depth));
        }
        let mut elements = Vec::new();
        loop {
            match self.tokens.peek() {
                Some(Token::CloseParen) => {
                    self.tokens.next();
                    break;
                }
                Some(_) => elements.push(self.read_form_at(depth)?),
                None => return Err(ReadError::UnexpectedEof),
            }
        }
        Ok(Cell::wrap_list(elements))
    }
}

impl Iterator for Reader<'_> {
    type Item = Result;

    fn next(&mut self) -> Option<Self::Item> {
        match self.is_exhausted() {
            true => None,
            false => Some(self.read_form()),
        }
    }
}

fn is_number(chars: &str) -> bool {
    let mut it = chars.chars();
    match it.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => it.next().map_or(false, |c| c.is_ascii_digit()),
        _ => false,
    }
}

fn read_atom(chars: &str) -> Result {
    if !is_number(chars) {
        return Ok(Cell::new_symbol(chars));
    }
    if chars.contains('.') {
        chars
            .parse::<Float>()
            .map(Cell::Float)
            .map_err(|_| ReadError::BadFloat(chars.into()))
    } else {
        chars
            .parse::<Int>()
            .map(Cell::Int)
            .map_err(|_| ReadError::BadInt(chars.into()))
    }
}

/// Read the first form in `input`.
pub fn read_str(input: &str) -> Result {
    Reader::from_source(input)?.read_form()
}

/// Read every top-level form in `input`.
pub fn read_all(input: &str) -> Result<Vec<Cell>> {
    Reader::from_source(input)?.collect()
}
