use crate::types::{Cell, Float};
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// What `print`, `strcat` and friends show: strings raw, lists as `( a, b )`.
    Directly,
    /// Source text that evaluates back to an equal value.
    ReadableRepresentation,
}

pub fn pr_str(cell: &Cell, mode: PrintMode) -> String {
    match (cell, mode) {
        (Cell::Int(value), _) => value.to_string(),
        (Cell::Float(value), PrintMode::Directly) => format!("{:.6}", value),
        (Cell::Float(value), PrintMode::ReadableRepresentation) => float_repr(*value),
        (Cell::Bool(value), _) => value.to_string(),
        (Cell::String(s), PrintMode::Directly) => s.clone(),
        (Cell::String(s), PrintMode::ReadableRepresentation) => format!("\"{}\"", s),
        (Cell::Null, PrintMode::Directly) => String::from("Null"),
        (Cell::Null, PrintMode::ReadableRepresentation) => String::from("null"),
        (Cell::Symbol(name), _) => name.to_string(),
        (Cell::Proc(p), _) => p.name().to_string(),
        (Cell::List(elements), PrintMode::Directly) => format!(
            "( {} )",
            elements.iter().map(|e| pr_str(e, mode)).join(", ")
        ),
        (Cell::List(elements), PrintMode::ReadableRepresentation) => {
            if elements.is_empty() {
                String::from("(list)")
            } else {
                format!(
                    "(list {})",
                    elements.iter().map(|e| pr_str(e, mode)).join(" ")
                )
            }
        }
    }
}

fn float_repr(value: Float) -> String {
    let text = value.to_string();
    // Keep a '.' so the reader sees a Float again.
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", pr_str(self, PrintMode::Directly))
    }
}
