// printf-style expansion for the `format` builtin. Each directive consumes the next
// argument; `%%` consumes nothing. Unused trailing arguments are ignored, as printf does.

use crate::evaluator;
use crate::printer::{pr_str, PrintMode};
use crate::types::{Cell, Float, Int, TypeMismatch};
use regex::{Captures, Match, Regex};
use std::convert::TryFrom;
use std::fmt;

/// The format string plus at most this many arguments, counted together.
pub const MAX_FORMAT_ARITY: usize = 19;

/// Largest width or precision a directive may ask for.
pub const MAX_FIELD_WIDTH: usize = 4096;

#[derive(Debug, PartialEq)]
pub enum FormatError {
    MissingArgument(String),
    UnknownConversion(String),
    FieldTooWide(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MissingArgument(d) => write!(f, "no argument left for directive {}", d),
            FormatError::UnknownConversion(d) => write!(f, "unknown format directive {}", d),
            FormatError::FieldTooWide(d) => write!(
                f,
                "directive {} asks for more than {} characters",
                d, MAX_FIELD_WIDTH
            ),
        }
    }
}

#[derive(Debug, Default)]
struct Directive {
    left_justify: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    alternate: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

impl Directive {
    fn from_captures(caps: &Captures<'_>, text: &str) -> Result<Self, FormatError> {
        let mut directive = Directive::default();
        for flag in caps.get(1).map_or("", |m| m.as_str()).chars() {
            match flag {
                '-' => directive.left_justify = true,
                '0' => directive.zero_pad = true,
                '+' => directive.plus_sign = true,
                ' ' => directive.space_sign = true,
                '#' => directive.alternate = true,
                _ => {}
            }
        }
        directive.width = field_size(caps.get(2), text)?.unwrap_or(0);
        directive.precision = field_size(caps.get(3), text)?;
        directive.conversion = caps
            .get(4)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or('\0');
        Ok(directive)
    }

    fn render(&self, arg: &Cell, text: &str) -> evaluator::Result<String> {
        let body = match self.conversion {
            's' => {
                let rendered = pr_str(arg, PrintMode::Directly);
                match self.precision {
                    Some(p) => rendered.chars().take(p).collect(),
                    None => rendered,
                }
            }
            'd' | 'i' => {
                let n = integer_of(arg)?;
                self.signed(n.to_string(), n < 0)
            }
            'f' | 'F' => {
                let x = float_of(arg)?;
                let digits = format!("{:.*}", self.precision.unwrap_or(6), x.abs());
                self.signed(digits, x.is_sign_negative() && x != 0.0)
            }
            'e' | 'E' => {
                let x = float_of(arg)?;
                let digits = c_exponent(x.abs(), self.precision.unwrap_or(6));
                let digits = match self.conversion {
                    'E' => digits.to_uppercase(),
                    _ => digits,
                };
                self.signed(digits, x.is_sign_negative() && x != 0.0)
            }
            'x' => self.prefixed("0x", format!("{:x}", integer_of(arg)?)),
            'X' => self.prefixed("0X", format!("{:X}", integer_of(arg)?)),
            'o' => self.prefixed("0", format!("{:o}", integer_of(arg)?)),
            'c' => character_of(arg)?.to_string(),
            _ => {
                return Err(evaluator::Error::Format(FormatError::UnknownConversion(
                    text.into(),
                )))
            }
        };
        Ok(self.pad(body))
    }

    fn is_numeric(&self) -> bool {
        "diuxXofFeE".contains(self.conversion)
    }

    fn signed(&self, magnitude: String, negative: bool) -> String {
        let magnitude = magnitude.trim_start_matches('-');
        let sign = if negative {
            "-"
        } else if self.plus_sign {
            "+"
        } else if self.space_sign {
            " "
        } else {
            ""
        };
        format!("{}{}", sign, magnitude)
    }

    fn prefixed(&self, prefix: &str, digits: String) -> String {
        match self.alternate {
            true => format!("{}{}", prefix, digits),
            false => digits,
        }
    }

    fn pad(&self, body: String) -> String {
        let len = body.chars().count();
        if len >= self.width {
            return body;
        }
        let fill = self.width - len;
        if self.left_justify {
            format!("{}{}", body, " ".repeat(fill))
        } else if self.zero_pad && self.is_numeric() {
            let sign_len = body
                .chars()
                .take_while(|c| matches!(c, '-' | '+' | ' '))
                .count();
            let (sign, digits) = body.split_at(sign_len);
            format!("{}{}{}", sign, "0".repeat(fill), digits)
        } else {
            format!("{}{}", " ".repeat(fill), body)
        }
    }
}

/// A width or precision. An empty precision (`%.f`) means zero.
fn field_size(m: Option<Match<'_>>, text: &str) -> Result<Option<usize>, FormatError> {
    let digits = match m {
        Some(m) => m.as_str(),
        None => return Ok(None),
    };
    if digits.is_empty() {
        return Ok(Some(0));
    }
    match digits.parse::<usize>() {
        Ok(n) if n <= MAX_FIELD_WIDTH => Ok(Some(n)),
        _ => Err(FormatError::FieldTooWide(text.into())),
    }
}

fn integer_of(arg: &Cell) -> Result<Int, TypeMismatch> {
    match arg {
        Cell::Float(x) => Ok(*x as Int),
        _ => arg.as_int().map_err(|_| TypeMismatch::new("a number", arg)),
    }
}

fn float_of(arg: &Cell) -> Result<Float, TypeMismatch> {
    arg.as_number().map(|n| n.as_float())
}

fn character_of(arg: &Cell) -> Result<char, TypeMismatch> {
    match arg {
        Cell::Int(code) => u32::try_from(*code)
            .ok()
            .and_then(std::char::from_u32)
            .ok_or_else(|| TypeMismatch::new("a character code", arg)),
        Cell::String(s) => s
            .chars()
            .next()
            .ok_or_else(|| TypeMismatch::new("a non-empty String", arg)),
        _ => Err(TypeMismatch::new("Int or String", arg)),
    }
}

/// `%e` the way C prints it: at least two exponent digits, always signed.
fn c_exponent(x: Float, precision: usize) -> String {
    let rust = format!("{:.*e}", precision, x);
    match rust.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => rust,
    }
}

pub(crate) fn sprintf(template: &str, args: &[Cell]) -> evaluator::Result<String> {
    lazy_static! {
        static ref DIRECTIVE_RE: Regex =
            Regex::new(r"%([-+ 0#]*)(\d+)?(?:\.(\d*))?(.?)").expect("directive regex is valid");
    }
    let mut output = String::new();
    let mut args = args.iter();
    let mut last = 0;
    for caps in DIRECTIVE_RE.captures_iter(template) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        output.push_str(&template[last..whole.start()]);
        last = whole.end();

        let directive = Directive::from_captures(&caps, whole.as_str())
            .map_err(evaluator::Error::Format)?;
        if directive.conversion == '%' {
            output.push('%');
            continue;
        }
        let arg = args.next().ok_or_else(|| {
            evaluator::Error::Format(FormatError::MissingArgument(whole.as_str().into()))
        })?;
        output.push_str(&directive.render(arg, whole.as_str())?);
    }
    output.push_str(&template[last..]);
    Ok(output)
}
