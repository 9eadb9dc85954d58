use regex::Regex;
use std::fmt;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Token<'a> {
    OpenParen,
    CloseParen,
    /// The text between the quotes. Backslashes are kept as written.
    StringLiteral(&'a str),
    Atom(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::StringLiteral(s) => write!(f, "\"{}\"", s),
            Token::Atom(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum TokenizerError {
    NoFirstCharacter,
    UnbalancedString,
    NoCapture(String),
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerError::NoFirstCharacter => write!(f, "no characters to parse token from"),
            TokenizerError::UnbalancedString => {
                write!(f, "unterminated string literal: reached end of input")
            }
            TokenizerError::NoCapture(rest) => {
                write!(f, "could not read a token from {:?}", rest)
            }
        }
    }
}

/// `None` for a comment, which produces no token.
fn create_token(captured: &str) -> Result<Option<Token<'_>>, TokenizerError> {
    let bytes = captured.as_bytes();
    let first_char = bytes.first().ok_or(TokenizerError::NoFirstCharacter)?;
    match first_char {
        b'(' => Ok(Some(Token::OpenParen)),
        b')' => Ok(Some(Token::CloseParen)),
        b'"' => tokenize_string_literal(captured).map(Some),
        b';' => {
            log::trace!("skipping comment {}", captured);
            Ok(None)
        }
        _ => Ok(Some(Token::Atom(captured))),
    }
}

fn tokenize_string_literal(captured: &str) -> Result<Token<'_>, TokenizerError> {
    let bytes = captured.as_bytes();
    if bytes.len() == 1 || bytes[bytes.len() - 1] != b'"' {
        return Err(TokenizerError::UnbalancedString);
    }

    // An odd run of backslashes means the final quote was escaped.
    let trailing_backslashes = bytes
        .iter()
        .rev()
        .skip(1)
        .take_while(|&&byte| byte == b'\\')
        .count();
    if trailing_backslashes % 2 == 1 {
        return Err(TokenizerError::UnbalancedString);
    }

    Ok(Token::StringLiteral(&captured[1..captured.len() - 1]))
}

/// Split source text into tokens. Comments are dropped.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, TokenizerError> {
    lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(
            r#"(?x)                          # ignore whitespace in this pattern & allow comments
                \A\s*                        # leading whitespace, ignored
                (                            # token capture group
                    [()]                     # a single paren
                    |"(?:                    # string literal. its contents, not captured, include:
                        \\.                  #    a backslash and whatever follows it
                        |[^\\"]              #    anything which isn't a backslash or a quote
                      )*
                      "?                     #    possibly missing a closing quote
                    |;[^\n]*                 # comment, up to the end of the line
                    |[^\s()]+                # one or more plain characters
                )
            "#
        )
        .expect("token regex is valid");
    }
    let mut input = input.trim_start();
    let mut tokens = Vec::new();
    while !input.is_empty() {
        let caps = TOKEN_RE
            .captures(input)
            .ok_or_else(|| TokenizerError::NoCapture(String::from(input)))?;
        let captured = caps
            .get(1)
            .ok_or_else(|| TokenizerError::NoCapture(String::from(input)))?;
        if let Some(token) = create_token(captured.as_str())? {
            tokens.push(token);
        }
        input = input[captured.end()..].trim_start();
    }
    Ok(tokens)
}
