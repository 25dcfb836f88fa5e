use std::convert;
use std::fmt;
use std::result;

use itertools::Itertools;

use super::lexer::{Delimiter, Error as LexerError, Result as LexerResult, Token};

pub type Result<T> = result::Result<T, Error>;

const INITIAL_NESTING_DEPTH: usize = 10;

static QUOTE_CHAR: char = '\'';

/// Datum is the tree the reader produces from source text; the evaluator analyzes it into an `Expr`.
#[derive(Debug, PartialEq, Clone)]
pub enum Datum {
    Number(f64),
    String(String),
    Symbol(String),
    Quote(Box<Datum>),
    List(Vec<Datum>),
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Datum::Number(n) => write!(f, "{}", n),
            Datum::String(s) => write!(f, r#""{}""#, s),
            Datum::Symbol(s) => write!(f, "{}", s),
            Datum::Quote(datum) => write!(f, "{}{}", QUOTE_CHAR, datum),
            Datum::List(nodes) => write!(
                f,
                "{}{}{}",
                Delimiter::Paren.open_char(),
                nodes.iter().format(" "),
                Delimiter::Paren.close_char()
            ),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// UnbalancedDelimiter indicates a delimiter that does not match the other delimiter in the pair of Open and Close. Returns an index into the token stream where the imbalance occurs.
    UnbalancedDelimiter(Delimiter, usize),
    UnbalancedString(usize),
    UnrecognizedToken(usize, char),
    InvalidNumber(String),
    /// MissingQuotedForm points at a quote token with no datum after it.
    MissingQuotedForm(usize),
    Internal,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnbalancedDelimiter(delimiter, index) => write!(
                f,
                "unbalanced `{}{}` at token {}",
                delimiter.open_char(),
                delimiter.close_char(),
                index
            ),
            Error::UnbalancedString(index) => write!(f, "unterminated string starting at byte {}", index),
            Error::UnrecognizedToken(index, ch) => {
                write!(f, "unrecognized character {:?} at byte {}", ch, index)
            }
            Error::InvalidNumber(text) => write!(f, "invalid number `{}`", text),
            Error::MissingQuotedForm(index) => write!(f, "nothing to quote after token {}", index),
            Error::Internal => write!(f, "internal reader error"),
        }
    }
}

impl std::error::Error for Error {}

impl convert::From<LexerError> for Error {
    fn from(lexer_error: LexerError) -> Self {
        match lexer_error {
            LexerError::UnrecognizedToken(index, ch) => Error::UnrecognizedToken(index, ch),
            LexerError::UnbalancedString(index) => Error::UnbalancedString(index),
            LexerError::Internal => Error::Internal,
        }
    }
}

pub struct Parser {
    /// token indices of the currently open parens, innermost last
    open_indices: Vec<usize>,
    token_index: Option<usize>,
}

impl<'a> Parser {
    pub fn new() -> Self {
        Self {
            open_indices: Vec::with_capacity(INITIAL_NESTING_DEPTH),
            token_index: None,
        }
    }

    /// parse_tokens takes an `Iterator` over `LexerResult<Token>` and attempts to parse every top-level datum from them.
    // NOTE: we require a `&mut T` so that we can recurse over the token stream. The borrowing could be simplified with
    // `&mut tokens` but then the compiler hits a recursion limit while attempting to monomorphize the function.
    pub fn parse_tokens<T>(&mut self, tokens: &mut T) -> Result<Vec<Datum>>
    where
        T: Iterator<Item = LexerResult<Token<'a>>>,
    {
        let mut nodes = vec![];

        while let Some(node) = self.parse_datum(tokens)? {
            nodes.push(node);
        }

        Ok(nodes)
    }

    /// parse_datum reads the next datum from `tokens`. Returns `None` at the end of input or at the `)` closing the
    /// list currently being read.
    fn parse_datum<T>(&mut self, tokens: &mut T) -> Result<Option<Datum>>
    where
        T: Iterator<Item = LexerResult<Token<'a>>>,
    {
        while let Some(result) = tokens.next() {
            let index = self.increment_token_index();

            let token = result?;
            let node = match token {
                Token::Open(delimiter) => self.parse_seq(delimiter, index, tokens)?,
                Token::Close(delimiter) => {
                    return match self.open_indices.pop() {
                        Some(_) => Ok(None),
                        None => Err(Error::UnbalancedDelimiter(delimiter, index)),
                    };
                }
                Token::Number(input) => self.parse_number(input)?,
                Token::String(input) => Datum::String(input.into()),
                Token::Comment(_) => continue,
                Token::Symbol(input) => self.parse_symbol(input),
                Token::Quote => self.parse_quote(index, tokens)?,
            };

            return Ok(Some(node));
        }

        Ok(None)
    }

    fn increment_token_index(&mut self) -> usize {
        let index = self.token_index.map_or(0, |index| index + 1);
        self.token_index = Some(index);
        index
    }

    fn parse_seq<T>(&mut self, delimiter: Delimiter, index: usize, tokens: &mut T) -> Result<Datum>
    where
        T: Iterator<Item = LexerResult<Token<'a>>>,
    {
        self.open_indices.push(index);
        let depth = self.open_indices.len();

        let mut nodes = vec![];
        while let Some(node) = self.parse_datum(tokens)? {
            nodes.push(node);
        }

        // the closing token pops our entry; still being open means we ran out of input
        if self.open_indices.len() >= depth {
            return Err(Error::UnbalancedDelimiter(delimiter, index));
        }

        Ok(Datum::List(nodes))
    }

    fn parse_quote<T>(&mut self, index: usize, tokens: &mut T) -> Result<Datum>
    where
        T: Iterator<Item = LexerResult<Token<'a>>>,
    {
        self.parse_datum(tokens)?
            .map(|datum| Datum::Quote(Box::new(datum)))
            .ok_or(Error::MissingQuotedForm(index))
    }

    fn parse_number(&mut self, value: &str) -> Result<Datum> {
        value
            .parse()
            .map(Datum::Number)
            .map_err(|_| Error::InvalidNumber(value.into()))
    }

    fn parse_symbol(&mut self, value: &str) -> Datum {
        if Parser::is_signed_number(value) {
            if let Ok(number) = value.parse() {
                return Datum::Number(number);
            }
        }
        Datum::Symbol(value.into())
    }

    fn is_signed_number(value: &str) -> bool {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some('-'), Some(ch)) | (Some('+'), Some(ch)) => ch.is_ascii_digit(),
            _ => false,
        }
    }
}
