use std::collections::HashSet;
use std::iter;
use std::result;
use std::str;

use lazy_static::lazy_static;

const OPEN_PAREN: char = '(';
const CLOSE_PAREN: char = ')';
const COMMENT_CHAR: char = ';';
const STRING_CHAR: char = '"';
const NEWLINE_CHAR: char = '\n';
const QUOTE_CHAR: char = '\'';
const DECIMAL_POINT: char = '.';

lazy_static! {
    /// SPECIAL_CHARS are characters indicative of a non-symbolic atom
    static ref SPECIAL_CHARS: HashSet<char> = {
        let mut set = HashSet::new();

        set.insert(OPEN_PAREN);
        set.insert(CLOSE_PAREN);
        set.insert(COMMENT_CHAR);
        set.insert(STRING_CHAR);
        set.insert(NEWLINE_CHAR);
        set.insert(QUOTE_CHAR);

        set
    };
}

/// Result binds the std::result::Result::Err type to this module's error type.
pub type Result<T> = result::Result<T, Error>;

/// lex is a convenience function to take some `input` and produce the resulting `Vec<Token>`.
pub fn lex(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokens()
}

#[derive(Debug, PartialEq, Clone)]
/// Error represents an error the lexer encountered while lexing.
pub enum Error {
    /// UnrecognizedToken points to the byte in the input stream where an unrecognized token was found
    UnrecognizedToken(usize, char),
    /// UnbalancedString points to the byte in the input stream where an unbalanced string began
    UnbalancedString(usize),
    // Internal represents a bug in the internal consistency of this module's logic.
    // We know a subsequent lex will succeed after checking with `peek` but still need an Option for other failable lexes.
    Internal,
}

#[derive(Debug, PartialEq)]
/// Token represents an atomic component of this language's syntax.
pub enum Token<'input> {
    Open(Delimiter),
    Close(Delimiter),
    Number(&'input str),
    String(&'input str),
    Comment(&'input str),
    Symbol(&'input str),
    Quote,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Delimiter {
    Paren, // ()
}

impl Delimiter {
    pub fn open_char(self) -> char {
        match self {
            Delimiter::Paren => OPEN_PAREN,
        }
    }

    pub fn close_char(self) -> char {
        match self {
            Delimiter::Paren => CLOSE_PAREN,
        }
    }
}

/// Lexer contains the logic to lex individual tokens from the input source.
#[derive(Debug)]
pub struct Lexer<'input> {
    input: &'input str,
    iter: iter::Peekable<str::CharIndices<'input>>,
}

impl<'input> Lexer<'input> {
    /// new constructs a Lexer instance from the input but does not do any lexing.
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            iter: input.char_indices().peekable(),
        }
    }

    /// tokens is a convenience method that returns the tokens lexed from the input stream.
    fn tokens(self) -> Result<Vec<Token<'input>>> {
        self.collect::<result::Result<Vec<_>, _>>()
    }

    /// advance_if advances the state of the lexer while the upcoming chars satisfy the `predicate`. Returns the
    /// byte span `[start, end)` in the `input` that was advanced over; returns None if nothing matched.
    fn advance_if<P>(&mut self, predicate: P) -> Option<(usize, usize)>
    where
        P: Fn(char) -> bool,
    {
        let start = match self.peek() {
            Some(&(index, ch)) if predicate(ch) => index,
            _ => return None,
        };
        let mut end = start;

        while let Some(&(index, ch)) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.consume();
            end = index + ch.len_utf8();
        }

        Some((start, end))
    }

    /// consume advances the state of the lexer to the next char, yielding an Option of the current char from the input source
    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }

    /// peek returns the next element in the iterator without consuming it
    fn peek(&mut self) -> Option<&(usize, char)> {
        self.iter.peek()
    }

    /// take_while advances the input while `predicate` is true and then returns a str slice of the traversed span.
    fn take_while<P>(&mut self, predicate: P) -> Option<&'input str>
    where
        P: Fn(char) -> bool,
    {
        let input = self.input;
        self.advance_if(predicate)
            .map(|(start, end)| &input[start..end])
    }

    fn consume_delimiter<T>(&mut self, token: T, delimiter: Delimiter) -> Result<Token<'input>>
    where
        T: Fn(Delimiter) -> Token<'input>,
    {
        self.consume();
        Ok(token(delimiter))
    }

    fn is_numeric(ch: char) -> bool {
        ch.is_ascii_digit()
    }

    fn is_number_body(ch: char) -> bool {
        ch.is_ascii_digit() || ch == DECIMAL_POINT
    }

    // a digit only starts a number when the whole symbolic run is digits and points, so `2nd` and `1+` stay names
    fn consume_numeric(&mut self) -> Result<Token<'input>> {
        self.take_while(Lexer::is_symbolic)
            .map(|run| {
                if run.chars().all(Lexer::is_number_body) {
                    Token::Number(run)
                } else {
                    Token::Symbol(run)
                }
            })
            .ok_or(Error::Internal)
    }

    // use a naive test to lex a string literal
    // ... just to the next `STRING_CHAR`
    fn is_string_literal(ch: char) -> bool {
        ch != STRING_CHAR
    }

    fn consume_string(&mut self) -> Result<Token<'input>> {
        let (start, _) = self.consume().ok_or(Error::Internal)?;
        let body_start = start + STRING_CHAR.len_utf8();
        let value = self.take_while(Lexer::is_string_literal);

        match self.peek() {
            Some(&(end, ch)) if ch == STRING_CHAR => {
                self.consume();
                Ok(Token::String(
                    value.unwrap_or(&self.input[body_start..end]),
                ))
            }
            _ => Err(Error::UnbalancedString(start)),
        }
    }

    fn consume_comment(&mut self) -> Result<Token<'input>> {
        self.consume();
        Ok(Token::Comment(
            self.take_while(|ch| ch != NEWLINE_CHAR).unwrap_or(""),
        ))
    }

    fn is_symbolic(ch: char) -> bool {
        (ch.is_alphanumeric() || ch.is_ascii_punctuation())
            && !SPECIAL_CHARS.contains(&ch)
            && !Lexer::is_whitespace(ch)
    }

    fn consume_symbol(&mut self) -> Result<Token<'input>> {
        self.take_while(Lexer::is_symbolic)
            .map(Token::Symbol)
            .ok_or(Error::Internal)
    }

    fn is_whitespace(ch: char) -> bool {
        ch.is_whitespace() || ch == ','
    }

    fn consume_quote(&mut self) -> Result<Token<'input>> {
        self.consume().map(|_| Token::Quote).ok_or(Error::Internal)
    }
}

impl<'a> iter::Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance_if(Lexer::is_whitespace);

        let next_token = match self.peek() {
            None => return None,
            // The order is important here
            Some(&(_, QUOTE_CHAR)) => self.consume_quote(),
            Some(&(_, OPEN_PAREN)) => self.consume_delimiter(Token::Open, Delimiter::Paren),
            Some(&(_, CLOSE_PAREN)) => self.consume_delimiter(Token::Close, Delimiter::Paren),
            Some(&(_, ch)) if Lexer::is_numeric(ch) => self.consume_numeric(),
            Some(&(_, STRING_CHAR)) => self.consume_string(),
            Some(&(_, COMMENT_CHAR)) => self.consume_comment(),
            Some(&(_, ch)) if Lexer::is_symbolic(ch) => self.consume_symbol(),
            Some(&(index, ch)) => Err(Error::UnrecognizedToken(index, ch)),
        };
        Some(next_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_lex_test(input: &str, expected_tokens: Vec<Token>) {
        let tokens = lex(input).unwrap();
        assert_eq!(expected_tokens, tokens);
    }

    #[test]
    fn can_lex_parens() {
        run_lex_test("", vec![]);
        run_lex_test("()", vec![Token::Open(Delimiter::Paren), Token::Close(Delimiter::Paren)]);
        run_lex_test(
            "(())",
            vec![
                Token::Open(Delimiter::Paren),
                Token::Open(Delimiter::Paren),
                Token::Close(Delimiter::Paren),
                Token::Close(Delimiter::Paren),
            ],
        );
    }

    #[test]
    fn can_lex_numbers() {
        run_lex_test("3", vec![Token::Number("3")]);
        run_lex_test("42 7", vec![Token::Number("42"), Token::Number("7")]);
        run_lex_test("2.5", vec![Token::Number("2.5")]);
        run_lex_test("(10)", vec![
            Token::Open(Delimiter::Paren),
            Token::Number("10"),
            Token::Close(Delimiter::Paren),
        ]);
        run_lex_test("1.2.3", vec![Token::Number("1.2.3")]);
    }

    #[test]
    fn can_lex_names_starting_with_digits() {
        run_lex_test("2nd", vec![Token::Symbol("2nd")]);
        run_lex_test(
            "(1+ 4)",
            vec![
                Token::Open(Delimiter::Paren),
                Token::Symbol("1+"),
                Token::Number("4"),
                Token::Close(Delimiter::Paren),
            ],
        );
        run_lex_test("3'a", vec![Token::Number("3"), Token::Quote, Token::Symbol("a")]);
    }

    #[test]
    fn can_lex_strings() {
        run_lex_test(r#""""#, vec![Token::String("")]);
        run_lex_test(r#""hi, there""#, vec![Token::String("hi, there")]);
        run_lex_test(
            r#"(print "a" "b")"#,
            vec![
                Token::Open(Delimiter::Paren),
                Token::Symbol("print"),
                Token::String("a"),
                Token::String("b"),
                Token::Close(Delimiter::Paren),
            ],
        );
    }

    #[test]
    fn can_find_unbalanced_string() {
        assert_eq!(lex(r#"  "hi, there"#), Err(Error::UnbalancedString(2)));
        assert_eq!(lex(r#"""#), Err(Error::UnbalancedString(0)));
    }

    #[test]
    fn can_lex_comments() {
        run_lex_test("; a comment", vec![Token::Comment(" a comment")]);
        run_lex_test(
            "x ; trailing\ny",
            vec![
                Token::Symbol("x"),
                Token::Comment(" trailing"),
                Token::Symbol("y"),
            ],
        );
        run_lex_test(";", vec![Token::Comment("")]);
    }

    #[test]
    fn can_lex_symbols() {
        run_lex_test(
            "+ - set! null? >= a_b $x",
            vec![
                Token::Symbol("+"),
                Token::Symbol("-"),
                Token::Symbol("set!"),
                Token::Symbol("null?"),
                Token::Symbol(">="),
                Token::Symbol("a_b"),
                Token::Symbol("$x"),
            ],
        );
        run_lex_test("-5", vec![Token::Symbol("-5")]);
        run_lex_test("hi, there", vec![Token::Symbol("hi"), Token::Symbol("there")]);
    }

    #[test]
    fn can_lex_quotes() {
        run_lex_test("'a", vec![Token::Quote, Token::Symbol("a")]);
        run_lex_test(
            "(f 'b)",
            vec![
                Token::Open(Delimiter::Paren),
                Token::Symbol("f"),
                Token::Quote,
                Token::Symbol("b"),
                Token::Close(Delimiter::Paren),
            ],
        );
    }

    #[test]
    fn can_find_control_character() {
        assert_eq!(lex("a \u{7}"), Err(Error::UnrecognizedToken(2, '\u{7}')));
    }
}
