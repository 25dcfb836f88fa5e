mod lexer;
mod parser;

use self::lexer::Lexer;
use self::parser::Parser;

pub use self::lexer::{lex, Delimiter};
pub use self::parser::{Datum, Error, Result};

/// read produces every top-level datum in `input`.
pub fn read(input: &str) -> Result<Vec<Datum>> {
    let mut lexer = Lexer::new(input);

    let mut parser = Parser::new();
    parser.parse_tokens(&mut lexer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_read_expr() {
        let input = "(+ 2 3)";
        let datum = read(input).unwrap();
        assert_eq!(
            datum,
            vec![Datum::List(vec![
                Datum::Symbol("+".into()),
                Datum::Number(2.0),
                Datum::Number(3.0),
            ])]
        )
    }

    #[test]
    fn surfaces_lexer_errors() {
        assert_eq!(read("(+ 1 \"2)"), Err(Error::UnbalancedString(5)));
    }
}
