use tracing::debug;

use super::evaluator::Error;
use super::syntax::{ClauseTest, CondClause, Expr, Literal};
use super::Result;

/// FALSE_SENTINEL is what a conditional with no matching branch evaluates to.
pub const FALSE_SENTINEL: Literal = Literal::Bool(false);

/// expand_cond rewrites `cond` clauses into the equivalent nest of `if` expressions.
///
/// An `else` clause is only legal in the last position; anywhere else the whole expansion fails with
/// `MisplacedElse`, even if an earlier clause would have been taken.
pub fn expand_cond(clauses: &[CondClause]) -> Result<Expr> {
    debug!(clauses = clauses.len(), "expanding cond");
    expand_clauses(clauses)
}

fn expand_clauses(clauses: &[CondClause]) -> Result<Expr> {
    let (first, rest) = match clauses.split_first() {
        Some(split) => split,
        None => return Ok(Expr::Literal(FALSE_SENTINEL)),
    };

    match &first.test {
        ClauseTest::Else if rest.is_empty() => Ok(Expr::sequence(first.actions.clone())),
        ClauseTest::Else => Err(Error::MisplacedElse),
        ClauseTest::Predicate(predicate) => Ok(Expr::If {
            predicate: Box::new(predicate.clone()),
            consequent: Box::new(Expr::sequence(first.actions.clone())),
            alternative: Some(Box::new(expand_clauses(rest)?)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::Variable(name.into())
    }

    fn sym(name: &str) -> Expr {
        Expr::Literal(Literal::Symbol(name.into()))
    }

    fn clause(predicate: &str, actions: Vec<Expr>) -> CondClause {
        CondClause {
            test: ClauseTest::Predicate(var(predicate)),
            actions,
        }
    }

    fn else_clause(actions: Vec<Expr>) -> CondClause {
        CondClause {
            test: ClauseTest::Else,
            actions,
        }
    }

    #[test]
    fn no_clauses_is_false() {
        assert_eq!(Ok(Expr::Literal(Literal::Bool(false))), expand_cond(&[]));
    }

    #[test]
    fn clauses_nest_right() {
        let clauses = vec![
            clause("p", vec![sym("a")]),
            clause("q", vec![sym("b"), sym("c")]),
            else_clause(vec![sym("d")]),
        ];

        let expected = Expr::If {
            predicate: Box::new(var("p")),
            consequent: Box::new(sym("a")),
            alternative: Some(Box::new(Expr::If {
                predicate: Box::new(var("q")),
                consequent: Box::new(Expr::Block(vec![sym("b"), sym("c")])),
                alternative: Some(Box::new(sym("d"))),
            })),
        };

        assert_eq!(Ok(expected), expand_cond(&clauses));
    }

    #[test]
    fn missing_else_ends_in_false() {
        let clauses = vec![clause("p", vec![sym("a")])];

        let expected = Expr::If {
            predicate: Box::new(var("p")),
            consequent: Box::new(sym("a")),
            alternative: Some(Box::new(Expr::Literal(FALSE_SENTINEL))),
        };

        assert_eq!(Ok(expected), expand_cond(&clauses));
    }

    #[test]
    fn else_is_never_wrapped_in_if() {
        assert_eq!(Ok(sym("z")), expand_cond(&[else_clause(vec![sym("z")])]));
        assert_eq!(
            Ok(Expr::Literal(Literal::Nil)),
            expand_cond(&[else_clause(vec![])])
        );
    }

    #[test]
    fn misplaced_else_fails_eagerly() {
        let clauses = vec![else_clause(vec![sym("a")]), clause("p", vec![sym("b")])];
        assert_eq!(Err(Error::MisplacedElse), expand_cond(&clauses));

        let clauses = vec![
            clause("p", vec![sym("a")]),
            else_clause(vec![sym("b")]),
            clause("q", vec![sym("c")]),
        ];
        assert_eq!(Err(Error::MisplacedElse), expand_cond(&clauses));
    }
}
