//! The expression model the evaluator runs, and the analysis that classifies reader data into it.

use std::rc::Rc;

use super::evaluator::Error;
use super::value::Value;
use super::Result;
use crate::reader::Datum;

static DEFINE_SYMBOL: &str = "define";
static SET_SYMBOL: &str = "set!";
static LAMBDA_SYMBOL: &str = "lambda";
static BEGIN_SYMBOL: &str = "begin";
static IF_SYMBOL: &str = "if";
static COND_SYMBOL: &str = "cond";
static ELSE_SYMBOL: &str = "else";

/// Characters other than letters and digits allowed in a name.
static SYMBOL_PUNCTUATION: &str = "_$+*/-?!=><";

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Symbol(String),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Nil => Value::Nil,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Symbol(s) => Value::Symbol(s.clone()),
        }
    }
}

/// Lambda is an unevaluated function literal.
#[derive(Debug, PartialEq)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Vec<Expr>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ClauseTest {
    Else,
    Predicate(Expr),
}

#[derive(Debug, PartialEq, Clone)]
pub struct CondClause {
    pub test: ClauseTest,
    pub actions: Vec<Expr>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Literal(Literal),
    Variable(String),
    Definition {
        name: String,
        value: Box<Expr>,
    },
    Assignment {
        name: String,
        value: Box<Expr>,
    },
    Lambda(Rc<Lambda>),
    Block(Vec<Expr>),
    If {
        predicate: Box<Expr>,
        consequent: Box<Expr>,
        alternative: Option<Box<Expr>>,
    },
    Cond(Vec<CondClause>),
    Application {
        operator: Box<Expr>,
        operands: Vec<Expr>,
    },
}

impl Expr {
    pub fn lambda(params: Vec<String>, body: Vec<Expr>) -> Self {
        Expr::Lambda(Rc::new(Lambda { params, body }))
    }

    /// sequence folds a list of actions into one expression: `null` when empty, the action itself when alone, and
    /// a `Block` otherwise.
    pub fn sequence(mut actions: Vec<Expr>) -> Self {
        match actions.len() {
            0 => Expr::Literal(Literal::Nil),
            1 => actions.remove(0),
            _ => Expr::Block(actions),
        }
    }
}

pub fn is_symbol_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_alphanumeric() || SYMBOL_PUNCTUATION.contains(ch))
}

fn malformed(datum: &Datum, reason: &str) -> Error {
    Error::MalformedExpression(format!("{}: {}", reason, datum))
}

/// analyze classifies a datum into an `Expr`, rejecting any shape the evaluator has no rule for.
pub fn analyze(datum: &Datum) -> Result<Expr> {
    match datum {
        Datum::Number(n) => Ok(Expr::Literal(Literal::Number(*n))),
        Datum::String(s) => Ok(Expr::Literal(Literal::String(s.clone()))),
        Datum::Symbol(s) => Ok(Expr::Variable(analyze_name(datum, s)?)),
        Datum::Quote(quoted) => analyze_quote(datum, quoted),
        Datum::List(nodes) => analyze_list(datum, nodes),
    }
}

fn analyze_all(data: &[Datum]) -> Result<Vec<Expr>> {
    data.iter().map(analyze).collect()
}

fn analyze_name(datum: &Datum, name: &str) -> Result<String> {
    if is_symbol_name(name) {
        Ok(name.into())
    } else {
        Err(malformed(datum, "invalid name"))
    }
}

fn analyze_quote(datum: &Datum, quoted: &Datum) -> Result<Expr> {
    let literal = match quoted {
        Datum::Symbol(s) => Literal::Symbol(analyze_name(datum, s)?),
        Datum::Number(n) => Literal::Number(*n),
        Datum::String(s) => Literal::String(s.clone()),
        _ => return Err(malformed(datum, "only symbols and atoms can be quoted")),
    };
    Ok(Expr::Literal(literal))
}

fn analyze_list(datum: &Datum, nodes: &[Datum]) -> Result<Expr> {
    let (first, rest) = nodes
        .split_first()
        .ok_or_else(|| malformed(datum, "empty application"))?;

    match first {
        Datum::Symbol(s) if s == DEFINE_SYMBOL => analyze_definition(datum, rest),
        Datum::Symbol(s) if s == SET_SYMBOL => analyze_assignment(datum, rest),
        Datum::Symbol(s) if s == LAMBDA_SYMBOL => analyze_lambda(datum, rest),
        Datum::Symbol(s) if s == BEGIN_SYMBOL => Ok(Expr::Block(analyze_all(rest)?)),
        Datum::Symbol(s) if s == IF_SYMBOL => analyze_if(datum, rest),
        Datum::Symbol(s) if s == COND_SYMBOL => analyze_cond(datum, rest),
        _ => Ok(Expr::Application {
            operator: Box::new(analyze(first)?),
            operands: analyze_all(rest)?,
        }),
    }
}

fn analyze_params(datum: &Datum, params: &[Datum]) -> Result<Vec<String>> {
    params
        .iter()
        .map(|param| match param {
            Datum::Symbol(s) => analyze_name(datum, s),
            _ => Err(malformed(datum, "parameters must be names")),
        })
        .collect()
}

fn analyze_body(datum: &Datum, body: &[Datum]) -> Result<Vec<Expr>> {
    if body.is_empty() {
        return Err(malformed(datum, "procedure body is empty"));
    }
    analyze_all(body)
}

// (define <name> <value>)
// (define (<name> <param>*) <body>+)
fn analyze_definition(datum: &Datum, rest: &[Datum]) -> Result<Expr> {
    match rest {
        [Datum::Symbol(name), value] => Ok(Expr::Definition {
            name: analyze_name(datum, name)?,
            value: Box::new(analyze(value)?),
        }),
        [Datum::List(signature), body @ ..] => {
            let (name, params) = match signature.split_first() {
                Some((Datum::Symbol(name), params)) => (name, params),
                _ => return Err(malformed(datum, "define requires a procedure name")),
            };
            Ok(Expr::Definition {
                name: analyze_name(datum, name)?,
                value: Box::new(Expr::lambda(
                    analyze_params(datum, params)?,
                    analyze_body(datum, body)?,
                )),
            })
        }
        _ => Err(malformed(datum, "ill-formed define")),
    }
}

// (set! <name> <value>)
fn analyze_assignment(datum: &Datum, rest: &[Datum]) -> Result<Expr> {
    match rest {
        [Datum::Symbol(name), value] => Ok(Expr::Assignment {
            name: analyze_name(datum, name)?,
            value: Box::new(analyze(value)?),
        }),
        _ => Err(malformed(datum, "ill-formed set!")),
    }
}

// (lambda (<param>*) <body>+)
fn analyze_lambda(datum: &Datum, rest: &[Datum]) -> Result<Expr> {
    match rest {
        [Datum::List(params), body @ ..] => Ok(Expr::lambda(
            analyze_params(datum, params)?,
            analyze_body(datum, body)?,
        )),
        _ => Err(malformed(datum, "lambda requires a parameter list")),
    }
}

// (if <predicate> <consequent> [<alternative>])
fn analyze_if(datum: &Datum, rest: &[Datum]) -> Result<Expr> {
    let (predicate, consequent, alternative) = match rest {
        [predicate, consequent] => (predicate, consequent, None),
        [predicate, consequent, alternative] => (predicate, consequent, Some(alternative)),
        _ => return Err(malformed(datum, "ill-formed if")),
    };

    Ok(Expr::If {
        predicate: Box::new(analyze(predicate)?),
        consequent: Box::new(analyze(consequent)?),
        alternative: match alternative {
            Some(alternative) => Some(Box::new(analyze(alternative)?)),
            None => None,
        },
    })
}

// (cond (<predicate> <expr>*)* (else <expr>*)?)
fn analyze_cond(datum: &Datum, rest: &[Datum]) -> Result<Expr> {
    rest.iter()
        .map(|clause| match clause {
            Datum::List(nodes) => match nodes.split_first() {
                Some((Datum::Symbol(s), actions)) if s == ELSE_SYMBOL => Ok(CondClause {
                    test: ClauseTest::Else,
                    actions: analyze_all(actions)?,
                }),
                Some((predicate, actions)) => Ok(CondClause {
                    test: ClauseTest::Predicate(analyze(predicate)?),
                    actions: analyze_all(actions)?,
                }),
                None => Err(malformed(datum, "empty cond clause")),
            },
            _ => Err(malformed(datum, "cond clauses must be lists")),
        })
        .collect::<Result<Vec<_>>>()
        .map(Expr::Cond)
}
