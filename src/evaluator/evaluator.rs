use std::result;

use tracing::{debug, trace};

use super::desugar;
use super::env::Env;
use super::syntax::Expr;
use super::value::{Procedure, Value};
use crate::reader::Error as ReaderError;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum Error {
    #[error("unbound name `{0}`")]
    UnboundName(String),
    /// ArityMismatch indicates a compound application where the number of args passed did not match the number of params requested.
    #[error("expected {expected} argument(s) but received {provided}")]
    ArityMismatch { expected: usize, provided: usize },
    #[error("{0} is not callable")]
    NotCallable(Value),
    #[error("`else` must be the last clause of a cond")]
    MisplacedElse,
    #[error("malformed expression ({0})")]
    MalformedExpression(String),
    /// IncorrectArguments is raised by built-in procedures rejecting their arguments.
    #[error("{procedure}: {reason}")]
    IncorrectArguments { procedure: String, reason: String },
    #[error("could not read input: {0}")]
    ReaderError(#[from] ReaderError),
}

/// eval_expr evaluates `expr` in `env`.
///
/// Evaluation is strictly recursive; a deep enough expression or call chain exhausts the host stack.
pub fn eval_expr(expr: &Expr, env: &Env) -> Result<Value> {
    trace!(?expr, "evaluating");

    match expr {
        Expr::Literal(literal) => Ok(literal.to_value()),
        Expr::Variable(name) => env.lookup(name),
        Expr::Definition { name, value } => eval_definition(name, value, env),
        Expr::Assignment { name, value } => eval_assignment(name, value, env),
        Expr::Lambda(lambda) => Ok(Value::compound(lambda.clone(), env.clone())),
        Expr::Block(exprs) => eval_sequence(exprs, env),
        Expr::If {
            predicate,
            consequent,
            alternative,
        } => eval_if(predicate, consequent, alternative.as_deref(), env),
        // expanded on every evaluation, never cached
        Expr::Cond(clauses) => desugar::expand_cond(clauses).and_then(|expr| eval_expr(&expr, env)),
        Expr::Application { operator, operands } => {
            let procedure = eval_expr(operator, env)?;
            let args = operands
                .iter()
                .map(|operand| eval_expr(operand, env))
                .collect::<Result<Vec<_>>>()?;
            apply(&procedure, args)
        }
    }
}

/// eval_sequence evaluates each of `exprs` in order and yields the last value, or `null` for no exprs.
pub fn eval_sequence(exprs: &[Expr], env: &Env) -> Result<Value> {
    exprs
        .iter()
        .try_fold(Value::Nil, |_, expr| eval_expr(expr, env))
}

// (define <name> <value>)
fn eval_definition(name: &str, value: &Expr, env: &Env) -> Result<Value> {
    let value = eval_expr(value, env)?;
    env.define(name, value);
    Ok(Value::Symbol(name.into()))
}

// (set! <name> <value>)
fn eval_assignment(name: &str, value: &Expr, env: &Env) -> Result<Value> {
    let value = eval_expr(value, env)?;
    env.assign(name, value.clone())?;
    Ok(value)
}

// (if <predicate> <consequent> [<alternative>])
fn eval_if(
    predicate: &Expr,
    consequent: &Expr,
    alternative: Option<&Expr>,
    env: &Env,
) -> Result<Value> {
    if eval_expr(predicate, env)?.is_truthy() {
        eval_expr(consequent, env)
    } else {
        match alternative {
            Some(alternative) => eval_expr(alternative, env),
            None => Ok(desugar::FALSE_SENTINEL.to_value()),
        }
    }
}

/// apply invokes `procedure` with already evaluated `args`.
pub fn apply(procedure: &Value, args: Vec<Value>) -> Result<Value> {
    match procedure {
        Value::Procedure(Procedure::Native(native)) => (native.handler)(args.as_slice()),
        Value::Procedure(Procedure::Compound(compound)) => {
            debug!(procedure = %procedure, args = args.len(), "applying compound procedure");
            // parented at the closure's environment, never the caller's
            let local_env = compound.env.extend(&compound.lambda.params, args)?;
            eval_sequence(&compound.lambda.body, &local_env)
        }
        other => Err(Error::NotCallable(other.clone())),
    }
}
