mod desugar;
mod env;
mod evaluator;
pub mod prelude;
pub mod syntax;
mod value;

use crate::reader;

pub use self::desugar::expand_cond;
pub use self::env::Env;
pub use self::evaluator::{apply, eval_expr, eval_sequence, Error, Result};
pub use self::syntax::{analyze, Expr};
pub use self::value::{Compound, HostFn, Native, Procedure, Value};

/// eval reads and evaluates every form in `input` against a fresh global environment.
pub fn eval(input: &str) -> Vec<Result<Value>> {
    let env = prelude::env();
    eval_in(input, &env)
}

/// eval_in reads and evaluates every form in `input` against `env`, in order. A read failure yields a single error.
pub fn eval_in(input: &str, env: &Env) -> Vec<Result<Value>> {
    match reader::read(input) {
        Ok(data) => data
            .iter()
            .map(|datum| analyze(datum).and_then(|expr| eval_expr(&expr, env)))
            .collect::<Vec<_>>(),
        Err(e) => vec![Err(e.into())],
    }
}
