use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use itertools::Itertools;

use super::env::Env;
use super::evaluator::Error;
use super::value::Value;
use super::Result;

/// Output is where `print` writes.
pub type Output = Rc<RefCell<dyn Write>>;

type Builtin = fn(&[Value]) -> Result<Value>;

fn incorrect(procedure: &str, reason: impl Into<String>) -> Error {
    Error::IncorrectArguments {
        procedure: procedure.into(),
        reason: reason.into(),
    }
}

fn numbers(procedure: &str, args: &[Value]) -> Result<Vec<f64>> {
    args.iter()
        .map(|arg| match arg {
            Value::Number(n) => Ok(*n),
            other => Err(incorrect(
                procedure,
                format!("expected a number but found {} `{}`", other.type_name(), other),
            )),
        })
        .collect()
}

fn add(args: &[Value]) -> Result<Value> {
    Ok(Value::Number(numbers("+", args)?.into_iter().sum()))
}

fn mul(args: &[Value]) -> Result<Value> {
    Ok(Value::Number(numbers("*", args)?.into_iter().product()))
}

fn sub(args: &[Value]) -> Result<Value> {
    match numbers("-", args)?.split_first() {
        Some((first, [])) => Ok(Value::Number(-first)),
        Some((first, rest)) => Ok(Value::Number(rest.iter().fold(*first, |acc, n| acc - n))),
        None => Err(incorrect("-", "expected at least one argument")),
    }
}

fn div(args: &[Value]) -> Result<Value> {
    match numbers("/", args)?.split_first() {
        Some((first, [])) => Ok(Value::Number(1.0 / first)),
        Some((first, rest)) => Ok(Value::Number(rest.iter().fold(*first, |acc, n| acc / n))),
        None => Err(incorrect("/", "expected at least one argument")),
    }
}

fn compare_numbers<P>(procedure: &str, args: &[Value], holds: P) -> Result<Value>
where
    P: Fn(f64, f64) -> bool,
{
    let numbers = numbers(procedure, args)?;
    if numbers.is_empty() {
        return Err(incorrect(procedure, "expected at least one argument"));
    }
    Ok(Value::Bool(
        numbers.iter().tuple_windows().all(|(a, b)| holds(*a, *b)),
    ))
}

fn greater(args: &[Value]) -> Result<Value> {
    compare_numbers(">", args, |a, b| a > b)
}

fn less(args: &[Value]) -> Result<Value> {
    compare_numbers("<", args, |a, b| a < b)
}

fn equal(args: &[Value]) -> Result<Value> {
    if args.is_empty() {
        return Err(incorrect("=", "expected at least one argument"));
    }
    Ok(Value::Bool(args.iter().tuple_windows().all(|(a, b)| a == b)))
}

fn is_null(args: &[Value]) -> Result<Value> {
    match args {
        [value] => Ok(Value::Bool(*value == Value::Nil)),
        _ => Err(incorrect(
            "null?",
            format!("expected 1 argument but received {}", args.len()),
        )),
    }
}

static PRELUDE_BINDINGS: &[(&str, Builtin)] = &[
    ("+", add),
    ("-", sub),
    ("*", mul),
    ("/", div),
    (">", greater),
    ("<", less),
    ("=", equal),
    ("null?", is_null),
];

fn constants() -> Vec<(String, Value)> {
    vec![
        ("null".into(), Value::Nil),
        ("true".into(), Value::Bool(true)),
        ("false".into(), Value::Bool(false)),
        (
            "version".into(),
            Value::String(env!("CARGO_PKG_VERSION").into()),
        ),
    ]
}

fn print_to(output: &Output, args: &[Value]) -> Result<Value> {
    let line = args
        .iter()
        .map(|arg| match arg {
            Value::String(s) | Value::Symbol(s) => s.clone(),
            other => other.to_string(),
        })
        .join(" ");
    writeln!(output.borrow_mut(), "{}", line)
        .map_err(|e| incorrect("print", format!("could not write output: {}", e)))?;
    Ok(Value::Nil)
}

/// env builds a global environment whose `print` writes to stdout.
pub fn env() -> Env {
    env_with_output(Rc::new(RefCell::new(io::stdout())))
}

/// env_with_output builds a global environment holding every built-in, with `print` writing to `output`.
pub fn env_with_output(output: Output) -> Env {
    let bindings = PRELUDE_BINDINGS
        .iter()
        .map(|(name, host_fn)| (String::from(*name), Value::native(*name, *host_fn)))
        .chain(constants())
        .collect::<Vec<(String, Value)>>();

    let env = Env::new();
    env.add_bindings(bindings.as_slice());
    env.define_native("print", move |args| print_to(&output, args));
    env
}
