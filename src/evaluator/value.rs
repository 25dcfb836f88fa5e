use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use super::env::Env;
use super::syntax::Lambda;
use super::Result;

static QUOTE_CHAR: char = '\'';

/// HostFn is the signature of a procedure implemented natively rather than in the language itself.
pub type HostFn = dyn Fn(&[Value]) -> Result<Value>;

/// Value is anything an expression can evaluate to.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    /// Symbol is quoted symbolic data, never a variable reference.
    Symbol(String),
    Procedure(Procedure),
}

#[derive(Clone)]
pub enum Procedure {
    Native(Native),
    Compound(Rc<Compound>),
}

#[derive(Clone)]
pub struct Native {
    pub name: String,
    pub handler: Rc<HostFn>,
}

/// Compound is a user-defined procedure closed over the environment it was created in.
pub struct Compound {
    pub lambda: Rc<Lambda>,
    pub env: Env,
}

impl Value {
    pub fn native<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Value::Procedure(Procedure::Native(Native {
            name: name.into(),
            handler: Rc::new(handler),
        }))
    }

    pub fn compound(lambda: Rc<Lambda>, env: Env) -> Self {
        Value::Procedure(Procedure::Compound(Rc::new(Compound { lambda, env })))
    }

    /// is_truthy holds for every value except `false` and `null`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil | Value::Bool(false) => false,
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Procedure(_) => "procedure",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Procedure(a), Value::Procedure(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Procedure {
    // procedures are only equal to themselves
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Procedure::Native(a), Procedure::Native(b)) => Rc::ptr_eq(&a.handler, &b.handler),
            (Procedure::Compound(a), Procedure::Compound(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, r#""{}""#, s),
            Value::Symbol(s) => write!(f, "{}{}", QUOTE_CHAR, s),
            Value::Procedure(procedure) => write!(f, "{}", procedure),
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Procedure::Native(native) => write!(f, "#<builtin {}>", native.name),
            Procedure::Compound(compound) => write!(
                f,
                "#<procedure ({})>",
                compound.lambda.params.iter().format(" ")
            ),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({:?})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Symbol(s) => write!(f, "Symbol({:?})", s),
            // the closure environment is left out: it may refer back to this procedure
            Value::Procedure(procedure) => write!(f, "Procedure({})", procedure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_false_and_null_are_falsy() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());

        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String("".into()).is_truthy());
        assert!(Value::Symbol("false".into()).is_truthy());
        assert!(Value::native("id", |args| Ok(args[0].clone())).is_truthy());
    }

    #[test]
    fn numbers_print_without_trailing_fraction() {
        assert_eq!(Value::Number(15.0).to_string(), "15");
        assert_eq!(Value::Number(-2.5).to_string(), "-2.5");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
    }

    #[test]
    fn symbols_print_as_quoted_data() {
        assert_eq!(Value::Symbol("b".into()).to_string(), "'b");
        assert_eq!(Value::String("b".into()).to_string(), r#""b""#);
    }

    #[test]
    fn procedures_compare_by_identity() {
        let id = Value::native("id", |args| Ok(args[0].clone()));
        let other = Value::native("id", |args| Ok(args[0].clone()));

        assert_eq!(id, id.clone());
        assert_ne!(id, other);
        assert_eq!(id.to_string(), "#<builtin id>");
    }
}
