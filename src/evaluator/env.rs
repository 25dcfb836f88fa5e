use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use tracing::debug;

use super::evaluator::Error;
use super::value::Value;
use super::Result;

type Scope = HashMap<String, Value>;

struct Frame {
    bindings: Scope,
    parent: Option<Env>,
}

/// Env is a shared handle to one frame of a chain of scopes. Cloning an `Env` shares the frame, which is how a
/// closure keeps its defining scope alive.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Frame>>);

impl Env {
    pub fn new() -> Self {
        Env::from_frame(Frame {
            bindings: HashMap::new(),
            parent: None,
        })
    }

    pub fn with_parent(parent: &Env) -> Self {
        Env::from_frame(Frame {
            bindings: HashMap::new(),
            parent: Some(parent.clone()),
        })
    }

    fn from_frame(frame: Frame) -> Self {
        Env(Rc::new(RefCell::new(frame)))
    }

    /// extend builds a new frame below `self` binding each of `params` to the matching value in `args`.
    pub fn extend(&self, params: &[String], args: Vec<Value>) -> Result<Env> {
        if params.len() != args.len() {
            return Err(Error::ArityMismatch {
                expected: params.len(),
                provided: args.len(),
            });
        }

        debug!(?params, "extending environment");
        let env = Env::with_parent(self);
        env.0
            .borrow_mut()
            .bindings
            .extend(params.iter().cloned().zip(args));
        Ok(env)
    }

    pub fn add_bindings(&self, bindings: &[(String, Value)]) {
        let mut frame = self.0.borrow_mut();
        bindings.iter().for_each(|(k, v)| {
            frame.bindings.insert(k.clone(), v.clone());
        })
    }

    /// define binds `name` in this frame only, shadowing any binding further up the chain.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// define_native registers a host procedure under `name` in this frame.
    pub fn define_native<F>(&self, name: &str, handler: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.define(name, Value::native(name, handler));
    }

    /// assign overwrites `name` in the nearest frame that binds it. It never creates a binding.
    pub fn assign(&self, name: &str, value: Value) -> Result<()> {
        let mut env = self.clone();
        loop {
            let parent = {
                let mut frame = env.0.borrow_mut();
                if let Some(slot) = frame.bindings.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
                frame.parent.clone()
            };

            match parent {
                Some(parent) => env = parent,
                None => return Err(Error::UnboundName(name.into())),
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Value> {
        let frame = self.0.borrow();
        match frame.bindings.get(name) {
            Some(value) => Ok(value.clone()),
            None => match &frame.parent {
                Some(parent) => parent.lookup(name),
                None => Err(Error::UnboundName(name.into())),
            },
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.borrow().parent.is_none()
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // names only: bound procedures may close over this very frame
        let frame = self.0.borrow();
        f.debug_struct("Env")
            .field("names", &frame.bindings.keys().sorted().collect::<Vec<_>>())
            .field("parent", &frame.parent)
            .finish()
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let frame = self.0.borrow();
        write!(f, "Env (some-parent? {:?}) {{", frame.parent.is_some())?;
        write!(
            f,
            "{}",
            frame
                .bindings
                .iter()
                .sorted_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(k, v)| format!("{:?} {}", k, v))
                .format(" ")
        )?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_nest_envs() {
        let parent = Env::new();
        let bindings = &[("hi".into(), Value::Bool(true)), ("there".into(), Value::Nil)];
        parent.add_bindings(bindings);

        let child = Env::with_parent(&parent);
        let child_bindings = &[("in-the-child".into(), Value::Number(22.0))];
        child.add_bindings(child_bindings);

        assert_eq!(Ok(Value::Bool(true)), child.lookup("hi"));
        assert_eq!(Ok(Value::Number(22.0)), child.lookup("in-the-child"));
        assert_eq!(
            Err(Error::UnboundName("in-the-child".into())),
            parent.lookup("in-the-child")
        );
        assert!(parent.is_root());
        assert!(!child.is_root());
    }

    #[test]
    fn define_shadows_without_touching_parent() {
        let parent = Env::new();
        parent.define("x", Value::Number(1.0));

        let child = Env::with_parent(&parent);
        child.define("x", Value::Number(2.0));

        assert_eq!(Ok(Value::Number(2.0)), child.lookup("x"));
        assert_eq!(Ok(Value::Number(1.0)), parent.lookup("x"));
    }

    #[test]
    fn define_overwrites_within_a_frame() {
        let env = Env::new();
        env.define("x", Value::Number(1.0));
        env.define("x", Value::Symbol("a".into()));
        assert_eq!(Ok(Value::Symbol("a".into())), env.lookup("x"));
    }

    #[test]
    fn assign_writes_through_to_owning_frame() {
        let root = Env::new();
        root.define("x", Value::Number(1.0));
        let middle = Env::with_parent(&root);
        let inner = Env::with_parent(&middle);

        inner.assign("x", Value::Number(5.0)).unwrap();

        assert_eq!(Ok(Value::Number(5.0)), root.lookup("x"));
        assert_eq!(Ok(Value::Number(5.0)), inner.lookup("x"));
    }

    #[test]
    fn assign_targets_nearest_owner() {
        let root = Env::new();
        root.define("x", Value::Number(1.0));
        let inner = Env::with_parent(&root);
        inner.define("x", Value::Number(2.0));
        let sibling = Env::with_parent(&root);

        inner.assign("x", Value::Number(3.0)).unwrap();

        assert_eq!(Ok(Value::Number(3.0)), inner.lookup("x"));
        assert_eq!(Ok(Value::Number(1.0)), root.lookup("x"));
        assert_eq!(Ok(Value::Number(1.0)), sibling.lookup("x"));
    }

    #[test]
    fn assign_never_creates_bindings() {
        let root = Env::new();
        let inner = Env::with_parent(&root);

        assert_eq!(
            Err(Error::UnboundName("z".into())),
            inner.assign("z", Value::Number(1.0))
        );
        assert!(inner.lookup("z").is_err());
        assert!(root.lookup("z").is_err());
    }

    #[test]
    fn extend_binds_params_in_a_fresh_frame() {
        let root = Env::new();
        root.define("a", Value::Number(0.0));

        let params = vec!["a".to_string(), "b".to_string()];
        let frame = root
            .extend(&params, vec![Value::Number(1.0), Value::Number(2.0)])
            .unwrap();

        assert_eq!(Ok(Value::Number(1.0)), frame.lookup("a"));
        assert_eq!(Ok(Value::Number(2.0)), frame.lookup("b"));
        assert_eq!(Ok(Value::Number(0.0)), root.lookup("a"));
    }

    #[test]
    fn extend_checks_arity() {
        let root = Env::new();
        let params = vec!["a".to_string()];

        assert_eq!(
            Err(Error::ArityMismatch {
                expected: 1,
                provided: 2
            }),
            root.extend(&params, vec![Value::Nil, Value::Nil]).map(|_| ())
        );
        assert_eq!(
            Err(Error::ArityMismatch {
                expected: 1,
                provided: 0
            }),
            root.extend(&params, vec![]).map(|_| ())
        );
    }

    #[test]
    fn can_display_env() {
        let env = Env::new();
        env.define("b", Value::Number(2.0));
        env.define("a", Value::Number(1.0));
        assert_eq!(r#"Env (some-parent? false) {"a" 1 "b" 2}"#, env.to_string());
    }
}
