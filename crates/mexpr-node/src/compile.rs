//! Closure compilation.
//!
//! Compiling a tree happens in two steps:
//! 1. Each node emits a [`Fragment`], a boxed closure that closes over the
//!    fragments of its children. Named helper values the fragments need
//!    (builtin functions, constants, units) are collected once into a shared
//!    [`DefTable`] and referenced by [`DefKey`].
//! 2. The root fragment and the table are assembled into one [`Evaluator`],
//!    which can then be run any number of times against different
//!    [`Bindings`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use mexpr_builtins::{BuiltinRegistry, StdRegistry};
use mexpr_types::{ExprError, ExprResult, MathConfig, Value};

use crate::Bindings;

// ══════════════════════════════════════════════════════════════════════════════
// Environment
// ══════════════════════════════════════════════════════════════════════════════

/// Execution context handed to [`Node::compile`](crate::Node::compile).
#[derive(Clone)]
pub struct Environment {
    config: MathConfig,
    builtins: Rc<dyn BuiltinRegistry>,
}

impl Environment {
    pub fn new(config: MathConfig, builtins: Rc<dyn BuiltinRegistry>) -> Self {
        Self { config, builtins }
    }

    /// An environment backed by the default registry, built for `config`.
    pub fn from_config(config: MathConfig) -> Self {
        let builtins = Rc::new(StdRegistry::with_config(&config));
        Self::new(config, builtins)
    }

    pub fn config(&self) -> &MathConfig {
        &self.config
    }

    pub fn builtins(&self) -> &Rc<dyn BuiltinRegistry> {
        &self.builtins
    }

    /// Fail with [`ExprError::TypeConfiguration`] unless this is a usable
    /// execution context.
    pub fn validate(&self) -> ExprResult<()> {
        self.config.validate()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::from_config(MathConfig::default())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .field("builtins", &self.builtins)
            .finish()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// DefTable
// ══════════════════════════════════════════════════════════════════════════════

/// Index of an entry in a [`DefTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefKey(usize);

/// Named helper values shared by every fragment of one compiled tree.
#[derive(Debug)]
pub struct DefTable {
    env: Environment,
    index: HashMap<String, DefKey>,
    entries: Vec<(String, Value)>,
}

impl DefTable {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// The environment the table was created for.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Register `value` under `name`. The first registration of a name wins;
    /// later calls return the existing key.
    pub fn define(&mut self, name: &str, value: Value) -> DefKey {
        if let Some(&key) = self.index.get(name) {
            return key;
        }
        let key = DefKey(self.entries.len());
        self.entries.push((name.to_string(), value));
        self.index.insert(name.to_string(), key);
        key
    }

    /// Register the builtin function, constant or plain unit called `name`
    /// from the environment, if there is one.
    pub fn define_builtin(&mut self, name: &str) -> Option<DefKey> {
        if let Some(&key) = self.index.get(name) {
            return Some(key);
        }
        let value = self
            .env
            .builtins()
            .lookup(name)
            .or_else(|| self.env.builtins().unit(name))?;
        Some(self.define(name, value))
    }

    pub fn get(&self, key: DefKey) -> &Value {
        &self.entries[key.0].1
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&key| self.get(key))
    }

    /// Call the function stored at `key`.
    pub fn call(&self, key: DefKey, args: &[Value]) -> ExprResult<Value> {
        let (name, value) = &self.entries[key.0];
        match value {
            Value::Function(func) => func.call(args),
            other => Err(ExprError::TypeMismatch(format!(
                "{name} is a {}, not a function",
                other.type_name()
            ))),
        }
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Fragments
// ══════════════════════════════════════════════════════════════════════════════

/// What a fragment sees while running.
pub struct Frame<'a> {
    defs: &'a DefTable,
    bindings: &'a mut Bindings,
}

impl<'a> Frame<'a> {
    pub fn defs(&self) -> &DefTable {
        self.defs
    }

    pub fn bindings(&self) -> &Bindings {
        &*self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut *self.bindings
    }

    /// Read a variable: bindings first, then the definition table entry, if
    /// any, emitted for it.
    pub fn resolve(&self, name: &str, fallback: Option<DefKey>) -> ExprResult<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        match fallback {
            Some(key) => Ok(self.defs.get(key).clone()),
            None => Err(ExprError::UnresolvedSymbol(name.to_string())),
        }
    }
}

/// A compiled piece of an expression tree.
pub type Fragment = Box<dyn Fn(&mut Frame<'_>) -> ExprResult<Value>>;

/// Box a closure as a [`Fragment`].
pub fn fragment<F>(f: F) -> Fragment
where
    F: Fn(&mut Frame<'_>) -> ExprResult<Value> + 'static,
{
    Box::new(f)
}

// ══════════════════════════════════════════════════════════════════════════════
// Evaluator
// ══════════════════════════════════════════════════════════════════════════════

/// A compiled expression, independent of the tree it came from.
pub struct Evaluator {
    defs: DefTable,
    root: Fragment,
}

impl Evaluator {
    /// Assemble the root fragment with the table its fragments reference.
    pub fn new(defs: DefTable, root: Fragment) -> Self {
        tracing::debug!(defs = defs.len(), "assembled evaluator");
        Self { defs, root }
    }

    /// Run against `bindings`. Assignments made by the expression are
    /// written back into them.
    pub fn eval(&self, bindings: &mut Bindings) -> ExprResult<Value> {
        let mut frame = Frame {
            defs: &self.defs,
            bindings,
        };
        (self.root)(&mut frame)
    }

    /// Run with an empty set of bindings.
    pub fn eval_empty(&self) -> ExprResult<Value> {
        self.eval(&mut Bindings::new())
    }

    pub fn defs(&self) -> &DefTable {
        &self.defs
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("defs", &self.defs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_is_first_wins() {
        let mut defs = DefTable::new(Environment::default());
        let a = defs.define("k", Value::Number(1.0));
        let b = defs.define("k", Value::Number(2.0));
        assert_eq!(a, b);
        assert_eq!(defs.get(a), &Value::Number(1.0));
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn define_builtin_pulls_from_the_environment() {
        let mut defs = DefTable::new(Environment::default());
        let sqrt = defs.define_builtin("sqrt").unwrap();
        assert_eq!(defs.define_builtin("sqrt"), Some(sqrt));
        assert_eq!(
            defs.call(sqrt, &[Value::Number(9.0)]),
            Ok(Value::Number(3.0))
        );
        assert!(defs.define_builtin("cm").is_some());
        assert_eq!(defs.define_builtin("nope"), None);
        assert_eq!(defs.names().collect::<Vec<_>>(), vec!["sqrt", "cm"]);
    }

    #[test]
    fn calling_a_non_function_is_a_type_mismatch() {
        let mut defs = DefTable::new(Environment::default());
        let pi = defs.define_builtin("pi").unwrap();
        assert!(matches!(
            defs.call(pi, &[]),
            Err(ExprError::TypeMismatch(_))
        ));
    }

    #[test]
    fn evaluator_runs_repeatedly() {
        let defs = DefTable::new(Environment::default());
        let eval = Evaluator::new(
            defs,
            fragment(|frame| {
                let n = frame.resolve("n", None)?;
                let next = Value::Number(n.as_number().unwrap_or(0.0) + 1.0);
                frame.bindings_mut().set("n", next.clone());
                Ok(next)
            }),
        );
        let mut bindings: Bindings = [("n", Value::Number(1.0))].into_iter().collect();
        assert_eq!(eval.eval(&mut bindings), Ok(Value::Number(2.0)));
        assert_eq!(eval.eval(&mut bindings), Ok(Value::Number(3.0)));
        assert_eq!(
            eval.eval_empty(),
            Err(ExprError::UnresolvedSymbol("n".into()))
        );
    }
}
