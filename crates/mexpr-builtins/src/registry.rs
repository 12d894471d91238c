//! Builtin function and constant registry.
//!
//! [`StdRegistry`] registers the default math namespace: arithmetic used by
//! operator nodes, tolerance-aware comparison, elementary functions,
//! constants, and plain unit names.

use std::collections::HashMap;
use std::fmt;

use mexpr_types::{BuiltinFn, ExprError, MathConfig, Unit, Value};

use crate::units;

/// Name → value lookup consulted by a root scope when a name is not bound
/// anywhere in the scope chain.
pub trait BuiltinRegistry: fmt::Debug {
    /// Look up a builtin function or constant.
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Whether `name` is a recognised unit identifier (with optional prefix).
    fn is_plain_unit(&self, name: &str) -> bool;

    /// Build a plain unit value from an identifier.
    fn unit(&self, name: &str) -> Option<Value> {
        self.is_plain_unit(name)
            .then(|| Value::Unit(Unit::plain(name)))
    }
}

/// The default registry.
pub struct StdRegistry {
    entries: HashMap<String, Value>,
}

impl StdRegistry {
    /// Create a registry with every default function and constant.
    pub fn new() -> Self {
        Self::with_config(&MathConfig::default())
    }

    /// Like [`StdRegistry::new`], comparing numbers with `config.epsilon`.
    pub fn with_config(config: &MathConfig) -> Self {
        let mut reg = Self {
            entries: HashMap::new(),
        };
        reg.register_arithmetic();
        reg.register_comparison(config.epsilon);
        reg.register_elementary();
        reg.register_constants();
        reg
    }

    /// Create a registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register (or replace) a value under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if self.entries.insert(name.clone(), value).is_some() {
            tracing::trace!(%name, "replaced builtin");
        }
    }

    /// Register a native function under `name`.
    pub fn insert_fn<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[Value]) -> Result<Value, ExprError> + Send + Sync + 'static,
    {
        self.insert(name, Value::Function(BuiltinFn::new(name, func)));
    }

    /// Names of everything registered, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // ──────────────────────────────────────────────────────────────────────
    // Registration helpers
    // ──────────────────────────────────────────────────────────────────────

    fn unary(&mut self, name: &'static str, op: fn(f64) -> f64) {
        self.insert_fn(name, move |args| {
            expect_arity(name, args, 1)?;
            Ok(Value::Number(op(number(name, &args[0])?)))
        });
    }

    fn binary(&mut self, name: &'static str, op: fn(f64, f64) -> f64) {
        self.insert_fn(name, move |args| {
            expect_arity(name, args, 2)?;
            Ok(Value::Number(op(
                number(name, &args[0])?,
                number(name, &args[1])?,
            )))
        });
    }

    fn fold(&mut self, name: &'static str, op: fn(f64, f64) -> f64) {
        self.insert_fn(name, move |args| {
            let (first, rest) = args.split_first().ok_or_else(|| ExprError::WrongArity {
                name: name.to_string(),
                expected: "at least 1".into(),
                found: 0,
            })?;
            let mut acc = number(name, first)?;
            for arg in rest {
                acc = op(acc, number(name, arg)?);
            }
            Ok(Value::Number(acc))
        });
    }

    // ══════════════════════════════════════════════════════════════════════
    // Namespace registration
    // ══════════════════════════════════════════════════════════════════════

    /// Operator backends: add, subtract, multiply, divide, mod, pow, unaryMinus.
    fn register_arithmetic(&mut self) {
        self.insert_fn("add", |args| {
            expect_arity("add", args, 2)?;
            match (&args[0], &args[1]) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Unit(a), Value::Unit(b)) if a.name == b.name => {
                    let sum = a.value.unwrap_or(1.0) + b.value.unwrap_or(1.0);
                    Ok(Value::Unit(Unit::with_value(sum, a.name.clone())))
                }
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                (a, b) => Err(mismatch("add", a, b)),
            }
        });
        self.binary("subtract", |a, b| a - b);
        self.insert_fn("multiply", |args| {
            expect_arity("multiply", args, 2)?;
            match (&args[0], &args[1]) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                (Value::Number(n), Value::Unit(u)) | (Value::Unit(u), Value::Number(n)) => {
                    let scaled = u.value.unwrap_or(1.0) * n;
                    Ok(Value::Unit(Unit::with_value(scaled, u.name.clone())))
                }
                (a, b) => Err(mismatch("multiply", a, b)),
            }
        });
        self.binary("divide", |a, b| a / b);
        self.binary("mod", |a, b| a - b * (a / b).floor());
        self.binary("pow", f64::powf);
        self.unary("unaryMinus", |a| -a);
    }

    /// equal, unequal
    fn register_comparison(&mut self, epsilon: f64) {
        self.insert_fn("equal", move |args| {
            expect_arity("equal", args, 2)?;
            values_equal("equal", &args[0], &args[1], epsilon).map(Value::Bool)
        });
        self.insert_fn("unequal", move |args| {
            expect_arity("unequal", args, 2)?;
            values_equal("unequal", &args[0], &args[1], epsilon).map(|eq| Value::Bool(!eq))
        });
    }

    /// Elementary functions.
    fn register_elementary(&mut self) {
        self.unary("abs", f64::abs);
        self.unary("sqrt", f64::sqrt);
        self.unary("exp", f64::exp);
        self.unary("log", f64::ln);
        self.unary("sin", f64::sin);
        self.unary("cos", f64::cos);
        self.unary("tan", f64::tan);
        self.unary("round", f64::round);
        self.fold("min", f64::min);
        self.fold("max", f64::max);
    }

    /// pi, e, tau
    fn register_constants(&mut self) {
        self.insert("pi", Value::Number(std::f64::consts::PI));
        self.insert("e", Value::Number(std::f64::consts::E));
        self.insert("tau", Value::Number(std::f64::consts::TAU));
    }
}

impl BuiltinRegistry for StdRegistry {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }

    fn is_plain_unit(&self, name: &str) -> bool {
        units::is_plain_unit(name)
    }
}

impl Default for StdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<(), ExprError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ExprError::WrongArity {
            name: name.to_string(),
            expected: expected.to_string(),
            found: args.len(),
        })
    }
}

fn number(name: &str, value: &Value) -> Result<f64, ExprError> {
    value.as_number().ok_or_else(|| {
        ExprError::TypeMismatch(format!(
            "{name} expects a number, got {}",
            value.type_name()
        ))
    })
}

/// Relative comparison: `a` and `b` are equal when they differ by at most
/// `epsilon` times the larger magnitude.
fn nearly_equal(a: f64, b: f64, epsilon: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let diff = (a - b).abs();
    diff < f64::EPSILON || diff <= a.abs().max(b.abs()) * epsilon
}

fn values_equal(name: &str, a: &Value, b: &Value, epsilon: f64) -> Result<bool, ExprError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(nearly_equal(*x, *y, epsilon)),
        (Value::Unit(x), Value::Unit(y)) if x.name == y.name => Ok(nearly_equal(
            x.value.unwrap_or(1.0),
            y.value.unwrap_or(1.0),
            epsilon,
        )),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::String(x), Value::String(y)) => Ok(x == y),
        (a, b) => Err(mismatch(name, a, b)),
    }
}

fn mismatch(name: &str, a: &Value, b: &Value) -> ExprError {
    ExprError::TypeMismatch(format!(
        "cannot {name} {} and {}",
        a.type_name(),
        b.type_name()
    ))
}
