//! Runtime values produced by evaluating an expression tree.
//!
//! Numeric semantics live in the builtin registry; this module only defines
//! the shapes values can take and how they print.

use std::fmt;
use std::sync::Arc;

use crate::ExprError;

/// Signature every native function is wrapped into.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, ExprError> + Send + Sync;

/// A value bound to a symbol or produced by evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Returned when dereferencing an unset symbol chain.
    Undefined,
    Number(f64),
    Bool(bool),
    String(String),
    Unit(Unit),
    List(Vec<Value>),
    Function(BuiltinFn),
}

impl Value {
    /// Short lowercase name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Unit(_) => "unit",
            Value::List(_) => "list",
            Value::Function(_) => "function",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&BuiltinFn> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<Unit> for Value {
    fn from(u: Unit) -> Self {
        Value::Unit(u)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Number(n) => write_number(f, *n),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Unit(u) => write!(f, "{u}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Function(func) => write!(f, "function {}", func.name()),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

/// A unit of measurement, optionally carrying a magnitude.
///
/// A unit built from a bare identifier (`cm`) has no magnitude.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub value: Option<f64>,
    pub name: String,
}

impl Unit {
    /// A plain unit with no magnitude.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            value: None,
            name: name.into(),
        }
    }

    pub fn with_value(value: f64, name: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            name: name.into(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => {
                write_number(f, v)?;
                write!(f, " {}", self.name)
            }
            None => write!(f, "{}", self.name),
        }
    }
}

/// A named native function.
///
/// Two functions compare equal only when they share a name and the same
/// underlying closure.
#[derive(Clone)]
pub struct BuiltinFn {
    name: String,
    func: Arc<NativeFn>,
}

impl BuiltinFn {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ExprError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function with already evaluated arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, ExprError> {
        (self.func)(args)
    }
}

impl PartialEq for BuiltinFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn units_and_lists_render() {
        assert_eq!(Value::Unit(Unit::plain("cm")).to_string(), "cm");
        assert_eq!(Value::Unit(Unit::with_value(5.0, "cm")).to_string(), "5 cm");
        let list = Value::List(vec![Value::Number(1.0), Value::Bool(true)]);
        assert_eq!(list.to_string(), "[1, true]");
    }

    #[test]
    fn functions_compare_by_identity() {
        let f = BuiltinFn::new("id", |args| Ok(args[0].clone()));
        let g = BuiltinFn::new("id", |args| Ok(args[0].clone()));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
        assert_eq!(f.call(&[Value::Number(2.0)]), Ok(Value::Number(2.0)));
    }
}
