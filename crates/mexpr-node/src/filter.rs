//! Structural filters for [`Node::find`](crate::Node) and
//! [`Node::matches`](crate::Node::matches).

use std::fmt;

use mexpr_types::Value;

/// The variant a node belongs to.
///
/// Every node is-a [`NodeKind::Node`]; otherwise a node is only its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Node,
    Constant,
    Symbol,
    Assignment,
    Operator,
    Function,
    Block,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Node => "Node",
            Self::Constant => "ConstantNode",
            Self::Symbol => "SymbolNode",
            Self::Assignment => "AssignmentNode",
            Self::Operator => "OperatorNode",
            Self::Function => "FunctionNode",
            Self::Block => "BlockNode",
        };
        f.write_str(name)
    }
}

/// A node attribute value as seen by filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Attr {
    /// Loose equality: numbers and numeric strings compare by value, and
    /// booleans compare as `1`/`0`.
    pub fn loose_eq(&self, other: &Attr) -> bool {
        match (self, other) {
            (Attr::Str(a), Attr::Str(b)) => a == b,
            (Attr::Num(a), Attr::Num(b)) => a == b,
            (Attr::Bool(a), Attr::Bool(b)) => a == b,
            (Attr::Num(n), Attr::Str(s)) | (Attr::Str(s), Attr::Num(n)) => {
                s.trim().parse::<f64>().is_ok_and(|v| v == *n)
            }
            (Attr::Bool(b), other) | (other, Attr::Bool(b)) => {
                Attr::Num(if *b { 1.0 } else { 0.0 }).loose_eq(other)
            }
        }
    }

    /// The attribute form of a value, for the variants that have one.
    pub fn from_value(value: &Value) -> Option<Attr> {
        match value {
            Value::Number(n) => Some(Attr::Num(*n)),
            Value::Bool(b) => Some(Attr::Bool(*b)),
            Value::String(s) => Some(Attr::Str(s.clone())),
            Value::Unit(u) => Some(Attr::Str(u.to_string())),
            Value::Function(f) => Some(Attr::Str(f.name().to_string())),
            Value::Undefined | Value::List(_) => None,
        }
    }
}

impl From<&str> for Attr {
    fn from(s: &str) -> Self {
        Attr::Str(s.to_string())
    }
}

impl From<String> for Attr {
    fn from(s: String) -> Self {
        Attr::Str(s)
    }
}

impl From<f64> for Attr {
    fn from(n: f64) -> Self {
        Attr::Num(n)
    }
}

impl From<i32> for Attr {
    fn from(n: i32) -> Self {
        Attr::Num(f64::from(n))
    }
}

impl From<bool> for Attr {
    fn from(b: bool) -> Self {
        Attr::Bool(b)
    }
}

/// Constraints a node must satisfy. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// The node must be-a this kind.
    pub kind: Option<NodeKind>,
    /// Every listed attribute must loosely equal the given value.
    pub props: Vec<(String, Attr)>,
}

impl Filter {
    /// A filter with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter on node kind only.
    pub fn of(kind: NodeKind) -> Self {
        Self {
            kind: Some(kind),
            props: Vec::new(),
        }
    }

    /// Add an attribute constraint.
    pub fn prop(mut self, name: &str, value: impl Into<Attr>) -> Self {
        self.props.push((name.to_string(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_equality_across_types() {
        assert!(Attr::Num(2.0).loose_eq(&Attr::from("2")));
        assert!(Attr::from(" 2.5 ").loose_eq(&Attr::Num(2.5)));
        assert!(Attr::Bool(true).loose_eq(&Attr::Num(1.0)));
        assert!(Attr::from("0").loose_eq(&Attr::Bool(false)));
        assert!(!Attr::from("x").loose_eq(&Attr::Num(0.0)));
        assert!(!Attr::from("a").loose_eq(&Attr::from("b")));
    }

    #[test]
    fn filter_builder() {
        let f = Filter::of(NodeKind::Symbol).prop("name", "x");
        assert_eq!(f.kind, Some(NodeKind::Symbol));
        assert_eq!(f.props, vec![("name".to_string(), Attr::from("x"))]);
        assert_eq!(Filter::new(), Filter::default());
    }
}
