use mexpr_scope::ScopeTree;
use mexpr_types::{ExprResult, Value};

use crate::compile::{fragment, DefTable, Fragment};
use crate::filter::{Attr, NodeKind};
use crate::Node;

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantNode {
    pub value: Value,
}

impl ConstantNode {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Node for ConstantNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Constant
    }

    fn eval(&self, _scopes: &mut ScopeTree) -> ExprResult<Value> {
        Ok(self.value.clone())
    }

    fn emit(&self, _defs: &mut DefTable) -> ExprResult<Fragment> {
        let value = self.value.clone();
        Ok(fragment(move |_| Ok(value.clone())))
    }

    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "value" => Attr::from_value(&self.value),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.value.to_string()
    }
}
