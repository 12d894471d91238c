use mexpr_scope::{ScopeId, ScopeTree, SymbolId};
use mexpr_types::{ExprError, ExprResult, Value};

use crate::compile::{fragment, DefTable, Fragment};
use crate::filter::{Attr, NodeKind};
use crate::Node;

/// A read of a named variable, function or unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolNode {
    pub name: String,
    symbol: SymbolId,
}

impl SymbolNode {
    /// Register a link to `name` in `scope`.
    pub fn new(scopes: &mut ScopeTree, scope: ScopeId, name: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: scopes.create_link(scope, name),
        }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }
}

impl Node for SymbolNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Symbol
    }

    fn eval(&self, scopes: &mut ScopeTree) -> ExprResult<Value> {
        match scopes.get(self.symbol)? {
            Value::Undefined => Err(ExprError::UnresolvedSymbol(self.name.clone())),
            value => Ok(value),
        }
    }

    fn emit(&self, defs: &mut DefTable) -> ExprResult<Fragment> {
        let name = self.name.clone();
        let fallback = defs.define_builtin(&name);
        Ok(fragment(move |frame| frame.resolve(&name, fallback)))
    }

    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "name" => Some(Attr::from(self.name.as_str())),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.name.clone()
    }
}
