use mexpr_scope::{ScopeId, ScopeTree, SymbolId};
use mexpr_types::{ExprResult, Value};

use crate::compile::{fragment, DefTable, Fragment};
use crate::filter::{Attr, NodeKind};
use crate::Node;

/// `name = expr`
#[derive(Debug)]
pub struct AssignmentNode {
    pub name: String,
    pub expr: Box<dyn Node>,
    symbol: SymbolId,
}

impl AssignmentNode {
    /// Register a definition of `name` in `scope`.
    pub fn new(scopes: &mut ScopeTree, scope: ScopeId, name: &str, expr: Box<dyn Node>) -> Self {
        Self {
            name: name.to_string(),
            expr,
            symbol: scopes.create_def(scope, name, None),
        }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }
}

impl Node for AssignmentNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Assignment
    }

    fn eval(&self, scopes: &mut ScopeTree) -> ExprResult<Value> {
        let value = self.expr.eval(scopes)?;
        scopes.set(self.symbol, value.clone())?;
        Ok(value)
    }

    fn emit(&self, defs: &mut DefTable) -> ExprResult<Fragment> {
        let name = self.name.clone();
        let expr = self.expr.emit(defs)?;
        Ok(fragment(move |frame| {
            let value = expr(frame)?;
            frame.bindings_mut().set(&name, value.clone());
            Ok(value)
        }))
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![self.expr.as_ref()]
    }

    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "name" => Some(Attr::from(self.name.as_str())),
            _ => None,
        }
    }

    fn render(&self) -> String {
        format!("{} = {}", self.name, self.expr.render())
    }
}
