//! The contract every expression-tree element implements.

use std::fmt;

use mexpr_scope::ScopeTree;
use mexpr_types::{ExprError, ExprResult, Value};

use crate::compile::{DefTable, Environment, Evaluator, Fragment};
use crate::filter::{Attr, Filter, NodeKind};

/// An element of an expression tree.
///
/// Every method has a default. A variant that overrides nothing is the bare
/// interface: it cannot be evaluated or compiled and renders as an empty
/// string.
pub trait Node: fmt::Debug {
    /// The variant this node belongs to.
    fn kind(&self) -> NodeKind {
        NodeKind::Node
    }

    /// Whether this node is-a `kind`.
    fn is_a(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Node || self.kind() == kind
    }

    /// Evaluate directly against the scope tree the node was built in.
    fn eval(&self, scopes: &mut ScopeTree) -> ExprResult<Value> {
        let _ = scopes;
        Err(ExprError::UnsupportedOperation(self.kind().to_string()))
    }

    /// Compile into a reusable evaluator.
    ///
    /// Fails with [`ExprError::TypeConfiguration`] if `env` is not a valid
    /// execution context, or with whatever [`Node::emit`] reports.
    fn compile(&self, env: &Environment) -> ExprResult<Evaluator> {
        let _span = tracing::debug_span!("compile", kind = %self.kind()).entered();
        env.validate()?;
        let mut defs = DefTable::new(env.clone());
        let root = self.emit(&mut defs)?;
        Ok(Evaluator::new(defs, root))
    }

    /// Emit this node's fragment, registering any helper values it needs in
    /// `defs`.
    fn emit(&self, defs: &mut DefTable) -> ExprResult<Fragment> {
        let _ = defs;
        Err(ExprError::CannotCompile(self.kind().to_string()))
    }

    /// Direct children, in source order.
    fn children(&self) -> Vec<&dyn Node> {
        Vec::new()
    }

    /// The attribute called `name`, for filter matching.
    fn attr(&self, name: &str) -> Option<Attr> {
        let _ = name;
        None
    }

    /// Every node of this subtree, itself included, that matches `filter`,
    /// in pre-order.
    ///
    /// Trait objects use the inherent `<dyn Node>::find`, which behaves the
    /// same.
    fn find(&self, filter: &Filter) -> Vec<&dyn Node>
    where
        Self: Sized,
    {
        let mut found = Vec::new();
        collect(self, filter, &mut found);
        found
    }

    /// Whether this node satisfies every constraint of `filter`.
    fn matches(&self, filter: &Filter) -> bool {
        filter.kind.map_or(true, |kind| self.is_a(kind))
            && filter
                .props
                .iter()
                .all(|(name, expected)| self.attr(name).is_some_and(|a| a.loose_eq(expected)))
    }

    /// Human-readable rendering.
    fn render(&self) -> String {
        String::new()
    }
}

impl<'a> dyn Node + 'a {
    /// Every node of this subtree, itself included, that matches `filter`,
    /// in pre-order.
    pub fn find(&self, filter: &Filter) -> Vec<&dyn Node> {
        let mut found = Vec::new();
        collect(self, filter, &mut found);
        found
    }
}

fn collect<'n>(node: &'n dyn Node, filter: &Filter, out: &mut Vec<&'n dyn Node>) {
    if node.matches(filter) {
        out.push(node);
    }
    for child in node.children() {
        collect(child, filter, out);
    }
}

impl fmt::Display for dyn Node + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
