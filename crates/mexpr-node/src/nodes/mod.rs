//! Reference node variants.
//!
//! Variants that read or bind a name register themselves with the
//! [`ScopeTree`](mexpr_scope::ScopeTree) when they are constructed, the way a
//! parser would while building the tree.

mod assignment;
mod block;
mod constant;
mod function;
mod operator;
mod symbol;

pub use assignment::AssignmentNode;
pub use block::{BlockEntry, BlockNode};
pub use constant::ConstantNode;
pub use function::FunctionNode;
pub use operator::OperatorNode;
pub use symbol::SymbolNode;

use mexpr_scope::ScopeTree;
use mexpr_types::{ExprResult, Value};

use crate::{Fragment, Node};

fn eval_all(nodes: &[Box<dyn Node>], scopes: &mut ScopeTree) -> ExprResult<Vec<Value>> {
    nodes.iter().map(|node| node.eval(scopes)).collect()
}

fn emit_all(nodes: &[Box<dyn Node>], defs: &mut crate::DefTable) -> ExprResult<Vec<Fragment>> {
    nodes.iter().map(|node| node.emit(defs)).collect()
}

fn children_of(nodes: &[Box<dyn Node>]) -> Vec<&dyn Node> {
    nodes.iter().map(|node| node.as_ref()).collect()
}
