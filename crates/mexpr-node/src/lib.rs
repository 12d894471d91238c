//! Expression-tree node contract and closure compiler.
//!
//! Every tree element implements [`Node`]. A node can be evaluated directly
//! against the [`ScopeTree`](mexpr_scope::ScopeTree) it was built in, or
//! compiled once into an [`Evaluator`] and run many times against different
//! [`Bindings`].
//!
//! ```text
//! tree of nodes ─ emit ─▶ fragments + DefTable ─ assemble ─▶ Evaluator ─ eval(bindings) ─▶ Value
//! ```

pub mod bindings;
pub mod compile;
pub mod filter;
pub mod node;
pub mod nodes;

pub use bindings::Bindings;
pub use compile::{fragment, DefKey, DefTable, Environment, Evaluator, Fragment, Frame};
pub use filter::{Attr, Filter, NodeKind};
pub use node::Node;
pub use nodes::{AssignmentNode, BlockEntry, BlockNode, ConstantNode, FunctionNode, OperatorNode, SymbolNode};
