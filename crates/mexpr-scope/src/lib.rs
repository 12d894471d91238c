//! Nested symbol scopes for mexpr expression trees.
//!
//! A [`ScopeTree`] holds one scope per lexical block. Every scope keeps a
//! registry of [`Symbol`]s plus three role views over it (definitions,
//! updates, links). Symbols may point at other symbols, which is how a name
//! read in a nested block ends up sharing the value of the enclosing
//! definition, including definitions that appear later in the source.

mod symbol;
mod tree;

pub use symbol::{Symbol, SymbolId, SymbolValue};
pub use tree::{ScopeId, ScopeTree};
