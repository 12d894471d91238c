//! Symbol cells.

use mexpr_types::Value;

use crate::ScopeId;

/// Handle to a symbol stored in a [`ScopeTree`](crate::ScopeTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolValue {
    /// Nothing bound yet; dereferences to [`Value::Undefined`].
    Unset,
    /// A terminal value.
    Literal(Value),
    /// Alias of another symbol, usually an enclosing definition.
    Ref(SymbolId),
}

impl SymbolValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, SymbolValue::Unset)
    }
}

impl From<Value> for SymbolValue {
    /// [`Value::Undefined`] is stored as [`SymbolValue::Unset`], so there is
    /// one encoding of "not bound".
    fn from(value: Value) -> Self {
        match value {
            Value::Undefined => SymbolValue::Unset,
            value => SymbolValue::Literal(value),
        }
    }
}

impl From<Option<SymbolId>> for SymbolValue {
    fn from(target: Option<SymbolId>) -> Self {
        target.map_or(SymbolValue::Unset, SymbolValue::Ref)
    }
}

/// A named value cell owned by the scope that created it.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub(crate) name: String,
    pub(crate) value: SymbolValue,
    pub(crate) scope: ScopeId,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw stored value, without following references.
    pub fn value(&self) -> &SymbolValue {
        &self.value
    }

    /// The scope whose registry created this symbol.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}
