//! Scope tree with definition, update and link views.
//!
//! [`ScopeTree`] is an arena holding every scope and every symbol of one
//! program. Scopes own their children by id; the parent link is a plain id
//! and never keeps anything alive.
//!
//! Reference edges always point from a symbol to a symbol of the same or an
//! enclosing scope, and [`ScopeTree::set`] refuses any other, so
//! dereferencing terminates.
//!
//! Slots of symbols dropped by [`ScopeTree::clear`] are reused by later
//! allocations. A [`SymbolId`] of a cleared scope must not be used again.

use std::collections::BTreeMap;
use std::rc::Rc;

use mexpr_builtins::{BuiltinRegistry, StdRegistry};
use mexpr_types::{ExprError, ExprResult, Value};

use crate::symbol::{Symbol, SymbolId, SymbolValue};

// ══════════════════════════════════════════════════════════════════════════════
// Scope
// ══════════════════════════════════════════════════════════════════════════════

/// Handle to a scope stored in a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single lexical block.
#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    children: Option<Vec<ScopeId>>,
    /// Every symbol this scope created, by name.
    symbols: BTreeMap<String, SymbolId>,
    /// Names this scope introduces (`a = [1, 2; 3, 4]`).
    defs: BTreeMap<String, SymbolId>,
    /// Names this scope mutates in place (`a(2, 1) = 5.2`).
    updates: BTreeMap<String, SymbolId>,
    /// Names this scope reads (`2 * a`).
    links: BTreeMap<String, SymbolId>,
}

impl Scope {
    fn with_parent(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    fn local_def(&self, name: &str) -> Option<SymbolId> {
        self.defs
            .get(name)
            .or_else(|| self.updates.get(name))
            .copied()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ScopeTree
// ══════════════════════════════════════════════════════════════════════════════

/// Arena of nested scopes and the symbols they own.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    /// Released slots, reused before the arena grows.
    free: Vec<SymbolId>,
    builtins: Rc<dyn BuiltinRegistry>,
}

impl ScopeTree {
    /// Create a tree holding only a root scope backed by `builtins`.
    pub fn new(builtins: Rc<dyn BuiltinRegistry>) -> Self {
        Self {
            scopes: vec![Scope::with_parent(None)],
            symbols: Vec::new(),
            free: Vec::new(),
            builtins,
        }
    }

    /// The outermost scope. It has no parent.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope(scope).parent
    }

    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        self.scope(scope).children.as_deref().unwrap_or(&[])
    }

    /// The registry the root scope falls back to.
    pub fn builtins(&self) -> &Rc<dyn BuiltinRegistry> {
        &self.builtins
    }

    fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    // ── Symbols ──────────────────────────────────────────────────────────

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// The effective value of a symbol, following references.
    ///
    /// An unset chain yields [`Value::Undefined`]. The walk is bounded by the
    /// number of symbols in the tree, so a corrupted chain is reported as
    /// [`ExprError::StructuralInvariant`] instead of looping.
    pub fn get(&self, id: SymbolId) -> ExprResult<Value> {
        let mut current = id;
        for _ in 0..=self.symbols.len() {
            match &self.symbol(current).value {
                SymbolValue::Unset => return Ok(Value::Undefined),
                SymbolValue::Literal(value) => return Ok(value.clone()),
                SymbolValue::Ref(next) => current = *next,
            }
        }
        Err(ExprError::StructuralInvariant(self.symbol(id).name.clone()))
    }

    /// Overwrite a symbol's stored value.
    ///
    /// Literal and unset writes always succeed; `Literal(Undefined)` is
    /// stored as unset. A reference is refused when the target does not live
    /// in the symbol's own scope or an enclosing one, or when the target's
    /// chain already passes through `id`.
    pub fn set(&mut self, id: SymbolId, value: impl Into<SymbolValue>) -> ExprResult<()> {
        let value = match value.into() {
            SymbolValue::Literal(Value::Undefined) => SymbolValue::Unset,
            value => value,
        };
        if let SymbolValue::Ref(target) = value {
            let visible = self.encloses(self.symbol(target).scope, self.symbol(id).scope);
            if !visible || self.reaches(target, id) {
                return Err(ExprError::StructuralInvariant(
                    self.symbol(id).name.clone(),
                ));
            }
        }
        self.symbols[id.index()].value = value;
        Ok(())
    }

    /// Whether following references from `from` arrives at `to`.
    fn reaches(&self, from: SymbolId, to: SymbolId) -> bool {
        let mut current = from;
        for _ in 0..=self.symbols.len() {
            if current == to {
                return true;
            }
            match self.symbol(current).value {
                SymbolValue::Ref(next) => current = next,
                _ => return false,
            }
        }
        true
    }

    /// Whether `outer` is `inner` or one of its ancestors.
    fn encloses(&self, outer: ScopeId, inner: ScopeId) -> bool {
        let mut current = Some(inner);
        while let Some(scope) = current {
            if scope == outer {
                return true;
            }
            current = self.scope(scope).parent;
        }
        false
    }

    /// Write performed by the scope operations themselves.
    fn point(&mut self, id: SymbolId, value: SymbolValue) {
        self.set(id, value)
            .expect("scope operations only point at an enclosing definition");
    }

    fn alloc(&mut self, scope: ScopeId, name: &str, value: SymbolValue) -> SymbolId {
        let symbol = Symbol {
            name: name.to_string(),
            value,
            scope,
        };
        match self.free.pop() {
            Some(id) => {
                self.symbols[id.index()] = symbol;
                id
            }
            None => {
                let id = SymbolId(self.symbols.len() as u32);
                self.symbols.push(symbol);
                id
            }
        }
    }

    // ── Structure ────────────────────────────────────────────────────────

    /// Create a child of `scope`. Names in the child are not visible to the
    /// parent.
    pub fn create_nested_scope(&mut self, scope: ScopeId) -> ScopeId {
        let child = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::with_parent(Some(scope)));
        self.scope_mut(scope)
            .children
            .get_or_insert_with(Vec::new)
            .push(child);
        child
    }

    /// Forget every symbol of `scope` and its descendants and release their
    /// slots. The parent is left untouched.
    pub fn clear(&mut self, scope: ScopeId) {
        let s = self.scope_mut(scope);
        let released: Vec<SymbolId> = std::mem::take(&mut s.symbols).into_values().collect();
        s.defs.clear();
        s.updates.clear();
        s.links.clear();

        // nothing outside the cleared subtree can point into it
        for id in &released {
            self.symbols[id.index()].value = SymbolValue::Unset;
        }
        if !released.is_empty() {
            tracing::trace!(?scope, released = released.len(), "released symbols");
        }
        self.free.extend(released);

        for child in self.children(scope).to_vec() {
            self.clear(child);
        }
    }

    // ── Registration ─────────────────────────────────────────────────────

    /// Get this scope's symbol for `name`, creating it as a reference to the
    /// current definition of `name` if needed.
    pub fn create_symbol(&mut self, scope: ScopeId, name: &str) -> SymbolId {
        if let Some(&id) = self.scope(scope).symbols.get(name) {
            return id;
        }

        let last_def = self.find_def(scope, name);

        // resolving at the root may have materialised a builtin right here
        if let Some(&id) = self.scope(scope).symbols.get(name) {
            return id;
        }

        let id = self.alloc(scope, name, last_def.into());
        self.scope_mut(scope).symbols.insert(name.to_string(), id);
        id
    }

    /// Register a read of `name` in `scope`.
    pub fn create_link(&mut self, scope: ScopeId, name: &str) -> SymbolId {
        if let Some(&id) = self.scope(scope).links.get(name) {
            return id;
        }
        let id = self.create_symbol(scope, name);
        self.scope_mut(scope).links.insert(name.to_string(), id);
        id
    }

    /// Register a definition of `name` in `scope`.
    ///
    /// Only the first definition re-points the undefined symbols of the
    /// subtree at the new symbol; later calls just update the value.
    ///
    /// `Some(Value::Undefined)` counts as no value.
    pub fn create_def(&mut self, scope: ScopeId, name: &str, value: Option<Value>) -> SymbolId {
        let value = value.filter(|value| !value.is_undefined());
        if let Some(&id) = self.scope(scope).defs.get(name) {
            if let Some(value) = value {
                self.point(id, SymbolValue::Literal(value));
            }
            return id;
        }

        let id = self.create_symbol(scope, name);
        self.scope_mut(scope).defs.insert(name.to_string(), id);
        if let Some(value) = value {
            self.point(id, SymbolValue::Literal(value));
        }
        self.relink_undefined(scope, name, id);
        id
    }

    /// Register an in-place mutation of an existing binding of `name`.
    pub fn create_update(&mut self, scope: ScopeId, name: &str) -> SymbolId {
        if let Some(&id) = self.scope(scope).updates.get(name) {
            return id;
        }

        let id = self.create_link(scope, name);
        self.scope_mut(scope).updates.insert(name.to_string(), id);
        self.relink_undefined(scope, name, id);
        id
    }

    /// Register a symbol holding `value` as a definition of `name`.
    ///
    /// The scope's existing symbol for `name` is reused when there is one,
    /// so symbols already pointing at it see the constant.
    pub fn create_constant(&mut self, scope: ScopeId, name: &str, value: Value) -> SymbolId {
        let id = match self.scope(scope).symbols.get(name) {
            Some(&id) => {
                self.point(id, value.into());
                id
            }
            None => {
                let id = self.alloc(scope, name, value.into());
                self.scope_mut(scope).symbols.insert(name.to_string(), id);
                id
            }
        };
        self.scope_mut(scope).defs.insert(name.to_string(), id);
        id
    }

    fn relink_undefined(&mut self, scope: ScopeId, name: &str, target: SymbolId) {
        let undefined = self.undefined_symbols(scope, Some(name));
        let mut relinked = 0usize;
        for id in undefined {
            if id != target {
                self.point(id, SymbolValue::Ref(target));
                relinked += 1;
            }
        }
        if relinked > 0 {
            tracing::trace!(?scope, name, relinked, "relinked undefined symbols");
        }
    }

    // ── Resolution ───────────────────────────────────────────────────────

    /// The symbol holding the latest definition or update of `name` visible
    /// from `scope`.
    ///
    /// Falls back to the builtin registry at the root, materialising the
    /// builtin as a constant of the root scope so repeated lookups return the
    /// same symbol.
    pub fn find_def(&mut self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = scope;
        loop {
            let s = self.scope(current);
            if let Some(id) = s.local_def(name) {
                return Some(id);
            }
            match s.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let value = self
            .builtins
            .lookup(name)
            .or_else(|| self.builtins.unit(name))?;
        tracing::trace!(name, "materialised builtin");
        Some(self.create_constant(current, name, value))
    }

    /// Resolve `name` from `scope` and dereference it.
    pub fn lookup(&mut self, scope: ScopeId, name: &str) -> ExprResult<Value> {
        let id = self
            .find_def(scope, name)
            .ok_or_else(|| ExprError::UnresolvedSymbol(name.to_string()))?;
        match self.get(id)? {
            Value::Undefined => Err(ExprError::UnresolvedSymbol(name.to_string())),
            value => Ok(value),
        }
    }

    /// Reset the local symbol for `name`, if there is one.
    pub fn set_undefined(&mut self, scope: ScopeId, name: &str) {
        if let Some(&id) = self.scope(scope).symbols.get(name) {
            self.point(id, SymbolValue::Unset);
        }
    }

    pub fn remove_link(&mut self, scope: ScopeId, name: &str) {
        self.scope_mut(scope).links.remove(name);
    }

    pub fn remove_def(&mut self, scope: ScopeId, name: &str) {
        self.scope_mut(scope).defs.remove(name);
    }

    pub fn remove_update(&mut self, scope: ScopeId, name: &str) {
        self.scope_mut(scope).updates.remove(name);
    }

    /// Wire every symbol of `scope` and its descendants to the closest
    /// enclosing definition, or to unset when there is none.
    ///
    /// Run once after the whole tree has been populated. Local definitions
    /// keep their own value.
    pub fn init(&mut self, scope: ScopeId) {
        let parent = self.scope(scope).parent;
        let pending: Vec<(String, SymbolId)> = {
            let s = self.scope(scope);
            s.symbols
                .iter()
                .filter(|&(name, id)| s.defs.get(name) != Some(id))
                .map(|(name, id)| (name.clone(), *id))
                .collect()
        };
        tracing::debug!(?scope, symbols = pending.len(), "init scope");

        for (name, id) in pending {
            let value = match parent {
                Some(parent) => self.find_def(parent, &name).into(),
                None => SymbolValue::Unset,
            };
            self.point(id, value);
        }

        for child in self.children(scope).to_vec() {
            self.init(child);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Whether `scope` or any of its descendants reads `name`.
    pub fn has_link(&self, scope: ScopeId, name: &str) -> bool {
        self.scope(scope).links.contains_key(name)
            || self
                .children(scope)
                .iter()
                .any(|&child| self.has_link(child, name))
    }

    /// Whether `scope` itself defines `name`.
    pub fn has_def(&self, scope: ScopeId, name: &str) -> bool {
        self.scope(scope).defs.contains_key(name)
    }

    /// Whether `scope` itself updates `name`.
    pub fn has_update(&self, scope: ScopeId, name: &str) -> bool {
        self.scope(scope).updates.contains_key(name)
    }

    /// Every symbol in `scope` and its descendants whose stored value is
    /// unset, optionally restricted to one name.
    pub fn undefined_symbols(&self, scope: ScopeId, name: Option<&str>) -> Vec<SymbolId> {
        let mut found = Vec::new();
        self.collect_undefined(scope, name, &mut found);
        found
    }

    fn collect_undefined(&self, scope: ScopeId, name: Option<&str>, out: &mut Vec<SymbolId>) {
        let s = self.scope(scope);
        match name {
            Some(name) => out.extend(
                s.symbols
                    .get(name)
                    .copied()
                    .filter(|&id| self.symbol(id).value.is_unset()),
            ),
            None => out.extend(
                s.symbols
                    .values()
                    .copied()
                    .filter(|&id| self.symbol(id).value.is_unset()),
            ),
        }
        for &child in self.children(scope) {
            self.collect_undefined(child, name, out);
        }
    }
}

impl Default for ScopeTree {
    /// A tree backed by the default [`StdRegistry`].
    fn default() -> Self {
        Self::new(Rc::new(StdRegistry::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ScopeTree {
        ScopeTree::new(Rc::new(StdRegistry::empty()))
    }

    #[test]
    fn children_are_allocated_lazily() {
        let mut t = tree();
        let root = t.root();
        assert!(t.scope(root).children.is_none());
        assert!(t.children(root).is_empty());

        let child = t.create_nested_scope(root);
        assert_eq!(t.children(root), &[child]);
        assert_eq!(t.parent(child), Some(root));
        assert_eq!(t.parent(root), None);
    }

    #[test]
    fn reaches_follows_the_chain() {
        let mut t = tree();
        let root = t.root();
        let a = t.create_def(root, "a", Some(Value::Number(1.0)));
        let child = t.create_nested_scope(root);
        let b = t.create_link(child, "a");
        assert_eq!(t.symbol(b).value(), &SymbolValue::Ref(a));
        assert!(t.reaches(b, a));
        assert!(!t.reaches(a, b));
    }

    #[test]
    fn set_refuses_a_cycle() {
        let mut t = tree();
        let root = t.root();
        let a = t.create_def(root, "a", Some(Value::Number(1.0)));
        let child = t.create_nested_scope(root);
        let b = t.create_link(child, "a");

        let err = t.set(a, SymbolValue::Ref(b)).unwrap_err();
        assert_eq!(err, ExprError::StructuralInvariant("a".into()));
        // refused writes leave the value alone
        assert_eq!(t.get(b), Ok(Value::Number(1.0)));

        assert!(t.set(a, SymbolValue::Ref(a)).is_err());
    }
}
