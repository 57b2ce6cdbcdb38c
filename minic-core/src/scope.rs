//! Scope tree and symbol table.
//!
//! Scopes live in an arena and are addressed by [`ScopeId`]; index 0 is
//! always the global scope. Symbols are kept in one append-only list in
//! declaration order. Lookup walks the parent chain from the innermost
//! scope outwards and returns the first entry whose name matches within
//! each scope, so shadowing resolves to the nearest declaration.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::Serialize;

use crate::types::Type;

/// Stable handle of a scope frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Construct that opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Global,
    If,
    While,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    /// Indices into the symbol list, in declaration order.
    #[serde(skip)]
    pub symbols: Vec<SymbolId>,
}

/// Index of an entry in the symbol list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub usize);

/// One declared name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolTableEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub scope: ScopeId,
    pub line: u32,
    /// Literal text of the initializer, when the initializer is a literal.
    #[serde(rename = "value", skip_serializing_if = "Option::is_none")]
    pub literal_initializer: Option<String>,
}

/// Usage flags tracked during analysis, parallel to the symbol list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub used: bool,
    pub initialized: bool,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    entries: Vec<SymbolTableEntry>,
    usage: Vec<Usage>,
    /// Active scopes, innermost last.
    stack: Vec<ScopeId>,
}

impl SymbolTable {
    /// A table holding only the global scope, which is also current.
    pub fn new() -> Self {
        let mut table = SymbolTable::default();
        table.reset();
        table
    }

    pub fn reset(&mut self) {
        self.scopes.clear();
        self.entries.clear();
        self.usage.clear();
        self.stack.clear();
        self.scopes.push(Scope {
            id: ScopeId::GLOBAL,
            parent: None,
            kind: ScopeKind::Global,
            symbols: Vec::new(),
        });
        self.stack.push(ScopeId::GLOBAL);
    }

    pub fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::GLOBAL)
    }

    /// Open a child of the current scope and make it current.
    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            parent: Some(self.current()),
            kind,
            symbols: Vec::new(),
        });
        self.stack.push(id);
        id
    }

    /// Close the current scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Entry declared directly in the current scope, if any.
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.find_in(self.current(), name)
    }

    /// 現在のスコープから外側へ向かって `name` を探す
    pub fn resolve(&self, name: &str) -> Option<SymbolId> {
        let mut scope = Some(self.current());
        while let Some(id) = scope {
            if let Some(found) = self.find_in(id, name) {
                return Some(found);
            }
            scope = self.scopes[id.index()].parent;
        }
        None
    }

    fn find_in(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.index()]
            .symbols
            .iter()
            .copied()
            .find(|id| self.entries[id.0].name == name)
    }

    /// Record a declaration in the current scope.
    ///
    /// The caller checks [`lookup_local`](Self::lookup_local) first; names
    /// are unique per scope.
    pub fn declare(&mut self, entry: SymbolTableEntry, initialized: bool) -> SymbolId {
        let id = SymbolId(self.entries.len());
        let scope = entry.scope;
        self.entries.push(entry);
        self.usage.push(Usage {
            used: false,
            initialized,
        });
        self.scopes[scope.index()].symbols.push(id);
        id
    }

    pub fn entry(&self, id: SymbolId) -> &SymbolTableEntry {
        &self.entries[id.0]
    }

    pub fn usage(&self, id: SymbolId) -> Usage {
        self.usage[id.0]
    }

    pub fn mark_used(&mut self, id: SymbolId) {
        self.usage[id.0].used = true;
    }

    pub fn mark_initialized(&mut self, id: SymbolId) {
        self.usage[id.0].initialized = true;
    }

    /// Entries in declaration order with their usage flags.
    pub fn iter(&self) -> impl Iterator<Item = (&SymbolTableEntry, Usage)> + '_ {
        self.entries.iter().zip(self.usage.iter().copied())
    }

    /// Consume the table, yielding entries and the scope tree.
    pub fn into_parts(self) -> (Vec<SymbolTableEntry>, Vec<Scope>) {
        (self.entries, self.scopes)
    }
}
