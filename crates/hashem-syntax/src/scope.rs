//! Lexical scopes for one function.
//!
//! Scopes live in an arena owned by the function declaration and point at
//! their parent by index. Every declared name maps to a frame slot; slots
//! are numbered across the whole function so a call frame is one flat
//! array.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Index of a scope inside a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The function-level scope.
    pub const ROOT: ScopeId = ScopeId(0);

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a value slot inside a call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl SlotId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One block scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeData {
    parent: Option<ScopeId>,
    slots: IndexMap<SmolStr, SlotId>,
}

impl ScopeData {
    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Names declared directly in this scope, in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = (&SmolStr, SlotId)> + '_ {
        self.slots.iter().map(|(name, slot)| (name, *slot))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<SlotId> {
        self.slots.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Arena of scopes for one function body.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
    slot_count: u32,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the function-level scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData::default()],
            slot_count: 0,
        }
    }

    /// Open a nested scope.
    pub fn push_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(ScopeData {
            parent: Some(parent),
            slots: IndexMap::new(),
        });
        id
    }

    /// Declare `name` directly in `scope`, returning the existing slot if it is already there.
    pub fn declare(&mut self, scope: ScopeId, name: &SmolStr) -> SlotId {
        if let Some(slot) = self.scopes[scope.index()].get(name) {
            return slot;
        }
        let slot = SlotId(self.slot_count);
        self.slot_count += 1;
        self.scopes[scope.index()].slots.insert(name.clone(), slot);
        slot
    }

    /// Find `name` in `scope` or any of its parents.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SlotId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = self.scopes.get(id.index())?;
            if let Some(slot) = data.get(name) {
                return Some(slot);
            }
            current = data.parent;
        }
        None
    }

    #[must_use]
    pub fn get(&self, scope: ScopeId) -> Option<&ScopeData> {
        self.scopes.get(scope.index())
    }

    #[must_use]
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.get(scope).and_then(ScopeData::parent)
    }

    /// Total number of slots a frame for this function needs.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_count as usize
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
