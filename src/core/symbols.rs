use indexmap::IndexMap;

use crate::core::ast::Node;

/// Insertion-ordered table of named rule definitions.
///
/// Redefining a name replaces the earlier body while keeping the
/// original position, so the last definition in the source wins.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    rules: IndexMap<String, Node>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rule definition.
    pub fn define(&mut self, name: impl Into<String>, body: Node) {
        self.rules.insert(name.into(), body);
    }

    /// Looks up the body of a named rule.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.rules.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates the definitions in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.rules.iter().map(|(name, body)| (name.as_str(), body))
    }
}
