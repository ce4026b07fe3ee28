//! Click subscriptions for action items.

use crate::surface::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Owns one subscription per bound node. Rebinding disposes the whole
/// previous generation, so a node can never end up with two handlers.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    bindings: HashMap<NodeId, Subscription>,
    next: u64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every existing subscription and binds each of `nodes` once.
    /// Returns how many subscriptions were disposed.
    pub fn rebind(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> usize {
        let disposed = self.bindings.len();
        self.bindings.clear();
        for node in nodes {
            if !self.bindings.contains_key(&node) {
                let subscription = Subscription(self.next);
                self.next += 1;
                self.bindings.insert(node, subscription);
            }
        }
        disposed
    }

    pub fn subscription(&self, node: NodeId) -> Option<Subscription> {
        self.bindings.get(&node).copied()
    }

    pub fn release(&mut self, node: NodeId) -> Option<Subscription> {
        self.bindings.remove(&node)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebind_replaces_previous_generation() {
        let mut registry = HandlerRegistry::new();
        assert_eq!(registry.rebind([1, 2, 3]), 0);
        let old = registry.subscription(2).unwrap();

        assert_eq!(registry.rebind([2, 3]), 3);
        assert_eq!(registry.len(), 2);
        assert!(registry.subscription(1).is_none());
        assert_ne!(registry.subscription(2).unwrap(), old);
    }

    #[test]
    fn duplicate_nodes_get_one_subscription() {
        let mut registry = HandlerRegistry::new();
        registry.rebind([4, 4, 4]);
        assert_eq!(registry.len(), 1);
        assert!(registry.release(4).is_some());
        assert!(registry.is_empty());
    }
}
