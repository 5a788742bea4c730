//! Layers: ordered top-level containers of scene nodes
//!
//! A layer owns no rendering logic; it is purely an ordered, duplicate-free
//! membership list walked by the scene each frame. Insertion order drives
//! traversal (and therefore draw submission order within a category).

use crate::scene::NodeKey;

/// Capacity growth step; membership storage grows by this many slots at a
/// time once full.
pub(crate) const LAYER_CHUNK: usize = 32;

/// An ordered, duplicate-free container of top-level nodes
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    active: bool,
    members: Vec<NodeKey>,
}

impl Layer {
    /// Create an empty, active layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            members: Vec::with_capacity(LAYER_CHUNK),
        }
    }

    /// Layer name (identifies the layer within a scene)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the layer participates in update and draw
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate or deactivate the whole layer
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Add a node to the layer.
    ///
    /// Returns `false` (leaving the layer untouched) if the node is already
    /// a member; adding is idempotent.
    pub fn add(&mut self, key: NodeKey) -> bool {
        if self.contains(key) {
            return false;
        }
        if self.members.len() == self.members.capacity() {
            self.members.reserve_exact(LAYER_CHUNK);
        }
        self.members.push(key);
        true
    }

    /// Remove a node, compacting in place and preserving the relative
    /// order of the remaining members. Returns `false` if it was not a
    /// member.
    pub fn remove(&mut self, key: NodeKey) -> bool {
        match self.members.iter().position(|k| *k == key) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Membership test
    pub fn contains(&self, key: NodeKey) -> bool {
        self.members.contains(&key)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the layer has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member at a traversal position
    pub fn get(&self, index: usize) -> Option<NodeKey> {
        self.members.get(index).copied()
    }

    /// Members in traversal order
    pub fn iter(&self) -> impl Iterator<Item = &NodeKey> {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<NodeKey> {
        let mut arena: SlotMap<NodeKey, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn add_is_idempotent() {
        let k = keys(1);
        let mut layer = Layer::new("world");

        assert!(layer.add(k[0]));
        assert!(!layer.add(k[0]));
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn remove_then_re_add_preserves_other_member_order() {
        let k = keys(4);
        let mut layer = Layer::new("world");
        for key in &k {
            layer.add(*key);
        }

        assert!(layer.remove(k[1]));
        let order: Vec<_> = layer.iter().copied().collect();
        assert_eq!(order, vec![k[0], k[2], k[3]]);

        layer.add(k[1]);
        let order: Vec<_> = layer.iter().copied().collect();
        assert_eq!(order, vec![k[0], k[2], k[3], k[1]]);
    }

    #[test]
    fn remove_missing_member_reports_failure() {
        let k = keys(2);
        let mut layer = Layer::new("world");
        layer.add(k[0]);

        assert!(!layer.remove(k[1]));
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn growth_past_chunk_boundary_keeps_order() {
        let k = keys(LAYER_CHUNK + 3);
        let mut layer = Layer::new("world");
        for key in &k {
            assert!(layer.add(*key));
        }

        assert_eq!(layer.len(), LAYER_CHUNK + 3);
        assert_eq!(layer.get(0), Some(k[0]));
        assert_eq!(layer.get(LAYER_CHUNK + 2), Some(k[LAYER_CHUNK + 2]));
    }
}
