use core::ops;

use slab::Slab;

/// Key of a node in the [`Slab`] backing a collection.
///
/// A key is only valid until its node is removed, after which the slab may
/// hand it out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
  #[inline]
  pub(crate) const fn new(key: usize) -> Self {
    Self(key)
  }

  #[inline]
  pub(crate) const fn key(self) -> usize {
    self.0
  }
}

impl<N> ops::Index<NodeId> for Slab<N> {
  type Output = N;

  #[inline]
  fn index(&self, id: NodeId) -> &N {
    &self[id.0]
  }
}

impl<N> ops::IndexMut<NodeId> for Slab<N> {
  #[inline]
  fn index_mut(&mut self, id: NodeId) -> &mut N {
    &mut self[id.0]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_index_by_node_id() {
    let mut slab = Slab::new();
    let a = NodeId::new(slab.insert("a"));
    let b = NodeId::new(slab.insert("b"));
    assert_eq!(slab[a], "a");
    assert_eq!(slab[b], "b");

    slab[b] = "c";
    assert_eq!(slab[b], "c");
    assert_eq!(slab.remove(a.key()), "a");
    assert!(slab.get(a.key()).is_none());
  }

  #[test]
  fn test_removed_keys_are_reused() {
    let mut slab = Slab::with_capacity(4);
    let ids: Vec<_> = (0..4).map(|i| NodeId::new(slab.insert(i))).collect();
    slab.remove(ids[1].key());
    slab.remove(ids[3].key());

    // Last freed, first reused.
    assert_eq!(NodeId::new(slab.insert(30)), ids[3]);
    assert_eq!(NodeId::new(slab.insert(10)), ids[1]);
    assert_eq!(slab.insert(4), 4);
    assert_eq!(slab[ids[1]], 10);
    assert_eq!(slab[ids[3]], 30);
  }
}
