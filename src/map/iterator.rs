use core::iter::FusedIterator;

use super::{Node, NodeId, Slab};

/// An iterator over the entries of a [`SkipMap`](super::SkipMap), in
/// ascending key order.
pub struct Iter<'a, K, V> {
  nodes: &'a Slab<Node<K, V>>,
  next: Option<NodeId>,
  remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
  #[inline]
  fn clone(&self) -> Self {
    Self { ..*self }
  }
}

impl<'a, K, V> Iter<'a, K, V> {
  #[inline]
  pub(super) const fn new(nodes: &'a Slab<Node<K, V>>, next: Option<NodeId>, remaining: usize) -> Self {
    Self {
      nodes,
      next,
      remaining,
    }
  }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
  type Item = (&'a K, &'a V);

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    let node = &self.nodes[self.next?];
    self.next = node.forward[0];
    self.remaining -= 1;
    Some((&node.key, &node.value))
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
