use core::iter::FusedIterator;

use super::{Node, NodeId, Slab};

/// An iterator over the elements of a [`SkipList`](super::SkipList), in
/// ascending order.
pub struct Iter<'a, T> {
  nodes: &'a Slab<Node<T>>,
  front: Option<NodeId>,
  back: Option<NodeId>,
  remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
  #[inline]
  fn clone(&self) -> Self {
    Self { ..*self }
  }
}

impl<'a, T> Iter<'a, T> {
  #[inline]
  pub(super) const fn new(
    nodes: &'a Slab<Node<T>>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
  ) -> Self {
    Self {
      nodes,
      front,
      back,
      remaining,
    }
  }
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = &'a T;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    let node = &self.nodes[self.front?];
    self.front = node.links[0].next;
    self.remaining -= 1;
    Some(&node.value)
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
  #[inline]
  fn next_back(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    let node = &self.nodes[self.back?];
    self.back = node.prev;
    self.remaining -= 1;
    Some(&node.value)
  }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
