use core::fmt;

use super::{NodeId, SkipList};
use crate::Comparator;

/// A reference to an element of a [`SkipList`].
///
/// The reference borrows the list, so the element cannot be removed while
/// the reference is alive.
pub struct EntryRef<'a, T, C, R> {
  pub(super) list: &'a SkipList<T, C, R>,
  pub(super) id: NodeId,
}

impl<T, C, R> Clone for EntryRef<'_, T, C, R> {
  #[inline]
  fn clone(&self) -> Self {
    *self
  }
}

impl<T, C, R> Copy for EntryRef<'_, T, C, R> {}

impl<T: fmt::Debug, C, R> fmt::Debug for EntryRef<'_, T, C, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EntryRef")
      .field("value", self.value())
      .finish()
  }
}

impl<'a, T, C, R> EntryRef<'a, T, C, R> {
  #[inline]
  pub(super) const fn new(list: &'a SkipList<T, C, R>, id: NodeId) -> Self {
    Self { list, id }
  }

  /// Returns the value of the entry.
  #[inline]
  pub fn value(&self) -> &'a T {
    &self.list.nodes[self.id].value
  }

  /// Returns the next entry in ascending order, `None` for the last one.
  #[inline]
  pub fn next(&self) -> Option<Self> {
    self.list.nodes[self.id].links[0]
      .next
      .map(|id| Self::new(self.list, id))
  }

  /// Returns the previous entry in ascending order, `None` for the first one.
  #[inline]
  pub fn prev(&self) -> Option<Self> {
    self.list.nodes[self.id]
      .prev
      .map(|id| Self::new(self.list, id))
  }
}

impl<T, C, R> EntryRef<'_, T, C, R>
where
  C: Comparator<T>,
{
  /// Returns the 1-based rank of the entry.
  #[inline]
  pub fn rank(&self) -> usize {
    self.list.rank_of(self.id)
  }
}
