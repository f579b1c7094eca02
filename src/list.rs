use core::{cmp::Ordering, fmt};

use rand::{rngs::StdRng, RngCore};
use slab::Slab;

use crate::{
  node::NodeId,
  Comparator, Error, LevelGenerator, Options, MAX_HEIGHT,
};

mod entry;
pub use entry::EntryRef;

mod iterator;
pub use iterator::Iter;


/// A forward link at one level, together with the number of level 0
/// positions it skips over.
///
/// A link pointing past the last node records the number of nodes that
/// follow its owner, so that every span stays correct when a node is
/// appended.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Link {
  next: Option<NodeId>,
  span: usize,
}

#[derive(Debug, Clone)]
struct Node<T> {
  value: T,
  /// The level 0 predecessor, `None` for the first node.
  prev: Option<NodeId>,
  /// One link per level the node participates in, `links.len()` is the height.
  links: Vec<Link>,
}

/// Where a descent currently stands: on the header or on a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
  Head,
  Node(NodeId),
}

/// A sorted skiplist with `O(log n)` expected insertion, removal, lookup and
/// rank queries.
///
/// Conceptually, a skiplist resembles something like:
///
/// ```text
/// <head> ----------> [2] --------------------------------------------------> [9] ---------->
/// <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
/// <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
/// <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
/// ```
///
/// Every link additionally remembers how many level 0 positions it skips,
/// which is what makes [`rank`](SkipList::rank) and
/// [`get_by_rank`](SkipList::get_by_rank) logarithmic.
///
/// The list keeps at most one element per equivalence class of its
/// comparator: inserting an element that compares equal to a present one
/// fails with [`Error::Duplicated`].
///
/// Nodes live in a [`slab`](slab::Slab) and refer to each other by key, the list owns
/// all of them exclusively.
pub struct SkipList<T, C, R = StdRng> {
  nodes: Slab<Node<T>>,
  head: [Link; MAX_HEIGHT],
  tail: Option<NodeId>,
  len: usize,
  /// Current number of levels in use, `1 <= height <= MAX_HEIGHT`.
  height: usize,
  levels: LevelGenerator<R>,
  cmp: C,
}

impl<T, C> SkipList<T, C> {
  /// Creates an empty skiplist ordered by `cmp`, with the default [`Options`].
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, SkipList};
  ///
  /// let mut l = SkipList::new(Ascend);
  /// l.insert(3).unwrap();
  /// l.insert(1).unwrap();
  /// assert_eq!(l.front().map(|e| *e.value()), Some(1));
  /// ```
  #[inline]
  pub fn new(cmp: C) -> Self {
    Self::with_options(Options::new(), cmp)
  }

  /// Like [`SkipList::new`], but with [`Options`].
  #[inline]
  pub fn with_options(opts: Options, cmp: C) -> Self {
    Self::construct(&opts, LevelGenerator::from_options(&opts), cmp)
  }
}

impl<T, C, R: RngCore> SkipList<T, C, R> {
  /// Like [`SkipList::new`], but node heights are drawn from `rng`.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{rand::{rngs::StdRng, SeedableRng}, SkipList};
  ///
  /// let mut l = SkipList::with_rng(|a: &u32, b: &u32| b.cmp(a), StdRng::seed_from_u64(7));
  /// l.insert(1).unwrap();
  /// l.insert(2).unwrap();
  /// assert_eq!(l.iter().copied().collect::<Vec<_>>(), [2, 1]);
  /// ```
  #[inline]
  pub fn with_rng(cmp: C, rng: R) -> Self {
    Self::with_options_and_rng(Options::new(), cmp, rng)
  }

  /// Like [`SkipList::with_rng`], but with [`Options`]. The seed of the
  /// options is ignored, `rng` is used as is.
  #[inline]
  pub fn with_options_and_rng(opts: Options, cmp: C, rng: R) -> Self {
    Self::construct(&opts, LevelGenerator::new(&opts, rng), cmp)
  }
}

impl<T, C, R> SkipList<T, C, R> {
  fn construct(opts: &Options, levels: LevelGenerator<R>, cmp: C) -> Self {
    Self {
      nodes: Slab::with_capacity(opts.capacity()),
      head: [Link::default(); MAX_HEIGHT],
      tail: None,
      len: 0,
      height: 1,
      levels,
      cmp,
    }
  }

  /// Returns the number of elements in the skiplist.
  #[inline]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if the skiplist contains no elements.
  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Returns the number of index levels currently in use.
  ///
  /// This is the height of the tallest node, or `1` for an empty list.
  #[inline]
  pub const fn height(&self) -> usize {
    self.height
  }

  /// Returns the comparator of the skiplist.
  #[inline]
  pub const fn comparator(&self) -> &C {
    &self.cmp
  }

  /// Returns the first (smallest) element, or `None` if the list is empty.
  #[inline]
  pub fn front(&self) -> Option<EntryRef<'_, T, C, R>> {
    self.head[0].next.map(|id| EntryRef::new(self, id))
  }

  /// Returns the last (largest) element, or `None` if the list is empty.
  #[inline]
  pub fn back(&self) -> Option<EntryRef<'_, T, C, R>> {
    self.tail.map(|id| EntryRef::new(self, id))
  }

  /// Returns an iterator over the elements in ascending order.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, SkipList};
  ///
  /// let mut l = SkipList::new(Ascend);
  /// for v in [3, 2, 5, 1, 4] {
  ///   l.insert(v).unwrap();
  /// }
  /// assert_eq!(l.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
  /// assert_eq!(l.iter().rev().copied().collect::<Vec<_>>(), [5, 4, 3, 2, 1]);
  /// ```
  #[inline]
  pub fn iter(&self) -> Iter<'_, T> {
    Iter::new(&self.nodes, self.head[0].next, self.tail, self.len)
  }

  /// Removes every element, keeping the comparator and the random source.
  #[inline]
  pub fn clear(&mut self) {
    self.nodes.clear();
    self.head = [Link::default(); MAX_HEIGHT];
    self.tail = None;
    self.len = 0;
    self.height = 1;
  }

  /// Returns the element at the 1-based `rank`, or `None` if `rank` is `0`
  /// or larger than the length of the list.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, SkipList};
  ///
  /// let mut l = SkipList::new(Ascend);
  /// for v in [30, 10, 20] {
  ///   l.insert(v).unwrap();
  /// }
  /// assert_eq!(l.get_by_rank(2).map(|e| *e.value()), Some(20));
  /// assert!(l.get_by_rank(0).is_none());
  /// assert!(l.get_by_rank(4).is_none());
  /// ```
  pub fn get_by_rank(&self, rank: usize) -> Option<EntryRef<'_, T, C, R>> {
    self.node_by_rank(rank).map(|id| EntryRef::new(self, id))
  }

  /// Removes the element at the 1-based `rank` and returns it.
  ///
  /// Returns `None`, leaving the list untouched, if `rank` is `0` or larger
  /// than the length of the list.
  pub fn remove_by_rank(&mut self, rank: usize) -> Option<T> {
    let mut update = [Cursor::Head; MAX_HEIGHT];
    let id = self.splice_by_rank(rank, &mut update)?;
    Some(self.unlink(id, &update))
  }

  #[inline]
  fn link(&self, at: Cursor, lvl: usize) -> &Link {
    match at {
      Cursor::Head => &self.head[lvl],
      Cursor::Node(id) => &self.nodes[id].links[lvl],
    }
  }

  #[inline]
  fn link_mut(&mut self, at: Cursor, lvl: usize) -> &mut Link {
    match at {
      Cursor::Head => &mut self.head[lvl],
      Cursor::Node(id) => &mut self.nodes[id].links[lvl],
    }
  }

  #[inline]
  fn value(&self, id: NodeId) -> &T {
    &self.nodes[id].value
  }

  fn node_by_rank(&self, rank: usize) -> Option<NodeId> {
    if rank == 0 || rank > self.len {
      return None;
    }

    let mut x = Cursor::Head;
    let mut traversed = 0;
    for lvl in (0..self.height).rev() {
      loop {
        let link = self.link(x, lvl);
        match link.next {
          Some(next) if traversed + link.span <= rank => {
            traversed += link.span;
            x = Cursor::Node(next);
          }
          _ => break,
        }
      }

      if traversed == rank {
        if let Cursor::Node(id) = x {
          return Some(id);
        }
      }
    }
    None
  }

  /// Records, for every level, the last node strictly before `rank` into
  /// `update`, and returns the node at `rank`.
  fn splice_by_rank(&self, rank: usize, update: &mut [Cursor; MAX_HEIGHT]) -> Option<NodeId> {
    if rank == 0 || rank > self.len {
      return None;
    }

    let mut x = Cursor::Head;
    let mut traversed = 0;
    for lvl in (0..self.height).rev() {
      loop {
        let link = self.link(x, lvl);
        match link.next {
          Some(next) if traversed + link.span < rank => {
            traversed += link.span;
            x = Cursor::Node(next);
          }
          _ => break,
        }
      }
      update[lvl] = x;
    }
    self.link(x, 0).next
  }

  /// Unlinks `id` from every level, `update` must hold its predecessors as
  /// recorded by a descent.
  fn unlink(&mut self, id: NodeId, update: &[Cursor; MAX_HEIGHT]) -> T {
    for (lvl, &pred) in update.iter().enumerate().take(self.height) {
      if self.link(pred, lvl).next == Some(id) {
        let removed = self.nodes[id].links[lvl];
        let link = self.link_mut(pred, lvl);
        link.span = link.span + removed.span - 1;
        link.next = removed.next;
      } else {
        self.link_mut(pred, lvl).span -= 1;
      }
    }

    let (prev, next) = {
      let node = &self.nodes[id];
      (node.prev, node.links[0].next)
    };
    match next {
      Some(next) => self.nodes[next].prev = prev,
      None => self.tail = prev,
    }

    while self.height > 1 && self.head[self.height - 1].next.is_none() {
      self.height -= 1;
      #[cfg(feature = "tracing")]
      tracing::trace!(height = self.height, "skiplist height shrank");
    }

    self.len -= 1;
    let node = self.nodes.remove(id.key());
    debug_assert_eq!(self.nodes.len(), self.len);
    node.value
  }
}

impl<T, C, R> SkipList<T, C, R>
where
  C: Comparator<T>,
{
  /// Descends from the top level towards `value`.
  ///
  /// For every level in use, `update` receives the last position whose
  /// value is strictly less than `value` and `rank` the rank of that
  /// position. Returns the first node not less than `value`.
  fn find_splice(
    &self,
    value: &T,
    update: &mut [Cursor; MAX_HEIGHT],
    rank: &mut [usize; MAX_HEIGHT],
  ) -> Option<NodeId> {
    let mut x = Cursor::Head;
    let mut traversed = 0;
    for lvl in (0..self.height).rev() {
      loop {
        let link = self.link(x, lvl);
        match link.next {
          Some(next) if self.cmp.compare(self.value(next), value).is_lt() => {
            traversed += link.span;
            x = Cursor::Node(next);
          }
          _ => break,
        }
      }
      update[lvl] = x;
      rank[lvl] = traversed;
    }
    self.link(x, 0).next
  }

  /// Returns the first node whose value is not less than `value`.
  fn lower_bound(&self, value: &T) -> Option<NodeId> {
    let mut x = Cursor::Head;
    for lvl in (0..self.height).rev() {
      while let Some(next) = self.link(x, lvl).next {
        if self.cmp.compare(self.value(next), value).is_lt() {
          x = Cursor::Node(next);
        } else {
          break;
        }
      }
    }
    self.link(x, 0).next
  }

  /// Returns the element comparing equal to `value`.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, Error, SkipList};
  ///
  /// let mut l = SkipList::new(Ascend);
  /// l.insert(5).unwrap();
  /// assert_eq!(*l.find(&5).unwrap().value(), 5);
  /// assert_eq!(l.find(&6).unwrap_err(), Error::NotFound);
  /// ```
  pub fn find(&self, value: &T) -> Result<EntryRef<'_, T, C, R>, Error> {
    match self.lower_bound(value) {
      Some(id) if self.cmp.compare(self.value(id), value).is_eq() => Ok(EntryRef::new(self, id)),
      _ => Err(Error::NotFound),
    }
  }

  /// Returns `true` if an element comparing equal to `value` is present.
  #[inline]
  pub fn contains(&self, value: &T) -> bool {
    self.find(value).is_ok()
  }

  /// Returns the 1-based rank of the element comparing equal to `value`.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, Error, SkipList};
  ///
  /// let mut l = SkipList::new(Ascend);
  /// for v in [1, 2, 3, 4, 5] {
  ///   l.insert(v).unwrap();
  /// }
  /// assert_eq!(l.rank(&5), Ok(5));
  /// assert_eq!(l.rank(&6), Err(Error::NotFound));
  /// ```
  pub fn rank(&self, value: &T) -> Result<usize, Error> {
    let mut x = Cursor::Head;
    let mut rank = 0;
    for lvl in (0..self.height).rev() {
      while let Some(next) = self.link(x, lvl).next {
        let span = self.link(x, lvl).span;
        match self.cmp.compare(self.value(next), value) {
          Ordering::Less => {
            rank += span;
            x = Cursor::Node(next);
          }
          Ordering::Equal => return Ok(rank + span),
          Ordering::Greater => break,
        }
      }
    }
    Err(Error::NotFound)
  }

  /// Rank of a live node, found by descending towards its value and
  /// stopping on the node itself.
  fn rank_of(&self, id: NodeId) -> usize {
    let value = self.value(id);
    let mut x = Cursor::Head;
    let mut rank = 0;
    for lvl in (0..self.height).rev() {
      while let Some(next) = self.link(x, lvl).next {
        let span = self.link(x, lvl).span;
        if next == id {
          return rank + span;
        }
        if self.cmp.compare(self.value(next), value).is_lt() {
          rank += span;
          x = Cursor::Node(next);
        } else {
          break;
        }
      }
    }

    // Only reachable with an inconsistent comparator, count the predecessors instead.
    let mut rank = 1;
    let mut cur = id;
    while let Some(prev) = self.nodes[cur].prev {
      rank += 1;
      cur = prev;
    }
    rank
  }

  /// Removes the element comparing equal to `value` and returns it.
  ///
  /// Removing an absent value leaves the list untouched.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, SkipList};
  ///
  /// let mut l = SkipList::new(Ascend);
  /// l.insert(3).unwrap();
  /// assert_eq!(l.remove(&3), Some(3));
  /// assert_eq!(l.remove(&3), None);
  /// assert!(l.is_empty());
  /// ```
  pub fn remove(&mut self, value: &T) -> Option<T> {
    let mut update = [Cursor::Head; MAX_HEIGHT];
    let mut rank = [0; MAX_HEIGHT];
    let id = self.find_splice(value, &mut update, &mut rank)?;
    if !self.cmp.compare(self.value(id), value).is_eq() {
      return None;
    }
    Some(self.unlink(id, &update))
  }
}

impl<T, C, R> SkipList<T, C, R>
where
  C: Comparator<T>,
  R: RngCore,
{
  /// Inserts `value` and returns a reference to its entry.
  ///
  /// Fails with [`Error::Duplicated`], leaving the list untouched, if an
  /// element comparing equal to `value` is already present.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, Error, SkipList};
  ///
  /// let mut l = SkipList::new(Ascend);
  /// assert_eq!(l.insert(4).unwrap().rank(), 1);
  /// assert_eq!(l.insert(4).unwrap_err(), Error::Duplicated);
  /// assert_eq!(l.len(), 1);
  /// ```
  pub fn insert(&mut self, value: T) -> Result<EntryRef<'_, T, C, R>, Error> {
    let mut update = [Cursor::Head; MAX_HEIGHT];
    let mut rank = [0; MAX_HEIGHT];
    if let Some(next) = self.find_splice(&value, &mut update, &mut rank) {
      if self.cmp.compare(self.value(next), &value).is_eq() {
        #[cfg(feature = "tracing")]
        tracing::debug!(len = self.len, "rejected duplicated element");
        return Err(Error::Duplicated);
      }
    }

    let height = self.levels.random_height();
    if height > self.height {
      for lvl in self.height..height {
        update[lvl] = Cursor::Head;
        rank[lvl] = 0;
        self.head[lvl] = Link {
          next: None,
          span: self.len,
        };
      }
      #[cfg(feature = "tracing")]
      tracing::trace!(from = self.height, to = height, "skiplist height grew");
      self.height = height;
    }

    let id = NodeId::new(self.nodes.insert(Node {
      value,
      prev: match update[0] {
        Cursor::Head => None,
        Cursor::Node(prev) => Some(prev),
      },
      links: vec![Link::default(); height],
    }));

    for lvl in 0..height {
      // Positions between update[lvl] and the new node's predecessor at level 0.
      let covered = rank[0] - rank[lvl];
      let pred = *self.link(update[lvl], lvl);
      self.nodes[id].links[lvl] = Link {
        next: pred.next,
        span: pred.span - covered,
      };
      *self.link_mut(update[lvl], lvl) = Link {
        next: Some(id),
        span: covered + 1,
      };
    }

    // Links above the new node now skip one more position.
    for (lvl, &pred) in update.iter().enumerate().take(self.height).skip(height) {
      self.link_mut(pred, lvl).span += 1;
    }

    match self.nodes[id].links[0].next {
      Some(next) => self.nodes[next].prev = Some(id),
      None => self.tail = Some(id),
    }
    self.len += 1;

    Ok(EntryRef::new(self, id))
  }
}

impl<'a, T, C, R> IntoIterator for &'a SkipList<T, C, R> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<T: fmt::Debug, C, R> fmt::Debug for SkipList<T, C, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}
