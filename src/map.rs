use core::{cmp::Ordering, fmt, mem};

use rand::{rngs::StdRng, RngCore};
use slab::Slab;

use crate::{
  node::NodeId,
  Comparator, LevelGenerator, Options, MAX_HEIGHT,
};

mod iterator;
pub use iterator::Iter;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
struct Node<K, V> {
  key: K,
  value: V,
  /// One forward link per level, `forward.len()` is the height of the node.
  forward: Vec<Option<NodeId>>,
}

/// A sorted key-value map backed by a skiplist.
///
/// Unlike [`SkipList`](crate::SkipList), the map keeps neither spans nor
/// backward links: it answers point queries only. Putting an existing key
/// overwrites its value in place.
///
/// ## Example
///
/// ```rust
/// use ordered_skl::{Ascend, SkipMap};
///
/// let mut m = SkipMap::new(Ascend);
/// m.put("apple", 1);
/// m.put("banana", 2);
/// assert_eq!(m.put("apple", 3), Some(1));
/// assert_eq!(m.get(&"apple"), Some(&3));
/// assert_eq!(m.len(), 2);
/// ```
pub struct SkipMap<K, V, C, R = StdRng> {
  nodes: Slab<Node<K, V>>,
  head: [Option<NodeId>; MAX_HEIGHT],
  len: usize,
  height: usize,
  levels: LevelGenerator<R>,
  cmp: C,
}

impl<K, V, C> SkipMap<K, V, C> {
  /// Creates an empty map ordered by `cmp`, with the default [`Options`].
  #[inline]
  pub fn new(cmp: C) -> Self {
    Self::with_options(Options::new(), cmp)
  }

  /// Like [`SkipMap::new`], but with [`Options`].
  #[inline]
  pub fn with_options(opts: Options, cmp: C) -> Self {
    Self::construct(&opts, LevelGenerator::from_options(&opts), cmp)
  }
}

impl<K, V, C, R: RngCore> SkipMap<K, V, C, R> {
  /// Like [`SkipMap::new`], but node heights are drawn from `rng`.
  #[inline]
  pub fn with_rng(cmp: C, rng: R) -> Self {
    Self::with_options_and_rng(Options::new(), cmp, rng)
  }

  /// Like [`SkipMap::with_rng`], but with [`Options`]. The seed of the
  /// options is ignored.
  #[inline]
  pub fn with_options_and_rng(opts: Options, cmp: C, rng: R) -> Self {
    Self::construct(&opts, LevelGenerator::new(&opts, rng), cmp)
  }
}

impl<K, V, C, R> SkipMap<K, V, C, R> {
  fn construct(opts: &Options, levels: LevelGenerator<R>, cmp: C) -> Self {
    Self {
      nodes: Slab::with_capacity(opts.capacity()),
      head: [None; MAX_HEIGHT],
      len: 0,
      height: 1,
      levels,
      cmp,
    }
  }

  /// Returns the number of entries in the map.
  #[inline]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if the map contains no entries.
  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Returns the number of index levels currently in use.
  #[inline]
  pub const fn height(&self) -> usize {
    self.height
  }

  /// Returns the comparator of the map.
  #[inline]
  pub const fn comparator(&self) -> &C {
    &self.cmp
  }

  /// Returns the entry with the smallest key.
  #[inline]
  pub fn first(&self) -> Option<(&K, &V)> {
    self.head[0].map(|id| {
      let node = &self.nodes[id];
      (&node.key, &node.value)
    })
  }

  /// Returns the entry with the largest key.
  pub fn last(&self) -> Option<(&K, &V)> {
    let mut last: Option<NodeId> = None;
    for lvl in (0..self.height).rev() {
      let mut next = match last {
        None => self.head[lvl],
        Some(id) => self.nodes[id].forward[lvl],
      };
      while let Some(id) = next {
        last = Some(id);
        next = self.nodes[id].forward[lvl];
      }
    }
    last.map(|id| {
      let node = &self.nodes[id];
      (&node.key, &node.value)
    })
  }

  /// Returns an iterator over the entries in ascending key order.
  #[inline]
  pub fn iter(&self) -> Iter<'_, K, V> {
    Iter::new(&self.nodes, self.head[0], self.len)
  }

  /// Removes every entry.
  #[inline]
  pub fn clear(&mut self) {
    self.nodes.clear();
    self.head = [None; MAX_HEIGHT];
    self.len = 0;
    self.height = 1;
  }

  #[inline]
  fn forward(&self, at: Option<NodeId>, lvl: usize) -> Option<NodeId> {
    match at {
      None => self.head[lvl],
      Some(id) => self.nodes[id].forward[lvl],
    }
  }

  #[inline]
  fn forward_mut(&mut self, at: Option<NodeId>, lvl: usize) -> &mut Option<NodeId> {
    match at {
      None => &mut self.head[lvl],
      Some(id) => &mut self.nodes[id].forward[lvl],
    }
  }
}

impl<K, V, C, R> SkipMap<K, V, C, R>
where
  C: Comparator<K>,
{
  /// Records the last position before `key` on every level into `update`
  /// (`None` standing for the header) and returns the first node whose key
  /// is not less than `key`.
  fn find_splice(&self, key: &K, update: &mut [Option<NodeId>; MAX_HEIGHT]) -> Option<NodeId> {
    let mut x = None;
    for lvl in (0..self.height).rev() {
      while let Some(next) = self.forward(x, lvl) {
        if self.cmp.compare(&self.nodes[next].key, key).is_lt() {
          x = Some(next);
        } else {
          break;
        }
      }
      update[lvl] = x;
    }
    self.forward(x, 0)
  }

  fn find_node(&self, key: &K) -> Option<NodeId> {
    let mut x = None;
    for lvl in (0..self.height).rev() {
      while let Some(next) = self.forward(x, lvl) {
        match self.cmp.compare(&self.nodes[next].key, key) {
          Ordering::Less => x = Some(next),
          Ordering::Equal => return Some(next),
          Ordering::Greater => break,
        }
      }
    }
    None
  }

  /// Returns a reference to the value of `key`.
  #[inline]
  pub fn get(&self, key: &K) -> Option<&V> {
    self.find_node(key).map(|id| &self.nodes[id].value)
  }

  /// Returns a mutable reference to the value of `key`.
  #[inline]
  pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
    self
      .find_node(key)
      .map(move |id| &mut self.nodes[id].value)
  }

  /// Returns `true` if the map contains `key`.
  #[inline]
  pub fn contains_key(&self, key: &K) -> bool {
    self.find_node(key).is_some()
  }

  /// Removes `key` from the map and returns its value.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::{Ascend, SkipMap};
  ///
  /// let mut m = SkipMap::new(Ascend);
  /// m.put(1, "a");
  /// assert_eq!(m.remove(&1), Some("a"));
  /// assert_eq!(m.remove(&1), None);
  /// ```
  pub fn remove(&mut self, key: &K) -> Option<V> {
    let mut update = [None; MAX_HEIGHT];
    let id = self.find_splice(key, &mut update)?;
    if !self.cmp.compare(&self.nodes[id].key, key).is_eq() {
      return None;
    }

    for (lvl, &pred) in update.iter().enumerate().take(self.height) {
      if self.forward(pred, lvl) != Some(id) {
        break;
      }
      let next = self.nodes[id].forward[lvl];
      *self.forward_mut(pred, lvl) = next;
    }

    while self.height > 1 && self.head[self.height - 1].is_none() {
      self.height -= 1;
      #[cfg(feature = "tracing")]
      tracing::trace!(height = self.height, "skipmap height shrank");
    }

    self.len -= 1;
    let node = self.nodes.remove(id.key());
    debug_assert_eq!(self.nodes.len(), self.len);
    Some(node.value)
  }
}

impl<K, V, C, R> SkipMap<K, V, C, R>
where
  C: Comparator<K>,
  R: RngCore,
{
  /// Inserts `value` under `key`.
  ///
  /// If the key is already present its value is replaced in place and the
  /// previous value is returned, the length stays unchanged.
  pub fn put(&mut self, key: K, value: V) -> Option<V> {
    let mut update = [None; MAX_HEIGHT];
    if let Some(id) = self.find_splice(&key, &mut update) {
      if self.cmp.compare(&self.nodes[id].key, &key).is_eq() {
        return Some(mem::replace(&mut self.nodes[id].value, value));
      }
    }

    let height = self.levels.random_height();
    if height > self.height {
      // update[lvl] is already the header for the new levels.
      #[cfg(feature = "tracing")]
      tracing::trace!(from = self.height, to = height, "skipmap height grew");
      self.height = height;
    }

    let id = NodeId::new(self.nodes.insert(Node {
      key,
      value,
      forward: vec![None; height],
    }));
    for (lvl, &pred) in update.iter().enumerate().take(height) {
      let next = self.forward(pred, lvl);
      self.nodes[id].forward[lvl] = next;
      *self.forward_mut(pred, lvl) = Some(id);
    }

    self.len += 1;
    None
  }
}

impl<'a, K, V, C, R> IntoIterator for &'a SkipMap<K, V, C, R> {
  type Item = (&'a K, &'a V);
  type IntoIter = Iter<'a, K, V>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<K: fmt::Debug, V: fmt::Debug, C, R> fmt::Debug for SkipMap<K, V, C, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.iter()).finish()
  }
}
