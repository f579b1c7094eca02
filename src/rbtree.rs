use core::{cmp::Ordering, fmt, iter::FusedIterator, mem};

use slab::Slab;

use crate::{node::NodeId, Comparator, Error};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
  Red,
  Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
  Left,
  Right,
}

impl Dir {
  #[inline]
  const fn flip(self) -> Self {
    match self {
      Self::Left => Self::Right,
      Self::Right => Self::Left,
    }
  }
}

#[derive(Debug, Clone)]
struct RbNode<K, V> {
  key: K,
  value: V,
  color: Color,
  parent: Option<NodeId>,
  left: Option<NodeId>,
  right: Option<NodeId>,
}

/// Result of a key search: either the matching node, or the leaf position
/// where the key would be attached.
enum Search {
  Found(NodeId),
  Vacant(Option<NodeId>, Dir),
}

/// A sorted key-value map backed by a red-black tree.
///
/// The tree shares the slab layout of the skiplists in this crate: nodes
/// refer to their parent and children by key. Besides the
/// [`OrderedMap`](crate::OrderedMap) operations, it offers the strict
/// [`try_insert`](RbTreeMap::try_insert) and [`update`](RbTreeMap::update)
/// flavours, which fail instead of inserting or overwriting.
///
/// ## Example
///
/// ```rust
/// use ordered_skl::{Ascend, Error, RbTreeMap};
///
/// let mut m = RbTreeMap::new(Ascend);
/// m.try_insert(1, "one").unwrap();
/// assert_eq!(m.try_insert(1, "uno").unwrap_err(), Error::Duplicated);
/// assert_eq!(m.update(&1, "uno"), Ok("one"));
/// assert_eq!(m.update(&2, "two"), Err(Error::NotFound));
/// ```
pub struct RbTreeMap<K, V, C> {
  nodes: Slab<RbNode<K, V>>,
  root: Option<NodeId>,
  len: usize,
  cmp: C,
}

impl<K, V, C> RbTreeMap<K, V, C> {
  /// Creates an empty map ordered by `cmp`.
  #[inline]
  pub fn new(cmp: C) -> Self {
    Self::with_capacity(0, cmp)
  }

  /// Creates an empty map with room for `capacity` entries.
  #[inline]
  pub fn with_capacity(capacity: usize, cmp: C) -> Self {
    Self {
      nodes: Slab::with_capacity(capacity),
      root: None,
      len: 0,
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

  /// Returns the comparator of the map.
  #[inline]
  pub const fn comparator(&self) -> &C {
    &self.cmp
  }

  /// Removes every entry.
  #[inline]
  pub fn clear(&mut self) {
    self.nodes.clear();
    self.root = None;
    self.len = 0;
  }

  /// Returns the entry with the smallest key.
  #[inline]
  pub fn first(&self) -> Option<(&K, &V)> {
    self
      .root
      .map(|r| self.entry(self.extreme(r, Dir::Left)))
  }

  /// Returns the entry with the largest key.
  #[inline]
  pub fn last(&self) -> Option<(&K, &V)> {
    self
      .root
      .map(|r| self.entry(self.extreme(r, Dir::Right)))
  }

  /// Returns an in-order iterator over the entries.
  #[inline]
  pub fn iter(&self) -> Iter<'_, K, V> {
    Iter {
      nodes: &self.nodes,
      front: self.root.map(|r| self.extreme(r, Dir::Left)),
      back: self.root.map(|r| self.extreme(r, Dir::Right)),
      remaining: self.len,
    }
  }

  #[inline]
  fn entry(&self, id: NodeId) -> (&K, &V) {
    let node = &self.nodes[id];
    (&node.key, &node.value)
  }

  #[inline]
  fn child(&self, id: NodeId, dir: Dir) -> Option<NodeId> {
    let node = &self.nodes[id];
    match dir {
      Dir::Left => node.left,
      Dir::Right => node.right,
    }
  }

  #[inline]
  fn set_child(&mut self, id: NodeId, dir: Dir, child: Option<NodeId>) {
    let node = &mut self.nodes[id];
    match dir {
      Dir::Left => node.left = child,
      Dir::Right => node.right = child,
    }
  }

  /// Which side of `parent` the child `id` hangs on.
  #[inline]
  fn side(&self, parent: NodeId, id: Option<NodeId>) -> Dir {
    if self.nodes[parent].left == id {
      Dir::Left
    } else {
      Dir::Right
    }
  }

  #[inline]
  fn is_red(&self, id: Option<NodeId>) -> bool {
    id.is_some_and(|id| self.nodes[id].color == Color::Red)
  }

  #[inline]
  fn set_color(&mut self, id: Option<NodeId>, color: Color) {
    if let Some(id) = id {
      self.nodes[id].color = color;
    }
  }

  /// The leftmost (or rightmost) node of the subtree rooted at `id`.
  fn extreme(&self, mut id: NodeId, dir: Dir) -> NodeId {
    while let Some(next) = self.child(id, dir) {
      id = next;
    }
    id
  }

  /// Replaces `old` by `new` among the children of `parent`, or as the root.
  fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
    match parent {
      None => self.root = new,
      Some(p) => {
        let dir = self.side(p, Some(old));
        self.set_child(p, dir, new);
      }
    }
  }

  /// Rotates the subtree at `x` towards `dir`: the child of `x` on the other
  /// side takes its place.
  fn rotate(&mut self, x: NodeId, dir: Dir) {
    let Some(y) = self.child(x, dir.flip()) else {
      return;
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(?dir, "rbtree rotation");

    let inner = self.child(y, dir);
    self.set_child(x, dir.flip(), inner);
    if let Some(b) = inner {
      self.nodes[b].parent = Some(x);
    }

    let parent = self.nodes[x].parent;
    self.nodes[y].parent = parent;
    self.replace_child(parent, x, Some(y));

    self.set_child(y, dir, Some(x));
    self.nodes[x].parent = Some(y);
  }

  fn insert_fixup(&mut self, mut z: NodeId) {
    while let Some(mut p) = self.nodes[z].parent {
      if self.nodes[p].color == Color::Black {
        break;
      }
      // A red node is never the root, so it has a parent.
      let Some(g) = self.nodes[p].parent else {
        break;
      };

      let side = self.side(g, Some(p));
      let uncle = self.child(g, side.flip());
      if self.is_red(uncle) {
        self.set_color(Some(p), Color::Black);
        self.set_color(uncle, Color::Black);
        self.set_color(Some(g), Color::Red);
        z = g;
        continue;
      }

      if self.child(p, side.flip()) == Some(z) {
        self.rotate(p, side);
        mem::swap(&mut z, &mut p);
      }
      self.set_color(Some(p), Color::Black);
      self.set_color(Some(g), Color::Red);
      self.rotate(g, side.flip());
    }

    self.set_color(self.root, Color::Black);
  }

  /// Puts `new` where `old` hangs, without touching the children of either.
  fn transplant(&mut self, old: NodeId, new: Option<NodeId>) {
    let parent = self.nodes[old].parent;
    self.replace_child(parent, old, new);
    if let Some(new) = new {
      self.nodes[new].parent = parent;
    }
  }

  /// Unlinks `z` from the tree, rebalances, and hands back the node.
  fn delete(&mut self, z: NodeId) -> RbNode<K, V> {
    let (left, right) = (self.nodes[z].left, self.nodes[z].right);
    let mut removed = self.nodes[z].color;
    let (x, x_parent) = match (left, right) {
      (None, _) => {
        let parent = self.nodes[z].parent;
        self.transplant(z, right);
        (right, parent)
      }
      (_, None) => {
        let parent = self.nodes[z].parent;
        self.transplant(z, left);
        (left, parent)
      }
      (Some(l), Some(r)) => {
        let y = self.extreme(r, Dir::Left);
        removed = self.nodes[y].color;
        let x = self.nodes[y].right;
        let x_parent = if self.nodes[y].parent == Some(z) {
          Some(y)
        } else {
          let parent = self.nodes[y].parent;
          self.transplant(y, x);
          self.nodes[y].right = Some(r);
          self.nodes[r].parent = Some(y);
          parent
        };
        self.transplant(z, Some(y));
        self.nodes[y].left = Some(l);
        self.nodes[l].parent = Some(y);
        self.nodes[y].color = self.nodes[z].color;
        (x, x_parent)
      }
    };

    if removed == Color::Black {
      self.delete_fixup(x, x_parent);
    }
    self.len -= 1;
    let node = self.nodes.remove(z.key());
    debug_assert_eq!(self.nodes.len(), self.len);
    node
  }

  /// Restores the black height after removing a black node. `x` carries the
  /// extra black, `parent` is its parent (`x` may be a leaf).
  fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
    while x != self.root && !self.is_red(x) {
      let Some(p) = parent else {
        break;
      };
      let dir = self.side(p, x);

      let mut w = self.child(p, dir.flip());
      if self.is_red(w) {
        self.set_color(w, Color::Black);
        self.set_color(Some(p), Color::Red);
        self.rotate(p, dir);
        w = self.child(p, dir.flip());
      }
      let Some(mut w) = w else {
        x = Some(p);
        parent = self.nodes[p].parent;
        continue;
      };

      if !self.is_red(self.child(w, dir)) && !self.is_red(self.child(w, dir.flip())) {
        self.set_color(Some(w), Color::Red);
        x = Some(p);
        parent = self.nodes[p].parent;
        continue;
      }

      if !self.is_red(self.child(w, dir.flip())) {
        self.set_color(self.child(w, dir), Color::Black);
        self.set_color(Some(w), Color::Red);
        self.rotate(w, dir.flip());
        w = match self.child(p, dir.flip()) {
          Some(w) => w,
          None => break,
        };
      }

      self.nodes[w].color = self.nodes[p].color;
      self.set_color(Some(p), Color::Black);
      self.set_color(self.child(w, dir.flip()), Color::Black);
      self.rotate(p, dir);
      x = self.root;
      break;
    }

    self.set_color(x, Color::Black);
  }
}

impl<K, V, C> RbTreeMap<K, V, C>
where
  C: Comparator<K>,
{
  fn search(&self, key: &K) -> Search {
    let mut parent = None;
    let mut dir = Dir::Left;
    let mut cur = self.root;
    while let Some(id) = cur {
      dir = match self.cmp.compare(key, &self.nodes[id].key) {
        Ordering::Less => Dir::Left,
        Ordering::Greater => Dir::Right,
        Ordering::Equal => return Search::Found(id),
      };
      parent = Some(id);
      cur = self.child(id, dir);
    }
    Search::Vacant(parent, dir)
  }

  fn attach(&mut self, parent: Option<NodeId>, dir: Dir, key: K, value: V) -> NodeId {
    let id = NodeId::new(self.nodes.insert(RbNode {
      key,
      value,
      color: Color::Red,
      parent,
      left: None,
      right: None,
    }));
    match parent {
      None => self.root = Some(id),
      Some(p) => self.set_child(p, dir, Some(id)),
    }
    self.len += 1;
    self.insert_fixup(id);
    id
  }

  /// Inserts `value` under `key`, returning the previous value if the key
  /// was already present.
  pub fn put(&mut self, key: K, value: V) -> Option<V> {
    match self.search(&key) {
      Search::Found(id) => Some(mem::replace(&mut self.nodes[id].value, value)),
      Search::Vacant(parent, dir) => {
        self.attach(parent, dir, key, value);
        None
      }
    }
  }

  /// Inserts `value` under a key that must not be present yet.
  ///
  /// Fails with [`Error::Duplicated`], leaving the map untouched, if the key
  /// exists.
  pub fn try_insert(&mut self, key: K, value: V) -> Result<&mut V, Error> {
    match self.search(&key) {
      Search::Found(_) => Err(Error::Duplicated),
      Search::Vacant(parent, dir) => {
        let id = self.attach(parent, dir, key, value);
        Ok(&mut self.nodes[id].value)
      }
    }
  }

  /// Replaces the value of an existing key and returns the previous one.
  ///
  /// Fails with [`Error::NotFound`] if the key is absent.
  pub fn update(&mut self, key: &K, value: V) -> Result<V, Error> {
    match self.search(key) {
      Search::Found(id) => Ok(mem::replace(&mut self.nodes[id].value, value)),
      Search::Vacant(..) => Err(Error::NotFound),
    }
  }

  #[inline]
  fn find_node(&self, key: &K) -> Option<NodeId> {
    match self.search(key) {
      Search::Found(id) => Some(id),
      Search::Vacant(..) => None,
    }
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
  pub fn remove(&mut self, key: &K) -> Option<V> {
    let id = self.find_node(key)?;
    Some(self.delete(id).value)
  }
}

/// An in-order iterator over the entries of a [`RbTreeMap`].
pub struct Iter<'a, K, V> {
  nodes: &'a Slab<RbNode<K, V>>,
  front: Option<NodeId>,
  back: Option<NodeId>,
  remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
  #[inline]
  fn clone(&self) -> Self {
    Self { ..*self }
  }
}

impl<K, V> Iter<'_, K, V> {
  /// The in-order neighbour of `id` in direction `dir`.
  fn step(&self, id: NodeId, dir: Dir) -> Option<NodeId> {
    let child = |id: NodeId, dir: Dir| {
      let node = &self.nodes[id];
      match dir {
        Dir::Left => node.left,
        Dir::Right => node.right,
      }
    };

    if let Some(mut cur) = child(id, dir) {
      while let Some(next) = child(cur, dir.flip()) {
        cur = next;
      }
      return Some(cur);
    }

    let mut cur = id;
    while let Some(parent) = self.nodes[cur].parent {
      if child(parent, dir.flip()) == Some(cur) {
        return Some(parent);
      }
      cur = parent;
    }
    None
  }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
  type Item = (&'a K, &'a V);

  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    let id = self.front?;
    self.front = self.step(id, Dir::Right);
    self.remaining -= 1;
    let node = &self.nodes[id];
    Some((&node.key, &node.value))
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
  fn next_back(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    let id = self.back?;
    self.back = self.step(id, Dir::Left);
    self.remaining -= 1;
    let node = &self.nodes[id];
    Some((&node.key, &node.value))
  }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, C> IntoIterator for &'a RbTreeMap<K, V, C> {
  type Item = (&'a K, &'a V);
  type IntoIter = Iter<'a, K, V>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RbTreeMap<K, V, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.iter()).finish()
  }
}
