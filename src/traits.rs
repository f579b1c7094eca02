use rand::RngCore;

use crate::{Comparator, RbTreeMap, SkipMap};

/// The point operations shared by the ordered maps of this crate.
///
/// ## Example
///
/// ```rust
/// use ordered_skl::{Ascend, OrderedMap, RbTreeMap, SkipMap};
///
/// fn tally<M: OrderedMap<&'static str, u32>>(mut m: M) -> M {
///   for word in ["a", "b", "a"] {
///     match m.get_mut(&word) {
///       Some(n) => *n += 1,
///       None => {
///         m.put(word, 1);
///       }
///     }
///   }
///   m
/// }
///
/// assert_eq!(tally(SkipMap::new(Ascend)).get(&"a"), Some(&2));
/// assert_eq!(tally(RbTreeMap::new(Ascend)).get(&"b"), Some(&1));
/// ```
pub trait OrderedMap<K, V> {
  /// Inserts `value` under `key`, returning the previous value if the key
  /// was already present.
  fn put(&mut self, key: K, value: V) -> Option<V>;

  /// Returns a reference to the value of `key`.
  fn get(&self, key: &K) -> Option<&V>;

  /// Returns a mutable reference to the value of `key`.
  fn get_mut(&mut self, key: &K) -> Option<&mut V>;

  /// Removes `key` and returns its value.
  fn remove(&mut self, key: &K) -> Option<V>;

  /// Returns the number of entries.
  fn len(&self) -> usize;

  /// Returns `true` if the map contains `key`.
  #[inline]
  fn contains_key(&self, key: &K) -> bool {
    self.get(key).is_some()
  }

  /// Returns `true` if the map contains no entries.
  #[inline]
  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<K, V, C, R> OrderedMap<K, V> for SkipMap<K, V, C, R>
where
  C: Comparator<K>,
  R: RngCore,
{
  #[inline]
  fn put(&mut self, key: K, value: V) -> Option<V> {
    SkipMap::put(self, key, value)
  }

  #[inline]
  fn get(&self, key: &K) -> Option<&V> {
    SkipMap::get(self, key)
  }

  #[inline]
  fn get_mut(&mut self, key: &K) -> Option<&mut V> {
    SkipMap::get_mut(self, key)
  }

  #[inline]
  fn remove(&mut self, key: &K) -> Option<V> {
    SkipMap::remove(self, key)
  }

  #[inline]
  fn len(&self) -> usize {
    SkipMap::len(self)
  }

  #[inline]
  fn contains_key(&self, key: &K) -> bool {
    SkipMap::contains_key(self, key)
  }
}

impl<K, V, C> OrderedMap<K, V> for RbTreeMap<K, V, C>
where
  C: Comparator<K>,
{
  #[inline]
  fn put(&mut self, key: K, value: V) -> Option<V> {
    RbTreeMap::put(self, key, value)
  }

  #[inline]
  fn get(&self, key: &K) -> Option<&V> {
    RbTreeMap::get(self, key)
  }

  #[inline]
  fn get_mut(&mut self, key: &K) -> Option<&mut V> {
    RbTreeMap::get_mut(self, key)
  }

  #[inline]
  fn remove(&mut self, key: &K) -> Option<V> {
    RbTreeMap::remove(self, key)
  }

  #[inline]
  fn len(&self) -> usize {
    RbTreeMap::len(self)
  }

  #[inline]
  fn contains_key(&self, key: &K) -> bool {
    RbTreeMap::contains_key(self, key)
  }
}
