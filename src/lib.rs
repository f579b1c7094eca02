#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

use core::cmp;

mod node;

mod error;
pub use error::Error;

mod height;
pub use height::LevelGenerator;

mod options;
pub use options::{Options, DEFAULT_BRANCH};

/// An ordered skiplist with rank queries.
pub mod list;
pub use list::SkipList;

/// A map implementation based on skiplist.
pub mod map;
pub use map::SkipMap;

/// A map implementation based on red-black tree.
pub mod rbtree;
pub use rbtree::RbTreeMap;

mod traits;
pub use traits::OrderedMap;

pub use rand;


/// The maximum number of index levels a node can reach.
pub const MAX_HEIGHT: usize = 32;

/// Comparator is used to define the total order of the elements (or keys) of
/// the collections in this crate.
///
/// The comparator **must** be well-behaved. Given some ordering function
/// `f(a, b)`, it must satisfy the following properties:
///
/// - Be well defined: `f(a, b)` should always return the same value.
/// - Be anti-symmetric: `f(a, b) == Greater` iff `f(b, a) == Less`, and
///   `f(a, b) == Equal` iff `f(b, a) == Equal`.
/// - Be transitive: if `f(a, b) == Greater` and `f(b, c) == Greater` then
///   `f(a, c) == Greater`.
///
/// Violating these properties does not cause undefined behavior, but the
/// collections will silently lose their ordering and rank guarantees.
///
/// Any `Fn(&T, &T) -> Ordering` is a comparator:
///
/// ```rust
/// use core::cmp::Ordering;
/// use ordered_skl::Comparator;
///
/// let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
/// assert_eq!(by_len.compare(&"aa", &"b"), Ordering::Greater);
/// ```
pub trait Comparator<T: ?Sized> {
  /// Compares two elements.
  fn compare(&self, a: &T, b: &T) -> cmp::Ordering;
}

impl<T, F> Comparator<T> for F
where
  T: ?Sized,
  F: Fn(&T, &T) -> cmp::Ordering,
{
  #[inline]
  fn compare(&self, a: &T, b: &T) -> cmp::Ordering {
    self(a, b)
  }
}

/// Ascend is a comparator that orders elements by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ascend;

impl<T: ?Sized + Ord> Comparator<T> for Ascend {
  #[inline]
  fn compare(&self, a: &T, b: &T) -> cmp::Ordering {
    a.cmp(b)
  }
}

/// Descend is a comparator that orders elements by the reverse of their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Descend;

impl<T: ?Sized + Ord> Comparator<T> for Descend {
  #[inline]
  fn compare(&self, a: &T, b: &T) -> cmp::Ordering {
    b.cmp(a)
  }
}
