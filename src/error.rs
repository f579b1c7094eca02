/// Error type for the ordered-skl crate.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// Indicates that no element or key in the structure compares equal to
  /// the queried one.
  #[error("no matching element in the collection")]
  NotFound,

  /// Indicates that an element comparing equal to the inserted one already
  /// exists. Ordered containers in this crate keep at most one element per
  /// equivalence class of the comparator, so the caller decides whether to
  /// replace, merge or drop the new element.
  #[error("element already exists in the collection")]
  Duplicated,
}
