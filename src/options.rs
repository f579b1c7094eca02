use crate::MAX_HEIGHT;

/// The default branching factor, every index level holds roughly a quarter
/// of the nodes of the level below it.
pub const DEFAULT_BRANCH: u32 = 4;

/// Options for the skiplist based collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
  max_height: u8,
  branch: u32,
  seed: Option<u64>,
  capacity: usize,
}

impl Default for Options {
  #[inline]
  fn default() -> Options {
    Options::new()
  }
}

impl Options {
  /// Creates a new set of options with the default values.
  #[inline]
  pub const fn new() -> Self {
    Self {
      max_height: MAX_HEIGHT as u8,
      branch: DEFAULT_BRANCH,
      seed: None,
      capacity: 0,
    }
  }

  /// Set the maximum height of a node, i.e. the number of index levels the
  /// header keeps.
  ///
  /// The value is clamped into `1..=32`. The default is `32`.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::Options;
  ///
  /// let opts = Options::new().with_max_height(12);
  /// assert_eq!(opts.max_height(), 12);
  ///
  /// let opts = Options::new().with_max_height(0);
  /// assert_eq!(opts.max_height(), 1);
  /// ```
  #[inline]
  pub const fn with_max_height(mut self, max_height: u8) -> Self {
    self.max_height = if max_height == 0 {
      1
    } else if max_height as usize > MAX_HEIGHT {
      MAX_HEIGHT as u8
    } else {
      max_height
    };
    self
  }

  /// Set the branching factor `b`: a node reaching level `i` also reaches
  /// level `i + 1` with probability `1 / b`.
  ///
  /// Values below `2` are raised to `2`. The default is `4`.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::Options;
  ///
  /// let opts = Options::new().with_branch(2);
  /// assert_eq!(opts.branch(), 2);
  /// ```
  #[inline]
  pub const fn with_branch(mut self, branch: u32) -> Self {
    self.branch = if branch < 2 { 2 } else { branch };
    self
  }

  /// Seed the random source that drives node heights, making the shape of
  /// the structure reproducible across runs.
  ///
  /// By default the random source is seeded from the operating system.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use ordered_skl::Options;
  ///
  /// let opts = Options::new().with_seed(42);
  /// assert_eq!(opts.seed(), Some(42));
  /// ```
  #[inline]
  pub const fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  /// Set the number of nodes to reserve room for up front.
  ///
  /// The default is `0`, the node slab grows on demand.
  #[inline]
  pub const fn with_capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  /// Returns the maximum height of a node.
  #[inline]
  pub const fn max_height(&self) -> u8 {
    self.max_height
  }

  /// Returns the branching factor.
  #[inline]
  pub const fn branch(&self) -> u32 {
    self.branch
  }

  /// Returns the seed of the random source, if any.
  #[inline]
  pub const fn seed(&self) -> Option<u64> {
    self.seed
  }

  /// Returns the number of nodes reserved up front.
  #[inline]
  pub const fn capacity(&self) -> usize {
    self.capacity
  }
}
