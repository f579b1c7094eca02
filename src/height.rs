use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{Options, MAX_HEIGHT};

/// Upon the insertion of a new node, the node is promoted to higher levels
/// with a probability determined by the `LevelGenerator`.
///
/// Heights follow a geometric distribution truncated at the configured
/// maximum: a node reaches level `k + 1` with probability `p^k`, where
/// `p = 1 / branch`.
///
/// The thresholds `u64::MAX * p^k` are precomputed so that only a single
/// random number needs to be drawn per node.
#[derive(Debug, Clone)]
pub struct LevelGenerator<R> {
  thresholds: [u64; MAX_HEIGHT],
  max_height: usize,
  branch: u32,
  rng: R,
}

impl LevelGenerator<StdRng> {
  /// Creates a generator backed by a [`StdRng`], seeded from
  /// [`Options::seed`] when present and from the operating system otherwise.
  pub fn from_options(opts: &Options) -> Self {
    let rng = match opts.seed() {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_os_rng(),
    };
    Self::new(opts, rng)
  }
}

impl<R: RngCore> LevelGenerator<R> {
  /// Creates a generator with the height limit and branching factor of
  /// `opts`, drawing from `rng`.
  pub fn new(opts: &Options, rng: R) -> Self {
    let p = 1f64 / opts.branch() as f64;
    let mut thresholds = [0; MAX_HEIGHT];
    let mut acc = 1f64;
    for t in thresholds.iter_mut() {
      *t = ((u64::MAX as f64) * acc) as u64;
      acc *= p;
    }

    Self {
      thresholds,
      max_height: opts.max_height() as usize,
      branch: opts.branch(),
      rng,
    }
  }

  /// Returns a random height in `[1, max_height]`.
  #[inline]
  pub fn random_height(&mut self) -> usize {
    let rnd = self.rng.next_u64();
    let mut h = 1;
    while h < self.max_height && rnd < self.thresholds[h] {
      h += 1;
    }
    h
  }

  /// Returns the maximum height this generator produces.
  #[inline]
  pub const fn max_height(&self) -> usize {
    self.max_height
  }

  /// Returns the branching factor.
  #[inline]
  pub const fn branch(&self) -> u32 {
    self.branch
  }
}
