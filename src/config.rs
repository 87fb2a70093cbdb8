use crate::{align, block::HEADER_SIZE, strategy::FitStrategy};

/// Bytes the region grows by when nothing else is configured.
pub const DEFAULT_INCREMENT: usize = 4096;

/// Smallest usable increment: room for a header and one more.
pub const MIN_INCREMENT: usize = 2 * HEADER_SIZE;

/// Policy a [`Heap`](crate::Heap) is built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
  strategy: FitStrategy,
  ceiling: Option<usize>,
  increment: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      strategy: FitStrategy::default(),
      ceiling: None,
      increment: DEFAULT_INCREMENT,
    }
  }
}

impl Config {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_strategy(
    mut self,
    strategy: FitStrategy,
  ) -> Self {
    self.strategy = strategy;
    self
  }

  /// Caps the region extent at `ceiling` bytes.
  pub fn with_ceiling(
    mut self,
    ceiling: usize,
  ) -> Self {
    self.ceiling = Some(ceiling);
    self
  }

  /// Sets the growth step, rounded up to the word and to [`MIN_INCREMENT`].
  pub fn with_increment(
    mut self,
    increment: usize,
  ) -> Self {
    self.increment = align!(increment.clamp(MIN_INCREMENT, usize::MAX / 2));
    self
  }

  pub fn strategy(&self) -> FitStrategy {
    self.strategy
  }

  pub fn ceiling(&self) -> Option<usize> {
    self.ceiling
  }

  pub fn increment(&self) -> usize {
    self.increment
  }
}
