use std::io;

use super::{BufferRegion, RegionBackend};

/// A buffer backend that other parties can move, and that can refuse resets.
pub(crate) struct Shared {
  inner: BufferRegion,
  pub(crate) refuse_reset: bool,
  /// Bytes someone else takes right before the next `grow_by` is served.
  pub(crate) skew: usize,
}

impl Shared {
  pub(crate) fn with_capacity(capacity: usize) -> Self {
    Self {
      inner: BufferRegion::with_capacity(capacity),
      refuse_reset: false,
      skew: 0,
    }
  }

  /// Moves the end the way a second user of the same break would.
  pub(crate) fn intrude(
    &mut self,
    bytes: usize,
  ) {
    self.inner.grow_by(bytes).expect("room left to intrude");
  }

  pub(crate) fn used(&self) -> usize {
    self.inner.used()
  }
}

unsafe impl RegionBackend for Shared {
  fn current_end(&self) -> *mut u8 {
    self.inner.current_end()
  }

  fn grow_by(
    &mut self,
    bytes: usize,
  ) -> io::Result<*mut u8> {
    if self.skew != 0 {
      let skew = std::mem::take(&mut self.skew);
      self.intrude(skew);
    }
    self.inner.grow_by(bytes)
  }

  fn reset_to(
    &mut self,
    boundary: *mut u8,
  ) -> io::Result<()> {
    if self.refuse_reset {
      return Err(io::Error::other("reset refused"));
    }
    self.inner.reset_to(boundary)
  }
}
