//! The growable memory region underneath the heap.
//!
//! ```text
//!   origin                         origin + extent        ceiling
//!   ├──────────┬──────────┬────────┤ - - - - - - - - - - ┤
//!   │ incr. 1  │ incr. 2  │ incr. 3│   room to grow      │
//!   └──────────┴──────────┴────────┘                     │
//! ```
//!
//! A [`Region`] asks its [`RegionBackend`] for memory one increment at a
//! time and never moves bytes it already owns.

mod buffer;
mod program_break;
#[cfg(test)]
pub(crate) mod testing;

use std::{io, ptr, slice};

use log::{debug, warn};

pub use buffer::BufferRegion;
pub use program_break::ProgramBreak;

use crate::error::RegionError;

/// The primitive that extends or shrinks a contiguous memory region.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - `grow_by(n)` returning `Ok(p)` makes `[p, p + n)` valid for reads and
///   writes and exclusively owned by the caller until a later `reset_to`
///   moves the boundary below it;
/// - successive successful `grow_by` calls return adjacent ranges unless
///   some other party moved the boundary in between;
/// - growth never relocates bytes already handed out.
pub unsafe trait RegionBackend {
  /// Current end of the region. No side effects.
  fn current_end(&self) -> *mut u8;

  /// Extends the region by `bytes`, returning where the extension starts.
  fn grow_by(
    &mut self,
    bytes: usize,
  ) -> io::Result<*mut u8>;

  /// Shrinks the region back to `boundary`, abandoning everything past it.
  fn reset_to(
    &mut self,
    boundary: *mut u8,
  ) -> io::Result<()>;
}

/// Owns the region: where it starts, how far it extends, how far it may grow.
pub struct Region<B: RegionBackend> {
  backend: B,
  origin: *mut u8,
  extent: usize,
  increment: usize,
  ceiling: Option<usize>,
}

impl<B: RegionBackend> Region<B> {
  pub fn new(
    backend: B,
    increment: usize,
    ceiling: Option<usize>,
  ) -> Self {
    Self {
      backend,
      origin: ptr::null_mut(),
      extent: 0,
      increment,
      ceiling,
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.extent != 0
  }

  pub fn extent(&self) -> usize {
    self.extent
  }

  pub fn increment(&self) -> usize {
    self.increment
  }

  pub fn ceiling(&self) -> Option<usize> {
    self.ceiling
  }

  /// Start of the region, null before the first initialization.
  pub fn origin(&self) -> *mut u8 {
    self.origin
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  #[cfg(test)]
  pub(crate) fn backend_mut(&mut self) -> &mut B {
    &mut self.backend
  }

  pub fn bytes(&self) -> &[u8] {
    if self.extent == 0 {
      return &[];
    }
    // SAFETY: the backend guarantees [origin, origin + extent) is ours.
    unsafe { slice::from_raw_parts(self.origin, self.extent) }
  }

  pub fn bytes_mut(&mut self) -> &mut [u8] {
    if self.extent == 0 {
      return &mut [];
    }
    // SAFETY: as in `bytes`, and `&mut self` makes the view unique.
    unsafe { slice::from_raw_parts_mut(self.origin, self.extent) }
  }

  fn check_ceiling(&self) -> Result<(), RegionError> {
    let requested = self.extent.saturating_add(self.increment);
    match self.ceiling {
      Some(ceiling) if requested > ceiling => Err(RegionError::LimitExceeded { requested, ceiling }),
      _ => Ok(()),
    }
  }

  /// Captures the origin and takes the first increment.
  ///
  /// The caller installs the initial free block spanning `[0, increment)`.
  pub fn initialize(&mut self) -> Result<(), RegionError> {
    self.check_ceiling()?;

    let start = self.grow_backend()?;

    self.origin = start;
    self.extent = self.increment;

    debug!(
      "region initialized at {:?} with {} bytes (ceiling {:?})",
      self.origin, self.extent, self.ceiling
    );

    Ok(())
  }

  /// Takes one more increment and returns its offset from the origin.
  ///
  /// Refuses to grow once the backend's end has moved away from the
  /// region's end, so nothing is taken that the region could not use.
  pub fn grow(&mut self) -> Result<usize, RegionError> {
    self.check_ceiling()?;

    let expected = self.end();
    self.check_end(expected)?;

    let start = self.grow_backend()?;

    if start != expected {
      // Someone moved the end between the check and the grow.
      if let Err(err) = self.backend.reset_to(start) {
        warn!("could not give back {} bytes at {:?}: {}", self.increment, start, err);
      }
      return Err(RegionError::Discontiguous {
        expected: expected as usize,
        found: start as usize,
      });
    }

    let offset = self.extent;
    self.extent += self.increment;

    debug!("region grew to {} bytes", self.extent);

    Ok(offset)
  }

  fn end(&self) -> *mut u8 {
    self.origin.wrapping_add(self.extent)
  }

  fn check_end(
    &self,
    expected: *mut u8,
  ) -> Result<(), RegionError> {
    let found = self.backend.current_end();
    if found != expected {
      return Err(RegionError::Discontiguous {
        expected: expected as usize,
        found: found as usize,
      });
    }
    Ok(())
  }

  fn grow_backend(&mut self) -> Result<*mut u8, RegionError> {
    self.backend.grow_by(self.increment).map_err(|source| RegionError::Grow {
      increment: self.increment,
      source,
    })
  }

  /// Gives everything back to the backend and installs a new ceiling.
  ///
  /// Fails without touching the backend when anything now lies past the
  /// region's end, since shrinking would take that memory away too. On
  /// failure nothing changes.
  pub fn reset(
    &mut self,
    ceiling: Option<usize>,
  ) -> Result<(), RegionError> {
    if self.is_initialized() {
      self.check_end(self.end())?;
      self.backend.reset_to(self.origin).map_err(RegionError::Reset)?;
      debug!("region reset to {:?}, dropped {} bytes", self.origin, self.extent);
    }

    self.extent = 0;
    self.ceiling = ceiling;

    Ok(())
  }
}
