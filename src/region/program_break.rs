use std::io;

use libc::{c_void, intptr_t, sbrk};

use super::RegionBackend;

/// The process data segment, moved with `sbrk(2)`.
///
/// ```text
///   High Address ┌─────────────────────┐
///                │       Stack         │ ↓ grows down
///                │                     │
///                │         ▲           │
///                │       Heap          │ ↑ grows up (sbrk)
///                ├─────────────────────┤ ← Program Break
///                │   Uninitialized     │
///                │       Data          │
///   Low Address  └─────────────────────┘
/// ```
///
/// There is only one program break per process. A [`Region`](super::Region)
/// stops growing and refuses to reset once something else has moved the
/// break past its end, but it cannot see memory that was released back
/// below it and taken again.
#[derive(Debug)]
pub struct ProgramBreak {
  _private: (),
}

impl ProgramBreak {
  /// # Safety
  ///
  /// For as long as the returned value (or a heap built on it) lives, nothing
  /// else may shrink the program break below the end of the memory it has
  /// grown: no `brk`/`sbrk` with a negative delta from other code, including
  /// a system allocator trimming its own heap, and no concurrent calls.
  pub unsafe fn new() -> Self {
    Self { _private: () }
  }

  fn move_break(increment: intptr_t) -> io::Result<*mut u8> {
    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      return Err(io::Error::last_os_error());
    }

    Ok(address as *mut u8)
  }
}

unsafe impl RegionBackend for ProgramBreak {
  fn current_end(&self) -> *mut u8 {
    unsafe { sbrk(0) as *mut u8 }
  }

  fn grow_by(
    &mut self,
    bytes: usize,
  ) -> io::Result<*mut u8> {
    let increment = intptr_t::try_from(bytes).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    Self::move_break(increment)
  }

  fn reset_to(
    &mut self,
    boundary: *mut u8,
  ) -> io::Result<()> {
    let end = self.current_end() as usize;
    let boundary = boundary as usize;

    if boundary > end {
      return Err(io::Error::from(io::ErrorKind::InvalidInput));
    }

    let decrement = intptr_t::try_from(end - boundary).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    Self::move_break(-decrement).map(|_| ())
  }
}
