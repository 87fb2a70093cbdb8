use std::{io, mem, ptr::NonNull};

use super::RegionBackend;

/// A fixed-capacity, word-aligned buffer standing in for the program break.
///
/// The buffer is reserved up front and never reallocated, so growing
/// within it keeps every earlier byte in place. Several heaps can each own
/// one without interfering with each other or with the process break.
pub struct BufferRegion {
  base: NonNull<usize>,
  words: usize,
  end: usize,
}

impl BufferRegion {
  /// Reserves `capacity` bytes, rounded up to the machine word.
  pub fn with_capacity(capacity: usize) -> Self {
    let words = capacity.div_ceil(mem::size_of::<usize>());
    let buffer: Box<[usize]> = vec![0usize; words].into_boxed_slice();
    let base = NonNull::from(Box::leak(buffer)).cast::<usize>();

    Self { base, words, end: 0 }
  }

  pub fn capacity(&self) -> usize {
    self.words * mem::size_of::<usize>()
  }

  pub fn base(&self) -> *mut u8 {
    self.base.as_ptr().cast::<u8>()
  }

  /// Bytes currently handed out.
  pub fn used(&self) -> usize {
    self.end
  }
}

unsafe impl RegionBackend for BufferRegion {
  fn current_end(&self) -> *mut u8 {
    self.base().wrapping_add(self.end)
  }

  fn grow_by(
    &mut self,
    bytes: usize,
  ) -> io::Result<*mut u8> {
    match self.end.checked_add(bytes) {
      Some(end) if end <= self.capacity() => {
        let start = self.current_end();
        self.end = end;
        Ok(start)
      }
      _ => Err(io::Error::from(io::ErrorKind::OutOfMemory)),
    }
  }

  fn reset_to(
    &mut self,
    boundary: *mut u8,
  ) -> io::Result<()> {
    let offset = (boundary as usize).wrapping_sub(self.base() as usize);
    if offset > self.end {
      return Err(io::Error::from(io::ErrorKind::InvalidInput));
    }
    self.end = offset;
    Ok(())
  }
}

impl Drop for BufferRegion {
  fn drop(&mut self) {
    let slice = std::ptr::slice_from_raw_parts_mut(self.base.as_ptr(), self.words);
    // SAFETY: `base` and `words` come from the box leaked in `with_capacity`.
    drop(unsafe { Box::from_raw(slice) });
  }
}
