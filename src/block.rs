use std::mem;

const WORD: usize = mem::size_of::<usize>();

/// Bytes occupied by a [`Header`] inside the region.
pub const HEADER_SIZE: usize = 2 * WORD;

/// Encoded `next` of the last free-list entry.
const NIL: usize = usize::MAX;

/// Metadata written at the start of every block, free or allocated.
///
/// ```text
///   offset      offset + WORD     offset + HEADER_SIZE
///   ┌───────────┬─────────────────┬─────────────────────────┐
///   │ size      │ next (or NIL)   │ payload ...             │
///   └───────────┴─────────────────┴─────────────────────────┘
///   ◄─────────────────────── size ───────────────────────────►
/// ```
///
/// `size` covers the header itself. `next` is only meaningful while the
/// block sits in the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
  pub size: usize,
  pub next: Option<usize>,
}

impl Header {
  pub fn new(
    size: usize,
    next: Option<usize>,
  ) -> Self {
    Self { size, next }
  }

  pub fn read(
    bytes: &[u8],
    at: usize,
  ) -> Self {
    Self {
      size: size_at(bytes, at),
      next: next_at(bytes, at),
    }
  }

  pub fn write(
    self,
    bytes: &mut [u8],
    at: usize,
  ) {
    set_size(bytes, at, self.size);
    set_next(bytes, at, self.next);
  }
}

fn read_word(
  bytes: &[u8],
  at: usize,
) -> usize {
  let mut word = [0u8; WORD];
  word.copy_from_slice(&bytes[at..at + WORD]);
  usize::from_ne_bytes(word)
}

fn write_word(
  bytes: &mut [u8],
  at: usize,
  value: usize,
) {
  bytes[at..at + WORD].copy_from_slice(&value.to_ne_bytes());
}

pub fn size_at(
  bytes: &[u8],
  at: usize,
) -> usize {
  read_word(bytes, at)
}

pub fn set_size(
  bytes: &mut [u8],
  at: usize,
  size: usize,
) {
  write_word(bytes, at, size);
}

pub fn next_at(
  bytes: &[u8],
  at: usize,
) -> Option<usize> {
  match read_word(bytes, at + WORD) {
    NIL => None,
    next => Some(next),
  }
}

pub fn set_next(
  bytes: &mut [u8],
  at: usize,
  next: Option<usize>,
) {
  write_word(bytes, at + WORD, next.unwrap_or(NIL));
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_in_place() {
    let mut bytes = vec![0u8; 4 * HEADER_SIZE];

    Header::new(3 * HEADER_SIZE, Some(HEADER_SIZE)).write(&mut bytes, HEADER_SIZE);

    assert_eq!(size_at(&bytes, HEADER_SIZE), 3 * HEADER_SIZE);
    assert_eq!(next_at(&bytes, HEADER_SIZE), Some(HEADER_SIZE));

    // The bytes before the header are untouched.
    assert!(bytes[..HEADER_SIZE].iter().all(|&b| b == 0));
  }

  #[test]
  fn test_cleared_next() {
    let mut bytes = vec![0u8; HEADER_SIZE];

    Header::new(HEADER_SIZE, Some(0)).write(&mut bytes, 0);
    set_next(&mut bytes, 0, None);

    assert_eq!(Header::read(&bytes, 0), Header::new(HEADER_SIZE, None));
  }

  #[test]
  #[should_panic]
  fn test_header_past_end_panics() {
    let bytes = vec![0u8; HEADER_SIZE];
    next_at(&bytes, 1);
  }
}
