use crate::block::{self, HEADER_SIZE};

/// A free block as seen while walking the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeBlock {
  /// Offset of the block header from the region origin.
  pub offset: usize,
  /// Total block size, header included.
  pub size: usize,
}

impl FreeBlock {
  /// Payload bytes this block could hand out.
  pub fn capacity(&self) -> usize {
    self.size - HEADER_SIZE
  }

  /// Offset of the first byte past this block.
  pub fn end(&self) -> usize {
    self.offset + self.size
  }
}

/// Singly-linked chain of free blocks threaded through the region bytes.
///
/// Only the head lives outside the region; every link is stored in the
/// `next` field of a block header. Order is insertion order.
#[derive(Debug, Default)]
pub struct FreeList {
  head: Option<usize>,
}

impl FreeList {
  pub fn new() -> Self {
    Self { head: None }
  }

  pub fn head(&self) -> Option<usize> {
    self.head
  }

  /// Forgets every entry. The headers in the region are left as they are.
  pub fn clear(&mut self) {
    self.head = None;
  }

  pub fn link_at_head(
    &mut self,
    bytes: &mut [u8],
    block: usize,
  ) {
    block::set_next(bytes, block, self.head);
    self.head = Some(block);
  }

  /// Removes `block` from the chain. Returns `false` if it was not linked.
  pub fn unlink(
    &mut self,
    bytes: &mut [u8],
    block: usize,
  ) -> bool {
    let next = block::next_at(bytes, block);
    self.relink(bytes, block, next)
  }

  /// Puts `new` at the list position of `old`, dropping `old` from the chain.
  pub fn replace(
    &mut self,
    bytes: &mut [u8],
    old: usize,
    new: usize,
  ) -> bool {
    let next = block::next_at(bytes, old);
    block::set_next(bytes, new, next);
    self.relink(bytes, old, Some(new))
  }

  /// Points whatever referenced `target` at `successor` instead.
  fn relink(
    &mut self,
    bytes: &mut [u8],
    target: usize,
    successor: Option<usize>,
  ) -> bool {
    if self.head == Some(target) {
      self.head = successor;
      return true;
    }

    let mut current = self.head;
    while let Some(offset) = current {
      let next = block::next_at(bytes, offset);
      if next == Some(target) {
        block::set_next(bytes, offset, successor);
        return true;
      }
      current = next;
    }

    false
  }

  pub fn iter<'a>(
    &self,
    bytes: &'a [u8],
  ) -> Iter<'a> {
    Iter {
      bytes,
      current: self.head,
    }
  }

  /// First pair of free blocks where the first ends exactly where the
  /// second begins, in either list order.
  pub fn adjacent_pair(
    &self,
    bytes: &[u8],
  ) -> Option<(FreeBlock, FreeBlock)> {
    for low in self.iter(bytes) {
      if let Some(high) = self.iter(bytes).find(|high| low.end() == high.offset) {
        return Some((low, high));
      }
    }
    None
  }
}

/// Walks a [`FreeList`] in list order.
pub struct Iter<'a> {
  bytes: &'a [u8],
  current: Option<usize>,
}

impl Iterator for Iter<'_> {
  type Item = FreeBlock;

  fn next(&mut self) -> Option<FreeBlock> {
    let offset = self.current?;
    self.current = block::next_at(self.bytes, offset);
    Some(FreeBlock {
      offset,
      size: block::size_at(self.bytes, offset),
    })
  }
}
