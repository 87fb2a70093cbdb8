use std::fmt;

use crate::free_list::FreeBlock;

/// Snapshot of the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapStats {
  /// Sum of payload capacity (`size - HEADER_SIZE`) over all free blocks.
  pub free_bytes: usize,
  pub free_block_count: usize,
  /// Raw size of the largest free block, 0 when there is none.
  pub largest_free_block_size: usize,
  /// Raw size of the smallest free block. With no free blocks this is one
  /// more than the region extent.
  pub smallest_free_block_size: usize,
}

impl HeapStats {
  /// Folds a free-list walk over a region of `extent` bytes.
  pub fn collect(
    blocks: impl IntoIterator<Item = FreeBlock>,
    extent: usize,
  ) -> Self {
    let mut stats = Self {
      free_bytes: 0,
      free_block_count: 0,
      largest_free_block_size: 0,
      smallest_free_block_size: extent + 1,
    };

    for block in blocks {
      stats.free_bytes += block.capacity();
      stats.free_block_count += 1;
      stats.largest_free_block_size = stats.largest_free_block_size.max(block.size);
      stats.smallest_free_block_size = stats.smallest_free_block_size.min(block.size);
    }

    stats
  }

  pub fn has_free_blocks(&self) -> bool {
    self.free_block_count != 0
  }
}

impl fmt::Display for HeapStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "{} free bytes in {} blocks",
      self.free_bytes, self.free_block_count
    )?;
    if self.has_free_blocks() {
      write!(
        f,
        " (largest {}, smallest {})",
        self.largest_free_block_size, self.smallest_free_block_size
      )?;
    }
    Ok(())
  }
}
