use std::io;

use thiserror::Error;

/// Failures of the region controller.
#[derive(Debug, Error)]
pub enum RegionError {
  #[error("growing the region to {requested} bytes would exceed the ceiling of {ceiling} bytes")]
  LimitExceeded { requested: usize, ceiling: usize },

  #[error("region-grow primitive refused {increment} more bytes")]
  Grow {
    increment: usize,
    #[source]
    source: io::Error,
  },

  #[error("region end moved: found {found:#x}, expected {expected:#x}")]
  Discontiguous { expected: usize, found: usize },

  #[error("region-reset primitive failed")]
  Reset(#[source] io::Error),
}

/// Failures reported by the heap facade.
#[derive(Debug, Error)]
pub enum AllocError {
  #[error("out of memory (requested: {requested} bytes)")]
  OutOfMemory {
    requested: usize,
    #[source]
    source: RegionError,
  },

  #[error("request of {requested} bytes cannot be represented")]
  Oversized { requested: usize },

  #[error("heap reset failed")]
  Reset(#[source] RegionError),
}

/// Structural damage found by [`Heap::check`](crate::Heap::check).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapCorruption {
  #[error("free block at {offset:#x} (size {size}) leaves the region of {extent} bytes")]
  OutOfBounds {
    offset: usize,
    size: usize,
    extent: usize,
  },

  #[error("free block at {offset:#x} is smaller than its header ({size} bytes)")]
  Undersized { offset: usize, size: usize },

  #[error("free blocks at {first:#x} and {second:#x} overlap")]
  Overlap { first: usize, second: usize },

  #[error("free blocks at {low:#x} and {high:#x} are adjacent but not coalesced")]
  Adjacent { low: usize, high: usize },

  #[error("free list does not terminate")]
  Cycle,
}

pub type Result<T> = core::result::Result<T, AllocError>;
