//! # fitalloc - A Free-List Heap over a Growable Region
//!
//! This crate provides a **free-list allocator** that carves a single,
//! monotonically growing memory region into allocated and free blocks. The
//! region is normally the process data segment, extended with `sbrk(2)`.
//!
//! ## Overview
//!
//! Every block, free or allocated, starts with a header that records the
//! block's total size. Free blocks additionally link to the next free block,
//! so the free list lives inside the very memory it describes:
//!
//! ```text
//!   Region (origin ... origin + extent):
//!
//!   ┌──────┬─────────┬──────┬─────────────┬──────┬──────┬────────────────┐
//!   │ hdr  │ payload │ hdr  │   (free)    │ hdr  │ pay. │ hdr   (free)   │
//!   └──────┴─────────┴──────┴─────────────┴──────┴──────┴────────────────┘
//!                       ▲                                   ▲
//!                       │          next                     │
//!   head ───────────────┘  ┌────────────────────────────────┘
//!                          │     (insertion order, not address order)
//!                          └──► ...
//! ```
//!
//! On allocation a [`FitStrategy`] picks a free block, the block is split
//! if the remainder is worth keeping, and the payload handle is returned.
//! When no block fits, the region grows by one increment and the search is
//! retried until the configured ceiling (or the operating system) says no.
//! On release the block goes back to the head of the free list and
//! physically adjacent free blocks are merged.
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── align      - Word rounding (align!)
//!   ├── block      - Block header encoding (internal)
//!   ├── free_list  - Free list threaded through the region
//!   ├── strategy   - First-, best- and worst-fit selection
//!   ├── region     - Region controller, sbrk and buffer backends
//!   ├── config     - Heap policy
//!   ├── stats      - Free-list statistics
//!   ├── error      - Error types
//!   └── heap       - Heap facade
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitalloc::{BufferRegion, Config, FitStrategy, Heap};
//!
//! let config = Config::new().with_strategy(FitStrategy::BestFit).with_ceiling(64 * 1024);
//! let mut heap = Heap::with_config(BufferRegion::with_capacity(64 * 1024), config);
//!
//! let payload = heap.allocate(32).unwrap();
//! heap.payload_mut(payload)[..5].copy_from_slice(b"hello");
//! assert_eq!(&heap.payload(payload)[..5], b"hello");
//!
//! heap.release(payload);
//! assert_eq!(heap.stats().free_block_count, 1);
//! ```
//!
//! [`Heap::program_break`] builds the same heap on the real program break. It
//! is `unsafe`: nothing else may shrink the break while the heap lives.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives
//! - **Grow-only**: released memory is reused but never given back, except
//!   by a full [`Heap::configure`] reset
//! - **Trusting**: releasing a handle twice, or one that came from elsewhere,
//!   corrupts the heap's bookkeeping
//! - **Unix-only** for [`ProgramBreak`]: requires `libc` and `sbrk`

pub mod align;
mod block;
mod config;
mod error;
mod free_list;
mod heap;
mod region;
mod stats;
mod strategy;

pub use block::HEADER_SIZE;
pub use config::{Config, DEFAULT_INCREMENT, MIN_INCREMENT};
pub use error::{AllocError, HeapCorruption, RegionError, Result};
pub use free_list::FreeBlock;
pub use heap::{Heap, Payload};
pub use region::{BufferRegion, ProgramBreak, Region, RegionBackend};
pub use stats::HeapStats;
pub use strategy::{FitStrategy, ParseStrategyError};
