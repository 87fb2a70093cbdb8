use log::{debug, trace};

use crate::{
  align,
  align::MAX_REQUEST,
  block::{self, HEADER_SIZE, Header},
  config::Config,
  error::{AllocError, HeapCorruption, RegionError, Result},
  free_list::{FreeBlock, FreeList},
  region::{ProgramBreak, Region, RegionBackend},
  stats::HeapStats,
  strategy::FitStrategy,
};

/// Handle to an allocation: the offset of its first payload byte from the
/// region origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Payload(usize);

impl Payload {
  pub fn offset(self) -> usize {
    self.0
  }

  fn block(self) -> usize {
    self.0 - HEADER_SIZE
  }
}

/// Free-list heap over a growable region.
///
/// Not thread-safe. Callers sharing a heap must serialize every call.
pub struct Heap<B: RegionBackend> {
  region: Region<B>,
  free: FreeList,
  strategy: FitStrategy,
}

impl Heap<ProgramBreak> {
  /// Heap on the process program break with the default [`Config`].
  ///
  /// # Safety
  ///
  /// Same contract as [`ProgramBreak::new`]: the caller owns the program
  /// break for the lifetime of the heap.
  pub unsafe fn program_break() -> Self {
    Self::new(unsafe { ProgramBreak::new() })
  }
}

impl<B: RegionBackend> Heap<B> {
  pub fn new(backend: B) -> Self {
    Self::with_config(backend, Config::default())
  }

  pub fn with_config(
    backend: B,
    config: Config,
  ) -> Self {
    Self {
      region: Region::new(backend, config.increment(), config.ceiling()),
      free: FreeList::new(),
      strategy: config.strategy(),
    }
  }

  pub fn strategy(&self) -> FitStrategy {
    self.strategy
  }

  pub fn ceiling(&self) -> Option<usize> {
    self.region.ceiling()
  }

  /// Current region size in bytes, 0 before the first allocation.
  pub fn extent(&self) -> usize {
    self.region.extent()
  }

  pub fn region(&self) -> &Region<B> {
    &self.region
  }

  /// Allocates a block with room for at least `nbytes` payload bytes.
  ///
  /// The request is rounded up to the machine word. Zero-byte requests get
  /// a block of their own with an empty payload. The payload is not zeroed.
  ///
  /// # Errors
  ///
  /// [`AllocError::OutOfMemory`] once the region cannot grow any further;
  /// the heap stays usable for smaller requests.
  pub fn allocate(
    &mut self,
    nbytes: usize,
  ) -> Result<Payload> {
    if nbytes > MAX_REQUEST {
      return Err(AllocError::Oversized { requested: nbytes });
    }
    let request = align!(nbytes);

    let out_of_memory = |source: RegionError| AllocError::OutOfMemory {
      requested: nbytes,
      source,
    };

    if !self.region.is_initialized() {
      self.initialize().map_err(out_of_memory)?;
    }

    let block = loop {
      if let Some(block) = self.strategy.select(&self.free, self.region.bytes(), request) {
        break block;
      }
      self.grow().map_err(out_of_memory)?;
    };

    self.split(request, block);

    let bytes = self.region.bytes_mut();
    block::set_next(bytes, block.offset, None);

    trace!(
      "allocated {} bytes ({} requested) at {:#x}",
      block::size_at(bytes, block.offset) - HEADER_SIZE,
      nbytes,
      block.offset
    );

    Ok(Payload(block.offset + HEADER_SIZE))
  }

  /// Returns a block to the free list and merges it with free neighbours.
  ///
  /// `payload` must come from [`allocate`](Self::allocate) on this heap,
  /// since the last reset, and not be released yet. Handles whose header
  /// lies past the region (such as those from before a reset) are ignored.
  /// Other misuse corrupts the heap's bookkeeping, which
  /// [`check`](Self::check) reports, but never touches memory outside the
  /// region.
  pub fn release(
    &mut self,
    payload: Payload,
  ) {
    let block = payload.block();

    if payload.offset() > self.region.extent() {
      debug!("ignoring release of {:#x}: outside the region", block);
      return;
    }

    trace!("released block at {:#x}", block);

    self.free.link_at_head(self.region.bytes_mut(), block);
    self.coalesce();
  }

  /// Hard reset: gives the whole region back, forgets every block and
  /// installs the new policy.
  ///
  /// Every [`Payload`] handed out before is dangling afterwards. Use
  /// [`set_strategy`](Self::set_strategy) to change only the strategy.
  ///
  /// # Errors
  ///
  /// [`AllocError::Reset`] if the backend cannot shrink the region; the heap
  /// is left exactly as it was.
  pub fn configure(
    &mut self,
    strategy: FitStrategy,
    ceiling: Option<usize>,
  ) -> Result<()> {
    self.region.reset(ceiling).map_err(AllocError::Reset)?;
    self.free.clear();
    self.strategy = strategy;

    debug!("heap configured: {}, ceiling {:?}", strategy, ceiling);

    Ok(())
  }

  /// Switches the fit strategy, keeping every block where it is.
  pub fn set_strategy(
    &mut self,
    strategy: FitStrategy,
  ) {
    self.strategy = strategy;
  }

  pub fn stats(&self) -> HeapStats {
    HeapStats::collect(self.free_blocks(), self.region.extent())
  }

  /// Free-list entries in list order.
  pub fn free_blocks(&self) -> impl Iterator<Item = FreeBlock> + '_ {
    self.free.iter(self.region.bytes())
  }

  /// Whole payload capacity of an allocated block.
  ///
  /// # Panics
  ///
  /// If the handle's block does not lie within the region, as happens with
  /// handles kept across a reset.
  pub fn payload(
    &self,
    payload: Payload,
  ) -> &[u8] {
    let bytes = self.region.bytes();
    let end = payload.block() + block::size_at(bytes, payload.block());
    &bytes[payload.offset()..end]
  }

  /// Mutable counterpart of [`payload`](Self::payload), with the same panics.
  pub fn payload_mut(
    &mut self,
    payload: Payload,
  ) -> &mut [u8] {
    let bytes = self.region.bytes_mut();
    let end = payload.block() + block::size_at(bytes, payload.block());
    &mut bytes[payload.offset()..end]
  }

  /// Raw address of a payload, for callers that hand it on as a pointer.
  pub fn as_ptr(
    &self,
    payload: Payload,
  ) -> *mut u8 {
    self.region.origin().wrapping_add(payload.offset())
  }

  /// Walks the free list and verifies its structure.
  pub fn check(&self) -> core::result::Result<(), HeapCorruption> {
    let bytes = self.region.bytes();
    let extent = self.region.extent();
    let mut blocks: Vec<FreeBlock> = Vec::new();

    let mut current = self.free.head();
    while let Some(offset) = current {
      if blocks.len() > extent / HEADER_SIZE {
        return Err(HeapCorruption::Cycle);
      }
      if offset.checked_add(HEADER_SIZE).is_none_or(|end| end > extent) {
        return Err(HeapCorruption::OutOfBounds { offset, size: 0, extent });
      }

      let Header { size, next } = Header::read(bytes, offset);
      if size < HEADER_SIZE {
        return Err(HeapCorruption::Undersized { offset, size });
      }
      if offset.checked_add(size).is_none_or(|end| end > extent) {
        return Err(HeapCorruption::OutOfBounds { offset, size, extent });
      }

      blocks.push(FreeBlock { offset, size });
      current = next;
    }

    for (i, a) in blocks.iter().enumerate() {
      for b in &blocks[i + 1..] {
        if a.offset < b.end() && b.offset < a.end() {
          return Err(HeapCorruption::Overlap {
            first: a.offset,
            second: b.offset,
          });
        }
        if a.end() == b.offset || b.end() == a.offset {
          return Err(HeapCorruption::Adjacent {
            low: a.offset.min(b.offset),
            high: a.offset.max(b.offset),
          });
        }
      }
    }

    Ok(())
  }

  fn initialize(&mut self) -> core::result::Result<(), RegionError> {
    self.region.initialize()?;

    let increment = self.region.increment();
    let bytes = self.region.bytes_mut();
    Header::new(increment, None).write(bytes, 0);

    self.free.clear();
    self.free.link_at_head(bytes, 0);

    Ok(())
  }

  fn grow(&mut self) -> core::result::Result<(), RegionError> {
    let offset = self.region.grow()?;

    let increment = self.region.increment();
    let bytes = self.region.bytes_mut();
    Header::new(increment, None).write(bytes, offset);
    self.free.link_at_head(bytes, offset);

    self.coalesce();

    Ok(())
  }

  /// Carves `request` payload bytes off the front of `block` and takes the
  /// block off the free list. A remainder too small to be worth a free
  /// block stays attached to the allocation.
  fn split(
    &mut self,
    request: usize,
    block: FreeBlock,
  ) {
    let bytes = self.region.bytes_mut();
    let leftover = block.size - request - HEADER_SIZE;

    if leftover <= HEADER_SIZE {
      trace!("handing out block at {:#x} whole ({} bytes)", block.offset, block.size);
      self.free.unlink(bytes, block.offset);
      return;
    }

    let taken = request + HEADER_SIZE;
    let remainder = block.offset + taken;

    Header::new(leftover, None).write(bytes, remainder);
    block::set_size(bytes, block.offset, taken);
    self.free.replace(bytes, block.offset, remainder);

    trace!(
      "split block at {:#x}: {} taken, {} left at {:#x}",
      block.offset, taken, leftover, remainder
    );
  }

  /// Merges physically adjacent free blocks until no two touch.
  fn coalesce(&mut self) {
    let bytes = self.region.bytes_mut();

    while let Some((low, high)) = self.free.adjacent_pair(bytes) {
      self.free.unlink(bytes, high.offset);
      block::set_size(bytes, low.offset, low.size + high.size);

      trace!("merged {:#x} into {:#x}", high.offset, low.offset);
    }
  }
}
