use fitalloc::{AllocError, BufferRegion, Config, FitStrategy, HEADER_SIZE, Heap, Payload, RegionError};
use rand::{Rng, SeedableRng, rngs::StdRng};

const INCREMENT: usize = 512;
const CAPACITY: usize = 1024 * INCREMENT;

const STRATEGIES: [FitStrategy; 3] = [FitStrategy::FirstFit, FitStrategy::BestFit, FitStrategy::WorstFit];

struct Live {
  payload: Payload,
  requested: usize,
  fill: u8,
}

fn heap(
  strategy: FitStrategy,
  ceiling: Option<usize>,
) -> Heap<BufferRegion> {
  let mut config = Config::new().with_strategy(strategy).with_increment(INCREMENT);
  if let Some(ceiling) = ceiling {
    config = config.with_ceiling(ceiling);
  }
  Heap::with_config(BufferRegion::with_capacity(CAPACITY), config)
}

/// Checks everything that must hold between two public calls.
fn verify(
  heap: &Heap<BufferRegion>,
  live: &[Live],
) {
  heap.check().unwrap();

  // Payload integrity.
  for entry in live {
    let payload = heap.payload(entry.payload);
    assert!(payload.len() >= entry.requested);
    assert!(payload[..entry.requested].iter().all(|&b| b == entry.fill));
  }

  // Live and free blocks partition the region.
  let mut spans: Vec<(usize, usize)> = heap.free_blocks().map(|b| (b.offset, b.end())).collect();
  for entry in live {
    let start = entry.payload.offset() - HEADER_SIZE;
    spans.push((start, entry.payload.offset() + heap.payload(entry.payload).len()));
  }
  spans.sort_unstable();

  let mut cursor = 0;
  for (start, end) in spans {
    assert_eq!(start, cursor, "gap or overlap at {:#x}", start);
    cursor = end;
  }
  assert_eq!(cursor, heap.extent());

  // Stats agree with an independent walk.
  let stats = heap.stats();
  let walked: Vec<_> = heap.free_blocks().collect();
  assert_eq!(stats.free_bytes, walked.iter().map(|b| b.size - HEADER_SIZE).sum::<usize>());
  assert_eq!(stats.free_block_count, walked.len());
  if walked.is_empty() {
    assert_eq!(stats.smallest_free_block_size, heap.extent() + 1);
  } else {
    assert_eq!(stats.largest_free_block_size, walked.iter().map(|b| b.size).max().unwrap());
    assert_eq!(stats.smallest_free_block_size, walked.iter().map(|b| b.size).min().unwrap());
  }
}

fn run(
  strategy: FitStrategy,
  seed: u64,
) {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut heap = heap(strategy, None);
  let mut live: Vec<Live> = Vec::new();

  for _ in 0..400 {
    if live.is_empty() || rng.random_bool(0.6) {
      let requested = rng.random_range(0..700);
      let fill = rng.random::<u8>();

      let payload = heap.allocate(requested).unwrap();
      heap.payload_mut(payload)[..requested].fill(fill);
      live.push(Live {
        payload,
        requested,
        fill,
      });
    } else {
      let entry = live.swap_remove(rng.random_range(0..live.len()));
      heap.release(entry.payload);
    }

    verify(&heap, &live);
  }

  for entry in live.drain(..) {
    heap.release(entry.payload);
  }
  verify(&heap, &live);

  let stats = heap.stats();
  assert_eq!(stats.free_block_count, 1);
  assert_eq!(stats.largest_free_block_size, heap.extent());
}

#[test]
fn random_sequences_keep_the_heap_consistent() {
  for strategy in STRATEGIES {
    for seed in 0..8 {
      run(strategy, seed);
    }
  }
}

#[test]
fn ceiling_is_never_exceeded() {
  let ceiling = 4 * INCREMENT;

  for strategy in STRATEGIES {
    let mut rng = StdRng::seed_from_u64(42);
    let mut heap = heap(strategy, Some(ceiling));
    let mut live: Vec<Live> = Vec::new();
    let mut failures = 0;

    for _ in 0..300 {
      if live.is_empty() || rng.random_bool(0.7) {
        let requested = rng.random_range(1..3 * INCREMENT);

        match heap.allocate(requested) {
          Ok(payload) => {
            heap.payload_mut(payload)[..requested].fill(0xEE);
            live.push(Live {
              payload,
              requested,
              fill: 0xEE,
            });
          }
          Err(AllocError::OutOfMemory {
            source: RegionError::LimitExceeded { ceiling: c, .. },
            ..
          }) => {
            assert_eq!(c, ceiling);
            failures += 1;
          }
          Err(err) => panic!("unexpected error: {}", err),
        }
      } else {
        let entry = live.swap_remove(rng.random_range(0..live.len()));
        heap.release(entry.payload);
      }

      assert!(heap.extent() <= ceiling);
      verify(&heap, &live);
    }

    assert!(failures > 0);
    assert_eq!(heap.region().backend().used(), heap.extent());
  }
}

#[test]
fn adjacent_pair_released_in_either_order_becomes_one_block() {
  for strategy in STRATEGIES {
    for a_first in [true, false] {
      let mut heap = heap(strategy, None);

      let a = heap.allocate(40).unwrap();
      let b = heap.allocate(56).unwrap();
      let c = heap.allocate(8).unwrap();
      assert_eq!(b.offset(), a.offset() + 40 + HEADER_SIZE);

      if a_first {
        heap.release(a);
        heap.release(b);
      } else {
        heap.release(b);
        heap.release(a);
      }

      let merged: Vec<_> = heap.free_blocks().filter(|block| block.end() == c.offset() - HEADER_SIZE).collect();
      assert_eq!(merged.len(), 1);
      assert_eq!(merged[0].offset, a.offset() - HEADER_SIZE);
      assert_eq!(merged[0].size, 40 + 56 + 2 * HEADER_SIZE);
    }
  }
}

#[test]
fn one_increment_ceiling_scenario() {
  let mut heap = heap(FitStrategy::FirstFit, None);
  heap.configure(FitStrategy::FirstFit, Some(INCREMENT)).unwrap();

  heap.allocate(10).unwrap();

  let huge = INCREMENT;
  let err = heap.allocate(huge).unwrap_err();
  assert!(matches!(err, AllocError::OutOfMemory { requested, .. } if requested == huge));
  assert_eq!(heap.extent(), INCREMENT);

  // Raising the ceiling (which resets) makes the same request succeed by growing.
  heap.configure(FitStrategy::FirstFit, Some(4 * INCREMENT)).unwrap();
  heap.allocate(10).unwrap();
  heap.allocate(huge).unwrap();
  assert_eq!(heap.extent(), 2 * INCREMENT);
}

#[test]
fn independent_heaps_do_not_interfere() {
  let mut left = heap(FitStrategy::BestFit, None);
  let mut right = heap(FitStrategy::WorstFit, None);

  let l = left.allocate(100).unwrap();
  let r = right.allocate(100).unwrap();
  left.payload_mut(l).fill(1);
  right.payload_mut(r).fill(2);

  assert_eq!(l.offset(), r.offset());
  assert!(left.payload(l).iter().all(|&b| b == 1));
  assert!(right.payload(r).iter().all(|&b| b == 2));
}
