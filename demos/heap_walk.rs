//! Walks a heap on the real program break, one step at a time.
//!
//! ```text
//! cargo run --example heap_walk -- [first|best|worst] [ceiling-bytes]
//! RUST_LOG=trace cargo run --example heap_walk -- best 65536
//! ```

use std::{env, io::Read, process};

use fitalloc::{FitStrategy, Heap, HeapStats, Payload, ProgramBreak};
use libc::sbrk;

/// Holds the walk between steps so the process can be inspected from outside.
fn pause() {
  println!("\n-- step done, ENTER for the next one --");
  let _ = std::io::stdin().bytes().next();
}

fn print_program_break(label: &str) {
  println!(
    "{:<20} pid {} break at {:?}",
    label,
    process::id(),
    unsafe { sbrk(0) },
  );
}

fn print_alloc(
  heap: &Heap<ProgramBreak>,
  requested: usize,
  payload: Payload,
) {
  println!(
    "Allocated {} bytes ({} usable), address = {:?}",
    requested,
    heap.payload(payload).len(),
    heap.as_ptr(payload),
  );
}

fn print_stats(stats: HeapStats) {
  println!("Free list: {}", stats);
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

  let mut args = env::args().skip(1);
  let strategy = match args.next().map(|arg| arg.parse::<FitStrategy>()) {
    Some(Ok(strategy)) => strategy,
    Some(Err(err)) => {
      eprintln!("{}", err);
      process::exit(2);
    }
    None => FitStrategy::FirstFit,
  };
  let ceiling = match args.next().map(|arg| arg.parse::<usize>()) {
    Some(Ok(ceiling)) => Some(ceiling),
    Some(Err(err)) => {
      eprintln!("invalid ceiling: {}", err);
      process::exit(2);
    }
    None => None,
  };

  // SAFETY: the demo is single-threaded and only this heap moves the break.
  let mut heap = unsafe { Heap::program_break() };
  if let Err(err) = heap.configure(strategy, ceiling) {
    eprintln!("{}", err);
    process::exit(1);
  }

  println!("Strategy: {}, ceiling: {:?}", heap.strategy(), heap.ceiling());
  print_program_break("start");
  pause();

  // --------------------------------------------------------------------
  // 1) First allocation. The region is created and takes one increment.
  // --------------------------------------------------------------------
  let first = match heap.allocate(10) {
    Ok(payload) => payload,
    Err(err) => {
      eprintln!("{}", err);
      process::exit(1);
    }
  };
  println!("\n[1] Allocate 10 bytes");
  print_alloc(&heap, 10, first);
  heap.payload_mut(first).fill(0xAB);
  print_program_break("after first alloc");
  print_stats(heap.stats());
  pause();

  // --------------------------------------------------------------------
  // 2) A few differently sized blocks, then free every other one to
  //    leave holes of different sizes in the free list.
  // --------------------------------------------------------------------
  let sizes = [64, 512, 128, 256, 32];
  let mut blocks = Vec::new();
  for size in sizes {
    match heap.allocate(size) {
      Ok(payload) => {
        print_alloc(&heap, size, payload);
        blocks.push(payload);
      }
      Err(err) => println!("allocation of {} bytes failed: {}", size, err),
    }
  }
  for payload in blocks.iter().step_by(2) {
    heap.release(*payload);
  }
  println!("\n[2] Released every other block");
  print_stats(heap.stats());
  pause();

  // --------------------------------------------------------------------
  // 3) Which hole does the strategy pick for 40 bytes?
  // --------------------------------------------------------------------
  match heap.allocate(40) {
    Ok(payload) => {
      println!("\n[3] Allocate 40 bytes with {}", heap.strategy());
      print_alloc(&heap, 40, payload);
    }
    Err(err) => println!("\n[3] allocation failed: {}", err),
  }
  print_stats(heap.stats());
  pause();

  // --------------------------------------------------------------------
  // 4) Something larger than an increment forces the region to grow,
  //    or fails once the ceiling is reached.
  // --------------------------------------------------------------------
  print_program_break("before large alloc");
  match heap.allocate(64 * 1024) {
    Ok(payload) => {
      println!("\n[4] Allocate 64 KiB");
      print_alloc(&heap, 64 * 1024, payload);
    }
    Err(err) => println!("\n[4] 64 KiB allocation failed: {}", err),
  }
  print_program_break("after large alloc");
  print_stats(heap.stats());

  if let Err(err) = heap.check() {
    println!("heap check failed: {}", err);
  }

  println!("\n[5] End of example. Process will exit and the OS will reclaim all memory.");
}
