use std::{fmt, str::FromStr};

use crate::free_list::{FreeBlock, FreeList};

/// How a free block is chosen for a request.
///
/// A block qualifies when its payload capacity (`size - HEADER_SIZE`) is at
/// least the requested size. Ties go to the entry met first in list order,
/// which is most-recently-freed first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FitStrategy {
  /// First qualifying block.
  #[default]
  FirstFit,
  /// Smallest qualifying block.
  BestFit,
  /// Largest qualifying block.
  WorstFit,
}

impl FitStrategy {
  /// Picks a block for `request` payload bytes without touching the list.
  pub fn select(
    self,
    list: &FreeList,
    bytes: &[u8],
    request: usize,
  ) -> Option<FreeBlock> {
    let mut candidates = list.iter(bytes).filter(|block| block.capacity() >= request);

    match self {
      FitStrategy::FirstFit => candidates.next(),
      FitStrategy::BestFit => candidates.reduce(|best, block| if block.size < best.size { block } else { best }),
      FitStrategy::WorstFit => candidates.reduce(|worst, block| if block.size > worst.size { block } else { worst }),
    }
  }
}

impl fmt::Display for FitStrategy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let name = match self {
      FitStrategy::FirstFit => "first-fit",
      FitStrategy::BestFit => "best-fit",
      FitStrategy::WorstFit => "worst-fit",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fit strategy `{0}` (expected first-fit, best-fit or worst-fit)")]
pub struct ParseStrategyError(String);

impl FromStr for FitStrategy {
  type Err = ParseStrategyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "first" | "first-fit" | "first_fit" => Ok(FitStrategy::FirstFit),
      "best" | "best-fit" | "best_fit" => Ok(FitStrategy::BestFit),
      "worst" | "worst-fit" | "worst_fit" => Ok(FitStrategy::WorstFit),
      _ => Err(ParseStrategyError(s.to_string())),
    }
  }
}
