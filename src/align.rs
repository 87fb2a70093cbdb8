/// Rounds the given size up to the machine word.
///
/// Every block size handed to the heap goes through this macro, so block
/// headers and payloads always start on a word boundary.
///
/// # Examples
///
/// ```rust
/// use fitalloc::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::core::mem::size_of::<usize>() - 1) & !(::core::mem::size_of::<usize>() - 1)
  };
}

/// Largest request that can still be rounded by [`align!`] and framed by a
/// header without overflowing.
pub const MAX_REQUEST: usize = usize::MAX - 4 * core::mem::size_of::<usize>();
