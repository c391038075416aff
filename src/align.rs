use crate::block::BLOCK_ALIGN;

/// Rounds a byte count up to the block header alignment.
///
/// Every header in the chain has to sit on this boundary, so every payload
/// size handed to the chain is rounded with it first.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use brkalloc::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::BLOCK_ALIGN - 1) & !($crate::BLOCK_ALIGN - 1)
  };
}

/// Overflow-checked version of [`align!`], used on caller supplied sizes.
pub fn align_up(value: usize) -> Option<usize> {
  value
    .checked_add(BLOCK_ALIGN - 1)
    .map(|v| v & !(BLOCK_ALIGN - 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rounds_up_to_the_next_boundary() {
    let cases = [
      (0, 0),
      (1, BLOCK_ALIGN),
      (BLOCK_ALIGN - 1, BLOCK_ALIGN),
      (BLOCK_ALIGN, BLOCK_ALIGN),
      (BLOCK_ALIGN + 1, 2 * BLOCK_ALIGN),
      (5000, 5000),
      (5001, 5000 + BLOCK_ALIGN),
    ];

    for (size, expected) in cases {
      assert_eq!(align!(size), expected, "align!({size})");
      assert_eq!(align_up(size), Some(expected), "align_up({size})");
    }
  }

  #[test]
  fn align_up_reports_overflow_at_the_top() {
    let largest = usize::MAX & !(BLOCK_ALIGN - 1);

    assert_eq!(align_up(largest), Some(largest));
    assert_eq!(align_up(largest + 1), None);
    assert_eq!(align_up(usize::MAX), None);
  }
}
