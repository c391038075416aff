//! Sources of arena memory.
//!
//! An arena only ever asks for one thing: "move the break up by N bytes and
//! tell me where it was". [`Sbrk`] answers with the real program break,
//! [`Reserve`] with a cursor over a fixed buffer.

use std::{alloc, ptr::NonNull};

use crate::{
  block::BLOCK_ALIGN,
  error::{Error, Result},
};

/// A break that can only move up.
pub trait Break {
  /// Current break address.
  fn current(&self) -> *mut u8;

  /// Moves the break up by `increment` bytes and returns the previous break,
  /// which is where the newly granted bytes start.
  fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>>;
}

/// The process break, moved with `sbrk(2)`.
///
/// Anything else in the process that calls `sbrk`/`brk` (the system `malloc`
/// on some platforms) can move the break between two growths. The arena
/// notices and reports [`Error::Discontiguous`].
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

#[cfg(unix)]
impl Break for Sbrk {
  fn current(&self) -> *mut u8 {
    unsafe { libc::sbrk(0) as *mut u8 }
  }

  fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>> {
    // `intptr_t` on Linux, `c_int` on some other unixes.
    let Ok(delta) = increment.try_into() else {
      return Err(Error::OutOfMemory { requested: increment });
    };

    let previous = unsafe { libc::sbrk(delta) };

    if previous == usize::MAX as *mut libc::c_void {
      return Err(Error::OutOfMemory { requested: increment });
    }

    NonNull::new(previous as *mut u8).ok_or(Error::OutOfMemory { requested: increment })
  }
}

/// A fixed-capacity buffer taken from the system allocator, handed out
/// through its own break cursor.
///
/// ```text
///   base                 base + used                 base + capacity
///   ┌────────────────────┬───────────────────────────┐
///   │  granted to arena  │         reserved          │
///   └────────────────────┴───────────────────────────┘
///                        ▲
///                      break
/// ```
pub struct Reserve {
  base: NonNull<u8>,
  capacity: usize,
  used: usize,
}

// The buffer is exclusively owned.
unsafe impl Send for Reserve {}

impl Reserve {
  pub fn new(capacity: usize) -> Result<Self> {
    let layout = Self::layout(capacity)?;
    let base = NonNull::new(unsafe { alloc::alloc(layout) })
      .ok_or(Error::OutOfMemory { requested: capacity })?;

    Ok(Self {
      base,
      capacity,
      used: 0,
    })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Bytes not yet granted.
  pub fn remaining(&self) -> usize {
    self.capacity - self.used
  }

  fn layout(capacity: usize) -> Result<alloc::Layout> {
    alloc::Layout::from_size_align(capacity.max(1), BLOCK_ALIGN)
      .map_err(|_| Error::SizeOverflow { requested: capacity })
  }
}

impl Break for Reserve {
  fn current(&self) -> *mut u8 {
    self.base.as_ptr().wrapping_add(self.used)
  }

  fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>> {
    if increment > self.remaining() {
      return Err(Error::OutOfMemory { requested: increment });
    }

    let previous = unsafe { self.base.add(self.used) };
    self.used += increment;

    Ok(previous)
  }
}

impl Drop for Reserve {
  fn drop(&mut self) {
    if let Ok(layout) = Self::layout(self.capacity) {
      unsafe { alloc::dealloc(self.base.as_ptr(), layout) };
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reserve_hands_out_contiguous_ranges() {
    let mut reserve = Reserve::new(256).unwrap();
    let start = reserve.current();

    let first = reserve.extend(64).unwrap();
    let second = reserve.extend(32).unwrap();

    assert_eq!(first.as_ptr(), start);
    assert_eq!(second.as_ptr() as usize, start as usize + 64);
    assert_eq!(reserve.current() as usize, start as usize + 96);
    assert_eq!(reserve.remaining(), 160);
    assert_eq!(start as usize % BLOCK_ALIGN, 0);
  }

  #[test]
  fn reserve_refuses_to_overrun() {
    let mut reserve = Reserve::new(128).unwrap();
    reserve.extend(100).unwrap();

    assert_eq!(reserve.extend(29), Err(Error::OutOfMemory { requested: 29 }));
    assert_eq!(reserve.remaining(), 28);
    assert!(reserve.extend(28).is_ok());
  }

  #[cfg(unix)]
  #[test]
  fn sbrk_zero_reports_current_break() {
    let mut brk = Sbrk;
    let current = brk.current();
    let previous = brk.extend(0).unwrap();

    assert!(!current.is_null());
    assert!(previous.as_ptr() as usize >= current as usize);
  }
}
