//! Read-only walks over the block chain.

use std::marker::PhantomData;

use crate::{
  block::{BLOCK_ALIGN, Block, HEADER_SIZE},
  error::{Error, Result},
};

/// Snapshot of one block, as seen by [`Arena::blocks`](crate::Arena::blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Header offset from the arena start.
  pub offset: usize,
  /// Payload bytes, header excluded.
  pub size: usize,
  pub is_free: bool,
}

impl BlockInfo {
  /// Offset of the payload from the arena start.
  pub fn payload_offset(&self) -> usize {
    self.offset + HEADER_SIZE
  }

  /// Offset right behind the payload.
  pub fn end_offset(&self) -> usize {
    self.offset + HEADER_SIZE + self.size
  }
}

/// Iterator over the chain in address order.
pub struct Blocks<'a> {
  start: *mut u8,
  current: *mut Block,
  marker: PhantomData<&'a Block>,
}

impl<'a> Blocks<'a> {
  /// # Safety
  ///
  /// `start` must be null or the head of a well-formed chain that outlives
  /// `'a`.
  pub(crate) unsafe fn new(start: *mut u8) -> Self {
    Self {
      start,
      current: start as *mut Block,
      marker: PhantomData,
    }
  }
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<Self::Item> {
    if self.current.is_null() {
      return None;
    }

    unsafe {
      let block = self.current;
      self.current = (*block).next;

      Some(BlockInfo {
        offset: block as usize - self.start as usize,
        size: (*block).size,
        is_free: (*block).is_free,
      })
    }
  }
}

/// Walks the chain from `start` and checks that it tiles `[start, end)`:
/// every header sits where the previous payload ends, on an aligned address,
/// the last payload ends exactly at `end`, and no two neighbours are both
/// free.
///
/// # Safety
///
/// `start..end` must be readable memory granted to the arena.
pub(crate) unsafe fn verify(
  start: *mut u8,
  end: *mut u8,
) -> Result<()> {
  if start == end {
    return Ok(());
  }

  let base = start as usize;
  let limit = end as usize;
  let mut expected = base;
  let mut previous_free = false;
  let mut block = start as *mut Block;

  while !block.is_null() {
    let addr = block as usize;
    let offset = addr.wrapping_sub(base);

    if addr != expected {
      return Err(Error::Corrupted {
        offset,
        reason: "header does not follow the previous payload",
      });
    }

    if addr % BLOCK_ALIGN != 0 {
      return Err(Error::Corrupted {
        offset,
        reason: "misaligned header",
      });
    }

    if limit - addr < HEADER_SIZE {
      return Err(Error::Corrupted {
        offset,
        reason: "header runs past the arena end",
      });
    }

    let (size, is_free, next) = unsafe { ((*block).size, (*block).is_free, (*block).next) };

    if size > limit - addr - HEADER_SIZE {
      return Err(Error::Corrupted {
        offset,
        reason: "payload runs past the arena end",
      });
    }

    if previous_free && is_free {
      return Err(Error::Corrupted {
        offset,
        reason: "adjacent free blocks",
      });
    }

    expected = addr + HEADER_SIZE + size;
    previous_free = is_free;
    block = next;
  }

  if expected != limit {
    return Err(Error::Corrupted {
      offset: expected - base,
      reason: "chain ends before the arena end",
    });
  }

  Ok(())
}
