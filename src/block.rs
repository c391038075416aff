use std::{mem, ptr::NonNull};

/// Bytes taken by the header in front of every payload.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

/// Alignment of every header, and therefore of every payload.
pub const BLOCK_ALIGN: usize = mem::align_of::<Block>();

/// Header of one run of arena bytes.
///
/// ```text
///   address          address + HEADER_SIZE        address + HEADER_SIZE + size
///   ┌────────────────┬───────────────────────────┬──────────────────
///   │ size│free│next │          payload          │ next header ...
///   └────────────────┴───────────────────────────┴──────────────────
/// ```
///
/// Headers are linked in address order and the links always agree with the
/// layout: `next` is either null or exactly `address + HEADER_SIZE + size`.
#[repr(C)]
pub(crate) struct Block {
  pub size: usize,
  pub is_free: bool,
  pub next: *mut Block,
}

impl Block {
  /// Writes a free, unlinked header at `addr`.
  ///
  /// # Safety
  ///
  /// `addr` must be aligned to [`BLOCK_ALIGN`] and valid for writes of
  /// `HEADER_SIZE + size` bytes.
  pub unsafe fn write(
    addr: *mut u8,
    size: usize,
  ) -> *mut Block {
    let block = addr as *mut Block;
    unsafe {
      block.write(Block {
        size,
        is_free: true,
        next: std::ptr::null_mut(),
      });
    }
    block
  }

  /// Payload address of `block`.
  pub fn payload(block: *mut Block) -> NonNull<u8> {
    // A header is never written at address zero, so neither is its payload.
    let payload = (block as *mut u8).wrapping_add(HEADER_SIZE);
    unsafe { NonNull::new_unchecked(payload) }
  }

  /// Header owning `payload`.
  ///
  /// # Safety
  ///
  /// `payload` must come from [`Block::payload`].
  pub unsafe fn from_payload(payload: NonNull<u8>) -> *mut Block {
    unsafe { payload.as_ptr().sub(HEADER_SIZE) as *mut Block }
  }

  /// Cuts `block` so that it spans exactly `total` bytes (header included)
  /// and writes a free header for the rest right behind it.
  ///
  /// Returns the remainder.
  ///
  /// # Safety
  ///
  /// `block` must be a live header with `size >= total` and `total` must be
  /// a multiple of [`BLOCK_ALIGN`] no smaller than `HEADER_SIZE`. The caller
  /// is responsible for the remainder being large enough to be useful.
  pub unsafe fn split(
    block: *mut Block,
    total: usize,
  ) -> *mut Block {
    unsafe {
      let old_next = (*block).next;
      let old_size = (*block).size;

      (*block).size = total - HEADER_SIZE;

      let remainder = Block::write((block as *mut u8).add(total), old_size - total);
      (*remainder).next = old_next;
      (*block).next = remainder;

      remainder
    }
  }

  /// Merges the header following `block` into `block`'s payload.
  ///
  /// # Safety
  ///
  /// `block` must be a live header with a non-null `next`.
  pub unsafe fn absorb_next(block: *mut Block) {
    unsafe {
      let next = (*block).next;
      (*block).size += (*next).size + HEADER_SIZE;
      (*block).next = (*next).next;
    }
  }

  /// Address right behind `block`'s payload.
  ///
  /// # Safety
  ///
  /// `block` must be a live header.
  pub unsafe fn end(block: *mut Block) -> *mut u8 {
    unsafe { (block as *mut u8).wrapping_add(HEADER_SIZE + (*block).size) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // Word buffer so headers land on their natural alignment.
  fn buffer(words: usize) -> Vec<u64> {
    vec![0u64; words]
  }

  #[test]
  fn header_is_word_aligned() {
    assert_eq!(HEADER_SIZE % BLOCK_ALIGN, 0);
    assert!(BLOCK_ALIGN >= mem::align_of::<usize>());
  }

  #[test]
  fn payload_round_trips_to_header() {
    let mut buf = buffer(16);

    unsafe {
      let block = Block::write(buf.as_mut_ptr() as *mut u8, 64);
      let payload = Block::payload(block);

      assert_eq!(payload.as_ptr() as usize - block as usize, HEADER_SIZE);
      assert_eq!(Block::from_payload(payload), block);
      assert!((*block).is_free);
      assert!((*block).next.is_null());
    }
  }

  #[test]
  fn split_keeps_layout_contiguous() {
    let mut buf = buffer(64);
    let total = buf.len() * mem::size_of::<u64>();

    unsafe {
      let block = Block::write(buf.as_mut_ptr() as *mut u8, total - HEADER_SIZE);
      (*block).is_free = false;

      let front = HEADER_SIZE + 8 * BLOCK_ALIGN;
      let remainder = Block::split(block, front);

      assert_eq!((*block).size, 8 * BLOCK_ALIGN);
      assert_eq!((*block).next, remainder);
      assert_eq!(Block::end(block), remainder as *mut u8);
      assert!((*remainder).is_free);
      assert!((*remainder).next.is_null());
      assert_eq!(Block::end(remainder) as usize - block as usize, total);
    }
  }

  #[test]
  fn absorb_next_reclaims_header() {
    let mut buf = buffer(64);
    let total = buf.len() * mem::size_of::<u64>();

    unsafe {
      let block = Block::write(buf.as_mut_ptr() as *mut u8, total - HEADER_SIZE);
      let before = (*block).size;

      Block::split(block, HEADER_SIZE + 4 * BLOCK_ALIGN);
      Block::absorb_next(block);

      assert_eq!((*block).size, before);
      assert!((*block).next.is_null());
    }
  }
}
