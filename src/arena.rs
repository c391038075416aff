use std::{ptr, ptr::NonNull, slice};

use log::{debug, trace, warn};

use crate::{
  align,
  align::align_up,
  block::{Block, HEADER_SIZE},
  brk::{Break, Reserve},
  chain::{self, Blocks},
  config::Config,
  error::{Error, Result},
  handle::{Allocation, ArenaId},
};

/// A growable region carved into a chain of blocks.
///
/// ```text
///   start                                                            end
///   ┌──────┬─────────┬──────┬───────────────┬──────┬─────────────────┐
///   │ hdr  │  used   │ hdr  │     free      │ hdr  │      used       │
///   └──────┴─────────┴──────┴───────────────┴──────┴─────────────────┘
///      │               ▲ │                     ▲
///      └─── next ──────┘ └────── next ─────────┘
/// ```
///
/// The chain always covers `[start, end)` exactly. `end` only moves up, and
/// only through the arena's [`Break`].
pub struct Arena<B: Break> {
  id: ArenaId,
  brk: B,
  config: Config,
  start: *mut u8,
  end: *mut u8,
}

// The arena owns every byte its pointers refer to.
unsafe impl<B: Break + Send> Send for Arena<B> {}

impl<B: Break> Arena<B> {
  pub fn new(brk: B) -> Self {
    Self {
      id: ArenaId::next(),
      brk,
      config: Config::default(),
      start: ptr::null_mut(),
      end: ptr::null_mut(),
    }
  }

  pub fn with_config(
    brk: B,
    config: Config,
  ) -> Result<Self> {
    config.validate()?;

    let mut arena = Self::new(brk);
    arena.config = config;
    Ok(arena)
  }

  pub fn id(&self) -> ArenaId {
    self.id
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Address of the first header, null before the first growth.
  pub fn start(&self) -> *mut u8 {
    self.start
  }

  /// One past the last byte granted to the arena.
  pub fn end(&self) -> *mut u8 {
    self.end
  }

  /// Total bytes granted so far, headers included.
  pub fn len(&self) -> usize {
    self.end as usize - self.start as usize
  }

  pub fn is_initialized(&self) -> bool {
    self.start != self.end
  }

  pub fn blocks(&self) -> Blocks<'_> {
    unsafe { Blocks::new(self.start) }
  }

  /// Checks that the chain still tiles the arena. See [`Error::Corrupted`].
  pub fn check_integrity(&self) -> Result<()> {
    unsafe { chain::verify(self.start, self.end) }
  }

  /// Last block of the chain, or null before the first growth.
  fn find_last(&self) -> *mut Block {
    if !self.is_initialized() {
      return ptr::null_mut();
    }

    unsafe {
      let mut block = self.start as *mut Block;
      while !(*block).next.is_null() {
        block = (*block).next;
      }
      block
    }
  }

  /// First free block, in address order, that can hold `size` bytes.
  fn find_block(
    &self,
    size: usize,
  ) -> *mut Block {
    if !self.is_initialized() {
      return ptr::null_mut();
    }

    unsafe {
      let mut block = self.start as *mut Block;
      while !block.is_null() && (!(*block).is_free || (*block).size < size) {
        block = (*block).next;
      }
      trace!("find_block({size}) -> {block:?}");
      block
    }
  }

  /// Grows the arena by `size` bytes (header included) and appends one free
  /// block describing them.
  ///
  /// `size` must be a multiple of the header alignment and larger than a
  /// header.
  fn more_mem(
    &mut self,
    size: usize,
  ) -> Result<*mut Block> {
    if !self.is_initialized() {
      let current = self.brk.current() as usize;
      let padding = align!(current) - current;
      let previous = self.brk.extend(padding + size)?.as_ptr();

      // The break is read and moved in two steps. The padding was computed
      // from `current`, so any other previous break leaves `end` off the
      // real break.
      if previous as usize != current {
        warn!("break moved from {current:#x} to {previous:?} during arena setup");
        return Err(Error::Discontiguous {
          expected: current,
          found: previous as usize,
        });
      }

      unsafe {
        let start = previous.add(padding);
        self.start = start;
        self.end = start.add(size);

        debug!("arena initialized at {:?}, {size} bytes", self.start);
        return Ok(Block::write(start, size - HEADER_SIZE));
      }
    }

    let last = self.find_last();
    let previous = self.brk.extend(size)?.as_ptr();

    if previous != self.end {
      warn!("break moved behind the arena: expected {:?}, found {previous:?}", self.end);
      return Err(Error::Discontiguous {
        expected: self.end as usize,
        found: previous as usize,
      });
    }

    unsafe {
      let block = Block::write(previous, size - HEADER_SIZE);
      (*last).next = block;
      self.end = previous.add(size);

      debug!("arena grown by {size} bytes, end = {:?}", self.end);
      Ok(block)
    }
  }

  /// Hands out at least `size` bytes, growing the arena if no free block is
  /// large enough. The payload is not zeroed.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Allocation> {
    let ptr = self.allocate_raw(size)?;
    Ok(Allocation::new(self.id, ptr))
  }

  /// Gives the payload back to the arena and merges it with free neighbours.
  pub fn release(
    &mut self,
    allocation: Allocation,
  ) -> Result<()> {
    self.claim(&allocation)?;
    unsafe { self.release_raw(allocation.into_raw()) };
    Ok(())
  }

  /// Makes `allocation` hold at least `new_size` bytes.
  ///
  /// A block that is already large enough is kept as is, even when the
  /// request shrinks. Otherwise the contents move to a new block and the
  /// handle is updated. On error the handle still refers to the old payload.
  pub fn resize(
    &mut self,
    allocation: &mut Allocation,
    new_size: usize,
  ) -> Result<()> {
    self.claim(allocation)?;

    let ptr = unsafe { self.resize_raw(allocation.non_null(), new_size)? };
    allocation.set_ptr(ptr);
    Ok(())
  }

  /// Whole payload of `allocation`, which may be larger than requested.
  pub fn bytes(
    &self,
    allocation: &Allocation,
  ) -> Result<&[u8]> {
    self.claim(allocation)?;

    unsafe {
      let block = Block::from_payload(allocation.non_null());
      Ok(slice::from_raw_parts(allocation.as_ptr(), (*block).size))
    }
  }

  pub fn bytes_mut(
    &mut self,
    allocation: &Allocation,
  ) -> Result<&mut [u8]> {
    self.claim(allocation)?;

    unsafe {
      let block = Block::from_payload(allocation.non_null());
      Ok(slice::from_raw_parts_mut(allocation.as_ptr(), (*block).size))
    }
  }

  fn claim(
    &self,
    allocation: &Allocation,
  ) -> Result<()> {
    if allocation.arena() != self.id {
      return Err(Error::ForeignHandle);
    }
    Ok(())
  }

  /// Pointer flavour of [`Arena::allocate`].
  pub fn allocate_raw(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let requested = size;
    let size = align_up(size).ok_or(Error::SizeOverflow { requested })?;

    unsafe {
      if !self.is_initialized() {
        self.more_mem(self.config.default_size)?;
      }

      let mut block = self.find_block(size);

      if block.is_null() {
        if size > self.config.max_regular_request() {
          let total = size
            .checked_add(HEADER_SIZE)
            .ok_or(Error::SizeOverflow { requested })?;

          block = self.more_mem(total)?;
          (*block).is_free = false;
          return Ok(Block::payload(block));
        }

        block = self.more_mem(self.config.default_size)?;
      }

      if (*block).size > size + 2 * HEADER_SIZE + self.config.min_block_size {
        let remainder = Block::split(block, size + HEADER_SIZE);
        trace!("split {block:?}, remainder {remainder:?} holds {} bytes", (*remainder).size);
      }

      (*block).is_free = false;
      Ok(Block::payload(block))
    }
  }

  /// Pointer flavour of [`Arena::release`].
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by this arena's `allocate_raw` or
  /// `resize_raw` and not been released since.
  pub unsafe fn release_raw(
    &mut self,
    payload: NonNull<u8>,
  ) {
    unsafe {
      let mut block = Block::from_payload(payload);
      (*block).is_free = true;

      let head = self.start as *mut Block;
      if block != head {
        let mut previous = head;
        while !(*previous).next.is_null() && (*previous).next != block {
          previous = (*previous).next;
        }

        if (*previous).next == block && (*previous).is_free {
          Block::absorb_next(previous);
          debug!("merged {block:?} into previous {previous:?}");
          block = previous;
        }
      }

      let next = (*block).next;
      if !next.is_null() && (*next).is_free {
        Block::absorb_next(block);
        debug!("merged next {next:?} into {block:?}");
      }
    }
  }

  /// Pointer flavour of [`Arena::resize`].
  ///
  /// # Safety
  ///
  /// Same contract as [`Arena::release_raw`]. On success the old payload must
  /// no longer be used unless the same pointer came back.
  pub unsafe fn resize_raw(
    &mut self,
    payload: NonNull<u8>,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    unsafe {
      let block = Block::from_payload(payload);
      let old_size = (*block).size;

      if old_size >= new_size {
        return Ok(payload);
      }

      let moved = self.allocate_raw(new_size)?;
      ptr::copy_nonoverlapping(payload.as_ptr(), moved.as_ptr(), old_size);
      self.release_raw(payload);

      trace!("resized {payload:?} ({old_size} bytes) to {moved:?} ({new_size} bytes)");
      Ok(moved)
    }
  }
}

impl Arena<Reserve> {
  /// An arena over a private buffer of `capacity` bytes.
  pub fn reserved(capacity: usize) -> Result<Self> {
    Ok(Self::new(Reserve::new(capacity)?))
  }
}
