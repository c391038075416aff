use std::{
  ptr::NonNull,
  sync::atomic::{AtomicUsize, Ordering},
};

/// Identity of one [`Arena`](crate::Arena), used to tie handles to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(usize);

impl ArenaId {
  pub(crate) fn next() -> Self {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    Self(NEXT.fetch_add(1, Ordering::Relaxed))
  }
}

/// A live payload handed out by [`Arena::allocate`](crate::Arena::allocate).
///
/// The handle is neither `Copy` nor `Clone`: releasing it consumes it, so the
/// same payload cannot be released twice through the safe API.
#[derive(Debug)]
pub struct Allocation {
  arena: ArenaId,
  ptr: NonNull<u8>,
}

impl Allocation {
  pub(crate) fn new(
    arena: ArenaId,
    ptr: NonNull<u8>,
  ) -> Self {
    Self { arena, ptr }
  }

  /// Rebuilds a handle from a pointer obtained with [`Allocation::into_raw`].
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by the arena identified by `arena`, must
  /// still be allocated and must not be owned by another handle.
  pub unsafe fn from_raw(
    arena: ArenaId,
    ptr: NonNull<u8>,
  ) -> Self {
    Self::new(arena, ptr)
  }

  /// Gives up the handle, leaving the payload allocated.
  pub fn into_raw(self) -> NonNull<u8> {
    self.ptr
  }

  pub fn as_ptr(&self) -> *mut u8 {
    self.ptr.as_ptr()
  }

  pub(crate) fn non_null(&self) -> NonNull<u8> {
    self.ptr
  }

  pub fn arena(&self) -> ArenaId {
    self.arena
  }

  pub(crate) fn set_ptr(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    self.ptr = ptr;
  }
}
