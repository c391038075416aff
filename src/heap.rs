//! The process heap: one [`Arena`] over the real program break, shared by
//! the whole process behind a lock.
//!
//! These functions follow the C conventions (null on failure, null release is
//! a no-op) so they can sit underneath a runtime's allocation API.
//!
//! The system allocator may move the same break. When that happens between
//! two growths, the next growth fails with
//! [`Error::Discontiguous`](crate::Error::Discontiguous) and [`malloc`]
//! returns null.

use std::ptr::{self, NonNull};

use log::error;
use spin::Mutex;

use crate::{arena::Arena, brk::Sbrk};

static HEAP: Mutex<Option<Arena<Sbrk>>> = Mutex::new(None);

/// Runs `f` with exclusive access to the process heap, creating it on first
/// use.
pub fn with_heap<R>(f: impl FnOnce(&mut Arena<Sbrk>) -> R) -> R {
  let mut heap = HEAP.lock();
  let arena = heap.get_or_insert_with(|| Arena::new(Sbrk));
  f(arena)
}

/// Allocates `size` bytes from the process heap, or returns null.
pub fn malloc(size: usize) -> *mut u8 {
  with_heap(|arena| match arena.allocate_raw(size) {
    Ok(ptr) => ptr.as_ptr(),
    Err(err) => {
      error!("malloc({size}) failed: {err}");
      ptr::null_mut()
    }
  })
}

/// Returns `ptr` to the process heap. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or come from [`malloc`]/[`realloc`] and not have been
/// freed since.
pub unsafe fn free(ptr: *mut u8) {
  let Some(ptr) = NonNull::new(ptr) else {
    return;
  };

  with_heap(|arena| unsafe { arena.release_raw(ptr) });
}

/// Grows the allocation behind `ptr` to at least `size` bytes, moving it if
/// needed. A null `ptr` behaves like [`malloc`]. On failure null is returned
/// and `ptr` stays valid.
///
/// # Safety
///
/// Same contract as [`free`].
pub unsafe fn realloc(
  ptr: *mut u8,
  size: usize,
) -> *mut u8 {
  let Some(ptr) = NonNull::new(ptr) else {
    return malloc(size);
  };

  with_heap(|arena| match unsafe { arena.resize_raw(ptr, size) } {
    Ok(ptr) => ptr.as_ptr(),
    Err(err) => {
      error!("realloc({ptr:?}, {size}) failed: {err}");
      ptr::null_mut()
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  // The real break is shared with the rest of the process, so everything
  // runs in one test and stays within the first growth.
  #[test]
  fn process_heap_round_trip() {
    let a = malloc(10 * 4) as *mut i32;
    assert!(!a.is_null());

    unsafe {
      for i in 0..10 {
        a.add(i).write(2 * i as i32);
      }

      let b = realloc(a as *mut u8, 200) as *mut i32;
      assert!(!b.is_null());
      assert_ne!(b, a);

      for i in 0..10 {
        assert_eq!(b.add(i).read(), 2 * i as i32);
      }

      let same = realloc(b as *mut u8, 16);
      assert_eq!(same, b as *mut u8);

      free(b as *mut u8);
      free(ptr::null_mut());

      let c = realloc(ptr::null_mut(), 8);
      assert!(!c.is_null());
      free(c);
    }

    with_heap(|arena| {
      assert!(arena.is_initialized());
      assert_eq!(arena.check_integrity(), Ok(()));
      assert!(arena.blocks().all(|block| block.is_free));
    });
  }
}
