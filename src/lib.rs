//! # brkalloc - A First-Fit Heap Allocator over the Program Break
//!
//! This crate provides a classic `malloc` / `free` / `realloc` style
//! allocator that manages a single growable arena obtained with `sbrk(2)`.
//!
//! ## Overview
//!
//! The arena is a run of bytes cut into blocks. Every block starts with a
//! header and the headers are chained in address order, so the chain alone
//! describes the whole arena:
//!
//! ```text
//!   Block Chain:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA                                   │
//!   │                                                                      │
//!   │   ┌───┬──────┬───┬──────────┬───┬────┬───┬─────────────────────────┐ │
//!   │   │ H │ used │ H │   free   │ H │used│ H │          free           │ │
//!   │   └───┴──────┴───┴──────────┴───┴────┴───┴─────────────────────────┘ │
//!   │   ▲                                                                ▲ │
//!   │   │                                                                │ │
//!   │ start                                                            end │
//!   │                                                        (program break)
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Allocate** walks the chain for the first free block that is large
//!   enough (first-fit). When none is, the arena grows by a default step, or
//!   by exactly the request when it would not fit a default step anyway.
//!   Blocks much larger than the request are split and the tail stays free.
//! - **Release** marks the block free and merges it with a free predecessor,
//!   then with a free successor, so no two neighbouring blocks are ever both
//!   free.
//! - **Resize** keeps a block that is already large enough and otherwise
//!   moves the contents to a new one.
//!
//! Memory is never handed back to the operating system.
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── align      - Alignment macro (align!) and checked rounding
//!   ├── arena      - Arena: locator, grower, allocate / release / resize
//!   ├── block      - Block header, split and merge (internal)
//!   ├── brk        - Break trait, Sbrk and Reserve
//!   ├── chain      - Chain iterator and integrity check
//!   ├── config     - Growth and split parameters
//!   ├── error      - Error type
//!   ├── handle     - Allocation handles
//!   └── heap       - Process-wide heap with C-style entry points
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brkalloc::Arena;
//!
//! let mut arena = Arena::reserved(64 * 1024).unwrap();
//!
//! let mut numbers = arena.allocate(10 * 4).unwrap();
//! arena.bytes_mut(&numbers).unwrap()[0] = 42;
//!
//! arena.resize(&mut numbers, 1000).unwrap();
//! assert_eq!(arena.bytes(&numbers).unwrap()[0], 42);
//!
//! arena.release(numbers).unwrap();
//! ```
//!
//! The process heap works on raw pointers instead:
//!
//! ```rust,ignore
//! let ptr = brkalloc::heap::malloc(64);
//! unsafe { brkalloc::heap::free(ptr) };
//! ```
//!
//! ## How It Works
//!
//! Each block carries its metadata in front of the payload:
//!
//! ```text
//!   Single Block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ is_free: false  │  │  │                          │  │
//!   │  │ next: null/ptr  │  │  │     N bytes usable       │  │
//!   │  └─────────────────┘  │  │                          │  │
//!   │  HEADER_SIZE bytes    │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! Splitting a free block of `S` bytes for a request of `R` bytes only
//! happens when `S > R + 2 * HEADER_SIZE + min_block_size`, so the free tail
//! can always hold a header and a usable payload:
//!
//! ```text
//!   before:  │ H │                      S                        │
//!   after:   │ H │      R      │ H │        S - R - H            │
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded arenas**: an [`Arena`] has no internal locking; the
//!   [`heap`] module wraps one in a spin lock.
//! - **Word alignment only**: payloads are aligned to [`BLOCK_ALIGN`].
//! - **No shrinking**: resizing to a smaller size keeps the block as is.
//! - **Raw pointers are trusted**: the `*_raw` entry points and the [`heap`]
//!   functions cannot detect foreign or double-freed pointers.

pub mod align;
mod arena;
mod block;
mod brk;
mod chain;
mod config;
mod error;
mod handle;
#[cfg(unix)]
pub mod heap;

pub use arena::Arena;
pub use block::{BLOCK_ALIGN, HEADER_SIZE};
#[cfg(unix)]
pub use brk::Sbrk;
pub use brk::{Break, Reserve};
pub use chain::{BlockInfo, Blocks};
pub use config::{Config, DEFAULT_SIZE, MIN_BLOCK_SIZE};
pub use error::{Error, Result};
pub use handle::{Allocation, ArenaId};
