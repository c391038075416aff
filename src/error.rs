use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The break primitive refused to grow the arena.
  #[error("out of memory: could not extend the arena by {requested} bytes")]
  OutOfMemory { requested: usize },

  /// Something other than this arena moved the break between two growths.
  #[error("program break moved behind the arena's back: expected {expected:#x}, found {found:#x}")]
  Discontiguous { expected: usize, found: usize },

  /// The request cannot be represented once header and alignment are added.
  #[error("allocation of {requested} bytes overflows the address space")]
  SizeOverflow { requested: usize },

  /// The handle was produced by a different arena.
  #[error("allocation handle belongs to another arena")]
  ForeignHandle,

  #[error("invalid arena configuration: {reason}")]
  InvalidConfig { reason: &'static str },

  /// The block chain no longer describes the arena it lives in.
  #[error("block chain corrupted at offset {offset:#x}: {reason}")]
  Corrupted { offset: usize, reason: &'static str },
}
