use crate::{
  block::{BLOCK_ALIGN, HEADER_SIZE},
  error::{Error, Result},
};

/// Bytes requested from the break whenever the chain has no room left.
pub const DEFAULT_SIZE: usize = 4096;

/// Smallest payload a split remainder must be able to hold.
pub const MIN_BLOCK_SIZE: usize = 2;

/// Growth and splitting parameters of an [`Arena`](crate::Arena).
///
/// ```rust
/// use brkalloc::Config;
///
/// let config = Config::default().with_default_size(16 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  /// Header-inclusive size of a regular growth step.
  pub default_size: usize,
  /// Minimum payload left in a remainder for a split to happen.
  pub min_block_size: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      default_size: DEFAULT_SIZE,
      min_block_size: MIN_BLOCK_SIZE,
    }
  }
}

impl Config {
  pub fn with_default_size(
    mut self,
    default_size: usize,
  ) -> Self {
    self.default_size = default_size;
    self
  }

  pub fn with_min_block_size(
    mut self,
    min_block_size: usize,
  ) -> Self {
    self.min_block_size = min_block_size;
    self
  }

  /// Largest payload a regular growth step can serve. Anything bigger gets a
  /// block of its own, sized to the request.
  pub fn max_regular_request(&self) -> usize {
    self.default_size - HEADER_SIZE
  }

  /// Checks that a growth step keeps headers aligned and can hold two
  /// headers plus a minimum block.
  pub fn validate(&self) -> Result<()> {
    if self.default_size % BLOCK_ALIGN != 0 {
      return Err(Error::InvalidConfig {
        reason: "default size must be a multiple of the header alignment",
      });
    }

    let smallest = self
      .min_block_size
      .checked_add(2 * HEADER_SIZE)
      .ok_or(Error::InvalidConfig {
        reason: "minimum block size overflows",
      })?;

    if self.default_size < smallest {
      return Err(Error::InvalidConfig {
        reason: "default size cannot hold two headers and a minimum block",
      });
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_config_is_valid() {
    let config = Config::default();

    assert_eq!(config.default_size, 4096);
    assert_eq!(config.min_block_size, 2);
    assert_eq!(config.validate(), Ok(()));
  }

  #[test]
  fn rejects_unaligned_default_size() {
    let config = Config::default().with_default_size(4097);

    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
  }

  #[test]
  fn rejects_default_size_without_room_for_payload() {
    let config = Config::default().with_default_size(HEADER_SIZE);

    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
  }

  #[test]
  fn default_size_must_hold_two_headers_and_a_minimum_block() {
    let config = Config::default().with_min_block_size(BLOCK_ALIGN);
    let smallest = 2 * HEADER_SIZE + BLOCK_ALIGN;

    assert_eq!(config.with_default_size(smallest).validate(), Ok(()));
    assert!(matches!(
      config.with_default_size(smallest - BLOCK_ALIGN).validate(),
      Err(Error::InvalidConfig { .. })
    ));
    assert!(matches!(
      Config::default().with_default_size(HEADER_SIZE + BLOCK_ALIGN).validate(),
      Err(Error::InvalidConfig { .. })
    ));
  }

  #[test]
  fn rejects_oversized_minimum() {
    let config = Config::default().with_min_block_size(DEFAULT_SIZE + 1);
    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

    let config = Config::default().with_min_block_size(usize::MAX);
    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
  }
}
