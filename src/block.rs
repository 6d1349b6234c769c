//! Inline block header stored at the start of every block.
//!
//! ```text
//!   offset + 0          offset + 4          offset + 8
//!   ┌───────────────────┬───────────────────┐
//!   │ size_flags (u32)  │ prev_offset (u32) │
//!   └───────────────────┴───────────────────┘
//!     bit 31: occupied    distance back to the previous
//!     bits 0..31: size    block start, 0 for the first block
//! ```

/// Set in `size_flags` while the block's payload is handed out.
pub const OCCUPIED_BIT: u32 = 0x8000_0000;

/// Low 31 bits of `size_flags`: the payload size in bytes.
pub const SIZE_MASK: u32 = 0x7fff_ffff;

/// Raw header size before alignment.
pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Block {
  pub size_flags: u32,
  pub prev_offset: u32,
}

impl Block {
  pub fn new(
    size: u32,
    occupied: bool,
    prev_offset: u32,
  ) -> Self {
    let mut block = Self { size_flags: 0, prev_offset };
    block.set_size(size);
    block.set_occupied(occupied);
    block
  }

  pub fn size(&self) -> u32 {
    self.size_flags & SIZE_MASK
  }

  pub fn set_size(
    &mut self,
    size: u32,
  ) {
    self.size_flags = (self.size_flags & OCCUPIED_BIT) | (size & SIZE_MASK);
  }

  pub fn is_occupied(&self) -> bool {
    self.size_flags & OCCUPIED_BIT != 0
  }

  pub fn is_free(&self) -> bool {
    !self.is_occupied()
  }

  pub fn set_occupied(
    &mut self,
    occupied: bool,
  ) {
    if occupied {
      self.size_flags |= OCCUPIED_BIT;
    } else {
      self.size_flags &= SIZE_MASK;
    }
  }

  /// Reads the header stored at `offset`, or `None` if it would not fit in `buf`.
  pub fn read(
    buf: &[u8],
    offset: usize,
  ) -> Option<Self> {
    let bytes = buf.get(offset..offset.checked_add(HEADER_SIZE)?)?;
    let (size_flags, prev_offset) = bytes.split_at(4);

    Some(Self {
      size_flags: u32::from_ne_bytes(size_flags.try_into().ok()?),
      prev_offset: u32::from_ne_bytes(prev_offset.try_into().ok()?),
    })
  }

  /// Writes the header at `offset`. Returns `false` and leaves `buf`
  /// untouched if the header would not fit.
  pub fn write(
    &self,
    buf: &mut [u8],
    offset: usize,
  ) -> bool {
    let Some(end) = offset.checked_add(HEADER_SIZE) else {
      return false;
    };
    let Some(bytes) = buf.get_mut(offset..end) else {
      return false;
    };

    bytes[..4].copy_from_slice(&self.size_flags.to_ne_bytes());
    bytes[4..].copy_from_slice(&self.prev_offset.to_ne_bytes());
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_flags_and_size_are_independent() {
    let mut block = Block::new(48, false, 0);
    assert_eq!(block.size(), 48);
    assert!(block.is_free());

    block.set_occupied(true);
    assert_eq!(block.size(), 48);
    assert!(block.is_occupied());
    assert_eq!(block.size_flags, OCCUPIED_BIT | 48);

    block.set_size(16);
    assert!(block.is_occupied());
    assert_eq!(block.size(), 16);

    block.set_occupied(false);
    assert_eq!(block.size_flags, 16);
  }

  #[test]
  fn test_size_is_truncated_to_31_bits() {
    let block = Block::new(u32::MAX, false, 0);
    assert_eq!(block.size(), SIZE_MASK);
    assert!(block.is_free());
  }

  #[test]
  fn test_read_write() {
    let mut buf = [0u8; 32];
    let block = Block::new(24, true, 16);

    assert!(block.write(&mut buf, 8));
    assert_eq!(Block::read(&buf, 8), Some(block));
    assert_eq!(Block::read(&buf, 0), Some(Block::default()));
  }

  #[test]
  fn test_out_of_bounds_access() {
    let mut buf = [0xAAu8; 12];
    let block = Block::new(4, true, 0);

    assert!(!block.write(&mut buf, 5));
    assert!(!block.write(&mut buf, usize::MAX - 2));
    assert_eq!(buf, [0xAAu8; 12]);

    assert!(Block::read(&buf, 5).is_none());
    assert!(Block::read(&buf, 12).is_none());
    assert!(Block::read(&buf, usize::MAX).is_none());
    assert!(Block::read(&buf, 4).is_some());
  }
}
