use core::fmt;

use log::{debug, trace, warn};

use crate::{
  align::WORD_ALIGN,
  align_to,
  block::{Block, HEADER_SIZE, SIZE_MASK},
  error::{AllocError, Result},
};

/// Opaque reference to an allocation: the payload's byte offset from the
/// start of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
  /// Rebuilds a handle from a raw offset. Releasing a handle that was not
  /// returned by [`FirstFitAllocator::allocate`] corrupts the block layout
  /// unless the offset lies outside the buffer.
  pub fn from_offset(offset: usize) -> Self {
    Self(offset)
  }

  pub fn offset(self) -> usize {
    self.0
  }
}

/// Snapshot of one block, as yielded by [`FirstFitAllocator::blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Offset of the block header from the buffer start.
  pub offset: usize,
  /// Payload size, header excluded.
  pub size: usize,
  pub occupied: bool,
}

/// Offset of the block following the one at `offset`, if it starts inside
/// a buffer of `len` bytes.
fn next_offset(
  offset: usize,
  block: &Block,
  footprint: usize,
  len: usize,
) -> Option<usize> {
  let next = offset
    .checked_add(footprint)?
    .checked_add(block.size() as usize)?;

  (next < len).then_some(next)
}

/// Address-ordered walk over the implicit block list.
pub struct Blocks<'b> {
  buf: &'b [u8],
  footprint: usize,
  cursor: Option<usize>,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.cursor?;
    let Some(block) = Block::read(self.buf, offset) else {
      self.cursor = None;
      return None;
    };
    self.cursor = next_offset(offset, &block, self.footprint, self.buf.len());

    Some(BlockInfo {
      offset,
      size: block.size() as usize,
      occupied: block.is_occupied(),
    })
  }
}

/// First-fit allocator working in place on a borrowed byte buffer.
///
/// The buffer is tiled by blocks, each an inline header padded to
/// the alignment followed by its payload. There is no separate free list:
/// neighbors are found by address arithmetic, forward through the payload
/// size and backward through the stored `prev_offset`.
///
/// The allocator performs no locking. Sharing one instance between threads
/// requires external mutual exclusion.
pub struct FirstFitAllocator<'a> {
  buf: &'a mut [u8],
  align: usize,
  footprint: usize,
  occupied: usize,
}

impl<'a> FirstFitAllocator<'a> {
  /// Takes over `buf` with machine word alignment.
  pub fn new(buf: &'a mut [u8]) -> Result<Self> {
    Self::with_align(buf, WORD_ALIGN)
  }

  /// Takes over `buf`, zeroes it and lays out a single free block spanning
  /// the whole buffer. An `align` of zero selects the machine word.
  pub fn with_align(
    buf: &'a mut [u8],
    align: usize,
  ) -> Result<Self> {
    let align = if align == 0 { WORD_ALIGN } else { align };
    let size = buf.len();

    if align > size {
      return Err(AllocError::BufferTooSmall { size, footprint: align });
    }

    let footprint = align_to!(HEADER_SIZE, align);
    if size < footprint {
      return Err(AllocError::BufferTooSmall { size, footprint });
    }

    let payload = size - footprint;
    if payload > SIZE_MASK as usize {
      return Err(AllocError::BufferTooLarge {
        size,
        max: SIZE_MASK as usize,
      });
    }

    buf.fill(0);
    Block::new(payload as u32, false, 0).write(buf, 0);

    debug!("first-fit allocator over {size} bytes, align = {align}, header footprint = {footprint}");

    Ok(Self {
      buf,
      align,
      footprint,
      occupied: footprint,
    })
  }

  /// Allocates at least `num_bytes` bytes, or returns `None` when the
  /// request is zero or no free block is large enough.
  pub fn allocate(
    &mut self,
    num_bytes: usize,
  ) -> Option<Handle> {
    self.try_allocate(num_bytes).ok()
  }

  /// Like [`allocate`](Self::allocate), reporting why nothing was handed out.
  pub fn try_allocate(
    &mut self,
    num_bytes: usize,
  ) -> Result<Handle> {
    if num_bytes == 0 {
      return Err(AllocError::ZeroSize);
    }
    if num_bytes > self.buf.len() {
      return Err(AllocError::OutOfMemory { requested: num_bytes });
    }

    let size = align_to!(num_bytes, self.align);
    let (offset, mut block) = self
      .find_free_block(size)
      .ok_or(AllocError::OutOfMemory { requested: num_bytes })?;

    block.set_occupied(true);

    let available = block.size() as usize;
    if available >= size + self.align + self.footprint {
      let remainder = available - size - self.footprint;
      let split = offset + self.footprint + size;

      block.set_size(size as u32);
      Block::new(remainder as u32, false, (self.footprint + size) as u32).write(self.buf, split);
      self.link_next(split);
      self.occupied += self.footprint;

      trace!("split block at {offset:#x}: {size} bytes taken, {remainder} bytes free at {split:#x}");
    }

    block.write(self.buf, offset);
    self.occupied += block.size() as usize;

    let handle = Handle(offset + self.footprint);
    trace!(
      "allocated {num_bytes} bytes ({} usable) at {:#x}",
      block.size(),
      handle.0
    );

    Ok(handle)
  }

  /// Returns the block behind `handle` to the free pool, merging it with
  /// free neighbors. Handles outside the buffer are ignored.
  pub fn release(
    &mut self,
    handle: Handle,
  ) {
    if let Err(err) = self.try_release(handle) {
      warn!("ignoring release: {err}");
    }
  }

  /// Like [`release`](Self::release), but reports handles outside the
  /// buffer instead of ignoring them. Nothing changes on error.
  pub fn try_release(
    &mut self,
    handle: Handle,
  ) -> Result<()> {
    let invalid = AllocError::InvalidHandle { offset: handle.0 };
    let mut offset = handle.0.checked_sub(self.footprint).ok_or(invalid)?;
    let mut block = Block::read(self.buf, offset).ok_or(invalid)?;

    block.set_occupied(false);
    self.occupied = self.occupied.saturating_sub(block.size() as usize);
    trace!("released {} bytes at {:#x}", block.size(), handle.0);

    if let Some((prev_offset, mut prev)) = self
      .prev_block(offset, &block)
      .filter(|(_, prev)| prev.is_free())
    {
      let merged = prev.size() as usize + self.footprint + block.size() as usize;
      prev.set_size(merged as u32);
      self.occupied = self.occupied.saturating_sub(self.footprint);

      trace!("merged block at {offset:#x} into previous block at {prev_offset:#x}");
      offset = prev_offset;
      block = prev;
    }

    if let Some((next_offset, next)) = self
      .next_block(offset, &block)
      .filter(|(_, next)| next.is_free())
    {
      let merged = block.size() as usize + self.footprint + next.size() as usize;
      block.set_size(merged as u32);
      self.occupied = self.occupied.saturating_sub(self.footprint);

      trace!("merged next block at {next_offset:#x} into block at {offset:#x}");
    }

    block.write(self.buf, offset);
    self.link_next(offset);

    Ok(())
  }

  /// Bytes committed to live allocations plus every block header.
  pub fn occupied_bytes(&self) -> usize {
    self.occupied
  }

  pub fn total_bytes(&self) -> usize {
    self.buf.len()
  }

  pub fn free_bytes(&self) -> usize {
    self.total_bytes().saturating_sub(self.occupied)
  }

  pub fn alignment(&self) -> usize {
    self.align
  }

  /// Size of one block header once padded to the alignment.
  pub fn header_footprint(&self) -> usize {
    self.footprint
  }

  /// Walks every block in address order.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      buf: &*self.buf,
      footprint: self.footprint,
      cursor: Some(0),
    }
  }

  /// Payload of a live allocation, including any bytes added by rounding.
  pub fn payload(
    &self,
    handle: Handle,
  ) -> Option<&[u8]> {
    let range = self.payload_range(handle)?;
    self.buf.get(range)
  }

  pub fn payload_mut(
    &mut self,
    handle: Handle,
  ) -> Option<&mut [u8]> {
    let range = self.payload_range(handle)?;
    self.buf.get_mut(range)
  }

  fn payload_range(
    &self,
    handle: Handle,
  ) -> Option<core::ops::Range<usize>> {
    let offset = handle.0.checked_sub(self.footprint)?;
    let block = Block::read(self.buf, offset).filter(Block::is_occupied)?;

    Some(handle.0..handle.0.checked_add(block.size() as usize)?)
  }

  fn find_free_block(
    &self,
    size: usize,
  ) -> Option<(usize, Block)> {
    let mut current = Some(0);

    while let Some(offset) = current {
      let block = Block::read(self.buf, offset)?;
      if block.is_free() && block.size() as usize >= size {
        return Some((offset, block));
      }
      current = next_offset(offset, &block, self.footprint, self.buf.len());
    }

    None
  }

  fn prev_block(
    &self,
    offset: usize,
    block: &Block,
  ) -> Option<(usize, Block)> {
    if block.prev_offset == 0 {
      return None;
    }

    let prev = offset.checked_sub(block.prev_offset as usize)?;
    Block::read(self.buf, prev).map(|block| (prev, block))
  }

  fn next_block(
    &self,
    offset: usize,
    block: &Block,
  ) -> Option<(usize, Block)> {
    let next = next_offset(offset, block, self.footprint, self.buf.len())?;
    Block::read(self.buf, next).map(|block| (next, block))
  }

  /// Points the back link of the block after `offset` at `offset`.
  fn link_next(
    &mut self,
    offset: usize,
  ) {
    let Some(block) = Block::read(self.buf, offset) else {
      return;
    };
    if let Some((next_offset, mut next)) = self.next_block(offset, &block) {
      next.prev_offset = (next_offset - offset) as u32;
      next.write(self.buf, next_offset);
    }
  }
}

impl fmt::Debug for FirstFitAllocator<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("FirstFitAllocator")
      .field("total", &self.total_bytes())
      .field("occupied", &self.occupied)
      .field("align", &self.align)
      .field("footprint", &self.footprint)
      .field("blocks", &self.blocks().collect::<Vec<_>>())
      .finish()
  }
}
