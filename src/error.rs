/// Errors reported by [`FirstFitAllocator`](crate::FirstFitAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
  #[error("buffer of {size} bytes cannot hold a {footprint}-byte block header")]
  BufferTooSmall { size: usize, footprint: usize },

  #[error("buffer of {size} bytes leaves a payload larger than the {max}-byte size field")]
  BufferTooLarge { size: usize, max: usize },

  #[error("zero-byte allocation requested")]
  ZeroSize,

  #[error("no free block can hold {requested} bytes")]
  OutOfMemory { requested: usize },

  #[error("handle at offset {offset:#x} is outside the managed buffer")]
  InvalidHandle { offset: usize },
}

pub type Result<T> = core::result::Result<T, AllocError>;
