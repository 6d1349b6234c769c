//! # inplace_alloc - A First-Fit Allocator Living Inside Its Own Buffer
//!
//! This crate provides a **first-fit allocator** that carves variable-sized
//! blocks out of a single byte buffer supplied by the caller. Every piece of
//! bookkeeping lives inside that buffer: there is no auxiliary heap and no
//! external free list.
//!
//! ## Overview
//!
//! ```text
//!   Buffer Layout:
//!
//!   base                                                             base + size
//!   ┌─────┬──────────┬─────┬───────┬─────┬─────────────────────────────────┐
//!   │ hdr │ A (used) │ hdr │ B     │ hdr │ free                            │
//!   └─────┴──────────┴─────┴───────┴─────┴─────────────────────────────────┘
//!   ◄─── block 0 ───►◄─── block 1 ──►◄─────────── block 2 ─────────────────►
//!
//!   Blocks tile the buffer with no gaps. The next block is found by
//!   skipping a header and a payload, the previous one through the
//!   distance stored in the header.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   inplace_alloc
//!   ├── align      - Rounding macro (align_to!) and the default alignment
//!   ├── block      - Inline block header codec (internal)
//!   ├── error      - AllocError and Result
//!   └── first_fit  - FirstFitAllocator, Handle, BlockInfo
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use inplace_alloc::FirstFitAllocator;
//!
//! let mut memory = [0u8; 256];
//! let mut allocator = FirstFitAllocator::new(&mut memory).unwrap();
//!
//! let handle = allocator.allocate(24).unwrap();
//! allocator.payload_mut(handle).unwrap()[0] = 42;
//! assert_eq!(allocator.payload(handle).unwrap()[0], 42);
//!
//! allocator.release(handle);
//! assert_eq!(allocator.occupied_bytes(), allocator.header_footprint());
//! ```
//!
//! ## How It Works
//!
//! Each block starts with an 8-byte header, padded up to the alignment:
//!
//! ```text
//!   Single Block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ occupied: 1 bit │  │  ┌──────────────────────────┐  │
//!   │  │ size: 31 bits   │  │  │                          │  │
//!   │  │ prev_offset     │  │  │  size bytes, a multiple  │  │
//!   │  └─────────────────┘  │  │  of the alignment        │  │
//!   │  footprint bytes      │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Handle returned to the caller
//! ```
//!
//! - **Allocation** scans blocks from the start and takes the first free one
//!   that is large enough. If the leftover can hold a header plus one
//!   alignment unit, it is split off as a new free block.
//! - **Release** marks the block free and merges it with a free previous
//!   and/or next neighbor, so two free blocks are never adjacent.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **Linear search**: Allocation is O(number of blocks)
//! - **Minimal validation**: Only handles pointing outside the buffer are
//!   rejected; double frees are not detected
//! - **Fixed capacity**: The buffer never grows or shrinks

pub mod align;
mod block;
mod error;
mod first_fit;

pub use error::{AllocError, Result};
pub use first_fit::{BlockInfo, Blocks, FirstFitAllocator, Handle};
