use inplace_alloc::{FirstFitAllocator, Handle};
use log::info;

/// Logs every block of the allocator in address order.
fn print_blocks(
  label: &str,
  allocator: &FirstFitAllocator,
) {
  info!(
    "[{}] occupied = {} / {} bytes",
    label,
    allocator.occupied_bytes(),
    allocator.total_bytes(),
  );
  for block in allocator.blocks() {
    info!(
      "    {:#06x}  {:>5} bytes  {}",
      block.offset,
      block.size,
      if block.occupied { "occupied" } else { "free" }
    );
  }
}

fn print_alloc(
  requested: usize,
  handle: Handle,
  allocator: &FirstFitAllocator,
) {
  let usable = allocator.payload(handle).map_or(0, <[u8]>::len);
  info!(
    "Allocated {} bytes ({} usable), offset = {:#x}",
    requested,
    usable,
    handle.offset()
  );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  if std::env::var_os("RUST_LOG").is_none() {
    unsafe { std::env::set_var("RUST_LOG", "info") };
  }
  pretty_env_logger::init();

  let mut memory = [0u8; 512];
  let mut allocator = FirstFitAllocator::with_align(&mut memory, 8)?;
  print_blocks("start", &allocator);

  // --------------------------------------------------------------------
  // 1) Allocate three blocks. Each one is split off the free tail.
  // --------------------------------------------------------------------
  let first = allocator.try_allocate(4)?;
  print_alloc(4, first, &allocator);
  if let Some(payload) = allocator.payload_mut(first) {
    payload.fill(0xEF);
  }

  let second = allocator.try_allocate(12)?;
  print_alloc(12, second, &allocator);

  let third = allocator.try_allocate(64)?;
  print_alloc(64, third, &allocator);
  print_blocks("three allocations", &allocator);

  // --------------------------------------------------------------------
  // 2) Release the first block and ask for something that fits in it.
  //    First-fit hands the hole back before touching the tail.
  // --------------------------------------------------------------------
  allocator.release(first);
  let reused = allocator.try_allocate(2)?;
  print_alloc(2, reused, &allocator);
  info!(
    "reused == first? {}",
    if reused == first { "Yes, it reused the freed block" } else { "No, it allocated somewhere else" }
  );

  // --------------------------------------------------------------------
  // 3) Release the middle blocks. Neighbors coalesce into one free block.
  // --------------------------------------------------------------------
  allocator.release(second);
  allocator.release(third);
  print_blocks("after coalescing", &allocator);

  // --------------------------------------------------------------------
  // 4) Requests that cannot be served, and a foreign handle.
  // --------------------------------------------------------------------
  if let Err(err) = allocator.try_allocate(4096) {
    info!("large request rejected: {err}");
  }
  if let Err(err) = allocator.try_release(Handle::from_offset(10_000)) {
    info!("foreign handle rejected: {err}");
  }

  allocator.release(reused);
  print_blocks("end", &allocator);

  Ok(())
}
