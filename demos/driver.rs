use brkalloc::{Allocation, Arena, Reserve};

/// Prints where the arena currently ends.
/// Growth shows up as this address moving; reuse shows up as it staying put.
fn print_arena_end(
  label: &str,
  arena: &Arena<Reserve>,
) {
  println!("[{}] arena end = {:?} ({} bytes granted)", label, arena.end(), arena.len());
}

fn write_i32s(
  arena: &mut Arena<Reserve>,
  allocation: &Allocation,
  values: &[i32],
) -> brkalloc::Result<()> {
  let bytes = arena.bytes_mut(allocation)?;
  for (chunk, value) in bytes.chunks_exact_mut(4).zip(values) {
    chunk.copy_from_slice(&value.to_ne_bytes());
  }
  Ok(())
}

fn read_i32s(
  arena: &Arena<Reserve>,
  allocation: &Allocation,
  count: usize,
) -> brkalloc::Result<Vec<i32>> {
  let bytes = arena.bytes(allocation)?;
  Ok(
    bytes[..count * 4]
      .chunks_exact(4)
      .map(|chunk| i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
      .collect(),
  )
}

fn main() -> brkalloc::Result<()> {
  let mut arena = Arena::reserved(1 << 20)?;

  // --------------------------------------------------------------------
  // 1) Ten integers, filled and read back.
  // --------------------------------------------------------------------
  println!("\n[1] Array of 10 integers");
  let tab = arena.allocate(10 * 4)?;
  let values: Vec<i32> = (0..10).map(|i| 2 * i).collect();
  write_i32s(&mut arena, &tab, &values)?;
  println!("[1] tab[] = {:?}", read_i32s(&arena, &tab, 10)?);

  // --------------------------------------------------------------------
  // 2) Three neighbours released in the order 1, 3, 2 must merge back into
  //    one block, so an allocation of their combined size does not grow
  //    the arena.
  // --------------------------------------------------------------------
  println!("\n[2] Coalescing three neighbours");
  let tab1 = arena.allocate(10 * 4)?;
  let tab2 = arena.allocate(10 * 4)?;
  print_arena_end("three blocks", &arena);

  arena.release(tab)?;
  arena.release(tab2)?;
  arena.release(tab1)?;
  print_arena_end("released", &arena);

  let tab = arena.allocate(30 * 4)?;
  print_arena_end("reallocated", &arena);
  arena.release(tab)?;

  // --------------------------------------------------------------------
  // 3) Repeated large allocations must not leak: the arena end stays where
  //    the first round left it.
  // --------------------------------------------------------------------
  println!("\n[3] Leak check with 5000 byte blocks");
  let mut blocks = [arena.allocate(5000)?, arena.allocate(5000)?, arena.allocate(5000)?];
  print_arena_end("first round", &arena);
  let end = arena.end();

  for _ in 0..60_000 {
    for block in blocks {
      arena.release(block)?;
    }
    blocks = [arena.allocate(5000)?, arena.allocate(5000)?, arena.allocate(5000)?];
  }
  print_arena_end("after 60000 rounds", &arena);
  println!("[3] arena end unchanged? {}", arena.end() == end);

  for block in blocks {
    arena.release(block)?;
  }

  // --------------------------------------------------------------------
  // 4) Contents of one allocation survive work on another.
  // --------------------------------------------------------------------
  println!("\n[4] Contents after other allocations");
  let tab = arena.allocate(2 * 4)?;
  write_i32s(&mut arena, &tab, &[21311, 12345])?;
  println!("[4] before second allocation: tab[] = {:?}", read_i32s(&arena, &tab, 2)?);

  let tab1 = arena.allocate(2 * 4)?;
  write_i32s(&mut arena, &tab1, &[15, 18])?;
  println!("[4] second allocation: tab1[] = {:?}", read_i32s(&arena, &tab1, 2)?);
  println!("[4] after second allocation: tab[] = {:?}", read_i32s(&arena, &tab, 2)?);

  arena.release(tab)?;
  println!("[4] after releasing tab: tab1[] = {:?}", read_i32s(&arena, &tab1, 2)?);
  arena.release(tab1)?;

  arena.check_integrity()?;
  println!("\n[5] Chain:");
  for block in arena.blocks() {
    println!("    {:?}", block);
  }

  Ok(())
}
