//! Synthetic heap-dump logs for benchmarking.
//!
//! - [`synthetic_log`]: deterministic log text for any number of heaps
//! - [`reference_log`]: 8 heaps x 2 000 chunks, the default bench input
//! - [`stress_log`]: 32 heaps x 20 000 chunks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fmt::Write;

use heapvis_core::ChunkKind;

/// Address of the first synthetic heap.
pub const BASE_ADDR: u64 = 0x7f00_0000_0000;

/// Largest synthetic chunk, in bytes.
const MAX_CHUNK: u64 = 16 * 1024;

/// Reference input: 8 heaps x 2 000 chunks.
pub fn reference_log(seed: u64) -> String {
    synthetic_log(8, 2_000, seed)
}

/// Stress input: 32 heaps x 20 000 chunks.
pub fn stress_log(seed: u64) -> String {
    synthetic_log(32, 20_000, seed)
}

/// Generate a log with `heaps` heaps of `chunks_per_heap` chunks each.
///
/// Chunk sizes are multiples of 16 in `[16, 16 KiB]`, kinds alternate
/// between used and free at random, and the last chunk of every heap is
/// `(top)`. Each heap gets a full pages-in-use line. Output depends only
/// on the arguments.
pub fn synthetic_log(heaps: usize, chunks_per_heap: usize, seed: u64) -> String {
    let mut rng = Lcg(seed);
    let stride = (chunks_per_heap as u64 * MAX_CHUNK).next_multiple_of(0x10_0000);
    let mut out = String::new();

    for h in 0..heaps as u64 {
        let addr = BASE_ADDR + h * stride;
        let sizes: Vec<u64> = (0..chunks_per_heap)
            .map(|_| (rng.next_u64() % (MAX_CHUNK / 16) + 1) * 16)
            .collect();
        let total: u64 = sizes.iter().sum();
        let _ = writeln!(out, "Heap  {addr:#x} size {total:>10} bytes:");

        let mut cursor = addr;
        for (i, &size) in sizes.iter().enumerate() {
            let kind = if i + 1 == sizes.len() {
                ChunkKind::Top
            } else if rng.next_u64() % 3 == 0 {
                ChunkKind::Free
            } else {
                ChunkKind::Used
            };
            let marker = match kind {
                ChunkKind::Top => " (top)  ",
                ChunkKind::Free => " [free] ",
                _ => "          ",
            };
            let _ = write!(out, "chunk {cursor:#x} size {size:>10} bytes{marker}");
            if kind.is_used() {
                let _ = write!(out, "{:016x}", rng.next_u64());
            }
            out.push('\n');
            cursor += size;
        }

        let end = cursor.next_multiple_of(4096);
        let pages = (end - addr) / 4096;
        let bits: String = (0..pages)
            .map(|_| match rng.next_u64() % 8 {
                0 => '?',
                1..=4 => '1',
                _ => '0',
            })
            .collect();
        let _ = writeln!(out, "Pages in use for {addr:#x}-{end:#x}: {bits}");
    }
    out
}

/// 64-bit linear congruential generator.
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 16
    }
}
