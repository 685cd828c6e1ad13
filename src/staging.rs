// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The staging memory pool.

Uploads and downloads pass through short-lived CPU-addressable blocks. The pool hands
them out best-fit: a rental reuses the smallest free block whose capacity is at least the
requested size, and otherwise allocates a new block of exactly that size. Blocks keep
their capacity and id for their whole life; they are never merged, split or compacted.

A rented block owns its memory until it is freed back to the pool, so reading and writing
it needs no synchronization. The pool's own bookkeeping sits behind a single lock, held
only for the duration of one rent or free.

```
use slots_and_passes::staging::StagingMemoryPool;

let pool = StagingMemoryPool::new();
let block = pool.rent(100).unwrap();
let id = block.id();
pool.free(block);
//a smaller request reuses the freed block
let smaller = pool.rent(50).unwrap();
assert_eq!(smaller.id(), id);
assert_eq!(smaller.capacity(), 100);
assert_eq!(smaller.size(), 50);
```
*/

mod view;

pub use view::{MappedView, ViewError};

use bytemuck::Pod;
use std::collections::{BTreeMap, HashSet};
use wasm_safe_mutex::Mutex;

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum StagingError {
    #[error("out of memory allocating a {size} byte staging block")]
    OutOfMemory { size: u32 },
}

/// Stable identity of a staging block.
pub type StagingBlockId = u32;

/// A CPU-addressable block rented from a [`StagingMemoryPool`].
///
/// `size` is the logical size of the current rental and never exceeds `capacity`.
#[derive(Debug)]
pub struct StagingBlock {
    id: StagingBlockId,
    memory: Box<[u8]>,
    size: u32,
}

impl StagingBlock {
    pub fn id(&self) -> StagingBlockId {
        self.id
    }
    pub fn capacity(&self) -> u32 {
        self.memory.len() as u32
    }
    pub fn size(&self) -> u32 {
        self.size
    }
    /// The first `size` bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.memory[..self.size as usize]
    }
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.memory[..self.size as usize]
    }
    /// Address of the first byte, for native copy commands.
    pub fn as_ptr(&self) -> *const u8 {
        self.memory.as_ptr()
    }
    /// A packed typed view of the first `size` bytes.
    pub fn view<T: Pod>(&mut self) -> MappedView<'_, T> {
        MappedView::new(self.bytes_mut())
    }
}

#[derive(Debug, Default)]
struct PoolState {
    next_id: StagingBlockId,
    registered: HashSet<StagingBlockId>,
    //keyed by (capacity, id) so blocks of equal capacity are distinct entries
    free: BTreeMap<(u32, StagingBlockId), Box<[u8]>>,
}

/// A best-fit pool of staging blocks.
#[derive(Debug)]
pub struct StagingMemoryPool {
    state: Mutex<PoolState>,
}

impl Default for StagingMemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StagingMemoryPool {
    pub fn new() -> Self {
        StagingMemoryPool {
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Rents a block of at least `size` bytes, with logical size `size`.
    pub fn rent(&self, size: u32) -> Result<StagingBlock, StagingError> {
        let mut state = self.state.lock_sync();
        let best_fit = state.free.range((size, 0)..).next().map(|(key, _)| *key);
        if let Some(key) = best_fit {
            if let Some(memory) = state.free.remove(&key) {
                logwise::trace_sync!(
                    "staging: reusing block {id} (capacity {capacity}) for {size} bytes",
                    id = key.1,
                    capacity = key.0,
                    size = size
                );
                return Ok(StagingBlock {
                    id: key.1,
                    memory,
                    size,
                });
            }
        }
        let allocate = logwise::perfwarn_begin!("staging: allocate block");
        let mut memory = Vec::new();
        memory
            .try_reserve_exact(size as usize)
            .map_err(|_| StagingError::OutOfMemory { size })?;
        memory.resize(size as usize, 0u8);
        drop(allocate);
        let id = state.next_id;
        state.next_id += 1;
        state.registered.insert(id);
        logwise::trace_sync!(
            "staging: allocated block {id} of {size} bytes",
            id = id,
            size = size
        );
        Ok(StagingBlock {
            id,
            memory: memory.into_boxed_slice(),
            size,
        })
    }

    /// Returns a block to the free list.
    ///
    /// Blocks whose id is no longer registered (for example, rented before
    /// [`dispose`](Self::dispose)) are released instead.
    pub fn free(&self, block: StagingBlock) {
        let mut state = self.state.lock_sync();
        if state.registered.contains(&block.id) {
            state
                .free
                .insert((block.capacity(), block.id), block.memory);
        } else {
            logwise::warn_sync!(
                "staging: freed unregistered block {id}; releasing it",
                id = block.id
            );
        }
    }

    /// Releases every block held by the pool.
    ///
    /// The caller guarantees no in-flight GPU work still uses pooled memory.
    pub fn dispose(&self) {
        let mut state = self.state.lock_sync();
        logwise::info_sync!(
            "staging: disposing pool with {blocks} registered blocks",
            blocks = state.registered.len()
        );
        state.free.clear();
        state.registered.clear();
    }

    /// Number of blocks on the free list.
    pub fn free_count(&self) -> usize {
        self.state.lock_sync().free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_fit() {
        let pool = StagingMemoryPool::new();
        let small = pool.rent(64).unwrap();
        let large = pool.rent(512).unwrap();
        let medium = pool.rent(128).unwrap();
        let (small_id, medium_id) = (small.id(), medium.id());
        pool.free(large);
        pool.free(small);
        pool.free(medium);
        //100 fits 128 and 512; 128 is the better fit
        assert_eq!(pool.rent(100).unwrap().id(), medium_id);
        assert_eq!(pool.rent(10).unwrap().id(), small_id);
    }

    #[test]
    fn test_equal_capacities_are_kept() {
        let pool = StagingMemoryPool::new();
        let a = pool.rent(32).unwrap();
        let b = pool.rent(32).unwrap();
        pool.free(a);
        pool.free(b);
        assert_eq!(pool.free_count(), 2);
        let first = pool.rent(32).unwrap();
        let second = pool.rent(32).unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_ids_are_sequential() {
        let pool = StagingMemoryPool::new();
        let ids: Vec<_> = (0..3).map(|_| pool.rent(8).unwrap().id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_dispose_forgets_blocks() {
        let pool = StagingMemoryPool::new();
        let outstanding = pool.rent(16).unwrap();
        pool.free(pool.rent(16).unwrap());
        pool.dispose();
        assert_eq!(pool.free_count(), 0);
        pool.free(outstanding);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_block_view() {
        let pool = StagingMemoryPool::new();
        let mut block = pool.rent(12).unwrap();
        block.view::<f32>().write_from(0, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(block.bytes()[4..8], 2.0f32.to_ne_bytes());
    }
}
