// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The bound-resource cache.
//!
//! Each pipeline slot remembers the last resource set bound to it together with its
//! dynamic offsets. Rebinding an identical `(set, offsets)` pair is a no-op; anything
//! else replaces the entry and reports the slot as changed so the caller can mark it
//! dirty.
//!
//! Dynamic offsets are stored inline up to [`INLINE_OFFSETS`] entries. Longer lists
//! borrow a heap array from an [`OffsetPool`] owned by the cache and return it when the
//! entry is replaced.

use crate::bindings::resource_set::ResourceSet;
use smallvec::SmallVec;
use std::ops::Deref;

/// Number of dynamic offsets stored without allocating.
pub const INLINE_OFFSETS: usize = 5;

/// Upper bound of arrays an [`OffsetPool`] keeps around.
const POOL_LIMIT: usize = 16;

/// Recycles the heap arrays of long dynamic-offset lists.
#[derive(Debug, Default)]
pub struct OffsetPool {
    free: Vec<Vec<u32>>,
}

impl OffsetPool {
    pub fn new() -> Self {
        Self::default()
    }
    fn take(&mut self, capacity: usize) -> Vec<u32> {
        match self.free.iter().position(|v| v.capacity() >= capacity) {
            Some(i) => self.free.swap_remove(i),
            None => Vec::with_capacity(capacity),
        }
    }
    fn give(&mut self, mut array: Vec<u32>) {
        if self.free.len() < POOL_LIMIT {
            array.clear();
            self.free.push(array);
        }
    }
    /// Number of arrays available for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

/// A list of dynamic offsets, inline when short.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicOffsets(SmallVec<[u32; INLINE_OFFSETS]>);

impl DynamicOffsets {
    /// Copies `offsets`, borrowing from `pool` when they don't fit inline.
    pub fn from_slice(offsets: &[u32], pool: &mut OffsetPool) -> Self {
        if offsets.len() <= INLINE_OFFSETS {
            DynamicOffsets(SmallVec::from_slice(offsets))
        } else {
            let mut array = pool.take(offsets.len());
            array.extend_from_slice(offsets);
            DynamicOffsets(SmallVec::from_vec(array))
        }
    }
    /// Returns any heap array to `pool`.
    pub fn release(self, pool: &mut OffsetPool) {
        if self.0.spilled() {
            pool.give(self.0.into_vec());
        }
    }
    pub fn is_inline(&self) -> bool {
        !self.0.spilled()
    }
}

impl Deref for DynamicOffsets {
    type Target = [u32];
    fn deref(&self) -> &[u32] {
        &self.0
    }
}

/// The cache entry of one slot.
#[derive(Debug, Clone)]
pub struct BoundResourceSetInfo {
    pub set: ResourceSet,
    pub offsets: DynamicOffsets,
}

impl BoundResourceSetInfo {
    /// Same set, and every offset bit-identical.
    pub fn matches(&self, set: &ResourceSet, offsets: &[u32]) -> bool {
        self.set == *set && *self.offsets == *offsets
    }
}

/// Per-slot cache of bound resource sets.
#[derive(Debug, Default)]
pub struct BoundResourceCache {
    entries: Vec<Option<BoundResourceSetInfo>>,
    pool: OffsetPool,
}

impl BoundResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `(set, offsets)` at `slot`.
    ///
    /// Returns `true` when the entry changed, `false` when the identical pair was already
    /// bound.
    pub fn bind(&mut self, slot: usize, set: &ResourceSet, offsets: &[u32]) -> bool {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        if let Some(current) = &self.entries[slot] {
            if current.matches(set, offsets) {
                return false;
            }
        }
        let offsets = DynamicOffsets::from_slice(offsets, &mut self.pool);
        let previous = self.entries[slot].replace(BoundResourceSetInfo {
            set: set.clone(),
            offsets,
        });
        if let Some(previous) = previous {
            previous.offsets.release(&mut self.pool);
        }
        true
    }

    pub fn get(&self, slot: usize) -> Option<&BoundResourceSetInfo> {
        self.entries.get(slot).and_then(|e| e.as_ref())
    }

    /// Forgets every entry, returning pooled offset arrays.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..).flatten() {
            entry.offsets.release(&mut self.pool);
        }
    }

    /// Forgets entries at `len` and above.
    pub fn truncate(&mut self, len: usize) {
        if len < self.entries.len() {
            for entry in self.entries.drain(len..).flatten() {
                entry.offsets.release(&mut self.pool);
            }
        }
    }

    pub fn pool(&self) -> &OffsetPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::layout::{ResourceKind, ResourceLayout, ResourceLayoutDescription, ResourceLayoutElement};
    use crate::bindings::resource_set::ResourceSetDescription;
    use crate::bindings::resources::{BufferDescription, DeviceBuffer};
    use crate::bindings::visible_to::{BufferUsage, ShaderStages};

    fn set() -> ResourceSet {
        let layout = ResourceLayout::new(ResourceLayoutDescription::new(vec![
            ResourceLayoutElement::dynamic("u", ResourceKind::UniformBuffer, ShaderStages::VERTEX),
        ]));
        let buffer = DeviceBuffer::new(BufferDescription::new(1024, BufferUsage::UNIFORM), "u");
        ResourceSet::new(ResourceSetDescription::new(&layout, vec![buffer.into()]), "set")
    }

    #[test]
    fn test_identical_bind_is_unchanged() {
        let mut cache = BoundResourceCache::new();
        let s = set();
        assert!(cache.bind(0, &s, &[256]));
        assert!(!cache.bind(0, &s, &[256]));
        assert!(cache.bind(0, &s, &[512]));
        assert!(cache.bind(0, &set(), &[512]));
        assert!(cache.bind(3, &s, &[]));
        assert!(cache.get(2).is_none());
    }

    #[test]
    fn test_inline_threshold() {
        let mut pool = OffsetPool::new();
        let short = DynamicOffsets::from_slice(&[1, 2, 3, 4, 5], &mut pool);
        assert!(short.is_inline());
        let long = DynamicOffsets::from_slice(&[1, 2, 3, 4, 5, 6], &mut pool);
        assert!(!long.is_inline());
        assert_eq!(long[5], 6);
        long.release(&mut pool);
        assert_eq!(pool.available(), 1);
        let again = DynamicOffsets::from_slice(&[9; 6], &mut pool);
        assert_eq!(pool.available(), 0);
        assert_eq!(again.to_vec(), vec![9u32; 6]);
    }

    #[test]
    fn test_replacement_returns_heap_array() {
        let mut cache = BoundResourceCache::new();
        let s = set();
        cache.bind(0, &s, &[0; 8]);
        assert_eq!(cache.pool().available(), 0);
        cache.bind(0, &s, &[1]);
        assert_eq!(cache.pool().available(), 1);
        cache.bind(1, &s, &[0; 6]);
        cache.clear();
        assert_eq!(cache.pool().available(), 1);
        assert!(cache.get(0).is_none());
    }
}
