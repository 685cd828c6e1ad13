// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Per-slot dirty tracking.

A slot is dirty when its cached binding has not yet been applied to the current native
encoder. Binding a different resource marks one slot dirty; opening a new encoder or
switching pipelines marks every slot dirty, since native encoders carry no state across
their lifetime.

Flushing walks the dirty slots in ascending order and cleans them.
*/

#[derive(Debug, Clone, Default)]
pub struct DirtySlots {
    //true means the slot must be (re)applied
    dirty: Vec<bool>,
}

impl DirtySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes to `len` slots, every slot dirty.
    pub fn reset(&mut self, len: usize) {
        self.dirty.clear();
        self.dirty.resize(len, true);
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Marks `slot` dirty, growing if needed.
    pub fn mark_dirty(&mut self, slot: usize) {
        if self.dirty.len() <= slot {
            self.dirty.resize(slot + 1, false);
        }
        self.dirty[slot] = true;
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|d| *d = true);
    }

    pub fn is_dirty(&self, slot: usize) -> bool {
        self.dirty.get(slot).copied().unwrap_or(false)
    }

    pub fn any_dirty(&self) -> bool {
        self.dirty.iter().any(|d| *d)
    }

    /// Cleans every dirty slot, returning their indices in ascending order.
    pub fn take_dirty(&mut self) -> Vec<usize> {
        let mut taken = Vec::new();
        for (slot, dirty) in self.dirty.iter_mut().enumerate() {
            if *dirty {
                *dirty = false;
                taken.push(slot);
            }
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::DirtySlots;

    #[test]
    fn test_take_cleans() {
        let mut d = DirtySlots::new();
        d.reset(3);
        assert_eq!(d.take_dirty(), vec![0, 1, 2]);
        assert!(!d.any_dirty());
        d.mark_dirty(1);
        d.mark_dirty(5);
        assert_eq!(d.len(), 6);
        assert!(d.is_dirty(5));
        assert!(!d.is_dirty(9));
        assert_eq!(d.take_dirty(), vec![1, 5]);
        d.mark_all_dirty();
        assert_eq!(d.take_dirty().len(), 6);
    }
}
