//! Slot heap holding the committed objects of a pool.
//!
//! [`Heap`] is a slab: a `Vec` of optional objects indexed by [`ObjectId`],
//! plus a free list of empty slots. Transactions never touch a heap
//! directly; they stage changes in an overlay and the pool applies them to
//! a shadow copy at commit.

use indexmap::IndexMap;
use pmarray_core::{Object, ObjectId};
use smallvec::SmallVec;

/// A staged change to one object slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Staged {
    /// The slot holds this object after commit.
    Live(Object),
    /// The slot is empty after commit.
    Freed,
}

/// Everything a finished transaction wants applied to the heap.
#[derive(Debug, Default)]
pub struct StagedChanges {
    /// Per-slot changes in staging order.
    pub objects: IndexMap<ObjectId, Staged>,
    /// Number of fresh ids handed out by [`Heap::fresh_id`].
    pub fresh: usize,
    /// Ids freed by the transaction, in the order they were freed.
    pub freed: SmallVec<[ObjectId; 4]>,
}

impl StagedChanges {
    /// Whether applying these changes would leave the heap untouched.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.fresh == 0
    }
}

/// Committed object storage.
#[derive(Clone, Debug, Default)]
pub struct Heap {
    /// Object slots. `None` marks a free slot.
    slots: Vec<Option<Object>>,
    /// Free slot ids; the last element is handed out first.
    free_list: Vec<ObjectId>,
    /// Sum of footprints of all live objects.
    used: u64,
}

impl Heap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a live object.
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.slots.get(id.index())?.as_ref()
    }

    /// Bytes charged by live objects.
    pub fn used_bytes(&self) -> u64 {
        self.used
    }

    /// Number of slots, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of live objects.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Number of free slots available for reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Iterate over live objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|obj| (ObjectId(i as u32), obj)))
    }

    /// The id the `n`-th fresh allocation of a transaction receives.
    ///
    /// Free slots are used first, most recently freed first; after that,
    /// ids continue past the end of the slot vector. The heap itself is not
    /// changed until [`Heap::apply`].
    pub fn fresh_id(&self, n: usize) -> ObjectId {
        let free = self.free_list.len();
        if n < free {
            self.free_list[free - 1 - n]
        } else {
            ObjectId((self.slots.len() + (n - free)) as u32)
        }
    }

    /// Apply a transaction's staged changes.
    pub fn apply(&mut self, changes: StagedChanges) {
        let reused = changes.fresh.min(self.free_list.len());
        self.free_list.truncate(self.free_list.len() - reused);
        for (id, staged) in changes.objects {
            match staged {
                Staged::Live(obj) => self.install(id, obj),
                Staged::Freed => self.release(id),
            }
        }
    }

    /// Place an object in a slot, growing the slot vector as needed.
    ///
    /// Used by `apply` and by the image decoder. Slots opened below `id` by
    /// growth are registered as free.
    pub(crate) fn install(&mut self, id: ObjectId, obj: Object) {
        let idx = id.index();
        if idx >= self.slots.len() {
            self.extend_slots(idx);
            self.slots.push(None);
        }
        let slot = &mut self.slots[idx];
        if let Some(old) = slot.as_ref() {
            self.used -= old.footprint();
        }
        self.used += obj.footprint();
        *slot = Some(obj);
    }

    /// Empty a slot and push it onto the free list.
    ///
    /// An id past the end of the slot vector was allocated and freed in the
    /// same transaction and never became a slot; it is ignored. A slot that
    /// is already empty belongs to a reused id that was dropped from the
    /// free list by `apply`, so it goes back on.
    pub(crate) fn release(&mut self, id: ObjectId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            if let Some(old) = slot.take() {
                self.used -= old.footprint();
            }
            self.free_list.push(id);
        }
    }

    /// Grow the slot vector to `count` slots, registering new ones as free.
    pub(crate) fn extend_slots(&mut self, count: usize) {
        let old_len = self.slots.len();
        if count <= old_len {
            return;
        }
        self.slots.resize(count, None);
        for gap in (old_len..count).rev() {
            self.free_list.push(ObjectId(gap as u32));
        }
    }
}
