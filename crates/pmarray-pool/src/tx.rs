//! Transaction staging overlay.
//!
//! A [`Tx`] borrows the committed heap read-only and records every change
//! in its own overlay: new objects, copy-on-write copies of modified
//! objects, and tombstones for freed ones. Reads go through the overlay
//! first, so a transaction sees its own writes. Nothing reaches the heap
//! until the pool commits the overlay; dropping a `Tx` discards it.

use indexmap::IndexMap;
use pmarray_core::traits::mismatch;
use pmarray_core::{EntryRecord, Object, ObjectError, ObjectId, ObjectKind, ObjectReader};
use smallvec::SmallVec;

use crate::heap::{Heap, Staged, StagedChanges};

/// Write access to a pool for the duration of one transaction.
///
/// Created by [`Pool::transaction`](crate::Pool::transaction). Every
/// allocation and every growth of an object is checked against the pool
/// capacity.
pub struct Tx<'p> {
    heap: &'p Heap,
    root: ObjectId,
    capacity: u64,
    /// Overlay of changed slots.
    staged: IndexMap<ObjectId, Staged>,
    /// Fresh ids handed out so far.
    fresh: usize,
    /// Projected used bytes if the transaction committed now.
    used: u64,
    /// Ids freed by this transaction; handed to the commit log.
    freed: SmallVec<[ObjectId; 4]>,
    /// First capacity failure from [`Tx::update`]; a poisoned transaction
    /// refuses to commit.
    poisoned: Option<ObjectError>,
}

impl<'p> Tx<'p> {
    pub(crate) fn new(heap: &'p Heap, root: ObjectId, capacity: u64) -> Self {
        Self {
            heap,
            root,
            capacity,
            staged: IndexMap::new(),
            fresh: 0,
            used: heap.used_bytes(),
            freed: SmallVec::new(),
            poisoned: None,
        }
    }

    /// Projected used bytes after commit.
    pub fn used_bytes(&self) -> u64 {
        self.used
    }

    /// Pool capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Ids freed so far in this transaction.
    pub fn freed(&self) -> &[ObjectId] {
        &self.freed
    }

    /// Stage a new object and return its id.
    pub fn alloc(&mut self, obj: Object) -> Result<ObjectId, ObjectError> {
        self.charge(obj.footprint())?;
        Ok(self.place(obj))
    }

    /// Stage a zero-filled `Ints` buffer of `len` elements.
    ///
    /// Capacity is checked before the buffer is built, so an absurd `len`
    /// fails with [`ObjectError::OutOfSpace`] instead of exhausting memory.
    pub fn alloc_ints(&mut self, len: u64) -> Result<ObjectId, ObjectError> {
        let out_of_space = ObjectError::OutOfSpace {
            requested: u64::MAX,
            capacity: self.capacity,
        };
        let footprint = Object::ints_footprint(len).ok_or(out_of_space.clone())?;
        self.charge(footprint)?;
        let len = usize::try_from(len).map_err(|_| out_of_space)?;
        Ok(self.place(Object::Ints(vec![0; len])))
    }

    /// Free a live object.
    pub fn free(&mut self, id: ObjectId) -> Result<(), ObjectError> {
        let footprint = self.get(id)?.footprint();
        self.used -= footprint;
        self.staged.insert(id, Staged::Freed);
        self.freed.push(id);
        Ok(())
    }

    /// Modify an object in place, copying it into the overlay first.
    ///
    /// The object's footprint is re-measured afterwards. If it grew past
    /// the pool capacity the transaction is poisoned: the error is returned
    /// here and again from commit.
    pub fn update<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut Object) -> R,
    ) -> Result<R, ObjectError> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        let obj = self.stage_copy(id)?;
        let before = obj.footprint();
        let out = f(obj);
        let after = obj.footprint();
        self.used = self.used - before + after;
        if self.used > self.capacity {
            let err = ObjectError::OutOfSpace {
                requested: self.used,
                capacity: self.capacity,
            };
            self.poisoned = Some(err.clone());
            return Err(err);
        }
        Ok(out)
    }

    /// Point the root at a registry list.
    pub fn set_root_arrays(&mut self, arrays: Option<ObjectId>) -> Result<(), ObjectError> {
        let root = self.root;
        self.update_kind(root, ObjectKind::Root, |obj| {
            if let Object::Root { arrays: slot } = obj {
                *slot = arrays;
            }
        })
    }

    /// Modify a `List` object.
    pub fn update_list<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut Vec<ObjectId>) -> R,
    ) -> Result<R, ObjectError> {
        self.expect_kind(id, ObjectKind::List)?;
        self.update(id, |obj| match obj {
            Object::List(ids) => f(ids),
            _ => unreachable!("kind checked above"),
        })
    }

    /// Replace an `Entry` record.
    pub fn set_entry(&mut self, id: ObjectId, record: EntryRecord) -> Result<(), ObjectError> {
        self.update_kind(id, ObjectKind::Entry, |obj| {
            *obj = Object::Entry(record);
        })
    }

    /// Modify an `Ints` buffer without changing its length.
    pub fn update_ints<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut [i32]) -> R,
    ) -> Result<R, ObjectError> {
        self.expect_kind(id, ObjectKind::Ints)?;
        self.update(id, |obj| match obj {
            Object::Ints(v) => f(v),
            _ => unreachable!("kind checked above"),
        })
    }

    /// Finish staging and hand the overlay to the pool.
    pub(crate) fn into_changes(self) -> Result<StagedChanges, ObjectError> {
        if let Some(err) = self.poisoned {
            return Err(err);
        }
        Ok(StagedChanges {
            objects: self.staged,
            fresh: self.fresh,
            freed: self.freed,
        })
    }

    fn update_kind(
        &mut self,
        id: ObjectId,
        kind: ObjectKind,
        f: impl FnOnce(&mut Object),
    ) -> Result<(), ObjectError> {
        self.expect_kind(id, kind)?;
        self.update(id, f)
    }

    fn expect_kind(&self, id: ObjectId, kind: ObjectKind) -> Result<(), ObjectError> {
        let obj = self.get(id)?;
        if obj.kind() != kind {
            return Err(mismatch(id, kind, obj));
        }
        Ok(())
    }

    fn charge(&mut self, footprint: u64) -> Result<(), ObjectError> {
        let requested = self.used.saturating_add(footprint);
        if requested > self.capacity {
            return Err(ObjectError::OutOfSpace {
                requested,
                capacity: self.capacity,
            });
        }
        self.used = requested;
        Ok(())
    }

    fn place(&mut self, obj: Object) -> ObjectId {
        let id = self.heap.fresh_id(self.fresh);
        self.fresh += 1;
        self.staged.insert(id, Staged::Live(obj));
        id
    }

    /// Copy-on-write: make sure the overlay owns a copy of `id`.
    fn stage_copy(&mut self, id: ObjectId) -> Result<&mut Object, ObjectError> {
        let needs_copy = match self.staged.get(&id) {
            Some(Staged::Live(_)) => false,
            Some(Staged::Freed) => return Err(ObjectError::UnknownObject { id }),
            None => true,
        };
        if needs_copy {
            let obj = self
                .heap
                .get(id)
                .ok_or(ObjectError::UnknownObject { id })?
                .clone();
            self.staged.insert(id, Staged::Live(obj));
        }
        match self.staged.get_mut(&id) {
            Some(Staged::Live(obj)) => Ok(obj),
            _ => Err(ObjectError::UnknownObject { id }),
        }
    }
}

impl ObjectReader for Tx<'_> {
    fn root(&self) -> ObjectId {
        self.root
    }

    fn object(&self, id: ObjectId) -> Option<&Object> {
        match self.staged.get(&id) {
            Some(Staged::Live(obj)) => Some(obj),
            Some(Staged::Freed) => None,
            None => self.heap.get(id),
        }
    }
}
