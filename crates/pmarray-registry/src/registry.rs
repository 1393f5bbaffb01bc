//! The array registry.
//!
//! [`ArrayRegistry`] keeps an ordered list of named integer arrays in a
//! [`Pool`]. Preconditions (name exists, name is free, size is positive)
//! are checked against the committed state before a transaction starts, so
//! a rejected request never opens one. Each accepted mutation is exactly
//! one transaction.

use pmarray_core::{EntryRecord, Object, ObjectError, ObjectId, ObjectReader};
use pmarray_pool::Pool;
use tracing::{debug, info};

use crate::entry::Entry;
use crate::error::RegistryError;

/// Named, resizable integer arrays in a transactional pool.
pub struct ArrayRegistry {
    pool: Pool,
}

impl ArrayRegistry {
    /// Wrap a pool without touching it.
    ///
    /// Call [`ArrayRegistry::initialize`] before mutating.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Wrap a pool and make sure the registry list exists.
    pub fn open(pool: Pool) -> Result<Self, RegistryError> {
        let mut registry = Self::new(pool);
        registry.initialize()?;
        Ok(registry)
    }

    /// The underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Give the pool back.
    pub fn into_pool(self) -> Pool {
        self.pool
    }

    /// Create the empty registry list if it does not exist yet.
    ///
    /// Safe to call on every start. Returns `true` if the list was created
    /// by this call.
    pub fn initialize(&mut self) -> Result<bool, RegistryError> {
        if self.pool.root_arrays()?.is_some() {
            return Ok(false);
        }
        self.pool.transaction(|tx| -> Result<(), RegistryError> {
            let list = tx.alloc(Object::List(Vec::new()))?;
            tx.set_root_arrays(Some(list))?;
            Ok(())
        })?;
        info!("initialized array registry");
        Ok(true)
    }

    /// Whether the registry list exists.
    ///
    /// A root that cannot be read is an error, not "uninitialized".
    pub fn is_initialized(&self) -> Result<bool, RegistryError> {
        Ok(self.pool.root_arrays()?.is_some())
    }

    /// Find an entry by name.
    ///
    /// Scans the list in order and returns the first match. An uninitialized
    /// registry has no entries.
    pub fn lookup(&self, name: &str) -> Result<Option<Entry<'_>>, RegistryError> {
        match find(&self.pool, name)? {
            Some(found) => Ok(Some(Entry::read(&self.pool, found.entry)?)),
            None => Ok(None),
        }
    }

    /// Create a new array of `size` elements holding `0, 1, 2, ...`.
    ///
    /// Values wrap to 0 after `i32::MAX`. The entry is appended to the end
    /// of the list.
    pub fn allocate(&mut self, name: &str, size: u64) -> Result<(), RegistryError> {
        let list = self.arrays()?;
        if find(&self.pool, name)?.is_some() {
            debug!(array = name, "allocate rejected: duplicate name");
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        if size < 1 {
            debug!(array = name, size, "allocate rejected: invalid size");
            return Err(RegistryError::InvalidSize { size });
        }

        self.pool.transaction(|tx| -> Result<(), RegistryError> {
            let name_id = tx.alloc(Object::Text(name.to_string()))?;
            let data = tx.alloc_ints(size)?;
            tx.update_ints(data, fill_sequence)?;
            let entry = tx.alloc(Object::Entry(EntryRecord {
                name: name_id,
                size,
                data,
            }))?;
            tx.update_list(list, |ids| ids.push(entry))?;
            Ok(())
        })?;
        debug!(array = name, size, "allocated array");
        Ok(())
    }

    /// Change the number of elements of an existing array.
    ///
    /// The first `min(old, new)` values are kept in order. When growing,
    /// the new tail is zero.
    pub fn resize(&mut self, name: &str, new_size: u64) -> Result<(), RegistryError> {
        let found = find(&self.pool, name)?.ok_or_else(|| {
            debug!(array = name, "resize rejected: not found");
            RegistryError::NotFound {
                name: name.to_string(),
            }
        })?;
        if new_size < 1 {
            debug!(array = name, new_size, "resize rejected: invalid size");
            return Err(RegistryError::InvalidSize { size: new_size });
        }

        let old_size = self.pool.transaction(|tx| -> Result<u64, RegistryError> {
            let record = *tx.entry(found.entry)?;
            let data = tx.alloc_ints(new_size)?;
            let old = tx.ints(record.data)?;
            let keep = old.len().min(usize::try_from(new_size).unwrap_or(usize::MAX));
            let prefix = old[..keep].to_vec();
            tx.update_ints(data, |dst| dst[..keep].copy_from_slice(&prefix))?;
            tx.free(record.data)?;
            tx.set_entry(
                found.entry,
                EntryRecord {
                    size: new_size,
                    data,
                    ..record
                },
            )?;
            Ok(record.size)
        })?;
        debug!(array = name, old_size, new_size, "resized array");
        Ok(())
    }

    /// Remove an array, freeing its name, data and record.
    ///
    /// The remaining entries keep their relative order.
    pub fn delete(&mut self, name: &str) -> Result<(), RegistryError> {
        let found = find(&self.pool, name)?.ok_or_else(|| {
            debug!(array = name, "delete rejected: not found");
            RegistryError::NotFound {
                name: name.to_string(),
            }
        })?;

        self.pool.transaction(|tx| -> Result<(), RegistryError> {
            let record = *tx.entry(found.entry)?;
            tx.free(record.name)?;
            tx.free(record.data)?;
            tx.update_list(found.list, |ids| {
                if let Some(pos) = ids.iter().position(|&id| id == found.entry) {
                    ids.remove(pos);
                }
            })?;
            tx.free(found.entry)?;
            Ok(())
        })?;
        debug!(array = name, "deleted array");
        Ok(())
    }

    /// Render an array as `name = [v0, v1, ...]`, or `None` if absent.
    pub fn render(&self, name: &str) -> Result<Option<String>, RegistryError> {
        Ok(self.lookup(name)?.map(|entry| entry.to_string()))
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize, RegistryError> {
        match self.pool.root_arrays()? {
            Some(list) => Ok(self.pool.list(list)?.len()),
            None => Ok(0),
        }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.len()? == 0)
    }

    /// All entries in list order.
    pub fn entries(&self) -> Result<Vec<Entry<'_>>, RegistryError> {
        let Some(list) = self.pool.root_arrays()? else {
            return Ok(Vec::new());
        };
        self.pool
            .list(list)?
            .iter()
            .map(|&id| Entry::read(&self.pool, id))
            .collect()
    }

    /// All entry names in list order.
    pub fn names(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|entry| entry.name().to_string())
            .collect())
    }

    fn arrays(&self) -> Result<ObjectId, RegistryError> {
        self.pool
            .root_arrays()?
            .ok_or(RegistryError::NotInitialized)
    }
}

/// Location of a named entry.
#[derive(Clone, Copy, Debug)]
struct Found {
    list: ObjectId,
    entry: ObjectId,
}

/// Linear first-match scan of the registry list.
fn find<R: ObjectReader + ?Sized>(reader: &R, name: &str) -> Result<Option<Found>, ObjectError> {
    let Some(list) = reader.root_arrays()? else {
        return Ok(None);
    };
    for &entry in reader.list(list)? {
        let record = reader.entry(entry)?;
        if reader.text(record.name)? == name {
            return Ok(Some(Found { list, entry }));
        }
    }
    Ok(None)
}

/// Fill with `0, 1, 2, ...`, restarting at 0 after `i32::MAX`.
fn fill_sequence(values: &mut [i32]) {
    fill_from(values, 0);
}

fn fill_from(values: &mut [i32], start: i32) {
    let mut next = start;
    for v in values {
        *v = next;
        next = if next < i32::MAX { next + 1 } else { 0 };
    }
}
