//! The transactional pool.
//!
//! [`Pool`] owns the committed heap and the backing store. All mutation
//! goes through [`Pool::transaction`]:
//!
//! 1. a [`Tx`] overlay is created over the committed heap
//! 2. the caller's unit of work stages changes in the overlay
//! 3. on `Ok`, the overlay is applied to a shadow copy of the heap, the
//!    copy is encoded and stored, and only then swapped in
//! 4. on `Err` (or a panic) the overlay is dropped, which is the rollback

use std::path::Path;

use pmarray_core::{Object, ObjectId, ObjectReader, PoolGeneration};
use tracing::{debug, info, warn};

use crate::codec::{decode_image, encode_image, ImageHeader};
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::heap::{Heap, StagedChanges};
use crate::store::{FileStore, PoolStore};
use crate::tx::Tx;

/// A durable object pool with all-or-nothing transactions.
pub struct Pool {
    store: Box<dyn PoolStore>,
    heap: Heap,
    layout: String,
    capacity: u64,
    root: ObjectId,
    generation: PoolGeneration,
}

impl Pool {
    /// Create a new pool in `store`.
    ///
    /// Writes an initial image holding only the root object. Fails with
    /// [`PoolError::AlreadyExists`] if the store already holds an image.
    pub fn create(store: impl PoolStore + 'static, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let mut store: Box<dyn PoolStore> = Box::new(store);
        if store.exists() {
            return Err(PoolError::AlreadyExists);
        }

        let root = ObjectId(0);
        let mut heap = Heap::new();
        heap.install(root, Object::Root { arrays: None });
        let header = ImageHeader {
            layout: config.layout.clone(),
            capacity: config.capacity,
            generation: PoolGeneration(0),
            root,
        };
        store.store(&encode_image(&header, &heap)?)?;
        info!(
            capacity = config.capacity,
            layout = %config.layout,
            "created pool"
        );

        Ok(Self {
            store,
            heap,
            layout: config.layout,
            capacity: config.capacity,
            root,
            generation: PoolGeneration(0),
        })
    }

    /// Open the pool held by `store`, checking that it was created with
    /// `layout`.
    pub fn open(store: impl PoolStore + 'static, layout: &str) -> Result<Self, PoolError> {
        let mut store: Box<dyn PoolStore> = Box::new(store);
        let bytes = store.load()?.ok_or(PoolError::NotFound)?;
        let (header, heap) = decode_image(&bytes)?;
        if header.layout != layout {
            return Err(PoolError::LayoutMismatch {
                expected: layout.to_string(),
                found: header.layout,
            });
        }
        info!(
            generation = header.generation.0,
            objects = heap.live_count(),
            used = heap.used_bytes(),
            capacity = header.capacity,
            "opened pool"
        );

        Ok(Self {
            store,
            heap,
            layout: header.layout,
            capacity: header.capacity,
            root: header.root,
            generation: header.generation,
        })
    }

    /// Open the pool file at `path`, creating it with `config` if absent.
    pub fn open_or_create(path: impl AsRef<Path>, config: PoolConfig) -> Result<Self, PoolError> {
        let store = FileStore::new(path.as_ref());
        if store.exists() {
            Self::open(store, &config.layout)
        } else {
            Self::create(store, config)
        }
    }

    /// Run `f` as one atomic transaction.
    ///
    /// If `f` returns `Ok`, its staged changes are committed durably before
    /// this returns. If `f` returns `Err`, or panics, or commit fails,
    /// nothing is applied: the pool and its store keep the last committed
    /// state.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Tx<'_>) -> Result<T, E>,
        E: From<PoolError>,
    {
        let mut tx = Tx::new(&self.heap, self.root, self.capacity);
        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(e) => {
                debug!(
                    generation = self.generation.0,
                    discarded_frees = tx.freed().len(),
                    "transaction rolled back"
                );
                return Err(e);
            }
        };
        let changes = tx.into_changes().map_err(PoolError::from)?;
        self.commit(changes)?;
        Ok(value)
    }

    fn commit(&mut self, mut changes: StagedChanges) -> Result<(), PoolError> {
        if changes.is_empty() {
            return Ok(());
        }
        let staged = changes.objects.len();
        let freed = std::mem::take(&mut changes.freed);
        let mut next = self.heap.clone();
        next.apply(changes);
        let generation = self.generation.next();
        let header = ImageHeader {
            layout: self.layout.clone(),
            capacity: self.capacity,
            generation,
            root: self.root,
        };
        let image = encode_image(&header, &next)?;
        if let Err(e) = self.store.store(&image) {
            warn!(
                generation = generation.0,
                error = %e,
                "commit failed, keeping previous state"
            );
            return Err(e);
        }
        self.heap = next;
        self.generation = generation;
        debug!(
            generation = generation.0,
            staged,
            freed = ?freed.as_slice(),
            used = self.heap.used_bytes(),
            image_len = image.len(),
            "transaction committed"
        );
        Ok(())
    }

    /// Number of committed transactions.
    pub fn generation(&self) -> PoolGeneration {
        self.generation
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Layout name.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Bytes used by live objects.
    pub fn used_bytes(&self) -> u64 {
        self.heap.used_bytes()
    }

    /// Number of live objects, the root included.
    pub fn live_objects(&self) -> usize {
        self.heap.live_count()
    }

    /// Number of free object slots.
    pub fn free_slots(&self) -> usize {
        self.heap.free_count()
    }
}

impl ObjectReader for Pool {
    fn root(&self) -> ObjectId {
        self.root
    }

    fn object(&self, id: ObjectId) -> Option<&Object> {
        self.heap.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use pmarray_core::ObjectError;

    fn small_config() -> PoolConfig {
        PoolConfig::new(PoolConfig::MIN_CAPACITY)
    }

    #[test]
    fn create_writes_root_only_image() {
        let store = MemStore::new();
        let pool = Pool::create(store.clone(), small_config()).unwrap();
        assert_eq!(pool.live_objects(), 1);
        assert_eq!(pool.root_arrays().unwrap(), None);
        assert_eq!(pool.generation(), PoolGeneration(0));
        assert!(store.exists());
    }

    #[test]
    fn create_on_existing_store_fails() {
        let store = MemStore::new();
        Pool::create(store.clone(), small_config()).unwrap();
        assert!(matches!(
            Pool::create(store, small_config()),
            Err(PoolError::AlreadyExists)
        ));
    }

    #[test]
    fn open_empty_store_is_not_found() {
        assert!(matches!(
            Pool::open(MemStore::new(), ""),
            Err(PoolError::NotFound)
        ));
    }

    #[test]
    fn invalid_config_rejected_before_writing() {
        let store = MemStore::new();
        assert!(matches!(
            Pool::create(store.clone(), PoolConfig::new(1)),
            Err(PoolError::Config(_))
        ));
        assert!(!store.exists());
    }

    #[test]
    fn committed_changes_survive_reopen() {
        let store = MemStore::new();
        let mut pool = Pool::create(store.clone(), small_config()).unwrap();
        let id = pool
            .transaction(|tx| -> Result<_, PoolError> {
                let id = tx.alloc(Object::Text("kept".into()))?;
                tx.set_root_arrays(Some(id))?;
                Ok(id)
            })
            .unwrap();
        assert_eq!(pool.generation(), PoolGeneration(1));
        drop(pool);

        let pool = Pool::open(store, "").unwrap();
        assert_eq!(pool.text(id).unwrap(), "kept");
        assert_eq!(pool.root_arrays().unwrap(), Some(id));
        assert_eq!(pool.generation(), PoolGeneration(1));
    }

    #[test]
    fn err_from_closure_rolls_back() {
        let store = MemStore::new();
        let mut pool = Pool::create(store.clone(), small_config()).unwrap();
        let before = store.snapshot();
        let result: Result<(), PoolError> = pool.transaction(|tx| {
            let id = tx.alloc(Object::Text("dropped".into()))?;
            tx.set_root_arrays(Some(id))?;
            Err(PoolError::Object(ObjectError::UnknownObject { id }))
        });
        assert!(result.is_err());
        assert_eq!(pool.root_arrays().unwrap(), None);
        assert_eq!(pool.live_objects(), 1);
        assert_eq!(pool.generation(), PoolGeneration(0));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn empty_transaction_does_not_bump_generation() {
        let mut pool = Pool::create(MemStore::new(), small_config()).unwrap();
        pool.transaction(|_| Ok::<_, PoolError>(())).unwrap();
        assert_eq!(pool.generation(), PoolGeneration(0));
    }

    #[test]
    fn layout_mismatch_rejected() {
        let store = MemStore::new();
        Pool::create(store.clone(), small_config().with_layout("arrays")).unwrap();
        match Pool::open(store, "other") {
            Err(PoolError::LayoutMismatch { expected, found }) => {
                assert_eq!(expected, "other");
                assert_eq!(found, "arrays");
            }
            other => panic!("expected LayoutMismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn out_of_space_aborts_transaction() {
        let mut pool = Pool::create(MemStore::new(), small_config()).unwrap();
        let result = pool.transaction(|tx| tx.alloc_ints(4096).map_err(PoolError::from));
        assert!(matches!(
            result,
            Err(PoolError::Object(ObjectError::OutOfSpace { .. }))
        ));
        assert_eq!(pool.live_objects(), 1);
    }

    #[test]
    fn freed_slot_reused_by_later_transaction() {
        let mut pool = Pool::create(MemStore::new(), small_config()).unwrap();
        let first = pool
            .transaction(|tx| tx.alloc(Object::Text("a".into())).map_err(PoolError::from))
            .unwrap();
        pool.transaction(|tx| tx.free(first).map_err(PoolError::from))
            .unwrap();
        assert_eq!(pool.free_slots(), 1);
        let second = pool
            .transaction(|tx| tx.alloc(Object::Text("b".into())).map_err(PoolError::from))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.free_slots(), 0);
    }
}
