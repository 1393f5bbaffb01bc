//! Commit atomicity under injected store failures.

use std::panic::{self, AssertUnwindSafe};

use pmarray_core::{Object, ObjectReader, PoolGeneration};
use pmarray_pool::{MemStore, Pool, PoolConfig, PoolError};
use pmarray_test_utils::{FaultMode, FaultyStore};

fn seeded_store() -> MemStore {
    let store = MemStore::new();
    let mut pool = Pool::create(store.clone(), PoolConfig::new(1 << 16)).unwrap();
    pool.transaction(|tx| -> Result<(), PoolError> {
        let list = tx.alloc(Object::List(Vec::new()))?;
        tx.set_root_arrays(Some(list))?;
        Ok(())
    })
    .unwrap();
    store
}

fn push_text(pool: &mut Pool, text: &str) -> Result<(), PoolError> {
    pool.transaction(|tx| {
        let list = tx.root_arrays()?.expect("list installed");
        let id = tx.alloc(Object::Text(text.to_string()))?;
        tx.update_list(list, |ids| ids.push(id))?;
        Ok(())
    })
}

#[test]
fn failed_store_keeps_memory_and_disk_at_previous_generation() {
    let store = seeded_store();
    let before = store.snapshot();
    let faulty = FaultyStore::new(store.clone()).fail_after(0, FaultMode::FailBeforeWrite);
    let mut pool = Pool::open(faulty, "").unwrap();
    let live = pool.live_objects();

    assert!(matches!(push_text(&mut pool, "lost"), Err(PoolError::Io(_))));
    assert_eq!(pool.generation(), PoolGeneration(1));
    assert_eq!(pool.live_objects(), live);
    assert_eq!(store.snapshot(), before);

    let reopened = Pool::open(store, "").unwrap();
    let list = reopened.root_arrays().unwrap().unwrap();
    assert!(reopened.list(list).unwrap().is_empty());
}

#[test]
fn commits_before_failure_are_durable() {
    let store = seeded_store();
    let faulty = FaultyStore::new(store.clone()).fail_after(2, FaultMode::FailBeforeWrite);
    let mut pool = Pool::open(faulty, "").unwrap();
    push_text(&mut pool, "one").unwrap();
    push_text(&mut pool, "two").unwrap();
    assert!(push_text(&mut pool, "three").is_err());
    drop(pool);

    let pool = Pool::open(store, "").unwrap();
    let list = pool.root_arrays().unwrap().unwrap();
    let texts: Vec<&str> = pool
        .list(list)
        .unwrap()
        .iter()
        .map(|&id| pool.text(id).unwrap())
        .collect();
    assert_eq!(texts, ["one", "two"]);
    assert_eq!(pool.generation(), PoolGeneration(3));
}

#[test]
fn torn_image_is_detected_on_open() {
    let store = seeded_store();
    let faulty = FaultyStore::new(store.clone()).fail_after(0, FaultMode::TornWrite);
    let mut pool = Pool::open(faulty, "").unwrap();
    assert!(push_text(&mut pool, "torn").is_err());
    drop(pool);

    assert!(Pool::open(store, "").is_err());
}

#[test]
fn panic_inside_transaction_commits_nothing() {
    let store = seeded_store();
    let before = store.snapshot();
    let mut pool = Pool::open(store.clone(), "").unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = pool.transaction(|tx| -> Result<(), PoolError> {
            let list = tx.root_arrays()?.expect("list installed");
            let id = tx.alloc(Object::Text("half".into()))?;
            tx.update_list(list, |ids| ids.push(id))?;
            panic!("interrupted mid-transaction");
        });
    }));
    assert!(result.is_err());

    assert_eq!(store.snapshot(), before);
    let list = pool.root_arrays().unwrap().unwrap();
    assert!(pool.list(list).unwrap().is_empty());
    push_text(&mut pool, "after").unwrap();
    assert_eq!(pool.generation(), PoolGeneration(2));
}

#[test]
fn corrupted_image_rejected() {
    let store = seeded_store();
    let mut bytes = store.snapshot().unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    store.replace(Some(bytes));
    assert!(matches!(
        Pool::open(store, ""),
        Err(PoolError::ChecksumMismatch { .. })
    ));
}
