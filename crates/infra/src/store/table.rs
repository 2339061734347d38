//! Lock-guarded document tables.
//!
//! A [`Table`] wraps a collection's whole state (documents plus its unique
//! indexes) in one `RwLock`, so every store operation is a single critical
//! section. A poisoned lock surfaces as [`StoreError::Unavailable`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockroom_core::StoreError;

#[derive(Debug, Default)]
pub struct Table<S> {
    inner: RwLock<S>,
}

impl<S> Table<S> {
    pub fn new(state: S) -> Self {
        Self {
            inner: RwLock::new(state),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, S>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, S>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

#[derive(Debug)]
struct Row<V> {
    seq: u64,
    doc: V,
}

/// Documents keyed by id, remembering insertion order.
#[derive(Debug)]
pub struct Documents<K, V> {
    rows: HashMap<K, Row<V>>,
    next_seq: u64,
}

impl<K, V> Default for Documents<K, V> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K, V> Documents<K, V>
where
    K: Eq + Hash,
{
    pub fn get(&self, key: &K) -> Option<&V> {
        self.rows.get(key).map(|row| &row.doc)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }

    /// Insert a new document; it becomes the newest.
    pub fn insert(&mut self, key: K, doc: V) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.insert(key, Row { seq, doc });
    }

    /// Replace a stored document in place, keeping its position. `false` if absent.
    pub fn replace(&mut self, key: &K, doc: V) -> bool {
        match self.rows.get_mut(key) {
            Some(row) => {
                row.doc = doc;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.rows.remove(key).map(|row| row.doc)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.rows.values().map(|row| &row.doc)
    }

    /// All documents, newest first.
    pub fn newest_first(&self) -> Vec<&V> {
        let mut rows: Vec<&Row<V>> = self.rows.values().collect();
        rows.sort_unstable_by(|a, b| b.seq.cmp(&a.seq));
        rows.into_iter().map(|row| &row.doc).collect()
    }
}
