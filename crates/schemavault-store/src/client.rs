use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Minimal bucket abstraction: whole-object writes and reads by full key.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Writes a single object, replacing any existing one under `key`.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Reads a single object.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// In-process bucket. Counts writes so callers can assert on upload behavior.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// A copy of the object stored under `key`.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    /// Stores an object directly, bypassing the write counter.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(key.into(), bytes.into());
        }
    }
}

#[async_trait]
impl ObjectStoreClient for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().map_err(|_| StoreError::Transport {
            key: key.to_string(),
            message: "memory store lock poisoned".to_string(),
        })?;
        objects.insert(key.to_string(), bytes);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.object(key).ok_or_else(|| StoreError::Transport {
            key: key.to_string(),
            message: "NoSuchKey: the specified key does not exist".to_string(),
        })
    }
}
