//! In-memory driver, used by tests and local development.
//!
//! Behaves like the S3 driver over a `BTreeMap`: flat keys, prefix listing
//! with delimiter collapsing, idempotent deletes. Every primitive call is
//! recorded in an op log so tests can assert exactly which store calls an
//! operation issued (including none at all).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{DeleteFailure, StoreError};
use crate::storage::{ObjectInfo, ObjectReader, ObjectStore};

#[derive(Clone)]
struct Entry {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Entry>>,
    ops: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every primitive call issued so far, in order, as `"op key"` strings.
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// All stored keys, sorted. Test helper.
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    fn record(&self, op: &str, key: &str) {
        self.ops.lock().unwrap().push(format!("{op} {key}"));
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.record("exists", key);
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn stat(&self, key: &str) -> Result<ObjectInfo, StoreError> {
        self.record("stat", key);
        let objects = self.objects.lock().unwrap();
        let entry = objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        let name = key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(key)
            .to_string();
        Ok(ObjectInfo {
            name,
            size: entry.data.len() as u64,
            last_modified: entry.last_modified,
        })
    }

    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>, StoreError> {
        self.record("list", prefix);
        let objects = self.objects.lock().unwrap();
        let mut keys = BTreeSet::new();
        for key in objects
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
        {
            if recursive {
                keys.insert(key.clone());
                continue;
            }
            let rest = &key[prefix.len()..];
            match rest.find('/') {
                // deeper entries collapse to their first-level folder prefix
                Some(i) if i + 1 < rest.len() => {
                    keys.insert(format!("{prefix}{}", &rest[..=i]));
                }
                _ => {
                    keys.insert(key.clone());
                }
            }
        }
        Ok(keys.into_iter().collect())
    }

    async fn put(&self, key: &str, content: Bytes) -> Result<(), StoreError> {
        self.record("put", key);
        self.objects.lock().unwrap().insert(
            key.to_string(),
            Entry {
                data: content,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<(), StoreError> {
        self.record("copy", &format!("{src} -> {dst}"));
        let mut objects = self.objects.lock().unwrap();
        let entry = objects
            .get(src)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(src.to_string()))?;
        objects.insert(dst.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.record("delete", key);
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn batch_delete(&self, keys: &[String]) -> Result<Vec<DeleteFailure>, StoreError> {
        for key in keys {
            self.record("batch_delete", key);
        }
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(Vec::new())
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectReader, StoreError> {
        self.record("get_stream", key);
        let objects = self.objects.lock().unwrap();
        let entry = objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(Box::pin(std::io::Cursor::new(entry.data.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_stat_exists() {
        let store = MemoryStore::new();
        store
            .put("user-1/a.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert!(store.exists("user-1/a.txt").await.unwrap());
        assert!(!store.exists("user-1/b.txt").await.unwrap());
        let info = store.stat("user-1/a.txt").await.unwrap();
        assert_eq!((info.name.as_str(), info.size), ("a.txt", 5));
        assert!(matches!(
            store.stat("user-1/b.txt").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_recursive_and_collapsed() {
        let store = MemoryStore::new();
        for key in ["user-1/a/", "user-1/a/x", "user-1/a/b/y", "user-1/c"] {
            store.put(key, Bytes::new()).await.unwrap();
        }
        let all = store.list("user-1/a/", true).await.unwrap();
        assert_eq!(all, vec!["user-1/a/", "user-1/a/b/y", "user-1/a/x"]);

        let children = store.list("user-1/a/", false).await.unwrap();
        assert_eq!(children, vec!["user-1/a/", "user-1/a/b/", "user-1/a/x"]);
    }

    #[tokio::test]
    async fn ops_are_recorded_in_order() {
        let store = MemoryStore::new();
        store.put("user-1/a", Bytes::new()).await.unwrap();
        store.delete("user-1/a").await.unwrap();
        assert_eq!(store.ops(), vec!["put user-1/a", "delete user-1/a"]);
    }

    #[tokio::test]
    async fn stream_reads_back_content() {
        use tokio::io::AsyncReadExt;
        let store = MemoryStore::new();
        store
            .put("user-1/f", Bytes::from_static(b"data"))
            .await
            .unwrap();
        let mut reader = store.get_stream("user-1/f").await.unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"data");
    }
}
