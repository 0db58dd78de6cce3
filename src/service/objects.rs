//! Folder/file operations engine.
//!
//! Composes the pure path model with store primitives. Each operation is
//! one-shot; the multi-key ones (`move_folder`, `delete_folder`) are plain
//! sequences of independent store calls with no lock, no transaction and no
//! rollback. Their partial-failure behavior is documented on the methods and
//! must be surfaced to operators, not hidden.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{StoreError, VfsError};
use crate::paths::ObjectPath;
use crate::storage::{ObjectInfo, ObjectReader, ObjectStore};

#[derive(Clone)]
pub struct ObjectService {
    store: Arc<dyn ObjectStore>,
}

impl ObjectService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn exists(&self, path: &ObjectPath) -> Result<bool, VfsError> {
        Ok(self.store.exists(&path.full_key()).await?)
    }

    pub async fn stat(&self, path: &ObjectPath) -> Result<ObjectInfo, VfsError> {
        Ok(self.store.stat(&path.full_key()).await?)
    }

    /// Creates the folder marker. Fails with `AlreadyExists` (before any
    /// put) when an object of either shape occupies the path.
    pub async fn create_folder(&self, path: &ObjectPath) -> Result<(), VfsError> {
        let path = require_folder(path)?;
        if self.store.exists(&path.full_key()).await? {
            return Err(VfsError::AlreadyExists(path.path()));
        }
        self.store.put(&path.full_key(), Bytes::new()).await?;
        Ok(())
    }

    /// Creates or overwrites a file unconditionally (last-writer-wins).
    pub async fn create_file(&self, path: &ObjectPath, content: Bytes) -> Result<(), VfsError> {
        let path = require_file(path)?;
        self.store.put(&path.full_key(), content).await?;
        Ok(())
    }

    /// Moves a single key as copy-then-delete. Not atomic: a fault between
    /// the two calls leaves the object present at both keys.
    pub async fn move_object(&self, old: &ObjectPath, new: &ObjectPath) -> Result<(), VfsError> {
        if old == new {
            return Ok(());
        }
        self.store.copy(&old.full_key(), &new.full_key()).await?;
        self.store.delete(&old.full_key()).await?;
        Ok(())
    }

    /// Moves every descendant of `old` (marker included) under `new`.
    ///
    /// The descendant list is fully materialized before the first mutation,
    /// so objects created under `old` while the move runs are not guaranteed
    /// to be included. Per-object moves are independent; a failure partway
    /// leaves the subtree partially moved, with no rollback.
    pub async fn move_folder(&self, old: &ObjectPath, new: &ObjectPath) -> Result<(), VfsError> {
        let old = require_folder(old)?;
        let new = require_folder(new)?;
        if old == new {
            return Ok(());
        }

        let descendants = self.list_descendants(old, true).await?;
        for descendant in descendants {
            let target = descendant.replace_prefix(old, new);
            if let Err(err) = self.move_object(&descendant, &target).await {
                tracing::error!(
                    from = %descendant,
                    to = %target,
                    %err,
                    "move_folder failed partway; subtree is partially moved"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    pub async fn delete_file(&self, path: &ObjectPath) -> Result<(), VfsError> {
        let path = require_file(path)?;
        self.store.delete(&path.full_key()).await?;
        Ok(())
    }

    /// Deletes a folder and all of its descendants with one best-effort
    /// batch delete. Keys the store failed to remove are logged and surfaced
    /// as [`StoreError::BatchDelete`]; the subtree is then partially deleted.
    pub async fn delete_folder(&self, path: &ObjectPath) -> Result<(), VfsError> {
        let path = require_folder(path)?;
        let keys: Vec<String> = self
            .list_descendants(path, true)
            .await?
            .iter()
            .map(ObjectPath::full_key)
            .collect();

        let failed = self.store.batch_delete(&keys).await?;
        if !failed.is_empty() {
            for failure in &failed {
                tracing::warn!(key = %failure.key, cause = %failure.cause, "batch delete failure");
            }
            return Err(StoreError::BatchDelete { failed }.into());
        }
        Ok(())
    }

    /// Immediate children of a folder, the folder's own marker excluded.
    pub async fn list_folder(&self, path: &ObjectPath) -> Result<Vec<ObjectPath>, VfsError> {
        let path = require_folder(path)?;
        let prefix = path.full_key();
        let keys = self.store.list(&prefix, false).await?;
        keys.iter()
            .filter(|key| **key != prefix)
            .map(|key| ObjectPath::from_key(key))
            .collect()
    }

    /// Every folder a given folder could be moved into: all folders under
    /// the user's root (the root itself included), minus the folder and its
    /// own subtree. The exclusion is reflexive, so a folder can never be
    /// offered as its own target.
    pub async fn move_targets(&self, exclude: &ObjectPath) -> Result<Vec<ObjectPath>, VfsError> {
        let exclude = require_folder(exclude)?;
        let root = ObjectPath::root(exclude.user_id());
        let mut targets = vec![root.clone()];
        for descendant in self.list_descendants(&root, false).await? {
            if descendant.is_folder() && !descendant.is_descendant_of(exclude) {
                targets.push(descendant);
            }
        }
        Ok(targets)
    }

    /// File download; the caller owns the reader and must drop it to free
    /// the connection.
    pub async fn get_stream(&self, path: &ObjectPath) -> Result<ObjectReader, VfsError> {
        let path = require_file(path)?;
        Ok(self.store.get_stream(&path.full_key()).await?)
    }

    async fn list_descendants(
        &self,
        path: &ObjectPath,
        include_self: bool,
    ) -> Result<Vec<ObjectPath>, VfsError> {
        let prefix = path.full_key();
        let keys = self.store.list(&prefix, true).await?;
        keys.iter()
            .filter(|key| include_self || **key != prefix)
            .map(|key| ObjectPath::from_key(key))
            .collect()
    }
}

fn require_folder(path: &ObjectPath) -> Result<&ObjectPath, VfsError> {
    if !path.is_folder() {
        return Err(VfsError::NotAFolder(path.path()));
    }
    Ok(path)
}

fn require_file(path: &ObjectPath) -> Result<&ObjectPath, VfsError> {
    if !path.is_file() {
        return Err(VfsError::NotAFile(path.path()));
    }
    Ok(path)
}
