//! Read-only folder view for the presentation boundary: immediate children
//! plus the breadcrumb trail. The caller may have supplied an arbitrary or
//! crafted path string, so every fault here collapses into the distinguished
//! bad-path condition instead of leaking a raw store error.

use serde::Serialize;

use crate::error::VfsError;
use crate::paths::{self, Breadcrumb, ObjectPath};
use crate::service::objects::ObjectService;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    pub is_folder: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderView {
    pub path: String,
    pub entries: Vec<FolderEntry>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Clone)]
pub struct NavigationService {
    objects: ObjectService,
}

impl NavigationService {
    pub fn new(objects: ObjectService) -> Self {
        Self { objects }
    }

    /// The contents of a folder, folders first then files, each group sorted
    /// by name, together with the breadcrumb trail down to it.
    pub async fn folder_view(&self, user_id: i64, raw: &str) -> Result<FolderView, VfsError> {
        let view = self.try_folder_view(user_id, raw).await;
        view.map_err(|err| {
            tracing::warn!(user_id, path = raw, %err, "folder view failed");
            VfsError::InvalidPath(raw.to_string())
        })
    }

    async fn try_folder_view(&self, user_id: i64, raw: &str) -> Result<FolderView, VfsError> {
        let path = ObjectPath::parse(raw, user_id)?;
        if !path.is_folder() {
            return Err(VfsError::NotAFolder(path.path()));
        }

        let mut entries: Vec<FolderEntry> = self
            .objects
            .list_folder(&path)
            .await?
            .iter()
            .map(|child| FolderEntry {
                name: child.display_name().to_string(),
                path: child.path(),
                is_folder: child.is_folder(),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.is_folder
                .cmp(&a.is_folder)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(FolderView {
            path: path.path(),
            entries,
            breadcrumbs: paths::breadcrumbs(&path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::driver::memory::MemoryStore;
    use crate::storage::ObjectStore;
    use bytes::Bytes;
    use std::sync::Arc;

    async fn fixture(keys: &[&str]) -> NavigationService {
        let store = Arc::new(MemoryStore::new());
        for key in keys {
            store.put(key, Bytes::new()).await.unwrap();
        }
        NavigationService::new(ObjectService::new(store))
    }

    #[tokio::test]
    async fn view_lists_folders_first_sorted() {
        let svc = fixture(&[
            "user-1/docs/",
            "user-1/docs/z.txt",
            "user-1/docs/a.txt",
            "user-1/docs/img/",
            "user-1/docs/arch/",
        ])
        .await;

        let view = svc.folder_view(1, "docs/").await.unwrap();
        assert_eq!(view.path, "/docs/");
        let names: Vec<(&str, bool)> = view
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.is_folder))
            .collect();
        assert_eq!(
            names,
            vec![
                ("arch", true),
                ("img", true),
                ("a.txt", false),
                ("z.txt", false)
            ]
        );
        let crumbs: Vec<&str> = view.breadcrumbs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(crumbs, vec!["/", "docs"]);
    }

    #[tokio::test]
    async fn root_view_works_with_empty_string() {
        let svc = fixture(&["user-1/docs/", "user-1/readme.md"]).await;
        let view = svc.folder_view(1, "").await.unwrap();
        assert_eq!(view.path, "/");
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.breadcrumbs.len(), 1);
    }

    #[tokio::test]
    async fn any_fault_surfaces_as_bad_path() {
        let svc = fixture(&[]).await;
        for raw in ["a//b", "docs", "../x"] {
            assert!(
                matches!(
                    svc.folder_view(1, raw).await,
                    Err(VfsError::InvalidPath(p)) if p == raw
                ),
                "expected bad-path condition for {raw:?}"
            );
        }
    }

    #[tokio::test]
    async fn views_are_scoped_to_the_user() {
        let svc = fixture(&["user-1/docs/", "user-2/secret/"]).await;
        let view = svc.folder_view(2, "").await.unwrap();
        let names: Vec<&str> = view.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["secret"]);
    }
}
