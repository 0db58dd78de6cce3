//! Folder policy on top of the operations engine, mirroring the user-facing
//! semantics: rename requires a free destination, move-into creates the
//! destination when absent, and a folder can never be moved into its own
//! subtree.

use crate::error::VfsError;
use crate::paths::ObjectPath;
use crate::service::objects::ObjectService;

/// How a folder move request is meant: `rename` changes the name in place
/// and must not clobber an existing folder; a plain move targets an existing
/// (or to-be-created) destination folder.
#[derive(Debug, Clone)]
pub struct MoveFolderRequest {
    pub from: String,
    pub to: String,
    pub rename: bool,
}

#[derive(Clone)]
pub struct FolderService {
    objects: ObjectService,
}

impl FolderService {
    pub fn new(objects: ObjectService) -> Self {
        Self { objects }
    }

    pub async fn list_folder(&self, user_id: i64, raw: &str) -> Result<Vec<ObjectPath>, VfsError> {
        let path = parse_folder(raw, user_id)?;
        self.objects.list_folder(&path).await
    }

    /// Creates a folder and returns its user-visible path.
    pub async fn create_folder(&self, user_id: i64, raw: &str) -> Result<String, VfsError> {
        let path = parse_folder(raw, user_id)?;
        if path.is_root() {
            return Err(VfsError::AlreadyExists(path.path()));
        }
        self.objects.create_folder(&path).await?;
        Ok(path.path())
    }

    /// Renames or moves a folder per the request policy and returns the new
    /// user-visible path.
    pub async fn move_folder(
        &self,
        user_id: i64,
        request: &MoveFolderRequest,
    ) -> Result<String, VfsError> {
        let old = parse_folder(&request.from, user_id)?;
        let new = parse_folder(&request.to, user_id)?;

        if old.is_root() || (new.is_descendant_of(&old) && old != new) {
            return Err(VfsError::InvalidPath(new.path()));
        }

        if request.rename {
            if self.objects.exists(&new).await? {
                return Err(VfsError::AlreadyExists(new.path()));
            }
        } else if !new.is_root() && !self.objects.exists(&new).await? {
            self.objects.create_folder(&new).await?;
        }

        self.objects.move_folder(&old, &new).await?;
        Ok(new.path())
    }

    /// All folders the given folder may be moved into.
    pub async fn move_targets(
        &self,
        user_id: i64,
        raw: &str,
    ) -> Result<Vec<ObjectPath>, VfsError> {
        let path = parse_folder(raw, user_id)?;
        self.objects.move_targets(&path).await
    }

    /// Deletes the folder subtree and returns the parent folder's path for
    /// post-delete navigation.
    pub async fn delete_folder(&self, user_id: i64, raw: &str) -> Result<String, VfsError> {
        let path = parse_folder(raw, user_id)?;
        if path.is_root() {
            return Err(VfsError::InvalidPath(path.path()));
        }
        self.objects.delete_folder(&path).await?;
        Ok(path.parent().path())
    }
}

fn parse_folder(raw: &str, user_id: i64) -> Result<ObjectPath, VfsError> {
    let path = ObjectPath::parse(raw, user_id)?;
    if !path.is_folder() {
        return Err(VfsError::NotAFolder(path.path()));
    }
    Ok(path)
}
