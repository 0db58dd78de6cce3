//! File policy: upload into a folder, download as an owned stream, move and
//! delete single files.

use bytes::Bytes;

use crate::error::VfsError;
use crate::paths::ObjectPath;
use crate::service::objects::ObjectService;
use crate::storage::{ObjectInfo, ObjectReader};

#[derive(Clone)]
pub struct FileService {
    objects: ObjectService,
}

impl FileService {
    pub fn new(objects: ObjectService) -> Self {
        Self { objects }
    }

    /// Stores `content` as `file_name` inside the given folder. Overwrites
    /// silently (last-writer-wins) and returns the file's path.
    pub async fn upload(
        &self,
        user_id: i64,
        folder_raw: &str,
        file_name: &str,
        content: Bytes,
    ) -> Result<String, VfsError> {
        let folder = ObjectPath::parse(folder_raw, user_id)?;
        let path = folder.child_file(file_name)?;
        self.objects.create_file(&path, content).await?;
        Ok(path.path())
    }

    /// Opens the file for reading. The caller owns the reader and must drop
    /// it on every exit path to release the underlying connection.
    pub async fn download(&self, user_id: i64, raw: &str) -> Result<ObjectReader, VfsError> {
        let path = parse_file(raw, user_id)?;
        self.objects.get_stream(&path).await
    }

    pub async fn stat(&self, user_id: i64, raw: &str) -> Result<ObjectInfo, VfsError> {
        let path = parse_file(raw, user_id)?;
        self.objects.stat(&path).await
    }

    /// Moves or renames a single file; the destination must be free.
    pub async fn move_file(
        &self,
        user_id: i64,
        from_raw: &str,
        to_raw: &str,
    ) -> Result<String, VfsError> {
        let old = parse_file(from_raw, user_id)?;
        let new = parse_file(to_raw, user_id)?;
        if old != new && self.objects.exists(&new).await? {
            return Err(VfsError::AlreadyExists(new.path()));
        }
        self.objects.move_object(&old, &new).await?;
        Ok(new.path())
    }

    /// Deletes the file and returns its folder's path for navigation.
    pub async fn delete_file(&self, user_id: i64, raw: &str) -> Result<String, VfsError> {
        let path = parse_file(raw, user_id)?;
        self.objects.delete_file(&path).await?;
        Ok(path.parent().path())
    }
}

fn parse_file(raw: &str, user_id: i64) -> Result<ObjectPath, VfsError> {
    let path = ObjectPath::parse(raw, user_id)?;
    if !path.is_file() {
        return Err(VfsError::NotAFile(path.path()));
    }
    Ok(path)
}
