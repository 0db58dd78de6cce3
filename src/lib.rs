//! cloudfs: a per-user folder/file abstraction persisted as flat keys in an
//! S3-compatible object store.
//!
//! The store has no native notion of directories; folders exist as
//! zero-length marker objects whose keys end in `/`, and every structural
//! operation (create, rename, move, delete, list) is a composition of
//! non-atomic single-key primitives. See the module docs of [`paths`],
//! [`storage`] and [`service::objects`] for the layering, and the service
//! docs for where the non-atomicity is allowed to show.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cloudfs::config::Config;
//! use cloudfs::service::{FolderService, ObjectService};
//! use cloudfs::storage::driver::s3::S3Store;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(S3Store::connect(&Config::default()).await?);
//! let folders = FolderService::new(ObjectService::new(store));
//! folders.create_folder(42, "docs/").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod paths;
pub mod service;
pub mod storage;

pub use error::{StoreError, VfsError};
pub use paths::{Breadcrumb, ObjectPath};
pub use storage::{ObjectInfo, ObjectReader, ObjectStore};
