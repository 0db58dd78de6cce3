pub mod file;
pub mod folder;
pub mod navigation;
pub mod objects;

pub use file::FileService;
pub use folder::{FolderService, MoveFolderRequest};
pub use navigation::{FolderEntry, FolderView, NavigationService};
pub use objects::ObjectService;
