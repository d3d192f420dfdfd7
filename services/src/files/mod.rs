//! File records (`file_c`): one row per uploaded file, tracking its
//! progress from `uploading` to `completed`.

mod service;
mod types;

pub use service::FileService;
pub use types::{FileRecord, FileStatus, FileUpdate, NewFile};

pub const COLLECTION: &str = "file_c";
