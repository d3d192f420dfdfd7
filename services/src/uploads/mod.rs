//! Upload records (`upload_c`): a share session grouping files under one
//! share token, with an expiry.

mod service;
mod types;

pub use service::{DEFAULT_EXPIRY_DAYS, UploadService};
pub use types::{FileList, FileRef, NewUpload, UploadRecord, UploadUpdate};

pub const COLLECTION: &str = "upload_c";
