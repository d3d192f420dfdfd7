//! File record types.

use crate::records::{RecordId, WholeNumber, null_as_default, present, whole_number};
use serde::Deserializer;
use serde::{Deserialize, Serialize};

/// Upload state of a file. Statuses this build does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileStatus {
    #[default]
    Uploading,
    Completed,
    Other(String),
}

impl FileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Uploading => "uploading",
            Self::Completed => "completed",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for FileStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "uploading" => Self::Uploading,
            "completed" => Self::Completed,
            _ => Self::Other(status),
        }
    }
}

impl From<&str> for FileStatus {
    fn from(status: &str) -> Self {
        Self::from(status.to_owned())
    }
}

impl From<FileStatus> for String {
    fn from(status: FileStatus) -> Self {
        match status {
            FileStatus::Other(status) => status,
            known => known.as_str().to_owned(),
        }
    }
}

/// A row of the `file_c` collection.
///
/// Decoding is lenient: `null` status and progress read as their defaults,
/// and counts may arrive float-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "name_c", default)]
    pub name: Option<String>,
    #[serde(rename = "size_c", default, deserialize_with = "whole_number")]
    pub size: Option<u64>,
    #[serde(rename = "type_c", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "status_c", default, deserialize_with = "null_as_default")]
    pub status: FileStatus,
    #[serde(rename = "progress_c", default, deserialize_with = "stored_progress")]
    pub progress: u8,
    #[serde(rename = "url_c", default)]
    pub url: Option<String>,
    #[serde(rename = "thumbnail_url_c", default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "uploaded_at_c", default)]
    pub uploaded_at: Option<String>,
}

// Stored progress beyond 100 reads as complete.
fn stored_progress<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let progress = Option::<WholeNumber>::deserialize(deserializer)?.map_or(0, |n| n.0);
    Ok(progress.min(100) as u8)
}

/// Input of [`FileService::create`](super::FileService::create).
///
/// Unset or empty fields get their defaults at creation time: `uploading`,
/// progress 0, no URLs, and the current time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewFile {
    #[serde(rename = "name_c", default)]
    pub name: Option<String>,
    #[serde(rename = "size_c", default)]
    pub size: Option<u64>,
    #[serde(rename = "type_c", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "status_c", default)]
    pub status: Option<FileStatus>,
    #[serde(rename = "progress_c", default)]
    pub progress: Option<u8>,
    #[serde(rename = "url_c", default)]
    pub url: Option<String>,
    #[serde(rename = "thumbnail_url_c", default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "uploaded_at_c", default)]
    pub uploaded_at: Option<String>,
}

impl NewFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: Some(name.into()),
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Sparse update of a file record.
///
/// `None` leaves a field out of the request entirely. The nullable URL
/// fields nest a second `Option` so they can be cleared with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileUpdate {
    #[serde(rename = "name_c", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "size_c", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "type_c", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(rename = "status_c", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    #[serde(rename = "progress_c", default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(
        rename = "url_c",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub url: Option<Option<String>>,
    #[serde(
        rename = "thumbnail_url_c",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(rename = "uploaded_at_c", default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

impl FileUpdate {
    /// The update a progress report turns into.
    ///
    /// Progress is capped at 100; a finished upload also becomes
    /// `completed` with its download URL.
    pub fn progress(progress: u32, download_url: impl FnOnce() -> String) -> Self {
        let progress = progress.min(100) as u8;
        if progress < 100 {
            return Self {
                progress: Some(progress),
                ..Self::default()
            };
        }
        Self {
            progress: Some(progress),
            status: Some(FileStatus::Completed),
            url: Some(Some(download_url())),
            ..Self::default()
        }
    }
}

/// The full row sent on create.
#[derive(Debug, Serialize)]
pub(crate) struct FileInsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_c: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_c: Option<String>,
    pub status_c: FileStatus,
    pub progress_c: u8,
    pub url_c: Option<String>,
    pub thumbnail_url_c: Option<String>,
    pub uploaded_at_c: String,
}

impl FileInsert {
    pub(crate) fn from_new(file: NewFile, now: impl FnOnce() -> String) -> Self {
        Self {
            name_c: file.name,
            size_c: file.size,
            type_c: file.mime_type,
            status_c: file
                .status
                .filter(|status| !status.as_str().is_empty())
                .unwrap_or_default(),
            progress_c: file.progress.unwrap_or(0),
            url_c: file.url.filter(|url| !url.is_empty()),
            thumbnail_url_c: file.thumbnail_url.filter(|url| !url.is_empty()),
            uploaded_at_c: file
                .uploaded_at
                .filter(|at| !at.is_empty())
                .unwrap_or_else(now),
        }
    }
}
