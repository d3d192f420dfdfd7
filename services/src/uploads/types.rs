//! Upload (share session) record types.

use crate::file_ids::{self, FileIdsError};
use crate::files::FileRecord;
use crate::records::{RecordId, whole_number};
use serde::{Deserialize, Deserializer, Serialize};

/// A row of the `upload_c` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "files_c", default, deserialize_with = "file_ids::deserialize")]
    pub files: Vec<RecordId>,
    #[serde(rename = "total_size_c", default, deserialize_with = "whole_number")]
    pub total_size: Option<u64>,
    #[serde(rename = "share_link_c", default)]
    pub share_link: Option<String>,
    #[serde(rename = "expires_at_c", default)]
    pub expires_at: Option<String>,
    #[serde(rename = "created_at_c", default)]
    pub created_at: Option<String>,
}

/// A reference to a file: its id, or a file record carrying one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileRef(pub RecordId);

impl<'de> Deserialize<'de> for FileRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(RecordId),
            Object {
                #[serde(alias = "Id")]
                id: RecordId,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(id) | Repr::Object { id } => Self(id),
        })
    }
}

impl From<RecordId> for FileRef {
    fn from(id: RecordId) -> Self {
        Self(id)
    }
}

impl From<i64> for FileRef {
    fn from(id: i64) -> Self {
        Self(RecordId::new(id))
    }
}

impl From<&FileRecord> for FileRef {
    fn from(file: &FileRecord) -> Self {
        Self(file.id)
    }
}

/// The files of an upload as a caller supplies them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileList {
    /// Encoded to a comma-joined id string before it is sent.
    Items(Vec<FileRef>),
    /// Already joined; sent unchanged.
    Joined(String),
}

impl FileList {
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a FileRecord>) -> Self {
        Self::Items(files.into_iter().map(FileRef::from).collect())
    }

    pub fn from_ids(ids: impl IntoIterator<Item = RecordId>) -> Self {
        Self::Items(ids.into_iter().map(FileRef).collect())
    }

    /// The `files_c` value to send. A joined string must decode as an id
    /// list and is then sent unchanged.
    pub fn encode(self) -> Result<String, FileIdsError> {
        match self {
            Self::Items(refs) => {
                let ids: Vec<RecordId> = refs.into_iter().map(|file| file.0).collect();
                Ok(file_ids::encode(&ids))
            }
            Self::Joined(joined) => {
                file_ids::decode(&joined)?;
                Ok(joined)
            }
        }
    }
}

/// Input of [`UploadService::create`](super::UploadService::create).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewUpload {
    #[serde(rename = "files_c", default)]
    pub files: Option<FileList>,
    #[serde(rename = "total_size_c", default)]
    pub total_size: Option<u64>,
    /// Generated when unset.
    #[serde(rename = "share_link_c", default)]
    pub share_link: Option<String>,
    /// Seven days after creation when unset.
    #[serde(rename = "expires_at_c", default)]
    pub expires_at: Option<String>,
    #[serde(rename = "created_at_c", default)]
    pub created_at: Option<String>,
}

impl NewUpload {
    pub fn new(files: FileList, total_size: u64) -> Self {
        Self {
            files: Some(files),
            total_size: Some(total_size),
            ..Self::default()
        }
    }

    pub fn with_share_link(mut self, share_link: impl Into<String>) -> Self {
        self.share_link = Some(share_link.into());
        self
    }
}

/// Sparse update of an upload record. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadUpdate {
    #[serde(rename = "files_c", default)]
    pub files: Option<FileList>,
    #[serde(rename = "total_size_c", default)]
    pub total_size: Option<u64>,
    #[serde(rename = "share_link_c", default)]
    pub share_link: Option<String>,
    #[serde(rename = "expires_at_c", default)]
    pub expires_at: Option<String>,
    #[serde(rename = "created_at_c", default)]
    pub created_at: Option<String>,
}

/// The full row sent on create.
#[derive(Debug, Serialize)]
pub(crate) struct UploadInsert {
    pub files_c: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size_c: Option<u64>,
    pub share_link_c: String,
    pub expires_at_c: String,
    pub created_at_c: String,
}

/// Wire form of [`UploadUpdate`], with the file list already encoded.
#[derive(Debug, Serialize)]
pub(crate) struct UploadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size_c: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_link_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_c: Option<String>,
}

impl TryFrom<UploadUpdate> for UploadPatch {
    type Error = FileIdsError;

    fn try_from(update: UploadUpdate) -> Result<Self, Self::Error> {
        Ok(Self {
            files_c: update.files.map(FileList::encode).transpose()?,
            total_size_c: update.total_size,
            share_link_c: update.share_link,
            expires_at_c: update.expires_at,
            created_at_c: update.created_at,
        })
    }
}
