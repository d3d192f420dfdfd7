use super::COLLECTION;
use super::types::{FileInsert, FileRecord, FileStatus, FileUpdate, NewFile};
use crate::config::DEFAULT_FILE_URL_BASE;
use crate::guard::guarded;
use crate::records::{FetchQuery, IntoRecordId, RecordClient, RecordId, WhereClause};
use crate::table::Table;

const PAGE_LIMIT: u32 = 100;

/// CRUD and queries over file records.
///
/// Every method returns a plain value; failures are logged and come back as
/// `[]`, `None` or `false`.
#[derive(Clone, Debug)]
pub struct FileService<C> {
    table: Table<C>,
    file_url_base: String,
}

impl<C: RecordClient> FileService<C> {
    /// `None` models a record client that was never initialized.
    pub fn new(client: Option<C>) -> Self {
        Self {
            table: Table::new(client, COLLECTION),
            file_url_base: DEFAULT_FILE_URL_BASE.to_owned(),
        }
    }

    pub fn with_file_url_base(mut self, base: impl Into<String>) -> Self {
        self.file_url_base = base.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn is_available(&self) -> bool {
        self.table.is_available()
    }

    /// Where a completed file can be downloaded.
    pub fn download_url(&self, id: RecordId) -> String {
        format!("{}/{}", self.file_url_base, id)
    }

    pub async fn get_all(&self) -> Vec<FileRecord> {
        guarded("file.get_all", self.table.fetch(FetchQuery::page(PAGE_LIMIT))).await
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Option<FileRecord> {
        guarded("file.get_by_id", async {
            let id = id.into_record_id()?;
            self.table.get(id).await
        })
        .await
    }

    pub async fn create(&self, file: NewFile) -> Option<FileRecord> {
        let insert = FileInsert::from_new(file, crate::iso8601_now);
        guarded("file.create", self.table.create(insert)).await
    }

    pub async fn update(&self, id: impl IntoRecordId, update: FileUpdate) -> Option<FileRecord> {
        guarded("file.update", async {
            let id = id.into_record_id()?;
            self.table.update(id, update).await
        })
        .await
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> bool {
        guarded("file.delete", async {
            let id = id.into_record_id()?;
            self.table.delete(id).await
        })
        .await
    }

    pub async fn get_by_status(&self, status: impl Into<FileStatus>) -> Vec<FileRecord> {
        let status = String::from(status.into());
        let query = FetchQuery::page(PAGE_LIMIT).filter(WhereClause::equal_to("status_c", status));
        guarded("file.get_by_status", self.table.fetch(query)).await
    }

    /// Record upload progress; reaching 100 completes the file.
    pub async fn update_progress(
        &self,
        id: impl IntoRecordId,
        progress: u32,
    ) -> Option<FileRecord> {
        guarded("file.update_progress", async {
            let id = id.into_record_id()?;
            let update = FileUpdate::progress(progress, || self.download_url(id));
            Ok(self.update(id, update).await)
        })
        .await
    }
}
