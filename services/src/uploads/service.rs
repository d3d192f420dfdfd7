use super::COLLECTION;
use super::types::{FileList, NewUpload, UploadInsert, UploadPatch, UploadRecord, UploadUpdate};
use crate::file_ids::FileIdsError;
use crate::guard::guarded;
use crate::records::{FetchQuery, IntoRecordId, OrderBy, RecordClient, WhereClause};
use crate::table::Table;
use chrono::{DateTime, Duration, SecondsFormat, Utc};

const PAGE_LIMIT: u32 = 100;
const DEFAULT_RECENT_LIMIT: u32 = 10;
const SHARE_LINK_LEN: usize = 21;

/// How long a share session lives when the caller sets no expiry.
pub const DEFAULT_EXPIRY_DAYS: i64 = 7;

/// CRUD and queries over upload (share session) records.
#[derive(Clone, Debug)]
pub struct UploadService<C> {
    table: Table<C>,
}

impl<C: RecordClient> UploadService<C> {
    pub fn new(client: Option<C>) -> Self {
        Self {
            table: Table::new(client, COLLECTION),
        }
    }

    pub fn is_available(&self) -> bool {
        self.table.is_available()
    }

    pub async fn get_all(&self) -> Vec<UploadRecord> {
        guarded("upload.get_all", self.table.fetch(FetchQuery::page(PAGE_LIMIT))).await
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Option<UploadRecord> {
        guarded("upload.get_by_id", async {
            let id = id.into_record_id()?;
            self.table.get(id).await
        })
        .await
    }

    pub async fn create(&self, upload: NewUpload) -> Option<UploadRecord> {
        guarded("upload.create", async {
            let insert = insert_from_new(upload, Utc::now())?;
            self.table.create(insert).await
        })
        .await
    }

    pub async fn update(&self, id: impl IntoRecordId, update: UploadUpdate) -> Option<UploadRecord> {
        guarded("upload.update", async {
            let id = id.into_record_id()?;
            self.table.update(id, UploadPatch::try_from(update)?).await
        })
        .await
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> bool {
        guarded("upload.delete", async {
            let id = id.into_record_id()?;
            self.table.delete(id).await
        })
        .await
    }

    /// Newest uploads first; `None` means the latest ten.
    pub async fn get_recent(&self, limit: Option<u32>) -> Vec<UploadRecord> {
        let query = FetchQuery::page(limit.unwrap_or(DEFAULT_RECENT_LIMIT))
            .order(OrderBy::desc("created_at_c"));
        guarded("upload.get_recent", self.table.fetch(query)).await
    }

    /// The upload a share token points at, if any.
    pub async fn get_by_share_link(&self, share_link: &str) -> Option<UploadRecord> {
        let query =
            FetchQuery::page(1).filter(WhereClause::equal_to("share_link_c", share_link));
        guarded("upload.get_by_share_link", async {
            let found: Vec<UploadRecord> = self.table.fetch(query).await?;
            Ok(found.into_iter().next())
        })
        .await
    }
}

// Unset and empty values both take the default.
fn insert_from_new(upload: NewUpload, now: DateTime<Utc>) -> Result<UploadInsert, FileIdsError> {
    let stamp = |at: DateTime<Utc>| at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());
    Ok(UploadInsert {
        files_c: upload
            .files
            .map(FileList::encode)
            .transpose()?
            .unwrap_or_default(),
        total_size_c: upload.total_size,
        share_link_c: non_empty(upload.share_link)
            .unwrap_or_else(|| nanoid::nanoid!(SHARE_LINK_LEN)),
        expires_at_c: non_empty(upload.expires_at)
            .unwrap_or_else(|| stamp(now + Duration::days(DEFAULT_EXPIRY_DAYS))),
        created_at_c: non_empty(upload.created_at).unwrap_or_else(|| stamp(now)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{MockFailure, MockRecordClient, RecordId, RecordOperation};
    use serde_json::json;

    fn service() -> (MockRecordClient, UploadService<MockRecordClient>) {
        let client = MockRecordClient::new();
        (client.clone(), UploadService::new(Some(client)))
    }

    fn ids(raw: &[i64]) -> Vec<RecordId> {
        raw.iter().copied().map(RecordId::new).collect()
    }

    #[test]
    fn insert_defaults_expiry_and_share_link() {
        let now = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let insert = insert_from_new(NewUpload::default(), now).unwrap();

        assert_eq!(insert.files_c, "");
        assert_eq!(insert.created_at_c, "2026-01-01T00:00:00.000Z");
        assert_eq!(insert.expires_at_c, "2026-01-08T00:00:00.000Z");
        assert_eq!(insert.share_link_c.len(), SHARE_LINK_LEN);
    }

    #[test]
    fn insert_keeps_caller_values() {
        let now = Utc::now();
        let upload = NewUpload {
            expires_at: Some("2030-01-01T00:00:00.000Z".to_owned()),
            ..NewUpload::new(FileList::Joined("4,5".to_owned()), 9)
        }
        .with_share_link("mine");
        let insert = insert_from_new(upload, now).unwrap();

        assert_eq!(insert.files_c, "4,5");
        assert_eq!(insert.total_size_c, Some(9));
        assert_eq!(insert.share_link_c, "mine");
        assert_eq!(insert.expires_at_c, "2030-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn create_encodes_files_and_reads_them_back() {
        let (client, uploads) = service();

        let created = uploads
            .create(NewUpload::new(FileList::from_ids(ids(&[3, 7, 12])), 2048))
            .await
            .unwrap();

        assert_eq!(created.files, ids(&[3, 7, 12]));
        assert_eq!(created.total_size, Some(2048));
        assert!(created.share_link.is_some());

        let sent = client.last_request().unwrap();
        assert_eq!(sent.operation, RecordOperation::Create);
        assert_eq!(sent.payload["records"][0]["files_c"], json!("3,7,12"));

        assert_eq!(uploads.get_by_id(created.id).await, Some(created));
    }

    #[test]
    fn insert_treats_empty_strings_as_unset() {
        let upload = NewUpload {
            share_link: Some(String::new()),
            created_at: Some(String::new()),
            ..NewUpload::default()
        };
        let insert = insert_from_new(upload, Utc::now()).unwrap();
        assert_eq!(insert.share_link_c.len(), SHARE_LINK_LEN);
        assert!(insert.created_at_c.ends_with('Z'));
    }

    #[tokio::test]
    async fn malformed_joined_files_never_reach_the_backend() {
        let (client, uploads) = service();

        let created = uploads
            .create(NewUpload::new(FileList::Joined("a,b".to_owned()), 1))
            .await;
        assert!(created.is_none());

        let update = UploadUpdate {
            files: Some(FileList::Joined("1,x".to_owned())),
            ..UploadUpdate::default()
        };
        assert!(uploads.update(1, update).await.is_none());

        assert!(client.requests().is_empty());
        assert!(client.records(COLLECTION).is_empty());
    }

    #[tokio::test]
    async fn valid_joined_files_pass_through() {
        let (client, uploads) = service();
        let created = uploads
            .create(NewUpload::new(FileList::Joined("4, 5".to_owned()), 1))
            .await
            .unwrap();

        assert_eq!(created.files, ids(&[4, 5]));
        assert_eq!(
            client.last_request().unwrap().payload["records"][0]["files_c"],
            json!("4, 5")
        );
    }

    #[tokio::test]
    async fn update_encodes_file_list() {
        let (client, uploads) = service();
        let created = uploads
            .create(NewUpload::new(FileList::from_ids(ids(&[1])), 1))
            .await
            .unwrap();

        let updated = uploads
            .update(
                created.id,
                UploadUpdate {
                    files: Some(FileList::from_ids(ids(&[1, 2]))),
                    ..UploadUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.files, ids(&[1, 2]));
        assert_eq!(
            client.last_request().unwrap().payload,
            json!({"records": [{"Id": created.id.get(), "files_c": "1,2"}]})
        );
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let (client, uploads) = service();
        for day in 1..=12 {
            client.seed(
                COLLECTION,
                json!({"created_at_c": format!("2026-01-{day:02}T00:00:00.000Z"), "files_c": ""}),
            );
        }

        let recent = uploads.get_recent(None).await;
        assert_eq!(recent.len(), 10);
        assert_eq!(
            recent[0].created_at.as_deref(),
            Some("2026-01-12T00:00:00.000Z")
        );
        assert_eq!(
            recent[9].created_at.as_deref(),
            Some("2026-01-03T00:00:00.000Z")
        );

        assert_eq!(uploads.get_recent(Some(3)).await.len(), 3);
    }

    #[tokio::test]
    async fn share_link_lookup() {
        let (client, uploads) = service();
        let first = client.seed(COLLECTION, json!({"share_link_c": "abc", "files_c": "1"}));
        client.seed(COLLECTION, json!({"share_link_c": "abc", "files_c": "2"}));

        let found = uploads.get_by_share_link("abc").await.unwrap();
        assert_eq!(found.id, first);
        assert!(uploads.get_by_share_link("missing").await.is_none());
    }

    #[tokio::test]
    async fn delete_removes_upload() {
        let (_, uploads) = service();
        let created = uploads.create(NewUpload::default()).await.unwrap();

        assert!(uploads.delete(created.id).await);
        assert!(uploads.get_by_id(created.id).await.is_none());
        assert!(uploads.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn failures_yield_neutral_defaults() {
        let unavailable: UploadService<MockRecordClient> = UploadService::new(None);
        assert!(unavailable.get_all().await.is_empty());
        assert!(unavailable.get_recent(None).await.is_empty());
        assert!(unavailable.get_by_share_link("abc").await.is_none());
        assert!(unavailable.create(NewUpload::default()).await.is_none());
        assert!(!unavailable.delete(1).await);

        let (client, uploads) = service();
        client.fail_with(MockFailure::Unsuccessful("quota".to_owned()));
        assert!(uploads.get_recent(Some(5)).await.is_empty());
        assert!(uploads.get_by_share_link("abc").await.is_none());
        assert!(uploads.update(1, UploadUpdate::default()).await.is_none());
    }
}
