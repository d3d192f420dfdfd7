//! In-memory record client for testing.

use super::traits::RecordClient;
use super::types::{
    BatchResponse, DeleteRequest, DeleteResponse, FetchQuery, FetchResponse, Operator,
    RecordBatch, RecordClientError, RecordId, RecordQuery, RecordResponse, RecordResult,
    SortType, WhereClause,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

type Row = Map<String, Value>;

/// Which record operation a [`RecordedRequest`] was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOperation {
    Fetch,
    Get,
    Create,
    Update,
    Delete,
}

/// A request as the mock received it, with its body as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub operation: RecordOperation,
    pub collection: String,
    pub payload: Value,
}

/// Failure the mock should produce for every following call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// `{"success": false, "message": ...}` at the top level.
    Unsuccessful(String),
    /// Top-level success, but each per-record result fails.
    RecordFailed(String),
    /// The request never completes.
    Transport,
}

#[derive(Default)]
struct MockState {
    collections: HashMap<String, BTreeMap<RecordId, Row>>,
    failure: Option<MockFailure>,
    requests: Vec<RecordedRequest>,
}

/// In-memory mock implementation of [`RecordClient`] for testing.
///
/// Supports equality filters, ordering and paging on fetch. Identities are
/// assigned from a counter starting at 1.
#[derive(Clone, Default)]
pub struct MockRecordClient {
    state: Arc<RwLock<MockState>>,
    next_id: Arc<AtomicI64>,
}

impl MockRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `failure`.
    pub fn fail_with(&self, failure: MockFailure) {
        self.state.write().expect("lock poisoned").failure = Some(failure);
    }

    pub fn clear_failure(&self) {
        self.state.write().expect("lock poisoned").failure = None;
    }

    /// Insert a row directly, bypassing request recording. Returns its id.
    pub fn seed(&self, collection: &str, fields: Value) -> RecordId {
        let id = self.generate_id();
        let mut row = match fields {
            Value::Object(row) => row,
            other => panic!("seeded record must be a JSON object, got {other}"),
        };
        row.insert("Id".to_owned(), Value::from(id.get()));

        self.state
            .write()
            .expect("lock poisoned")
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id, row);
        id
    }

    /// Stored rows of `collection`, in id order.
    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.state
            .read()
            .expect("lock poisoned")
            .collections
            .get(collection)
            .map(|rows| rows.values().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.read().expect("lock poisoned").requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state
            .read()
            .expect("lock poisoned")
            .requests
            .last()
            .cloned()
    }

    fn generate_id(&self) -> RecordId {
        RecordId::new(self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1)
    }
}

impl MockState {
    fn record(
        &mut self,
        operation: RecordOperation,
        collection: &str,
        payload: Value,
    ) -> Result<(), RecordClientError> {
        self.requests.push(RecordedRequest {
            operation,
            collection: collection.to_owned(),
            payload,
        });
        match self.failure {
            Some(MockFailure::Transport) => Err(RecordClientError::Status {
                status: 503,
                body: "mock transport failure".to_owned(),
            }),
            _ => Ok(()),
        }
    }

    fn top_level_failure(&self) -> Option<String> {
        match &self.failure {
            Some(MockFailure::Unsuccessful(message)) => Some(message.clone()),
            _ => None,
        }
    }

    fn record_failure(&self) -> Option<String> {
        match &self.failure {
            Some(MockFailure::RecordFailed(message)) => Some(message.clone()),
            _ => None,
        }
    }
}

fn matches(row: &Row, clause: &WhereClause) -> bool {
    match clause.operator {
        Operator::EqualTo => {
            let value = row.get(&clause.field_name).unwrap_or(&Value::Null);
            clause.values.iter().any(|candidate| candidate == value)
        }
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Less,
        (_, Some(Value::Null) | None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn decode<T: DeserializeOwned>(row: &Row) -> Result<T, RecordClientError> {
    Ok(serde_json::from_value(Value::Object(row.clone()))?)
}

fn into_row(value: Value) -> Result<Row, RecordClientError> {
    match value {
        Value::Object(row) => Ok(row),
        other => Err(RecordClientError::Status {
            status: 400,
            body: format!("record must be a JSON object, got {other}"),
        }),
    }
}

fn failed_result<T>(message: impl Into<String>) -> RecordResult<T> {
    RecordResult {
        success: false,
        message: Some(message.into()),
        data: None,
    }
}

impl RecordClient for MockRecordClient {
    async fn fetch_records<T>(
        &self,
        collection: &str,
        query: &FetchQuery,
    ) -> Result<FetchResponse<T>, RecordClientError>
    where
        T: DeserializeOwned + Send,
    {
        let mut state = self.state.write().expect("lock poisoned");
        state.record(
            RecordOperation::Fetch,
            collection,
            serde_json::to_value(query)?,
        )?;
        if let Some(message) = state.top_level_failure().or_else(|| state.record_failure()) {
            return Ok(FetchResponse {
                success: false,
                message: Some(message),
                data: None,
            });
        }

        let mut rows: Vec<&Row> = state
            .collections
            .get(collection)
            .map(|rows| {
                rows.values()
                    .filter(|row| query.filters.iter().all(|clause| matches(row, clause)))
                    .collect()
            })
            .unwrap_or_default();

        // Stable sorts applied last-key-first give lexicographic ordering.
        for order in query.order_by.iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.field_name), b.get(&order.field_name));
                match order.sort_type {
                    SortType::Asc => ordering,
                    SortType::Desc => ordering.reverse(),
                }
            });
        }

        let data = rows
            .into_iter()
            .skip(query.paging_info.offset as usize)
            .take(query.paging_info.limit as usize)
            .map(decode)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(FetchResponse {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    async fn get_record_by_id<T>(
        &self,
        collection: &str,
        id: RecordId,
        query: &RecordQuery,
    ) -> Result<RecordResponse<T>, RecordClientError>
    where
        T: DeserializeOwned + Send,
    {
        let mut state = self.state.write().expect("lock poisoned");
        let mut payload = serde_json::to_value(query)?;
        if let Value::Object(body) = &mut payload {
            body.insert("Id".to_owned(), Value::from(id.get()));
        }
        state.record(RecordOperation::Get, collection, payload)?;
        if let Some(message) = state.top_level_failure().or_else(|| state.record_failure()) {
            return Ok(RecordResponse {
                success: false,
                message: Some(message),
                data: None,
            });
        }

        let data = state
            .collections
            .get(collection)
            .and_then(|rows| rows.get(&id))
            .map(decode)
            .transpose()?;

        Ok(RecordResponse {
            success: true,
            message: None,
            data,
        })
    }

    async fn create_record<R, T>(
        &self,
        collection: &str,
        batch: &RecordBatch<R>,
    ) -> Result<BatchResponse<T>, RecordClientError>
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let mut state = self.state.write().expect("lock poisoned");
        state.record(
            RecordOperation::Create,
            collection,
            serde_json::to_value(batch)?,
        )?;
        if let Some(message) = state.top_level_failure() {
            return Ok(BatchResponse {
                success: false,
                message: Some(message),
                results: Vec::new(),
            });
        }

        let mut results = Vec::with_capacity(batch.records.len());
        for record in &batch.records {
            if let Some(message) = state.record_failure() {
                results.push(failed_result(message));
                continue;
            }
            let mut row = into_row(serde_json::to_value(record)?)?;
            let id = self.generate_id();
            row.insert("Id".to_owned(), Value::from(id.get()));
            // Stored before the echo is decoded, like a real backend.
            state
                .collections
                .entry(collection.to_owned())
                .or_default()
                .insert(id, row.clone());
            let data = decode(&row)?;
            results.push(RecordResult {
                success: true,
                message: None,
                data: Some(data),
            });
        }

        Ok(BatchResponse {
            success: true,
            message: None,
            results,
        })
    }

    async fn update_record<R, T>(
        &self,
        collection: &str,
        batch: &RecordBatch<R>,
    ) -> Result<BatchResponse<T>, RecordClientError>
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let mut state = self.state.write().expect("lock poisoned");
        state.record(
            RecordOperation::Update,
            collection,
            serde_json::to_value(batch)?,
        )?;
        if let Some(message) = state.top_level_failure() {
            return Ok(BatchResponse {
                success: false,
                message: Some(message),
                results: Vec::new(),
            });
        }

        let mut results = Vec::with_capacity(batch.records.len());
        for record in &batch.records {
            if let Some(message) = state.record_failure() {
                results.push(failed_result(message));
                continue;
            }
            let mut patch = into_row(serde_json::to_value(record)?)?;
            let id = match patch.remove("Id").map(serde_json::from_value::<RecordId>) {
                Some(Ok(id)) => id,
                _ => {
                    results.push(failed_result("Id is required"));
                    continue;
                }
            };
            let Some(row) = state
                .collections
                .get_mut(collection)
                .and_then(|rows| rows.get_mut(&id))
            else {
                results.push(failed_result(format!("Record {id} not found")));
                continue;
            };
            row.extend(patch);
            results.push(RecordResult {
                success: true,
                message: None,
                data: Some(decode(row)?),
            });
        }

        Ok(BatchResponse {
            success: true,
            message: None,
            results,
        })
    }

    async fn delete_record(
        &self,
        collection: &str,
        request: &DeleteRequest,
    ) -> Result<DeleteResponse, RecordClientError> {
        let mut state = self.state.write().expect("lock poisoned");
        state.record(
            RecordOperation::Delete,
            collection,
            serde_json::to_value(request)?,
        )?;
        if let Some(message) = state.top_level_failure() {
            return Ok(BatchResponse {
                success: false,
                message: Some(message),
                results: Vec::new(),
            });
        }

        let mut results = Vec::with_capacity(request.record_ids.len());
        for id in &request.record_ids {
            if let Some(message) = state.record_failure() {
                results.push(failed_result(message));
                continue;
            }
            let removed = state
                .collections
                .get_mut(collection)
                .and_then(|rows| rows.remove(id))
                .is_some();
            results.push(if removed {
                RecordResult {
                    success: true,
                    message: None,
                    data: None,
                }
            } else {
                failed_result(format!("Record {id} not found"))
            });
        }

        Ok(BatchResponse {
            success: true,
            message: None,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{OrderBy, PagingInfo};
    use serde_json::json;

    #[tokio::test]
    async fn create_persists_even_when_echo_does_not_decode() {
        #[derive(Debug, serde::Deserialize)]
        struct Strict {
            #[allow(dead_code)]
            count_c: u8,
        }

        let client = MockRecordClient::new();
        let batch = RecordBatch::single(json!({"count_c": "many"}));
        let result = client.create_record::<_, Strict>("file_c", &batch).await;

        assert!(matches!(result, Err(RecordClientError::Decode(_))));
        assert_eq!(client.records("file_c").len(), 1);
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let client = MockRecordClient::new();
        let batch = RecordBatch {
            records: vec![json!({"name_c": "a"}), json!({"name_c": "b"})],
        };

        let response: BatchResponse<Value> = client.create_record("file_c", &batch).await.unwrap();

        let ids: Vec<_> = response
            .results
            .iter()
            .map(|result| result.data.as_ref().unwrap()["Id"].clone())
            .collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);
        assert_eq!(client.records("file_c").len(), 2);
    }

    #[tokio::test]
    async fn fetch_filters_orders_and_pages() {
        let client = MockRecordClient::new();
        client.seed("upload_c", json!({"share_link_c": "x", "created_at_c": "2024-01-01"}));
        client.seed("upload_c", json!({"share_link_c": "y", "created_at_c": "2024-03-01"}));
        client.seed("upload_c", json!({"share_link_c": "x", "created_at_c": "2024-02-01"}));

        let query = FetchQuery::page(10)
            .filter(WhereClause::equal_to("share_link_c", "x"))
            .order(OrderBy::desc("created_at_c"));
        let response: FetchResponse<Value> = client.fetch_records("upload_c", &query).await.unwrap();
        let dates: Vec<_> = response
            .data
            .unwrap()
            .into_iter()
            .map(|row| row["created_at_c"].clone())
            .collect();
        assert_eq!(dates, vec![json!("2024-02-01"), json!("2024-01-01")]);

        let mut paged = FetchQuery::page(1).order(OrderBy::desc("created_at_c"));
        paged.paging_info = PagingInfo { limit: 1, offset: 1 };
        let response: FetchResponse<Value> = client.fetch_records("upload_c", &paged).await.unwrap();
        assert_eq!(response.data.unwrap()[0]["created_at_c"], json!("2024-02-01"));
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing_rows() {
        let client = MockRecordClient::new();
        let id = client.seed("file_c", json!({"name_c": "a", "progress_c": 0}));

        let batch = RecordBatch {
            records: vec![
                json!({"Id": id.get(), "progress_c": 40}),
                json!({"Id": 999, "progress_c": 10}),
            ],
        };
        let response: BatchResponse<Value> = client.update_record("file_c", &batch).await.unwrap();

        assert!(response.results[0].success);
        assert_eq!(
            response.results[0].data,
            Some(json!({"Id": id.get(), "name_c": "a", "progress_c": 40}))
        );
        assert!(!response.results[1].success);
    }

    #[tokio::test]
    async fn delete_removes_rows() {
        let client = MockRecordClient::new();
        let id = client.seed("file_c", json!({}));

        let request = DeleteRequest {
            record_ids: vec![id],
        };
        let first = client.delete_record("file_c", &request).await.unwrap();
        let second = client.delete_record("file_c", &request).await.unwrap();

        assert!(first.results[0].success);
        assert!(!second.results[0].success);
        assert!(client.records("file_c").is_empty());
    }

    #[tokio::test]
    async fn injected_failures_are_reported() {
        let client = MockRecordClient::new();

        client.fail_with(MockFailure::Transport);
        let result: Result<FetchResponse<Value>, _> =
            client.fetch_records("file_c", &FetchQuery::page(1)).await;
        assert!(result.is_err());

        client.fail_with(MockFailure::Unsuccessful("denied".to_owned()));
        let response: FetchResponse<Value> =
            client.fetch_records("file_c", &FetchQuery::page(1)).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("denied"));

        client.fail_with(MockFailure::RecordFailed("invalid".to_owned()));
        let response: BatchResponse<Value> = client
            .create_record("file_c", &RecordBatch::single(json!({})))
            .await
            .unwrap();
        assert!(response.success);
        assert!(!response.results[0].success);

        client.clear_failure();
        assert_eq!(client.requests().len(), 3);
    }
}
