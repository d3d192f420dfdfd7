//! Record client trait.

use super::types::{
    BatchResponse, DeleteRequest, DeleteResponse, FetchQuery, FetchResponse, RecordBatch,
    RecordClientError, RecordId, RecordQuery, RecordResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Generic CRUD access to named collections on the record backend.
///
/// See [module documentation](super) for the available implementations.
pub trait RecordClient: Clone + Send + Sync + 'static {
    fn fetch_records<T>(
        &self,
        collection: &str,
        query: &FetchQuery,
    ) -> impl Future<Output = Result<FetchResponse<T>, RecordClientError>> + Send
    where
        T: DeserializeOwned + Send;

    fn get_record_by_id<T>(
        &self,
        collection: &str,
        id: RecordId,
        query: &RecordQuery,
    ) -> impl Future<Output = Result<RecordResponse<T>, RecordClientError>> + Send
    where
        T: DeserializeOwned + Send;

    fn create_record<R, T>(
        &self,
        collection: &str,
        batch: &RecordBatch<R>,
    ) -> impl Future<Output = Result<BatchResponse<T>, RecordClientError>> + Send
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send;

    fn update_record<R, T>(
        &self,
        collection: &str,
        batch: &RecordBatch<R>,
    ) -> impl Future<Output = Result<BatchResponse<T>, RecordClientError>> + Send
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send;

    fn delete_record(
        &self,
        collection: &str,
        request: &DeleteRequest,
    ) -> impl Future<Output = Result<DeleteResponse, RecordClientError>> + Send;
}
