//! Record client speaking JSON over HTTP.

use super::traits::RecordClient;
use super::types::{
    BatchResponse, DeleteRequest, DeleteResponse, FetchQuery, FetchResponse, RecordBatch,
    RecordClientError, RecordId, RecordQuery, RecordResponse,
};
use crate::config::{Config, RecordApiSettings};
use anyhow::Context;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

const PROJECT_HEADER: &str = "X-Project-Id";
const PUBLIC_KEY_HEADER: &str = "X-Public-Key";

/// [`RecordClient`] backed by the hosted record API.
///
/// Routes, relative to the configured base URL:
/// - `POST   /tables/{collection}/fetch`
/// - `POST   /tables/{collection}/records/{id}`
/// - `POST   /tables/{collection}/records` (create)
/// - `PUT    /tables/{collection}/records` (update)
/// - `DELETE /tables/{collection}/records`
#[derive(Clone, Debug)]
pub struct HttpRecordClient {
    client: Client,
    base_url: String,
    project_id: String,
    public_key: String,
}

impl HttpRecordClient {
    pub fn new(settings: &RecordApiSettings) -> Result<Self, RecordClientError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            project_id: settings.project_id.clone(),
            public_key: settings.public_key.clone(),
        })
    }

    /// Build a client when the configuration names a record backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        config
            .record_api()
            .map(|settings| Self::new(settings).context("Failed to create record API client"))
            .transpose()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, collection: &str, suffix: &str) -> String {
        format!("{}/tables/{}/{}", self.base_url, collection, suffix)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RecordClientError> {
        let response = request
            .header(PROJECT_HEADER, self.project_id.as_str())
            .header(PUBLIC_KEY_HEADER, self.public_key.as_str())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(RecordClientError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

impl RecordClient for HttpRecordClient {
    async fn fetch_records<T>(
        &self,
        collection: &str,
        query: &FetchQuery,
    ) -> Result<FetchResponse<T>, RecordClientError>
    where
        T: DeserializeOwned + Send,
    {
        tracing::debug!(collection, limit = query.paging_info.limit, "fetch records");
        let request = self
            .client
            .post(self.table_url(collection, "fetch"))
            .json(query);
        self.send(request).await
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
        tracing::debug!(collection, %id, "get record");
        let request = self
            .client
            .post(self.table_url(collection, &format!("records/{id}")))
            .json(query);
        self.send(request).await
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
        tracing::debug!(collection, count = batch.records.len(), "create records");
        let request = self
            .client
            .post(self.table_url(collection, "records"))
            .json(batch);
        self.send(request).await
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
        tracing::debug!(collection, count = batch.records.len(), "update records");
        let request = self
            .client
            .put(self.table_url(collection, "records"))
            .json(batch);
        self.send(request).await
    }

    async fn delete_record(
        &self,
        collection: &str,
        request: &DeleteRequest,
    ) -> Result<DeleteResponse, RecordClientError> {
        tracing::debug!(collection, count = request.record_ids.len(), "delete records");
        let request = self
            .client
            .delete(self.table_url(collection, "records"))
            .json(request);
        self.send(request).await
    }
}
