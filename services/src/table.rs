//! One collection on the record backend, seen through an optional client.
//!
//! Both record services are thin shapes over [`Table`]: it owns the
//! "is there a client" check and the interpretation of success flags, so
//! each service only decides what to send and what to return.

use crate::guard::ServiceError;
use crate::records::{
    DeleteRequest, FetchQuery, Keyed, RecordBatch, RecordClient, RecordId, RecordQuery,
    RecordResult,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Clone, Debug)]
pub(crate) struct Table<C> {
    client: Option<C>,
    collection: &'static str,
}

impl<C: RecordClient> Table<C> {
    pub(crate) fn new(client: Option<C>, collection: &'static str) -> Self {
        Self { client, collection }
    }

    pub(crate) fn is_available(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&C, ServiceError> {
        self.client.as_ref().ok_or(ServiceError::ClientUnavailable)
    }

    pub(crate) async fn fetch<T>(&self, query: FetchQuery) -> Result<Vec<T>, ServiceError>
    where
        T: DeserializeOwned + Send,
    {
        let response = self
            .client()?
            .fetch_records::<Value>(self.collection, &query)
            .await?;
        if !response.success {
            return Err(ServiceError::unsuccessful(response.message));
        }
        let rows = response.data.unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(
                        collection = self.collection,
                        error = %err,
                        "skipping undecodable row"
                    );
                    None
                }
            })
            .collect())
    }

    pub(crate) async fn get<T>(&self, id: RecordId) -> Result<Option<T>, ServiceError>
    where
        T: DeserializeOwned + Send,
    {
        let response = self
            .client()?
            .get_record_by_id(self.collection, id, &RecordQuery::default())
            .await?;
        if !response.success {
            return Err(ServiceError::unsuccessful(response.message));
        }
        Ok(response.data)
    }

    pub(crate) async fn create<R, T>(&self, record: R) -> Result<Option<T>, ServiceError>
    where
        R: Serialize + Send + Sync,
        T: DeserializeOwned + Send,
    {
        let response = self
            .client()?
            .create_record(self.collection, &RecordBatch::single(record))
            .await?;
        if !response.success {
            return Err(ServiceError::unsuccessful(response.message));
        }
        first_data(response.results)
    }

    pub(crate) async fn update<P, T>(
        &self,
        id: RecordId,
        fields: P,
    ) -> Result<Option<T>, ServiceError>
    where
        P: Serialize + Send + Sync,
        T: DeserializeOwned + Send,
    {
        let response = self
            .client()?
            .update_record(self.collection, &RecordBatch::single(Keyed { id, fields }))
            .await?;
        if !response.success {
            return Err(ServiceError::unsuccessful(response.message));
        }
        first_data(response.results)
    }

    pub(crate) async fn delete(&self, id: RecordId) -> Result<bool, ServiceError> {
        let request = DeleteRequest {
            record_ids: vec![id],
        };
        let response = self
            .client()?
            .delete_record(self.collection, &request)
            .await?;
        if !response.success {
            return Err(ServiceError::unsuccessful(response.message));
        }
        match response.results.into_iter().next() {
            Some(result) if result.success => Ok(true),
            Some(result) => Err(ServiceError::RecordFailed(
                result.message.unwrap_or_else(|| format!("delete of {id} rejected")),
            )),
            None => Err(ServiceError::RecordFailed("no result returned".to_owned())),
        }
    }
}

// A batch of one succeeded overall; its single per-record result decides.
fn first_data<T>(results: Vec<RecordResult<T>>) -> Result<Option<T>, ServiceError> {
    match results.into_iter().next() {
        Some(result) if result.success => Ok(result.data),
        Some(result) => Err(ServiceError::RecordFailed(
            result.message.unwrap_or_else(|| "no message".to_owned()),
        )),
        None => Err(ServiceError::RecordFailed("no result returned".to_owned())),
    }
}
