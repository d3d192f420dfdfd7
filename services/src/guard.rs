//! The never-throw boundary of the record services.
//!
//! Service methods do their work as `Result<T, ServiceError>` and hand it to
//! [`guarded`], which logs any failure and substitutes `T::default()`:
//! an empty list, `None`, or `false`. Callers only ever see the absence of
//! a result.

use crate::file_ids::FileIdsError;
use crate::records::{InvalidRecordId, RecordClientError};
use std::future::Future;

/// Every way a single service call can fail.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("record client not initialized")]
    ClientUnavailable,

    #[error("record API reported failure: {0}")]
    Unsuccessful(String),

    #[error("record operation failed: {0}")]
    RecordFailed(String),

    #[error(transparent)]
    InvalidId(#[from] InvalidRecordId),

    #[error(transparent)]
    InvalidFileIds(#[from] FileIdsError),

    #[error(transparent)]
    Client(#[from] RecordClientError),
}

impl ServiceError {
    pub(crate) fn unsuccessful(message: Option<String>) -> Self {
        Self::Unsuccessful(message.unwrap_or_else(|| "no message".to_owned()))
    }
}

/// Run `call`, converting any failure into the neutral default.
pub async fn guarded<T, F>(operation: &'static str, call: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, ServiceError>>,
{
    match call.await {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(operation, error = %err, "record call failed, returning default");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_values_through() {
        let value = guarded("test.ok", async { Ok(vec![1, 2]) }).await;
        assert_eq!(value, vec![1, 2]);
    }

    #[tokio::test]
    async fn failures_become_neutral_defaults() {
        let list: Vec<u8> = guarded("test.list", async { Err(ServiceError::ClientUnavailable) }).await;
        let record: Option<String> = guarded("test.record", async {
            Err(ServiceError::Unsuccessful("denied".to_owned()))
        })
        .await;
        let deleted: bool = guarded("test.delete", async {
            Err(ServiceError::RecordFailed("missing".to_owned()))
        })
        .await;

        assert!(list.is_empty());
        assert!(record.is_none());
        assert!(!deleted);
    }
}
