//! Record backend access.
//!
//! The backend exposes generic CRUD over named collections ("tables").
//! [`RecordClient`] is the seam the file and upload services are written
//! against; [`HttpRecordClient`] talks to the hosted API and
//! [`MockRecordClient`] keeps everything in memory for tests.

mod http;
mod mock;
mod traits;
mod types;

pub use http::HttpRecordClient;
pub use mock::{MockFailure, MockRecordClient, RecordOperation, RecordedRequest};
pub use traits::RecordClient;
pub use types::{
    BatchResponse, DeleteRequest, DeleteResponse, FetchQuery, FetchResponse, IntoRecordId,
    InvalidRecordId, Keyed, Operator, OrderBy, PagingInfo, RecordBatch, RecordClientError,
    RecordId, RecordQuery, RecordResponse, RecordResult, SortType, WhereClause,
};
pub(crate) use types::{WholeNumber, null_as_default, present, whole_number};
