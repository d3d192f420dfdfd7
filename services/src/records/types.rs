//! Wire types of the record API.
//!
//! Field names follow the backend exactly (`FieldName`, `pagingInfo`,
//! `RecordIds`, ...), so everything here is annotated rather than renamed
//! wholesale.

use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Integer identity assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid record id: {0:?}")]
pub struct InvalidRecordId(pub String);

impl RecordId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parse the leading integer of `raw`.
    ///
    /// Leading whitespace and a sign are accepted and anything after the
    /// first non-digit is ignored, so `" 42px"` is `42`. Input with no
    /// leading digits is rejected.
    pub fn parse(raw: &str) -> Result<Self, InvalidRecordId> {
        let trimmed = raw.trim_start();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        if end == 0 {
            return Err(InvalidRecordId(raw.to_owned()));
        }
        let value: i64 = digits[..end]
            .parse()
            .map_err(|_| InvalidRecordId(raw.to_owned()))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordIdVisitor;

        impl Visitor<'_> for RecordIdVisitor {
            type Value = RecordId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer record id or a string starting with one")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
                Ok(RecordId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
                i64::try_from(v)
                    .map(RecordId)
                    .map_err(|_| E::custom(format!("record id {v} out of range")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<RecordId, E> {
                if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    Ok(RecordId(v as i64))
                } else {
                    Err(E::custom(format!("record id {v} is not an integer")))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
                RecordId::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(RecordIdVisitor)
    }
}

/// Anything a caller may hand a service as an identifier.
///
/// Every service coerces its `id` argument through this before talking to
/// the backend.
pub trait IntoRecordId {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId>;
}

impl IntoRecordId for RecordId {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId> {
        Ok(self)
    }
}

impl IntoRecordId for i64 {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId> {
        Ok(RecordId(self))
    }
}

impl IntoRecordId for i32 {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId> {
        Ok(RecordId(i64::from(self)))
    }
}

impl IntoRecordId for u32 {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId> {
        Ok(RecordId(i64::from(self)))
    }
}

impl IntoRecordId for &str {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId> {
        RecordId::parse(self)
    }
}

impl IntoRecordId for &String {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId> {
        RecordId::parse(self)
    }
}

impl IntoRecordId for String {
    fn into_record_id(self) -> Result<RecordId, InvalidRecordId> {
        RecordId::parse(&self)
    }
}

/// Filter operator. Only equality is used by this application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl WhereClause {
    pub fn equal_to(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            operator: Operator::EqualTo,
            values: vec![value.into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub sort_type: SortType,
}

impl OrderBy {
    pub fn desc(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            sort_type: SortType::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    pub limit: u32,
    pub offset: u32,
}

impl PagingInfo {
    pub const fn first(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }
}

/// Body of `fetch_records`. An empty `fields` list selects every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub fields: Vec<String>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<WhereClause>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(rename = "pagingInfo")]
    pub paging_info: PagingInfo,
}

impl FetchQuery {
    pub fn page(limit: u32) -> Self {
        Self {
            fields: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            paging_info: PagingInfo::first(limit),
        }
    }

    pub fn filter(mut self, clause: WhereClause) -> Self {
        self.filters.push(clause);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }
}

/// Body of `get_record_by_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub fields: Vec<String>,
}

/// Body of `create_record` and `update_record`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordBatch<R> {
    pub records: Vec<R>,
}

impl<R> RecordBatch<R> {
    pub fn single(record: R) -> Self {
        Self {
            records: vec![record],
        }
    }
}

/// An update payload tagged with the record it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyed<P> {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: P,
}

/// Body of `delete_record`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct FetchResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<T>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct RecordResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Per-record outcome inside a batch response.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct RecordResult<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct BatchResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<RecordResult<T>>,
}

/// Delete results carry no payload.
pub type DeleteResponse = BatchResponse<Value>;

/// Failure to complete a round trip with the backend at all.
///
/// A well-formed `{"success": false}` reply is not an error at this level;
/// the services interpret those flags themselves.
#[derive(Debug, thiserror::Error)]
pub enum RecordClientError {
    #[error("record API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("record API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("record API payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Deserialize a field that is present, keeping an explicit `null` as
/// `Some(None)` so it can be told apart from an absent field.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserialize a field whose `null` means the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A non-negative integer that may arrive as `5`, `5.0` or `"5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WholeNumber(pub u64);

impl<'de> Deserialize<'de> for WholeNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WholeNumberVisitor;

        impl Visitor<'_> for WholeNumberVisitor {
            type Value = WholeNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative whole number")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WholeNumber, E> {
                Ok(WholeNumber(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WholeNumber, E> {
                u64::try_from(v)
                    .map(WholeNumber)
                    .map_err(|_| E::custom(format!("{v} is negative")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<WholeNumber, E> {
                if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 {
                    Ok(WholeNumber(v as u64))
                } else {
                    Err(E::custom(format!("{v} is not a whole number")))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WholeNumber, E> {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| E::custom(format!("{v:?} is not a number")))
                    .and_then(|n| self.visit_f64(n))
            }
        }

        deserializer.deserialize_any(WholeNumberVisitor)
    }
}

/// Deserialize an optional count, tolerating `null` and float encodings.
pub(crate) fn whole_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WholeNumber>::deserialize(deserializer)?.map(|n| n.0))
}
