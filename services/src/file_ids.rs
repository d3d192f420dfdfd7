//! Comma-joined file id lists.
//!
//! Upload records persist their files as `"3,7,12"`. The codec keeps order
//! and maps the empty list to the empty string and back.

use crate::records::RecordId;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid file id {segment:?} at position {position}")]
pub struct FileIdsError {
    pub segment: String,
    pub position: usize,
}

pub fn encode(ids: &[RecordId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a joined list. Whitespace around ids and empty segments are ignored.
pub fn decode(joined: &str) -> Result<Vec<RecordId>, FileIdsError> {
    joined
        .split(',')
        .map(str::trim)
        .enumerate()
        .filter(|(_, segment)| !segment.is_empty())
        .map(|(position, segment)| {
            segment
                .parse::<i64>()
                .map(RecordId::new)
                .map_err(|_| FileIdsError {
                    segment: segment.to_owned(),
                    position,
                })
        })
        .collect()
}

/// Read `files_c` as stored (joined string), as a JSON list, or as null.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Joined(String),
        List(Vec<RecordId>),
    }

    match Option::<Stored>::deserialize(deserializer)? {
        Some(Stored::Joined(joined)) => decode(&joined).map_err(serde::de::Error::custom),
        Some(Stored::List(ids)) => Ok(ids),
        None => Ok(Vec::new()),
    }
}
