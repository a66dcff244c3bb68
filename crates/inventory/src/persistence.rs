//! Serialized form of the whole inventory collection.
//!
//! Written as `{"version": 1, "records": [...]}`. The unversioned bare array
//! written by the earlier browser client is still readable and is upgraded on
//! the next write.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::record::MattressRecord;

/// Well-known key the collection lives under.
pub const STORAGE_KEY: &str = "mattressInventory";

/// Suffix of the side key an unreadable blob is copied to before it can be overwritten.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

pub const FORMAT_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed inventory document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported inventory format version {0}")]
    UnsupportedVersion(u64),

    #[error("inventory document is neither a record list nor a versioned envelope")]
    UnexpectedShape,
}

#[derive(Serialize)]
struct Envelope<'a> {
    version: u64,
    records: &'a [MattressRecord],
}

pub fn encode(records: &[MattressRecord]) -> Result<String, FormatError> {
    Ok(serde_json::to_string(&Envelope {
        version: FORMAT_VERSION,
        records,
    })?)
}

/// A decoded collection.
///
/// Records that do not match the record schema are not fatal: they are counted
/// in `rejected` and left out of `records`.
#[derive(Debug, Default)]
pub struct Decoded {
    pub records: Vec<MattressRecord>,
    pub rejected: usize,
}

/// Decode a stored blob into records, newest first as written.
///
/// Only the document shape is fatal. Each array element is converted on its own.
pub fn decode(blob: &str) -> Result<Decoded, FormatError> {
    let elements = match serde_json::from_str::<Value>(blob)? {
        Value::Array(elements) => elements,
        Value::Object(mut envelope) => {
            let version = envelope
                .get("version")
                .and_then(Value::as_u64)
                .ok_or(FormatError::UnexpectedShape)?;
            if version != FORMAT_VERSION {
                return Err(FormatError::UnsupportedVersion(version));
            }
            match envelope.remove("records") {
                Some(Value::Array(elements)) => elements,
                _ => return Err(FormatError::UnexpectedShape),
            }
        }
        _ => return Err(FormatError::UnexpectedShape),
    };

    let mut decoded = Decoded::default();
    for element in elements {
        match serde_json::from_value::<MattressRecord>(element) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable inventory record");
                decoded.rejected += 1;
            }
        }
    }
    Ok(decoded)
}
