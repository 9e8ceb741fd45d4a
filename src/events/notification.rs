//! Object-created notification documents
//!
//! The storage service delivers notifications as JSON:
//!
//! ```json
//! {"Records": [{"s3": {"bucket": {"name": "lake"}, "object": {"key": "raw_data/a.parquet"}}}]}
//! ```
//!
//! Keys arrive form-encoded (`+` for spaces, `%XX` escapes).

use super::bus::StorageEvent;
use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<NotificationRecord>,
}

#[derive(Debug, Deserialize)]
struct NotificationRecord {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

/// Parse a notification document into events, decoding every key
pub fn parse_notification(json: &str) -> Result<Vec<StorageEvent>> {
    let notification: Notification = serde_json::from_str(json)?;
    notification
        .records
        .into_iter()
        .map(|record| {
            let key = decode_key(&record.s3.object.key)?;
            Ok(StorageEvent::new(record.s3.bucket.name, key))
        })
        .collect()
}

/// Decode a form-encoded object key
pub fn decode_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| Error::decode(format!("Invalid object key '{raw}': {e}")))
}
