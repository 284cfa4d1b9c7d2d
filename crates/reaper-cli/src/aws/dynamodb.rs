//! DynamoTrackingStore - DynamoDB の追跡ストア
//!
//! アイテムの形式（以前のデプロイと共通）:
//!
//! | 属性        | 型   | 意味                                         |
//! |-------------|------|----------------------------------------------|
//! | `id`        | S    | volume id (partition key)                    |
//! | `context`   | S    | first-observed timestamp, ISO 8601           |
//! | `expire_dt` | S    | `expire_at` rendered as ISO 8601, for humans |
//! | `expire_at` | N    | epoch seconds; the table's TTL attribute     |

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

use reaper_core::domain::{StoreError, TrackingRecord};
use reaper_core::ports::TrackingStore;

const ID: &str = "id";
const CONTEXT: &str = "context";
const EXPIRE_DT: &str = "expire_dt";
const EXPIRE_AT: &str = "expire_at";

pub struct DynamoTrackingStore {
    client: Client,
    table_name: String,
}

impl DynamoTrackingStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl TrackingStore for DynamoTrackingStore {
    async fn get(&self, id: &str) -> Result<Option<TrackingRecord>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ID, AttributeValue::S(id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| StoreError::Read {
                id: id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.item().and_then(|item| record_from_item(id, item)))
    }

    async fn put(&self, record: &TrackingRecord) -> Result<(), StoreError> {
        let mut request = self.client.put_item().table_name(&self.table_name);
        for (name, value) in item_from_record(record) {
            request = request.item(name, value);
        }
        request.send().await.map_err(|e| StoreError::Write {
            id: record.id.clone(),
            message: DisplayErrorContext(&e).to_string(),
        })?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(ID, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Delete {
                id: id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}

fn item_from_record(record: &TrackingRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (ID.to_string(), AttributeValue::S(record.id.clone())),
        (
            CONTEXT.to_string(),
            AttributeValue::S(record.first_observed_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        ),
        (
            EXPIRE_DT.to_string(),
            AttributeValue::S(record.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
        (
            EXPIRE_AT.to_string(),
            AttributeValue::N(record.expires_at.timestamp().to_string()),
        ),
    ])
}

/// An item with an empty or unreadable `context` counts as absent; the
/// tracker will start a fresh clock for it.
fn record_from_item(id: &str, item: &HashMap<String, AttributeValue>) -> Option<TrackingRecord> {
    let context = item.get(CONTEXT).and_then(|v| v.as_s().ok())?;
    if context.is_empty() {
        return None;
    }

    let Some(first_observed_at) = parse_timestamp(context) else {
        warn!(resource_id = %id, context = %context, "unreadable tracking timestamp, ignoring record");
        return None;
    };

    let expires_at = item
        .get(EXPIRE_AT)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(first_observed_at);

    Some(TrackingRecord {
        id: id.to_string(),
        first_observed_at,
        expires_at,
    })
}

/// RFC 3339, or a naive ISO 8601 timestamp (written by the original
/// function, which ran in UTC).
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_string())
    }

    #[test]
    fn record_survives_item_conversion() {
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap();
        let record = TrackingRecord::start("vol-1", t0, 7);

        let item = item_from_record(&record);
        assert_eq!(item.get(EXPIRE_AT), Some(&AttributeValue::N((t0 + Duration::days(9)).timestamp().to_string())));
        assert_eq!(item.get(EXPIRE_DT), Some(&s("2024-02-10T08:30:00Z")));

        assert_eq!(record_from_item("vol-1", &item), Some(record));
    }

    #[test]
    fn naive_legacy_context_is_read_as_utc() {
        let item = HashMap::from([
            (ID.to_string(), s("vol-1")),
            (CONTEXT.to_string(), s("2024-02-01T08:30:00.123456")),
            (EXPIRE_AT.to_string(), AttributeValue::N("1707554400".to_string())),
        ]);

        let record = record_from_item("vol-1", &item).expect("parsed");
        assert_eq!(
            record.first_observed_at,
            Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap() + Duration::microseconds(123456)
        );
        assert_eq!(record.expires_at.timestamp(), 1707554400);
    }

    #[test]
    fn empty_or_garbage_context_is_absent() {
        let empty = HashMap::from([(CONTEXT.to_string(), s(""))]);
        let garbage = HashMap::from([(CONTEXT.to_string(), s("yesterday"))]);
        let missing = HashMap::from([(ID.to_string(), s("vol-1"))]);

        assert!(record_from_item("vol-1", &empty).is_none());
        assert!(record_from_item("vol-1", &garbage).is_none());
        assert!(record_from_item("vol-1", &missing).is_none());
    }
}
