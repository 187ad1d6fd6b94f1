//! Conversion of untyped store documents into [`WasteRecord`]s.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::model::{WasteCategory, WasteRecord};

/// An untyped document as delivered by a record source.
pub type Document = Map<String, Value>;

/// Field holding the weighing time.
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// Field holding the weight in kilograms.
pub const FIELD_WEIGHT: &str = "berat";
/// Field holding the category label.
pub const FIELD_CATEGORY: &str = "jenis";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a document cannot take part in aggregation.
pub enum RecordError {
    /// The document has no usable timestamp.
    #[error("Missing or unreadable timestamp")]
    MissingTimestamp,
}

/// Decode a document into a typed record.
///
/// A weight that is absent, non-numeric, non-finite or negative decodes to `0.0`.
/// A missing or unrecognised category decodes to `None`. Only the timestamp
/// can reject a document.
///
/// # Errors
///
/// Returns [`RecordError::MissingTimestamp`] when the timestamp is missing or unreadable.
pub fn decode_record(document: &Document) -> Result<WasteRecord, RecordError> {
    let timestamp = document_timestamp(document).ok_or(RecordError::MissingTimestamp)?;

    let category = document
        .get(FIELD_CATEGORY)
        .and_then(Value::as_str)
        .and_then(WasteCategory::from_label);

    let weight_kg = document.get(FIELD_WEIGHT).map_or(0.0, decode_weight);

    Ok(WasteRecord {
        timestamp,
        weight_kg,
        category,
    })
}

/// Timestamp of a document, if it has a readable one.
#[must_use]
pub fn document_timestamp(document: &Document) -> Option<DateTime<Utc>> {
    document.get(FIELD_TIMESTAMP).and_then(decode_timestamp)
}

fn decode_weight(value: &Value) -> f64 {
    value
        .as_f64()
        .filter(|weight| weight.is_finite() && *weight >= 0.0)
        .unwrap_or(0.0)
}

// Store timestamps arrive either as RFC 3339 strings or as
// `{ seconds, nanoseconds }` objects (optionally underscore-prefixed).
fn decode_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        Value::Object(fields) => {
            let seconds = fields
                .get("seconds")
                .or_else(|| fields.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = fields
                .get("nanoseconds")
                .or_else(|| fields.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|nanos| u32::try_from(nanos).ok())
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            other => panic!("test document must be an object, got {other}"),
        }
    }

    #[test]
    fn decodes_rfc3339_record() {
        let record = decode_record(&document(json!({
            "timestamp": "2026-10-19T09:00:00+07:00",
            "berat": 2.5,
            "jenis": "Organik",
        })))
        .expect("record should decode");

        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2026, 10, 19, 2, 0, 0)
                .single()
                .expect("valid instant")
        );
        assert_eq!(record.category, Some(WasteCategory::Organic));
        assert!((record.weight_kg - 2.5).abs() < f64::EPSILON, "weight was {}", record.weight_kg);
    }

    #[test]
    fn decodes_seconds_object_timestamp() {
        let record = decode_record(&document(json!({
            "timestamp": { "seconds": 1_760_864_400, "nanoseconds": 500_000_000 },
            "berat": 1,
            "jenis": "Residu",
        })))
        .expect("record should decode");

        assert_eq!(record.timestamp.timestamp(), 1_760_864_400);
        assert_eq!(record.timestamp.timestamp_subsec_millis(), 500);
        assert!((record.weight_kg - 1.0).abs() < f64::EPSILON, "integer weights are numeric");
    }

    #[test]
    fn malformed_weight_counts_as_zero() {
        for weight in [json!("3.2"), json!(null), json!(-4.0), json!({ "kg": 1 })] {
            let record = decode_record(&document(json!({
                "timestamp": "2026-10-19T09:00:00Z",
                "berat": weight,
                "jenis": "Anorganik",
            })))
            .expect("weight never rejects a record");
            assert!(record.weight_kg.abs() < f64::EPSILON, "weight was {}", record.weight_kg);
        }

        let record = decode_record(&document(json!({
            "timestamp": "2026-10-19T09:00:00Z",
            "jenis": "Anorganik",
        })))
        .expect("absent weight never rejects a record");
        assert!(record.weight_kg.abs() < f64::EPSILON, "weight was {}", record.weight_kg);
    }

    #[test]
    fn only_a_missing_timestamp_rejects_a_record() {
        assert_eq!(
            decode_record(&document(json!({ "berat": 1.0, "jenis": "Organik" }))),
            Err(RecordError::MissingTimestamp)
        );
        assert_eq!(
            decode_record(&document(json!({
                "timestamp": "yesterday",
                "berat": 1.0,
                "jenis": "Organik",
            }))),
            Err(RecordError::MissingTimestamp)
        );
    }

    #[test]
    fn unknown_or_missing_category_keeps_the_record() {
        let unknown = decode_record(&document(json!({
            "timestamp": "2026-10-19T09:00:00Z",
            "berat": 3.0,
            "jenis": "Kaca",
        })))
        .expect("an unknown category only blanks the field");
        assert_eq!(unknown.category, None);
        assert!((unknown.weight_kg - 3.0).abs() < f64::EPSILON, "weight was {}", unknown.weight_kg);

        let missing = decode_record(&document(json!({
            "timestamp": "2026-10-19T09:00:00Z",
            "berat": 2.0,
        })))
        .expect("a missing category only blanks the field");
        assert_eq!(missing.category, None);

        let numeric = decode_record(&document(json!({
            "timestamp": "2026-10-19T09:00:00Z",
            "jenis": 7,
        })))
        .expect("a non-string category only blanks the field");
        assert_eq!(numeric.category, None);
    }
}
