//! Term validation
//!
//! Three stages run before anything touches the store:
//! 1. **Shape** ([`validate_record`]): exactly `id`, `type`, `term`, `title`,
//!    all strings, `id` a canonical UUID.
//! 2. **Batch** ([`validate_batch`]): non-empty, every `type` equal to the
//!    first record's, every record shape-valid.
//! 3. **Uniqueness** ([`validate_uniqueness`]): `id`, `term` and `title`
//!    values unique across the batch (`type` is expected to repeat).
//!
//! The validators return plain booleans; diagnostics go to the supplied
//! [`TermsLogger`]. [`parse_batch`] and [`prepare_batch`] wrap them into
//! `Result`s carrying typed [`TermRecord`]s for the write path.

use crate::logger::TermsLogger;
use crate::model::{snake_case, TermRecord, RECORD_FIELDS};
use crate::uuid_utils;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Fields that must be unique within a batch, in reporting order
pub const UNIQUE_FIELDS: [&str; 3] = ["id", "term", "title"];

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn log_offending(record: &Value, logger: &dyn TermsLogger) {
    let pretty = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string());
    logger.log(&format!("Offending term:\n{}", pretty));
}

/// Validate the shape of a single raw record
///
/// Diagnostics are only emitted when `debug` is set.
pub fn validate_record(record: &Value, debug: bool, logger: &dyn TermsLogger) -> bool {
    let Some(fields) = record.as_object() else {
        if debug {
            logger.log(&format!(
                "Term was not an object: <{}>. Expected <object>.",
                json_type(record)
            ));
            log_offending(record, logger);
        }
        return false;
    };

    for (key, value) in fields {
        if !RECORD_FIELDS.contains(&key.as_str()) {
            if debug {
                logger.log(&format!("Term had an invalid key: {}", key));
                log_offending(record, logger);
            }
            return false;
        }

        let Some(text) = value.as_str() else {
            if debug {
                logger.log(&format!(
                    "Term had an invalid value type: <{}>. Expected <string>.",
                    json_type(value)
                ));
                log_offending(record, logger);
            }
            return false;
        };

        if key == "id" && !uuid_utils::is_canonical(text) {
            if debug {
                logger.log(&format!("Term had an id that was not a valid UUID: {}", text));
                log_offending(record, logger);
            }
            return false;
        }
    }

    if fields.len() != RECORD_FIELDS.len() {
        if debug {
            logger.log(&format!(
                "Term had an incorrect number of keys. Got {}. Expected exactly {}",
                fields.len(),
                RECORD_FIELDS.len()
            ));
            logger.log(&format!(
                "NOTE: A term requires the following keys:\n {}",
                RECORD_FIELDS.join("\n ")
            ));
            log_offending(record, logger);
        }
        return false;
    }

    true
}

/// Validate a raw batch: anchor type, type consistency and per-record shape
///
/// A missing or unusable anchor `type` is always reported; the remaining
/// diagnostics only when `debug` is set. Stops at the first failure.
pub fn validate_batch(records: &[Value], debug: bool, logger: &dyn TermsLogger) -> bool {
    let Some(first) = records.first() else {
        logger.log("Term(s) invalid: the batch is empty.");
        return false;
    };

    let anchor = first
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !snake_case(t).is_empty());
    let Some(anchor) = anchor else {
        logger.log("Term(s) invalid at index 0, no type property.");
        log_offending(first, logger);
        return false;
    };

    for (i, record) in records.iter().enumerate() {
        if let Some(record_type) = record.get("type") {
            if record_type.as_str() != Some(anchor) {
                if debug {
                    logger.log(&format!(
                        "Term type value mismatch at index {}. All type properties must have the same value of '{}'",
                        i, anchor
                    ));
                    log_offending(record, logger);
                }
                return false;
            }
        }

        if !validate_record(record, debug, logger) {
            return false;
        }
    }

    debug!(count = records.len(), record_type = anchor, "Batch shape validated");
    true
}

fn field_value<'a>(record: &'a TermRecord, field: &str) -> &'a str {
    match field {
        "id" => &record.id,
        "term" => &record.term,
        "title" => &record.title,
        _ => &record.record_type,
    }
}

fn first_duplicate_field(records: &[TermRecord]) -> Option<&'static str> {
    UNIQUE_FIELDS.into_iter().find(|field| {
        let values: HashSet<&str> = records.iter().map(|r| field_value(r, field)).collect();
        values.len() < records.len()
    })
}

/// Check `id`, `term` and `title` uniqueness across a batch
///
/// Reports only the first violated field, in the order `id`, `term`, `title`.
pub fn validate_uniqueness(records: &[TermRecord], logger: &dyn TermsLogger) -> bool {
    match first_duplicate_field(records) {
        Some(field) => {
            logger.log(&format!(
                "ERROR: A term object in the array had a non-unique value.\n\
                 Every value in a term object except the type property must be unique.\n\
                 The problematic term object property was: {}",
                field
            ));
            false
        }
        None => true,
    }
}

/// Validate a raw batch and convert it into typed records
pub fn parse_batch(records: &[Value], debug: bool, logger: &dyn TermsLogger) -> Result<Vec<TermRecord>> {
    if !validate_batch(records, debug, logger) {
        return Err(Error::Shape(
            "the batch failed shape or type validation".to_string(),
        ));
    }

    records
        .iter()
        .map(|raw| {
            serde_json::from_value::<TermRecord>(raw.clone())
                .map_err(|e| Error::Shape(e.to_string()))
        })
        .collect()
}

/// Full pre-write validation: shape, type consistency and uniqueness
pub fn prepare_batch(records: &[Value], debug: bool, logger: &dyn TermsLogger) -> Result<Vec<TermRecord>> {
    let batch = parse_batch(records, debug, logger)?;
    check_uniqueness(&batch, logger)?;
    Ok(batch)
}

/// [`validate_uniqueness`] as a `Result`
pub fn check_uniqueness(records: &[TermRecord], logger: &dyn TermsLogger) -> Result<()> {
    if validate_uniqueness(records, logger) {
        return Ok(());
    }
    let field = first_duplicate_field(records).unwrap_or("id");
    Err(Error::Uniqueness(format!("duplicate '{}' values in batch", field)))
}
