//! Versioned migration of persisted documents.
//!
//! Legacy attribute values are rewritten once, at load time, so that the rest
//! of the engine only ever sees current vocabulary.

use log::{debug, warn};
use serde_json::Value;

use super::{
    kind::AttributeKind,
    record::{Document, Record, RecordError, type_tag},
    schema::{AttributeSlot, DIMENSIONS},
};

/// Version written by [`Session::save`](crate::Session::save).
pub const CURRENT_VERSION: u32 = 2;

struct ValueMigration {
    slot: AttributeSlot,
    rewrite: fn(&str) -> Option<String>,
}

fn padding_zeros(value: &str) -> Option<String> {
    (value == "zeros").then(|| "valid".to_string())
}

fn return_output(value: &str) -> Option<String> {
    (value == "output").then(|| "last".to_string())
}

fn loss_snake_case(value: &str) -> Option<String> {
    (value == "cross_entropy").then(|| "crossentropy".to_string())
}

fn unknown_dimension(value: &str) -> Option<String> {
    (!DIMENSIONS.contains(&value)).then(|| "2D".to_string())
}

fn bare_metrics(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with('[') {
        return None;
    }
    Some(format!("[{trimmed}]"))
}

const MIGRATIONS: &[ValueMigration] = &[
    ValueMigration {
        slot: AttributeSlot::PaddingType,
        rewrite: padding_zeros,
    },
    ValueMigration {
        slot: AttributeSlot::ReturnType,
        rewrite: return_output,
    },
    ValueMigration {
        slot: AttributeSlot::LossFunction,
        rewrite: loss_snake_case,
    },
    ValueMigration {
        slot: AttributeSlot::Dimension,
        rewrite: unknown_dimension,
    },
    ValueMigration {
        slot: AttributeSlot::Metrics,
        rewrite: bare_metrics,
    },
];

fn migrate_record(record: &mut Record) -> bool {
    let Some(kind) = type_tag(record).ok().and_then(AttributeKind::from_type_tag) else {
        return false;
    };
    let Some(value) = record.get("value").and_then(Value::as_str) else {
        return false;
    };

    let rewritten = MIGRATIONS
        .iter()
        .filter(|migration| migration.slot == kind.slot())
        .find_map(|migration| (migration.rewrite)(value));

    match rewritten {
        Some(rewritten) => {
            debug!(
                slot = kind.slot().attribute_name(),
                from = value,
                to = rewritten.as_str();
                "Migrated legacy attribute value"
            );
            record.insert("value".to_string(), Value::String(rewritten));
            true
        }
        None => false,
    }
}

/// Brings `document` up to [`CURRENT_VERSION`].
///
/// Returns the number of rewritten attribute values.
///
/// # Errors
///
/// Returns [`RecordError::UnsupportedVersion`] for documents newer than this
/// engine.
pub fn migrate(document: &mut Document) -> Result<usize, RecordError> {
    if document.version > CURRENT_VERSION {
        return Err(RecordError::UnsupportedVersion(document.version));
    }
    if document.version == CURRENT_VERSION {
        return Ok(0);
    }

    let rewritten = document
        .elements
        .iter_mut()
        .map(migrate_record)
        .filter(|changed| *changed)
        .count();
    if rewritten > 0 {
        warn!(
            from_version = document.version,
            rewritten = rewritten;
            "Upgraded legacy document values"
        );
    }
    document.version = CURRENT_VERSION;
    Ok(rewritten)
}
