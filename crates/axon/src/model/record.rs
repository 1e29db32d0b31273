//! Plain-record persistence for elements and relationships.
//!
//! A record is a JSON object. `serialize` emits every base field plus the
//! kind's own fields; `deserialize` applies only the fields a record carries,
//! so anything absent keeps the value it had before (for a freshly constructed
//! element, its constructor default).

use axon_core::{color::ElementStyle, geometry::Bounds, geometry::Point, identifier::Id};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::{
    catalog,
    element::{Detail, Element},
    kind::RelationshipKind,
    relationship::{Endpoint, Relationship},
};

/// A persisted element or relationship.
pub type Record = Map<String, Value>;

/// Errors raised while reading records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record has no `type` field")]
    MissingType,

    #[error("unknown type tag `{0}`")]
    UnknownType(String),

    #[error("record of type `{found}` cannot be applied to a `{expected}`")]
    TypeMismatch { expected: String, found: String },

    #[error("malformed `{tag}` record: {reason}")]
    Malformed { tag: String, reason: String },

    #[error("document version {0} is newer than this engine supports")]
    UnsupportedVersion(u32),

    #[error("inconsistent document: {0}")]
    Inconsistent(String),
}

/// The serialize/deserialize contract shared by every persisted type.
pub trait Persist {
    fn serialize(&self) -> Record;

    /// Restores the fields present in `record`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if a present field has the wrong shape or the
    /// record describes a different type.
    fn deserialize(&mut self, record: &Record) -> Result<(), RecordError>;
}

/// Distinguishes an absent field from an explicit `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementFields {
    id: Option<Id>,
    name: Option<String>,
    #[serde(rename = "type")]
    type_tag: Option<String>,
    #[serde(default, deserialize_with = "present")]
    owner: Option<Option<Id>>,
    bounds: Option<Bounds>,
    #[serde(default, deserialize_with = "present")]
    fill_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    stroke_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    text_color: Option<Option<String>>,
    owned_elements: Option<Vec<Id>>,
    attribute_name: Option<String>,
    value: Option<String>,
    #[serde(rename = "referencedNN")]
    referenced_nn: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RelationshipFields {
    id: Option<Id>,
    name: Option<String>,
    #[serde(rename = "type")]
    type_tag: Option<String>,
    source: Option<Endpoint>,
    target: Option<Endpoint>,
    path: Option<Vec<Point>>,
    bounds: Option<Bounds>,
    #[serde(default, deserialize_with = "present", rename = "fillColor")]
    fill_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", rename = "strokeColor")]
    stroke_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", rename = "textColor")]
    text_color: Option<Option<String>>,
}

fn parse_fields<T: for<'de> Deserialize<'de>>(record: &Record, tag: &str) -> Result<T, RecordError> {
    serde_json::from_value(Value::Object(record.clone())).map_err(|err| RecordError::Malformed {
        tag: tag.to_string(),
        reason: err.to_string(),
    })
}

fn write_style(record: &mut Record, style: &ElementStyle) {
    for (key, value) in [
        ("fillColor", style.fill_color()),
        ("strokeColor", style.stroke_color()),
        ("textColor", style.text_color()),
    ] {
        if let Some(value) = value {
            record.insert(key.to_string(), json!(value));
        }
    }
}

fn apply_style(
    style: &mut ElementStyle,
    tag: &str,
    fill: Option<Option<String>>,
    stroke: Option<Option<String>>,
    text: Option<Option<String>>,
) -> Result<(), RecordError> {
    let malformed = |err: axon_core::color::InvalidColor| RecordError::Malformed {
        tag: tag.to_string(),
        reason: err.to_string(),
    };
    if let Some(fill) = fill {
        style.set_fill_color(fill.as_deref()).map_err(malformed)?;
    }
    if let Some(stroke) = stroke {
        style.set_stroke_color(stroke.as_deref()).map_err(malformed)?;
    }
    if let Some(text) = text {
        style.set_text_color(text.as_deref()).map_err(malformed)?;
    }
    Ok(())
}

fn bounds_value(bounds: Bounds) -> Value {
    json!({
        "x": bounds.x(),
        "y": bounds.y(),
        "width": bounds.width(),
        "height": bounds.height(),
    })
}

impl Persist for Element {
    fn serialize(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(self.id().to_string()));
        record.insert("name".to_string(), json!(self.name()));
        record.insert("type".to_string(), json!(self.kind().type_tag()));
        record.insert(
            "owner".to_string(),
            self.owner().map_or(Value::Null, |owner| json!(owner.to_string())),
        );
        record.insert("bounds".to_string(), bounds_value(self.bounds()));
        write_style(&mut record, self.style());

        if self.is_composite() {
            let owned: Vec<String> = self.owned_elements().iter().map(Id::to_string).collect();
            record.insert("ownedElements".to_string(), json!(owned));
        }

        match self.detail() {
            Detail::Attribute(data) => {
                record.insert("attributeName".to_string(), json!(data.attribute_name()));
                record.insert("value".to_string(), json!(data.value()));
                record.insert("attributeType".to_string(), json!(data.value_kind()));
                record.insert("isMandatory".to_string(), json!(data.is_mandatory()));
            }
            Detail::Reference(data) => {
                record.insert("referencedNN".to_string(), json!(data.referenced_nn()));
            }
            Detail::Layer(_) | Detail::Member(_) | Detail::Container | Detail::Section(_) => {}
        }

        record
    }

    fn deserialize(&mut self, record: &Record) -> Result<(), RecordError> {
        let tag = self.kind().type_tag();
        let fields: ElementFields = parse_fields(record, &tag)?;

        if let Some(found) = fields.type_tag.filter(|found| *found != tag) {
            return Err(RecordError::TypeMismatch {
                expected: tag.into_owned(),
                found,
            });
        }

        if let Some(id) = fields.id {
            self.set_id(id);
        }
        if let Some(owner) = fields.owner {
            self.set_owner_link(owner);
        }
        if let Some(bounds) = fields.bounds {
            self.set_bounds(bounds);
        }
        apply_style(
            self.style_mut(),
            &tag,
            fields.fill_color,
            fields.stroke_color,
            fields.text_color,
        )?;
        if let Some(owned) = fields.owned_elements.filter(|_| self.is_composite()) {
            *self.owned_elements_mut() = owned;
        }
        if let Some(name) = fields.name {
            self.set_name(name);
        }
        if let Some(referenced) = fields.referenced_nn {
            self.set_reference_target_raw(referenced);
        }
        self.set_attribute_fields_raw(fields.attribute_name, fields.value);
        self.refresh_label();
        Ok(())
    }
}

impl Persist for Relationship {
    fn serialize(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(self.id().to_string()));
        record.insert("name".to_string(), json!(self.name()));
        record.insert("type".to_string(), json!(self.kind().type_tag()));
        record.insert("source".to_string(), json!(self.source()));
        record.insert("target".to_string(), json!(self.target()));
        record.insert("path".to_string(), json!(self.path()));
        record.insert("bounds".to_string(), bounds_value(self.bounds()));
        write_style(&mut record, self.style());
        record
    }

    fn deserialize(&mut self, record: &Record) -> Result<(), RecordError> {
        let tag = self.kind().type_tag();
        let fields: RelationshipFields = parse_fields(record, tag)?;

        if let Some(found) = fields.type_tag.filter(|found| found != tag) {
            return Err(RecordError::TypeMismatch {
                expected: tag.to_string(),
                found,
            });
        }

        if let Some(id) = fields.id {
            self.set_id(id);
        }
        if let Some(name) = fields.name {
            self.set_name(name);
        }
        let source = fields.source.unwrap_or_else(|| self.source().clone());
        let target = fields.target.unwrap_or_else(|| self.target().clone());
        self.set_endpoints(source, target);
        if let Some(path) = fields.path {
            self.set_path(path);
        }
        if let Some(bounds) = fields.bounds {
            self.set_bounds(bounds);
        }
        apply_style(
            self.style_mut(),
            tag,
            fields.fill_color,
            fields.stroke_color,
            fields.text_color,
        )
    }
}

/// Reads the `type` tag of a record.
pub fn type_tag(record: &Record) -> Result<&str, RecordError> {
    record
        .get("type")
        .and_then(Value::as_str)
        .ok_or(RecordError::MissingType)
}

/// Constructs an element from a record: the catalog constructor for its tag,
/// then [`Persist::deserialize`].
///
/// # Errors
///
/// Returns [`RecordError`] for a missing or unknown tag or a malformed field.
pub fn element_from_record(record: &Record) -> Result<Element, RecordError> {
    let tag = type_tag(record)?;
    let mut element =
        catalog::construct(tag).ok_or_else(|| RecordError::UnknownType(tag.to_string()))?;
    element.deserialize(record)?;
    Ok(element)
}

/// Constructs a relationship from a record.
///
/// # Errors
///
/// Returns [`RecordError`] for a missing or unknown tag, missing endpoints or
/// a malformed field.
pub fn relationship_from_record(record: &Record) -> Result<Relationship, RecordError> {
    let tag = type_tag(record)?;
    let kind = RelationshipKind::from_type_tag(tag)
        .ok_or_else(|| RecordError::UnknownType(tag.to_string()))?;
    let fields: RelationshipFields = parse_fields(record, tag)?;
    let (Some(source), Some(target)) = (fields.source, fields.target) else {
        return Err(RecordError::Malformed {
            tag: tag.to_string(),
            reason: "relationship needs both `source` and `target`".to_string(),
        });
    };
    let mut relationship = Relationship::new(kind, source, target);
    relationship.deserialize(record)?;
    Ok(relationship)
}

/// A persisted diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Absent in documents written before versioning; read as 0.
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub elements: Vec<Record>,
    #[serde(default)]
    pub relationships: Vec<Record>,
}
