//! Keeping layers consistent with their attribute schema.
//!
//! Construction of a layer is pure; [`scaffold`] is the explicit second step
//! that creates its mandatory attributes. Optional attributes are toggled one
//! at a time, some of them with defaults or values derived from other
//! attributes or from the layer's predecessors.

mod optional;
mod selection;

pub use optional::{
    ToggleOutcome, offered_optional, pooling_defaults, set_attribute_value, set_metric,
    toggle_optional,
};
pub use selection::{TensorPairSelection, apply_tensor_pair, predecessor_names, select_module_input};

use axon_core::identifier::Id;
use log::debug;
use thiserror::Error;

use crate::{
    model::{AttributeKind, AttributeSlot, Element, LayerKind, schema},
    store::{Diagram, ElementPatch, StoreError},
};

/// Rejected scaffolding operations.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("no element with id `{0}`")]
    UnknownElement(Id),

    #[error("element `{0}` has no attribute schema")]
    NotAComposite(Id),

    #[error("element `{0}` is not an attribute")]
    NotAnAttribute(Id),

    #[error("attribute `{slot}` is mandatory and cannot be removed")]
    MandatoryAttribute { slot: &'static str },

    #[error("{layer} layers have no `{slot}` attribute")]
    UnknownSlot { layer: LayerKind, slot: &'static str },

    #[error("`{value}` is not an option of `{slot}`")]
    UnknownOption { slot: &'static str, value: String },

    #[error("`{name}` is not a predecessor of `{layer}` and cannot fill `{slot}`")]
    NotAPredecessor {
        layer: Id,
        slot: &'static str,
        name: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Returns the layer kind of `id`.
pub(crate) fn layer_of(diagram: &Diagram, id: Id) -> Result<LayerKind, ScaffoldError> {
    diagram
        .get_by_id(id)
        .ok_or(ScaffoldError::UnknownElement(id))?
        .layer_kind()
        .ok_or(ScaffoldError::NotAComposite(id))
}

/// Resolves `slot` against the schema of `layer`.
pub(crate) fn attribute_kind(layer: LayerKind, slot: AttributeSlot) -> Result<AttributeKind, ScaffoldError> {
    AttributeKind::new(layer, slot).ok_or(ScaffoldError::UnknownSlot {
        layer,
        slot: slot.attribute_name(),
    })
}

/// The owned attribute of `layer` filling `slot`.
pub fn find_attribute(diagram: &Diagram, layer: Id, slot: AttributeSlot) -> Option<&Element> {
    diagram
        .children(layer)
        .find(|child| child.attribute_data().is_some_and(|data| data.slot() == slot))
}

/// Current value of `slot` on `layer`, if the attribute exists.
pub fn attribute_value(diagram: &Diagram, layer: Id, slot: AttributeSlot) -> Option<&str> {
    find_attribute(diagram, layer, slot)
        .and_then(Element::attribute_data)
        .map(|data| data.value())
}

/// Creates the attribute for `slot`, or updates its value if it exists.
pub(crate) fn upsert_attribute(
    diagram: &mut Diagram,
    layer: Id,
    slot: AttributeSlot,
    value: &str,
) -> Result<Id, ScaffoldError> {
    if let Some(existing) = find_attribute(diagram, layer, slot).map(Element::id) {
        diagram.update(existing, &ElementPatch::new().value(value))?;
        return Ok(existing);
    }
    let kind = attribute_kind(layer_of(diagram, layer)?, slot)?;
    let id = diagram.create(Element::attribute(kind).with_value(value), Some(layer))?;
    debug!(layer:% = layer, slot = slot.attribute_name(); "Created attribute");
    Ok(id)
}

/// Deletes the attribute for `slot` if present, returning the removed ids.
pub(crate) fn remove_attribute(diagram: &mut Diagram, layer: Id, slot: AttributeSlot) -> Vec<Id> {
    match find_attribute(diagram, layer, slot).map(Element::id) {
        Some(existing) => diagram.delete(existing),
        None => Vec::new(),
    }
}

/// Returns `true` if `id` is a layer owning none of its mandatory attributes.
///
/// Layers restored from a document already own their attributes and are
/// never scaffolded again.
pub fn needs_scaffolding(diagram: &Diagram, id: Id) -> bool {
    let Some(layer) = diagram.get_by_id(id).and_then(Element::layer_kind) else {
        return false;
    };
    !diagram.children(id).any(|child| {
        child
            .attribute_data()
            .is_some_and(|data| data.is_mandatory() && data.kind().layer() == layer)
    })
}

/// Creates one owned attribute per mandatory schema entry of layer `id`, with
/// its default value. Returns the created ids; empty when nothing was needed.
///
/// # Errors
///
/// Returns [`ScaffoldError::UnknownElement`] for an unknown id and
/// [`ScaffoldError::NotAComposite`] for any element other than a layer or a
/// container.
pub fn scaffold(diagram: &mut Diagram, id: Id) -> Result<Vec<Id>, ScaffoldError> {
    let element = diagram.get_by_id(id).ok_or(ScaffoldError::UnknownElement(id))?;
    let Some(layer) = element.layer_kind() else {
        return if element.is_composite() {
            Ok(Vec::new())
        } else {
            Err(ScaffoldError::NotAComposite(id))
        };
    };
    if !needs_scaffolding(diagram, id) {
        return Ok(Vec::new());
    }

    let mut created = Vec::new();
    for def in schema(layer).mandatory() {
        let kind = attribute_kind(layer, def.slot())?;
        created.push(diagram.create(Element::attribute(kind), Some(id))?);
    }
    debug!(element_id:% = id, layer:% = layer, attributes = created.len(); "Scaffolded mandatory attributes");
    Ok(created)
}
