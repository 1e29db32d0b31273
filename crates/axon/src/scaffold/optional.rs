//! Optional attribute toggles and value changes with dependent defaults.

use axon_core::identifier::Id;
use log::{debug, trace};

use super::{
    ScaffoldError, attribute_kind, attribute_value, find_attribute, layer_of, remove_attribute,
    upsert_attribute,
};
use crate::{
    model::{AttributeSlot, Element, LayerKind, schema, schema::METRICS},
    store::{Diagram, ElementPatch},
};

/// Result of [`toggle_optional`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Created(Id),
    Removed(Vec<Id>),
    /// The slot takes its value from a selection; nothing exists until one is made.
    AwaitingSelection,
    Unchanged,
}

/// Default `(kernel_dim, stride_dim)` for a pooling dimension.
///
/// Unknown dimensions behave as `2D`.
pub fn pooling_defaults(dimension: &str) -> (&'static str, &'static str) {
    match dimension {
        "1D" => ("[3]", "[1]"),
        "3D" => ("[3, 3, 3]", "[1, 1, 1]"),
        _ => ("[3, 3]", "[1, 1]"),
    }
}

fn tensor_op_slots(operation: &str) -> &'static [AttributeSlot] {
    use AttributeSlot as S;
    match operation {
        "reshape" => &[S::ReshapeDim],
        "concatenate" => &[S::LayersOfTensors, S::ConcatenateDim],
        "transpose" => &[S::TransposeDim],
        "permute" => &[S::PermuteDim],
        _ => &[S::LayersOfTensors],
    }
}

/// Default value for a newly toggled `slot`, given the layer's other attributes.
fn dependent_default(diagram: &Diagram, layer_id: Id, layer: LayerKind, slot: AttributeSlot) -> Option<&'static str> {
    if layer != LayerKind::Pooling {
        return None;
    }
    let dimension = attribute_value(diagram, layer_id, AttributeSlot::Dimension).unwrap_or("2D");
    let (kernel, stride) = pooling_defaults(dimension);
    match slot {
        AttributeSlot::KernelDim => Some(kernel),
        AttributeSlot::StrideDim => Some(stride),
        _ => None,
    }
}

/// Optional slots currently offered for layer `id`, in schema order.
///
/// For tensor operations the offer depends on the current `tns_type`, read on
/// every call; a missing `tns_type` counts as `reshape`. Any other operation,
/// `multiply` and `matmultiply` included, offers the tensor pair selection.
///
/// # Errors
///
/// Fails if `id` is unknown or not a layer.
pub fn offered_optional(diagram: &Diagram, id: Id) -> Result<Vec<AttributeSlot>, ScaffoldError> {
    let layer = layer_of(diagram, id)?;
    let optional = schema(layer).optional().map(|def| def.slot());
    if layer != LayerKind::TensorOp {
        return Ok(optional.collect());
    }

    let operation = attribute_value(diagram, id, AttributeSlot::TnsType).unwrap_or("reshape");
    let offered = tensor_op_slots(operation);
    trace!(operation = operation, offered = offered.len(); "Filtered tensor operation slots");
    Ok(optional
        .filter(|slot| offered.contains(slot))
        .collect())
}

/// Checks or unchecks the optional `slot` of layer `id`.
///
/// Checking creates the attribute with its default, derived from sibling
/// values where the schema has such a dependency. Selection-driven slots are
/// created only by their selection operation. Unchecking deletes the attribute.
///
/// # Errors
///
/// Fails for an unknown element, a non-layer, a slot outside the layer's
/// schema, or an attempt to uncheck a mandatory attribute.
pub fn toggle_optional(
    diagram: &mut Diagram,
    id: Id,
    slot: AttributeSlot,
    enabled: bool,
) -> Result<ToggleOutcome, ScaffoldError> {
    let layer = layer_of(diagram, id)?;
    let def = attribute_kind(layer, slot)?.definition();
    if def.is_mandatory() {
        return if enabled {
            Ok(ToggleOutcome::Unchanged)
        } else {
            Err(ScaffoldError::MandatoryAttribute {
                slot: slot.attribute_name(),
            })
        };
    }

    let existing = find_attribute(diagram, id, slot).map(Element::id);
    match (enabled, existing) {
        (true, Some(_)) | (false, None) => Ok(ToggleOutcome::Unchanged),
        (true, None) if slot.is_selection_driven() => Ok(ToggleOutcome::AwaitingSelection),
        (true, None) => {
            let value = dependent_default(diagram, id, layer, slot).unwrap_or(def.default_value());
            let created = upsert_attribute(diagram, id, slot, value)?;
            debug!(layer:% = id, slot = slot.attribute_name(), value = value; "Toggled attribute on");
            Ok(ToggleOutcome::Created(created))
        }
        (false, Some(_)) => {
            let removed = remove_attribute(diagram, id, slot);
            debug!(layer:% = id, slot = slot.attribute_name(); "Toggled attribute off");
            Ok(ToggleOutcome::Removed(removed))
        }
    }
}

/// Sets the value of attribute `id`, then updates dependent siblings.
///
/// A pooling layer's `dimension` rewrites existing `kernel_dim` and
/// `stride_dim` siblings. Returns the ids of every attribute whose value was
/// written, starting with `id`.
///
/// # Errors
///
/// Fails for an unknown element or one that is not an attribute.
pub fn set_attribute_value(diagram: &mut Diagram, id: Id, value: &str) -> Result<Vec<Id>, ScaffoldError> {
    let element = diagram.get_by_id(id).ok_or(ScaffoldError::UnknownElement(id))?;
    let data = element.attribute_data().ok_or(ScaffoldError::NotAnAttribute(id))?;
    let (slot, layer, owner) = (data.slot(), data.kind().layer(), element.owner());

    diagram.update(id, &ElementPatch::new().value(value))?;
    let mut written = vec![id];

    let Some(owner) = owner.filter(|_| layer == LayerKind::Pooling && slot == AttributeSlot::Dimension) else {
        return Ok(written);
    };
    let (kernel, stride) = pooling_defaults(value);
    for (dependent, dependent_value) in [(AttributeSlot::KernelDim, kernel), (AttributeSlot::StrideDim, stride)] {
        if let Some(sibling) = find_attribute(diagram, owner, dependent).map(Element::id) {
            diagram.update(sibling, &ElementPatch::new().value(dependent_value))?;
            written.push(sibling);
        }
    }
    debug!(layer:% = owner, dimension = value, cascaded = written.len() - 1; "Cascaded dimension change");
    Ok(written)
}

/// Parses a stored metrics list such as `[accuracy, mae]`.
pub(crate) fn parse_metrics(value: &str) -> Vec<&str> {
    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|metric| !metric.is_empty())
        .collect()
}

/// Enables or disables one metric on a configuration layer's `metrics`.
///
/// The stored list keeps the canonical option order; an empty selection is
/// stored as `""`. Returns the new value.
///
/// # Errors
///
/// Fails if `id` is not a layer with a `metrics` slot or `metric` is not one
/// of the known metrics.
pub fn set_metric(diagram: &mut Diagram, id: Id, metric: &str, enabled: bool) -> Result<String, ScaffoldError> {
    let layer = layer_of(diagram, id)?;
    attribute_kind(layer, AttributeSlot::Metrics)?;
    if !METRICS.contains(&metric) {
        return Err(ScaffoldError::UnknownOption {
            slot: AttributeSlot::Metrics.attribute_name(),
            value: metric.to_string(),
        });
    }

    let current = attribute_value(diagram, id, AttributeSlot::Metrics).unwrap_or_default();
    let selected = parse_metrics(current);
    let chosen: Vec<&str> = METRICS
        .iter()
        .copied()
        .filter(|option| if *option == metric { enabled } else { selected.contains(option) })
        .collect();
    let value = if chosen.is_empty() {
        String::new()
    } else {
        format!("[{}]", chosen.join(", "))
    };

    upsert_attribute(diagram, id, AttributeSlot::Metrics, &value)?;
    Ok(value)
}
