//! Attributes whose values are picked from predecessor layers.

use std::collections::HashSet;

use axon_core::identifier::Id;
use log::debug;

use super::{ScaffoldError, attribute_kind, attribute_value, layer_of, remove_attribute, upsert_attribute};
use crate::{
    model::{AttributeSlot, RelationshipKind},
    store::Diagram,
};

fn incoming_next(diagram: &Diagram, node: Id) -> Vec<Id> {
    diagram
        .relationships()
        .filter(|rel| rel.kind() == RelationshipKind::NNNext && rel.target().element() == node)
        .map(|rel| rel.source().element())
        .collect()
}

/// Display name of a predecessor: its `name` attribute, else its element name.
fn predecessor_name(diagram: &Diagram, node: Id) -> Option<String> {
    let element = diagram.get_by_id(node)?;
    let name = attribute_value(diagram, node, AttributeSlot::Name)
        .filter(|name| !name.is_empty())
        .unwrap_or(element.name());
    Some(name.to_string())
}

/// Names of every node reachable backwards over `NNNext` from `id`.
///
/// The walk is depth-first, following relationships in insertion order. It
/// is cycle-safe and never reports `id` itself. Unresolved nodes are skipped.
pub fn predecessor_names(diagram: &Diagram, id: Id) -> Vec<String> {
    let mut visited = HashSet::from([id]);
    let mut names = Vec::new();
    let mut stack: Vec<Id> = incoming_next(diagram, id).into_iter().rev().collect();

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        let Some(name) = predecessor_name(diagram, node) else {
            continue;
        };
        if !names.contains(&name) {
            names.push(name);
        }
        stack.extend(incoming_next(diagram, node).into_iter().rev());
    }
    names
}

/// Rejects any non-empty name in `names` that is not a predecessor of `id`.
fn check_predecessors(diagram: &Diagram, id: Id, slot: AttributeSlot, names: &[&str]) -> Result<(), ScaffoldError> {
    let predecessors = predecessor_names(diagram, id);
    match names
        .iter()
        .find(|name| !name.is_empty() && !predecessors.iter().any(|p| p == *name))
    {
        Some(name) => Err(ScaffoldError::NotAPredecessor {
            layer: id,
            slot: slot.attribute_name(),
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Sets the module input of layer `id` to `selection`.
///
/// A non-empty selection creates or updates the `name_module_input`
/// attribute and returns its id; an empty one deletes it.
///
/// # Errors
///
/// Fails if `id` is not a layer whose schema has `name_module_input`, or if
/// `selection` is not one of its [`predecessor_names`].
pub fn select_module_input(diagram: &mut Diagram, id: Id, selection: &str) -> Result<Option<Id>, ScaffoldError> {
    attribute_kind(layer_of(diagram, id)?, AttributeSlot::NameModuleInput)?;
    check_predecessors(diagram, id, AttributeSlot::NameModuleInput, &[selection])?;
    if selection.is_empty() {
        remove_attribute(diagram, id, AttributeSlot::NameModuleInput);
        return Ok(None);
    }
    upsert_attribute(diagram, id, AttributeSlot::NameModuleInput, selection).map(Some)
}

/// The two tensors picked for `layers_of_tensors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TensorPairSelection {
    first: String,
    second: String,
}

impl TensorPairSelection {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Parses a stored value such as `['t1', 't2']`.
    pub fn from_value(value: &str) -> Self {
        let mut parts = value
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|part| part.trim().trim_matches(|c| c == '\'' || c == '"').to_string());
        Self {
            first: parts.next().unwrap_or_default(),
            second: parts.next().unwrap_or_default(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn set_first(&mut self, first: impl Into<String>) {
        self.first = first.into();
    }

    pub fn set_second(&mut self, second: impl Into<String>) {
        self.second = second.into();
    }

    /// Both tensors are chosen.
    pub fn is_complete(&self) -> bool {
        !self.first.is_empty() && !self.second.is_empty()
    }

    /// The stored form, `['first', 'second']`.
    pub fn to_value(&self) -> String {
        format!("['{}', '{}']", self.first, self.second)
    }
}

/// Applies `selection` to the `layers_of_tensors` attribute of layer `id`.
///
/// A complete selection creates or updates the attribute and returns its id;
/// an incomplete one deletes any existing attribute.
///
/// # Errors
///
/// Fails if `id` is not a layer whose schema has `layers_of_tensors`, or if
/// either chosen tensor is not one of its [`predecessor_names`].
pub fn apply_tensor_pair(
    diagram: &mut Diagram,
    id: Id,
    selection: &TensorPairSelection,
) -> Result<Option<Id>, ScaffoldError> {
    attribute_kind(layer_of(diagram, id)?, AttributeSlot::LayersOfTensors)?;
    check_predecessors(
        diagram,
        id,
        AttributeSlot::LayersOfTensors,
        &[selection.first(), selection.second()],
    )?;
    if !selection.is_complete() {
        let removed = remove_attribute(diagram, id, AttributeSlot::LayersOfTensors);
        if !removed.is_empty() {
            debug!(layer:% = id; "Removed incomplete tensor pair");
        }
        return Ok(None);
    }
    upsert_attribute(diagram, id, AttributeSlot::LayersOfTensors, &selection.to_value()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Element, LayerKind, Relationship},
        scaffold::{find_attribute, scaffold},
    };

    fn layer(diagram: &mut Diagram, kind: LayerKind, name: &str) -> Id {
        let id = diagram.create(Element::layer(kind), None).unwrap();
        scaffold(diagram, id).unwrap();
        let name_attr = find_attribute(diagram, id, AttributeSlot::Name).unwrap().id();
        crate::scaffold::set_attribute_value(diagram, name_attr, name).unwrap();
        id
    }

    fn next(diagram: &mut Diagram, source: Id, target: Id) {
        diagram
            .insert_relationship(Relationship::between(RelationshipKind::NNNext, source, target))
            .unwrap();
    }

    #[test]
    fn test_predecessors_walk_backwards_and_survive_cycles() {
        let mut diagram = Diagram::new();
        let a = layer(&mut diagram, LayerKind::Linear, "a");
        let b = layer(&mut diagram, LayerKind::Linear, "b");
        let c = layer(&mut diagram, LayerKind::Linear, "c");
        let d = layer(&mut diagram, LayerKind::TensorOp, "d");
        next(&mut diagram, a, b);
        next(&mut diagram, b, d);
        next(&mut diagram, c, d);
        next(&mut diagram, d, a);

        assert_eq!(predecessor_names(&diagram, d), vec!["b", "a", "c"]);
        assert_eq!(predecessor_names(&diagram, c), Vec::<String>::new());
    }

    #[test]
    fn test_predecessor_falls_back_to_element_name() {
        let mut diagram = Diagram::new();
        let reference = diagram.create(Element::reference().with_name("Encoder"), None).unwrap();
        let target = layer(&mut diagram, LayerKind::Linear, "head");
        next(&mut diagram, reference, target);
        next(&mut diagram, Id::new("vanished"), target);

        assert_eq!(predecessor_names(&diagram, target), vec!["Encoder"]);
    }

    #[test]
    fn test_tensor_pair_needs_both_selections() {
        let mut diagram = Diagram::new();
        let a = layer(&mut diagram, LayerKind::Linear, "a");
        let b = layer(&mut diagram, LayerKind::Linear, "b");
        let op = layer(&mut diagram, LayerKind::TensorOp, "op");
        next(&mut diagram, a, op);
        next(&mut diagram, b, op);
        let mut selection = TensorPairSelection::default();

        selection.set_first("a");
        assert_eq!(apply_tensor_pair(&mut diagram, op, &selection).unwrap(), None);
        assert!(find_attribute(&diagram, op, AttributeSlot::LayersOfTensors).is_none());

        selection.set_second("b");
        let created = apply_tensor_pair(&mut diagram, op, &selection).unwrap();
        assert!(created.is_some());
        assert_eq!(attribute_value(&diagram, op, AttributeSlot::LayersOfTensors), Some("['a', 'b']"));

        selection.set_first("");
        assert_eq!(apply_tensor_pair(&mut diagram, op, &selection).unwrap(), None);
        assert!(find_attribute(&diagram, op, AttributeSlot::LayersOfTensors).is_none());
    }

    #[test]
    fn test_tensor_pair_rejects_non_predecessors() {
        let mut diagram = Diagram::new();
        let a = layer(&mut diagram, LayerKind::Linear, "a");
        let op = layer(&mut diagram, LayerKind::TensorOp, "op");
        let after = layer(&mut diagram, LayerKind::Linear, "after");
        next(&mut diagram, a, op);
        next(&mut diagram, op, after);

        let result = apply_tensor_pair(&mut diagram, op, &TensorPairSelection::new("a", "after"));
        assert!(matches!(
            result,
            Err(ScaffoldError::NotAPredecessor { slot: "layers_of_tensors", ref name, .. }) if name == "after"
        ));
        assert!(find_attribute(&diagram, op, AttributeSlot::LayersOfTensors).is_none());

        assert!(matches!(
            apply_tensor_pair(&mut diagram, op, &TensorPairSelection::new("ghost", "")),
            Err(ScaffoldError::NotAPredecessor { .. })
        ));
    }

    #[test]
    fn test_tensor_pair_parsing() {
        let selection = TensorPairSelection::from_value("['t1', \"t2\"]");
        assert_eq!(selection, TensorPairSelection::new("t1", "t2"));
        assert!(!TensorPairSelection::from_value("[]").is_complete());
        assert_eq!(TensorPairSelection::from_value(&selection.to_value()), selection);
    }

    #[test]
    fn test_module_input_selection() {
        let mut diagram = Diagram::new();
        let encoder = diagram.create(Element::reference().with_name("encoder"), None).unwrap();
        let decoder = diagram.create(Element::reference().with_name("decoder"), None).unwrap();
        let conv = layer(&mut diagram, LayerKind::Conv2D, "conv");
        next(&mut diagram, encoder, conv);
        next(&mut diagram, decoder, conv);

        assert!(matches!(
            select_module_input(&mut diagram, conv, "conv"),
            Err(ScaffoldError::NotAPredecessor { slot: "name_module_input", .. })
        ));
        assert!(find_attribute(&diagram, conv, AttributeSlot::NameModuleInput).is_none());

        let id = select_module_input(&mut diagram, conv, "encoder").unwrap().unwrap();
        assert_eq!(diagram.get_by_id(id).unwrap().name(), "name_module_input = encoder");
        assert_eq!(select_module_input(&mut diagram, conv, "decoder").unwrap(), Some(id));
        assert_eq!(select_module_input(&mut diagram, conv, "").unwrap(), None);
        assert!(diagram.get_by_id(id).is_none());

        let op = layer(&mut diagram, LayerKind::TensorOp, "op");
        assert!(matches!(
            select_module_input(&mut diagram, op, "x"),
            Err(ScaffoldError::UnknownSlot { .. })
        ));
    }
}
