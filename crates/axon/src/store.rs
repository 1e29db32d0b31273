//! The element store and the command surface the editor dispatches against.
//!
//! [`Diagram`] is the single shared map of elements and relationships keyed by
//! id. Every mutation runs to completion and bumps the revision counter, which
//! change observers use to decide whether to re-run.

use axon_core::{
    color::{ElementStyle, InvalidColor},
    geometry::{Bounds, Point},
    identifier::Id,
};
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use thiserror::Error;

use crate::{
    model::{Element, Relationship},
    tree::OwnershipError,
};

/// Errors raised by store commands.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no element with id `{0}`")]
    UnknownElement(Id),

    #[error("an element with id `{0}` already exists")]
    DuplicateId(Id),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error(transparent)]
    Style(#[from] InvalidColor),
}

/// Partial update of an element. Fields left unset are not touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    name: Option<String>,
    bounds: Option<Bounds>,
    value: Option<String>,
    attribute_name: Option<String>,
    referenced_nn: Option<String>,
    fill_color: Option<Option<String>>,
    stroke_color: Option<Option<String>>,
    text_color: Option<Option<String>>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn attribute_name(mut self, attribute_name: impl Into<String>) -> Self {
        self.attribute_name = Some(attribute_name.into());
        self
    }

    pub fn referenced_nn(mut self, referenced: impl Into<String>) -> Self {
        self.referenced_nn = Some(referenced.into());
        self
    }

    pub fn fill_color(mut self, color: Option<&str>) -> Self {
        self.fill_color = Some(color.map(str::to_string));
        self
    }

    pub fn stroke_color(mut self, color: Option<&str>) -> Self {
        self.stroke_color = Some(color.map(str::to_string));
        self
    }

    pub fn text_color(mut self, color: Option<&str>) -> Self {
        self.text_color = Some(color.map(str::to_string));
        self
    }

    /// Returns the value this patch assigns, if any.
    pub fn assigned_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn apply(&self, element: &mut Element) -> Result<(), InvalidColor> {
        let mut style: ElementStyle = element.style().clone();
        if let Some(fill) = &self.fill_color {
            style.set_fill_color(fill.as_deref())?;
        }
        if let Some(stroke) = &self.stroke_color {
            style.set_stroke_color(stroke.as_deref())?;
        }
        if let Some(text) = &self.text_color {
            style.set_text_color(text.as_deref())?;
        }
        *element.style_mut() = style;

        if let Some(name) = &self.name {
            element.set_name(name.clone());
        }
        if let Some(bounds) = self.bounds {
            element.set_bounds(bounds);
        }
        if let Some(attribute_name) = &self.attribute_name {
            element.set_attribute_name(attribute_name.clone());
        }
        if let Some(value) = &self.value {
            element.set_value(value.clone());
        }
        if let Some(referenced) = &self.referenced_nn {
            element.set_referenced_nn(referenced.clone());
        }
        Ok(())
    }
}

/// Partial update of a relationship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipPatch {
    name: Option<String>,
    path: Option<Vec<Point>>,
    bounds: Option<Bounds>,
}

impl RelationshipPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn path(mut self, path: Vec<Point>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Elements and relationships of one diagram.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub(crate) elements: IndexMap<Id, Element>,
    relationships: IndexMap<Id, Relationship>,
    revision: u64,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.relationships.is_empty()
    }

    /// Looks up an element. A miss is not an error.
    pub fn get_by_id(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn relationship(&self, id: Id) -> Option<&Relationship> {
        self.relationships.get(&id)
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// All relationships in insertion order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// Elements without an owner.
    pub fn roots(&self) -> impl Iterator<Item = &Element> {
        self.elements.values().filter(|element| element.owner().is_none())
    }

    /// Owned children of `parent`, in their owner's order.
    pub fn children(&self, parent: Id) -> impl Iterator<Item = &Element> {
        self.elements
            .get(&parent)
            .map(Element::owned_elements)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    #[cfg(test)]
    pub(crate) fn element_mut(&mut self, id: Id) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Inserts `element`, under `owner` when given.
    ///
    /// The element enters the store without children; ownership is only ever
    /// established through the tree operations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the id is taken, or an
    /// ownership error if `owner` cannot take the element. In the latter case
    /// the element is not inserted.
    pub fn create(&mut self, mut element: Element, owner: Option<Id>) -> Result<Id, StoreError> {
        let id = element.id();
        if self.elements.contains_key(&id) || self.relationships.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        let owner = owner.or(element.owner());
        if let Some(owner) = owner {
            self.check_can_own(owner, id)?;
        }

        element.set_owner_link(None);
        if !element.owned_elements().is_empty() {
            debug!(element_id:% = id; "Dropping pre-set children of a new element");
            element.owned_elements_mut().clear();
        }

        trace!(element_id:% = id, kind:% = element.kind(); "Creating element");
        self.elements.insert(id, element);
        self.touch();

        if let Some(owner) = owner {
            self.append_to_parent(id, owner)?;
        }
        self.debug_check_ownership();
        Ok(id)
    }

    /// Applies `patch` to an element.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownElement`] or, for an invalid color,
    /// [`StoreError::Style`]; the element is unchanged on error.
    pub fn update(&mut self, id: Id, patch: &ElementPatch) -> Result<(), StoreError> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(StoreError::UnknownElement(id))?;
        let before = element.clone();
        patch.apply(element)?;
        if *element != before {
            self.touch();
        }
        Ok(())
    }

    /// Applies `patch` to a relationship.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownElement`] for an unknown id.
    pub fn update_relationship(&mut self, id: Id, patch: &RelationshipPatch) -> Result<(), StoreError> {
        let relationship = self
            .relationships
            .get_mut(&id)
            .ok_or(StoreError::UnknownElement(id))?;
        let before = relationship.clone();
        if let Some(name) = &patch.name {
            relationship.set_name(name.clone());
        }
        if let Some(path) = &patch.path {
            relationship.set_path(path.clone());
        }
        if let Some(bounds) = patch.bounds {
            relationship.set_bounds(bounds);
        }
        if *relationship != before {
            self.touch();
        }
        Ok(())
    }

    /// Deletes an element with its whole owned subtree, or a relationship.
    ///
    /// Relationships touching a removed element are removed too. Returns
    /// every removed id; an unknown id removes nothing.
    pub fn delete(&mut self, id: Id) -> Vec<Id> {
        if self.relationships.shift_remove(&id).is_some() {
            self.touch();
            return vec![id];
        }
        let Some(owner) = self.elements.get(&id).map(Element::owner) else {
            debug!(element_id:% = id; "Delete of unknown id ignored");
            return Vec::new();
        };

        if let Some(parent) = owner.and_then(|owner| self.elements.get_mut(&owner)) {
            parent.owned_elements_mut().retain(|child| *child != id);
        }

        let subtree: IndexSet<Id> = self.subtree(id).into_iter().collect();
        for removed in &subtree {
            self.elements.shift_remove(removed);
        }
        let mut removed: Vec<Id> = subtree.iter().copied().collect();

        let dangling: Vec<Id> = self
            .relationships
            .values()
            .filter(|rel| subtree.contains(&rel.source().element()) || subtree.contains(&rel.target().element()))
            .map(Relationship::id)
            .collect();
        for rel in &dangling {
            self.relationships.shift_remove(rel);
        }
        removed.extend(dangling);

        debug!(element_id:% = id, removed = removed.len(); "Deleted element");
        self.touch();
        self.debug_check_ownership();
        removed
    }

    /// Sets bounds computed by layout. The revision only moves on change.
    pub(crate) fn set_element_bounds(&mut self, id: Id, bounds: Bounds) -> bool {
        let Some(element) = self.elements.get_mut(&id) else {
            return false;
        };
        if element.bounds() == bounds {
            return false;
        }
        element.set_bounds(bounds);
        self.touch();
        true
    }

    /// Inserts an already-validated relationship.
    pub(crate) fn insert_relationship(&mut self, relationship: Relationship) -> Result<Id, StoreError> {
        let id = relationship.id();
        if self.elements.contains_key(&id) || self.relationships.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.relationships.insert(id, relationship);
        self.touch();
        Ok(id)
    }

    /// Inserts an element restored from a record, links included, as it is.
    pub(crate) fn insert_restored(&mut self, element: Element) -> Result<(), StoreError> {
        let id = element.id();
        if self.elements.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.elements.insert(id, element);
        Ok(())
    }
}
