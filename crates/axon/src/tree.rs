//! The ownership tree.
//!
//! Ownership is stored on both sides: each element carries its owner link and
//! each composite lists its children in order. Every operation here updates
//! both sides together, so that for every composite `C` the set of elements
//! whose owner is `C` equals the set listed by `C`.

use axon_core::identifier::Id;
use log::trace;
use thiserror::Error;

use crate::{model::Element, store::Diagram};

/// Rejected ownership changes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("no element with id `{0}`")]
    UnknownElement(Id),

    #[error("element `{child}` is already owned by `{owner}`")]
    AlreadyOwned { child: Id, owner: Id },

    #[error("element `{0}` cannot own other elements")]
    NotComposite(Id),

    #[error("element `{0}` cannot own itself")]
    SelfOwnership(Id),

    #[error("element `{parent}` is owned by `{child}` and cannot become its owner")]
    Cycle { child: Id, parent: Id },
}

/// A broken ownership tree, found by [`Diagram::verify_ownership`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("element `{child}` names missing owner `{owner}`")]
    MissingOwner { child: Id, owner: Id },

    #[error("element `{child}` names owner `{owner}` which does not list it")]
    Unlisted { child: Id, owner: Id },

    #[error("element `{parent}` lists missing child `{child}`")]
    MissingChild { parent: Id, child: Id },

    #[error("element `{parent}` lists `{child}` which names a different owner")]
    ForeignChild { parent: Id, child: Id },

    #[error("element `{parent}` lists `{child}` more than once")]
    DuplicateChild { parent: Id, child: Id },
}

impl Diagram {
    /// Checks that `parent` may take `child` as a new child.
    pub(crate) fn check_can_own(&self, parent: Id, child: Id) -> Result<(), OwnershipError> {
        if parent == child {
            return Err(OwnershipError::SelfOwnership(child));
        }
        let parent_element = self
            .elements
            .get(&parent)
            .ok_or(OwnershipError::UnknownElement(parent))?;
        if !parent_element.is_composite() {
            return Err(OwnershipError::NotComposite(parent));
        }
        if self.is_ancestor(child, parent) {
            return Err(OwnershipError::Cycle { child, parent });
        }
        Ok(())
    }

    /// Makes `parent` the owner of `child` and appends it to `parent`'s list.
    ///
    /// Re-owning a child by its current owner is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if either element is missing, `parent` is not composite, the
    /// change would create a cycle, or `child` already has another owner.
    pub fn set_owner(&mut self, child: Id, parent: Id) -> Result<(), OwnershipError> {
        self.check_can_own(parent, child)?;
        let current = self
            .elements
            .get(&child)
            .ok_or(OwnershipError::UnknownElement(child))?
            .owner();

        match current {
            Some(owner) if owner == parent => {}
            Some(owner) => return Err(OwnershipError::AlreadyOwned { child, owner }),
            None => {
                trace!(child:% = child, parent:% = parent; "Setting owner");
                if let Some(element) = self.elements.get_mut(&child) {
                    element.set_owner_link(Some(parent));
                }
                self.touch();
            }
        }

        if let Some(parent_element) = self.elements.get_mut(&parent) {
            let owned = parent_element.owned_elements_mut();
            if !owned.contains(&child) {
                owned.push(child);
            }
        }
        self.debug_check_ownership();
        Ok(())
    }

    /// Appends `child` to `parent`. Idempotent.
    ///
    /// # Errors
    ///
    /// See [`Diagram::set_owner`].
    pub fn append_child(&mut self, parent: Id, child: Id) -> Result<(), OwnershipError> {
        self.set_owner(child, parent)
    }

    /// Command-surface name for [`Diagram::append_child`].
    ///
    /// # Errors
    ///
    /// See [`Diagram::set_owner`].
    pub fn append_to_parent(&mut self, child: Id, parent: Id) -> Result<(), OwnershipError> {
        self.append_child(parent, child)
    }

    /// Detaches `child` from `parent`, clearing its owner link.
    ///
    /// Returns `false` when `child` was not owned by `parent`.
    pub fn remove_child(&mut self, parent: Id, child: Id) -> bool {
        let owned_by_parent = self
            .elements
            .get(&child)
            .is_some_and(|element| element.owner() == Some(parent));
        if !owned_by_parent {
            return false;
        }

        if let Some(element) = self.elements.get_mut(&child) {
            element.set_owner_link(None);
        }
        if let Some(parent_element) = self.elements.get_mut(&parent) {
            parent_element.owned_elements_mut().retain(|id| *id != child);
        }
        self.touch();
        self.debug_check_ownership();
        true
    }

    /// Moves `child` under `parent` by removing it from its current owner first.
    ///
    /// # Errors
    ///
    /// See [`Diagram::set_owner`]. On error the child keeps its current owner.
    pub fn reparent(&mut self, child: Id, parent: Id) -> Result<(), OwnershipError> {
        self.check_can_own(parent, child)?;
        let current = self
            .elements
            .get(&child)
            .ok_or(OwnershipError::UnknownElement(child))?
            .owner();
        if let Some(owner) = current.filter(|owner| *owner != parent) {
            self.remove_child(owner, child);
        }
        self.set_owner(child, parent)
    }

    /// `root` followed by all its descendants, depth-first in child order.
    pub fn subtree(&self, root: Id) -> Vec<Id> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(element) = self.elements.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(element.owned_elements().iter().rev().copied());
        }
        out
    }

    /// Returns `true` if `ancestor` is `id` or appears on `id`'s owner chain.
    pub fn is_ancestor(&self, ancestor: Id, id: Id) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.elements.len() {
                return false;
            }
            current = self.elements.get(&node).and_then(Element::owner);
        }
        false
    }

    /// Checks both directions of the ownership relation.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn verify_ownership(&self) -> Result<(), InvariantViolation> {
        for element in self.elements.values() {
            let child = element.id();
            if let Some(owner) = element.owner() {
                let parent = self
                    .elements
                    .get(&owner)
                    .ok_or(InvariantViolation::MissingOwner { child, owner })?;
                if !parent.owned_elements().contains(&child) {
                    return Err(InvariantViolation::Unlisted { child, owner });
                }
            }

            let parent = child;
            let owned = element.owned_elements();
            for (index, child) in owned.iter().copied().enumerate() {
                let listed = self
                    .elements
                    .get(&child)
                    .ok_or(InvariantViolation::MissingChild { parent, child })?;
                if listed.owner() != Some(parent) {
                    return Err(InvariantViolation::ForeignChild { parent, child });
                }
                if owned[..index].contains(&child) {
                    return Err(InvariantViolation::DuplicateChild { parent, child });
                }
            }
        }
        Ok(())
    }

    #[cfg(debug_assertions)]
    pub(crate) fn debug_check_ownership(&self) {
        if let Err(violation) = self.verify_ownership() {
            panic!("ownership invariant violated: {violation}");
        }
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_check_ownership(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeKind, LayerKind, MemberKind, schema::AttributeSlot};

    fn diagram_with_layer() -> (Diagram, Id) {
        let mut diagram = Diagram::new();
        let layer = diagram.create(Element::layer(LayerKind::Conv2D), None).unwrap();
        (diagram, layer)
    }

    fn loose_attribute(diagram: &mut Diagram) -> Id {
        let kind = AttributeKind::new(LayerKind::Conv2D, AttributeSlot::InChannels).unwrap();
        diagram.create(Element::attribute(kind), None).unwrap()
    }

    #[test]
    fn test_append_child_is_idempotent() {
        let (mut diagram, layer) = diagram_with_layer();
        let attr = loose_attribute(&mut diagram);

        diagram.append_child(layer, attr).unwrap();
        diagram.append_child(layer, attr).unwrap();

        assert_eq!(diagram.get_by_id(layer).unwrap().owned_elements(), &[attr]);
        assert!(diagram.verify_ownership().is_ok());
    }

    #[test]
    fn test_set_owner_rejects_second_owner() {
        let (mut diagram, layer) = diagram_with_layer();
        let other = diagram.create(Element::layer(LayerKind::Linear), None).unwrap();
        let attr = loose_attribute(&mut diagram);
        diagram.set_owner(attr, layer).unwrap();

        assert_eq!(
            diagram.set_owner(attr, other),
            Err(OwnershipError::AlreadyOwned { child: attr, owner: layer })
        );
        assert_eq!(diagram.get_by_id(attr).unwrap().owner(), Some(layer));
        assert!(diagram.get_by_id(other).unwrap().owned_elements().is_empty());
    }

    #[test]
    fn test_invalid_parents() {
        let (mut diagram, layer) = diagram_with_layer();
        let attr = loose_attribute(&mut diagram);
        let member = diagram.create(Element::member(MemberKind::Method), None).unwrap();

        assert_eq!(diagram.set_owner(layer, layer), Err(OwnershipError::SelfOwnership(layer)));
        assert_eq!(diagram.set_owner(member, attr), Err(OwnershipError::NotComposite(attr)));
        assert_eq!(
            diagram.set_owner(attr, Id::new("ghost")),
            Err(OwnershipError::UnknownElement(Id::new("ghost")))
        );
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut diagram = Diagram::new();
        let outer = diagram.create(Element::container(), None).unwrap();
        let inner = diagram.create(Element::container(), Some(outer)).unwrap();

        assert_eq!(
            diagram.set_owner(outer, inner),
            Err(OwnershipError::Cycle { child: outer, parent: inner })
        );
    }

    #[test]
    fn test_remove_then_reparent() {
        let (mut diagram, layer) = diagram_with_layer();
        let other = diagram.create(Element::layer(LayerKind::Linear), None).unwrap();
        let attr = loose_attribute(&mut diagram);
        diagram.set_owner(attr, layer).unwrap();

        assert!(!diagram.remove_child(other, attr));
        diagram.reparent(attr, other).unwrap();

        assert_eq!(diagram.get_by_id(attr).unwrap().owner(), Some(other));
        assert!(diagram.get_by_id(layer).unwrap().owned_elements().is_empty());
        assert_eq!(diagram.get_by_id(other).unwrap().owned_elements(), &[attr]);

        assert!(diagram.remove_child(other, attr));
        assert_eq!(diagram.get_by_id(attr).unwrap().owner(), None);
        assert!(diagram.verify_ownership().is_ok());
    }

    #[test]
    fn test_subtree_order() {
        let mut diagram = Diagram::new();
        let container = diagram.create(Element::container(), None).unwrap();
        let first = diagram.create(Element::layer(LayerKind::Linear), Some(container)).unwrap();
        let second = diagram.create(Element::layer(LayerKind::Flatten), Some(container)).unwrap();
        let kind = AttributeKind::new(LayerKind::Linear, AttributeSlot::InFeatures).unwrap();
        let attr = diagram.create(Element::attribute(kind), Some(first)).unwrap();

        assert_eq!(diagram.subtree(container), vec![container, first, attr, second]);
        assert!(diagram.is_ancestor(container, attr));
        assert!(!diagram.is_ancestor(second, attr));
    }

    #[test]
    fn test_verify_detects_one_sided_links() {
        let (mut diagram, layer) = diagram_with_layer();
        let attr = loose_attribute(&mut diagram);

        diagram.element_mut(attr).unwrap().set_owner_link(Some(layer));
        assert_eq!(
            diagram.verify_ownership(),
            Err(InvariantViolation::Unlisted { child: attr, owner: layer })
        );

        diagram.element_mut(attr).unwrap().set_owner_link(None);
        diagram.element_mut(layer).unwrap().owned_elements_mut().push(attr);
        assert_eq!(
            diagram.verify_ownership(),
            Err(InvariantViolation::ForeignChild { parent: layer, child: attr })
        );
    }
}
