//! Axon - composition, layout and validation of neural-network diagrams.
//!
//! The engine keeps a typed tree of diagram elements, computes their bounds
//! from measured labels, enforces which elements may be connected, and keeps
//! layers consistent with their attribute schema. [`Session`] is the entry
//! point an editor dispatches its commands to.

pub mod config;
pub mod constraint;
pub mod layout;
pub mod model;
pub mod scaffold;
pub mod store;
pub mod tree;

mod error;

pub use axon_core::{color, geometry, identifier, text};

pub use error::AxonError;
pub use store::{Diagram, ElementPatch, RelationshipPatch};

use log::{debug, info, trace, warn};

use axon_core::{geometry::Bounds, identifier::Id, text::TextMeasure};

use config::AppConfig;
use constraint::{ChangeObserver, ElementRegistry, NextLabelMonitor, rules};
use layout::LayoutEngine;
use model::{
    AttributeSlot, Document, Element, Persist, RecordError, Relationship,
    migrate::{CURRENT_VERSION, migrate},
    record::{element_from_record, relationship_from_record},
};
use scaffold::{ScaffoldError, TensorPairSelection, ToggleOutcome};

/// Upper bound on observer passes after one command.
const MAX_OBSERVER_PASSES: usize = 8;

fn layout_engine<'a>(config: &'a AppConfig, measure: &'a dyn TextMeasure) -> LayoutEngine<'a> {
    LayoutEngine::new(config.layout(), measure).with_text_style(config.text().text_style())
}

/// An editing session over one diagram.
///
/// Owns the element store, the special-element registry, the text measure
/// used by layout, and the change observers. Every command runs to
/// completion; observers run afterwards until the diagram stops changing.
///
/// # Examples
///
/// ```
/// use axon::{Session, config::AppConfig, model::{Element, LayerKind}, text::FixedAdvanceMeasure};
///
/// let mut session = Session::new(AppConfig::default(), FixedAdvanceMeasure::default());
/// let conv = session.create(Element::layer(LayerKind::Conv2D), None).unwrap();
///
/// // Scaffolding created the three mandatory attributes.
/// assert_eq!(session.get_by_id(conv).unwrap().owned_elements().len(), 3);
/// ```
pub struct Session {
    config: AppConfig,
    diagram: Diagram,
    registry: ElementRegistry,
    measure: Box<dyn TextMeasure>,
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl Session {
    /// Creates an empty session with the next-label monitor installed.
    pub fn new(config: AppConfig, measure: impl TextMeasure + 'static) -> Self {
        info!(registry_capacity = config.registry().capacity(); "Session created");
        Self {
            registry: ElementRegistry::new(config.registry().capacity()),
            config,
            diagram: Diagram::new(),
            measure: Box::new(measure),
            observers: vec![Box::new(NextLabelMonitor)],
        }
    }

    /// Adds a change observer.
    pub fn with_observer(mut self, observer: impl ChangeObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Looks up an element; a miss means the element is gone.
    pub fn get_by_id(&self, id: Id) -> Option<&Element> {
        self.diagram.get_by_id(id)
    }

    pub fn relationship(&self, id: Id) -> Option<&Relationship> {
        self.diagram.relationship(id)
    }

    /// Runs the observers if the diagram changed since `before`.
    fn settle(&mut self, before: u64) {
        if self.diagram.revision() != before {
            self.run_observers();
        }
    }

    fn run_observers(&mut self) {
        for _ in 0..MAX_OBSERVER_PASSES {
            let revision = self.diagram.revision();
            for observer in &mut self.observers {
                let corrected = observer.observe(&mut self.diagram);
                if corrected > 0 {
                    debug!(observer = observer.name(), corrected = corrected; "Observer corrected diagram");
                }
            }
            if self.diagram.revision() == revision {
                return;
            }
        }
        warn!(passes = MAX_OBSERVER_PASSES; "Observers did not converge");
    }

    /// Inserts `element` under `owner`, scaffolds it, then registers it.
    ///
    /// A failed create leaves the diagram and the registry as they were.
    ///
    /// # Errors
    ///
    /// Returns a store error if the id is taken or `owner` cannot own the
    /// element, or the scaffolding error if its attributes cannot be created.
    pub fn create(&mut self, element: Element, owner: Option<Id>) -> Result<Id, AxonError> {
        let before = self.diagram.revision();
        let id = self.diagram.create(element, owner)?;
        let created = match scaffold::scaffold(&mut self.diagram, id) {
            Ok(created) => created,
            Err(ScaffoldError::NotAComposite(_)) => Vec::new(),
            Err(err) => {
                let removed = self.diagram.delete(id);
                warn!(element_id:% = id, removed = removed.len(); "Rolled back element creation");
                return Err(err.into());
            }
        };
        if let Some(element) = self.diagram.get_by_id(id) {
            self.registry.register(element);
        }
        trace!(element_id:% = id, scaffolded = created.len(); "Created element");
        self.settle(before);
        Ok(id)
    }

    /// Applies `patch` to element `id`.
    ///
    /// A value written to an attribute also updates dependent siblings, as
    /// [`Session::set_attribute_value`] does.
    ///
    /// # Errors
    ///
    /// Returns a store error for an unknown id or an invalid color.
    pub fn update(&mut self, id: Id, patch: &ElementPatch) -> Result<(), AxonError> {
        let before = self.diagram.revision();
        self.diagram.update(id, patch)?;
        let is_attribute = self.diagram.get_by_id(id).is_some_and(|e| e.attribute_data().is_some());
        if let Some(value) = patch.assigned_value().filter(|_| is_attribute) {
            scaffold::set_attribute_value(&mut self.diagram, id, value)?;
        }
        self.settle(before);
        Ok(())
    }

    /// Deletes an element with its subtree, or a relationship.
    ///
    /// Returns every removed id. Removed elements are also dropped from the
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::MandatoryAttribute`] for a mandatory
    /// attribute whose layer still exists.
    pub fn delete(&mut self, id: Id) -> Result<Vec<Id>, AxonError> {
        if let Some(element) = self.diagram.get_by_id(id) {
            let owned_by_layer = element
                .owner()
                .and_then(|owner| self.diagram.get_by_id(owner))
                .is_some();
            if let Some(data) = element.attribute_data().filter(|data| data.is_mandatory() && owned_by_layer) {
                return Err(ScaffoldError::MandatoryAttribute {
                    slot: data.slot().attribute_name(),
                }
                .into());
            }
        }

        let before = self.diagram.revision();
        let removed = self.diagram.delete(id);
        for removed_id in &removed {
            self.registry.forget(*removed_id);
        }
        self.settle(before);
        Ok(removed)
    }

    /// Appends `child` to `parent`.
    ///
    /// # Errors
    ///
    /// See [`Diagram::set_owner`].
    pub fn append_to_parent(&mut self, child: Id, parent: Id) -> Result<(), AxonError> {
        let before = self.diagram.revision();
        self.diagram.append_to_parent(child, parent)?;
        self.settle(before);
        Ok(())
    }

    /// Validates and adds `relationship`.
    ///
    /// `NNComposition` relationships are first oriented towards their
    /// container.
    ///
    /// # Errors
    ///
    /// Returns [`AxonError::Connection`] if a connection rule rejects the
    /// relationship; nothing is added in that case.
    pub fn connect(&mut self, mut relationship: Relationship) -> Result<Id, AxonError> {
        rules::orient_composition(&self.diagram, &mut relationship);
        rules::validate_connection(&self.registry, &self.diagram, &relationship)?;

        let before = self.diagram.revision();
        let id = self.diagram.insert_relationship(relationship)?;
        debug!(relationship:% = id; "Connected");
        self.settle(before);
        Ok(id)
    }

    /// Updates relationship `id`.
    ///
    /// # Errors
    ///
    /// Returns a store error for an unknown id.
    pub fn update_relationship(&mut self, id: Id, patch: &RelationshipPatch) -> Result<(), AxonError> {
        let before = self.diagram.revision();
        self.diagram.update_relationship(id, patch)?;
        self.settle(before);
        Ok(())
    }

    /// Creates the missing mandatory attributes of layer `id`.
    ///
    /// # Errors
    ///
    /// See [`scaffold::scaffold`].
    pub fn scaffold(&mut self, id: Id) -> Result<Vec<Id>, AxonError> {
        let before = self.diagram.revision();
        let created = scaffold::scaffold(&mut self.diagram, id)?;
        self.settle(before);
        Ok(created)
    }

    /// Scaffolds every layer that owns none of its mandatory attributes.
    /// Returns the number of created attributes.
    pub fn scaffold_all(&mut self) -> usize {
        let before = self.diagram.revision();
        let pending: Vec<Id> = self
            .diagram
            .elements()
            .map(Element::id)
            .filter(|id| scaffold::needs_scaffolding(&self.diagram, *id))
            .collect();
        let created: usize = pending
            .into_iter()
            .filter_map(|id| scaffold::scaffold(&mut self.diagram, id).ok())
            .map(|created| created.len())
            .sum();
        self.settle(before);
        created
    }

    /// See [`scaffold::toggle_optional`].
    ///
    /// # Errors
    ///
    /// See [`scaffold::toggle_optional`].
    pub fn toggle_optional(
        &mut self,
        id: Id,
        slot: AttributeSlot,
        enabled: bool,
    ) -> Result<ToggleOutcome, AxonError> {
        let before = self.diagram.revision();
        let outcome = scaffold::toggle_optional(&mut self.diagram, id, slot, enabled)?;
        self.settle(before);
        Ok(outcome)
    }

    /// See [`scaffold::set_attribute_value`].
    ///
    /// # Errors
    ///
    /// See [`scaffold::set_attribute_value`].
    pub fn set_attribute_value(&mut self, id: Id, value: &str) -> Result<Vec<Id>, AxonError> {
        let before = self.diagram.revision();
        let written = scaffold::set_attribute_value(&mut self.diagram, id, value)?;
        self.settle(before);
        Ok(written)
    }

    /// See [`scaffold::select_module_input`].
    ///
    /// # Errors
    ///
    /// See [`scaffold::select_module_input`].
    pub fn select_module_input(&mut self, id: Id, selection: &str) -> Result<Option<Id>, AxonError> {
        let before = self.diagram.revision();
        let attribute = scaffold::select_module_input(&mut self.diagram, id, selection)?;
        self.settle(before);
        Ok(attribute)
    }

    /// See [`scaffold::apply_tensor_pair`].
    ///
    /// # Errors
    ///
    /// See [`scaffold::apply_tensor_pair`].
    pub fn apply_tensor_pair(
        &mut self,
        id: Id,
        selection: &TensorPairSelection,
    ) -> Result<Option<Id>, AxonError> {
        let before = self.diagram.revision();
        let attribute = scaffold::apply_tensor_pair(&mut self.diagram, id, selection)?;
        self.settle(before);
        Ok(attribute)
    }

    /// See [`scaffold::set_metric`].
    ///
    /// # Errors
    ///
    /// See [`scaffold::set_metric`].
    pub fn set_metric(&mut self, id: Id, metric: &str, enabled: bool) -> Result<String, AxonError> {
        let before = self.diagram.revision();
        let value = scaffold::set_metric(&mut self.diagram, id, metric, enabled)?;
        self.settle(before);
        Ok(value)
    }

    /// See [`scaffold::offered_optional`].
    ///
    /// # Errors
    ///
    /// See [`scaffold::offered_optional`].
    pub fn offered_optional(&self, id: Id) -> Result<Vec<AttributeSlot>, AxonError> {
        Ok(scaffold::offered_optional(&self.diagram, id)?)
    }

    /// See [`scaffold::predecessor_names`].
    pub fn predecessor_names(&self, id: Id) -> Vec<String> {
        scaffold::predecessor_names(&self.diagram, id)
    }

    /// Lays out the whole diagram, children before owners.
    pub fn layout(&mut self) {
        layout_engine(&self.config, self.measure.as_ref()).layout_all(&mut self.diagram);
    }

    /// Lays out element `id` and its subtree, then every owner above it.
    pub fn layout_from(&mut self, id: Id) -> Option<Bounds> {
        layout_engine(&self.config, self.measure.as_ref()).layout_from(&mut self.diagram, id)
    }

    /// Replaces the diagram with the contents of `document`.
    ///
    /// Legacy documents are migrated first. The document is rejected as a
    /// whole if any record is malformed, the ownership tree is inconsistent,
    /// or a relationship breaks a connection rule.
    ///
    /// # Errors
    ///
    /// Returns [`AxonError::Record`] or [`AxonError::Connection`].
    pub fn load(&mut self, mut document: Document) -> Result<(), AxonError> {
        let rewritten = migrate(&mut document)?;

        let mut diagram = Diagram::new();
        let mut registry = ElementRegistry::new(self.config.registry().capacity());
        for record in &document.elements {
            let element = element_from_record(record)?;
            registry.register(&element);
            diagram
                .insert_restored(element)
                .map_err(|err| RecordError::Inconsistent(err.to_string()))?;
        }
        diagram
            .verify_ownership()
            .map_err(|violation| RecordError::Inconsistent(violation.to_string()))?;

        for record in &document.relationships {
            let relationship = relationship_from_record(record)?;
            rules::validate_connection(&registry, &diagram, &relationship)?;
            diagram
                .insert_relationship(relationship)
                .map_err(|err| RecordError::Inconsistent(err.to_string()))?;
        }

        info!(
            elements = diagram.len(),
            relationships = document.relationships.len(),
            migrated = rewritten;
            "Document loaded"
        );
        self.diagram = diagram;
        self.registry = registry;
        self.run_observers();
        Ok(())
    }

    /// Serializes the diagram at the current document version.
    pub fn save(&self) -> Document {
        Document {
            version: CURRENT_VERSION,
            elements: self.diagram.elements().map(Persist::serialize).collect(),
            relationships: self.diagram.relationships().map(Persist::serialize).collect(),
        }
    }

    /// Parses and loads a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AxonError::Json`] for invalid JSON, otherwise as
    /// [`Session::load`].
    pub fn load_json(&mut self, json: &str) -> Result<(), AxonError> {
        let document: Document = serde_json::from_str(json)?;
        self.load(document)
    }

    /// Writes the diagram as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AxonError::Json`] if serialization fails.
    pub fn save_json(&self) -> Result<String, AxonError> {
        Ok(serde_json::to_string_pretty(&self.save())?)
    }
}
