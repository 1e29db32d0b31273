//! The universal diagram node.

use std::fmt;

use axon_core::{
    color::ElementStyle,
    geometry::{Bounds, Size},
    identifier::Id,
};

use super::{
    kind::{AttributeKind, ElementKind, LayerKind, MemberKind, SectionKind},
    schema::{AttributeDef, AttributeSlot, ValueKind},
};

pub const CONTAINER_DEFAULT_NAME: &str = "NeuralNetwork";
pub const REFERENCE_DEFAULT_NAME: &str = "SubNN";
pub const REFERENCE_PLACEHOLDER: &str = "Select NN...";

const ATTRIBUTE_ROW_HEIGHT: f32 = 22.0;
const MEMBER_ROW_HEIGHT: f32 = 30.0;

/// Data carried only by attribute elements.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeData {
    kind: AttributeKind,
    attribute_name: String,
    value: String,
}

impl AttributeData {
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn slot(&self) -> AttributeSlot {
        self.kind.slot()
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn value_kind(&self) -> ValueKind {
        self.kind.definition().value_kind()
    }

    /// Fixed by the attribute's schema entry.
    pub fn is_mandatory(&self) -> bool {
        self.kind.definition().is_mandatory()
    }

    /// The display label, `"{name} = {value}"`.
    pub fn label(&self) -> String {
        format!("{} = {}", self.attribute_name, self.value)
    }
}

/// Data carried only by reference elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    referenced_nn: String,
}

impl ReferenceData {
    /// Name of the referenced container; empty when none is selected.
    pub fn referenced_nn(&self) -> &str {
        &self.referenced_nn
    }
}

/// Kind-specific part of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Layer(LayerKind),
    Attribute(AttributeData),
    Member(MemberKind),
    Container,
    Reference(ReferenceData),
    Section(SectionKind),
}

/// A node of the diagram.
///
/// The owner link and the owned-elements list are only changed through the
/// [`Diagram`](crate::Diagram) so that both sides of the ownership relation stay
/// consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: Id,
    name: String,
    owner: Option<Id>,
    bounds: Bounds,
    style: ElementStyle,
    owned_elements: Vec<Id>,
    detail: Detail,
}

impl Element {
    /// Constructs an element of `kind` with its documented defaults and a fresh id.
    pub fn new(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Layer(layer) => Self::layer(layer),
            ElementKind::Attribute(attribute) => Self::attribute(attribute),
            ElementKind::Member(member) => Self::member(member),
            ElementKind::Container => Self::container(),
            ElementKind::Reference => Self::reference(),
            ElementKind::Section(section) => Self::section(section),
        }
    }

    fn with_detail(name: impl Into<String>, bounds: Bounds, detail: Detail) -> Self {
        Self {
            id: Id::generate(),
            name: name.into(),
            owner: None,
            bounds,
            style: ElementStyle::default(),
            owned_elements: Vec::new(),
            detail,
        }
    }

    pub fn layer(layer: LayerKind) -> Self {
        Self::with_detail(layer.default_name(), Bounds::default(), Detail::Layer(layer))
    }

    /// Creates an attribute holding its schema default value.
    pub fn attribute(kind: AttributeKind) -> Self {
        let def: &AttributeDef = kind.definition();
        let data = AttributeData {
            kind,
            attribute_name: def.slot().attribute_name().to_string(),
            value: def.default_value().to_string(),
        };
        Self::with_detail(
            data.label(),
            Bounds::new(0.0, 0.0, 0.0, ATTRIBUTE_ROW_HEIGHT),
            Detail::Attribute(data),
        )
    }

    pub fn member(member: MemberKind) -> Self {
        let name = match member {
            MemberKind::Attribute => "+ attribute: Type",
            MemberKind::Method => "+ method()",
        };
        Self::with_detail(
            name,
            Bounds::new(0.0, 0.0, 0.0, MEMBER_ROW_HEIGHT),
            Detail::Member(member),
        )
    }

    pub fn container() -> Self {
        Self::with_detail(
            CONTAINER_DEFAULT_NAME,
            Bounds::new(0.0, 0.0, 300.0, 600.0),
            Detail::Container,
        )
    }

    pub fn reference() -> Self {
        Self::with_detail(
            REFERENCE_DEFAULT_NAME,
            Bounds::new(0.0, 0.0, 140.0, 40.0),
            Detail::Reference(ReferenceData::default()),
        )
    }

    pub fn section(section: SectionKind) -> Self {
        let (name, size) = match section {
            SectionKind::Title => ("Section", Size::new(100.0, 40.0)),
            SectionKind::Separator => ("", Size::new(100.0, 15.0)),
        };
        Self::with_detail(
            name,
            Bounds::default().with_size(size),
            Detail::Section(section),
        )
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the value of an attribute element; ignored for other kinds.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        match &self.detail {
            Detail::Layer(layer) => ElementKind::Layer(*layer),
            Detail::Attribute(data) => ElementKind::Attribute(data.kind),
            Detail::Member(member) => ElementKind::Member(*member),
            Detail::Container => ElementKind::Container,
            Detail::Reference(_) => ElementKind::Reference,
            Detail::Section(section) => ElementKind::Section(*section),
        }
    }

    pub fn detail(&self) -> &Detail {
        &self.detail
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<Id> {
        self.owner
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn style(&self) -> &ElementStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    /// Ids of owned children, in display order.
    pub fn owned_elements(&self) -> &[Id] {
        &self.owned_elements
    }

    pub fn is_composite(&self) -> bool {
        self.kind().is_composite()
    }

    pub fn layer_kind(&self) -> Option<LayerKind> {
        self.kind().layer()
    }

    pub fn attribute_data(&self) -> Option<&AttributeData> {
        match &self.detail {
            Detail::Attribute(data) => Some(data),
            _ => None,
        }
    }

    pub fn reference_data(&self) -> Option<&ReferenceData> {
        match &self.detail {
            Detail::Reference(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_mandatory_attribute(&self) -> bool {
        self.attribute_data().is_some_and(AttributeData::is_mandatory)
    }

    /// Sets the name. Attributes derive their name from attribute name and
    /// value, so for them the label is recomputed instead.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.refresh_label();
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Sets an attribute's value and recomputes its label.
    ///
    /// Returns `false` when the element is not an attribute.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let Detail::Attribute(data) = &mut self.detail else {
            return false;
        };
        data.value = value.into();
        self.refresh_label();
        true
    }

    /// Renames an attribute and recomputes its label.
    ///
    /// Returns `false` when the element is not an attribute.
    pub fn set_attribute_name(&mut self, attribute_name: impl Into<String>) -> bool {
        let Detail::Attribute(data) = &mut self.detail else {
            return false;
        };
        data.attribute_name = attribute_name.into();
        self.refresh_label();
        true
    }

    /// Points a reference at a container by name. The reference takes that
    /// name, or its default name when `referenced` is empty.
    ///
    /// Returns `false` when the element is not a reference.
    pub fn set_referenced_nn(&mut self, referenced: impl Into<String>) -> bool {
        let Detail::Reference(data) = &mut self.detail else {
            return false;
        };
        data.referenced_nn = referenced.into();
        self.name = if data.referenced_nn.is_empty() {
            REFERENCE_DEFAULT_NAME.to_string()
        } else {
            data.referenced_nn.clone()
        };
        true
    }

    /// Text a reference displays: the referenced container, its own name, or
    /// a selection prompt.
    pub fn reference_label(&self) -> Option<&str> {
        let data = self.reference_data()?;
        Some(if !data.referenced_nn.is_empty() {
            &data.referenced_nn
        } else if !self.name.is_empty() {
            &self.name
        } else {
            REFERENCE_PLACEHOLDER
        })
    }

    /// Recomputes derived fields. Only attributes have any.
    pub(crate) fn refresh_label(&mut self) {
        if let Detail::Attribute(data) = &self.detail {
            self.name = data.label();
        }
    }

    pub(crate) fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub(crate) fn set_owner_link(&mut self, owner: Option<Id>) {
        self.owner = owner;
    }

    pub(crate) fn owned_elements_mut(&mut self) -> &mut Vec<Id> {
        &mut self.owned_elements
    }

    pub(crate) fn set_reference_target_raw(&mut self, referenced: String) {
        if let Detail::Reference(data) = &mut self.detail {
            data.referenced_nn = referenced;
        }
    }

    pub(crate) fn set_attribute_fields_raw(&mut self, attribute_name: Option<String>, value: Option<String>) {
        if let Detail::Attribute(data) = &mut self.detail {
            if let Some(attribute_name) = attribute_name {
                data.attribute_name = attribute_name;
            }
            if let Some(value) = value {
                data.value = value;
            }
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` ({})", self.kind(), self.name, self.id)
    }
}
