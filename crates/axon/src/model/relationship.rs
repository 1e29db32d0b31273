//! Directed edges between elements.

use std::fmt;

use axon_core::{
    color::ElementStyle,
    geometry::{Bounds, Point},
    identifier::Id,
};
use serde::{Deserialize, Serialize};

use super::kind::RelationshipKind;

/// One end of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    element: Id,
    #[serde(default)]
    multiplicity: String,
    #[serde(default)]
    role: String,
}

impl Endpoint {
    pub fn new(element: Id) -> Self {
        Self {
            element,
            multiplicity: String::new(),
            role: String::new(),
        }
    }

    pub fn with_multiplicity(mut self, multiplicity: impl Into<String>) -> Self {
        self.multiplicity = multiplicity.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn element(&self) -> Id {
        self.element
    }

    pub fn multiplicity(&self) -> &str {
        &self.multiplicity
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

/// A typed, directed edge with a waypoint path.
///
/// Constructing a relationship never validates it; admission into a diagram
/// goes through [`Session::connect`](crate::Session::connect).
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    id: Id,
    kind: RelationshipKind,
    name: String,
    source: Endpoint,
    target: Endpoint,
    path: Vec<Point>,
    bounds: Bounds,
    style: ElementStyle,
}

impl Relationship {
    pub fn new(kind: RelationshipKind, source: Endpoint, target: Endpoint) -> Self {
        Self {
            id: Id::generate(),
            kind,
            name: kind.default_name().to_string(),
            source,
            target,
            path: Vec::new(),
            bounds: Bounds::default(),
            style: ElementStyle::default(),
        }
    }

    /// Shorthand for a relationship between two bare element ids.
    pub fn between(kind: RelationshipKind, source: Id, target: Id) -> Self {
        Self::new(kind, Endpoint::new(source), Endpoint::new(target))
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_path(mut self, path: Vec<Point>) -> Self {
        self.path = path;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    pub fn path(&self) -> &[Point] {
        &self.path
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

    /// Returns `true` if either endpoint refers to `element`.
    pub fn touches(&self, element: Id) -> bool {
        self.source.element == element || self.target.element == element
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_path(&mut self, path: Vec<Point>) {
        self.path = path;
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub(crate) fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub(crate) fn set_endpoints(&mut self, source: Endpoint, target: Endpoint) {
        self.source = source;
        self.target = target;
    }

    pub(crate) fn reverse(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` {} -> {}",
            self.kind, self.name, self.source.element, self.target.element
        )
    }
}
