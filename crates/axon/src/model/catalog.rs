//! Type catalog: every element and relationship type tag mapped to its constructor.

use std::sync::OnceLock;

use axon_core::identifier::Id;
use indexmap::IndexMap;

use super::{
    element::Element,
    kind::{ElementKind, RelationshipKind},
    relationship::Relationship,
};

fn element_entries() -> &'static IndexMap<String, ElementKind> {
    static ENTRIES: OnceLock<IndexMap<String, ElementKind>> = OnceLock::new();
    ENTRIES.get_or_init(|| {
        ElementKind::all()
            .into_iter()
            .map(|kind| (kind.type_tag().into_owned(), kind))
            .collect()
    })
}

/// Every element type tag, in catalog order.
pub fn element_tags() -> impl Iterator<Item = &'static str> {
    element_entries().keys().map(String::as_str)
}

/// Every relationship type tag.
pub fn relationship_tags() -> impl Iterator<Item = &'static str> {
    RelationshipKind::ALL.into_iter().map(RelationshipKind::type_tag)
}

pub fn element_kind(tag: &str) -> Option<ElementKind> {
    element_entries().get(tag).copied()
}

/// Constructs a default element for `tag`.
pub fn construct(tag: &str) -> Option<Element> {
    element_kind(tag).map(Element::new)
}

/// Constructs a relationship for `tag` between two elements.
pub fn construct_relationship(tag: &str, source: Id, target: Id) -> Option<Relationship> {
    RelationshipKind::from_type_tag(tag).map(|kind| Relationship::between(kind, source, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_has_a_constructor() {
        let tags: Vec<_> = element_tags().collect();
        assert!(tags.len() > 100);
        for tag in tags {
            let element = construct(tag).unwrap();
            assert_eq!(element.kind().type_tag(), tag);
        }
    }

    #[test]
    fn test_known_tags() {
        assert!(construct("Conv2DLayer").is_some());
        assert!(construct("NNContainer").is_some());
        assert!(construct("MetricsAttributeConfiguration").is_some());
        assert!(construct("Class").is_none());
        assert!(construct("KernelDimAttributeLinear").is_none());
    }

    #[test]
    fn test_relationship_constructors() {
        for tag in relationship_tags() {
            let rel = construct_relationship(tag, Id::new("a"), Id::new("b")).unwrap();
            assert_eq!(rel.kind().type_tag(), tag);
        }
        assert!(construct_relationship("ClassFoo", Id::new("a"), Id::new("b")).is_none());
    }
}
