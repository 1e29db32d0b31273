//! Which relationships may connect which elements.

use axon_core::identifier::Id;
use log::{debug, warn};
use thiserror::Error;

use super::registry::ElementRegistry;
use crate::{
    model::{ElementKind, LayerKind, Relationship, RelationshipKind},
    store::Diagram,
};

/// A relationship rejected at construction time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("NNNext cannot connect to NNContainer")]
    NextToContainer { endpoint: Id },

    #[error("NNNext cannot connect to Configuration")]
    NextToConfiguration { endpoint: Id },

    #[error("element `{endpoint}` does not support {kind} relationships")]
    Unsupported { kind: RelationshipKind, endpoint: Id },
}

impl ConnectionError {
    /// The endpoint that caused the rejection.
    pub fn endpoint(&self) -> Id {
        match self {
            ConnectionError::NextToContainer { endpoint }
            | ConnectionError::NextToConfiguration { endpoint }
            | ConnectionError::Unsupported { endpoint, .. } => *endpoint,
        }
    }
}

/// Returns `true` if elements of `kind` may take part in `relationship`.
pub fn supports(kind: ElementKind, relationship: RelationshipKind) -> bool {
    kind.supported_relationships().contains(&relationship)
}

/// Returns `true` if both endpoint kinds support `relationship`.
pub fn is_compatible(relationship: RelationshipKind, source: ElementKind, target: ElementKind) -> bool {
    supports(source, relationship) && supports(target, relationship)
}

fn reject_next_endpoint(
    registry: &ElementRegistry,
    diagram: &Diagram,
    endpoint: Id,
) -> Result<(), ConnectionError> {
    if registry.is_container(endpoint) {
        return Err(ConnectionError::NextToContainer { endpoint });
    }
    if registry.is_configuration(endpoint) {
        return Err(ConnectionError::NextToConfiguration { endpoint });
    }
    // Evicted or never registered: the type tag decides.
    match diagram.get_by_id(endpoint).map(|element| element.kind()) {
        Some(ElementKind::Container) => Err(ConnectionError::NextToContainer { endpoint }),
        Some(ElementKind::Layer(LayerKind::Configuration)) => {
            Err(ConnectionError::NextToConfiguration { endpoint })
        }
        _ => Ok(()),
    }
}

/// Rejects a `NNNext` relationship with a container or configuration endpoint.
///
/// # Errors
///
/// Returns the rejection for the first offending endpoint, source first.
pub fn check_next_endpoints(
    registry: &ElementRegistry,
    diagram: &Diagram,
    relationship: &Relationship,
) -> Result<(), ConnectionError> {
    if relationship.kind() != RelationshipKind::NNNext {
        return Ok(());
    }
    reject_next_endpoint(registry, diagram, relationship.source().element())?;
    reject_next_endpoint(registry, diagram, relationship.target().element())
}

/// Runs every connection rule against `relationship`.
///
/// Unresolved endpoints are not an error; they only skip the per-kind check.
///
/// # Errors
///
/// Returns a [`ConnectionError`] if the relationship must not be added.
pub fn validate_connection(
    registry: &ElementRegistry,
    diagram: &Diagram,
    relationship: &Relationship,
) -> Result<(), ConnectionError> {
    check_next_endpoints(registry, diagram, relationship)?;

    let kind = relationship.kind();
    for endpoint in [relationship.source().element(), relationship.target().element()] {
        match diagram.get_by_id(endpoint) {
            Some(element) if !supports(element.kind(), kind) => {
                return Err(ConnectionError::Unsupported { kind, endpoint });
            }
            Some(_) => {}
            None => warn!(endpoint:% = endpoint, kind:% = kind; "Relationship endpoint unresolved"),
        }
    }
    Ok(())
}

/// Puts the container of a `NNComposition` on the target side.
///
/// Returns `true` if the endpoints were swapped.
pub fn orient_composition(diagram: &Diagram, relationship: &mut Relationship) -> bool {
    if relationship.kind() != RelationshipKind::NNComposition {
        return false;
    }
    let kind_of = |id: Id| diagram.get_by_id(id).map(|element| element.kind());
    let source_is_container = kind_of(relationship.source().element()) == Some(ElementKind::Container);
    let target_is_container = kind_of(relationship.target().element()) == Some(ElementKind::Container);
    if source_is_container && !target_is_container {
        debug!(relationship:% = relationship.id(); "Reversing composition towards its container");
        relationship.reverse();
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    fn setup() -> (Diagram, ElementRegistry, Id, Id, Id, Id) {
        let mut diagram = Diagram::new();
        let mut registry = ElementRegistry::new(100);
        let container = Element::container();
        let configuration = Element::layer(LayerKind::Configuration);
        registry.register(&container);
        registry.register(&configuration);
        let container = diagram.create(container, None).unwrap();
        let configuration = diagram.create(configuration, None).unwrap();
        let a = diagram.create(Element::layer(LayerKind::Conv2D), None).unwrap();
        let b = diagram.create(Element::layer(LayerKind::Linear), None).unwrap();
        (diagram, registry, container, configuration, a, b)
    }

    #[test]
    fn test_next_rejects_special_endpoints() {
        let (diagram, registry, container, configuration, a, _) = setup();

        let rel = Relationship::between(RelationshipKind::NNNext, a, container);
        assert_eq!(
            validate_connection(&registry, &diagram, &rel),
            Err(ConnectionError::NextToContainer { endpoint: container })
        );

        let rel = Relationship::between(RelationshipKind::NNNext, configuration, a);
        let err = validate_connection(&registry, &diagram, &rel).unwrap_err();
        assert_eq!(err.to_string(), "NNNext cannot connect to Configuration");
        assert_eq!(err.endpoint(), configuration);
    }

    #[test]
    fn test_type_tag_fallback_after_eviction() {
        let (diagram, _, container, _, a, _) = setup();
        let empty = ElementRegistry::new(0);

        let rel = Relationship::between(RelationshipKind::NNNext, a, container);
        assert_eq!(
            check_next_endpoints(&empty, &diagram, &rel),
            Err(ConnectionError::NextToContainer { endpoint: container })
        );
    }

    #[test]
    fn test_next_between_layers_is_allowed() {
        let (diagram, registry, _, _, a, b) = setup();
        let rel = Relationship::between(RelationshipKind::NNNext, a, b);
        assert!(validate_connection(&registry, &diagram, &rel).is_ok());

        let dangling = Relationship::between(RelationshipKind::NNNext, a, Id::new("ghost"));
        assert!(validate_connection(&registry, &diagram, &dangling).is_ok());
    }

    #[test]
    fn test_unsupported_kind() {
        let (diagram, registry, container, _, a, _) = setup();
        let rel = Relationship::between(RelationshipKind::NNComposition, a, container);
        assert_eq!(
            validate_connection(&registry, &diagram, &rel),
            Err(ConnectionError::Unsupported {
                kind: RelationshipKind::NNComposition,
                endpoint: a
            })
        );
    }

    #[test]
    fn test_compatibility_table() {
        let conv = ElementKind::Layer(LayerKind::Conv1D);
        let config = ElementKind::Layer(LayerKind::Configuration);
        assert!(is_compatible(RelationshipKind::NNNext, conv, ElementKind::Reference));
        assert!(!is_compatible(RelationshipKind::NNNext, conv, config));
        assert!(is_compatible(RelationshipKind::NNComposition, config, ElementKind::Container));
        assert!(is_compatible(RelationshipKind::ClassDependency, conv, config));
    }

    #[test]
    fn test_composition_is_oriented_towards_container() {
        let (diagram, _, container, configuration, _, _) = setup();
        let mut rel = Relationship::between(RelationshipKind::NNComposition, container, configuration);

        assert!(orient_composition(&diagram, &mut rel));
        assert_eq!(rel.source().element(), configuration);
        assert_eq!(rel.target().element(), container);
        assert!(!orient_composition(&diagram, &mut rel));
    }
}
