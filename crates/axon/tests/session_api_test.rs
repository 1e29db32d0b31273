//! Integration tests for the Session API
//!
//! These tests drive the engine only through its public command surface.

use axon::{
    AxonError, ElementPatch, Session,
    config::AppConfig,
    constraint::ConnectionError,
    identifier::Id,
    model::{
        AttributeSlot, Document, Element, LayerKind, RecordError, Relationship, RelationshipKind,
        migrate::CURRENT_VERSION,
    },
    scaffold::{ScaffoldError, TensorPairSelection, ToggleOutcome, attribute_value, find_attribute},
    text::FixedAdvanceMeasure,
};

fn session() -> Session {
    Session::new(AppConfig::default(), FixedAdvanceMeasure::new(10.0, 16.0))
}

fn named_layer(session: &mut Session, kind: LayerKind, name: &str) -> Id {
    let id = session.create(Element::layer(kind), None).unwrap();
    let name_attr = find_attribute(session.diagram(), id, AttributeSlot::Name)
        .unwrap()
        .id();
    session.set_attribute_value(name_attr, name).unwrap();
    id
}

#[test]
fn test_create_scaffolds_mandatory_attributes() {
    let mut session = session();
    for kind in LayerKind::ALL {
        let id = session.create(Element::layer(kind), None).unwrap();
        let layer = session.get_by_id(id).unwrap();
        let mandatory = axon::model::schema(kind).mandatory().count();

        assert_eq!(layer.owned_elements().len(), mandatory, "{kind}");
        for def in axon::model::schema(kind).mandatory() {
            assert_eq!(
                attribute_value(session.diagram(), id, def.slot()),
                Some(def.default_value()),
                "{kind} {}",
                def.slot().attribute_name()
            );
        }
    }
}

#[test]
fn test_ownership_follows_create_append_and_delete() {
    let mut session = session();
    let container = session.create(Element::container(), None).unwrap();
    let conv = session.create(Element::layer(LayerKind::Conv2D), None).unwrap();
    let linear = session.create(Element::layer(LayerKind::Linear), Some(container)).unwrap();

    session.append_to_parent(conv, container).unwrap();
    assert_eq!(session.get_by_id(conv).unwrap().owner(), Some(container));
    assert_eq!(session.get_by_id(container).unwrap().owned_elements(), &[linear, conv]);
    session.diagram().verify_ownership().unwrap();

    let removed = session.delete(container).unwrap();
    // Container, two layers, and 3 + 2 scaffolded attributes.
    assert_eq!(removed.len(), 8);
    assert!(session.diagram().is_empty());
}

#[test]
fn test_mandatory_attribute_cannot_be_deleted_alone() {
    let mut session = session();
    let conv = session.create(Element::layer(LayerKind::Conv1D), None).unwrap();
    let kernel = find_attribute(session.diagram(), conv, AttributeSlot::KernelDim)
        .unwrap()
        .id();

    let result = session.delete(kernel);
    assert!(matches!(
        result,
        Err(AxonError::Scaffold(ScaffoldError::MandatoryAttribute { slot: "kernel_dim" }))
    ));
    assert!(session.get_by_id(kernel).is_some());

    let removed = session.delete(conv).unwrap();
    assert!(removed.contains(&kernel));
    assert!(session.get_by_id(kernel).is_none());
}

#[test]
fn test_pooling_dimension_cascades_to_kernel_and_stride() {
    let mut session = session();
    let pooling = session.create(Element::layer(LayerKind::Pooling), None).unwrap();
    assert!(matches!(
        session.toggle_optional(pooling, AttributeSlot::KernelDim, true).unwrap(),
        ToggleOutcome::Created(_)
    ));
    session.toggle_optional(pooling, AttributeSlot::StrideDim, true).unwrap();
    let dimension = find_attribute(session.diagram(), pooling, AttributeSlot::Dimension)
        .unwrap()
        .id();

    session.set_attribute_value(dimension, "1D").unwrap();
    assert_eq!(attribute_value(session.diagram(), pooling, AttributeSlot::KernelDim), Some("[3]"));
    assert_eq!(attribute_value(session.diagram(), pooling, AttributeSlot::StrideDim), Some("[1]"));

    session.update(dimension, &ElementPatch::new().value("3D")).unwrap();
    assert_eq!(
        attribute_value(session.diagram(), pooling, AttributeSlot::KernelDim),
        Some("[3, 3, 3]")
    );
    assert_eq!(
        attribute_value(session.diagram(), pooling, AttributeSlot::StrideDim),
        Some("[1, 1, 1]")
    );
}

#[test]
fn test_next_to_container_or_configuration_is_rejected() {
    let mut session = session();
    let conv = session.create(Element::layer(LayerKind::Conv2D), None).unwrap();
    let container = session.create(Element::container(), None).unwrap();
    let configuration = session.create(Element::layer(LayerKind::Configuration), None).unwrap();

    let to_container = session.connect(Relationship::between(RelationshipKind::NNNext, conv, container));
    match to_container {
        Err(AxonError::Connection(err)) => {
            assert_eq!(err, ConnectionError::NextToContainer { endpoint: container });
            assert_eq!(err.to_string(), "NNNext cannot connect to NNContainer");
        }
        other => panic!("expected a connection error, got {other:?}"),
    }

    let from_configuration =
        session.connect(Relationship::between(RelationshipKind::NNNext, configuration, conv));
    assert!(matches!(
        from_configuration,
        Err(AxonError::Connection(ConnectionError::NextToConfiguration { .. }))
    ));
    assert_eq!(session.diagram().relationships().count(), 0);
}

#[test]
fn test_unidirectional_between_convolutions_is_renamed() {
    let mut session = session();
    let a = session.create(Element::layer(LayerKind::Conv2D), None).unwrap();
    let b = session.create(Element::layer(LayerKind::Conv3D), None).unwrap();
    let linear = session.create(Element::layer(LayerKind::Linear), None).unwrap();

    let renamed = session
        .connect(Relationship::between(RelationshipKind::ClassUnidirectional, a, b).with_name("foo"))
        .unwrap();
    let kept = session
        .connect(Relationship::between(RelationshipKind::ClassUnidirectional, a, linear).with_name("foo"))
        .unwrap();

    assert_eq!(session.relationship(renamed).unwrap().name(), "next");
    assert_eq!(session.relationship(kept).unwrap().name(), "foo");
}

#[test]
fn test_registry_evicts_oldest_container() {
    let mut session = session();
    let containers: Vec<Id> = (0..101)
        .map(|_| session.create(Element::container(), None).unwrap())
        .collect();

    assert!(!session.registry().is_container(containers[0]));
    assert!(containers[1..].iter().all(|id| session.registry().is_container(*id)));

    // The evicted container is still recognised by its type.
    let conv = session.create(Element::layer(LayerKind::Conv2D), None).unwrap();
    let result = session.connect(Relationship::between(RelationshipKind::NNNext, conv, containers[0]));
    assert!(matches!(
        result,
        Err(AxonError::Connection(ConnectionError::NextToContainer { .. }))
    ));
}

#[test]
fn test_tensor_pair_from_predecessors() {
    let mut session = session();
    let a = named_layer(&mut session, LayerKind::Linear, "a");
    let b = named_layer(&mut session, LayerKind::Linear, "b");
    let op = named_layer(&mut session, LayerKind::TensorOp, "op");
    session.connect(Relationship::between(RelationshipKind::NNNext, a, op)).unwrap();
    session.connect(Relationship::between(RelationshipKind::NNNext, b, op)).unwrap();

    let names = session.predecessor_names(op);
    assert_eq!(names, vec!["a", "b"]);

    let mut selection = TensorPairSelection::default();
    selection.set_first(&names[0]);
    assert_eq!(session.apply_tensor_pair(op, &selection).unwrap(), None);
    assert!(find_attribute(session.diagram(), op, AttributeSlot::LayersOfTensors).is_none());

    selection.set_second(&names[1]);
    session.apply_tensor_pair(op, &selection).unwrap().unwrap();
    assert_eq!(
        attribute_value(session.diagram(), op, AttributeSlot::LayersOfTensors),
        Some("['a', 'b']")
    );

    selection.set_second("");
    assert_eq!(session.apply_tensor_pair(op, &selection).unwrap(), None);
    assert!(find_attribute(session.diagram(), op, AttributeSlot::LayersOfTensors).is_none());
}

#[test]
fn test_tensor_op_offer_follows_operation() {
    let mut session = session();
    let op = session.create(Element::layer(LayerKind::TensorOp), None).unwrap();
    assert_eq!(
        session.offered_optional(op).unwrap(),
        vec![AttributeSlot::ReshapeDim]
    );

    let tns_type = find_attribute(session.diagram(), op, AttributeSlot::TnsType)
        .unwrap()
        .id();
    session.set_attribute_value(tns_type, "concatenate").unwrap();
    assert_eq!(
        session.offered_optional(op).unwrap(),
        vec![AttributeSlot::ConcatenateDim, AttributeSlot::LayersOfTensors]
    );
}

#[test]
fn test_metrics_keep_canonical_order() {
    let mut session = session();
    let configuration = session.create(Element::layer(LayerKind::Configuration), None).unwrap();

    assert_eq!(session.set_metric(configuration, "mae", true).unwrap(), "[accuracy, mae]");
    assert_eq!(
        session.set_metric(configuration, "precision", true).unwrap(),
        "[accuracy, precision, mae]"
    );
    assert_eq!(
        session.set_metric(configuration, "accuracy", false).unwrap(),
        "[precision, mae]"
    );
    assert!(matches!(
        session.set_metric(configuration, "bleu", true),
        Err(AxonError::Scaffold(ScaffoldError::UnknownOption { .. }))
    ));
}

#[test]
fn test_layout_is_idempotent() {
    let mut session = session();
    let container = session.create(Element::container(), None).unwrap();
    for kind in [LayerKind::Conv2D, LayerKind::Pooling, LayerKind::Linear] {
        session.create(Element::layer(kind), Some(container)).unwrap();
    }
    session.create(Element::reference(), Some(container)).unwrap();

    session.layout();
    let first: Vec<_> = session.diagram().elements().map(|e| (e.id(), e.bounds())).collect();
    let revision = session.diagram().revision();

    session.layout();
    let second: Vec<_> = session.diagram().elements().map(|e| (e.id(), e.bounds())).collect();
    assert_eq!(first, second);
    assert_eq!(session.diagram().revision(), revision);

    let config = session.config().layout();
    for element in session.diagram().elements().filter(|e| e.layer_kind().is_some()) {
        assert!(element.bounds().width() >= config.composite_min_width());
        assert_eq!(element.bounds().width() % config.grid(), 0.0);
    }
    let container_bounds = session.get_by_id(container).unwrap().bounds();
    assert!(container_bounds.width() >= config.container_min_width());
    assert!(container_bounds.height() >= config.container_min_height());
}

#[test]
fn test_layout_from_grows_owner() {
    let mut session = session();
    let container = session.create(Element::container(), None).unwrap();
    let linear = named_layer(&mut session, LayerKind::Linear, "short");
    session.append_to_parent(linear, container).unwrap();
    session.layout();
    let before = session.get_by_id(container).unwrap().bounds();

    let name_attr = find_attribute(session.diagram(), linear, AttributeSlot::Name)
        .unwrap()
        .id();
    session
        .set_attribute_value(name_attr, "a considerably longer layer name than before")
        .unwrap();
    let layer_bounds = session.layout_from(name_attr).unwrap();

    assert!(layer_bounds.width() > 0.0);
    let after = session.get_by_id(container).unwrap().bounds();
    assert!(after.width() > before.width());
}

#[test]
fn test_save_and_load_round_trip() {
    let mut original = session();
    let container = original.create(Element::container(), None).unwrap();
    let conv = original.create(Element::layer(LayerKind::Conv2D), Some(container)).unwrap();
    let linear = original.create(Element::layer(LayerKind::Linear), Some(container)).unwrap();
    original
        .update(conv, &ElementPatch::new().fill_color(Some("#ffcc00")))
        .unwrap();
    original.toggle_optional(conv, AttributeSlot::PaddingType, true).unwrap();
    original
        .connect(Relationship::between(RelationshipKind::NNNext, conv, linear))
        .unwrap();
    original.layout();

    let document = original.save();
    assert_eq!(document.version, CURRENT_VERSION);

    let mut restored = session();
    restored.load(document.clone()).unwrap();
    assert_eq!(restored.save(), document);
    assert!(restored.registry().is_container(container));
    assert_eq!(
        restored.get_by_id(conv).unwrap().style().fill_color(),
        Some("#ffcc00")
    );

    let json = restored.save_json().unwrap();
    let mut from_json = session();
    from_json.load_json(&json).unwrap();
    assert_eq!(from_json.save(), document);
}

#[test]
fn test_load_migrates_legacy_values() {
    let json = r#"{
        "elements": [
            { "id": "pool", "type": "PoolingLayer", "owner": null, "ownedElements": ["dim", "pad"] },
            { "id": "dim", "type": "DimensionAttributePooling", "owner": "pool", "value": "4D" },
            { "id": "pad", "type": "PaddingTypeAttributePooling", "owner": "pool", "value": "zeros" }
        ]
    }"#;

    let mut session = session();
    session.load_json(json).unwrap();

    let pool = Id::new("pool");
    assert_eq!(attribute_value(session.diagram(), pool, AttributeSlot::Dimension), Some("2D"));
    assert_eq!(attribute_value(session.diagram(), pool, AttributeSlot::PaddingType), Some("valid"));
    assert_eq!(session.get_by_id(Id::new("dim")).unwrap().name(), "dimension = 2D");
    assert_eq!(session.save().version, CURRENT_VERSION);
}

#[test]
fn test_load_rejects_inconsistent_ownership() {
    let json = r#"{
        "version": 2,
        "elements": [
            { "id": "box", "type": "NNContainer", "owner": null, "ownedElements": [] },
            { "id": "lin", "type": "LinearLayer", "owner": "box", "ownedElements": [] }
        ]
    }"#;

    let mut session = session();
    let existing = session.create(Element::container(), None).unwrap();
    let result = session.load_json(json);

    assert!(matches!(result, Err(AxonError::Record(RecordError::Inconsistent(_)))));
    // The previous diagram is kept.
    assert!(session.get_by_id(existing).is_some());
}

#[test]
fn test_load_rejects_forbidden_connection() {
    let json = r#"{
        "version": 2,
        "elements": [
            { "id": "box", "type": "NNContainer", "owner": null },
            { "id": "lin", "type": "LinearLayer", "owner": null }
        ],
        "relationships": [
            { "id": "r1", "type": "NNNext", "source": { "element": "lin" }, "target": { "element": "box" } }
        ]
    }"#;

    let mut session = session();
    assert!(matches!(
        session.load_json(json),
        Err(AxonError::Connection(ConnectionError::NextToContainer { .. }))
    ));
    assert!(matches!(session.load_json("{ not json"), Err(AxonError::Json(_))));
    assert!(matches!(
        session.load(Document {
            version: CURRENT_VERSION + 1,
            ..Document::default()
        }),
        Err(AxonError::Record(RecordError::UnsupportedVersion(_)))
    ));
}

#[test]
fn test_failed_create_leaves_no_trace() {
    let mut session = session();
    let conv = session.create(Element::layer(LayerKind::Conv2D), None).unwrap();
    let attribute = session.get_by_id(conv).unwrap().owned_elements()[0];
    let elements = session.diagram().len();
    let revision = session.diagram().revision();

    let container = Element::container();
    let container_id = container.id();
    assert!(session.create(container, Some(attribute)).is_err());

    assert!(session.get_by_id(container_id).is_none());
    assert!(!session.registry().is_container(container_id));
    assert!(session.registry().containers().is_empty());
    assert_eq!(session.diagram().len(), elements);
    assert_eq!(session.diagram().revision(), revision);
}
