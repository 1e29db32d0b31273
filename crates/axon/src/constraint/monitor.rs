//! Observers re-applied after every change of the element collection.

use axon_core::identifier::Id;
use log::debug;

use crate::{
    model::RelationshipKind,
    store::{Diagram, RelationshipPatch},
};

/// Keeps derived state of a diagram up to date.
///
/// Observers must be idempotent: running one on a diagram it already
/// corrected changes nothing.
pub trait ChangeObserver {
    fn name(&self) -> &'static str;

    /// Corrects `diagram`, returning the number of corrections made.
    fn observe(&mut self, diagram: &mut Diagram) -> usize;
}

/// Renames generic unidirectional links between convolution layers to `next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextLabelMonitor;

impl NextLabelMonitor {
    pub const LABEL: &'static str = "next";

    fn is_convolution(diagram: &Diagram, id: Id) -> bool {
        diagram
            .get_by_id(id)
            .and_then(|element| element.layer_kind())
            .is_some_and(|layer| layer.is_convolution())
    }
}

impl ChangeObserver for NextLabelMonitor {
    fn name(&self) -> &'static str {
        "next-label"
    }

    fn observe(&mut self, diagram: &mut Diagram) -> usize {
        let stale: Vec<Id> = diagram
            .relationships()
            .filter(|rel| rel.kind() == RelationshipKind::ClassUnidirectional && rel.name() != Self::LABEL)
            .filter(|rel| {
                Self::is_convolution(diagram, rel.source().element())
                    && Self::is_convolution(diagram, rel.target().element())
            })
            .map(|rel| rel.id())
            .collect();

        let patch = RelationshipPatch::new().name(Self::LABEL);
        stale
            .into_iter()
            .filter(|id| diagram.update_relationship(*id, &patch).is_ok())
            .inspect(|id| debug!(relationship:% = id; "Renamed relationship to next"))
            .count()
    }
}
