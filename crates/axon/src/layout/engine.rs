use axon_core::{
    geometry::{Bounds, round_up_to_grid},
    identifier::Id,
    text::{FontWeight, TextMeasure, TextStyle},
};
use log::{debug, info};

use super::{
    classifier::{self, layout_classifier},
    container::{layout_container, layout_reference},
};
use crate::{config::LayoutConfig, model::ElementKind, store::Diagram};

/// Computes element bounds with a given configuration and text measure.
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    measure: &'a dyn TextMeasure,
    text_style: TextStyle,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig, measure: &'a dyn TextMeasure) -> Self {
        Self {
            config,
            measure,
            text_style: TextStyle::default(),
        }
    }

    /// Sets the text style labels are measured with.
    pub fn with_text_style(mut self, text_style: TextStyle) -> Self {
        self.text_style = text_style;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    pub(super) fn text_width(&self, text: &str, weight: FontWeight) -> f32 {
        self.measure
            .measure(text, &self.text_style.with_weight(weight))
            .width()
    }

    /// Measured width plus padding, rounded up to the grid.
    pub(super) fn label_width(&self, text: &str, weight: FontWeight) -> f32 {
        round_up_to_grid(
            self.text_width(text, weight) + self.config.text_padding(),
            self.config.grid(),
        )
    }

    /// Lays out one element from its current children.
    ///
    /// Rows have no layout of their own and section elements are skipped;
    /// for those, and for unknown ids, `None` is returned.
    pub fn layout_element(&self, diagram: &mut Diagram, id: Id) -> Option<Bounds> {
        let kind = diagram.get_by_id(id)?.kind();
        match kind {
            ElementKind::Layer(_) => layout_classifier(
                self,
                diagram,
                id,
                |child| classifier::row_height(self.config, child),
                classifier::is_visible_for_sizing,
            ),
            ElementKind::Container => layout_container(self, diagram, id),
            ElementKind::Reference => layout_reference(self, diagram, id),
            ElementKind::Attribute(_) | ElementKind::Member(_) | ElementKind::Section(_) => None,
        }
    }

    /// Lays out every element, children before their owners.
    pub fn layout_all(&self, diagram: &mut Diagram) {
        let roots: Vec<Id> = diagram.roots().map(|element| element.id()).collect();
        let mut count = 0;
        for root in roots {
            for id in diagram.subtree(root).into_iter().rev() {
                if self.layout_element(diagram, id).is_some() {
                    count += 1;
                }
            }
        }
        info!(elements = count; "Layout finished");
    }

    /// Lays out `id` with its subtree, then each of its owners in turn.
    pub fn layout_from(&self, diagram: &mut Diagram, id: Id) -> Option<Bounds> {
        diagram.get_by_id(id)?;
        for descendant in diagram.subtree(id).into_iter().rev() {
            self.layout_element(diagram, descendant);
        }
        let bounds = diagram.get_by_id(id).map(|element| element.bounds());

        let mut owner = diagram.get_by_id(id).and_then(|element| element.owner());
        while let Some(current) = owner {
            debug!(element_id:% = current; "Propagating layout to owner");
            self.layout_element(diagram, current);
            owner = diagram.get_by_id(current).and_then(|element| element.owner());
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use axon_core::text::FixedAdvanceMeasure;
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::{
        model::{AttributeKind, Element, LayerKind, SectionKind, schema::AttributeSlot},
        store::ElementPatch,
    };

    fn attribute(layer: LayerKind, slot: AttributeSlot) -> Element {
        Element::attribute(AttributeKind::new(layer, slot).unwrap())
    }

    /// A Conv2D layer with its three mandatory rows and one optional row.
    fn conv_layer(diagram: &mut Diagram, owner: Option<Id>) -> Id {
        let layer = diagram.create(Element::layer(LayerKind::Conv2D), owner).unwrap();
        for slot in [
            AttributeSlot::Name,
            AttributeSlot::KernelDim,
            AttributeSlot::OutChannels,
            AttributeSlot::StrideDim,
        ] {
            diagram
                .create(attribute(LayerKind::Conv2D, slot), Some(layer))
                .unwrap();
        }
        layer
    }

    #[test]
    fn test_layer_height_counts_only_mandatory_rows() {
        let config = LayoutConfig::default();
        let measure = FixedAdvanceMeasure::new(10.0, 16.0);
        let engine = LayoutEngine::new(&config, &measure);
        let mut diagram = Diagram::new();
        let layer = conv_layer(&mut diagram, None);

        let bounds = engine.layout_element(&mut diagram, layer).unwrap();

        assert_approx_eq!(f32, bounds.height(), 40.0 + 3.0 * 22.0);
        // "name = conv2d_layer" is the widest label: 19 chars.
        assert_approx_eq!(f32, bounds.width(), 210.0);
    }

    #[test]
    fn test_sections_and_rows_are_skipped() {
        let config = LayoutConfig::default();
        let measure = FixedAdvanceMeasure::default();
        let engine = LayoutEngine::new(&config, &measure);
        let mut diagram = Diagram::new();
        let title = diagram.create(Element::section(SectionKind::Title), None).unwrap();

        assert!(engine.layout_element(&mut diagram, title).is_none());
        assert!(engine.layout_element(&mut diagram, Id::new("ghost")).is_none());
        assert_eq!(
            diagram.get_by_id(title).unwrap().bounds(),
            Bounds::new(0.0, 0.0, 100.0, 40.0)
        );
    }

    #[test]
    fn test_layout_from_propagates_to_container() {
        let config = LayoutConfig::default();
        let measure = FixedAdvanceMeasure::new(10.0, 16.0);
        let engine = LayoutEngine::new(&config, &measure);
        let mut diagram = Diagram::new();
        let container = diagram.create(Element::container(), None).unwrap();
        let layer = conv_layer(&mut diagram, Some(container));
        engine.layout_all(&mut diagram);
        let before = diagram.get_by_id(container).unwrap().bounds();

        let name_row = diagram.get_by_id(layer).unwrap().owned_elements()[0];
        diagram
            .update(name_row, &ElementPatch::new().value("a_much_longer_layer_name_than_before"))
            .unwrap();
        engine.layout_from(&mut diagram, name_row);

        let after = diagram.get_by_id(container).unwrap().bounds();
        assert!(diagram.get_by_id(layer).unwrap().bounds().width() > 210.0);
        assert!(after.width() >= before.width());
    }

    #[test]
    fn test_layout_all_is_idempotent() {
        let config = LayoutConfig::default();
        let measure = FixedAdvanceMeasure::default();
        let engine = LayoutEngine::new(&config, &measure);
        let mut diagram = Diagram::new();
        let container = diagram.create(Element::container(), None).unwrap();
        conv_layer(&mut diagram, Some(container));
        conv_layer(&mut diagram, None);

        engine.layout_all(&mut diagram);
        let first: Vec<Bounds> = diagram.elements().map(Element::bounds).collect();
        let revision = diagram.revision();
        engine.layout_all(&mut diagram);
        let second: Vec<Bounds> = diagram.elements().map(Element::bounds).collect();

        assert_eq!(first, second);
        assert_eq!(diagram.revision(), revision);
    }
}
