use axon_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    text::FontWeight,
};
use log::trace;

use super::engine::LayoutEngine;
use crate::store::Diagram;

/// Sizes a container around its label and children.
///
/// Children keep relative positions. The box grows to the union of its label
/// and the children's absolute bounds, clamped to the configured minimum;
/// when the origin moves, children are shifted by the difference so that
/// their absolute positions do not change.
pub(super) fn layout_container(
    engine: &LayoutEngine<'_>,
    diagram: &mut Diagram,
    id: Id,
) -> Option<Bounds> {
    let config = engine.config();
    let element = diagram.get_by_id(id)?;
    let origin = element.bounds().min_point();
    let label_width = engine.label_width(element.name(), FontWeight::Bold);

    let absolute: Option<Bounds> = diagram
        .children(id)
        .map(|child| child.bounds().translate(origin))
        .reduce(|acc, bounds| acc.merge(&bounds));

    // The label sits at the top-left of the final box.
    let top_left = absolute.map_or(origin, |children| {
        Point::new(origin.x().min(children.x()), origin.y().min(children.y()))
    });
    let label = Bounds::new_from_top_left(top_left, Size::new(label_width, config.header_height()));
    let union = absolute.map_or(label, |children| label.merge(&children));

    let size = Size::new(
        union.width().max(config.container_min_width()),
        union.height().max(config.container_min_height()),
    );
    let bounds = Bounds::new_from_top_left(top_left, size);

    let delta = origin.sub_point(top_left);
    if !delta.is_zero() {
        trace!(container:% = id, dx = delta.x(), dy = delta.y(); "Shifting children");
        let shifted: Vec<(Id, Bounds)> = diagram
            .children(id)
            .map(|child| (child.id(), child.bounds().translate(delta)))
            .collect();
        for (child, child_bounds) in shifted {
            diagram.set_element_bounds(child, child_bounds);
        }
    }

    diagram.set_element_bounds(id, bounds);
    Some(bounds)
}

/// Sizes a reference to fit its label: `max(min_width, text + padding)` wide
/// and a fixed height.
pub(super) fn layout_reference(
    engine: &LayoutEngine<'_>,
    diagram: &mut Diagram,
    id: Id,
) -> Option<Bounds> {
    let config = engine.config();
    let element = diagram.get_by_id(id)?;
    let label = element.reference_label()?;
    let width = (engine.text_width(label, FontWeight::Normal) + config.reference_padding())
        .max(config.reference_min_width());
    let bounds = element
        .bounds()
        .with_size(Size::new(width, config.reference_height()));

    diagram.set_element_bounds(id, bounds);
    Some(bounds)
}
