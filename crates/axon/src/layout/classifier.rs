use axon_core::{
    geometry::{Bounds, Size},
    identifier::Id,
    text::FontWeight,
};
use log::trace;

use super::engine::LayoutEngine;
use crate::{
    config::LayoutConfig,
    model::{Detail, Element, MemberKind},
    store::Diagram,
};

/// Returns `true` if `child` takes part in its owner's sizing.
///
/// Optional attributes stay owned and persisted but do not add rows.
pub fn is_visible_for_sizing(child: &Element) -> bool {
    match child.detail() {
        Detail::Attribute(data) => data.is_mandatory(),
        Detail::Member(_) => true,
        _ => false,
    }
}

/// Height of the row `child` occupies inside its owner.
pub fn row_height(config: &LayoutConfig, child: &Element) -> f32 {
    match child.detail() {
        Detail::Attribute(_) => config.attribute_row_height(),
        _ => config.member_row_height(),
    }
}

fn is_method(child: &Element) -> bool {
    matches!(child.detail(), Detail::Member(MemberKind::Method))
}

/// Sizes a stacked-row composite and positions its visible children.
///
/// Width is the widest of the element's own label and the visible rows'
/// labels, each padded and rounded up to the grid. Height is the header plus
/// every visible row; attribute-like rows stack above methods, each group in
/// owned order. Returns the new bounds, or `None` for an unknown id.
pub(super) fn layout_classifier<H, V>(
    engine: &LayoutEngine<'_>,
    diagram: &mut Diagram,
    id: Id,
    row_height: H,
    is_visible: V,
) -> Option<Bounds>
where
    H: Fn(&Element) -> f32,
    V: Fn(&Element) -> bool,
{
    let config = engine.config();
    let element = diagram.get_by_id(id)?;
    let origin = element.bounds();

    let mut width = engine
        .label_width(element.name(), FontWeight::Bold)
        .max(config.composite_min_width());

    let (fields, methods): (Vec<&Element>, Vec<&Element>) = diagram
        .children(id)
        .filter(|child| is_visible(child))
        .partition(|child| !is_method(child));

    let mut rows = Vec::with_capacity(fields.len() + methods.len());
    for child in fields.into_iter().chain(methods) {
        width = width.max(engine.label_width(child.name(), FontWeight::Normal));
        rows.push((child.id(), row_height(child)));
    }

    let inset = config.row_inset();
    let mut offset = config.header_height();
    for (child, height) in rows {
        let bounds = Bounds::new(inset, offset + inset, width - 2.0 * inset, height);
        trace!(child:% = child, y = bounds.y(), width = bounds.width(); "Placed row");
        diagram.set_element_bounds(child, bounds);
        offset += height;
    }

    let bounds = origin.with_size(Size::new(width, offset));
    diagram.set_element_bounds(id, bounds);
    Some(bounds)
}
