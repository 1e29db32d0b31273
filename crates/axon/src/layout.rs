//! Bounds computation for diagram elements.
//!
//! Layout runs bottom-up: every element is sized from its already-sized
//! children, then its owner is sized from it. All text extents come from the
//! [`TextMeasure`](axon_core::text::TextMeasure) handed to the
//! [`LayoutEngine`], which makes layout a pure function of the tree and the
//! measure.
//!
//! # Submodules
//!
//! - `classifier` - Stacked-row sizing of layers and other composites
//! - `container` - Union-of-children sizing of containers, and reference sizing
//! - `engine` - Dispatch per element kind and the bottom-up traversal

mod classifier;
mod container;
mod engine;

pub use classifier::{is_visible_for_sizing, row_height};
pub use engine::LayoutEngine;
