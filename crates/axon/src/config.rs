//! Configuration types for the Axon engine.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from an
//! external file; every section and field falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`LayoutConfig`] - Grid, padding, row heights and minimum sizes used by layout.
//! - [`RegistryConfig`] - Capacity of the special-element registry.
//! - [`TextConfig`] - Font used to measure labels.
//!
//! # Example
//!
//! ```
//! # use axon::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().grid(), 10.0);
//! assert_eq!(config.registry().capacity(), 100);
//! ```

use serde::Deserialize;

use axon_core::text::TextStyle;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Layout section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Registry section.
    #[serde(default)]
    registry: RegistryConfig,

    /// Text measurement section.
    #[serde(default)]
    text: TextConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, registry: RegistryConfig, text: TextConfig) -> Self {
        Self {
            layout,
            registry,
            text,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the registry configuration.
    pub fn registry(&self) -> &RegistryConfig {
        &self.registry
    }

    /// Returns the text configuration.
    pub fn text(&self) -> &TextConfig {
        &self.text
    }
}

/// Sizes used by the bounds calculator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    grid: f32,
    text_padding: f32,
    header_height: f32,
    attribute_row_height: f32,
    member_row_height: f32,
    composite_min_width: f32,
    container_min_width: f32,
    container_min_height: f32,
    container_default_width: f32,
    container_default_height: f32,
    reference_min_width: f32,
    reference_height: f32,
    reference_padding: f32,
    row_inset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid: 10.0,
            text_padding: 20.0,
            header_height: 40.0,
            attribute_row_height: 22.0,
            member_row_height: 30.0,
            composite_min_width: 100.0,
            container_min_width: 200.0,
            container_min_height: 150.0,
            container_default_width: 300.0,
            container_default_height: 600.0,
            reference_min_width: 140.0,
            reference_height: 40.0,
            reference_padding: 40.0,
            row_inset: 0.5,
        }
    }
}

impl LayoutConfig {
    /// Grid that widths are rounded up to.
    pub fn grid(&self) -> f32 {
        self.grid
    }

    /// Horizontal padding added to every measured label.
    pub fn text_padding(&self) -> f32 {
        self.text_padding
    }

    /// Height of a composite's own label row.
    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    pub fn attribute_row_height(&self) -> f32 {
        self.attribute_row_height
    }

    pub fn member_row_height(&self) -> f32 {
        self.member_row_height
    }

    pub fn composite_min_width(&self) -> f32 {
        self.composite_min_width
    }

    pub fn container_min_width(&self) -> f32 {
        self.container_min_width
    }

    pub fn container_min_height(&self) -> f32 {
        self.container_min_height
    }

    pub fn container_default_width(&self) -> f32 {
        self.container_default_width
    }

    pub fn container_default_height(&self) -> f32 {
        self.container_default_height
    }

    pub fn reference_min_width(&self) -> f32 {
        self.reference_min_width
    }

    pub fn reference_height(&self) -> f32 {
        self.reference_height
    }

    pub fn reference_padding(&self) -> f32 {
        self.reference_padding
    }

    /// Offset of child rows from the parent's border.
    pub fn row_inset(&self) -> f32 {
        self.row_inset
    }

    /// Returns a copy with a different grid.
    pub fn with_grid(mut self, grid: f32) -> Self {
        self.grid = grid;
        self
    }
}

/// Settings of the special-element registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of ids remembered per category.
    capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl RegistryConfig {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Font used for label measurement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    font_family: String,
    font_size: u16,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 14,
        }
    }
}

impl TextConfig {
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    /// The [`TextStyle`] labels are measured with.
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.font_family.clone(), self.font_size)
    }
}
