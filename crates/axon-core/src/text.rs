//! Text styles and text measurement.
//!
//! Layout never measures text itself. It asks a [`TextMeasure`] for the
//! extent of each label, which keeps layout deterministic under test
//! ([`FixedAdvanceMeasure`]) and accurate in production
//! ([`CosmicTextMeasure`]).

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use log::info;
use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Font weight hint passed to the measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Style hints that influence measured text extent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextStyle {
    font_family: String,
    font_size: u16,
    font_weight: FontWeight,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: u16) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            font_weight: FontWeight::Normal,
        }
    }

    /// Returns a reference to a lazily-initialized default style.
    pub fn default_borrowed() -> &'static Self {
        static DEFAULT: OnceLock<TextStyle> = OnceLock::new();
        DEFAULT.get_or_init(Self::default)
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight
    }

    /// Returns a copy of this style with a different weight.
    pub fn with_weight(&self, font_weight: FontWeight) -> Self {
        Self {
            font_weight,
            ..self.clone()
        }
    }

    /// Returns a bold copy of this style.
    pub fn bold(&self) -> Self {
        self.with_weight(FontWeight::Bold)
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new("Arial", 14)
    }
}

/// Text-measurement capability consumed by layout.
pub trait TextMeasure {
    /// Returns the rendered extent of `text` in diagram units.
    fn measure(&self, text: &str, style: &TextStyle) -> Size;
}

/// Measures text with a constant advance per character.
///
/// # Examples
///
/// ```
/// # use axon_core::text::{FixedAdvanceMeasure, TextMeasure, TextStyle};
/// let measure = FixedAdvanceMeasure::new(7.5, 16.0);
/// let size = measure.measure("abcd", &TextStyle::default());
/// assert_eq!(size.width(), 30.0);
/// assert_eq!(size.height(), 16.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FixedAdvanceMeasure {
    advance: f32,
    line_height: f32,
    bold_factor: f32,
}

impl FixedAdvanceMeasure {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
            bold_factor: 1.0,
        }
    }

    /// Widens bold text by `factor`.
    pub fn with_bold_factor(mut self, factor: f32) -> Self {
        self.bold_factor = factor;
        self
    }
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self::new(7.5, 16.0)
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> Size {
        if text.is_empty() {
            return Size::default();
        }
        let longest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let lines = text.lines().count().max(1);
        let factor = match style.font_weight() {
            FontWeight::Normal => 1.0,
            FontWeight::Bold => self.bold_factor,
        };
        Size::new(
            longest as f32 * self.advance * factor,
            lines as f32 * self.line_height,
        )
    }
}

/// Measures text by shaping it with cosmic-text.
///
/// Holds a reusable [`FontSystem`]; creating one loads the system fonts and
/// is expensive.
pub struct CosmicTextMeasure {
    font_system: Mutex<FontSystem>,
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CosmicTextMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmicTextMeasure").finish_non_exhaustive()
    }
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Points to pixels at standard DPI
        let font_size_px = style.font_size() as f32 * 1.33;
        let line_height = font_size_px * 1.15;
        let metrics = Metrics::new(font_size_px, line_height);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let weight = match style.font_weight() {
            FontWeight::Normal => Weight::NORMAL,
            FontWeight::Bold => Weight::BOLD,
        };
        let attrs = Attrs::new()
            .family(Family::Name(style.font_family()))
            .weight(weight);

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        let layout_runs: Vec<_> = buffer.layout_runs().collect();
        if layout_runs.is_empty() {
            max_width = text.len() as f32 * (font_size_px * 0.55);
            total_height = metrics.line_height;
        } else {
            for last in layout_runs.iter().map(|run| run.glyphs.last()) {
                if let Some(last) = last {
                    max_width = max_width.max(last.x + last.w);
                }
                total_height += metrics.line_height;
            }
        }

        Size::new(max_width, total_height)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_text_style_defaults() {
        let style = TextStyle::default_borrowed();
        assert_eq!(style.font_family(), "Arial");
        assert_eq!(style.font_size(), 14);
        assert_eq!(style.font_weight(), FontWeight::Normal);
        assert_eq!(style.bold().font_weight(), FontWeight::Bold);
    }

    #[test]
    fn test_fixed_measure_empty_text() {
        let measure = FixedAdvanceMeasure::default();
        assert_eq!(measure.measure("", &TextStyle::default()), Size::default());
    }

    #[test]
    fn test_fixed_measure_counts_chars_not_bytes() {
        let measure = FixedAdvanceMeasure::new(10.0, 20.0);
        let size = measure.measure("αβγ", &TextStyle::default());
        assert_approx_eq!(f32, size.width(), 30.0);
    }

    #[test]
    fn test_fixed_measure_multiline() {
        let measure = FixedAdvanceMeasure::new(10.0, 20.0);
        let size = measure.measure("ab\nabcd", &TextStyle::default());
        assert_approx_eq!(f32, size.width(), 40.0);
        assert_approx_eq!(f32, size.height(), 40.0);
    }

    #[test]
    fn test_fixed_measure_bold_factor() {
        let measure = FixedAdvanceMeasure::new(10.0, 20.0).with_bold_factor(1.5);
        let style = TextStyle::default();
        assert_approx_eq!(f32, measure.measure("abcd", &style).width(), 40.0);
        assert_approx_eq!(f32, measure.measure("abcd", &style.bold()).width(), 60.0);
    }

    #[test]
    fn test_cosmic_measure_grows_with_text() {
        let measure = CosmicTextMeasure::new();
        let style = TextStyle::default();

        assert_eq!(measure.measure("", &style), Size::default());

        let short = measure.measure("A", &style);
        let long = measure.measure("A much longer label", &style);
        assert!(short.width() > 0.0);
        assert!(short.height() > 0.0);
        assert!(long.width() > short.width());
    }
}
