//! Colors and per-element styling.
//!
//! [`Color`] wraps `DynamicColor` from the color crate and is used to
//! validate the CSS color strings an editor stores on elements.
//! [`ElementStyle`] keeps those strings verbatim so that a style survives a
//! serialize/deserialize cycle unchanged.

use std::{fmt, str::FromStr};

use color::DynamicColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A CSS color string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{value}`: {reason}")]
pub struct InvalidColor {
    value: String,
    reason: String,
}

/// Wrapper around the `DynamicColor` type from the color crate.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parses a CSS color string such as `"#ff0000"`, `"rgb(255, 0, 0)"` or `"red"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use axon_core::color::Color;
    ///
    /// assert!(Color::new("#ff0000").is_ok());
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, InvalidColor> {
        DynamicColor::from_str(color_str)
            .map(|color| Self { color })
            .map_err(|err| InvalidColor {
                value: color_str.to_string(),
                reason: err.to_string(),
            })
    }

    /// Returns the alpha component, between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

/// Optional fill, stroke and text colors of an element.
///
/// Each color is stored exactly as it was supplied, after validation.
///
/// # Examples
///
/// ```
/// use axon_core::color::ElementStyle;
///
/// let mut style = ElementStyle::default();
/// style.set_fill_color(Some("#fafafa")).unwrap();
/// assert_eq!(style.fill_color(), Some("#fafafa"));
/// assert!(style.set_stroke_color(Some("nope")).is_err());
/// assert_eq!(style.stroke_color(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_color: Option<String>,
}

impl ElementStyle {
    /// Returns the fill color string, if any.
    pub fn fill_color(&self) -> Option<&str> {
        self.fill_color.as_deref()
    }

    /// Returns the stroke color string, if any.
    pub fn stroke_color(&self) -> Option<&str> {
        self.stroke_color.as_deref()
    }

    /// Returns the text color string, if any.
    pub fn text_color(&self) -> Option<&str> {
        self.text_color.as_deref()
    }

    /// Sets or clears the fill color.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidColor`] and leaves the style untouched when the
    /// string is not a CSS color.
    pub fn set_fill_color(&mut self, value: Option<&str>) -> Result<(), InvalidColor> {
        self.fill_color = validated(value)?;
        Ok(())
    }

    /// Sets or clears the stroke color.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidColor`] when the string is not a CSS color.
    pub fn set_stroke_color(&mut self, value: Option<&str>) -> Result<(), InvalidColor> {
        self.stroke_color = validated(value)?;
        Ok(())
    }

    /// Sets or clears the text color.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidColor`] when the string is not a CSS color.
    pub fn set_text_color(&mut self, value: Option<&str>) -> Result<(), InvalidColor> {
        self.text_color = validated(value)?;
        Ok(())
    }

    /// Checks every stored color, as needed after deserializing untrusted input.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidColor`] found.
    pub fn validate(&self) -> Result<(), InvalidColor> {
        for value in [&self.fill_color, &self.stroke_color, &self.text_color]
            .into_iter()
            .flatten()
        {
            Color::new(value)?;
        }
        Ok(())
    }
}

fn validated(value: Option<&str>) -> Result<Option<String>, InvalidColor> {
    value
        .map(|value| Color::new(value).map(|_| value.to_string()))
        .transpose()
}
