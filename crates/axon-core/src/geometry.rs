//! Geometric primitives for diagram layout.
//!
//! This module provides the geometric types the layout engine works with.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangle given by its top-left corner and its size
//! - [`round_up_to_grid`] - Snaps a length to the next grid multiple
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Child bounds are stored relative to their owner's top-left corner. Layout
//! translates them into absolute coordinates when it needs to union them.

use serde::{Deserialize, Serialize};

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use axon_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns `true` if both coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds the coordinates of another point to this one.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts the coordinates of another point from this one.
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Width and height dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a size with the larger width and the larger height of the two.
    ///
    /// # Examples
    ///
    /// ```
    /// # use axon_core::geometry::Size;
    /// let clamped = Size::new(120.0, 40.0).max(Size::new(200.0, 150.0));
    /// assert_eq!(clamped, Size::new(200.0, 150.0));
    /// ```
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// A rectangle given by its top-left corner and its size.
///
/// This is the shape persisted for every element: `{x, y, width, height}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates bounds from a top-left point and a size.
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self::new(top_left.x, top_left.y, size.width, size.height)
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.x + self.width
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.y + self.height
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Returns the same corner with a new size.
    pub fn with_size(self, size: Size) -> Self {
        Self::new_from_top_left(self.min_point(), size)
    }

    /// Merges two bounds into the smallest bounds that contains both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use axon_core::geometry::Bounds;
    /// let header = Bounds::new(0.0, 0.0, 100.0, 30.0);
    /// let content = Bounds::new(10.0, 40.0, 120.0, 80.0);
    ///
    /// let combined = header.merge(&content);
    /// assert_eq!(combined, Bounds::new(0.0, 0.0, 130.0, 120.0));
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Moves the bounds by the specified offset. The size is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use axon_core::geometry::{Bounds, Point};
    /// let moved = Bounds::new(10.0, 20.0, 50.0, 30.0).translate(Point::new(100.0, 50.0));
    /// assert_eq!(moved, Bounds::new(110.0, 70.0, 50.0, 30.0));
    /// ```
    pub fn translate(&self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Moves the bounds in the opposite direction of the specified offset
    pub fn inverse_translate(&self, offset: Point) -> Self {
        Self::new(self.x - offset.x, self.y - offset.y, self.width, self.height)
    }
}

/// Rounds `value` up to the next multiple of `grid`.
///
/// A non-positive grid leaves the value unchanged.
///
/// # Examples
///
/// ```
/// # use axon_core::geometry::round_up_to_grid;
/// assert_eq!(round_up_to_grid(101.0, 10.0), 110.0);
/// assert_eq!(round_up_to_grid(110.0, 10.0), 110.0);
/// assert_eq!(round_up_to_grid(7.0, 0.0), 7.0);
/// ```
pub fn round_up_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).ceil() * grid
}
