// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drawing contract and brushes.
//!
//! Actual drawing is done by whatever implements [`Surface`]; the animation
//! only decides what is drawn, in which order and under which scale.

use crate::element::Element;
use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// A point in animation space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Does the rectangle contain the point (edges included)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }
}

/// Paint used to fill areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Brush {
    /// Solid RGBA color
    Solid([u8; 4]),
}

impl Brush {
    /// Build a fill brush from a color spec: `#rgb`, `#rrggbb`, `#rrggbbaa`
    /// or `transparent`
    pub fn fill(spec: &str) -> Result<Self> {
        let invalid = || PlaybackError::InvalidBrush(spec.to_string());
        let spec = spec.trim();
        if spec.eq_ignore_ascii_case("transparent") {
            return Ok(Brush::Solid([0, 0, 0, 0]));
        }
        let hex = spec.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut rgba = [255u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    let digit = channel(&c.to_string())?;
                    rgba[i] = digit * 17;
                }
                Ok(Brush::Solid(rgba))
            }
            6 | 8 => {
                let mut rgba = [255u8; 4];
                for i in 0..hex.len() / 2 {
                    rgba[i] = channel(&hex[i * 2..i * 2 + 2])?;
                }
                Ok(Brush::Solid(rgba))
            }
            _ => Err(invalid()),
        }
    }
}

/// Background of an animation: the spec as configured, or the brush it was
/// turned into on first use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// Color spec not converted yet
    Spec(String),
    /// Converted brush
    Brush(Brush),
}

impl Background {
    /// The brush, converting the spec on first call
    pub fn brush(&mut self) -> Result<Brush> {
        let brush = match self {
            Background::Brush(brush) => return Ok(*brush),
            Background::Spec(spec) => Brush::fill(spec)?,
        };
        *self = Background::Brush(brush);
        Ok(brush)
    }
}

/// Something an animation can be drawn to
pub trait Surface {
    /// Push the current transform
    fn save(&mut self);

    /// Pop the last pushed transform
    fn restore(&mut self);

    /// Scale subsequent drawing
    fn scale(&mut self, sx: f64, sy: f64);

    /// Device scale applied by the host on top of the animation zoom
    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Fill a rectangle
    fn fill_rect(&mut self, brush: &Brush, rect: Rect);

    /// Draw one element at its local time
    fn draw_element(&mut self, element: &Element, time: f64);
}
