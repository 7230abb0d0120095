// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless drawing surface.
//!
//! Draw calls are logged at trace level and counted, so a run without a
//! window still shows what would have been drawn.

use ordoplay_anim::{Brush, Element, Rect, Surface};
use tracing::trace;

/// Surface that logs instead of drawing
#[derive(Debug, Clone)]
pub struct TraceSurface {
    pixel_ratio: f64,
    depth: usize,
    /// Elements drawn in the current frame
    pub drawn: usize,
    /// Rectangles filled in the current frame
    pub fills: usize,
}

impl TraceSurface {
    /// Create a surface with a device pixel ratio
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            pixel_ratio,
            depth: 0,
            drawn: 0,
            fills: 0,
        }
    }

    /// Reset the per-frame counters
    pub fn begin_frame(&mut self) {
        self.drawn = 0;
        self.fills = 0;
    }

    /// Is every save matched by a restore
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }
}

impl Default for TraceSurface {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Surface for TraceSurface {
    fn save(&mut self) {
        self.depth += 1;
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        trace!("scale {sx} {sy}");
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn fill_rect(&mut self, brush: &Brush, rect: Rect) {
        self.fills += 1;
        trace!("fill {brush:?} {rect:?}");
    }

    fn draw_element(&mut self, element: &Element, time: f64) {
        self.drawn += 1;
        trace!("draw '{}' at {time}", element.name);
    }
}
