// src/viewport.rs
// Keeps the drawing surface square and sized to its container.

use serde::Serialize; // Viewport is part of the state snapshot

/// Largest canvas side in pixels; wider containers get a canvas of this size.
pub const MAX_CANVAS_SIDE: u32 = 4096;

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Square of `side` pixels, clamped to `1..=MAX_CANVAS_SIDE`.
    pub fn square(side: u32) -> Self {
        let side = side.clamp(1, MAX_CANVAS_SIDE); // never empty, never unbounded
        Self {
            width: side,
            height: side,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewportManager {
    viewport: Viewport,
}

impl ViewportManager {
    pub fn new(container_width: u32) -> Self {
        let mut manager = Self {
            viewport: Viewport::square(1),
        };
        manager.resize(container_width);
        manager
    }

    /// Matches both dimensions to the container width. Anything already drawn is lost, so
    /// callers redraw afterwards. Returns whether the size actually changed.
    pub fn resize(&mut self, container_width: u32) -> bool {
        let next = Viewport::square(container_width); // clamped to 1..=MAX_CANVAS_SIDE
        let changed = next != self.viewport;
        self.viewport = next;
        changed
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}
