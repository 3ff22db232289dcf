// src/render.rs
// Per-frame drawing: reference grid, fading trace of the terminal mass, the rod chain, then
// the pivot and mass markers on top. Rendering reads its inputs only, so drawing the same
// frame twice paints the same pixels.

use crate::error::RenderError;
use crate::model::AnimationData;
use crate::surface::{Fill, Stroke, Surface};
use crate::transform::{CoordinateTransform, ScreenPoint};
use crate::viewport::Viewport;
use plotters::style::RGBColor;
use std::ops::RangeInclusive;

/// Maximum number of frames in the trace, current frame included.
pub const TRACE_LENGTH: usize = 100;

/// Frame indices covered by the trace ending at `frame_index`. Never wraps past frame 0.
pub fn trace_window(frame_index: usize) -> RangeInclusive<usize> {
    frame_index.saturating_sub(TRACE_LENGTH - 1)..=frame_index
}

/// Colours and sizes used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: RGBColor,
    pub grid: Stroke,
    pub trace: Stroke,
    pub rod: Stroke,
    pub pivot: Fill,
    pub mass: Fill,
    pub marker_radius: f64, // Same for every mass regardless of its value
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            grid: Stroke {
                color: RGBColor(221, 221, 221),
                opacity: 1.0,
                width: 1,
            },
            trace: Stroke {
                color: RGBColor(255, 0, 0),
                opacity: 0.5,
                width: 1,
            },
            rod: Stroke {
                color: RGBColor(0, 0, 0),
                opacity: 1.0,
                width: 2,
            },
            pivot: Fill {
                color: RGBColor(0, 0, 0),
                opacity: 1.0,
            },
            mass: Fill {
                color: RGBColor(0, 0, 255),
                opacity: 1.0,
            },
            marker_radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    style: RenderStyle,
}

impl FrameRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Draws frame `frame_index` (taken modulo the frame count) of `data` onto `surface`.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        data: &AnimationData,
        frame_index: usize,
        viewport: Viewport,
        surface: &mut S,
    ) -> Result<(), RenderError> {
        let style = &self.style;
        let transform = CoordinateTransform::for_viewport(viewport, data.limit());
        let (ox, oy) = transform.origin;
        let (w, h) = (viewport.width as f64, viewport.height as f64);

        surface.clear(style.background)?;
        surface.line((0.0, oy), (w, oy), style.grid)?;
        surface.line((ox, 0.0), (ox, h), style.grid)?;

        if data.frame_count() == 0 {
            return surface.circle(transform.origin, style.marker_radius, style.pivot);
        }
        let frame = frame_index % data.frame_count(); // index wraps like playback does

        // Terminal mass over the last TRACE_LENGTH frames, oldest first
        let trace: Vec<ScreenPoint> = trace_window(frame)
            .filter_map(|idx| data.terminal_position(idx))
            .map(|p| transform.physical_to_screen(p))
            .collect();
        surface.path(&trace, style.trace)?; // semi-transparent polyline

        // Rods run pivot -> link 1 -> ... -> link n.
        let masses: Vec<ScreenPoint> = (1..=data.n())
            .filter_map(|link| data.link_position(frame, link))
            .map(|p| transform.physical_to_screen(p))
            .collect();
        let mut chain = Vec::with_capacity(masses.len() + 1);
        chain.push(transform.origin);
        chain.extend_from_slice(&masses);
        surface.path(&chain, style.rod)?;

        surface.circle(transform.origin, style.marker_radius, style.pivot)?;
        for &point in &masses {
            surface.circle(point, style.marker_radius, style.mass)?;
        }
        Ok(())
    }
}
