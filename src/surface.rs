// src/surface.rs
// Drawing targets. FrameRenderer only talks to the Surface trait, so it can paint into the
// plotters-backed RGB bitmap served to the user or into a RecordingSurface in tests.

use crate::error::RenderError;
use crate::transform::ScreenPoint;
use crate::viewport::{Viewport, MAX_CANVAS_SIDE};
use image::{DynamicImage, ImageBuffer, ImageFormat}; // PNG encoding of the pixel buffer
use plotters::prelude::*; // Bitmap backend, elements and colours
use std::io::Cursor; // In-memory PNG output

/// Line style: colour, opacity in [0, 1], width in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: RGBColor,
    pub opacity: f64,
    pub width: u32,
}

/// Fill style for markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub color: RGBColor,
    pub opacity: f64,
}

pub trait Surface {
    /// Paints the whole surface with `color`.
    fn clear(&mut self, color: RGBColor) -> Result<(), RenderError>;

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke) -> Result<(), RenderError>;

    /// Connects successive points with straight segments.
    fn path(&mut self, points: &[ScreenPoint], stroke: Stroke) -> Result<(), RenderError>;

    /// Filled disc.
    fn circle(&mut self, center: ScreenPoint, radius: f64, fill: Fill) -> Result<(), RenderError>;
}

fn to_backend((x, y): ScreenPoint) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

/// RGB pixel buffer drawn through plotters' bitmap backend.
#[derive(Debug, Clone)]
pub struct BitmapSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // 3 bytes per pixel
}

impl BitmapSurface {
    /// White surface of the viewport's size; each side is clamped to `1..=MAX_CANVAS_SIDE`.
    pub fn new(viewport: Viewport) -> Self {
        let width = viewport.width.clamp(1, MAX_CANVAS_SIDE); // Viewport may be built by hand
        let height = viewport.height.clamp(1, MAX_CANVAS_SIDE);
        // Sides are capped, so the byte count fits comfortably in usize.
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|area| area.checked_mul(3))
            .unwrap_or(MAX_CANVAS_SIDE as usize * MAX_CANVAS_SIDE as usize * 3);
        Self {
            width,
            height,
            pixels: vec![255u8; len], // start white
        }
    }

    /// Reallocates for a new size. The previous drawing is discarded.
    pub fn resize(&mut self, viewport: Viewport) {
        *self = Self::new(viewport);
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB value at pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 3) as usize;
        Some([self.pixels[offset], self.pixels[offset + 1], self.pixels[offset + 2]])
    }

    fn area(&mut self) -> DrawingArea<BitMapBackend<'_>, plotters::coord::Shift> {
        BitMapBackend::with_buffer(&mut self.pixels, (self.width, self.height)).into_drawing_area()
    }

    /// Encodes the current pixels as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        // Create an image buffer from raw RGB pixels
        let img_buffer = ImageBuffer::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(RenderError::BufferSize(self.width, self.height))?;

        let dynamic_image = DynamicImage::ImageRgb8(img_buffer);

        // Encode into an in-memory PNG file
        let mut png_buffer = Cursor::new(Vec::new());
        dynamic_image.write_to(&mut png_buffer, ImageFormat::Png)?;
        Ok(png_buffer.into_inner())
    }
}

fn backend_err(err: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(err.to_string())
}

impl Surface for BitmapSurface {
    fn clear(&mut self, color: RGBColor) -> Result<(), RenderError> {
        self.area().fill(&color).map_err(backend_err)
    }

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke) -> Result<(), RenderError> {
        self.path(&[from, to], stroke)
    }

    fn path(&mut self, points: &[ScreenPoint], stroke: Stroke) -> Result<(), RenderError> {
        if points.len() < 2 {
            return Ok(());
        }
        let style = stroke.color.mix(stroke.opacity).stroke_width(stroke.width); // Blend with what's below
        let coords: Vec<(i32, i32)> = points.iter().copied().map(to_backend).collect(); // Round to pixels
        self.area()
            .draw(&PathElement::new(coords, style))
            .map_err(backend_err)
    }

    fn circle(&mut self, center: ScreenPoint, radius: f64, fill: Fill) -> Result<(), RenderError> {
        let style = fill.color.mix(fill.opacity).filled();
        let radius = radius.round().max(1.0) as u32;
        self.area()
            .draw(&Circle::new(to_backend(center), radius, style))
            .map_err(backend_err)
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(RGBColor),
    Line {
        from: ScreenPoint,
        to: ScreenPoint,
        stroke: Stroke,
    },
    Path {
        points: Vec<ScreenPoint>,
        stroke: Stroke,
    },
    Circle {
        center: ScreenPoint,
        radius: f64,
        fill: Fill,
    },
}

/// Surface that keeps the calls it receives instead of drawing them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: RGBColor) -> Result<(), RenderError> {
        // Everything before a clear is gone from the picture.
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
        Ok(())
    }

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Line { from, to, stroke });
        Ok(())
    }

    fn path(&mut self, points: &[ScreenPoint], stroke: Stroke) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Path {
            points: points.to_vec(),
            stroke,
        });
        Ok(())
    }

    fn circle(&mut self, center: ScreenPoint, radius: f64, fill: Fill) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            fill,
        });
        Ok(())
    }
}
