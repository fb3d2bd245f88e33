//! Freehand capture surface.
//!
//! Pointer input arrives as a sequential stream: `begin_stroke`, any number of
//! `extend_stroke`, then `end_stroke`. Each completed stroke is rasterized
//! into the embedded image representation and recorded as a snapshot.
//!
//! Undo and redo restore both the exposed image and the live pixel buffer
//! from the snapshot, so strokes drawn afterwards compose on the restored
//! state rather than on whatever was last painted.

use crate::capture::history::History;
use crate::error::Result;
use crate::render::embedded::EmbeddedImage;
use common::model::point::Point;
use image::{Rgba, RgbaImage};
use log::debug;

pub const SURFACE_WIDTH: u32 = 500;
pub const SURFACE_HEIGHT: u32 = 200;

/// Distance between two pen stamps along a segment, in pixels.
const STAMP_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct Pen {
    pub width: f32,
    pub color: Rgba<u8>,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            width: 2.5,
            color: Rgba([0, 0, 0, 255]),
        }
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    pixels: RgbaImage,
    image: EmbeddedImage,
}

pub struct CaptureSurface {
    pixels: RgbaImage,
    pen: Pen,
    last_point: Option<Point>,
    history: History<Snapshot>,
    image: EmbeddedImage,
}

impl Default for CaptureSurface {
    fn default() -> Self {
        Self::new(SURFACE_WIDTH, SURFACE_HEIGHT)
    }
}

impl CaptureSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_pen(width, height, Pen::default())
    }

    pub fn with_pen(width: u32, height: u32, pen: Pen) -> Self {
        Self {
            pixels: RgbaImage::new(width.max(1), height.max(1)),
            pen,
            last_point: None,
            history: History::new(),
            image: EmbeddedImage::empty(),
        }
    }

    /// Starts a stroke and leaves a dot at `point`.
    pub fn begin_stroke(&mut self, point: Point) {
        self.stamp(point);
        self.last_point = Some(point);
    }

    /// Draws a segment from the previous point. Ignored outside a stroke.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(from) = self.last_point else {
            return;
        };
        self.draw_segment(from, point);
        self.last_point = Some(point);
    }

    /// Commits the surface as a new snapshot. A no-op when no stroke is open.
    pub fn end_stroke(&mut self) -> Result<()> {
        if self.last_point.take().is_none() {
            return Ok(());
        }
        let image = EmbeddedImage::from_rgba(&self.pixels)?;
        self.image = image.clone();
        self.history.push(Snapshot {
            pixels: self.pixels.clone(),
            image,
        });
        debug!("Stroke committed, history depth {:?}", self.history.depth());
        Ok(())
    }

    /// Returns false (and changes nothing) when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            self.restore();
        }
        moved
    }

    /// Returns false (and changes nothing) when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            self.restore();
        }
        moved
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.blank();
    }

    /// Builds a committed image from recorded strokes, one `Vec<Point>` per stroke.
    ///
    /// All strokes are painted first and committed as a single snapshot, so a
    /// recording costs one encode however many strokes it holds.
    pub fn replay(&mut self, strokes: &[Vec<Point>]) -> Result<EmbeddedImage> {
        for stroke in strokes {
            let Some((first, rest)) = stroke.split_first() else {
                continue;
            };
            self.begin_stroke(*first);
            for point in rest {
                self.extend_stroke(*point);
            }
        }
        self.end_stroke()?;
        Ok(self.image.clone())
    }

    pub fn image(&self) -> &EmbeddedImage {
        &self.image
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self) {
        // An interrupted stroke is dropped along with its unsaved pixels.
        self.last_point = None;
        match self.history.current() {
            Some(snapshot) => {
                self.pixels = snapshot.pixels.clone();
                self.image = snapshot.image.clone();
            }
            None => self.blank(),
        }
    }

    fn blank(&mut self) {
        let (w, h) = self.pixels.dimensions();
        self.pixels = RgbaImage::new(w, h);
        self.image = EmbeddedImage::empty();
        self.last_point = None;
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = (dx * dx + dy * dy).sqrt();
        // Segments far outside the surface must not cost more than crossing it.
        let (w, h) = self.pixels.dimensions();
        let max_steps = ((w + h) as f32 * 2.0 / STAMP_STEP).max(1.0);
        let steps = (length / STAMP_STEP).ceil().clamp(1.0, max_steps) as u32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(Point::new(from.x + dx * t, from.y + dy * t));
        }
    }

    /// Paints a round pen tip centered on `center`, clipped to the surface.
    fn stamp(&mut self, center: Point) {
        if !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        let radius = (self.pen.width / 2.0).max(0.5);
        let (w, h) = self.pixels.dimensions();
        let x0 = (center.x - radius).floor().max(0.0) as i64;
        let y0 = (center.y - radius).floor().max(0.0) as i64;
        let x1 = ((center.x + radius).ceil() as i64).min(w as i64 - 1);
        let y1 = ((center.y + radius).ceil() as i64).min(h as i64 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let px = x as f32 + 0.5 - center.x;
                let py = y as f32 + 0.5 - center.y;
                if px * px + py * py <= radius * radius {
                    self.pixels.put_pixel(x as u32, y as u32, self.pen.color);
                }
            }
        }
    }
}
