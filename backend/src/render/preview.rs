//! Re-renders stored signatures at several scales for side-by-side review.
//!
//! Typed signatures keep their source parameters, so they are rendered again
//! with `size × scale` and stay crisp at any scale. Drawn and uploaded
//! signatures only exist as fixed-resolution rasters: they are resized
//! geometrically and get softer when enlarged. That loss is expected; there
//! is no vector source to rasterize from.

use crate::error::{Result, ValidationKind};
use crate::render::embedded::EmbeddedImage;
use crate::render::typed::TypedRenderer;
use common::model::signature::{SignatureKind, SignatureRecord};
use image::imageops::{self, FilterType};
use rayon::prelude::*;

/// Small, medium and large.
pub const CANONICAL_SCALES: [f32; 3] = [0.5, 0.75, 1.0];

const MAX_SCALE: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct Preview {
    pub scale: f32,
    pub image: EmbeddedImage,
}

#[derive(Clone)]
pub struct PreviewRenderer {
    typed: TypedRenderer,
}

impl PreviewRenderer {
    pub fn new(typed: TypedRenderer) -> Self {
        Self { typed }
    }

    pub fn render_at(&self, record: &SignatureRecord, scale: f32) -> Result<EmbeddedImage> {
        if !scale.is_finite() || scale <= 0.0 || scale > MAX_SCALE {
            return Err(ValidationKind::InvalidScale(scale).into());
        }

        match &record.kind {
            SignatureKind::Typed(typed) => self.typed.render_scaled(typed, scale),
            SignatureKind::Drawn | SignatureKind::Uploaded => {
                let stored = EmbeddedImage::parse(&record.image)?;
                resize_raster(&stored, scale)
            }
        }
    }

    /// Renders every canonical scale, in parallel.
    pub fn render_set(&self, record: &SignatureRecord) -> Result<Vec<Preview>> {
        self.render_scales(record, &CANONICAL_SCALES)
    }

    pub fn render_scales(&self, record: &SignatureRecord, scales: &[f32]) -> Result<Vec<Preview>> {
        scales
            .par_iter()
            .map(|&scale| {
                Ok(Preview {
                    scale,
                    image: self.render_at(record, scale)?,
                })
            })
            .collect()
    }
}

fn resize_raster(stored: &EmbeddedImage, scale: f32) -> Result<EmbeddedImage> {
    let raster = stored.to_rgba()?;
    let (w, h) = raster.dimensions();
    let new_w = ((w as f32) * scale).round().max(1.0) as u32;
    let new_h = ((h as f32) * scale).round().max(1.0) as u32;

    if (new_w, new_h) == (w, h) {
        return EmbeddedImage::from_rgba(&raster);
    }
    let resized = imageops::resize(&raster, new_w, new_h, FilterType::Lanczos3);
    EmbeddedImage::from_rgba(&resized)
}
