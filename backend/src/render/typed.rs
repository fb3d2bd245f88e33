//! Rasterizes typed signatures.
//!
//! The canvas has a fixed size regardless of text length. Text is centered
//! horizontally on its ink and vertically on the font's ascent/descent, and is
//! clipped when wider than the canvas. Rendering is a pure function of its
//! inputs: coverage is accumulated without randomness or platform text
//! shaping, and the PNG encoder configuration is fixed, so identical inputs
//! produce byte-identical images.

use crate::error::{Result, ValidationKind};
use crate::render::embedded::EmbeddedImage;
use crate::render::font::FontLibrary;
use common::model::typed::TypedSignature;
use image::{Rgba, RgbaImage};
use rusttype::{point, Scale};
use std::sync::Arc;

pub const CANVAS_WIDTH: u32 = 400;
pub const CANVAS_HEIGHT: u32 = 120;

const MAX_FONT_SIZE: f32 = 512.0;
/// Horizontal displacement per pixel of height for synthesized italics.
const ITALIC_SHEAR: f32 = 0.2;

#[derive(Clone)]
pub struct TypedRenderer {
    fonts: Arc<FontLibrary>,
}

impl TypedRenderer {
    pub fn new(fonts: Arc<FontLibrary>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Renders at scale 1.0. Blank text gives the empty image.
    pub fn render(&self, signature: &TypedSignature) -> Result<EmbeddedImage> {
        self.render_scaled(signature, 1.0)
    }

    /// Renders with both the canvas and the font size multiplied by `scale`.
    pub fn render_scaled(&self, signature: &TypedSignature, scale: f32) -> Result<EmbeddedImage> {
        match self.rasterize(signature, scale)? {
            Some(raster) => EmbeddedImage::from_rgba(&raster),
            None => Ok(EmbeddedImage::empty()),
        }
    }

    /// Checks font, color and size without drawing anything.
    pub fn validate(&self, signature: &TypedSignature) -> Result<()> {
        check_size(signature.size)?;
        parse_color(&signature.color)?;
        if !self.fonts.contains(&signature.font) {
            return Err(ValidationKind::UnknownFont(signature.font.clone()).into());
        }
        Ok(())
    }

    /// Returns `None` when there is nothing to draw.
    pub fn rasterize(&self, signature: &TypedSignature, scale: f32) -> Result<Option<RgbaImage>> {
        if signature.text.trim().is_empty() {
            return Ok(None);
        }
        check_size(signature.size)?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ValidationKind::InvalidScale(scale).into());
        }
        let color = parse_color(&signature.color)?;
        let face = self.fonts.resolve(&signature.font, signature.style)?;

        let width = ((CANVAS_WIDTH as f32) * scale).round().max(1.0) as u32;
        let height = ((CANVAS_HEIGHT as f32) * scale).round().max(1.0) as u32;
        let px = signature.size * scale;
        let font_scale = Scale::uniform(px);
        let v_metrics = face.font.v_metrics(font_scale);
        let bold_spread = if face.synthetic_bold {
            (px / 24.0).round().max(1.0) as i32
        } else {
            0
        };

        // Ink in text space: the layout origin is the top of the ascent box.
        let mut ink: Vec<(i32, i32, f32)> = Vec::new();
        for glyph in face
            .font
            .layout(&signature.text, font_scale, point(0.0, v_metrics.ascent))
        {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                if coverage <= 0.0 {
                    return;
                }
                let y = bb.min.y + gy as i32;
                let mut x = bb.min.x + gx as i32;
                if face.synthetic_italic {
                    x += (ITALIC_SHEAR * (v_metrics.ascent - y as f32)).round() as i32;
                }
                for dx in 0..=bold_spread {
                    ink.push((x + dx, y, coverage));
                }
            });
        }

        let Some(min_x) = ink.iter().map(|(x, _, _)| *x).min() else {
            return Ok(None);
        };
        let max_x = ink.iter().map(|(x, _, _)| *x).max().unwrap_or(min_x);

        let ink_width = max_x - min_x + 1;
        let offset_x = (width as i32 - ink_width) / 2 - min_x;
        let line_height = v_metrics.ascent - v_metrics.descent;
        let offset_y = ((height as f32 - line_height) / 2.0).round() as i32;

        let mut canvas = RgbaImage::new(width, height);
        for (x, y, coverage) in ink {
            let cx = x + offset_x;
            let cy = y + offset_y;
            if cx < 0 || cy < 0 || cx >= width as i32 || cy >= height as i32 {
                continue;
            }
            let alpha = (coverage.min(1.0) * color[3] as f32).round() as u8;
            let pixel = canvas.get_pixel_mut(cx as u32, cy as u32);
            if alpha > pixel[3] {
                *pixel = Rgba([color[0], color[1], color[2], alpha]);
            }
        }

        Ok(Some(canvas))
    }
}

fn check_size(size: f32) -> Result<()> {
    if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
        return Err(ValidationKind::InvalidSize(size).into());
    }
    Ok(())
}

/// Parses `#rrggbb` or `#rrggbbaa`.
pub fn parse_color(color: &str) -> Result<Rgba<u8>> {
    let invalid = || ValidationKind::InvalidColor(color.to_string());
    let hex = color.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid().into());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
