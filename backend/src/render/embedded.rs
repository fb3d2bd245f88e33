//! The canonical image representation shared by every input mode.
//!
//! Images travel as self-contained `data:` URLs (`data:<mime>;base64,<payload>`)
//! so a signature record never points at an external file. Rasters produced in
//! process (capture, typed rendering, previews) are PNG-encoded with a fixed
//! encoder configuration, which keeps identical pixels byte-identical once
//! embedded. Uploaded files keep their original bytes and MIME type.

use crate::error::{Result, ValidationKind};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::RgbaImage;
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};

pub const PNG_MIME: &str = "image/png";

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmbeddedImage(String);

impl EmbeddedImage {
    /// The blank image. Records can never be created from it.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Embeds raw bytes as-is.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        Self(format!(
            "{}{}{}{}",
            DATA_PREFIX,
            mime,
            BASE64_MARKER,
            BASE64.encode(bytes)
        ))
    }

    /// PNG-encodes a raster and embeds it.
    pub fn from_rgba(raster: &RgbaImage) -> Result<Self> {
        let bytes = encode_png(raster)?;
        Ok(Self::from_bytes(PNG_MIME, &bytes))
    }

    /// Accepts a stored `data:` URL. The empty string is the empty image.
    pub fn parse(url: &str) -> Result<Self> {
        if url.is_empty() {
            return Ok(Self::empty());
        }
        let image = Self(url.to_string());
        image.split()?;
        Ok(image)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn mime(&self) -> Option<&str> {
        self.split().ok().map(|(mime, _)| mime)
    }

    /// The embedded file bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(ValidationKind::EmptyImage.into());
        }
        let (_, payload) = self.split()?;
        BASE64
            .decode(payload)
            .map_err(|e| ValidationKind::UndecodableImage(e.to_string()).into())
    }

    /// Decodes the embedded file into RGBA pixels.
    pub fn to_rgba(&self) -> Result<RgbaImage> {
        let bytes = self.bytes()?;
        let decoded = image::load_from_memory(&bytes)?;
        Ok(decoded.to_rgba8())
    }

    fn split(&self) -> Result<(&str, &str)> {
        self.0
            .strip_prefix(DATA_PREFIX)
            .and_then(|rest| rest.split_once(BASE64_MARKER))
            .filter(|(mime, payload)| !mime.is_empty() && !payload.is_empty())
            .ok_or_else(|| ValidationKind::UndecodableImage("not a base64 data URL".into()).into())
    }
}

/// Encodes RGBA pixels as an 8-bit PNG.
pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>> {
    let (w, h) = raster.dimensions();
    let mut out = Vec::new();
    {
        let mut encoder = PngEncoder::new(&mut out, w, h);
        encoder.set_color(PngColorType::Rgba);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(raster.as_raw())?;
        writer.finish()?;
    }
    Ok(out)
}
