//! Validates user supplied image files and embeds them.
//!
//! Only the image types previews can decode are accepted: PNG, JPEG, GIF and
//! WebP. The declared content type wins; when a client sends none (or the
//! generic `application/octet-stream`), the type is guessed from the file name. Bytes are embedded unchanged: no decoding,
//! resizing or format conversion happens here, and nothing is persisted.

use crate::error::{Result, ValidationKind};
use crate::render::embedded::EmbeddedImage;
use mime_guess::mime::{self, Mime};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Formats the `image` build can decode.
pub const ACCEPTED_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct UploadIngestor {
    max_bytes: usize,
}

impl Default for UploadIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl UploadIngestor {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn ingest(&self, file: &UploadedFile) -> Result<EmbeddedImage> {
        let mime = resolve_mime(file)?;
        self.check_size(file.bytes.len())?;
        if file.bytes.is_empty() {
            return Err(ValidationKind::EmptyImage.into());
        }
        Ok(EmbeddedImage::from_bytes(mime.essence_str(), &file.bytes))
    }

    /// Size check on its own, so streaming readers can stop early.
    pub fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_bytes {
            return Err(ValidationKind::TooLarge {
                size,
                max: self.max_bytes,
            }
            .into());
        }
        Ok(())
    }
}

fn resolve_mime(file: &UploadedFile) -> Result<Mime> {
    let declared = file
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .and_then(|ct| ct.parse::<Mime>().ok())
        .filter(|m| *m != mime::APPLICATION_OCTET_STREAM);

    let mime = match declared {
        Some(m) => m,
        None => mime_guess::from_path(&file.file_name)
            .first()
            .ok_or_else(|| ValidationKind::UnsupportedType(file.file_name.clone()))?,
    };

    if mime.type_() != mime::IMAGE || !ACCEPTED_TYPES.contains(&mime.essence_str()) {
        return Err(ValidationKind::UnsupportedType(mime.essence_str().to_string()).into());
    }
    Ok(mime)
}
