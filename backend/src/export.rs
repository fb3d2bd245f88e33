//! Turning a stored signature into a file the user can take elsewhere.
//!
//! Downloads are named after the signature with an extension derived from the
//! embedded MIME type. Sharing goes through the platform share surface when
//! one exists and falls back to copying the image to the clipboard.
//!
//! The server has neither a share sheet nor a clipboard. Client shells embed
//! this crate and supply [`ShareSurface`] and [`Clipboard`] for their platform;
//! over HTTP the same `ExportFile` is served by the download route.

use crate::error::Result;
use crate::render::embedded::EmbeddedImage;
use common::model::signature::SignatureRecord;
use log::{debug, info};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const FALLBACK_STEM: &str = "signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn from_record(record: &SignatureRecord) -> Result<Self> {
        let image = EmbeddedImage::parse(&record.image)?;
        let bytes = image.bytes()?;
        let mime = image.mime().unwrap_or("application/octet-stream").to_string();
        Ok(Self {
            file_name: format!("{}.{}", file_stem(&record.name), extension_for(&mime)),
            mime,
            bytes,
        })
    }

    /// Hex MD5 of the bytes, used as the download's entity tag.
    pub fn digest(&self) -> String {
        format!("{:x}", md5::compute(&self.bytes))
    }
}

/// The signature name made safe for a file name.
pub fn file_stem(name: &str) -> String {
    static UNSAFE: OnceLock<Option<Regex>> = OnceLock::new();
    // Letters, digits, spaces, dots, dashes and underscores survive.
    let Some(re) = UNSAFE.get_or_init(|| Regex::new(r"[^\p{L}\p{N} ._-]+").ok()) else {
        return FALLBACK_STEM.to_string();
    };
    let cleaned = re.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == ' ' || c == '_');
    if cleaned.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("share failed: {0}")]
    Share(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Platform share sheet.
pub trait ShareSurface {
    fn share(&self, file: &ExportFile) -> std::result::Result<(), DeliveryError>;
}

pub trait Clipboard {
    fn copy_image(&self, file: &ExportFile) -> std::result::Result<(), DeliveryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Shared,
    Copied,
}

/// Shares the file when a surface is available and accepts it, otherwise
/// copies it to the clipboard.
pub fn share_or_copy(
    file: &ExportFile,
    share: Option<&dyn ShareSurface>,
    clipboard: &dyn Clipboard,
) -> std::result::Result<Delivery, DeliveryError> {
    if let Some(surface) = share {
        match surface.share(file) {
            Ok(()) => {
                info!("Shared {}", file.file_name);
                return Ok(Delivery::Shared);
            }
            Err(e) => debug!("Falling back to clipboard for {}: {}", file.file_name, e),
        }
    }
    clipboard.copy_image(file)?;
    info!("Copied {} to the clipboard", file.file_name);
    Ok(Delivery::Copied)
}
