use serde::{Deserialize, Serialize};

/// Independent weight and slant flags for a typed signature.
///
/// Each flag maps onto its own font axis, so all four combinations are
/// expressed without enumerating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl TextStyle {
    pub fn regular() -> Self {
        Self::default()
    }
}

/// Everything needed to regenerate the image of a typed signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedSignature {
    /// The text that is rendered.
    pub text: String,
    /// Font family name, e.g. `"DejaVu Sans"`.
    pub font: String,
    /// `#rrggbb` or `#rrggbbaa`.
    pub color: String,
    /// Font size in pixels at scale 1.0.
    pub size: f32,
    #[serde(default)]
    pub style: TextStyle,
}
