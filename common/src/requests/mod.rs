//! Request and response payloads of the signature HTTP API.

use crate::model::point::Point;
use crate::model::typed::{TextStyle, TypedSignature};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/signatures/drawn`: the recorded pointer strokes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrawnRequest {
    pub name: String,
    pub strokes: Vec<Vec<Point>>,
    #[serde(default)]
    pub is_default: bool,
}

/// Body of `POST /api/signatures/typed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTypedRequest {
    pub name: String,
    #[serde(flatten)]
    pub signature: TypedSignature,
    #[serde(default)]
    pub is_default: bool,
}

/// Body of `PATCH /api/signatures/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSignatureRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub font: Option<String>,
    pub color: Option<String>,
    pub size: Option<f32>,
    pub style: Option<TextStyle>,
}

impl UpdateSignatureRequest {
    /// True when any field that only applies to typed signatures is present.
    pub fn touches_typed_fields(&self) -> bool {
        self.text.is_some()
            || self.font.is_some()
            || self.color.is_some()
            || self.size.is_some()
            || self.style.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewQuery {
    pub scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub scale: f32,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    pub image: String,
    /// False when the text was blank and nothing was drawn.
    pub complete: bool,
}
