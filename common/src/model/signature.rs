//! The persisted signature entity.
//!
//! A `SignatureRecord` is produced by one of three input modes (freehand
//! drawing, typed text, image upload). The mode is captured by
//! [`SignatureKind`], a tagged union that is flattened into the record when
//! serialized, so the JSON form reads:
//!
//! ```json
//! { "id": "…", "name": "Work", "type": "typed", "text": "Ada", "font": "DejaVu Sans",
//!   "color": "#1a1a1a", "size": 48.0, "style": { "bold": false, "italic": true },
//!   "image": "data:image/png;base64,…", "isDefault": true,
//!   "createdAt": "2026-10-16T10:00:00Z", "lastUsed": null }
//! ```

use crate::model::typed::TypedSignature;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input mode of a signature, fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignatureKind {
    /// Freehand capture. The image is a fixed-resolution raster.
    Drawn,
    /// Rendered from text; the image can be regenerated at any scale.
    Typed(TypedSignature),
    /// User supplied file, embedded as-is.
    Uploaded,
}

impl SignatureKind {
    pub fn label(&self) -> &'static str {
        match self {
            SignatureKind::Drawn => "drawn",
            SignatureKind::Typed(_) => "typed",
            SignatureKind::Uploaded => "uploaded",
        }
    }

    pub fn typed(&self) -> Option<&TypedSignature> {
        match self {
            SignatureKind::Typed(typed) => Some(typed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: SignatureKind,
    /// Self-contained `data:` URL holding the visual payload.
    pub image: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    /// Written by the signing workflow when the signature is applied.
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

/// A signature that has been produced by an input mode but not stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSignature {
    pub name: String,
    pub kind: SignatureKind,
    pub image: String,
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::typed::TextStyle;

    fn typed_record() -> SignatureRecord {
        SignatureRecord {
            id: "sig-1".to_string(),
            name: "Work".to_string(),
            kind: SignatureKind::Typed(TypedSignature {
                text: "Ada Lovelace".to_string(),
                font: "DejaVu Sans".to_string(),
                color: "#1a1a1a".to_string(),
                size: 48.0,
                style: TextStyle {
                    bold: false,
                    italic: true,
                },
            }),
            image: "data:image/png;base64,AAAA".to_string(),
            is_default: true,
            created_at: Utc::now(),
            last_used: None,
        }
    }

    #[test]
    fn typed_fields_sit_beside_the_type_tag() {
        let json = serde_json::to_value(typed_record()).unwrap();
        assert_eq!(json["type"], "typed");
        assert_eq!(json["font"], "DejaVu Sans");
        assert_eq!(json["style"]["italic"], true);
        assert_eq!(json["isDefault"], true);
    }

    #[test]
    fn drawn_records_carry_no_typed_fields() {
        let mut record = typed_record();
        record.kind = SignatureKind::Drawn;
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "drawn");
        assert!(json.get("font").is_none());

        let back: SignatureRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, SignatureKind::Drawn);
    }
}
