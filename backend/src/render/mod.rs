//! Image production and re-rendering.
//!
//! - `embedded`: the `data:` URL representation every input mode produces.
//! - `font`: font families and weight/slant resolution.
//! - `typed`: deterministic rasterization of typed signatures.
//! - `preview`: multi-scale previews of stored signatures.

pub mod embedded;
pub mod font;
pub mod preview;
pub mod typed;

pub use embedded::EmbeddedImage;
pub use font::FontLibrary;
pub use preview::PreviewRenderer;
pub use typed::TypedRenderer;
