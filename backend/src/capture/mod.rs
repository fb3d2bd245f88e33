//! Freehand signature capture: a raster surface plus its undo/redo history.

pub mod history;
pub mod surface;

pub use surface::{CaptureSurface, Pen};
