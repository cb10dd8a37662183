//! Polygon editor.
//!
//! Polygons drawn on the map surface are mirrored into fill-extrusion layers
//! whose height comes from a shared form control.

pub mod draw;
pub mod editor;
pub mod extrusion;
pub mod feature;
pub mod renderer;
pub mod sync;

pub use editor::PolygonEditor;
